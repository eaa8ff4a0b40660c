/// Max characters in a field name.
pub const MAX_NAME_LEN: usize = 100;

/// Max characters in a field size label.
pub const MAX_SIZE_LEN: usize = 50;

/// Max fields held by one store.
pub const MAX_FIELDS: usize = 10_000;

/// Max availability windows on a single field.
pub const MAX_AVAILABILITIES_PER_FIELD: usize = 64;

/// Page size used when a field listing does not name one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page a field listing may request.
pub const MAX_PAGE_SIZE: usize = 100;
