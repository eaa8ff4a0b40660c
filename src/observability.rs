/// Counter: engine operations. Labels: operation, status (`ok` or an error kind).
pub const OPERATIONS_TOTAL: &str = "fieldbook_operations_total";

/// Counter: availability writes rejected for overlapping an existing window.
pub const AVAILABILITY_CONFLICTS_TOTAL: &str = "fieldbook_availability_conflicts_total";

/// Counter: seed entries rejected during import.
pub const SEED_REJECTED_TOTAL: &str = "fieldbook_seed_rejected_total";
