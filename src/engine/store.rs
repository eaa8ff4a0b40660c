use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use ulid::Ulid;

use crate::model::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Update or delete aimed at a row that is not there.
    Missing(String),
    /// Insert of a row whose key is already taken.
    Duplicate(String),
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Missing(what) => write!(f, "missing row: {what}"),
            StoreError::Duplicate(what) => write!(f, "duplicate row: {what}"),
            StoreError::Backend(e) => write!(f, "backend failure: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

// ── Repository seams ─────────────────────────────────────────────

#[async_trait]
pub trait FieldQuery: Send + Sync {
    async fn get_field_by_id(&self, id: Ulid) -> StoreResult<Option<Field>>;

    /// Fields matching `filter`, ordered by id, with `offset`/`limit` applied.
    async fn get_fields(&self, filter: &FieldFilter) -> StoreResult<Vec<Field>>;

    async fn count_fields(&self) -> StoreResult<usize>;
}

#[async_trait]
pub trait FieldCommand: Send + Sync {
    async fn insert_field(&self, field: &Field) -> StoreResult<()>;
    async fn update_field(&self, field: &Field) -> StoreResult<()>;
}

#[async_trait]
pub trait FieldTypeQuery: Send + Sync {
    async fn get_field_type_by_id(&self, id: u32) -> StoreResult<Option<FieldType>>;

    /// All field types ordered by id.
    async fn get_field_types(&self) -> StoreResult<Vec<FieldType>>;
}

#[async_trait]
pub trait AvailabilityQuery: Send + Sync {
    async fn get_availability_by_id(&self, id: u64) -> StoreResult<Option<Availability>>;
    async fn get_field_availabilities(&self, field_id: Ulid) -> StoreResult<Vec<Availability>>;
}

#[async_trait]
pub trait AvailabilityCommand: Send + Sync {
    /// Persist a new window and return it with its assigned id.
    async fn insert_availability(
        &self,
        field_id: Ulid,
        window: TimeWindow,
    ) -> StoreResult<Availability>;
    async fn update_availability(&self, availability: &Availability) -> StoreResult<()>;
    async fn delete_availability(&self, availability: &Availability) -> StoreResult<()>;
}

// ── In-memory implementation ─────────────────────────────────────

pub struct InMemoryStore {
    fields: DashMap<Ulid, Field>,
    field_types: DashMap<u32, FieldType>,
    availabilities: DashMap<u64, Availability>,
    /// field id → availability ids, for per-field lookups.
    by_field: DashMap<Ulid, Vec<u64>>,
    next_availability_id: AtomicU64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            fields: DashMap::new(),
            field_types: DashMap::new(),
            availabilities: DashMap::new(),
            by_field: DashMap::new(),
            next_availability_id: AtomicU64::new(1),
        }
    }

    /// Field types are reference data; there is no command seam for them.
    pub fn insert_field_type(&self, field_type: FieldType) {
        self.field_types.insert(field_type.id, field_type);
    }

    pub fn availability_count(&self) -> usize {
        self.availabilities.len()
    }
}

fn matches_filter(
    field: &Field,
    filter: &FieldFilter,
    by_field: &DashMap<Ulid, Vec<u64>>,
    availabilities: &DashMap<u64, Availability>,
) -> bool {
    if let Some(ref name) = filter.name
        && !field.name.to_lowercase().contains(&name.to_lowercase())
    {
        return false;
    }
    if let Some(ref size) = filter.size
        && field.size.to_lowercase() != size.to_lowercase()
    {
        return false;
    }
    if let Some(ft) = filter.field_type
        && field.field_type_id != ft
    {
        return false;
    }
    if let Some(day) = filter.day {
        let ids = by_field.get(&field.id).map(|e| e.value().clone()).unwrap_or_default();
        return ids
            .iter()
            .filter_map(|id| availabilities.get(id))
            .any(|a| a.window.day == day);
    }
    true
}

#[async_trait]
impl FieldQuery for InMemoryStore {
    async fn get_field_by_id(&self, id: Ulid) -> StoreResult<Option<Field>> {
        Ok(self.fields.get(&id).map(|e| e.value().clone()))
    }

    async fn get_fields(&self, filter: &FieldFilter) -> StoreResult<Vec<Field>> {
        let mut matched: Vec<Field> = self
            .fields
            .iter()
            .filter(|e| matches_filter(e.value(), filter, &self.by_field, &self.availabilities))
            .map(|e| e.value().clone())
            .collect();
        matched.sort_by_key(|f| f.id);
        Ok(matched
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    async fn count_fields(&self) -> StoreResult<usize> {
        Ok(self.fields.len())
    }
}

#[async_trait]
impl FieldCommand for InMemoryStore {
    async fn insert_field(&self, field: &Field) -> StoreResult<()> {
        match self.fields.entry(field.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(format!("field {}", field.id))),
            Entry::Vacant(slot) => {
                slot.insert(field.clone());
                Ok(())
            }
        }
    }

    async fn update_field(&self, field: &Field) -> StoreResult<()> {
        match self.fields.get_mut(&field.id) {
            Some(mut row) => {
                *row = field.clone();
                Ok(())
            }
            None => Err(StoreError::Missing(format!("field {}", field.id))),
        }
    }
}

#[async_trait]
impl FieldTypeQuery for InMemoryStore {
    async fn get_field_type_by_id(&self, id: u32) -> StoreResult<Option<FieldType>> {
        Ok(self.field_types.get(&id).map(|e| e.value().clone()))
    }

    async fn get_field_types(&self) -> StoreResult<Vec<FieldType>> {
        let mut types: Vec<FieldType> = self.field_types.iter().map(|e| e.value().clone()).collect();
        types.sort_by_key(|t| t.id);
        Ok(types)
    }
}

#[async_trait]
impl AvailabilityQuery for InMemoryStore {
    async fn get_availability_by_id(&self, id: u64) -> StoreResult<Option<Availability>> {
        Ok(self.availabilities.get(&id).map(|e| e.value().clone()))
    }

    async fn get_field_availabilities(&self, field_id: Ulid) -> StoreResult<Vec<Availability>> {
        let ids = self
            .by_field
            .get(&field_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| self.availabilities.get(id).map(|e| e.value().clone()))
            .collect())
    }
}

#[async_trait]
impl AvailabilityCommand for InMemoryStore {
    async fn insert_availability(
        &self,
        field_id: Ulid,
        window: TimeWindow,
    ) -> StoreResult<Availability> {
        if !self.fields.contains_key(&field_id) {
            return Err(StoreError::Missing(format!("field {field_id}")));
        }
        let id = self.next_availability_id.fetch_add(1, Ordering::Relaxed);
        let availability = Availability { id, field_id, window };
        self.availabilities.insert(id, availability.clone());
        self.by_field.entry(field_id).or_default().push(id);
        Ok(availability)
    }

    async fn update_availability(&self, availability: &Availability) -> StoreResult<()> {
        match self.availabilities.get_mut(&availability.id) {
            Some(mut row) if row.field_id == availability.field_id => {
                row.window = availability.window;
                Ok(())
            }
            Some(_) => Err(StoreError::Backend(format!(
                "availability {} cannot move between fields",
                availability.id
            ))),
            None => Err(StoreError::Missing(format!("availability {}", availability.id))),
        }
    }

    async fn delete_availability(&self, availability: &Availability) -> StoreResult<()> {
        let (_, removed) = self
            .availabilities
            .remove(&availability.id)
            .ok_or_else(|| StoreError::Missing(format!("availability {}", availability.id)))?;
        if let Some(mut ids) = self.by_field.get_mut(&removed.field_id) {
            ids.retain(|id| *id != removed.id);
        }
        Ok(())
    }
}
