mod conflict;
mod error;
mod mutations;
mod queries;
mod store;
mod validate;

pub use conflict::check_overlap;
pub use error::EngineError;
pub use store::{
    AvailabilityCommand, AvailabilityQuery, FieldCommand, FieldQuery, FieldTypeQuery,
    InMemoryStore, StoreError, StoreResult,
};
pub use validate::Validate;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use ulid::Ulid;

use crate::model::*;
use crate::notify::NotifyHub;

/// The repositories an `Engine` reads from and writes to.
#[derive(Clone)]
pub struct Repositories {
    pub field_query: Arc<dyn FieldQuery>,
    pub field_command: Arc<dyn FieldCommand>,
    pub field_type_query: Arc<dyn FieldTypeQuery>,
    pub availability_query: Arc<dyn AvailabilityQuery>,
    pub availability_command: Arc<dyn AvailabilityCommand>,
}

impl Repositories {
    /// Back every seam with one in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            field_query: store.clone(),
            field_command: store.clone(),
            field_type_query: store.clone(),
            availability_query: store.clone(),
            availability_command: store,
        }
    }
}

pub struct Engine {
    pub(super) repos: Repositories,
    pub notify: Arc<NotifyHub>,
    /// Per-field write locks. Availability reads, the overlap check and the
    /// persist all happen under the owning field's lock.
    pub(super) field_locks: DashMap<Ulid, Arc<Mutex<()>>>,
    /// Serializes field creation and renames: the count limit, the name
    /// uniqueness check and the persist happen under it.
    pub(super) field_writes: Mutex<()>,
}

impl Engine {
    pub fn new(repos: Repositories, notify: Arc<NotifyHub>) -> Self {
        Self {
            repos,
            notify,
            field_locks: DashMap::new(),
            field_writes: Mutex::new(()),
        }
    }

    /// Engine over a fresh `InMemoryStore`. Returns the store too so callers can seed field types.
    pub fn in_memory() -> (Self, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let engine = Self::new(Repositories::in_memory(store.clone()), Arc::new(NotifyHub::new()));
        (engine, store)
    }

    pub(super) async fn lock_field(&self, field_id: Ulid) -> OwnedMutexGuard<()> {
        let lock = self
            .field_locks
            .entry(field_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Fetch a field or fail with "Field not found".
    pub(super) async fn require_field(&self, id: Ulid) -> Result<Field, EngineError> {
        self.repos
            .field_query
            .get_field_by_id(id)
            .await?
            .ok_or(EngineError::NotFound("Field not found"))
    }

    pub(super) async fn require_field_type(&self, id: u32) -> Result<FieldType, EngineError> {
        self.repos
            .field_type_query
            .get_field_type_by_id(id)
            .await?
            .ok_or(EngineError::NotFound("Field type not found"))
    }

    pub(super) async fn require_availability(&self, id: u64) -> Result<Availability, EngineError> {
        self.repos
            .availability_query
            .get_availability_by_id(id)
            .await?
            .ok_or(EngineError::NotFound("Availability not found"))
    }

    /// Field type + availabilities → response.
    pub(super) async fn field_response(&self, field: &Field) -> Result<FieldResponse, EngineError> {
        let field_type = self.require_field_type(field.field_type_id).await?;
        let availabilities = self
            .repos
            .availability_query
            .get_field_availabilities(field.id)
            .await?;
        Ok(FieldResponse::assemble(field, &field_type, &availabilities))
    }

    /// Broadcast + count a successful mutation.
    pub(super) fn committed(&self, operation: &'static str, event: Event) {
        metrics::counter!(
            crate::observability::OPERATIONS_TOTAL,
            "operation" => operation,
            "status" => "ok"
        )
        .increment(1);
        self.notify.send(event.field_id(), &event);
    }

    /// Count a rejected operation and pass the error through.
    pub(super) fn rejected(&self, operation: &'static str, err: EngineError) -> EngineError {
        metrics::counter!(
            crate::observability::OPERATIONS_TOTAL,
            "operation" => operation,
            "status" => err.kind()
        )
        .increment(1);
        if matches!(err, EngineError::Conflict { .. }) {
            metrics::counter!(crate::observability::AVAILABILITY_CONFLICTS_TOTAL).increment(1);
        }
        tracing::debug!("{operation} rejected: {err}");
        err
    }
}
