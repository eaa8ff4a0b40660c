use tracing::info;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::conflict::check_overlap;
use super::{Engine, EngineError, Validate};

impl Engine {
    pub async fn create_field(&self, request: &FieldRequest) -> Result<FieldResponse, EngineError> {
        self.try_create_field(request)
            .await
            .map_err(|e| self.rejected("create_field", e))
    }

    async fn try_create_field(&self, request: &FieldRequest) -> Result<FieldResponse, EngineError> {
        request.validate()?;
        let _guard = self.field_writes.lock().await;
        if self.repos.field_query.count_fields().await? >= MAX_FIELDS {
            return Err(EngineError::LimitExceeded("too many fields"));
        }
        let field_type = self.require_field_type(request.field_type).await?;
        self.ensure_unique_name(&request.name, None).await?;

        let field = Field {
            id: Ulid::new(),
            name: request.name.trim().to_string(),
            size: request.size.trim().to_string(),
            field_type_id: field_type.id,
        };
        self.repos.field_command.insert_field(&field).await?;
        info!("field {} created ({})", field.id, field.name);

        self.committed(
            "create_field",
            Event::FieldCreated { id: field.id, name: field.name.clone() },
        );
        Ok(FieldResponse::assemble(&field, &field_type, &[]))
    }

    pub async fn update_field(
        &self,
        id: Ulid,
        request: &FieldRequest,
    ) -> Result<FieldResponse, EngineError> {
        self.try_update_field(id, request)
            .await
            .map_err(|e| self.rejected("update_field", e))
    }

    async fn try_update_field(
        &self,
        id: Ulid,
        request: &FieldRequest,
    ) -> Result<FieldResponse, EngineError> {
        request.validate()?;
        let _guard = self.field_writes.lock().await;
        let mut field = self.require_field(id).await?;
        let field_type = self.require_field_type(request.field_type).await?;
        self.ensure_unique_name(&request.name, Some(id)).await?;

        field.name = request.name.trim().to_string();
        field.size = request.size.trim().to_string();
        field.field_type_id = field_type.id;
        self.repos.field_command.update_field(&field).await?;
        info!("field {id} updated");

        self.committed(
            "update_field",
            Event::FieldUpdated { id, name: field.name.clone() },
        );
        let availabilities = self
            .repos
            .availability_query
            .get_field_availabilities(id)
            .await?;
        Ok(FieldResponse::assemble(&field, &field_type, &availabilities))
    }

    /// Case-insensitive; `except` is the field being renamed. Callers hold
    /// `field_writes` until the field is persisted.
    async fn ensure_unique_name(&self, name: &str, except: Option<Ulid>) -> Result<(), EngineError> {
        let wanted = name.trim();
        let folded = wanted.to_lowercase();
        let filter = FieldFilter {
            name: Some(wanted.to_string()),
            limit: usize::MAX,
            ..Default::default()
        };
        let taken = self
            .repos
            .field_query
            .get_fields(&filter)
            .await?
            .into_iter()
            .any(|f| Some(f.id) != except && f.name.to_lowercase() == folded);
        if taken {
            return Err(EngineError::DuplicateName(wanted.to_string()));
        }
        Ok(())
    }

    /// Add an availability window to a field, rejecting overlaps with the
    /// field's existing windows on the same day.
    pub async fn create_availability(
        &self,
        field_id: Ulid,
        request: &AvailabilityRequest,
    ) -> Result<AvailabilityResponse, EngineError> {
        self.try_create_availability(field_id, request)
            .await
            .map_err(|e| self.rejected("create_availability", e))
    }

    async fn try_create_availability(
        &self,
        field_id: Ulid,
        request: &AvailabilityRequest,
    ) -> Result<AvailabilityResponse, EngineError> {
        let window = request.validate()?;
        self.require_field(field_id).await?;

        let _guard = self.lock_field(field_id).await;
        let existing = self
            .repos
            .availability_query
            .get_field_availabilities(field_id)
            .await?;
        if existing.len() >= MAX_AVAILABILITIES_PER_FIELD {
            return Err(EngineError::LimitExceeded("too many availabilities on field"));
        }
        check_overlap(&window, existing.iter().map(|a| &a.window))?;

        let availability = self
            .repos
            .availability_command
            .insert_availability(field_id, window)
            .await?;
        info!("availability {} added to field {field_id}: {window}", availability.id);

        self.committed(
            "create_availability",
            Event::AvailabilityAdded { id: availability.id, field_id, window },
        );
        Ok((&availability).into())
    }

    /// Replace an availability's window. The window being replaced never
    /// conflicts with its own replacement.
    pub async fn update_availability(
        &self,
        id: u64,
        request: &AvailabilityRequest,
    ) -> Result<AvailabilityResponse, EngineError> {
        self.try_update_availability(id, request)
            .await
            .map_err(|e| self.rejected("update_availability", e))
    }

    async fn try_update_availability(
        &self,
        id: u64,
        request: &AvailabilityRequest,
    ) -> Result<AvailabilityResponse, EngineError> {
        let window = request.validate()?;
        let current = self.require_availability(id).await?;
        let field_id = current.field_id;

        let _guard = self.lock_field(field_id).await;
        let siblings = self
            .repos
            .availability_query
            .get_field_availabilities(field_id)
            .await?;
        if !siblings.iter().any(|a| a.id == id) {
            return Err(EngineError::NotFound("Availability not found"));
        }
        check_overlap(
            &window,
            siblings.iter().filter(|a| a.id != id).map(|a| &a.window),
        )?;

        let updated = Availability { id, field_id, window };
        self.repos
            .availability_command
            .update_availability(&updated)
            .await?;
        info!("availability {id} on field {field_id} moved to {window}");

        self.committed(
            "update_availability",
            Event::AvailabilityUpdated { id, field_id, window },
        );
        Ok((&updated).into())
    }

    pub async fn delete_availability(&self, id: u64) -> Result<(), EngineError> {
        self.try_delete_availability(id)
            .await
            .map_err(|e| self.rejected("delete_availability", e))
    }

    async fn try_delete_availability(&self, id: u64) -> Result<(), EngineError> {
        let field_id = self.require_availability(id).await?.field_id;
        let _guard = self.lock_field(field_id).await;
        // Re-read under the lock: a concurrent delete may have won.
        let availability = self.require_availability(id).await?;
        self.repos
            .availability_command
            .delete_availability(&availability)
            .await?;
        info!("availability {id} removed from field {}", availability.field_id);

        self.committed(
            "delete_availability",
            Event::AvailabilityRemoved { id, field_id: availability.field_id },
        );
        Ok(())
    }
}
