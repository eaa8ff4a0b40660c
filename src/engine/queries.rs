use futures::future::try_join_all;
use ulid::Ulid;

use crate::model::*;

use super::{Engine, EngineError, Validate};

impl Engine {
    pub async fn get_field_by_id(&self, id: Ulid) -> Result<FieldResponse, EngineError> {
        let field = self.require_field(id).await?;
        self.field_response(&field).await
    }

    /// Filtered, paginated field listing. No match is an empty list.
    pub async fn get_all_fields(
        &self,
        request: &GetFieldsRequest,
    ) -> Result<Vec<FieldResponse>, EngineError> {
        let filter = request
            .validate()
            .map_err(|e| self.rejected("get_all_fields", e))?;
        let fields = self.repos.field_query.get_fields(&filter).await?;
        try_join_all(fields.iter().map(|f| self.field_response(f))).await
    }

    pub async fn get_field_types(&self) -> Result<Vec<FieldTypeResponse>, EngineError> {
        let types = self.repos.field_type_query.get_field_types().await?;
        Ok(types.iter().map(FieldTypeResponse::from).collect())
    }

    pub async fn get_field_type_by_id(&self, id: u32) -> Result<FieldTypeResponse, EngineError> {
        let ft = self.require_field_type(id).await?;
        Ok((&ft).into())
    }

    pub async fn get_availability_by_id(&self, id: u64) -> Result<AvailabilityResponse, EngineError> {
        let availability = self.require_availability(id).await?;
        Ok((&availability).into())
    }

    /// Windows of one field, ordered by day then opening time.
    pub async fn get_field_availabilities(
        &self,
        field_id: Ulid,
    ) -> Result<Vec<AvailabilityResponse>, EngineError> {
        self.require_field(field_id).await?;
        let mut windows: Vec<AvailabilityResponse> = self
            .repos
            .availability_query
            .get_field_availabilities(field_id)
            .await?
            .iter()
            .map(AvailabilityResponse::from)
            .collect();
        windows.sort_by_key(|a| (a.day, a.open_hour));
        Ok(windows)
    }
}
