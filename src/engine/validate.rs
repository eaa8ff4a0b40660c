use crate::limits::*;
use crate::model::*;

use super::EngineError;

/// Shape validation for incoming requests. Success yields the checked form the
/// engine works with.
pub trait Validate {
    type Checked;

    fn validate(&self) -> Result<Self::Checked, EngineError>;
}

fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::Validation(msg.into())
}

impl Validate for FieldRequest {
    type Checked = ();

    fn validate(&self) -> Result<(), EngineError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(invalid("field name is required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(invalid(format!("field name longer than {MAX_NAME_LEN} characters")));
        }
        let size = self.size.trim();
        if size.is_empty() {
            return Err(invalid("field size is required"));
        }
        if size.chars().count() > MAX_SIZE_LEN {
            return Err(invalid(format!("field size longer than {MAX_SIZE_LEN} characters")));
        }
        if self.field_type == 0 {
            return Err(invalid("field type is required"));
        }
        Ok(())
    }
}

impl Validate for AvailabilityRequest {
    type Checked = TimeWindow;

    /// `open >= close` surfaces as `InvalidWindow`, everything else as `Validation`.
    fn validate(&self) -> Result<TimeWindow, EngineError> {
        let day = self.day.parse::<Day>().map_err(invalid)?;
        if self.open_hour == TimeOfDay::END_OF_DAY {
            return Err(invalid("opening time cannot be 24:00"));
        }
        let window = TimeWindow::new(day, self.open_hour, self.close_hour);
        if !window.is_well_formed() {
            return Err(EngineError::InvalidWindow(window));
        }
        Ok(window)
    }
}

impl Validate for GetFieldsRequest {
    type Checked = FieldFilter;

    fn validate(&self) -> Result<FieldFilter, EngineError> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(invalid(format!("page size must be between 1 and {MAX_PAGE_SIZE}")));
        }
        if self.field_type == Some(0) {
            return Err(invalid("field type must be positive"));
        }
        let day = match self.availability {
            Some(n) => Some(
                Day::from_iso_number(n)
                    .ok_or_else(|| invalid(format!("availability day must be 1..=7, got {n}")))?,
            ),
            None => None,
        };
        let non_blank = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Ok(FieldFilter {
            name: non_blank(&self.name),
            size: non_blank(&self.size),
            field_type: self.field_type,
            day,
            offset: self.offset.unwrap_or(0),
            limit,
        })
    }
}
