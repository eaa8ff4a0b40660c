use crate::model::TimeWindow;

use super::EngineError;

/// Decide whether `candidate` may join a field's schedule.
///
/// Malformed candidates (`open >= close`) are rejected before any comparison.
/// Windows on other days never conflict; windows on the same day conflict iff
/// their half-open intervals intersect, so a window ending at 10:00 and one
/// starting at 10:00 coexist. Fails on the first conflicting window found.
pub fn check_overlap<'a, I>(candidate: &TimeWindow, existing: I) -> Result<(), EngineError>
where
    I: IntoIterator<Item = &'a TimeWindow>,
{
    if !candidate.is_well_formed() {
        return Err(EngineError::InvalidWindow(*candidate));
    }
    match existing.into_iter().find(|w| w.overlaps(candidate)) {
        Some(w) => Err(EngineError::Conflict { existing: *w }),
        None => Ok(()),
    }
}
