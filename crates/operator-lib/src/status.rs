//! Aggregate status projection for one reconcile cycle

use crate::crd::StatusValue;
use crate::error::ScaleError;
use crate::scaler::ScaleOutcome;

/// Compute the status value for a cycle.
///
/// Outside the window the outcomes are ignored (the loop never produces any
/// there). Inside it, a single failed workload makes the whole cycle `Failed`.
pub fn project_status(
    inside_window: bool,
    outcomes: &[Result<ScaleOutcome, ScaleError>],
) -> StatusValue {
    if !inside_window {
        return StatusValue::OutsideWindow;
    }

    if outcomes.iter().all(Result::is_ok) {
        StatusValue::Success
    } else {
        StatusValue::Failed
    }
}
