//! Shared attempt loop for judging units.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{GradeError, GradeResult};

/// Run one judging unit with up to `max_retries + 1` sequential attempts.
///
/// Each attempt is one collaborator call plus parse/validation, bounded
/// by `timeout`. Transport failure, timeout, and validation failure are
/// interchangeable here; a non-retryable error propagates immediately.
/// On exhaustion the last error is returned for the caller to map to
/// fallback verdicts or a failed report.
pub(crate) async fn run_unit<T, F, Fut>(
    max_retries: u32,
    timeout: Duration,
    unit: &str,
    mut attempt: F,
) -> GradeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = GradeResult<T>>,
{
    let attempts = max_retries + 1;
    let mut last_err = None;
    for number in 1..=attempts {
        debug!(unit, attempt = number, "judging attempt");
        match tokio::time::timeout(timeout, attempt()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) if err.is_retryable() => {
                warn!(unit, attempt = number, error = %err, "judging attempt failed");
                last_err = Some(err);
            }
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                warn!(unit, attempt = number, ?timeout, "judging attempt timed out");
                last_err = Some(GradeError::Collaborator(format!(
                    "{unit}: judge call timed out after {timeout:?}"
                )));
            }
        }
    }
    Err(last_err
        .unwrap_or_else(|| GradeError::Collaborator(format!("{unit}: no attempts executed"))))
}
