//! Double-pass strategy: two concurrent one-shot passes, the second with
//! criteria reversed, reconciled conservatively.

use tracing::warn;

use crate::error::GradeResult;
use crate::reconcile::{reconcile, PassVerdict};
use crate::rubric::{Criterion, Rubric};
use crate::score::{self, EvaluationReport};

use super::schema::OneShotOutput;
use super::{one_shot, Grader, GraderConfig};

pub(crate) async fn run(
    grader: &Grader,
    judged_text: &str,
    rubric: &Rubric,
    query: Option<&str>,
) -> GradeResult<EvaluationReport> {
    let criteria = rubric.criteria();
    let reversed: Vec<Criterion> = criteria.iter().rev().cloned().collect();

    let client = grader.client.as_ref();
    let config = &grader.config;
    let (first, second) = tokio::join!(
        one_shot::call_pass(client, config, criteria, judged_text, query, "pass 1"),
        one_shot::call_pass(client, config, &reversed, judged_text, query, "pass 2"),
    );

    // Retry/fallback is applied per pass; a failed pass without fallback
    // fails the whole reconciliation.
    let pass_one = pass_verdicts(criteria, first, config, "pass 1", false)?;
    let pass_two = pass_verdicts(criteria, second, config, "pass 2", true)?;

    let reports = reconcile(criteria, &pass_one, &pass_two);
    Ok(score::aggregate_reports(reports, config.normalize))
}

/// Align one pass's numbered evaluations to original rubric order.
/// Pass-2 item `criterion_number = k` refers to original criterion
/// `n - k + 1` because that pass saw the list reversed.
fn pass_verdicts(
    criteria: &[Criterion],
    outcome: GradeResult<OneShotOutput>,
    config: &GraderConfig,
    unit: &str,
    reversed: bool,
) -> GradeResult<Vec<Option<PassVerdict>>> {
    let len = criteria.len();
    match outcome {
        Ok(output) => {
            let mut slots = vec![None; len];
            for evaluation in &output.criteria_evaluations {
                let number = evaluation.criterion_number as usize;
                let index = if reversed { len - number } else { number - 1 };
                slots[index] = Some(PassVerdict::new(
                    evaluation.criterion_status,
                    evaluation.explanation.clone(),
                ));
            }
            Ok(slots)
        }
        Err(err) if err.is_retryable() => {
            let Some(fallback) = config.fallback else {
                return Err(err);
            };
            warn!(unit, error = %err, "substituting fallback verdicts for failed pass");
            Ok(criteria
                .iter()
                .map(|criterion| {
                    Some(PassVerdict::new(
                        fallback.for_criterion(criterion),
                        format!("Fallback verdict after exhausted retries: {err}"),
                    ))
                })
                .collect())
        }
        Err(err) => Err(err),
    }
}
