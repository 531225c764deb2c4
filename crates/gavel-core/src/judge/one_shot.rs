//! One-shot strategy: one judging unit covering every criterion.

use std::collections::HashMap;

use tracing::warn;

use crate::error::{GradeError, GradeResult};
use crate::providers::llm::LlmClient;
use crate::rubric::{Criterion, Rubric};
use crate::score::{self, CriterionReport, EvaluationReport, Verdict};

use super::schema::{self, OneShotOutput};
use super::{fallback_reports, prompt, retry, Grader, GraderConfig};

pub(crate) const MISSING_EVALUATION: &str = "Evaluation not found in response";

pub(crate) async fn run(
    grader: &Grader,
    judged_text: &str,
    rubric: &Rubric,
    query: Option<&str>,
) -> GradeResult<EvaluationReport> {
    let criteria = rubric.criteria();
    let outcome = call_pass(
        grader.client.as_ref(),
        &grader.config,
        criteria,
        judged_text,
        query,
        "one-shot",
    )
    .await;

    let reports = match outcome {
        Ok(output) => reports_from_output(criteria, &output),
        Err(err) if err.is_retryable() => {
            let Some(fallback) = grader.config.fallback else {
                return Err(err);
            };
            warn!(error = %err, "substituting fallback verdicts for all criteria");
            fallback_reports(fallback, criteria, &err)
        }
        Err(err) => return Err(err),
    };
    Ok(score::aggregate_reports(reports, grader.config.normalize))
}

/// One retried one-shot call over a criteria list. Shared with the
/// double-pass strategy, which calls it twice.
pub(crate) async fn call_pass(
    client: &dyn LlmClient,
    config: &GraderConfig,
    criteria: &[Criterion],
    judged_text: &str,
    query: Option<&str>,
    unit: &str,
) -> GradeResult<OneShotOutput> {
    let user_prompt = prompt::list_user_prompt(criteria, judged_text, query);
    let criteria_len = criteria.len();
    let user_prompt: &str = &user_prompt;
    retry::run_unit(config.max_retries, config.timeout, unit, || async move {
        let response = client
            .complete(prompt::ONE_SHOT_SYSTEM_PROMPT, user_prompt)
            .await
            .map_err(GradeError::from)?;
        schema::parse_one_shot(&response.text, criteria_len)
    })
    .await
}

/// Map numbered evaluations back onto the criteria list. Numbers were
/// validated injective and in range at parse time; criteria the judge
/// skipped are filled UNMET.
fn reports_from_output(criteria: &[Criterion], output: &OneShotOutput) -> Vec<CriterionReport> {
    let by_number: HashMap<u32, _> = output
        .criteria_evaluations
        .iter()
        .map(|e| (e.criterion_number, e))
        .collect();
    criteria
        .iter()
        .enumerate()
        .map(|(index, criterion)| {
            match by_number.get(&(index as u32 + 1)) {
                Some(evaluation) => CriterionReport::new(
                    criterion.clone(),
                    evaluation.criterion_status,
                    evaluation.explanation.clone(),
                ),
                None => {
                    warn!(criterion = index + 1, "missing evaluation in one-shot response");
                    CriterionReport::new(criterion.clone(), Verdict::Unmet, MISSING_EVALUATION)
                }
            }
        })
        .collect()
}
