//! Per-criterion strategy: one judging unit per criterion, fanned out
//! concurrently and recombined in rubric order.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::warn;

use crate::error::{GradeError, GradeResult};
use crate::providers::llm::LlmClient;
use crate::rubric::{Criterion, Rubric};
use crate::score::{self, CriterionReport, EvaluationReport};

use super::schema::{self, PerCriterionOutput};
use super::{prompt, retry, Grader, GraderConfig};

pub(crate) async fn run(
    grader: &Grader,
    judged_text: &str,
    rubric: &Rubric,
    query: Option<&str>,
) -> GradeResult<EvaluationReport> {
    let mut join_set = JoinSet::new();
    for (index, criterion) in rubric.criteria().iter().cloned().enumerate() {
        let client = Arc::clone(&grader.client);
        let config = grader.config.clone();
        let text = judged_text.to_string();
        let query = query.map(str::to_string);
        join_set.spawn(async move {
            let outcome = judge_criterion(
                client.as_ref(),
                &config,
                index,
                &criterion,
                &text,
                query.as_deref(),
            )
            .await;
            (index, criterion, outcome)
        });
    }

    // Gather semantics: wait for the full set, recombine in declared
    // order. Returning early on an unrecovered failure drops the
    // JoinSet, which aborts the remaining in-flight calls.
    let mut slots: Vec<Option<CriterionReport>> = vec![None; rubric.len()];
    while let Some(joined) = join_set.join_next().await {
        let (index, criterion, outcome) = joined
            .map_err(|e| GradeError::Collaborator(format!("judging task failed: {e}")))?;
        let report = match outcome {
            Ok(output) => {
                CriterionReport::new(criterion, output.criterion_status, output.explanation)
            }
            Err(err) if err.is_retryable() => {
                let Some(fallback) = grader.config.fallback else {
                    return Err(err);
                };
                warn!(criterion = index + 1, error = %err, "substituting fallback verdict");
                let verdict = fallback.for_criterion(&criterion);
                CriterionReport::new(
                    criterion,
                    verdict,
                    format!("Fallback verdict after exhausted retries: {err}"),
                )
            }
            Err(err) => return Err(err),
        };
        slots[index] = Some(report);
    }

    let mut reports = Vec::with_capacity(slots.len());
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(report) => reports.push(report),
            None => {
                return Err(GradeError::Collaborator(format!(
                    "criterion {}: judging task never completed",
                    index + 1
                )))
            }
        }
    }
    Ok(score::aggregate_reports(reports, grader.config.normalize))
}

async fn judge_criterion(
    client: &dyn LlmClient,
    config: &GraderConfig,
    index: usize,
    criterion: &Criterion,
    judged_text: &str,
    query: Option<&str>,
) -> GradeResult<PerCriterionOutput> {
    let user_prompt = prompt::per_criterion_user_prompt(criterion, judged_text, query);
    let unit = format!("criterion {}", index + 1);
    let user_prompt: &str = &user_prompt;
    retry::run_unit(config.max_retries, config.timeout, &unit, || async move {
        let response = client
            .complete(prompt::PER_CRITERION_SYSTEM_PROMPT, user_prompt)
            .await
            .map_err(GradeError::from)?;
        schema::parse_per_criterion(&response.text)
    })
    .await
}
