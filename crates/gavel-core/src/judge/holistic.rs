//! Holistic strategy: one call returning a single 0-100 score.

use tracing::warn;

use crate::error::{GradeError, GradeResult};
use crate::rubric::Rubric;
use crate::score::{self, EvaluationReport};

use super::{fallback_reports, prompt, retry, schema, Grader};

pub(crate) async fn run(
    grader: &Grader,
    judged_text: &str,
    rubric: &Rubric,
    query: Option<&str>,
) -> GradeResult<EvaluationReport> {
    let config = &grader.config;
    let client = grader.client.as_ref();
    let user_prompt = prompt::holistic_user_prompt(rubric.criteria(), judged_text, query);
    let user_prompt: &str = &user_prompt;

    let outcome = retry::run_unit(config.max_retries, config.timeout, "holistic", || async move {
        let response = client
            .complete(prompt::HOLISTIC_SYSTEM_PROMPT, user_prompt)
            .await
            .map_err(GradeError::from)?;
        schema::parse_holistic(&response.text)
    })
    .await;

    match outcome {
        Ok(output) => Ok(score::aggregate_holistic(
            output.overall_score,
            rubric,
            config.normalize,
        )),
        Err(err) if err.is_retryable() => {
            // No meaningful holistic fallback value exists, so fall back
            // to per-criterion fallback verdicts; raw weighted-sum
            // semantics are preserved either way.
            let Some(fallback) = config.fallback else {
                return Err(err);
            };
            warn!(error = %err, "substituting fallback verdicts for failed holistic call");
            let reports = fallback_reports(fallback, rubric.criteria(), &err);
            Ok(score::aggregate_reports(reports, config.normalize))
        }
        Err(err) => Err(err),
    }
}
