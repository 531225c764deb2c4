//! The judging orchestrator.
//!
//! [`Grader`] drives one or many collaborator calls per grading request,
//! retries unreliable calls, substitutes configured fallback verdicts on
//! persistent failure, and hands the resulting verdicts to the pure
//! aggregation in [`crate::score`]. Strategies are a closed set: adding
//! one means adding a variant and its module, not a subclass.

pub mod prompt;
pub mod schema;

mod double_pass;
mod holistic;
mod one_shot;
mod per_criterion;
mod retry;


use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::error::{GradeError, GradeResult};
use crate::input::GradeInput;
use crate::penalty::LengthPenaltyConfig;
use crate::providers::llm::LlmClient;
use crate::rubric::{Criterion, Rubric};
use crate::score::{self, CriterionReport, EvaluationReport, Verdict};

/// How the rubric is put to the judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One independent call per criterion, fanned out concurrently.
    PerCriterion,
    /// One call evaluating every criterion at once.
    OneShot,
    /// Two concurrent one-shot calls (second with criteria reversed),
    /// reconciled conservatively to damp position bias.
    DoublePass,
    /// One call returning a single 0-100 score, no per-criterion
    /// breakdown.
    Holistic,
}

/// Verdicts substituted for unresolved criteria after retries exhaust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackVerdicts {
    pub positive: Verdict,
    pub negative: Verdict,
}

impl Default for FallbackVerdicts {
    /// UNMET for both polarities: no credit claimed, no error charged.
    fn default() -> Self {
        Self {
            positive: Verdict::Unmet,
            negative: Verdict::Unmet,
        }
    }
}

impl FallbackVerdicts {
    pub fn for_criterion(&self, criterion: &Criterion) -> Verdict {
        if criterion.is_negative() {
            self.negative
        } else {
            self.positive
        }
    }
}

/// Runtime settings for one [`Grader`].
#[derive(Debug, Clone)]
pub struct GraderConfig {
    /// Extra attempts per judging unit beyond the first.
    pub max_retries: u32,
    /// Report a clamped 0-1 score; off means unbounded raw reward mode.
    pub normalize: bool,
    /// Deadline per judging attempt.
    pub timeout: Duration,
    /// Substitute these verdicts after exhausted retries instead of
    /// failing the grading call.
    pub fallback: Option<FallbackVerdicts>,
    pub length_penalty: Option<LengthPenaltyConfig>,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            normalize: true,
            timeout: Duration::from_secs(60),
            fallback: None,
            length_penalty: None,
        }
    }
}

/// Grades submissions against rubrics via an injected judge client.
pub struct Grader {
    pub(crate) client: Arc<dyn LlmClient>,
    pub(crate) config: GraderConfig,
}

impl Grader {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self::with_config(client, GraderConfig::default())
    }

    pub fn with_config(client: Arc<dyn LlmClient>, config: GraderConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &GraderConfig {
        &self.config
    }

    /// Grade a submission against a rubric.
    ///
    /// `query`, when present, is contextual input included in the prompt,
    /// never scored directly. Configuration and I/O problems come back as
    /// `Err`; a judging failure that exhausts retries without fallback
    /// comes back as `Ok` with the report's `error` populated and
    /// `score = 0.0`, so reward pipelines can filter rather than crash.
    /// Dropping the returned future aborts in-flight judge calls.
    pub async fn grade(
        &self,
        input: &GradeInput,
        rubric: &Rubric,
        strategy: Strategy,
        query: Option<&str>,
    ) -> GradeResult<EvaluationReport> {
        let deduction = match &self.config.length_penalty {
            Some(penalty) => penalty.deduction(input)?,
            None => 0.0,
        };

        // Nothing to judge: degenerate aggregation, zero LLM calls.
        if rubric.is_empty() {
            let report = score::aggregate_reports(Vec::new(), self.config.normalize);
            return Ok(score::finalize(report, deduction, self.config.normalize));
        }

        let judged_text = input.judged_text();
        let outcome = match strategy {
            Strategy::PerCriterion => per_criterion::run(self, &judged_text, rubric, query).await,
            Strategy::OneShot => one_shot::run(self, &judged_text, rubric, query).await,
            Strategy::DoublePass => double_pass::run(self, &judged_text, rubric, query).await,
            Strategy::Holistic => holistic::run(self, &judged_text, rubric, query).await,
        };

        match outcome {
            Ok(report) => Ok(score::finalize(report, deduction, self.config.normalize)),
            Err(err) if err.is_retryable() => {
                warn!(?strategy, error = %err, "grading call failed");
                Ok(EvaluationReport::failed(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }
}

/// Fallback reports for a whole unresolved criteria set.
pub(crate) fn fallback_reports(
    fallback: FallbackVerdicts,
    criteria: &[Criterion],
    cause: &GradeError,
) -> Vec<CriterionReport> {
    criteria
        .iter()
        .map(|criterion| {
            CriterionReport::new(
                criterion.clone(),
                fallback.for_criterion(criterion),
                format!("Fallback verdict after exhausted retries: {cause}"),
            )
        })
        .collect()
}
