//! gavel-core: rubric-based LLM grading engine.
//!
//! Scores free-text outputs against weighted natural-language criteria
//! using LLM judge calls, reducing per-criterion or holistic verdicts
//! into a single comparable score for reporting or as an RL reward.

pub mod error;
pub mod input;
pub mod judge;
pub mod penalty;
pub mod providers;
pub mod reconcile;
pub mod rubric;
pub mod score;

pub use error::{GradeError, GradeResult};
pub use input::{parse_thinking_output, word_count, GradeInput};
pub use judge::{FallbackVerdicts, Grader, GraderConfig, Strategy};
pub use penalty::{CountFn, LengthPenaltyConfig, PenaltyScope};
pub use providers::llm::{LlmClient, LlmResponse, OpenAiClient, ScriptedClient};
pub use reconcile::{reconcile, PassVerdict};
pub use rubric::{Criterion, Rubric};
pub use score::{
    aggregate_holistic, aggregate_reports, finalize, CriterionReport, EvaluationReport, Verdict,
};
