//! Length penalty: a score deduction for text exceeding a length budget.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::{GradeError, GradeResult};
use crate::input::{word_count, GradeInput};

/// Custom length measure, e.g. a tokenizer-backed count.
pub type CountFn = Arc<dyn Fn(&str) -> usize + Send + Sync>;

/// Which submission segments count toward the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenaltyScope {
    /// Thinking and output together.
    #[default]
    All,
    /// Only the output segment, letting long reasoning go free.
    OutputOnly,
    /// Only the thinking segment.
    ThinkingOnly,
}

/// Penalty curve configuration.
///
/// The deduction is 0 up to `free_budget`, `penalty_at_cap` from
/// `max_cap` on, and `penalty_at_cap * frac^exponent` in between, where
/// `frac` is the position inside the window. With normalized scores use
/// fractional `penalty_at_cap` values like 0.5; with raw scores use
/// absolute ones like 50.0.
#[derive(Clone)]
pub struct LengthPenaltyConfig {
    pub free_budget: u32,
    pub max_cap: u32,
    pub penalty_at_cap: f64,
    pub exponent: f64,
    pub scope: PenaltyScope,
    /// Length measure; `None` means whitespace word count.
    pub count_fn: Option<CountFn>,
}

impl Default for LengthPenaltyConfig {
    fn default() -> Self {
        Self {
            free_budget: 6000,
            max_cap: 8000,
            penalty_at_cap: 0.5,
            exponent: 1.6,
            scope: PenaltyScope::All,
            count_fn: None,
        }
    }
}

impl fmt::Debug for LengthPenaltyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LengthPenaltyConfig")
            .field("free_budget", &self.free_budget)
            .field("max_cap", &self.max_cap)
            .field("penalty_at_cap", &self.penalty_at_cap)
            .field("exponent", &self.exponent)
            .field("scope", &self.scope)
            .field("count_fn", &self.count_fn.as_ref().map(|_| "custom"))
            .finish()
    }
}

impl LengthPenaltyConfig {
    /// Reject configurations the curve cannot be computed for.
    pub fn validate(&self) -> GradeResult<()> {
        if self.max_cap <= self.free_budget {
            return Err(GradeError::Configuration(format!(
                "length penalty max_cap ({}) must exceed free_budget ({})",
                self.max_cap, self.free_budget
            )));
        }
        if self.penalty_at_cap < 0.0 {
            return Err(GradeError::Configuration(format!(
                "length penalty penalty_at_cap must be non-negative, got {}",
                self.penalty_at_cap
            )));
        }
        if !(self.exponent > 0.0) {
            return Err(GradeError::Configuration(format!(
                "length penalty exponent must be positive, got {}",
                self.exponent
            )));
        }
        Ok(())
    }

    /// Compute the deduction for a submission. Monotonic in length,
    /// bounded in `[0, penalty_at_cap]`.
    pub fn deduction(&self, input: &GradeInput) -> GradeResult<f64> {
        self.validate()?;
        let text = scoped_text(input, self.scope);
        let count = match &self.count_fn {
            Some(count_fn) => count_fn(&text),
            None => word_count(&text),
        };
        Ok(self.curve(count))
    }

    fn curve(&self, count: usize) -> f64 {
        let count = count as f64;
        let free_budget = f64::from(self.free_budget);
        let max_cap = f64::from(self.max_cap);
        if count <= free_budget {
            0.0
        } else if count >= max_cap {
            self.penalty_at_cap
        } else {
            let frac = (count - free_budget) / (max_cap - free_budget);
            self.penalty_at_cap * frac.powf(self.exponent)
        }
    }
}

fn scoped_text<'a>(input: &'a GradeInput, scope: PenaltyScope) -> Cow<'a, str> {
    let (thinking, output) = input.segments();
    match scope {
        PenaltyScope::ThinkingOnly => Cow::Borrowed(thinking),
        PenaltyScope::OutputOnly => Cow::Borrowed(output),
        PenaltyScope::All => {
            if thinking.is_empty() {
                Cow::Borrowed(output)
            } else if output.is_empty() {
                Cow::Borrowed(thinking)
            } else {
                Cow::Owned(format!("{thinking}\n{output}"))
            }
        }
    }
}
