//! Weighted rubric criteria and file loading.
//!
//! A rubric is an ordered list of criteria. Weight sign encodes polarity:
//! positive weights reward a desirable trait, negative weights penalize an
//! error the text may commit. Criteria order matters for prompt
//! construction, never for scoring.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, GradeResult};

/// One weighted natural-language requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub weight: f64,
    pub requirement: String,
}

impl Criterion {
    pub fn new(weight: f64, requirement: impl Into<String>) -> Self {
        Self {
            weight,
            requirement: requirement.into(),
        }
    }

    /// Whether the criterion describes an error to detect rather than a
    /// trait to reward.
    pub fn is_negative(&self) -> bool {
        self.weight < 0.0
    }
}

/// Ordered sequence of criteria.
///
/// The persisted formats are a JSON array and a YAML sequence of
/// `{weight, requirement}` objects; both load into the same in-memory
/// order. Files with zero criteria are rejected. An empty rubric can
/// still be built programmatically, in which case grading degenerates to
/// the nothing-to-fail convention in [`crate::score`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Rubric {
    criteria: Vec<Criterion>,
}

impl Rubric {
    pub fn new(criteria: Vec<Criterion>) -> GradeResult<Self> {
        validate_criteria(&criteria)?;
        Ok(Self { criteria })
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Sum of positive weights. The denominator of the common
    /// normalization formula.
    pub fn total_positive_weight(&self) -> f64 {
        self.criteria.iter().map(|c| c.weight.max(0.0)).sum()
    }

    /// Sum of absolute negative weights.
    pub fn total_negative_weight(&self) -> f64 {
        self.criteria
            .iter()
            .filter(|c| c.weight < 0.0)
            .map(|c| c.weight.abs())
            .sum()
    }

    /// Parse a rubric from a JSON array string.
    pub fn from_json(raw: &str) -> GradeResult<Self> {
        let criteria: Vec<Criterion> = serde_json::from_str(raw)
            .map_err(|e| GradeError::Configuration(format!("invalid JSON rubric: {e}")))?;
        Self::from_loaded(criteria)
    }

    /// Parse a rubric from a YAML sequence string.
    pub fn from_yaml(raw: &str) -> GradeResult<Self> {
        let criteria: Vec<Criterion> = serde_yaml::from_str(raw)
            .map_err(|e| GradeError::Configuration(format!("invalid YAML rubric: {e}")))?;
        Self::from_loaded(criteria)
    }

    /// Load a rubric file, dispatching on extension (`.json`, `.yaml`,
    /// `.yml`).
    pub fn from_file(path: impl AsRef<Path>) -> GradeResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let raw = std::fs::read_to_string(path)?;
        match extension.as_str() {
            "json" => Self::from_json(&raw),
            "yaml" | "yml" => Self::from_yaml(&raw),
            _ => Err(GradeError::Configuration(format!(
                "unsupported rubric format '{}' (expected .json, .yaml or .yml)",
                path.display()
            ))),
        }
    }

    fn from_loaded(criteria: Vec<Criterion>) -> GradeResult<Self> {
        if criteria.is_empty() {
            return Err(GradeError::Configuration(
                "rubric contains no criteria".into(),
            ));
        }
        Self::new(criteria)
    }
}

impl From<Vec<Criterion>> for Rubric {
    /// Infallible construction for known-good criteria; use
    /// [`Rubric::new`] when the input is untrusted.
    fn from(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }
}

fn validate_criteria(criteria: &[Criterion]) -> GradeResult<()> {
    for (idx, criterion) in criteria.iter().enumerate() {
        if criterion.requirement.trim().is_empty() {
            return Err(GradeError::Configuration(format!(
                "criterion {idx}: requirement is empty"
            )));
        }
        if !criterion.weight.is_finite() {
            return Err(GradeError::Configuration(format!(
                "criterion {idx}: weight must be finite, got {}",
                criterion.weight
            )));
        }
    }
    Ok(())
}
