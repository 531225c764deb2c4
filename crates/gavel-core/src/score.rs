//! Verdict aggregation and the final evaluation report.
//!
//! Raw scores always carry weighted-sum semantics regardless of the
//! judging strategy that produced them, so scores stay comparable across
//! strategies and usable as RL rewards.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rubric::{Criterion, Rubric};

/// Outcome of checking one criterion. MET means the described condition
/// holds in the text, for positive and negative criteria alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Met,
    Unmet,
}

impl Verdict {
    pub fn is_met(self) -> bool {
        matches!(self, Self::Met)
    }
}

/// A judged criterion with its verdict and justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionReport {
    #[serde(flatten)]
    pub criterion: Criterion,
    pub verdict: Verdict,
    pub reason: String,
}

impl CriterionReport {
    pub fn new(criterion: Criterion, verdict: Verdict, reason: impl Into<String>) -> Self {
        Self {
            criterion,
            verdict,
            reason: reason.into(),
        }
    }

    pub fn weight(&self) -> f64 {
        self.criterion.weight
    }
}

/// Terminal result of one grading call.
///
/// `score` is 0-1 when normalized, a raw weighted sum otherwise.
/// `raw_score` always holds the unnormalized weighted sum; `llm_raw_score`
/// preserves the judge's unconverted output (equal to `raw_score` except
/// for holistic grading, where it is the 0-100 value). When `error` is
/// set the grading call failed and `score` is 0.0; reward pipelines
/// should filter those out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_raw_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Vec<CriterionReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EvaluationReport {
    /// Report for a grading call that failed loudly.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            raw_score: None,
            llm_raw_score: None,
            report: None,
            error: Some(error.into()),
        }
    }
}

/// Reduce per-criterion verdicts to a score.
///
/// With at least one positive weight the normalized score is
/// `clamp(weighted_sum / total_positive_weight, 0, 1)`. An all-negative
/// rubric is framed as absence of errors: `clamp(1 + weighted_sum /
/// total_negative_weight, 0, 1)`, so no errors maps to 1 and all errors
/// to 0. A rubric with no criteria or all-zero weights has nothing to
/// fail and aggregates to 1.0 (raw 0.0). With `normalize` off the score
/// is the unclamped weighted sum.
pub fn aggregate_reports(reports: Vec<CriterionReport>, normalize: bool) -> EvaluationReport {
    let total_positive_weight: f64 = reports.iter().map(|r| r.weight().max(0.0)).sum();
    let total_negative_weight: f64 = reports
        .iter()
        .filter(|r| r.weight() < 0.0)
        .map(|r| r.weight().abs())
        .sum();
    let weighted_sum: f64 = reports
        .iter()
        .filter(|r| r.verdict.is_met())
        .map(|r| r.weight())
        .sum();

    let raw_score = weighted_sum;
    let score = if normalize {
        if total_positive_weight > 0.0 {
            (weighted_sum / total_positive_weight).clamp(0.0, 1.0)
        } else if total_negative_weight > 0.0 {
            (1.0 + weighted_sum / total_negative_weight).clamp(0.0, 1.0)
        } else {
            1.0
        }
    } else {
        raw_score
    };

    EvaluationReport {
        score,
        raw_score: Some(raw_score),
        llm_raw_score: Some(raw_score),
        report: Some(reports),
        error: None,
    }
}

/// Convert a holistic 0-100 judge score onto the weighted-sum scale.
///
/// `raw_score = (s / 100) * total_positive_weight`, or for an
/// all-negative rubric `-total_negative_weight * (1 - s / 100)` (100
/// means no errors). The per-criterion breakdown stays absent.
pub fn aggregate_holistic(llm_score: f64, rubric: &Rubric, normalize: bool) -> EvaluationReport {
    let total_positive_weight = rubric.total_positive_weight();
    let total_negative_weight = rubric.total_negative_weight();

    let raw_score = if total_positive_weight > 0.0 {
        (llm_score / 100.0) * total_positive_weight
    } else if total_negative_weight > 0.0 {
        -total_negative_weight * (1.0 - llm_score / 100.0)
    } else {
        0.0
    };

    let score = if normalize {
        (llm_score / 100.0).clamp(0.0, 1.0)
    } else {
        raw_score
    };

    EvaluationReport {
        score,
        raw_score: Some(raw_score),
        llm_raw_score: Some(llm_score),
        report: None,
        error: None,
    }
}

/// Apply the length-penalty deduction to an aggregated report.
///
/// The adjusted score floors at 0 only in normalized mode; raw-score mode
/// stays unclamped. Everything except `score` passes through unchanged.
pub fn finalize(mut report: EvaluationReport, deduction: f64, normalize: bool) -> EvaluationReport {
    report.score -= deduction;
    if normalize {
        report.score = report.score.max(0.0);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::Criterion;

    fn reports(entries: &[(f64, Verdict)]) -> Vec<CriterionReport> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (weight, verdict))| {
                CriterionReport::new(
                    Criterion::new(*weight, format!("criterion {i}")),
                    *verdict,
                    "judged",
                )
            })
            .collect()
    }

    fn rubric(weights: &[f64]) -> Rubric {
        Rubric::from(
            weights
                .iter()
                .enumerate()
                .map(|(i, w)| Criterion::new(*w, format!("criterion {i}")))
                .collect::<Vec<_>>(),
        )
    }

    use Verdict::{Met, Unmet};

    #[test]
    fn mixed_rubric_full_credit() {
        let report = aggregate_reports(reports(&[(10.0, Met), (8.0, Met), (-15.0, Unmet)]), true);
        assert_eq!(report.score, 1.0);
        assert_eq!(report.raw_score, Some(18.0));
        assert_eq!(report.llm_raw_score, Some(18.0));
        assert_eq!(report.report.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn negative_weight_drags_below_zero() {
        let report = aggregate_reports(reports(&[(10.0, Met), (8.0, Unmet), (-15.0, Met)]), true);
        assert_eq!(report.raw_score, Some(-5.0));
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn unnormalized_score_is_the_raw_sum() {
        let report = aggregate_reports(reports(&[(10.0, Met), (8.0, Unmet), (-15.0, Met)]), false);
        assert_eq!(report.score, -5.0);
        assert_eq!(report.raw_score, Some(-5.0));
    }

    #[test]
    fn all_negative_rubric_counts_absent_errors() {
        let clean = aggregate_reports(reports(&[(-2.0, Unmet), (-3.0, Unmet)]), true);
        assert_eq!(clean.score, 1.0);
        assert_eq!(clean.raw_score, Some(0.0));

        let all_errors = aggregate_reports(reports(&[(-2.0, Met), (-3.0, Met)]), true);
        assert_eq!(all_errors.score, 0.0);
        assert_eq!(all_errors.raw_score, Some(-5.0));

        let one_error = aggregate_reports(reports(&[(-2.0, Met), (-3.0, Unmet)]), true);
        assert!((one_error.score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn degenerate_rubric_has_nothing_to_fail() {
        let empty = aggregate_reports(Vec::new(), true);
        assert_eq!(empty.score, 1.0);
        assert_eq!(empty.raw_score, Some(0.0));

        let zero_weights = aggregate_reports(reports(&[(0.0, Met), (0.0, Unmet)]), true);
        assert_eq!(zero_weights.score, 1.0);
        assert_eq!(zero_weights.raw_score, Some(0.0));

        let raw_mode = aggregate_reports(Vec::new(), false);
        assert_eq!(raw_mode.score, 0.0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let input = reports(&[(10.0, Met), (-4.0, Met), (3.0, Unmet)]);
        let first = aggregate_reports(input.clone(), true);
        let second = aggregate_reports(input, true);
        assert_eq!(first, second);
    }

    #[test]
    fn holistic_maps_onto_weighted_sum_scale() {
        let report = aggregate_holistic(85.0, &rubric(&[10.0, 8.0, -15.0]), true);
        assert!((report.raw_score.unwrap() - 15.3).abs() < 1e-9);
        assert_eq!(report.llm_raw_score, Some(85.0));
        assert!((report.score - 0.85).abs() < 1e-12);
        assert!(report.report.is_none());
    }

    #[test]
    fn holistic_matches_per_criterion_raw_score() {
        let weights = [10.0, 8.0, -15.0];
        let per_criterion =
            aggregate_reports(reports(&[(10.0, Met), (8.0, Unmet), (-15.0, Unmet)]), true);
        let weighted_sum = per_criterion.raw_score.unwrap();
        let s = 100.0 * weighted_sum / 18.0;
        let holistic = aggregate_holistic(s, &rubric(&weights), true);
        assert!((holistic.raw_score.unwrap() - weighted_sum).abs() < 1e-9);
    }

    #[test]
    fn holistic_all_negative_rubric() {
        let rubric = rubric(&[-2.0, -3.0]);
        let clean = aggregate_holistic(100.0, &rubric, true);
        assert_eq!(clean.raw_score, Some(0.0));
        assert_eq!(clean.score, 1.0);

        let dirty = aggregate_holistic(0.0, &rubric, true);
        assert_eq!(dirty.raw_score, Some(-5.0));
        assert_eq!(dirty.score, 0.0);

        let raw_mode = aggregate_holistic(0.0, &rubric, false);
        assert_eq!(raw_mode.score, -5.0);
    }

    #[test]
    fn finalize_applies_deduction() {
        let base = aggregate_reports(reports(&[(10.0, Met)]), true);
        let penalized = finalize(base.clone(), 0.3, true);
        assert!((penalized.score - 0.7).abs() < 1e-12);
        assert_eq!(penalized.raw_score, base.raw_score);
        assert_eq!(penalized.llm_raw_score, base.llm_raw_score);
        assert_eq!(penalized.report, base.report);

        let floored = finalize(aggregate_reports(reports(&[(10.0, Unmet)]), true), 0.5, true);
        assert_eq!(floored.score, 0.0);

        let raw = finalize(aggregate_reports(reports(&[(10.0, Unmet)]), false), 0.5, false);
        assert_eq!(raw.score, -0.5);
    }

    #[test]
    fn criterion_report_serializes_flat() {
        let report = CriterionReport::new(Criterion::new(-1.5, "no hedging"), Met, "hedged twice");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["weight"], -1.5);
        assert_eq!(value["requirement"], "no hedging");
        assert_eq!(value["verdict"], "MET");
        assert_eq!(value["reason"], "hedged twice");
    }

    #[test]
    fn error_report_scores_zero_and_omits_fields() {
        let report = EvaluationReport::failed("invalid judge response: no JSON object");
        assert_eq!(report.score, 0.0);
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("raw_score").is_none());
        assert!(value["error"].as_str().unwrap().contains("no JSON object"));
    }
}
