//! Conservative reconciliation of two judging passes.
//!
//! Judges drift with the order criteria are presented. Double-pass
//! grading evaluates the rubric twice (second pass reversed) and merges
//! the verdicts asymmetrically: claiming credit for a positive criterion
//! requires both passes to agree, while an error found by either pass
//! stands.

use crate::rubric::Criterion;
use crate::score::{CriterionReport, Verdict};

/// One pass's evaluation of a criterion, where the judge returned one.
#[derive(Debug, Clone, PartialEq)]
pub struct PassVerdict {
    pub verdict: Verdict,
    pub explanation: String,
}

impl PassVerdict {
    pub fn new(verdict: Verdict, explanation: impl Into<String>) -> Self {
        Self {
            verdict,
            explanation: explanation.into(),
        }
    }

    fn is_met(&self) -> bool {
        self.verdict.is_met()
    }
}

/// Merge two aligned verdict sets into one report per criterion.
///
/// Both slices are indexed in original rubric order (the caller re-maps
/// the reversed second pass before calling); a missing entry counts as
/// not-MET for that pass. Zero-weight criteria merge like positive ones.
/// The justification comes from a pass that produced the reconciled
/// verdict, first pass preferred.
pub fn reconcile(
    criteria: &[Criterion],
    pass_one: &[Option<PassVerdict>],
    pass_two: &[Option<PassVerdict>],
) -> Vec<CriterionReport> {
    criteria
        .iter()
        .enumerate()
        .map(|(i, criterion)| {
            let one = pass_one.get(i).and_then(Option::as_ref);
            let two = pass_two.get(i).and_then(Option::as_ref);
            let one_met = one.is_some_and(PassVerdict::is_met);
            let two_met = two.is_some_and(PassVerdict::is_met);

            let met = if criterion.is_negative() {
                one_met || two_met
            } else {
                one_met && two_met
            };

            let source = if met {
                if one_met {
                    one
                } else {
                    two
                }
            } else {
                one.filter(|p| !p.is_met())
                    .or_else(|| two.filter(|p| !p.is_met()))
                    .or(one)
                    .or(two)
            };
            let reason = source.map_or_else(
                || "Evaluation not found in response".to_string(),
                |p| p.explanation.clone(),
            );

            CriterionReport::new(
                criterion.clone(),
                if met { Verdict::Met } else { Verdict::Unmet },
                reason,
            )
        })
        .collect()
}
