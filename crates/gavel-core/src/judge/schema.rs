//! Wire shapes for judge output.
//!
//! Field names here are the wire contract spelled out in the system
//! prompts. The schemars derives exist for callers doing constrained
//! decoding; inbound validation is typed deserialization plus the bounds
//! checks below. Judges are chatty: raw text is cleaned of code fences
//! and leading prose before parsing, and `criterion_number` is coerced
//! from the string/float misformattings observed in the wild.

use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{GradeError, GradeResult};
use crate::score::Verdict;

/// Expected output of a single-criterion judging call.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct PerCriterionOutput {
    /// Whether the criterion's described condition holds in the response.
    pub criterion_status: Verdict,
    /// Brief justification of the verdict.
    pub explanation: String,
}

/// One criterion's entry in a one-shot response.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CriterionEvaluation {
    /// 1-based index of the criterion being evaluated.
    #[serde(deserialize_with = "coerce_criterion_number")]
    pub criterion_number: u32,
    pub criterion_status: Verdict,
    pub explanation: String,
}

/// Expected output of a one-shot (all criteria at once) judging call.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct OneShotOutput {
    pub criteria_evaluations: Vec<CriterionEvaluation>,
}

/// Expected output of a holistic judging call.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct HolisticOutput {
    /// Holistic score from 0-100.
    pub overall_score: f64,
    pub explanation: String,
}

/// JSON Schema for [`PerCriterionOutput`], for constrained decoding.
pub fn per_criterion_schema() -> Schema {
    schema_for!(PerCriterionOutput)
}

/// JSON Schema for [`OneShotOutput`], for constrained decoding.
pub fn one_shot_schema() -> Schema {
    schema_for!(OneShotOutput)
}

/// JSON Schema for [`HolisticOutput`], for constrained decoding.
pub fn holistic_schema() -> Schema {
    schema_for!(HolisticOutput)
}

/// Parse a per-criterion response from raw judge text.
pub fn parse_per_criterion(raw: &str) -> GradeResult<PerCriterionOutput> {
    from_value(parse_value(raw)?, "per-criterion")
}

/// Parse and validate a one-shot response from raw judge text.
///
/// The `id` key is tolerated as a stand-in for `criterion_number`. A
/// duplicate or out-of-range number is a validation failure; indices
/// simply missing from the list are the caller's problem (filled UNMET
/// downstream).
pub fn parse_one_shot(raw: &str, criteria_len: usize) -> GradeResult<OneShotOutput> {
    let mut value = parse_value(raw)?;
    if let Some(items) = value
        .get_mut("criteria_evaluations")
        .and_then(serde_json::Value::as_array_mut)
    {
        for item in items {
            if let Some(obj) = item.as_object_mut() {
                if !obj.contains_key("criterion_number") {
                    if let Some(id) = obj.remove("id") {
                        warn!("judge used 'id' instead of 'criterion_number'");
                        obj.insert("criterion_number".to_string(), id);
                    }
                }
            }
        }
    }

    let output: OneShotOutput = from_value(value, "one-shot")?;
    if output.criteria_evaluations.is_empty() {
        return Err(GradeError::Validation(
            "one-shot response contains no criteria evaluations".into(),
        ));
    }
    let mut seen = vec![false; criteria_len];
    for evaluation in &output.criteria_evaluations {
        let number = evaluation.criterion_number as usize;
        if number == 0 || number > criteria_len {
            return Err(GradeError::Validation(format!(
                "criterion_number {number} out of range 1..={criteria_len}"
            )));
        }
        if seen[number - 1] {
            return Err(GradeError::Validation(format!(
                "duplicate criterion_number {number}"
            )));
        }
        seen[number - 1] = true;
    }
    Ok(output)
}

/// Parse and validate a holistic response from raw judge text.
pub fn parse_holistic(raw: &str) -> GradeResult<HolisticOutput> {
    let output: HolisticOutput = from_value(parse_value(raw)?, "holistic")?;
    if !output.overall_score.is_finite() || !(0.0..=100.0).contains(&output.overall_score) {
        return Err(GradeError::Validation(format!(
            "overall_score {} outside 0-100",
            output.overall_score
        )));
    }
    Ok(output)
}

/// Strip markdown fences and leading prose, then take the first JSON
/// value (trailing chatter after the object is tolerated).
fn parse_value(raw: &str) -> GradeResult<serde_json::Value> {
    let cleaned = clean_judge_text(raw);
    serde_json::Deserializer::from_str(cleaned)
        .into_iter::<serde_json::Value>()
        .next()
        .ok_or_else(|| GradeError::Validation("no JSON object in judge output".into()))?
        .map_err(|e| GradeError::Validation(format!("invalid JSON in judge output: {e}")))
}

fn clean_judge_text(text: &str) -> &str {
    let mut text = text.trim();
    for fence in ["```json", "```JSON", "```"] {
        if let Some(rest) = text.strip_prefix(fence) {
            text = rest;
            break;
        }
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    let text = text.trim();
    let text = text.strip_prefix("json").map_or(text, str::trim_start);
    match text.find('{') {
        Some(start) => &text[start..],
        None => text,
    }
}

fn from_value<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    shape: &str,
) -> GradeResult<T> {
    serde_json::from_value(value).map_err(|e| {
        GradeError::Validation(format!("judge output does not match {shape} shape: {e}"))
    })
}

fn coerce_criterion_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    match &value {
        serde_json::Value::Number(n) => {
            if let Some(number) = n.as_u64() {
                u32::try_from(number)
                    .map_err(|_| Error::custom(format!("criterion_number {number} too large")))
            } else if let Some(float) = n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0) {
                warn!(value = float, "coerced float criterion_number");
                Ok(float as u32)
            } else {
                Err(Error::custom(format!("criterion_number {n} is not an integer")))
            }
        }
        serde_json::Value::String(s) => {
            let number = s
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::custom(format!("criterion_number '{s}' is not an integer")))?;
            warn!(value = %s, "coerced string criterion_number");
            Ok(number)
        }
        other => Err(Error::custom(format!(
            "criterion_number has unexpected type: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_parses() {
        let raw = "```json\n{\"criterion_status\": \"MET\", \"explanation\": \"ok\"}\n```";
        let output = parse_per_criterion(raw).unwrap();
        assert_eq!(output.criterion_status, Verdict::Met);
        assert_eq!(output.explanation, "ok");
    }

    #[test]
    fn prose_before_and_after_json_is_tolerated() {
        let raw = "Sure! Here is my evaluation:\n{\"criterion_status\": \"UNMET\", \"explanation\": \"missing\"}\nHope that helps.";
        let output = parse_per_criterion(raw).unwrap();
        assert_eq!(output.criterion_status, Verdict::Unmet);
    }

    #[test]
    fn bare_json_tag_is_stripped() {
        let raw = "json {\"criterion_status\": \"MET\", \"explanation\": \"x\"}";
        assert!(parse_per_criterion(raw).is_ok());
    }

    #[test]
    fn garbage_is_a_validation_error() {
        assert!(matches!(
            parse_per_criterion("I cannot evaluate this."),
            Err(GradeError::Validation(_))
        ));
        assert!(matches!(
            parse_per_criterion("{\"criterion_status\": \"MAYBE\", \"explanation\": \"\"}"),
            Err(GradeError::Validation(_))
        ));
    }

    #[test]
    fn one_shot_coerces_misformatted_numbers() {
        let raw = r#"{"criteria_evaluations": [
            {"criterion_number": "1", "criterion_status": "MET", "explanation": "a"},
            {"criterion_number": 2.0, "criterion_status": "UNMET", "explanation": "b"}
        ]}"#;
        let output = parse_one_shot(raw, 2).unwrap();
        assert_eq!(output.criteria_evaluations[0].criterion_number, 1);
        assert_eq!(output.criteria_evaluations[1].criterion_number, 2);
    }

    #[test]
    fn one_shot_tolerates_id_key() {
        let raw = r#"{"criteria_evaluations": [
            {"id": 1, "criterion_status": "MET", "explanation": "a"}
        ]}"#;
        let output = parse_one_shot(raw, 1).unwrap();
        assert_eq!(output.criteria_evaluations[0].criterion_number, 1);
    }

    #[test]
    fn one_shot_rejects_duplicates_and_out_of_range() {
        let duplicate = r#"{"criteria_evaluations": [
            {"criterion_number": 1, "criterion_status": "MET", "explanation": "a"},
            {"criterion_number": 1, "criterion_status": "UNMET", "explanation": "b"}
        ]}"#;
        assert!(parse_one_shot(duplicate, 2)
            .unwrap_err()
            .to_string()
            .contains("duplicate"));

        let out_of_range = r#"{"criteria_evaluations": [
            {"criterion_number": 3, "criterion_status": "MET", "explanation": "a"}
        ]}"#;
        assert!(parse_one_shot(out_of_range, 2)
            .unwrap_err()
            .to_string()
            .contains("out of range"));

        let empty = r#"{"criteria_evaluations": []}"#;
        assert!(parse_one_shot(empty, 2).is_err());
    }

    #[test]
    fn holistic_bounds_are_enforced() {
        assert_eq!(
            parse_holistic(r#"{"overall_score": 85, "explanation": "solid"}"#)
                .unwrap()
                .overall_score,
            85.0
        );
        assert!(parse_holistic(r#"{"overall_score": 101, "explanation": ""}"#).is_err());
        assert!(parse_holistic(r#"{"overall_score": -1, "explanation": ""}"#).is_err());
    }

    #[test]
    fn schemas_name_their_wire_fields() {
        let schema = serde_json::to_value(one_shot_schema()).unwrap();
        assert!(schema.to_string().contains("criteria_evaluations"));
        let schema = serde_json::to_value(holistic_schema()).unwrap();
        assert!(schema.to_string().contains("overall_score"));
        let schema = serde_json::to_value(per_criterion_schema()).unwrap();
        assert!(schema.to_string().contains("criterion_status"));
    }
}
