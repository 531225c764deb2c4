//! Default judge prompts and user-prompt builders.
//!
//! The wording here pairs with the wire shapes in [`super::schema`]: each
//! system prompt spells out the exact JSON the judge must return.

use crate::rubric::Criterion;

pub const PER_CRITERION_SYSTEM_PROMPT: &str = r#"You are judging a response against a single criterion.

You receive the response to evaluate, one criterion to check, and a
<criterion_type> field saying whether the criterion is positive or
negative. Your job is the same for both types: decide whether the thing
the criterion describes is actually present in the response.

POSITIVE criteria describe required traits or content:
- MET: the response contains or satisfies the requirement
- UNMET: the response does not

NEGATIVE criteria describe errors the response might commit:
- MET: the response states, advocates or commits the described error
- UNMET: the response does not make the error, or mentions it only to
  warn against it, contrast with it, or explain why it is wrong

The status says nothing about quality; it only records whether the
described condition holds. Verify numbers and factual claims precisely
but accept semantically equivalent wording, and watch for negation and
contrast. A criterion demanding an unconditional or immediate action is
not satisfied by a conditional statement ("if X happens, do Y"). A
criterion can be satisfied implicitly when the response logically entails
it.

Respond with raw JSON only, starting with {, no code fences, in exactly
this format:
{
"criterion_status": "MET",
"explanation": "Brief justification of why the condition is or is not present."
}"#;

pub const ONE_SHOT_SYSTEM_PROMPT: &str = r#"You are judging a response against a numbered list of criteria.

Each criterion is marked POSITIVE or NEGATIVE. Your job is the same for
both types: decide whether the thing the criterion describes is actually
present in the response.

POSITIVE criteria describe required traits or content:
- MET: the response contains or satisfies the requirement
- UNMET: the response does not

NEGATIVE criteria describe errors the response might commit:
- MET: the response states, advocates or commits the described error
- UNMET: the response does not make the error, or mentions it only to
  warn against it, contrast with it, or explain why it is wrong

The status says nothing about quality; it only records whether the
described condition holds. Verify numbers and factual claims precisely
but accept semantically equivalent wording, and watch for negation and
contrast.

Evaluate every criterion. Do not produce an overall score.

Respond with raw JSON only, no code fences, in exactly this format:
{
  "criteria_evaluations": [
    {
      "criterion_number": 1,
      "criterion_status": "MET",
      "explanation": "Brief justification."
    }
  ]
}"#;

pub const HOLISTIC_SYSTEM_PROMPT: &str = r#"You are judging a response against a weighted list of criteria and
returning one holistic score.

Each criterion is marked POSITIVE or NEGATIVE and carries a weight.
Mentally decide for each criterion whether the thing it describes is
actually present in the response (MET) or not (UNMET), using the same
logic for both types:
- POSITIVE criteria: MET when the requirement is satisfied.
- NEGATIVE criteria: MET when the response actually commits the
  described error; mentioning it only to warn against it is UNMET.

Then compute, in your head:
1. Sum the weights of MET positive criteria.
2. Subtract the absolute weight of every MET negative criterion.
3. Divide by the total positive weight and multiply by 100.
4. Clamp to the 0-100 range.

Respond with raw JSON only, no code fences, in exactly this format:
{
  "overall_score": 85,
  "explanation": "Brief justification of the score."
}"#;

/// Prompt for judging one criterion in isolation.
pub fn per_criterion_user_prompt(
    criterion: &Criterion,
    judged_text: &str,
    query: Option<&str>,
) -> String {
    let criterion_type = if criterion.is_negative() {
        "negative"
    } else {
        "positive"
    };
    format!(
        "<criterion_type>\n{criterion_type}\n</criterion_type>\n\n\
         <criterion>\n{requirement}\n</criterion>\n\n\
         {query}<response>\n{judged_text}\n</response>",
        requirement = criterion.requirement,
        query = query_block(query),
    )
}

/// Prompt listing all criteria for one-shot and double-pass judging.
pub fn list_user_prompt(criteria: &[Criterion], judged_text: &str, query: Option<&str>) -> String {
    format!(
        "Evaluate the response against the following criteria:\n\
         <criteria>\n{lines}\n</criteria>\n\n\
         {query}<response>\n{judged_text}\n</response>\n\n\
         Provide your evaluation as JSON only.",
        lines = criteria_lines(criteria),
        query = query_block(query),
    )
}

/// Prompt requesting a single holistic 0-100 score.
pub fn holistic_user_prompt(
    criteria: &[Criterion],
    judged_text: &str,
    query: Option<&str>,
) -> String {
    format!(
        "Mentally evaluate each criterion below, compute the weighted score as \
         instructed, and return a single holistic score from 0-100.\n\n\
         <criteria>\n{lines}\n</criteria>\n\n\
         {query}<response>\n{judged_text}\n</response>\n\n\
         Return your evaluation as JSON only.",
        lines = criteria_lines(criteria),
        query = query_block(query),
    )
}

fn criteria_lines(criteria: &[Criterion]) -> String {
    criteria
        .iter()
        .enumerate()
        .map(|(idx, criterion)| {
            let criterion_type = if criterion.is_negative() {
                "NEGATIVE (MET if the error IS present, UNMET if it is not)"
            } else {
                "POSITIVE (MET if the requirement IS present, UNMET if it is not)"
            };
            format!(
                "{number}. [{criterion_type}] (weight: {weight}) {requirement}",
                number = idx + 1,
                weight = criterion.weight,
                requirement = criterion.requirement,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn query_block(query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("<query>{query}</query>\n\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criterion_prompt_carries_polarity_and_query() {
        let criterion = Criterion::new(-2.0, "Claims the patient has diabetes");
        let prompt = per_criterion_user_prompt(&criterion, "No diabetes here.", Some("diagnose"));
        assert!(prompt.contains("<criterion_type>\nnegative\n</criterion_type>"));
        assert!(prompt.contains("<criterion>\nClaims the patient has diabetes\n</criterion>"));
        assert!(prompt.contains("<query>diagnose</query>"));
        assert!(prompt.contains("<response>\nNo diabetes here.\n</response>"));
    }

    #[test]
    fn query_is_omitted_when_absent() {
        let criterion = Criterion::new(1.0, "Says hello");
        let prompt = per_criterion_user_prompt(&criterion, "hi", None);
        assert!(!prompt.contains("<query>"));
    }

    #[test]
    fn list_prompt_numbers_criteria_in_order() {
        let criteria = [
            Criterion::new(3.0, "States the total"),
            Criterion::new(-1.0, "Invents a discount"),
        ];
        let prompt = list_user_prompt(&criteria, "text", None);
        assert!(prompt.contains("1. [POSITIVE"));
        assert!(prompt.contains("(weight: 3) States the total"));
        assert!(prompt.contains("2. [NEGATIVE"));
        assert!(prompt.contains("(weight: -1) Invents a discount"));
        let one = prompt.find("1. [").unwrap();
        let two = prompt.find("2. [").unwrap();
        assert!(one < two);
    }
}
