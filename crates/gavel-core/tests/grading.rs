//! End-to-end grading through the public API: rubric files on disk,
//! scripted judge clients, and the report shape callers consume.

use std::sync::Arc;

use gavel_core::{
    GradeInput, Grader, GraderConfig, LengthPenaltyConfig, PenaltyScope, Rubric, ScriptedClient,
    Strategy, Verdict,
};

const RUBRIC_YAML: &str = "\
- weight: 10.0
  requirement: States the correct diagnosis
- weight: 8.0
  requirement: Recommends a follow-up test
- weight: -15.0
  requirement: Recommends a harmful dose
";

fn write_rubric(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn yaml_rubric_to_one_shot_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rubric(&dir, "rubric.yaml", RUBRIC_YAML);
    let rubric = Rubric::from_file(&path).unwrap();

    let client = Arc::new(ScriptedClient::with_response(
        r#"{"criteria_evaluations": [
            {"criterion_number": 1, "criterion_status": "MET", "explanation": "diagnosis stated"},
            {"criterion_number": 2, "criterion_status": "UNMET", "explanation": "no follow-up"},
            {"criterion_number": 3, "criterion_status": "UNMET", "explanation": "dosing is safe"}
        ]}"#,
    ));
    let grader = Grader::new(client);

    let report = grader
        .grade(
            &"Likely type 2 diabetes.".into(),
            &rubric,
            Strategy::OneShot,
            Some("55-year-old with elevated fasting glucose"),
        )
        .await
        .unwrap();

    assert!((report.score - 10.0 / 18.0).abs() < 1e-12);
    assert_eq!(report.raw_score, Some(10.0));
    assert_eq!(report.llm_raw_score, Some(10.0));
    assert!(report.error.is_none());

    let breakdown = report.report.unwrap();
    assert_eq!(breakdown.len(), 3);
    assert_eq!(breakdown[0].verdict, Verdict::Met);
    assert_eq!(breakdown[0].criterion.weight, 10.0);

    // The report serializes with the wire field names callers consume.
    let json = serde_json::to_value(&breakdown[0]).unwrap();
    assert_eq!(json["requirement"], "States the correct diagnosis");
    assert_eq!(json["verdict"], "MET");
}

#[tokio::test]
async fn json_and_yaml_rubrics_grade_identically() {
    let dir = tempfile::tempdir().unwrap();
    let yaml_path = write_rubric(&dir, "rubric.yml", RUBRIC_YAML);
    let json_path = write_rubric(
        &dir,
        "rubric.json",
        r#"[
            {"weight": 10.0, "requirement": "States the correct diagnosis"},
            {"weight": 8.0, "requirement": "Recommends a follow-up test"},
            {"weight": -15.0, "requirement": "Recommends a harmful dose"}
        ]"#,
    );
    assert_eq!(
        Rubric::from_file(&yaml_path).unwrap(),
        Rubric::from_file(&json_path).unwrap()
    );
}

#[tokio::test]
async fn thinking_output_split_drives_the_penalty_scope() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rubric(
        &dir,
        "rubric.yaml",
        "- weight: 5.0\n  requirement: Gives a number\n",
    );
    let rubric = Rubric::from_file(&path).unwrap();

    let client = Arc::new(ScriptedClient::with_response(
        r#"{"criteria_evaluations": [
            {"criterion_number": 1, "criterion_status": "MET", "explanation": "42 given"}
        ]}"#,
    ));
    let grader = Grader::with_config(
        client,
        GraderConfig {
            length_penalty: Some(LengthPenaltyConfig {
                free_budget: 0,
                max_cap: 10,
                penalty_at_cap: 1.0,
                exponent: 1.0,
                scope: PenaltyScope::OutputOnly,
                count_fn: None,
            }),
            ..GraderConfig::default()
        },
    );

    // 8 thinking words are free under OutputOnly; 2 output words cost
    // 2/10 of the cap.
    let input = GradeInput::Text(
        "<thinking>let me think about this long and hard here</thinking><output>the answer</output>"
            .into(),
    );
    let report = grader.grade(&input, &rubric, Strategy::OneShot, None).await.unwrap();
    assert!((report.score - 0.8).abs() < 1e-12);

    // The pre-split pair form normalizes to the same segments.
    let client = Arc::new(ScriptedClient::with_response(
        r#"{"criteria_evaluations": [
            {"criterion_number": 1, "criterion_status": "MET", "explanation": "42 given"}
        ]}"#,
    ));
    let grader = Grader::with_config(
        client,
        GraderConfig {
            length_penalty: Some(LengthPenaltyConfig {
                free_budget: 0,
                max_cap: 10,
                penalty_at_cap: 1.0,
                exponent: 1.0,
                scope: PenaltyScope::OutputOnly,
                count_fn: None,
            }),
            ..GraderConfig::default()
        },
    );
    let pair = GradeInput::pair("let me think about this long and hard here", "the answer");
    let report = grader.grade(&pair, &rubric, Strategy::OneShot, None).await.unwrap();
    assert!((report.score - 0.8).abs() < 1e-12);
}

#[tokio::test]
async fn all_negative_rubric_rewards_clean_text() {
    let rubric = Rubric::from_json(
        r#"[
            {"weight": -2.0, "requirement": "Uses profanity"},
            {"weight": -3.0, "requirement": "Leaks personal data"}
        ]"#,
    )
    .unwrap();

    let client = Arc::new(ScriptedClient::with_response(
        r#"{"criteria_evaluations": [
            {"criterion_number": 1, "criterion_status": "UNMET", "explanation": "clean"},
            {"criterion_number": 2, "criterion_status": "UNMET", "explanation": "no data"}
        ]}"#,
    ));
    let grader = Grader::new(client);
    let report = grader
        .grade(&"a polite answer".into(), &rubric, Strategy::OneShot, None)
        .await
        .unwrap();
    assert_eq!(report.score, 1.0);
    assert_eq!(report.raw_score, Some(0.0));
}
