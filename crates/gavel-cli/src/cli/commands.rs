use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use gavel_core::{
    EvaluationReport, FallbackVerdicts, GradeInput, Grader, GraderConfig, LengthPenaltyConfig,
    OpenAiClient, Rubric,
};

use crate::exit_codes;

use super::args::{CheckArgs, Cli, Command, GradeArgs};

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Grade(args) => grade(args).await,
        Command::Check(args) => check(args),
    }
}

async fn grade(args: GradeArgs) -> anyhow::Result<i32> {
    let rubric = Rubric::from_file(&args.rubric)?;
    let submission = read_submission(&args)?;

    let length_penalty = match (args.free_budget, args.max_cap) {
        (Some(free_budget), Some(max_cap)) => Some(LengthPenaltyConfig {
            free_budget,
            max_cap,
            penalty_at_cap: args.penalty_at_cap,
            exponent: args.penalty_exponent,
            scope: args.penalty_scope.into(),
            count_fn: None,
        }),
        _ => None,
    };

    let config = GraderConfig {
        max_retries: args.max_retries,
        normalize: !args.no_normalize,
        timeout: Duration::from_secs(args.timeout_secs),
        fallback: args.fallback.then(FallbackVerdicts::default),
        length_penalty,
    };

    let mut client = OpenAiClient::from_env(&args.model)?;
    if let Some(base_url) = &args.base_url {
        client = client.with_base_url(base_url);
    }

    tracing::debug!(strategy = ?args.strategy, rubric = %args.rubric.display(), "grading submission");
    let grader = Grader::with_config(Arc::new(client), config);
    let report = grader
        .grade(
            &GradeInput::Text(submission),
            &rubric,
            args.strategy.into(),
            args.query.as_deref(),
        )
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.error.is_some() {
        exit_codes::GRADING_FAILED
    } else {
        exit_codes::SUCCESS
    })
}

fn check(args: CheckArgs) -> anyhow::Result<i32> {
    let rubric = Rubric::from_file(&args.rubric)?;
    println!(
        "{}: {} criteria (positive weight {}, negative weight {})",
        args.rubric.display(),
        rubric.len(),
        rubric.total_positive_weight(),
        rubric.total_negative_weight()
    );
    for (index, criterion) in rubric.criteria().iter().enumerate() {
        println!(
            "  {:>2}. ({:+}) {}",
            index + 1,
            criterion.weight,
            criterion.requirement
        );
    }
    Ok(exit_codes::SUCCESS)
}

fn read_submission(args: &GradeArgs) -> anyhow::Result<String> {
    match &args.input {
        Some(path) if path.as_os_str() != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn print_report(report: &EvaluationReport) {
    if let Some(error) = &report.error {
        println!("score: {:.4}", report.score);
        println!("error: {error}");
        return;
    }
    match report.raw_score {
        Some(raw_score) => println!("score: {:.4} (raw {raw_score})", report.score),
        None => println!("score: {:.4}", report.score),
    }
    if report.llm_raw_score != report.raw_score {
        if let Some(llm_raw) = report.llm_raw_score {
            println!("judge score: {llm_raw}");
        }
    }
    if let Some(breakdown) = &report.report {
        for entry in breakdown {
            println!(
                "  [{:<5}] ({:+}) {} :: {}",
                if entry.verdict.is_met() { "MET" } else { "UNMET" },
                entry.criterion.weight,
                entry.criterion.requirement,
                entry.reason
            );
        }
    }
}
