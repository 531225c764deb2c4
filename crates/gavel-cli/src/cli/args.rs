use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use gavel_core::{PenaltyScope, Strategy};

#[derive(Parser)]
#[command(
    name = "gavel",
    version,
    about = "Grade free-text outputs against weighted natural-language rubrics with LLM judges"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Grade a submission against a rubric
    Grade(GradeArgs),
    /// Parse and validate a rubric file
    Check(CheckArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct GradeArgs {
    /// Rubric file (.json, .yaml or .yml)
    #[arg(long)]
    pub rubric: PathBuf,

    /// Submission file; '-' or absent reads stdin
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Contextual query included in the prompt, never scored directly
    #[arg(long)]
    pub query: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    pub strategy: StrategyArg,

    /// Judge model name
    #[arg(long, default_value = "gpt-4o-mini", env = "GAVEL_MODEL")]
    pub model: String,

    /// OpenAI-compatible endpoint base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    /// Extra judging attempts per unit beyond the first
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Deadline per judging attempt, in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Report the unclamped raw weighted sum instead of a 0-1 score
    #[arg(long)]
    pub no_normalize: bool,

    /// Substitute UNMET fallback verdicts after exhausted retries
    /// instead of failing the grading call
    #[arg(long)]
    pub fallback: bool,

    /// Enable the length penalty: words free of charge before the
    /// deduction starts (requires --max-cap)
    #[arg(long, requires = "max_cap")]
    pub free_budget: Option<u32>,

    /// Word count at which the full penalty applies (requires
    /// --free-budget)
    #[arg(long, requires = "free_budget")]
    pub max_cap: Option<u32>,

    /// Deduction at and beyond --max-cap
    #[arg(long, default_value_t = 0.5)]
    pub penalty_at_cap: f64,

    /// Penalty curve exponent
    #[arg(long, default_value_t = 1.6)]
    pub penalty_exponent: f64,

    #[arg(long, value_enum, default_value_t)]
    pub penalty_scope: ScopeArg,

    /// Print the evaluation report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Rubric file (.json, .yaml or .yml)
    #[arg(long)]
    pub rubric: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum StrategyArg {
    #[default]
    PerCriterion,
    OneShot,
    DoublePass,
    Holistic,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::PerCriterion => Strategy::PerCriterion,
            StrategyArg::OneShot => Strategy::OneShot,
            StrategyArg::DoublePass => Strategy::DoublePass,
            StrategyArg::Holistic => Strategy::Holistic,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ScopeArg {
    #[default]
    All,
    OutputOnly,
    ThinkingOnly,
}

impl From<ScopeArg> for PenaltyScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::All => PenaltyScope::All,
            ScopeArg::OutputOnly => PenaltyScope::OutputOnly,
            ScopeArg::ThinkingOnly => PenaltyScope::ThinkingOnly,
        }
    }
}
