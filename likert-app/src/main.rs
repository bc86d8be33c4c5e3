mod app;
mod console;
mod submit;

pub use app::App;
use clap::{Parser, ValueEnum};
use likert_experiment::AdvancePolicy;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "likert", version, about = "Runs a website rating session in the terminal")]
pub struct Cli {
    /// JSON experiment config; defaults apply to missing fields
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Where the submitted results are written
    #[arg(long, default_value = "experiment_results.json")]
    pub output: PathBuf,
    #[arg(long, value_enum)]
    pub dimension: Option<DimensionArg>,
    #[arg(long, value_enum)]
    pub advance: Option<AdvanceArg>,
    /// Seed for the stimulus draw
    #[arg(long)]
    pub seed: Option<u64>,
    /// Fixed stimulus order, one path per line, instead of a random draw
    #[arg(long)]
    pub stimuli_list: Option<PathBuf>,
    /// Excluded images per category, as written by the preprocessing step
    #[arg(long)]
    pub exclusions: Option<PathBuf>,
    /// Ask for the demographic form before the first trial
    #[arg(long)]
    pub demographics: bool,
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DimensionArg {
    #[value(name = "colorfulness")]
    Colorfulness,
    #[value(name = "complexity")]
    Complexity,
}

impl DimensionArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionArg::Colorfulness => "colorfulness",
            DimensionArg::Complexity => "complexity",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AdvanceArg {
    #[value(name = "auto")]
    Auto,
    #[value(name = "await_next")]
    AwaitNext,
}

impl From<AdvanceArg> for AdvancePolicy {
    fn from(value: AdvanceArg) -> Self {
        match value {
            AdvanceArg::Auto => AdvancePolicy::Auto,
            AdvanceArg::AwaitNext => AdvancePolicy::AwaitNext,
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let app = App::new(&cli)?;
    app.run()?;

    Ok(())
}
