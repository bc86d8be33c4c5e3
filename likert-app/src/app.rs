use crate::Cli;
use crate::console::ConsolePresentation;
use crate::submit::JsonFileSubmission;
use anyhow::{Context, Result};
use likert_core::StimulusSequence;
use likert_experiment::{
    CategoryStimulusProvider, ExperimentConfig, FixedStimulusProvider, PresentationConfig,
    Session, StimulusProvider, parse_exclusions,
};
use likert_timing::HighPrecisionTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing::info;

pub struct App {
    config: ExperimentConfig,
    stimuli: StimulusSequence,
    output: PathBuf,
    demographics: bool,
}

impl App {
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = load_config(cli)?;
        let stimuli = provide_stimuli(cli, &config)?;
        info!(
            dimension = %config.presentation.dimension,
            trials = stimuli.len(),
            output = %cli.output.display(),
            "session prepared"
        );
        Ok(Self {
            config,
            stimuli,
            output: cli.output.clone(),
            demographics: cli.demographics,
        })
    }

    pub fn run(self) -> Result<()> {
        let stdin = io::stdin();
        let presentation =
            ConsolePresentation::new(stdin.lock(), io::stdout(), self.config.rating_scale)
                .with_demographics(self.demographics);
        let submission = JsonFileSubmission::new(&self.output);

        let mut session = Session::new(
            &self.config,
            self.stimuli,
            presentation,
            submission,
            HighPrecisionTimer::new(),
        )?;
        let snapshot = session.run().context("running session")?;

        for block in snapshot.summary() {
            info!(
                block = block.block_number,
                rated = block.rated,
                unrated = block.unrated,
                mean = ?block.mean,
                "block summary"
            );
        }
        Ok(())
    }
}

fn load_config(cli: &Cli) -> Result<ExperimentConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ExperimentConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ExperimentConfig::default(),
    };
    if let Some(dimension) = cli.dimension {
        let key_bindings = std::mem::take(&mut config.presentation.key_bindings);
        config.presentation = PresentationConfig {
            key_bindings,
            ..PresentationConfig::for_dimension(dimension.as_str())
        };
    }
    if let Some(advance) = cli.advance {
        config.advance = advance.into();
    }
    if let Some(path) = &cli.exclusions {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading exclusions {}", path.display()))?;
        config.stimuli.exclusions = parse_exclusions(&json)
            .with_context(|| format!("parsing exclusions {}", path.display()))?;
    }
    config.validate()?;
    Ok(config)
}

fn provide_stimuli(cli: &Cli, config: &ExperimentConfig) -> Result<StimulusSequence> {
    let partition = config.partition();
    let stimuli = match &cli.stimuli_list {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening stimulus list {}", path.display()))?;
            FixedStimulusProvider::from_reader(BufReader::new(file))?.provide(partition)?
        }
        None => {
            let rng = match cli.seed {
                Some(seed) => {
                    info!(seed, "seeded stimulus draw");
                    StdRng::seed_from_u64(seed)
                }
                None => StdRng::from_os_rng(),
            };
            CategoryStimulusProvider::new(config.stimuli.clone(), rng).provide(partition)?
        }
    };
    Ok(stimuli)
}
