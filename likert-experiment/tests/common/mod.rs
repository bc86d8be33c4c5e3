#![allow(dead_code)]

use likert_core::{PauseKind, Response, ResultSnapshot, StimulusSequence};
use likert_experiment::{
    ExperimentConfig, GatewayError, PresentationConfig, PresentationGateway, SubmissionGateway,
    TrialParams,
};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Instructions(String),
    Ready,
    Pause(PauseKind),
    Resume(PauseKind),
    Display(TrialParams),
    Rating(usize),
    Prompt(usize),
    Next,
    Completion,
}

/// Presentation double that answers from a script and logs every call
pub struct ScriptedPresentation {
    pub responses: VecDeque<Response>,
    pub fallback: Response,
    pub demographics: Option<String>,
    pub events: Vec<Event>,
}

impl ScriptedPresentation {
    pub fn answering(fallback: Response) -> Self {
        Self {
            responses: VecDeque::new(),
            fallback,
            demographics: None,
            events: Vec::new(),
        }
    }

    pub fn displayed(&self) -> Vec<&TrialParams> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Display(trial) => Some(trial),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events.iter().filter(|e| *e == wanted).count()
    }
}

impl PresentationGateway for ScriptedPresentation {
    fn show_instructions(&mut self, config: &PresentationConfig) -> Result<(), GatewayError> {
        self.events.push(Event::Instructions(config.dimension.clone()));
        Ok(())
    }

    fn collect_demographics(&mut self) -> Result<Option<String>, GatewayError> {
        Ok(self.demographics.clone())
    }

    fn await_ready(&mut self) -> Result<(), GatewayError> {
        self.events.push(Event::Ready);
        Ok(())
    }

    fn show_pause(&mut self, kind: PauseKind) -> Result<(), GatewayError> {
        self.events.push(Event::Pause(kind));
        Ok(())
    }

    fn await_resume(&mut self, kind: PauseKind) -> Result<(), GatewayError> {
        self.events.push(Event::Resume(kind));
        Ok(())
    }

    fn display(&mut self, trial: &TrialParams) -> Result<(), GatewayError> {
        self.events.push(Event::Display(trial.clone()));
        Ok(())
    }

    fn await_rating(&mut self, trial: &TrialParams) -> Result<Response, GatewayError> {
        self.events.push(Event::Rating(trial.trial_index));
        Ok(self
            .responses
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }

    fn prompt_selection(&mut self, trial: &TrialParams) -> Result<(), GatewayError> {
        self.events.push(Event::Prompt(trial.trial_index));
        Ok(())
    }

    fn await_next(&mut self) -> Result<(), GatewayError> {
        self.events.push(Event::Next);
        Ok(())
    }

    fn show_completion(&mut self) -> Result<(), GatewayError> {
        self.events.push(Event::Completion);
        Ok(())
    }
}

#[derive(Default)]
pub struct CapturingSubmission {
    pub submitted: Vec<ResultSnapshot>,
}

impl SubmissionGateway for CapturingSubmission {
    fn submit(&mut self, snapshot: &ResultSnapshot) -> Result<(), GatewayError> {
        self.submitted.push(snapshot.clone());
        Ok(())
    }
}

pub fn config(practice: usize, block: usize) -> ExperimentConfig {
    ExperimentConfig {
        practice_trials: practice,
        block_trials: block,
        ..ExperimentConfig::default()
    }
}

pub fn stimuli(config: &ExperimentConfig) -> StimulusSequence {
    let partition = config.partition();
    let paths: Vec<String> = (0..partition.total())
        .map(|i| format!("./website_stimuli/test/{i}.png"))
        .collect();
    StimulusSequence::new(paths, partition).expect("valid test stimuli")
}
