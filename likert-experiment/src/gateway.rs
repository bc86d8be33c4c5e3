use crate::config::PresentationConfig;
use crate::error::{GatewayError, ProviderError};
use crate::state::TrialParams;
use likert_core::{Partition, PauseKind, Response, ResultSnapshot, StimulusSequence};

/// Supplies the run's ordered stimuli, already randomized
pub trait StimulusProvider {
    fn provide(&mut self, partition: Partition) -> Result<StimulusSequence, ProviderError>;
}

/// Rendering side of a run. Every `await_*` call blocks until the subject acts.
pub trait PresentationGateway {
    fn show_instructions(&mut self, config: &PresentationConfig) -> Result<(), GatewayError>;

    /// Raw demographic form payload, if the run collects one
    fn collect_demographics(&mut self) -> Result<Option<String>, GatewayError> {
        Ok(None)
    }

    fn await_ready(&mut self) -> Result<(), GatewayError>;
    fn show_pause(&mut self, kind: PauseKind) -> Result<(), GatewayError>;
    fn await_resume(&mut self, kind: PauseKind) -> Result<(), GatewayError>;

    /// Show the stimulus for a trial
    fn display(&mut self, trial: &TrialParams) -> Result<(), GatewayError>;

    /// Show the rating screen and wait for a rating or no selection
    fn await_rating(&mut self, trial: &TrialParams) -> Result<Response, GatewayError>;

    /// Blocking prompt shown when a selection is required but missing
    fn prompt_selection(&mut self, trial: &TrialParams) -> Result<(), GatewayError>;

    fn await_next(&mut self) -> Result<(), GatewayError>;
    fn show_completion(&mut self) -> Result<(), GatewayError>;
}

/// Transmits the final results. Called exactly once per run.
pub trait SubmissionGateway {
    fn submit(&mut self, snapshot: &ResultSnapshot) -> Result<(), GatewayError>;
}
