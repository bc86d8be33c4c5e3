use likert_core::{PauseKind, SequenceError};
use thiserror::Error;

/// Control-flow contract violations. None of these is reachable through a
/// well-driven session; they surface misuse of the sequencer API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequencerError {
    #[error("sequencer has not been started")]
    NotStarted,
    #[error("sequencer was already started")]
    AlreadyStarted,
    #[error("pop from an empty trial queue")]
    EmptyQueuePop,
    #[error("advance called after the run finished")]
    AdvancePastFinished,
    #[error("run is paused ({0:?}); resume before advancing")]
    AwaitingResume(PauseKind),
    #[error("resume called while not paused")]
    NotPaused,
    #[error("trial {trial_index} is still awaiting a response")]
    TrialInFlight { trial_index: usize },
    #[error("no trial is awaiting a response")]
    NoTrialInFlight,
    #[error("run has not finished")]
    NotFinished,
    #[error("results were already finalized")]
    AlreadyFinalized,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rating scale {min}..={max} is empty")]
    EmptyScale { min: u8, max: u8 },
    #[error("practice and block sizes are both zero")]
    EmptyRun,
    #[error("run of {practice} practice and 2 x {block} block trials is too long")]
    PartitionTooLarge { practice: usize, block: usize },
    #[error("key binding with an empty key")]
    EmptyBindingKey,
    #[error("key `{key}` maps to {value}, outside scale {min}..={max}")]
    BindingOutOfScale { key: String, value: u8, min: u8, max: u8 },
    #[error("stimuli partitioned as {stimuli_practice}+2x{stimuli_block}, config expects {practice}+2x{block}")]
    PartitionMismatch {
        practice: usize,
        block: usize,
        stimuli_practice: usize,
        stimuli_block: usize,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("categories draw {drawn} stimuli, blocks need {needed}")]
    DrawMismatch { drawn: usize, needed: usize },
    #[error("{0} practice images exceed the numbered image range")]
    PracticeTooLarge(usize),
    #[error("category `{category}` has {available} eligible stimuli, {needed} needed")]
    NotEnoughStimuli {
        category: String,
        needed: usize,
        available: usize,
    },
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    #[error("reading stimulus list: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("serializing results: {0}")]
    Json(#[from] serde_json::Error),
    #[error("input closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Sequencer(#[from] SequencerError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
