use serde::{Deserialize, Serialize};

/// Logical segment of a run, in presentation order
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Practice,
    TransitionToBlock1,
    Block1,
    TransitionToBlock2,
    Block2,
    Finished,
}

impl Phase {
    /// Block number written into records: 0 for practice, 1 and 2 for the real blocks.
    pub fn block_number(&self) -> Option<u8> {
        match self {
            Phase::Practice => Some(0),
            Phase::Block1 => Some(1),
            Phase::Block2 => Some(2),
            _ => None,
        }
    }
}

/// The two pause screens. Neither consumes a trial.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauseKind {
    BeforeBlock1,
    BeforeBlock2,
}

impl PauseKind {
    pub fn phase(&self) -> Phase {
        match self {
            PauseKind::BeforeBlock1 => Phase::TransitionToBlock1,
            PauseKind::BeforeBlock2 => Phase::TransitionToBlock2,
        }
    }
}
