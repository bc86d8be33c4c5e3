use likert_core::{Partition, PauseKind, Phase};

/// Phase flag owned by the sequencer and rewritten only by [`PhaseResolver::resolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseState {
    pub phase: Phase,
    /// Set when the pause before block 1 is shown, cleared at the break before block 2
    pub block_entered: bool,
}

/// Presentation parameters of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub phase: Phase,
    /// 1-based position inside the block
    pub within_block_position: usize,
    pub block_size: usize,
}

impl Placement {
    pub fn block_number(&self) -> u8 {
        self.phase.block_number().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Finished,
    /// No trial is consumed
    Pause(PauseKind),
    /// Pop one trial and present it with this placement
    Present(Placement),
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseResolver {
    partition: Partition,
}

impl PhaseResolver {
    pub fn new(partition: Partition) -> Self {
        Self { partition }
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// Decide the next step from the queue length before popping.
    ///
    /// Checks run in priority order: an empty queue finishes the run, then the
    /// two pause boundaries, and only then is a trial placed. Pauses are keyed
    /// on the pre-pop length so the boundary trial is still queued and never
    /// consumed by the pause.
    pub fn resolve(&self, remaining: usize, state: PhaseState) -> (Resolution, PhaseState) {
        if remaining == 0 {
            return (
                Resolution::Finished,
                PhaseState {
                    phase: Phase::Finished,
                    ..state
                },
            );
        }
        if remaining == self.partition.block1_boundary() && !state.block_entered {
            return (
                Resolution::Pause(PauseKind::BeforeBlock1),
                PhaseState {
                    phase: Phase::TransitionToBlock1,
                    block_entered: true,
                },
            );
        }
        if remaining == self.partition.block2_boundary() && state.block_entered {
            return (
                Resolution::Pause(PauseKind::BeforeBlock2),
                PhaseState {
                    phase: Phase::TransitionToBlock2,
                    block_entered: false,
                },
            );
        }
        let placement = self.place(remaining - 1);
        (
            Resolution::Present(placement),
            PhaseState {
                phase: placement.phase,
                ..state
            },
        )
    }

    /// Placement of the trial just popped, given the queue length after the pop
    pub fn place(&self, remaining_after_pop: usize) -> Placement {
        let Partition { practice, block } = self.partition;
        let absolute = self.partition.total().saturating_sub(remaining_after_pop);
        if absolute <= practice {
            Placement {
                phase: Phase::Practice,
                within_block_position: absolute,
                block_size: practice,
            }
        } else if absolute <= practice + block {
            Placement {
                phase: Phase::Block1,
                within_block_position: absolute - practice,
                block_size: block,
            }
        } else {
            Placement {
                phase: Phase::Block2,
                within_block_position: absolute - practice - block,
                block_size: block,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_resolver() -> PhaseResolver {
        PhaseResolver::new(Partition::default())
    }

    #[test]
    fn placement_follows_absolute_position() {
        let r = default_resolver();
        // trial 0 leaves 64 queued
        assert_eq!(
            r.place(64),
            Placement {
                phase: Phase::Practice,
                within_block_position: 1,
                block_size: 5
            }
        );
        assert_eq!(r.place(60).within_block_position, 5);
        assert_eq!(
            r.place(59),
            Placement {
                phase: Phase::Block1,
                within_block_position: 1,
                block_size: 30
            }
        );
        assert_eq!(r.place(30).within_block_position, 30);
        assert_eq!(r.place(30).phase, Phase::Block1);
        assert_eq!(
            r.place(29),
            Placement {
                phase: Phase::Block2,
                within_block_position: 1,
                block_size: 30
            }
        );
        assert_eq!(r.place(0).within_block_position, 30);
        assert_eq!(r.place(0).block_number(), 2);
    }

    #[test]
    fn pause_before_block1_fires_once() {
        let r = default_resolver();
        let state = PhaseState {
            phase: Phase::Practice,
            block_entered: false,
        };
        let (res, state) = r.resolve(60, state);
        assert_eq!(res, Resolution::Pause(PauseKind::BeforeBlock1));
        assert!(state.block_entered);
        let (res, _) = r.resolve(60, state);
        assert!(matches!(res, Resolution::Present(p) if p.phase == Phase::Block1));
    }

    #[test]
    fn break_needs_the_flag() {
        let r = default_resolver();
        let entered = PhaseState {
            phase: Phase::Block1,
            block_entered: true,
        };
        let (res, state) = r.resolve(30, entered);
        assert_eq!(res, Resolution::Pause(PauseKind::BeforeBlock2));
        assert!(!state.block_entered);
        assert_eq!(state.phase, Phase::TransitionToBlock2);
        let (res, state) = r.resolve(30, state);
        assert!(matches!(res, Resolution::Present(p) if p.phase == Phase::Block2));
        assert_eq!(state.phase, Phase::Block2);
    }

    #[test]
    fn finished_takes_priority_over_pauses() {
        // block2 boundary collides with an empty queue when blocks are empty
        let r = PhaseResolver::new(Partition::new(3, 0));
        for flag in [false, true] {
            let state = PhaseState {
                phase: Phase::Practice,
                block_entered: flag,
            };
            assert_eq!(r.resolve(0, state).0, Resolution::Finished);
        }
    }

    #[test]
    fn no_practice_pauses_before_first_trial() {
        let r = PhaseResolver::new(Partition::new(0, 2));
        let (res, state) = r.resolve(4, PhaseState::default());
        assert_eq!(res, Resolution::Pause(PauseKind::BeforeBlock1));
        let (res, _) = r.resolve(4, state);
        assert_eq!(
            res,
            Resolution::Present(Placement {
                phase: Phase::Block1,
                within_block_position: 1,
                block_size: 2
            })
        );
    }
}
