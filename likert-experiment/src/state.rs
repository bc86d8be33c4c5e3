use crate::config::{AdvancePolicy, ExperimentConfig};
use crate::error::{ConfigError, SequencerError};
use crate::queue::TrialQueue;
use crate::recorder::ResponseRecorder;
use crate::resolver::{PhaseResolver, PhaseState, Resolution};
use likert_core::{
    PauseKind, Phase, RatingScale, Response, ResultSet, ResultSnapshot, StimulusId,
    StimulusSequence,
};
use tracing::{debug, info, warn};

/// Everything the presentation layer needs to show one trial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialParams {
    pub trial_index: usize,
    pub phase: Phase,
    pub block_number: u8,
    pub within_block_position: usize,
    pub block_size: usize,
    pub stimulus: StimulusId,
}

/// What the caller must do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Display this trial and collect a response
    Present(TrialParams),
    /// No selection was made; prompt and collect again
    SelectionRequired(TrialParams),
    /// Response recorded; call `advance` on the next signal
    AwaitingNext,
    /// Show the pause screen; call `resume` on the continue signal
    Paused(PauseKind),
    /// Run complete; call `finalize` once
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running {
        phase: Phase,
        in_flight: Option<TrialParams>,
    },
    Paused(PauseKind),
    Finished,
}

/// Walks the trial queue for one run. All run state lives here.
#[derive(Debug)]
pub struct Sequencer {
    stimuli: StimulusSequence,
    queue: TrialQueue,
    resolver: PhaseResolver,
    phase_state: PhaseState,
    recorder: ResponseRecorder,
    state: SequencerState,
    advance: AdvancePolicy,
    require_selection: bool,
    rating_scale: RatingScale,
    finalized: bool,
}

impl Sequencer {
    pub fn new(config: &ExperimentConfig, stimuli: StimulusSequence) -> Result<Self, ConfigError> {
        config.validate()?;
        let partition = stimuli.partition();
        if partition != config.partition() {
            return Err(ConfigError::PartitionMismatch {
                practice: config.practice_trials,
                block: config.block_trials,
                stimuli_practice: partition.practice,
                stimuli_block: partition.block,
            });
        }
        let recorder =
            ResponseRecorder::new(stimuli.as_slice().to_vec(), &config.presentation.dimension);
        Ok(Self {
            queue: TrialQueue::initialize(stimuli.len()),
            resolver: PhaseResolver::new(partition),
            phase_state: PhaseState::default(),
            recorder,
            state: SequencerState::Idle,
            advance: config.advance,
            require_selection: config.require_selection,
            rating_scale: config.rating_scale,
            finalized: false,
            stimuli,
        })
    }

    /// External start signal. Leaves `Idle` and resolves the first step.
    pub fn start(&mut self) -> Result<Step, SequencerError> {
        if self.state != SequencerState::Idle {
            return Err(SequencerError::AlreadyStarted);
        }
        info!(
            trials = self.stimuli.len(),
            practice = self.resolver.partition().practice,
            block = self.resolver.partition().block,
            "starting run"
        );
        self.state = SequencerState::Running {
            phase: self.phase_state.phase,
            in_flight: None,
        };
        self.step()
    }

    pub fn advance(&mut self) -> Result<Step, SequencerError> {
        match &self.state {
            SequencerState::Idle => Err(SequencerError::NotStarted),
            SequencerState::Finished => Err(SequencerError::AdvancePastFinished),
            SequencerState::Paused(kind) => Err(SequencerError::AwaitingResume(*kind)),
            SequencerState::Running {
                in_flight: Some(trial),
                ..
            } => Err(SequencerError::TrialInFlight {
                trial_index: trial.trial_index,
            }),
            SequencerState::Running { in_flight: None, .. } => self.step(),
        }
    }

    /// Continue signal from a pause screen
    pub fn resume(&mut self) -> Result<Step, SequencerError> {
        let SequencerState::Paused(kind) = self.state else {
            return Err(SequencerError::NotPaused);
        };
        debug!(?kind, "resuming");
        self.state = SequencerState::Running {
            phase: kind.phase(),
            in_flight: None,
        };
        self.step()
    }

    /// Hand in the response for the trial in flight.
    ///
    /// Malformed ratings are recorded as none. A missing selection is only
    /// gated when the run requires one; the trial then stays in flight.
    pub fn submit_response(&mut self, response: Response) -> Result<Step, SequencerError> {
        let SequencerState::Running {
            phase,
            in_flight: Some(trial),
        } = &self.state
        else {
            return Err(SequencerError::NoTrialInFlight);
        };
        if self.require_selection && response.is_no_selection() {
            return Ok(Step::SelectionRequired(trial.clone()));
        }
        let phase = *phase;
        let trial = trial.clone();
        let rating = response.resolve(&self.rating_scale).unwrap_or_else(|err| {
            warn!(trial_index = trial.trial_index, error = %err, "malformed rating recorded as none");
            likert_core::Rating::none()
        });
        self.recorder.record_trial(
            trial.trial_index,
            trial.block_number,
            trial.within_block_position,
            trial.block_size,
            trial.stimulus,
            rating,
        );
        self.state = SequencerState::Running {
            phase,
            in_flight: None,
        };
        match self.advance {
            AdvancePolicy::Auto => self.step(),
            AdvancePolicy::AwaitNext => Ok(Step::AwaitingNext),
        }
    }

    pub fn record_demographics(&mut self, raw: &str) -> Result<(), SequencerError> {
        if self.finalized {
            return Err(SequencerError::AlreadyFinalized);
        }
        self.recorder.record_demographics(raw);
        Ok(())
    }

    /// Snapshot for submission. Only valid once, after the run finished.
    pub fn finalize(&mut self) -> Result<ResultSnapshot, SequencerError> {
        if self.state != SequencerState::Finished {
            return Err(SequencerError::NotFinished);
        }
        if self.finalized {
            return Err(SequencerError::AlreadyFinalized);
        }
        self.finalized = true;
        Ok(self.recorder.snapshot())
    }

    fn step(&mut self) -> Result<Step, SequencerError> {
        let (resolution, next) = self
            .resolver
            .resolve(self.queue.remaining_count(), self.phase_state);
        self.phase_state = next;
        match resolution {
            Resolution::Finished => {
                info!(recorded = self.recorder.trial_count(), "run finished");
                self.state = SequencerState::Finished;
                Ok(Step::Finished)
            }
            Resolution::Pause(kind) => {
                info!(?kind, remaining = self.queue.remaining_count(), "pausing");
                self.state = SequencerState::Paused(kind);
                Ok(Step::Paused(kind))
            }
            Resolution::Present(placement) => {
                let trial_index = self.queue.pop_front()?;
                let trial = TrialParams {
                    trial_index,
                    phase: placement.phase,
                    block_number: placement.block_number(),
                    within_block_position: placement.within_block_position,
                    block_size: placement.block_size,
                    // queue indices are drawn from 0..stimuli.len()
                    stimulus: self.stimuli.as_slice()[trial_index].clone(),
                };
                debug!(
                    trial_index,
                    block = trial.block_number,
                    position = trial.within_block_position,
                    of = trial.block_size,
                    stimulus = %trial.stimulus,
                    "presenting trial"
                );
                self.state = SequencerState::Running {
                    phase: placement.phase,
                    in_flight: Some(trial.clone()),
                };
                Ok(Step::Present(trial))
            }
        }
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase_state.phase
    }

    pub fn remaining(&self) -> usize {
        self.queue.remaining_count()
    }

    pub fn completed(&self) -> usize {
        self.recorder.trial_count()
    }

    pub fn results(&self) -> &ResultSet {
        self.recorder.results()
    }

    pub fn stimuli(&self) -> &StimulusSequence {
        &self.stimuli
    }

    pub fn is_finished(&self) -> bool {
        self.state == SequencerState::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use likert_core::{Partition, Rating};

    fn config(practice: usize, block: usize) -> ExperimentConfig {
        ExperimentConfig {
            practice_trials: practice,
            block_trials: block,
            require_selection: false,
            ..ExperimentConfig::default()
        }
    }

    fn sequencer(config: &ExperimentConfig) -> Sequencer {
        let partition = config.partition();
        let paths: Vec<String> = (0..partition.total()).map(|i| format!("s{i}")).collect();
        let stimuli = StimulusSequence::new(paths, partition).unwrap();
        Sequencer::new(config, stimuli).unwrap()
    }

    fn expect_present(step: Step) -> TrialParams {
        match step {
            Step::Present(trial) => trial,
            other => panic!("expected a trial, got {other:?}"),
        }
    }

    #[test]
    fn contract_violations_are_reported() {
        let mut seq = sequencer(&config(1, 1));
        assert_eq!(seq.advance(), Err(SequencerError::NotStarted));
        assert_eq!(seq.finalize(), Err(SequencerError::NotFinished));
        let trial = expect_present(seq.start().unwrap());
        assert_eq!(seq.start(), Err(SequencerError::AlreadyStarted));
        assert_eq!(
            seq.advance(),
            Err(SequencerError::TrialInFlight {
                trial_index: trial.trial_index
            })
        );
        assert_eq!(seq.resume(), Err(SequencerError::NotPaused));

        assert_eq!(
            seq.submit_response(Response::Selected(3)),
            Ok(Step::Paused(PauseKind::BeforeBlock1))
        );
        assert_eq!(
            seq.advance(),
            Err(SequencerError::AwaitingResume(PauseKind::BeforeBlock1))
        );
        assert_eq!(
            seq.submit_response(Response::Selected(3)),
            Err(SequencerError::NoTrialInFlight)
        );
    }

    #[test]
    fn run_reaches_finished_and_finalizes_once() {
        let mut seq = sequencer(&config(1, 1));
        let mut step = seq.start().unwrap();
        let mut pauses = Vec::new();
        loop {
            step = match step {
                Step::Present(_) => seq.submit_response(Response::Raw("x".into())).unwrap(),
                Step::Paused(kind) => {
                    pauses.push(kind);
                    seq.resume().unwrap()
                }
                Step::Finished => break,
                other => panic!("unexpected {other:?}"),
            };
        }
        assert_eq!(pauses, vec![PauseKind::BeforeBlock1, PauseKind::BeforeBlock2]);
        assert_eq!(seq.advance(), Err(SequencerError::AdvancePastFinished));
        let snapshot = seq.finalize().unwrap();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.records().all(|r| r.rating.is_none()));
        assert_eq!(seq.finalize(), Err(SequencerError::AlreadyFinalized));
    }

    #[test]
    fn demographics_are_refused_after_finalize() {
        let mut seq = sequencer(&config(0, 1));
        assert_eq!(seq.record_demographics("[]"), Ok(()));
        let mut step = seq.start().unwrap();
        while step != Step::Finished {
            step = match step {
                Step::Present(_) => seq.submit_response(Response::Selected(2)).unwrap(),
                Step::Paused(_) => seq.resume().unwrap(),
                other => panic!("unexpected {other:?}"),
            };
        }
        let snapshot = seq.finalize().unwrap();
        assert_eq!(
            seq.record_demographics(r#"[{"name":"age","value":"52"}]"#),
            Err(SequencerError::AlreadyFinalized)
        );
        assert_eq!(seq.results().demographics(), snapshot.demographics());
    }

    #[test]
    fn missing_selection_is_gated_when_required() {
        let mut cfg = config(2, 1);
        cfg.require_selection = true;
        let mut seq = sequencer(&cfg);
        let trial = expect_present(seq.start().unwrap());
        assert_eq!(
            seq.submit_response(Response::NoSelection),
            Ok(Step::SelectionRequired(trial.clone()))
        );
        assert_eq!(seq.completed(), 0);
        // malformed values pass the gate and are stored as none
        let next = expect_present(seq.submit_response(Response::Selected(42)).unwrap());
        assert_eq!(next.trial_index, 1);
        assert_eq!(
            seq.results().get(0).map(|r| r.rating),
            Some(Rating::none())
        );
    }

    #[test]
    fn await_next_policy_waits_between_trials() {
        let mut cfg = config(2, 1);
        cfg.advance = AdvancePolicy::AwaitNext;
        let mut seq = sequencer(&cfg);
        expect_present(seq.start().unwrap());
        assert_eq!(seq.submit_response(Response::Selected(5)), Ok(Step::AwaitingNext));
        assert_eq!(seq.completed(), 1);
        assert_eq!(seq.completed(), seq.stimuli().len() - seq.remaining());
        let trial = expect_present(seq.advance().unwrap());
        assert_eq!(trial.trial_index, 1);
        assert_eq!(trial.within_block_position, 2);
    }

    #[test]
    fn mismatched_partition_is_rejected() {
        let cfg = config(5, 30);
        let stimuli = StimulusSequence::new(["a", "b", "c"], Partition::new(1, 1)).unwrap();
        assert!(matches!(
            Sequencer::new(&cfg, stimuli),
            Err(ConfigError::PartitionMismatch { .. })
        ));
    }
}
