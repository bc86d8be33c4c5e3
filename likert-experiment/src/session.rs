use crate::config::{ExperimentConfig, PresentationConfig};
use crate::error::{SequencerError, SessionError};
use crate::gateway::{PresentationGateway, SubmissionGateway};
use crate::state::{Sequencer, SequencerState, Step};
use likert_core::{ResultSnapshot, StimulusSequence};
use likert_timing::Timer;
use std::time::Duration;
use tracing::{debug, info};

/// Drives one run from instructions to submission, strictly one trial at a time
pub struct Session<G, S, T>
where
    G: PresentationGateway,
    S: SubmissionGateway,
    T: Timer,
{
    sequencer: Sequencer,
    presentation: G,
    submission: S,
    timer: T,
    presentation_config: PresentationConfig,
    stimulus_settle: Duration,
    submit_settle: Duration,
}

impl<G, S, T> Session<G, S, T>
where
    G: PresentationGateway,
    S: SubmissionGateway,
    T: Timer,
{
    pub fn new(
        config: &ExperimentConfig,
        stimuli: StimulusSequence,
        presentation: G,
        submission: S,
        timer: T,
    ) -> Result<Self, SessionError> {
        Ok(Self {
            sequencer: Sequencer::new(config, stimuli)?,
            presentation,
            submission,
            timer,
            presentation_config: config.presentation.clone(),
            stimulus_settle: config.stimulus_settle(),
            submit_settle: config.submit_settle(),
        })
    }

    /// Run to completion and return what was submitted.
    /// A session runs once; later calls fail before touching either gateway.
    pub fn run(&mut self) -> Result<ResultSnapshot, SessionError> {
        if *self.sequencer.state() != SequencerState::Idle {
            return Err(SequencerError::AlreadyStarted.into());
        }
        self.presentation
            .show_instructions(&self.presentation_config)?;
        if let Some(raw) = self.presentation.collect_demographics()? {
            self.sequencer.record_demographics(&raw)?;
        }
        self.presentation.await_ready()?;

        let mut step = self.sequencer.start()?;
        loop {
            step = match step {
                Step::Present(trial) => {
                    self.presentation.display(&trial)?;
                    // let the stimulus asset settle before the rating screen
                    self.timer.sleep(self.stimulus_settle);
                    let shown_at = self.timer.now();
                    let response = self.presentation.await_rating(&trial)?;
                    debug!(
                        trial_index = trial.trial_index,
                        latency = ?self.timer.elapsed(shown_at),
                        "response received"
                    );
                    self.sequencer.submit_response(response)?
                }
                Step::SelectionRequired(trial) => {
                    self.presentation.prompt_selection(&trial)?;
                    let response = self.presentation.await_rating(&trial)?;
                    self.sequencer.submit_response(response)?
                }
                Step::AwaitingNext => {
                    self.presentation.await_next()?;
                    self.sequencer.advance()?
                }
                Step::Paused(kind) => {
                    self.presentation.show_pause(kind)?;
                    self.presentation.await_resume(kind)?;
                    self.sequencer.resume()?
                }
                Step::Finished => break,
            };
        }

        self.presentation.show_completion()?;
        self.timer.sleep(self.submit_settle);
        let snapshot = self.sequencer.finalize()?;
        self.submission.submit(&snapshot)?;
        info!(entries = snapshot.len(), "results submitted");
        Ok(snapshot)
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn presentation(&self) -> &G {
        &self.presentation
    }

    pub fn submission(&self) -> &S {
        &self.submission
    }
}
