use likert_core::{
    Demographics, Rating, ResponseRecord, ResultSet, ResultSnapshot, StimulusId,
};
use tracing::{debug, warn};

/// Owns the result set for one run
#[derive(Debug, Clone)]
pub struct ResponseRecorder {
    results: ResultSet,
    image_order: Vec<StimulusId>,
    experiment_type: String,
}

impl ResponseRecorder {
    pub fn new(image_order: Vec<StimulusId>, experiment_type: &str) -> Self {
        Self {
            results: ResultSet::new(),
            image_order,
            experiment_type: experiment_type.to_string(),
        }
    }

    /// Stores one trial. Re-recording a trial index overwrites the earlier
    /// record; returns true when that happened.
    pub fn record_trial(
        &mut self,
        trial_index: usize,
        block_number: u8,
        within_block_position: usize,
        block_size: usize,
        stimulus_id: StimulusId,
        rating: Rating,
    ) -> bool {
        debug!(
            trial_index,
            block_number,
            within_block_position,
            score = ?rating.value(),
            "recording trial"
        );
        let replaced = self.results.insert(ResponseRecord {
            rating,
            trial_index,
            within_block_position,
            stimulus_id,
            block_number,
            block_size,
        });
        if replaced.is_some() {
            warn!(trial_index, "trial recorded twice, keeping the latest response");
        }
        replaced.is_some()
    }

    pub fn record_demographics(&mut self, raw: &str) {
        let demographics = Demographics::parse(raw);
        if let Demographics::Raw(_) = demographics {
            warn!("demographics payload is not a form field list, storing it verbatim");
        }
        self.results.set_demographics(demographics);
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn trial_count(&self) -> usize {
        self.results.trial_count()
    }

    pub fn snapshot(&self) -> ResultSnapshot {
        self.results
            .snapshot(self.image_order.clone(), &self.experiment_type)
    }
}
