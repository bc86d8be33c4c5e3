use crate::error::ConfigError;
use likert_core::{Partition, RatingScale};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// What happens after a rating is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancePolicy {
    /// Present the next step immediately
    #[default]
    Auto,
    /// Wait for an explicit next signal
    AwaitNext,
}

/// Label text and key table for the rating screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub dimension: String,
    pub low_label: String,
    pub high_label: String,
    /// Key text to rating value. Empty means the scale digits themselves.
    pub key_bindings: BTreeMap<String, u8>,
}

impl PresentationConfig {
    pub fn for_dimension(dimension: &str) -> Self {
        let (low, high) = match dimension {
            "colorfulness" => ("not colorful at all", "very colorful"),
            "complexity" => ("not complex at all", "very complex"),
            _ => ("low", "high"),
        };
        Self {
            dimension: dimension.to_string(),
            low_label: low.to_string(),
            high_label: high.to_string(),
            key_bindings: BTreeMap::new(),
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self::for_dimension("colorfulness")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusCategory {
    pub name: String,
    /// Images are numbered `0..pool`
    pub pool: u32,
    pub draw: usize,
}

impl StimulusCategory {
    pub fn new(name: &str, pool: u32, draw: usize) -> Self {
        Self {
            name: name.to_string(),
            pool,
            draw,
        }
    }
}

/// Where stimuli live and how many each category contributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StimuliConfig {
    pub root: String,
    pub extension: String,
    pub practice_category: String,
    pub categories: Vec<StimulusCategory>,
    /// Image numbers never shown, per category
    pub exclusions: BTreeMap<String, Vec<u32>>,
}

impl Default for StimuliConfig {
    fn default() -> Self {
        Self {
            root: "./website_stimuli".to_string(),
            extension: "png".to_string(),
            practice_category: "practice".to_string(),
            categories: vec![
                StimulusCategory::new("english", 350, 44),
                StimulusCategory::new("foreign", 60, 8),
                StimulusCategory::new("grayscale", 20, 8),
            ],
            exclusions: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub practice_trials: usize,
    pub block_trials: usize,
    pub advance: AdvancePolicy,
    pub require_selection: bool,
    pub rating_scale: RatingScale,
    pub stimulus_settle_ms: u64,
    pub submit_settle_ms: u64,
    pub presentation: PresentationConfig,
    pub stimuli: StimuliConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            practice_trials: 5,
            block_trials: 30,
            advance: AdvancePolicy::Auto,
            require_selection: true,
            rating_scale: RatingScale::default(),
            stimulus_settle_ms: 500,
            submit_settle_ms: 1500,
            presentation: PresentationConfig::default(),
            stimuli: StimuliConfig::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn partition(&self) -> Partition {
        Partition::new(self.practice_trials, self.block_trials)
    }

    pub fn stimulus_settle(&self) -> Duration {
        Duration::from_millis(self.stimulus_settle_ms)
    }

    pub fn submit_settle(&self) -> Duration {
        Duration::from_millis(self.submit_settle_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.rating_scale;
        if scale.is_empty() {
            return Err(ConfigError::EmptyScale {
                min: scale.min,
                max: scale.max,
            });
        }
        match self.partition().checked_total() {
            None => {
                return Err(ConfigError::PartitionTooLarge {
                    practice: self.practice_trials,
                    block: self.block_trials,
                });
            }
            Some(0) => return Err(ConfigError::EmptyRun),
            Some(_) => {}
        }
        for (key, &value) in &self.presentation.key_bindings {
            if key.trim().is_empty() {
                return Err(ConfigError::EmptyBindingKey);
            }
            if !scale.contains(i64::from(value)) {
                return Err(ConfigError::BindingOutOfScale {
                    key: key.clone(),
                    value,
                    min: scale.min,
                    max: scale.max,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_sixty_five_trial_run() {
        let config = ExperimentConfig::default();
        assert_eq!(config.partition().total(), 65);
        assert_eq!(config.stimulus_settle(), Duration::from_millis(500));
        assert_eq!(config.submit_settle(), Duration::from_millis(1500));
        let drawn: usize = config.stimuli.categories.iter().map(|c| c.draw).sum();
        assert_eq!(drawn, 2 * config.block_trials);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ExperimentConfig::from_json(
            r#"{"block_trials": 4, "advance": "await_next",
                "presentation": {"dimension": "complexity"}}"#,
        )
        .unwrap();
        assert_eq!(config.block_trials, 4);
        assert_eq!(config.practice_trials, 5);
        assert_eq!(config.advance, AdvancePolicy::AwaitNext);
        assert_eq!(config.presentation.dimension, "complexity");
        assert_eq!(config.rating_scale, RatingScale::default());
    }

    #[test]
    fn labels_follow_the_dimension() {
        let p = PresentationConfig::for_dimension("complexity");
        assert_eq!(p.high_label, "very complex");
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let mut config = ExperimentConfig::default();
        config.rating_scale = RatingScale { min: 5, max: 1 };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyScale { .. })));

        let mut config = ExperimentConfig::default();
        config.practice_trials = 0;
        config.block_trials = 0;
        assert!(matches!(config.validate(), Err(ConfigError::EmptyRun)));

        let mut config = ExperimentConfig::default();
        config.presentation.key_bindings.insert("q".into(), 10);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BindingOutOfScale { value: 10, .. })
        ));

        assert!(matches!(
            ExperimentConfig::from_json("{\"practice_trials\": -1}"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn overflowing_run_length_is_rejected() {
        let json = format!(r#"{{"block_trials": {}}}"#, usize::MAX);
        assert!(matches!(
            ExperimentConfig::from_json(&json),
            Err(ConfigError::PartitionTooLarge { practice: 5, block: usize::MAX })
        ));

        let mut config = ExperimentConfig::default();
        config.practice_trials = usize::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PartitionTooLarge { .. })
        ));
    }
}
