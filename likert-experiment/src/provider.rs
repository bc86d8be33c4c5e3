use crate::config::StimuliConfig;
use crate::error::ProviderError;
use crate::gateway::StimulusProvider;
use likert_core::{Partition, StimulusSequence};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::BufRead;
use tracing::{debug, warn};

/// A stimulus list decided ahead of time, one path per line
#[derive(Debug, Clone)]
pub struct FixedStimulusProvider {
    paths: Vec<String>,
}

impl FixedStimulusProvider {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    /// Blank lines and `#` comments are skipped
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ProviderError> {
        let mut paths = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            paths.push(line.to_string());
        }
        Ok(Self { paths })
    }
}

impl StimulusProvider for FixedStimulusProvider {
    fn provide(&mut self, partition: Partition) -> Result<StimulusSequence, ProviderError> {
        Ok(StimulusSequence::new(&self.paths, partition)?)
    }
}

/// Practice images in fixed order, then a shuffled draw across categories.
///
/// Each category contributes `draw` images sampled without replacement from
/// `0..pool`, skipping excluded numbers.
pub struct CategoryStimulusProvider<R: Rng> {
    config: StimuliConfig,
    rng: R,
}

impl<R: Rng> CategoryStimulusProvider<R> {
    pub fn new(config: StimuliConfig, rng: R) -> Self {
        Self { config, rng }
    }

    fn path(&self, category: &str, number: u32) -> String {
        format!(
            "{}/{}/{}.{}",
            self.config.root.trim_end_matches('/'),
            category,
            number,
            self.config.extension
        )
    }

    fn draw_category(&mut self, name: &str, pool: u32, draw: usize) -> Result<Vec<String>, ProviderError> {
        let excluded = self.config.exclusions.get(name);
        let mut eligible: Vec<u32> = (0..pool)
            .filter(|n| excluded.is_none_or(|ex| !ex.contains(n)))
            .collect();
        if eligible.len() < draw {
            return Err(ProviderError::NotEnoughStimuli {
                category: name.to_string(),
                needed: draw,
                available: eligible.len(),
            });
        }
        eligible.shuffle(&mut self.rng);
        eligible.truncate(draw);
        debug!(category = name, drawn = ?eligible, "drew stimuli");
        Ok(eligible.into_iter().map(|n| self.path(name, n)).collect())
    }
}

impl<R: Rng> StimulusProvider for CategoryStimulusProvider<R> {
    fn provide(&mut self, partition: Partition) -> Result<StimulusSequence, ProviderError> {
        let needed = partition.block.saturating_mul(2);
        let drawn = self
            .config
            .categories
            .iter()
            .fold(0usize, |sum, c| sum.saturating_add(c.draw));
        if drawn != needed {
            return Err(ProviderError::DrawMismatch { drawn, needed });
        }

        let practice = u32::try_from(partition.practice)
            .map_err(|_| ProviderError::PracticeTooLarge(partition.practice))?;
        let practice_category = self.config.practice_category.clone();
        let mut paths: Vec<String> = (0..practice)
            .map(|n| self.path(&practice_category, n))
            .collect();

        let mut trials = Vec::with_capacity(needed);
        for category in self.config.categories.clone() {
            trials.extend(self.draw_category(&category.name, category.pool, category.draw)?);
        }
        trials.shuffle(&mut self.rng);
        paths.extend(trials);

        Ok(StimulusSequence::new(paths, partition)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageNumber {
    Number(u32),
    Text(String),
}

/// Parse an exclusion file: category name to image numbers, given as
/// integers or numeric strings. Unparsable entries are skipped.
pub fn parse_exclusions(json: &str) -> Result<BTreeMap<String, Vec<u32>>, serde_json::Error> {
    let raw: BTreeMap<String, Vec<ImageNumber>> = serde_json::from_str(json)?;
    let mut exclusions = BTreeMap::new();
    for (category, entries) in raw {
        let mut numbers = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                ImageNumber::Number(n) => numbers.push(n),
                ImageNumber::Text(text) => match text.trim().parse() {
                    Ok(n) => numbers.push(n),
                    Err(_) => warn!(%category, entry = %text, "skipping unparsable exclusion"),
                },
            }
        }
        exclusions.insert(category, numbers);
    }
    Ok(exclusions)
}
