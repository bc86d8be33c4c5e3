use crate::stimulus::StimulusId;
use crate::trial::ResponseRecord;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// One `name`/`value` pair of a serialized form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Demographic survey payload. Unparseable payloads are kept verbatim.
///
/// On the wire this is always a JSON-encoded string (or `null` when missing),
/// which downstream analysis decodes a second time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Demographics {
    Fields(Vec<FormField>),
    Raw(String),
    Missing,
}

impl Demographics {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Demographics::Missing;
        }
        match serde_json::from_str::<Vec<FormField>>(raw) {
            Ok(fields) => Demographics::Fields(fields),
            Err(_) => Demographics::Raw(raw.to_string()),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            Demographics::Fields(fields) => fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.value.as_str()),
            _ => None,
        }
    }
}

impl Serialize for Demographics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Demographics::Fields(fields) => {
                let encoded = serde_json::to_string(fields).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&encoded)
            }
            Demographics::Raw(raw) => serializer.serialize_str(raw),
            Demographics::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Demographics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            Some(raw) => Demographics::parse(&raw),
            None => Demographics::Missing,
        })
    }
}

/// Trial records keyed by trial index, plus the reserved demographics slot.
/// Keeps first-insertion order; a re-recorded trial replaces its record in place.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<ResponseRecord>,
    slots: HashMap<usize, usize>,
    demographics: Option<Demographics>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record that was replaced, if any
    pub fn insert(&mut self, record: ResponseRecord) -> Option<ResponseRecord> {
        match self.slots.get(&record.trial_index) {
            Some(&slot) => Some(std::mem::replace(&mut self.records[slot], record)),
            None => {
                self.slots.insert(record.trial_index, self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn set_demographics(&mut self, demographics: Demographics) -> Option<Demographics> {
        self.demographics.replace(demographics)
    }

    pub fn get(&self, trial_index: usize) -> Option<&ResponseRecord> {
        self.slots.get(&trial_index).map(|&slot| &self.records[slot])
    }

    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    pub fn demographics(&self) -> Option<&Demographics> {
        self.demographics.as_ref()
    }

    pub fn trial_count(&self) -> usize {
        self.records.len()
    }

    /// Trial records plus the demographics entry when present
    pub fn len(&self) -> usize {
        self.records.len() + usize::from(self.demographics.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self, image_order: Vec<StimulusId>, experiment_type: &str) -> ResultSnapshot {
        let mut data: Vec<ResultEntry> = self
            .records
            .iter()
            .cloned()
            .map(ResultEntry::Trial)
            .collect();
        if let Some(demographics) = &self.demographics {
            data.push(ResultEntry::Demographics {
                demographics: demographics.clone(),
            });
        }
        ResultSnapshot {
            data,
            image_order,
            experiment_type: experiment_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultEntry {
    Trial(ResponseRecord),
    Demographics { demographics: Demographics },
}

/// Immutable, serializable copy of a run's results handed to submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSnapshot {
    pub data: Vec<ResultEntry>,
    #[serde(rename = "imageOrder")]
    pub image_order: Vec<StimulusId>,
    #[serde(rename = "experimentType")]
    pub experiment_type: String,
}

/// Rated/unrated counts and mean score for one block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSummary {
    pub block_number: u8,
    pub rated: usize,
    pub unrated: usize,
    pub mean: Option<f64>,
}

impl ResultSnapshot {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &ResponseRecord> {
        self.data.iter().filter_map(|entry| match entry {
            ResultEntry::Trial(record) => Some(record),
            ResultEntry::Demographics { .. } => None,
        })
    }

    pub fn record(&self, trial_index: usize) -> Option<&ResponseRecord> {
        self.records().find(|r| r.trial_index == trial_index)
    }

    pub fn demographics(&self) -> Option<&Demographics> {
        self.data.iter().find_map(|entry| match entry {
            ResultEntry::Demographics { demographics } => Some(demographics),
            ResultEntry::Trial(_) => None,
        })
    }

    /// Per-block summary in block order; blocks without records are omitted
    pub fn summary(&self) -> Vec<BlockSummary> {
        let mut blocks: Vec<BlockSummary> = Vec::new();
        let mut sums: Vec<u64> = Vec::new();
        for record in self.records() {
            let pos = match blocks
                .iter()
                .position(|b| b.block_number == record.block_number)
            {
                Some(pos) => pos,
                None => {
                    blocks.push(BlockSummary {
                        block_number: record.block_number,
                        rated: 0,
                        unrated: 0,
                        mean: None,
                    });
                    sums.push(0);
                    blocks.len() - 1
                }
            };
            match record.rating.value() {
                Some(score) => {
                    blocks[pos].rated += 1;
                    sums[pos] += u64::from(score);
                }
                None => blocks[pos].unrated += 1,
            }
        }
        for (block, sum) in blocks.iter_mut().zip(sums) {
            if block.rated > 0 {
                block.mean = Some(sum as f64 / block.rated as f64);
            }
        }
        blocks.sort_by_key(|b| b.block_number);
        blocks
    }
}
