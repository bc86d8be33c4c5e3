use likert_cache::{Atom, PathInterner};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Practice/block boundaries of a run. The run length is always `practice + 2 * block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub practice: usize,
    pub block: usize,
}

impl Partition {
    pub fn new(practice: usize, block: usize) -> Self {
        Self { practice, block }
    }

    /// Run length, or `None` when it does not fit in `usize`
    pub fn checked_total(&self) -> Option<usize> {
        self.block.checked_mul(2)?.checked_add(self.practice)
    }

    /// Run length, saturating at `usize::MAX`. Validated configs never saturate.
    pub fn total(&self) -> usize {
        self.checked_total().unwrap_or(usize::MAX)
    }

    /// Queue length at which practice is exhausted
    pub fn block1_boundary(&self) -> usize {
        self.total().saturating_sub(self.practice)
    }

    /// Queue length at which block 1 is exhausted
    pub fn block2_boundary(&self) -> usize {
        self.block1_boundary().saturating_sub(self.block)
    }
}

impl Default for Partition {
    fn default() -> Self {
        Self {
            practice: 5,
            block: 30,
        }
    }
}

/// Opaque stimulus reference, usually an image path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StimulusId(Atom);

impl StimulusId {
    pub fn new(path: &str) -> Self {
        Self(Atom::from(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StimulusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StimulusId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl Serialize for StimulusId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StimulusId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let path = String::deserialize(deserializer)?;
        Ok(Self::new(&path))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("stimulus sequence has {actual} entries, partition needs {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("stimulus `{path}` appears at positions {first} and {second}")]
    Duplicate {
        path: String,
        first: usize,
        second: usize,
    },
}

/// Ordered, deduplicated stimulus identifiers for one run, read-only once built.
#[derive(Debug, Clone)]
pub struct StimulusSequence {
    ids: Vec<StimulusId>,
    partition: Partition,
}

impl StimulusSequence {
    pub fn new<I, S>(paths: I, partition: Partition) -> Result<Self, SequenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut interner = PathInterner::new();
        let mut ids = Vec::new();
        for (pos, path) in paths.into_iter().enumerate() {
            let path = path.as_ref();
            let (first, is_new) = interner.intern(path);
            if !is_new {
                return Err(SequenceError::Duplicate {
                    path: path.to_string(),
                    first,
                    second: pos,
                });
            }
            ids.push(StimulusId::new(path));
        }
        if ids.len() != partition.total() {
            return Err(SequenceError::LengthMismatch {
                expected: partition.total(),
                actual: ids.len(),
            });
        }
        Ok(Self { ids, partition })
    }

    pub fn get(&self, index: usize) -> Option<&StimulusId> {
        self.ids.get(index)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn as_slice(&self) -> &[StimulusId] {
        &self.ids
    }
}
