use crate::stimulus::StimulusId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive bounds of the rating scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: u8,
    pub max: u8,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1, max: 9 }
    }
}

impl RatingScale {
    pub fn contains(&self, value: i64) -> bool {
        value >= i64::from(self.min) && value <= i64::from(self.max)
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

/// A subject's rating, or none when no selection was made.
/// Serializes as an integer or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(Option<u8>);

impl Rating {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn score(value: u8) -> Self {
        Self(Some(value))
    }

    pub fn value(&self) -> Option<u8> {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }
}

/// What the presentation layer hands back after a trial
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Selected(i64),
    /// Unparsed input, e.g. a form value or a typed line
    Raw(String),
    NoSelection,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedRating {
    #[error("rating {value} outside scale {min}..={max}")]
    OutOfScale { value: i64, min: u8, max: u8 },
    #[error("rating `{0}` is not a number")]
    NotNumeric(String),
}

impl Response {
    pub fn is_no_selection(&self) -> bool {
        matches!(self, Response::NoSelection)
    }

    /// Resolve against the scale. Callers record `Rating::none()` on error.
    pub fn resolve(&self, scale: &RatingScale) -> Result<Rating, MalformedRating> {
        let value = match self {
            Response::NoSelection => return Ok(Rating::none()),
            Response::Selected(v) => *v,
            Response::Raw(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| MalformedRating::NotNumeric(raw.clone()))?,
        };
        if !scale.contains(value) {
            return Err(MalformedRating::OutOfScale {
                value,
                min: scale.min,
                max: scale.max,
            });
        }
        u8::try_from(value)
            .map(Rating::score)
            .map_err(|_| MalformedRating::OutOfScale {
                value,
                min: scale.min,
                max: scale.max,
            })
    }
}

/// One completed trial. Field names on the wire are the ones the analysis
/// scripts read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(rename = "score")]
    pub rating: Rating,
    #[serde(rename = "totalTrialNum")]
    pub trial_index: usize,
    #[serde(rename = "currentTrialNum")]
    pub within_block_position: usize,
    #[serde(rename = "imagePath")]
    pub stimulus_id: StimulusId,
    #[serde(rename = "partNum")]
    pub block_number: u8,
    #[serde(rename = "denom")]
    pub block_size: usize,
}
