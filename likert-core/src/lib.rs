pub mod phase;
pub mod result;
pub mod stimulus;
pub mod trial;

pub use phase::{PauseKind, Phase};
pub use result::{BlockSummary, Demographics, FormField, ResultEntry, ResultSet, ResultSnapshot};
pub use stimulus::{Partition, SequenceError, StimulusId, StimulusSequence};
pub use trial::{MalformedRating, Rating, RatingScale, Response, ResponseRecord};
