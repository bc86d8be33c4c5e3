pub mod config;
pub mod error;
pub mod gateway;
pub mod provider;
pub mod queue;
pub mod recorder;
pub mod resolver;
pub mod session;
pub mod state;

pub use config::{AdvancePolicy, ExperimentConfig, PresentationConfig, StimuliConfig, StimulusCategory};
pub use error::{ConfigError, GatewayError, ProviderError, SequencerError, SessionError};
pub use gateway::{PresentationGateway, StimulusProvider, SubmissionGateway};
pub use provider::{CategoryStimulusProvider, FixedStimulusProvider, parse_exclusions};
pub use queue::TrialQueue;
pub use recorder::ResponseRecorder;
pub use resolver::{PhaseResolver, PhaseState, Placement, Resolution};
pub use session::Session;
pub use state::{Sequencer, SequencerState, Step, TrialParams};
