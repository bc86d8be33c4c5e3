use likert_core::ResultSnapshot;
use likert_experiment::{GatewayError, SubmissionGateway};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// Writes the snapshot as pretty JSON to a file
#[derive(Debug, Clone)]
pub struct JsonFileSubmission {
    path: PathBuf,
}

impl JsonFileSubmission {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SubmissionGateway for JsonFileSubmission {
    fn submit(&mut self, snapshot: &ResultSnapshot) -> Result<(), GatewayError> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;
        info!(path = %self.path.display(), "results saved");
        Ok(())
    }
}
