use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("outcome file parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("outcome file contains no outcomes")]
    NoOutcomes,
    #[error("telemetry sink error: {0}")]
    Telemetry(#[from] crate::telemetry::TelemetryError),
}
