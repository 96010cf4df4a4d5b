use gridmass::{
    ConfigError,
    GridMassError,
    TimeRangeError,
};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid ignored time ranges: {0}")]
    TimeRanges(#[from] TimeRangeError),

    #[error("No output directory provided, set one in the config file or with --output-dir")]
    MissingOutput,

    #[error("Detection failed for {}: {source}", .path.display())]
    Detection {
        path: PathBuf,
        #[source]
        source: GridMassError,
    },

    #[error("Detection was cancelled for {}", .0.display())]
    Cancelled(PathBuf),

    #[error("{failed} of {total} input files failed")]
    FailedInputs { failed: usize, total: usize },

    #[error("Invalid progress bar template: {0}")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),

    #[error("Unable to set up logging: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),
}
