use gridmass::{
    parse_time_ranges,
    GridMassConfig,
    ScanSelection,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};

use crate::cli::DetectArgs;
use crate::error::CliError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub analysis: GridMassConfig,
    #[serde(default)]
    pub selection: ScanSelection,
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let config: Config = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        Ok(config)
    }

    /// Applies the command line overrides and validates the result.
    pub fn with_cli_args(mut self, args: &DetectArgs) -> Result<Self, CliError> {
        if let Some(ignore_times) = args.ignore_times.as_deref() {
            self.analysis.ignore_times = parse_time_ranges(ignore_times)?;
        }
        if let Some(ms_level) = args.ms_level {
            self.selection.ms_level = Some(ms_level);
        }
        if let Some(output_dir) = args.output_dir.as_ref() {
            self.output = Some(OutputConfig {
                directory: output_dir.clone(),
            });
        }
        if self.output.is_none() {
            return Err(CliError::MissingOutput);
        }
        self.analysis.validate()?;
        Ok(self)
    }

    pub fn output_directory(&self) -> Result<&Path, CliError> {
        self.output
            .as_ref()
            .map(|x| x.directory.as_path())
            .ok_or(CliError::MissingOutput)
    }
}
