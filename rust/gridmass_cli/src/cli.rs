use clap::{
    Parser,
    Subcommand,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect chromatographic peaks in one or more scan files.
    Detect(DetectArgs),
    /// Write a template configuration and a small scans file.
    WriteTemplate(WriteTemplateArgs),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum SerializationFormat {
    Json,
    #[default]
    PrettyJson,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Scan files to process, each one is an independent run
    #[arg(short, long, num_args = 1.., required = true)]
    pub input: Vec<PathBuf>,

    /// Output directory (will over-write the config file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// The format to use for the output
    #[arg(short, long, default_value_t, value_enum)]
    pub format: SerializationFormat,

    /// Retention time intervals to skip, eg. "0-1.5, 30-35"
    /// (will over-write the config file)
    #[arg(long)]
    pub ignore_times: Option<String>,

    /// MS level of the scans to use (will over-write the config file)
    #[arg(long)]
    pub ms_level: Option<u8>,
}

#[derive(Parser, Debug)]
pub struct WriteTemplateArgs {
    /// The directory the templates are written to.
    #[arg(short, long)]
    pub output_dir: PathBuf,
}
