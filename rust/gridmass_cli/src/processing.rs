use gridmass::{
    Feature,
    GridMass,
    GridMassConfig,
    GridMassError,
    RunControl,
    RunSummary,
    ScanCollection,
    ScanSelection,
};
use indicatif::{
    ParallelProgressIterator,
    ProgressStyle,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{
    BufReader,
    BufWriter,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::time::Instant;
use tracing::{
    error,
    info,
    instrument,
};

use crate::cli::SerializationFormat;
use crate::config::Config;
use crate::error::CliError;

/// Everything written for one input file.
#[derive(Debug, Serialize)]
pub struct FeatureListOutput<'a> {
    pub source: String,
    pub config: &'a GridMassConfig,
    pub selection: &'a ScanSelection,
    pub summary: &'a RunSummary,
    pub features: &'a [Feature],
}

pub fn read_scans(path: &Path) -> Result<ScanCollection, CliError> {
    let reader = BufReader::new(File::open(path)?);
    let scans: ScanCollection = serde_json::from_reader(reader)?;
    Ok(scans)
}

/// `<output_dir>/<input stem>.features.json`
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scans".to_string());
    output_dir.join(format!("{}.features.json", stem))
}

pub fn write_json<T: Serialize>(
    path: &Path,
    item: &T,
    format: SerializationFormat,
) -> Result<(), CliError> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        SerializationFormat::PrettyJson => serde_json::to_writer_pretty(&mut writer, item)?,
        SerializationFormat::Json => serde_json::to_writer(&mut writer, item)?,
    }
    writer.flush()?;
    Ok(())
}

/// Runs the detection on a single scans file and writes its feature list.
#[instrument(skip(config, format, output_dir))]
pub fn process_file(
    input: &Path,
    config: &Config,
    format: SerializationFormat,
    output_dir: &Path,
) -> Result<PathBuf, CliError> {
    let detection_error = |source: GridMassError| CliError::Detection {
        path: input.to_path_buf(),
        source,
    };

    let st = Instant::now();
    let collection = read_scans(input)?;
    let selected = config
        .selection
        .apply(&collection.scans)
        .map_err(detection_error)?;
    info!(
        "Using {} of {} scans from {} (loaded in {:?})",
        selected.len(),
        collection.scans.len(),
        input.display(),
        st.elapsed()
    );

    let detector = GridMass::new(config.analysis.clone()).map_err(detection_error)?;
    let detection = detector
        .run(&selected, &RunControl::new())
        .map_err(detection_error)?
        .into_detection()
        .ok_or_else(|| CliError::Cancelled(input.to_path_buf()))?;
    info!("Summary for {}:\n{}", input.display(), detection.summary);

    let out_path = output_path(output_dir, input);
    let output = FeatureListOutput {
        source: input.display().to_string(),
        config: &config.analysis,
        selection: &config.selection,
        summary: &detection.summary,
        features: &detection.features,
    };
    write_json(&out_path, &output, format)?;
    info!(
        "Wrote {} features to {} in {:?}",
        detection.features.len(),
        out_path.display(),
        st.elapsed()
    );
    Ok(out_path)
}

/// Processes every input independently, in parallel.
///
/// A failing input does not stop the others; the failures are logged and
/// reported together once all inputs are done.
pub fn process_files(
    inputs: &[PathBuf],
    config: &Config,
    format: SerializationFormat,
) -> Result<Vec<PathBuf>, CliError> {
    let output_dir = config.output_directory()?;
    std::fs::create_dir_all(output_dir)?;

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )?;
    let results: Vec<Result<PathBuf, CliError>> = inputs
        .par_iter()
        .progress_with_style(style)
        .map(|input| process_file(input, config, format, output_dir))
        .collect();

    let mut written = Vec::with_capacity(results.len());
    let mut failed = 0;
    for result in results {
        match result {
            Ok(path) => written.push(path),
            Err(e) => {
                error!("{}", e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        return Err(CliError::FailedInputs {
            failed,
            total: inputs.len(),
        });
    }
    Ok(written)
}
