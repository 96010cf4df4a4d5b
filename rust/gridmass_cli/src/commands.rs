use std::time::Instant;
use tracing::{
    info,
    instrument,
};

use crate::cli::{
    DetectArgs,
    WriteTemplateArgs,
};
use crate::config::Config;
use crate::error::CliError;
use crate::processing::process_files;

/// Main function for the 'detect' subcommand.
#[instrument]
pub fn main_detect(args: DetectArgs) -> Result<(), CliError> {
    let config = Config::from_file(&args.config)?.with_cli_args(&args)?;
    info!("Using configuration: {:#?}", config);

    let st = Instant::now();
    let written = process_files(&args.input, &config, args.format)?;
    for path in written.iter() {
        println!("Wrote {}", path.display());
    }
    println!(
        "Processed {} files in {:#?}",
        written.len(),
        st.elapsed()
    );
    Ok(())
}

pub(crate) const CONFIG_TEMPLATE: &str = r#"{
  "analysis": {
    "min_height": 1000.0,
    "mz_tolerance": 0.005,
    "min_time_span": 0.1,
    "max_time_span": 3.0,
    "smoothing_time_span": 0.0,
    "smoothing_mz_tolerance": 0.0,
    "intensity_similarity": 0.5,
    "ignore_times": []
  },
  "selection": {
    "ms_level": 1,
    "rt_range": null,
    "scan_number_range": null
  },
  "output": { "directory": "gridmass_output" }
}"#;

pub(crate) const SCANS_TEMPLATE: &str = r#"{
  "scans": [
    { "scan_number": 1, "ms_level": 1, "rt": 0.00, "mz": [150.05, 300.1], "intensity": [1500.0, 2000.0] },
    { "scan_number": 2, "ms_level": 1, "rt": 0.05, "mz": [150.05, 300.1], "intensity": [3000.0, 5000.0] },
    { "scan_number": 3, "ms_level": 2, "rt": 0.07, "mz": [120.2], "intensity": [90000.0] },
    { "scan_number": 4, "ms_level": 1, "rt": 0.10, "mz": [150.05, 300.1], "intensity": [6000.0, 9000.0] },
    { "scan_number": 5, "ms_level": 1, "rt": 0.15, "mz": [150.05, 300.1], "intensity": [8000.0, 12000.0] },
    { "scan_number": 6, "ms_level": 1, "rt": 0.20, "mz": [150.05, 300.1], "intensity": [6000.0, 9000.0] },
    { "scan_number": 7, "ms_level": 1, "rt": 0.25, "mz": [150.05, 300.1], "intensity": [3000.0, 5000.0] },
    { "scan_number": 8, "ms_level": 1, "rt": 0.30, "mz": [150.05, 300.1], "intensity": [1500.0, 2000.0] },
    { "scan_number": 9, "ms_level": 1, "rt": 0.35, "mz": [150.05, 300.1], "intensity": [500.0, 1100.0] }
  ]
}"#;

/// Main function for the 'write-template' subcommand.
pub fn main_write_template(args: WriteTemplateArgs) -> Result<(), CliError> {
    let target_dir = args.output_dir;
    std::fs::create_dir_all(&target_dir)?;

    let config_path = target_dir.join("gridmass_config_template.json");
    let scans_path = target_dir.join("scans_template.json");
    std::fs::write(&config_path, CONFIG_TEMPLATE)?;
    std::fs::write(&scans_path, SCANS_TEMPLATE)?;
    println!(
        "Wrote templates to:\n- {}\n- {}",
        config_path.display(),
        scans_path.display()
    );
    Ok(())
}
