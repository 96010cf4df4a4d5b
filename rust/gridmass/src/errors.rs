use thiserror::Error;

/// Fatal errors of a detection run.
///
/// Heuristic rejections (too long, too discontinuous, no area) are not
/// errors, and neither is cancellation (see [crate::RunOutcome]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridMassError {
    #[error("No scans match the selected criteria")]
    NoScans,

    #[error(
        "Retention time of scan #{scan_number} ({rt}) is smaller than the retention time of the previous scan ({previous_rt}). \
         Only scans with increasing retention times can be used; restrict the scan selection or crop the data"
    )]
    UnorderedRetentionTimes {
        scan_number: u32,
        rt: f64,
        previous_rt: f64,
    },

    #[error("Scan #{scan_number} is not usable: {defect}")]
    InvalidScan {
        scan_number: u32,
        defect: ScanDefect,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanDefect {
    #[error("retention time is not finite")]
    NonFiniteRetentionTime,
    #[error("{mz} masses but {intensity} intensities")]
    LengthMismatch { mz: usize, intensity: usize },
    #[error("masses are not sorted ascending (position {position})")]
    UnsortedMasses { position: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("`{field}` must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("`{field}` must be strictly positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("minimum time span ({min}) is larger than the maximum time span ({max})")]
    InvertedTimeSpan { min: f64, max: f64 },

    #[error("intensity similarity must be within [0, 1], got {0}")]
    SimilarityOutOfRange(f64),

    #[error(transparent)]
    TimeRange(#[from] TimeRangeError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeRangeError {
    #[error("Expected the start of the range to be <= its end, got ({0}, {1})")]
    Inverted(f64, f64),

    #[error("Time range bounds must be finite, got ({0}, {1})")]
    NonFinite(f64, f64),

    #[error("Unable to parse time range '{0}', expected the form 'start-end'")]
    Unparseable(String),
}
