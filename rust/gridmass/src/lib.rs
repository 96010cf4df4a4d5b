#![doc = include_str!("../README.md")]

pub mod algorithm;
pub mod config;
pub mod control;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod summary;
pub mod traits;
pub mod utils;

pub use config::{
    parse_time_ranges,
    GridMassConfig,
    TimeRange,
};
pub use control::{
    RunControl,
    Stage,
};
pub use errors::{
    ConfigError,
    GridMassError,
    ScanDefect,
    TimeRangeError,
};
pub use models::{
    Feature,
    FeaturePoint,
    Scan,
    ScanCollection,
    ScanSelection,
};
pub use pipeline::{
    Detection,
    GridMass,
    RunOutcome,
};
pub use summary::RunSummary;
pub use traits::ScanSource;
