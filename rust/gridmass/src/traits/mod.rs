pub mod scan_source;

pub use scan_source::{
    validate_source,
    ScanSource,
};
