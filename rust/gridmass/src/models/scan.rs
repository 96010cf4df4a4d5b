use crate::config::TimeRange;
use crate::errors::GridMassError;
use crate::traits::ScanSource;
use serde::{
    Deserialize,
    Serialize,
};

fn default_ms_level() -> u8 {
    1
}

/// A centroided scan, masses sorted ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub scan_number: u32,
    #[serde(default = "default_ms_level")]
    pub ms_level: u8,
    pub rt: f64,
    pub mz: Vec<f64>,
    pub intensity: Vec<f64>,
}

impl Scan {
    pub fn new(scan_number: u32, rt: f64, mz: Vec<f64>, intensity: Vec<f64>) -> Self {
        Self {
            scan_number,
            ms_level: 1,
            rt,
            mz,
            intensity,
        }
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }
}

/// On-disk form of a raw acquisition, `{"scans": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanCollection {
    pub scans: Vec<Scan>,
}

impl ScanSource for [Scan] {
    fn num_scans(&self) -> usize {
        self.len()
    }

    fn retention_time(&self, idx: usize) -> f64 {
        self[idx].rt
    }

    fn peaks(&self, idx: usize) -> (&[f64], &[f64]) {
        (&self[idx].mz, &self[idx].intensity)
    }

    fn scan_number(&self, idx: usize) -> u32 {
        self[idx].scan_number
    }
}

impl ScanSource for Vec<Scan> {
    fn num_scans(&self) -> usize {
        self.as_slice().num_scans()
    }

    fn retention_time(&self, idx: usize) -> f64 {
        self.as_slice().retention_time(idx)
    }

    fn peaks(&self, idx: usize) -> (&[f64], &[f64]) {
        self.as_slice().peaks(idx)
    }

    fn scan_number(&self, idx: usize) -> u32 {
        self.as_slice().scan_number(idx)
    }
}

impl ScanSource for ScanCollection {
    fn num_scans(&self) -> usize {
        self.scans.num_scans()
    }

    fn retention_time(&self, idx: usize) -> f64 {
        self.scans.retention_time(idx)
    }

    fn peaks(&self, idx: usize) -> (&[f64], &[f64]) {
        self.scans.peaks(idx)
    }

    fn scan_number(&self, idx: usize) -> u32 {
        self.scans.scan_number(idx)
    }
}

/// Which scans of an acquisition a run uses.
///
/// `None` fields do not filter. The default keeps every MS1 scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSelection {
    #[serde(default = "ScanSelection::default_ms_level")]
    pub ms_level: Option<u8>,
    #[serde(default)]
    pub rt_range: Option<TimeRange>,
    /// Inclusive on both ends.
    #[serde(default)]
    pub scan_number_range: Option<(u32, u32)>,
}

impl Default for ScanSelection {
    fn default() -> Self {
        Self {
            ms_level: Self::default_ms_level(),
            rt_range: None,
            scan_number_range: None,
        }
    }
}

impl ScanSelection {
    fn default_ms_level() -> Option<u8> {
        Some(1)
    }

    pub fn matches(&self, scan: &Scan) -> bool {
        if let Some(level) = self.ms_level {
            if scan.ms_level != level {
                return false;
            }
        }
        if let Some(range) = &self.rt_range {
            if !range.contains(scan.rt) {
                return false;
            }
        }
        if let Some((first, last)) = self.scan_number_range {
            if scan.scan_number < first || scan.scan_number > last {
                return false;
            }
        }
        true
    }

    /// Errors with [GridMassError::NoScans] when nothing matches.
    pub fn apply<'a>(&self, scans: &'a [Scan]) -> Result<SelectedScans<'a>, GridMassError> {
        let scans: Vec<&'a Scan> = scans.iter().filter(|s| self.matches(s)).collect();
        if scans.is_empty() {
            return Err(GridMassError::NoScans);
        }
        Ok(SelectedScans { scans })
    }
}

/// Borrowed subset of scans picked by a [ScanSelection], in input order.
#[derive(Debug, Clone)]
pub struct SelectedScans<'a> {
    scans: Vec<&'a Scan>,
}

impl SelectedScans<'_> {
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }
}

impl ScanSource for SelectedScans<'_> {
    fn num_scans(&self) -> usize {
        self.scans.len()
    }

    fn retention_time(&self, idx: usize) -> f64 {
        self.scans[idx].rt
    }

    fn peaks(&self, idx: usize) -> (&[f64], &[f64]) {
        (&self.scans[idx].mz, &self.scans[idx].intensity)
    }

    fn scan_number(&self, idx: usize) -> u32 {
        self.scans[idx].scan_number
    }
}
