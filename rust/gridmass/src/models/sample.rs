use crate::utils::range_by_key;
use std::ops::Range;

/// Position of a [Sample] inside its [SampleArena].
pub type SampleRef = usize;

/// A (smoothed) data point that passed the height threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Position of the scan in the run.
    pub scan: usize,
    pub mz: f64,
    pub intensity: f64,
    pub raw_mz: f64,
    pub raw_intensity: f64,
    /// Index of the raw point inside its scan.
    pub raw_index: usize,
}

/// All samples of a run, grouped by scan and sorted by mass within a scan.
///
/// Samples are stored contiguously so a [SampleRef] is enough to address
/// one, and ownership can be tracked in flat tables indexed by it.
#[derive(Debug, Clone, Default)]
pub struct SampleArena {
    samples: Vec<Sample>,
    // scan `i` spans samples[offsets[i]..offsets[i + 1]]
    offsets: Vec<usize>,
}

impl SampleArena {
    /// Every inner vector must already be sorted by mass.
    pub fn from_scans(per_scan: Vec<Vec<Sample>>) -> Self {
        let total = per_scan.iter().map(|s| s.len()).sum();
        let mut samples = Vec::with_capacity(total);
        let mut offsets = Vec::with_capacity(per_scan.len() + 1);
        offsets.push(0);
        for scan_samples in per_scan {
            debug_assert!(scan_samples.windows(2).all(|w| w[0].mz <= w[1].mz));
            samples.extend(scan_samples);
            offsets.push(samples.len());
        }
        Self { samples, offsets }
    }

    pub fn num_scans(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, sample: SampleRef) -> &Sample {
        &self.samples[sample]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn scan_range(&self, scan: usize) -> Range<SampleRef> {
        self.offsets[scan]..self.offsets[scan + 1]
    }

    pub fn scan(&self, scan: usize) -> &[Sample] {
        &self.samples[self.scan_range(scan)]
    }

    /// Samples of `scan` with mass within the closed interval `[low, high]`.
    pub fn window(&self, scan: usize, low: f64, high: f64) -> Range<SampleRef> {
        let offset = self.offsets[scan];
        let local = range_by_key(self.scan(scan), low, high, |s| s.mz);
        (local.start + offset)..(local.end + offset)
    }

    /// Lowest and highest mass over all samples.
    pub fn mass_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for scan in 0..self.num_scans() {
            let samples = self.scan(scan);
            let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
                continue;
            };
            range = Some(match range {
                None => (first.mz, last.mz),
                Some((lo, hi)) => (lo.min(first.mz), hi.max(last.mz)),
            });
        }
        range
    }
}
