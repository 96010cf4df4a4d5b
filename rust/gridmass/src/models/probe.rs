use super::sample::SampleRef;
use serde::Serialize;

/// A search seed laid on the (mass, scan) grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub origin_mz: f64,
    pub origin_scan: usize,
}

/// Local maximum a climb ended on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summit {
    pub sample: SampleRef,
    pub mz: f64,
    pub scan: usize,
    pub intensity: f64,
}

impl Summit {
    /// Ordering used to group probes: mass, then scan, then sample.
    pub fn sort_key_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.mz
            .total_cmp(&other.mz)
            .then(self.scan.cmp(&other.scan))
            .then(self.sample.cmp(&other.sample))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergedProbe {
    pub probe: Probe,
    pub summit: Summit,
}
