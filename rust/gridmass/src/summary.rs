use crate::models::RunGeometry;
use serde::Serialize;
use std::fmt::Display;

/// Counters collected along a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub geometry: RunGeometry,
    pub scans_used: usize,
    pub scans_excluded: usize,
    pub samples_kept: usize,
    pub samples_dropped: usize,
    pub probes_generated: usize,
    pub probes_converged: usize,
    pub clusters_built: usize,
    pub joins: usize,
    pub clusters_cleared_by_span: usize,
    pub rejected_by_time_span: usize,
    pub rejected_by_continuity: usize,
    pub rejected_by_area: usize,
    pub features: usize,
}

impl RunSummary {
    pub(crate) fn new(geometry: RunGeometry) -> Self {
        Self {
            geometry,
            scans_used: geometry.num_scans,
            scans_excluded: 0,
            samples_kept: 0,
            samples_dropped: 0,
            probes_generated: 0,
            probes_converged: 0,
            clusters_built: 0,
            joins: 0,
            clusters_cleared_by_span: 0,
            rejected_by_time_span: 0,
            rejected_by_continuity: 0,
            rejected_by_area: 0,
            features: 0,
        }
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Scans: {} ({} excluded by time)",
            self.scans_used, self.scans_excluded
        )?;
        writeln!(
            f,
            "Tolerable scans: min {}, max {} ({:.4} per scan)",
            self.geometry.tol_scans, self.geometry.max_tol_scans, self.geometry.rt_per_scan
        )?;
        let total = self.samples_kept + self.samples_dropped;
        let pct = if total > 0 {
            self.samples_kept as f64 * 100.0 / total as f64
        } else {
            0.0
        };
        writeln!(
            f,
            "Intensities above threshold: {} of {} ({:.2}%)",
            self.samples_kept, total, pct
        )?;
        writeln!(
            f,
            "Probes: {} ({} reached a maximum)",
            self.probes_generated, self.probes_converged
        )?;
        writeln!(f, "Spots: {}", self.clusters_built)?;
        writeln!(f, "Joins: {}", self.joins)?;
        writeln!(
            f,
            "Removed by time span: {}",
            self.clusters_cleared_by_span
        )?;
        writeln!(
            f,
            "Ignored: time range {}, continuity {}, area {}",
            self.rejected_by_time_span, self.rejected_by_continuity, self.rejected_by_area
        )?;
        writeln!(f, "Peaks: {}", self.features)?;
        Ok(())
    }
}
