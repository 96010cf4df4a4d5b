use crate::config::GridMassConfig;
use serde::Serialize;

/// Scan based tolerances derived from the configuration and the
/// retention times of the selected scans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunGeometry {
    pub num_scans: usize,
    /// Average retention time step between scans.
    pub rt_per_scan: f64,
    /// Minimum peak span, in scans.
    pub tol_scans: usize,
    /// Maximum peak span, in scans.
    pub max_tol_scans: usize,
    /// Largest gap (in scans) between two clusters that can still be joined.
    pub critic_scans: usize,
    /// Grid spacing along the mass axis.
    pub by_mz: f64,
    /// Grid spacing along the scan axis.
    pub by_scan: usize,
    pub mz_radius: f64,
    pub scan_radius: usize,
}

fn span_in_scans(span: f64, rt_per_scan: f64) -> usize {
    let scans = if rt_per_scan > 0.0 {
        // `as` saturates, huge spans just become usize::MAX
        (span / rt_per_scan).floor() as usize
    } else {
        0
    };
    scans.max(2)
}

impl RunGeometry {
    pub fn new(retention_times: &[f64], config: &GridMassConfig) -> Self {
        let num_scans = retention_times.len();
        let (min_rt, max_rt) = retention_times
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &rt| {
                (lo.min(rt), hi.max(rt))
            });
        let rt_per_scan = if num_scans > 0 && max_rt > min_rt {
            (max_rt - min_rt) / num_scans as f64
        } else {
            0.0
        };

        let tol_scans = span_in_scans(config.min_time_span, rt_per_scan);
        let max_tol_scans = span_in_scans(config.max_time_span, rt_per_scan);
        let by_mz = (2.0 * config.mz_tolerance).max(1e-6);
        let by_scan = (tol_scans / 4).max(1);

        Self {
            num_scans,
            rt_per_scan,
            tol_scans,
            max_tol_scans,
            critic_scans: (tol_scans / 2).max(1),
            by_mz,
            by_scan,
            mz_radius: by_mz / 2.0,
            scan_radius: by_scan.saturating_sub(1).max(2),
        }
    }

    /// Time covered by `scans` consecutive scans.
    pub fn scans_to_time(&self, scans: usize) -> f64 {
        scans as f64 * self.rt_per_scan
    }
}
