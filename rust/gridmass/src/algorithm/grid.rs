use crate::control::{
    Cancelled,
    RunControl,
    Stage,
};
use crate::models::{
    Probe,
    RunGeometry,
};
use tracing::info;

/// Probes every `by_scan` scans and every `by_mz` over `[mz_min, mz_max]`,
/// produced lazily in row order.
///
/// Odd rows start half a step lower so neighbouring rows interleave. The
/// grid is never materialized, only the probes that reach a summit are kept.
#[derive(Debug, Clone)]
pub(crate) struct ProbeGrid {
    mz_min: f64,
    mz_max: f64,
    by_mz: f64,
    by_scan: usize,
    num_rows: usize,
    row: usize,
    // positions are start + k * by_mz, no accumulated error
    k: u64,
}

impl ProbeGrid {
    pub fn new(mass_range: Option<(f64, f64)>, geometry: &RunGeometry) -> Self {
        Self::from_steps(
            mass_range,
            geometry.num_scans,
            geometry.by_mz,
            geometry.by_scan,
        )
    }

    pub fn from_steps(
        mass_range: Option<(f64, f64)>,
        num_scans: usize,
        by_mz: f64,
        by_scan: usize,
    ) -> Self {
        let by_scan = by_scan.max(1);
        let (mz_min, mz_max, num_rows) = match mass_range {
            Some((low, high)) => (low, high, num_scans.div_ceil(by_scan)),
            None => (0.0, 0.0, 0),
        };
        Self {
            mz_min,
            mz_max,
            by_mz,
            by_scan,
            num_rows,
            row: 0,
            k: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Rows fully produced so far.
    pub fn rows_done(&self) -> usize {
        self.row
    }

    fn row_start(&self) -> f64 {
        if self.row % 2 == 1 {
            self.mz_min - self.by_mz / 2.0
        } else {
            self.mz_min
        }
    }
}

impl Iterator for ProbeGrid {
    type Item = Probe;

    fn next(&mut self) -> Option<Probe> {
        while self.row < self.num_rows {
            let origin_mz = self.row_start() + self.k as f64 * self.by_mz;
            if origin_mz <= self.mz_max {
                self.k += 1;
                return Some(Probe {
                    origin_mz,
                    origin_scan: self.row * self.by_scan,
                });
            }
            self.row += 1;
            self.k = 0;
        }
        None
    }
}

/// Sets up the probe grid over the mass range of the kept samples.
pub(crate) fn probe_grid(
    mass_range: Option<(f64, f64)>,
    geometry: &RunGeometry,
    control: &RunControl,
) -> Result<ProbeGrid, Cancelled> {
    control.checkpoint()?;
    let grid = ProbeGrid::new(mass_range, geometry);
    match mass_range {
        Some((mz_min, mz_max)) => info!(
            "Creating grid of probes every {:.6} m/z and {} scans ({} rows over {:.4}..{:.4} m/z)",
            geometry.by_mz,
            geometry.by_scan,
            grid.num_rows(),
            mz_min,
            mz_max
        ),
        None => info!("No samples left, empty probe grid"),
    }
    control.complete(Stage::ProbeGrid);
    Ok(grid)
}
