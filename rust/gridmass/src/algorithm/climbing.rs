use super::grid::ProbeGrid;
use crate::control::{
    Cancelled,
    RunControl,
    Stage,
    POLL_INTERVAL,
};
use crate::models::{
    ConvergedProbe,
    RunGeometry,
    SampleArena,
    SampleRef,
    Summit,
};
use tracing::info;

/// Greedy ascent over the samples of a run.
///
/// Both the probe climbing stage and the resolution of contested samples
/// go through [HillClimber::converge], which only depends on the arena.
#[derive(Debug, Clone, Copy)]
pub struct HillClimber<'a> {
    arena: &'a SampleArena,
    scan_radius: usize,
    mz_radius: f64,
}

impl<'a> HillClimber<'a> {
    pub fn new(arena: &'a SampleArena, scan_radius: usize, mz_radius: f64) -> Self {
        Self {
            arena,
            scan_radius,
            mz_radius,
        }
    }

    pub fn from_geometry(arena: &'a SampleArena, geometry: &RunGeometry) -> Self {
        Self::new(arena, geometry.scan_radius, geometry.mz_radius)
    }

    /// Most intense sample in the window centered on `(mz, scan)`.
    ///
    /// Scans are visited in ascending order and masses ascending within a
    /// scan; the first maximum found wins ties.
    pub fn window_max(&self, mz: f64, scan: usize) -> Option<SampleRef> {
        let num_scans = self.arena.num_scans();
        if num_scans == 0 {
            return None;
        }
        let first = scan.saturating_sub(self.scan_radius);
        let last = scan.saturating_add(self.scan_radius).min(num_scans - 1);
        let mut best: Option<(SampleRef, f64)> = None;
        for s in first..=last {
            for sample in self.arena.window(s, mz - self.mz_radius, mz + self.mz_radius) {
                let intensity = self.arena.get(sample).intensity;
                match best {
                    Some((_, best_intensity)) if intensity <= best_intensity => {}
                    _ => best = Some((sample, intensity)),
                }
            }
        }
        best.map(|(sample, _)| sample)
    }

    /// Moves from `(mz, scan)` to the window maximum until no strictly more
    /// intense sample is found.
    ///
    /// Returns `None` when the starting window is empty or its maximum is
    /// not positive.
    pub fn converge(&self, mz: f64, scan: usize) -> Option<Summit> {
        let mut current: Option<Summit> = None;
        let (mut mz, mut scan) = (mz, scan);
        while let Some(best) = self.window_max(mz, scan) {
            let sample = self.arena.get(best);
            if sample.intensity <= 0.0 {
                break;
            }
            if let Some(summit) = current {
                if sample.intensity <= summit.intensity {
                    break;
                }
            }
            current = Some(Summit {
                sample: best,
                mz: sample.mz,
                scan: sample.scan,
                intensity: sample.intensity,
            });
            mz = sample.mz;
            scan = sample.scan;
        }
        current
    }
}

/// Probes pulled from the grid and the ones that reached a summit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClimbResult {
    pub generated: usize,
    pub converged: Vec<ConvergedProbe>,
}

/// Climbs every probe of the grid, keeping the ones that reach at least
/// `min_height`.
pub(crate) fn climb_probes(
    climber: &HillClimber,
    mut grid: ProbeGrid,
    min_height: f64,
    control: &RunControl,
) -> Result<ClimbResult, Cancelled> {
    info!(
        "Finding local maxima for each probe, radius: scans={}, m/z={:.6}",
        climber.scan_radius, climber.mz_radius
    );
    let num_rows = grid.num_rows();
    let mut generated = 0usize;
    let mut converged = Vec::new();
    while let Some(probe) = grid.next() {
        if generated % POLL_INTERVAL == 0 {
            control.checkpoint()?;
            control.report(Stage::HillClimbing, grid.rows_done(), num_rows);
        }
        generated += 1;
        let Some(summit) = climber.converge(probe.origin_mz, probe.origin_scan) else {
            continue;
        };
        if summit.intensity >= min_height {
            converged.push(ConvergedProbe { probe, summit });
        }
    }
    control.complete(Stage::HillClimbing);
    info!(
        "Probes reaching a maximum: {} of {}",
        converged.len(),
        generated
    );
    Ok(ClimbResult {
        generated,
        converged,
    })
}
