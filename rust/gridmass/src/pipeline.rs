use crate::algorithm::assembly::assemble_features;
use crate::algorithm::climbing::{
    climb_probes,
    HillClimber,
};
use crate::algorithm::clustering::build_clusters;
use crate::algorithm::grid::probe_grid;
use crate::algorithm::merging::{
    filter_long_chains,
    merge_clusters,
};
use crate::algorithm::ownership::assign_samples;
use crate::algorithm::smoothing::{
    filter_samples,
    smooth_scans,
    SmoothingParams,
};
use crate::config::GridMassConfig;
use crate::control::{
    Cancelled,
    RunControl,
};
use crate::errors::GridMassError;
use crate::models::{
    Feature,
    RunGeometry,
};
use crate::summary::RunSummary;
use crate::traits::{
    validate_source,
    ScanSource,
};
use tracing::{
    info,
    instrument,
};

/// Features found by a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub features: Vec<Feature>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(Detection),
    /// The run noticed [RunControl::cancel] and stopped without features.
    Cancelled,
}

impl RunOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled)
    }

    pub fn into_detection(self) -> Option<Detection> {
        match self {
            RunOutcome::Completed(detection) => Some(detection),
            RunOutcome::Cancelled => None,
        }
    }
}

/// Grid based feature detector.
///
/// ```
/// use gridmass::{GridMass, GridMassConfig, RunControl, Scan};
///
/// let config = GridMassConfig {
///     min_height: 10.0,
///     mz_tolerance: 0.01,
///     min_time_span: 0.6,
///     max_time_span: 2.0,
///     smoothing_time_span: 0.0,
///     smoothing_mz_tolerance: 0.0,
///     intensity_similarity: 0.5,
///     ignore_times: vec![],
/// };
/// let scans: Vec<Scan> = (0..60)
///     .map(|i| {
///         let height = 1000.0 * (-((i as f64 - 15.0).powi(2)) / 12.5).exp();
///         let (mz, intensity) = if (10..=20).contains(&i) {
///             (vec![200.0], vec![height])
///         } else {
///             (vec![], vec![])
///         };
///         Scan::new(i, i as f64 * 0.1, mz, intensity)
///     })
///     .collect();
///
/// let detector = GridMass::new(config).unwrap();
/// let outcome = detector.run(&scans, &RunControl::new()).unwrap();
/// let detection = outcome.into_detection().unwrap();
/// assert_eq!(detection.features.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GridMass {
    config: GridMassConfig,
}

impl GridMass {
    pub fn new(config: GridMassConfig) -> Result<Self, GridMassError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GridMassConfig {
        &self.config
    }

    /// Detects the features of one acquisition.
    ///
    /// Fails when the scans break the [ScanSource] contract. Cancellation
    /// through `control` is reported as [RunOutcome::Cancelled].
    #[instrument(skip_all, fields(num_scans = source.num_scans()))]
    pub fn run<S: ScanSource + ?Sized>(
        &self,
        source: &S,
        control: &RunControl,
    ) -> Result<RunOutcome, GridMassError> {
        validate_source(source)?;
        match self.detect(source, control) {
            Ok(detection) => Ok(RunOutcome::Completed(detection)),
            Err(Cancelled) => {
                info!("Run cancelled");
                Ok(RunOutcome::Cancelled)
            }
        }
    }

    fn detect<S: ScanSource + ?Sized>(
        &self,
        source: &S,
        control: &RunControl,
    ) -> Result<Detection, Cancelled> {
        control.checkpoint()?;
        let config = &self.config;
        let num_scans = source.num_scans();
        let retention_times: Vec<f64> = (0..num_scans).map(|i| source.retention_time(i)).collect();
        let geometry = RunGeometry::new(&retention_times, config);
        let mut summary = RunSummary::new(geometry);
        info!(
            "Started GridMass on {} scans (rt per scan {:.5}, tolerable scans {}..{})",
            num_scans, geometry.rt_per_scan, geometry.tol_scans, geometry.max_tol_scans
        );

        let excluded: Vec<bool> = retention_times
            .iter()
            .map(|&rt| config.is_excluded(rt))
            .collect();
        summary.scans_excluded = excluded.iter().filter(|&&x| x).count();

        info!(
            "Smoothing data points (time span={}; m/z={})",
            config.smoothing_time_span, config.smoothing_mz_tolerance
        );
        let smoothing = SmoothingParams {
            time_span: config.smoothing_time_span,
            mz_tolerance: config.smoothing_mz_tolerance,
        };
        let smoothed = smooth_scans(source, &excluded, smoothing, control)?;
        let (arena, counts) = filter_samples(smoothed, config.min_height, control)?;
        summary.samples_kept = counts.kept;
        summary.samples_dropped = counts.dropped;

        let grid = probe_grid(arena.mass_range(), &geometry, control)?;
        let climber = HillClimber::from_geometry(&arena, &geometry);
        let climbed = climb_probes(&climber, grid, config.min_height, control)?;
        summary.probes_generated = climbed.generated;
        summary.probes_converged = climbed.converged.len();

        let mut clusters = build_clusters(climbed.converged, control)?;
        summary.clusters_built = clusters.len();

        let mut ownership = assign_samples(&clusters, &arena, &geometry, control)?;
        summary.joins = merge_clusters(
            &mut clusters,
            &mut ownership,
            &geometry,
            config.mz_tolerance,
            config.intensity_similarity,
            control,
        )?;
        summary.clusters_cleared_by_span = filter_long_chains(
            &mut clusters,
            &mut ownership,
            &geometry,
            config.mz_tolerance,
            config.intensity_similarity,
            config.max_time_span,
            control,
        )?;

        let (features, rejected) = assemble_features(
            source,
            &clusters,
            &arena,
            &ownership,
            &geometry,
            config.min_height,
            control,
        )?;
        summary.rejected_by_time_span = rejected.rejected_by_time_span;
        summary.rejected_by_continuity = rejected.rejected_by_continuity;
        summary.rejected_by_area = rejected.rejected_by_area;
        summary.features = features.len();

        info!("Finished GridMass, {} peaks", features.len());
        Ok(Detection { features, summary })
    }
}
