use super::continuity::ScanMaxima;
use super::ownership::Ownership;
use crate::control::{
    Cancelled,
    RunControl,
    Stage,
};
use crate::models::{
    Cluster,
    Feature,
    FeaturePoint,
    RunGeometry,
    SampleArena,
};
use crate::traits::ScanSource;
use tracing::{
    debug,
    info,
};

/// Features with an area at or below this are dropped.
pub const MIN_FEATURE_AREA: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyCounts {
    pub rejected_by_time_span: usize,
    pub rejected_by_continuity: usize,
    pub rejected_by_area: usize,
}

/// Turns the surviving clusters into features, in cluster id order.
///
/// A cluster must cover at least `tol_scans` scans and have continuous per
/// scan maxima; its profile uses the un-smoothed value of each maximum.
pub(crate) fn assemble_features<S: ScanSource + ?Sized>(
    source: &S,
    clusters: &[Cluster],
    arena: &SampleArena,
    ownership: &Ownership,
    geometry: &RunGeometry,
    min_height: f64,
    control: &RunControl,
) -> Result<(Vec<Feature>, AssemblyCounts), Cancelled> {
    info!("Building peaks (tolerance scans={})", geometry.tol_scans);
    let mut counts = AssemblyCounts::default();
    let mut features = Vec::new();

    for (idx, cluster) in clusters.iter().enumerate() {
        control.tick(Stage::Assembly, idx, clusters.len())?;
        if !cluster.is_active() {
            continue;
        }
        if cluster.scan_span() < geometry.tol_scans {
            counts.rejected_by_time_span += 1;
            debug!(
                "Ignored by time range criteria: id={} {:.4} m/z, scan={}, intensity={}, probes={}",
                cluster.id,
                cluster.center.mz,
                cluster.center.scan,
                cluster.center.intensity,
                cluster.num_probes,
            );
            continue;
        }

        let maxima = ScanMaxima::collect(idx, cluster, arena, ownership, min_height);
        if !maxima.is_continuous(geometry.tol_scans) {
            counts.rejected_by_continuity += 1;
            debug!(
                "Ignored by continuous criteria: id={} {:.4} m/z, scan={}, intensity={}, probes={}, data scans={}, cont scans={}, cont ratio={:.3}",
                cluster.id,
                cluster.center.mz,
                cluster.center.scan,
                cluster.center.intensity,
                cluster.num_probes,
                maxima.scans_with_maximum(),
                maxima.longest_run,
                maxima.continuity_ratio(),
            );
            continue;
        }

        let points = maxima
            .maxima
            .iter()
            .map(|&sample| {
                let s = arena.get(sample);
                FeaturePoint {
                    scan: s.scan,
                    scan_number: source.scan_number(s.scan),
                    rt: source.retention_time(s.scan),
                    mz: s.raw_mz,
                    intensity: s.raw_intensity,
                }
            })
            .collect();
        let next_id = features.len() as u32 + 1;
        match Feature::from_points(next_id, cluster.id, points) {
            Some(feature) if feature.area > MIN_FEATURE_AREA => features.push(feature),
            other => {
                counts.rejected_by_area += 1;
                debug!(
                    "Ignored by area ~ 0: id={} {:.4} m/z, scan={}, area={:?}",
                    cluster.id,
                    cluster.center.mz,
                    cluster.center.scan,
                    other.map(|f| f.area),
                );
            }
        }
    }
    control.complete(Stage::Assembly);
    info!("Peaks: {}", features.len());
    Ok((features, counts))
}
