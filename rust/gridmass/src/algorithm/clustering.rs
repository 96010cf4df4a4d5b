use crate::control::{
    Cancelled,
    RunControl,
    Stage,
};
use crate::models::{
    Cluster,
    ClusterId,
    ConvergedProbe,
};
use tracing::info;

/// Groups probes that converged to the same sample into clusters.
///
/// Probes are ordered by their summit (mass, scan, sample) first, so ids
/// follow the mass of the cluster centers.
pub(crate) fn build_clusters(
    mut probes: Vec<ConvergedProbe>,
    control: &RunControl,
) -> Result<Vec<Cluster>, Cancelled> {
    control.checkpoint()?;
    probes.sort_by(|a, b| a.summit.sort_key_cmp(&b.summit));

    let total = probes.len();
    let mut clusters = Vec::new();
    let mut done = 0;
    for group in probes.chunk_by(|a, b| a.summit.sample == b.summit.sample) {
        control.checkpoint()?;
        control.report(Stage::Clustering, done, total);
        done += group.len();
        let id = (clusters.len() + 1) as ClusterId;
        if let Some(cluster) = Cluster::from_probes(id, group) {
            clusters.push(cluster);
        }
    }
    control.complete(Stage::Clustering);
    info!("Spots: {}", clusters.len());
    Ok(clusters)
}
