use super::climbing::HillClimber;
use crate::control::{
    Cancelled,
    RunControl,
    Stage,
};
use crate::models::{
    Cluster,
    RunGeometry,
    SampleArena,
    SampleRef,
};
use nohash_hasher::IntMap;
use std::collections::BTreeSet;
use tracing::info;

/// Which cluster owns each sample of a run.
///
/// Clusters are addressed by their position in the cluster list. A sample
/// has at most one owner; `members` is kept in sync with `owners` by every
/// mutation.
#[derive(Debug, Clone)]
pub struct Ownership {
    owners: Vec<Option<usize>>,
    members: Vec<BTreeSet<SampleRef>>,
}

impl Ownership {
    pub fn new(num_samples: usize, num_clusters: usize) -> Self {
        Self {
            owners: vec![None; num_samples],
            members: vec![BTreeSet::new(); num_clusters],
        }
    }

    pub fn owner(&self, sample: SampleRef) -> Option<usize> {
        self.owners[sample]
    }

    /// Samples owned by a cluster, in arena (scan, mass) order.
    pub fn members(&self, cluster: usize) -> &BTreeSet<SampleRef> {
        &self.members[cluster]
    }

    pub fn claim(&mut self, sample: SampleRef, cluster: usize) {
        if let Some(previous) = self.owners[sample].replace(cluster) {
            self.members[previous].remove(&sample);
        }
        self.members[cluster].insert(sample);
    }

    /// Moves every sample of `from` to `to`.
    pub fn transfer_all(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let mut moved = std::mem::take(&mut self.members[from]);
        for &sample in moved.iter() {
            self.owners[sample] = Some(to);
        }
        self.members[to].append(&mut moved);
    }

    /// Detaches every sample of `cluster`, returning how many there were.
    pub fn release_all(&mut self, cluster: usize) -> usize {
        let released = std::mem::take(&mut self.members[cluster]);
        for &sample in released.iter() {
            self.owners[sample] = None;
        }
        released.len()
    }

    pub fn num_owned(&self) -> usize {
        self.owners.iter().filter(|o| o.is_some()).count()
    }
}

/// Hands out samples to clusters.
///
/// Every sample within the scan range of a cluster and its mass box widened
/// by the climbing mass radius is claimed when free. A sample already owned
/// by another cluster is transferred only if climbing from it ends on this
/// cluster's center.
pub(crate) fn assign_samples(
    clusters: &[Cluster],
    arena: &SampleArena,
    geometry: &RunGeometry,
    control: &RunControl,
) -> Result<Ownership, Cancelled> {
    let climber = HillClimber::from_geometry(arena, geometry);
    let mut ownership = Ownership::new(arena.len(), clusters.len());
    // climbs are pure, a sample resolves to the same summit every time
    let mut resolved: IntMap<SampleRef, Option<SampleRef>> = IntMap::default();
    let last_scan = arena.num_scans().saturating_sub(1);

    let mut contested = 0usize;
    let mut visited = 0usize;
    for (idx, cluster) in clusters.iter().enumerate() {
        control.checkpoint()?;
        control.report(Stage::Assignment, idx, clusters.len());
        let low = cluster.min_mz - geometry.mz_radius;
        let high = cluster.max_mz + geometry.mz_radius;
        for scan in cluster.min_scan..=cluster.max_scan.min(last_scan) {
            for sample in arena.window(scan, low, high) {
                visited += 1;
                control.poll(visited)?;
                match ownership.owner(sample) {
                    None => ownership.claim(sample, idx),
                    Some(owner) if owner == idx => {}
                    Some(_) => {
                        contested += 1;
                        let summit = *resolved.entry(sample).or_insert_with(|| {
                            let s = arena.get(sample);
                            climber.converge(s.mz, s.scan).map(|x| x.sample)
                        });
                        if summit == Some(cluster.center.sample) {
                            ownership.claim(sample, idx);
                        }
                    }
                }
            }
        }
    }
    control.complete(Stage::Assignment);
    info!(
        "Assigned {} samples to {} spots ({} contested)",
        ownership.num_owned(),
        clusters.len(),
        contested
    );
    Ok(ownership)
}
