use super::ownership::Ownership;
use crate::control::{
    Cancelled,
    RunControl,
    Stage,
};
use crate::models::{
    intensity_similarity,
    Cluster,
    ClusterState,
    RunGeometry,
};
use crate::utils::range_by_key;
use tracing::{
    debug,
    info,
    trace,
};

/// Cluster positions sorted by center mass (then id).
///
/// Centers never move, so one index serves a whole stage.
#[derive(Debug, Clone)]
pub(crate) struct MassIndex {
    order: Vec<usize>,
    masses: Vec<f64>,
}

impl MassIndex {
    pub fn new(clusters: &[Cluster]) -> Self {
        let mut order: Vec<usize> = (0..clusters.len()).collect();
        order.sort_by(|&a, &b| {
            clusters[a]
                .center
                .mz
                .total_cmp(&clusters[b].center.mz)
                .then(clusters[a].id.cmp(&clusters[b].id))
        });
        let masses = order.iter().map(|&i| clusters[i].center.mz).collect();
        Self { order, masses }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn at(&self, position: usize) -> usize {
        self.order[position]
    }

    /// Clusters whose center is within `tolerance` of `mz`, in mass order.
    pub fn window(&self, mz: f64, tolerance: f64) -> impl Iterator<Item = usize> + '_ {
        let range = range_by_key(&self.masses, mz - tolerance, mz + tolerance, |x| *x);
        self.order[range].iter().copied()
    }
}

fn joinable(a: &Cluster, b: &Cluster, geometry: &RunGeometry, similarity: f64) -> bool {
    a.scan_distance(b.min_scan, b.max_scan) <= geometry.critic_scans
        && intensity_similarity(a.center.intensity, b.center.intensity) > similarity
}

/// Folds `loser` into `winner`.
fn merge_into(clusters: &mut [Cluster], ownership: &mut Ownership, winner: usize, loser: usize) {
    let absorbed = clusters[loser].clone();
    clusters[winner].absorb(&absorbed);
    clusters[loser].state = ClusterState::Merged {
        into: clusters[winner].id,
    };
    ownership.transfer_all(loser, winner);
    trace!(
        "Joined spot {} ({:.4} m/z, scan {}) into spot {} ({:.4} m/z, scan {})",
        absorbed.id,
        absorbed.center.mz,
        absorbed.center.scan,
        clusters[winner].id,
        clusters[winner].center.mz,
        clusters[winner].center.scan,
    );
}

/// Joins clusters with close centers, touching scan ranges and similar
/// intensities, until a full sweep joins nothing.
///
/// The more intense center survives (lower id on ties). When the current
/// cluster survives a join its candidates are examined again from the start.
/// Returns the number of joins.
pub(crate) fn merge_clusters(
    clusters: &mut [Cluster],
    ownership: &mut Ownership,
    geometry: &RunGeometry,
    mz_tolerance: f64,
    similarity: f64,
    control: &RunControl,
) -> Result<usize, Cancelled> {
    let index = MassIndex::new(clusters);
    let mut joins = 0;
    let mut sweeps = 0;
    loop {
        sweeps += 1;
        let mut sweep_joins = 0;
        for position in 0..index.len() {
            control.tick(Stage::Merging, position, index.len())?;
            let current = index.at(position);
            'restart: while clusters[current].is_active() {
                let center_mz = clusters[current].center.mz;
                for other in index.window(center_mz, mz_tolerance) {
                    if other == current || !clusters[other].is_active() {
                        continue;
                    }
                    if !joinable(&clusters[current], &clusters[other], geometry, similarity) {
                        continue;
                    }
                    let (a, b) = (&clusters[current], &clusters[other]);
                    let current_wins = a.center.intensity > b.center.intensity
                        || (a.center.intensity == b.center.intensity && a.id < b.id);
                    let (winner, loser) = if current_wins {
                        (current, other)
                    } else {
                        (other, current)
                    };
                    merge_into(clusters, ownership, winner, loser);
                    sweep_joins += 1;
                    // restart while current is alive, the loop condition
                    // stops it otherwise
                    continue 'restart;
                }
                break;
            }
        }
        joins += sweep_joins;
        if sweep_joins == 0 {
            break;
        }
    }
    control.complete(Stage::Merging);
    info!("Joins: {} ({} sweeps)", joins, sweeps);
    Ok(joins)
}

/// Removes chains of similar clusters spanning more than the maximum time.
///
/// The chain of a seed collects active clusters with a center within
/// `mz_tolerance`, similar to the seed, whose scan range overlaps or is within
/// `max_tol_scans` of the range grown so far. When the summed scan spans of
/// the chain exceed `max_time_span` all of its members are cleared and their
/// samples released. Returns how many clusters were cleared.
pub(crate) fn filter_long_chains(
    clusters: &mut [Cluster],
    ownership: &mut Ownership,
    geometry: &RunGeometry,
    mz_tolerance: f64,
    similarity: f64,
    max_time_span: f64,
    control: &RunControl,
) -> Result<usize, Cancelled> {
    let index = MassIndex::new(clusters);
    let mut cleared = 0;
    for position in 0..index.len() {
        control.tick(Stage::SpanFiltering, position, index.len())?;
        let seed = index.at(position);
        if !clusters[seed].is_active() {
            continue;
        }

        let seed_cluster = &clusters[seed];
        let mut candidates: Vec<usize> = index
            .window(seed_cluster.center.mz, mz_tolerance)
            .filter(|&other| {
                other != seed
                    && clusters[other].is_active()
                    && intensity_similarity(
                        seed_cluster.center.intensity,
                        clusters[other].center.intensity,
                    ) > similarity
            })
            .collect();

        let mut chain = vec![seed];
        let (mut lo, mut hi) = (seed_cluster.min_scan, seed_cluster.max_scan);
        let mut total_scans = seed_cluster.scan_span();
        loop {
            let before = chain.len();
            candidates.retain(|&other| {
                let c = &clusters[other];
                if c.scan_distance(lo, hi) <= geometry.max_tol_scans {
                    chain.push(other);
                    total_scans += c.scan_span();
                    lo = lo.min(c.min_scan);
                    hi = hi.max(c.max_scan);
                    false
                } else {
                    true
                }
            });
            if chain.len() == before {
                break;
            }
        }

        let chain_time = geometry.scans_to_time(total_scans);
        if chain_time > max_time_span {
            debug!(
                "Removing {} spots around {:.4} m/z (spot {}), scan {}, intensity {}, total scans {} ({:.3})",
                chain.len(),
                seed_cluster.center.mz,
                seed_cluster.id,
                seed_cluster.center.scan,
                seed_cluster.center.intensity,
                total_scans,
                chain_time,
            );
            for member in chain {
                clusters[member].state = ClusterState::Cleared;
                ownership.release_all(member);
                cleared += 1;
            }
        }
    }
    control.complete(Stage::SpanFiltering);
    info!("Spots removed by time span: {}", cleared);
    Ok(cleared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridMassConfig;
    use crate::models::cluster::tests::converged;

    fn geometry() -> RunGeometry {
        // rt_per_scan 0.099 -> tol 6, critic 3, max tol 20
        let rts: Vec<f64> = (0..100).map(|i| i as f64 * 0.1).collect();
        let config = GridMassConfig {
            min_height: 10.0,
            mz_tolerance: 0.01,
            min_time_span: 0.6,
            max_time_span: 2.0,
            smoothing_time_span: 0.0,
            smoothing_mz_tolerance: 0.0,
            intensity_similarity: 0.5,
            ignore_times: vec![],
        };
        RunGeometry::new(&rts, &config)
    }

    /// Cluster with center `(sample, mz, scan, intensity)` and scan box `[lo, hi]`.
    fn cluster(id: u32, center: (usize, f64, usize, f64), lo: usize, hi: usize) -> Cluster {
        Cluster::from_probes(
            id,
            &[converged((center.1, lo), center), converged((center.1, hi), center)],
        )
        .unwrap()
    }

    fn merge(clusters: &mut [Cluster], ownership: &mut Ownership, geometry: &RunGeometry) -> usize {
        merge_clusters(clusters, ownership, geometry, 0.01, 0.5, &RunControl::new()).unwrap()
    }

    fn ownership_for(clusters: &[Cluster]) -> Ownership {
        let mut ownership = Ownership::new(clusters.len(), clusters.len());
        for (i, c) in clusters.iter().enumerate() {
            ownership.claim(c.center.sample, i);
        }
        ownership
    }

    #[test]
    fn test_mass_index_window() {
        let clusters = vec![
            cluster(1, (0, 300.0, 5, 10.0), 0, 10),
            cluster(2, (1, 100.0, 5, 10.0), 0, 10),
            cluster(3, (2, 100.01, 5, 10.0), 0, 10),
        ];
        let index = MassIndex::new(&clusters);
        assert_eq!(index.at(0), 1);
        assert_eq!(index.window(100.005, 0.01).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(index.window(200.0, 0.01).count(), 0);
    }

    #[test]
    fn test_merge_keeps_more_intense_center() {
        let geometry = geometry();
        assert_eq!(geometry.critic_scans, 3);
        let mut clusters = vec![
            cluster(1, (0, 400.0, 15, 900.0), 10, 20),
            cluster(2, (1, 400.004, 27, 1000.0), 23, 30),
            // too dim
            cluster(3, (2, 400.002, 35, 100.0), 31, 40),
            // too far in mass
            cluster(4, (3, 400.05, 15, 1000.0), 10, 20),
        ];
        let mut ownership = ownership_for(&clusters);
        let joins = merge(&mut clusters, &mut ownership, &geometry);
        assert_eq!(joins, 1);
        assert_eq!(clusters[0].state, ClusterState::Merged { into: 2 });
        assert!(clusters[1].is_active());
        assert_eq!((clusters[1].min_scan, clusters[1].max_scan), (10, 30));
        assert_eq!(clusters[1].num_probes, 4);
        assert_eq!(ownership.owner(0), Some(1));
        assert!(clusters[2].is_active());
        assert!(clusters[3].is_active());
    }

    #[test]
    fn test_merge_ties_go_to_lower_id() {
        let geometry = geometry();
        let mut clusters = vec![
            cluster(1, (0, 400.0, 15, 500.0), 10, 20),
            cluster(2, (1, 400.0, 25, 500.0), 21, 30),
        ];
        let mut ownership = ownership_for(&clusters);
        merge(&mut clusters, &mut ownership, &geometry);
        assert!(clusters[0].is_active());
        assert_eq!(clusters[1].state, ClusterState::Merged { into: 1 });
    }

    #[test]
    fn test_merge_cascades_through_growing_box() {
        // 1 and 3 only touch once 2 has widened the box of 1
        let geometry = geometry();
        let mut clusters = vec![
            cluster(1, (0, 400.0, 12, 1000.0), 10, 14),
            cluster(2, (1, 400.001, 19, 800.0), 17, 22),
            cluster(3, (2, 400.002, 27, 700.0), 25, 30),
        ];
        let mut ownership = ownership_for(&clusters);
        let joins = merge(&mut clusters, &mut ownership, &geometry);
        assert_eq!(joins, 2);
        assert_eq!(clusters.iter().filter(|c| c.is_active()).count(), 1);
        assert_eq!((clusters[0].min_scan, clusters[0].max_scan), (10, 30));
        assert_eq!(ownership.members(0).len(), 3);
    }

    #[test]
    fn test_long_chains_are_cleared() {
        let geometry = geometry();
        assert_eq!(geometry.max_tol_scans, 20);
        let mut clusters = vec![
            // 11 + 11 scans, 15 apart: 2.18 > 2.0
            cluster(1, (0, 400.0, 15, 1000.0), 10, 20),
            cluster(2, (1, 400.003, 40, 800.0), 35, 45),
            // alone, 1.09
            cluster(3, (2, 500.0, 15, 1000.0), 10, 20),
            // same mass as 1 but not similar
            cluster(4, (3, 400.001, 60, 100.0), 55, 65),
        ];
        let mut ownership = ownership_for(&clusters);
        let cleared = filter_long_chains(
            &mut clusters,
            &mut ownership,
            &geometry,
            0.01,
            0.5,
            2.0,
            &RunControl::new(),
        )
        .unwrap();
        assert_eq!(cleared, 2);
        assert_eq!(clusters[0].state, ClusterState::Cleared);
        assert_eq!(clusters[1].state, ClusterState::Cleared);
        assert!(clusters[2].is_active());
        assert!(clusters[3].is_active());
        assert_eq!(ownership.owner(0), None);
        assert_eq!(ownership.owner(2), Some(2));
    }

    #[test]
    fn test_merge_and_span_filter_are_idempotent() {
        let geometry = geometry();
        let mut clusters = vec![
            cluster(1, (0, 400.0, 15, 1000.0), 10, 20),
            cluster(2, (1, 400.003, 22, 900.0), 21, 26),
            cluster(3, (2, 400.0, 60, 950.0), 55, 70),
            cluster(4, (3, 401.0, 15, 1000.0), 10, 20),
            cluster(5, (4, 401.0, 40, 300.0), 35, 45),
            cluster(6, (5, 402.0, 15, 1000.0), 10, 20),
            cluster(7, (6, 402.0, 38, 900.0), 30, 45),
        ];
        let mut ownership = ownership_for(&clusters);
        let control = RunControl::new();
        let joins =
            merge_clusters(&mut clusters, &mut ownership, &geometry, 0.01, 0.5, &control).unwrap();
        let cleared =
            filter_long_chains(&mut clusters, &mut ownership, &geometry, 0.01, 0.5, 2.0, &control)
                .unwrap();
        assert_eq!(joins, 1);
        assert_eq!(cleared, 2);

        let snapshot = clusters.clone();
        let owners: Vec<_> = (0..clusters.len()).map(|s| ownership.owner(s)).collect();
        let joins =
            merge_clusters(&mut clusters, &mut ownership, &geometry, 0.01, 0.5, &control).unwrap();
        let cleared =
            filter_long_chains(&mut clusters, &mut ownership, &geometry, 0.01, 0.5, 2.0, &control)
                .unwrap();
        assert_eq!(joins, 0);
        assert_eq!(cleared, 0);
        assert_eq!(clusters, snapshot);
        let owners_again: Vec<_> = (0..clusters.len()).map(|s| ownership.owner(s)).collect();
        assert_eq!(owners, owners_again);
    }
}
