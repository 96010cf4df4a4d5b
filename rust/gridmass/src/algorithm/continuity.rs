use super::ownership::Ownership;
use crate::models::{
    Cluster,
    SampleArena,
    SampleRef,
};

/// Per scan maxima of a cluster and how continuous they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanMaxima {
    /// At most one sample per scan, in scan order.
    pub maxima: Vec<SampleRef>,
    /// Longest run of consecutive scans that have a maximum.
    pub longest_run: usize,
}

impl ScanMaxima {
    /// Walks the scan range of the cluster, picking the most intense owned
    /// sample inside the mass box and above `min_height` (first one on ties).
    pub fn collect(
        cluster_idx: usize,
        cluster: &Cluster,
        arena: &SampleArena,
        ownership: &Ownership,
        min_height: f64,
    ) -> Self {
        let mut maxima = Vec::new();
        let mut run = 0;
        let mut longest_run = 0;
        let last_scan = arena.num_scans().saturating_sub(1);
        for scan in cluster.min_scan..=cluster.max_scan.min(last_scan) {
            let mut best: Option<(SampleRef, f64)> = None;
            for sample in arena.window(scan, cluster.min_mz, cluster.max_mz) {
                if ownership.owner(sample) != Some(cluster_idx) {
                    continue;
                }
                let intensity = arena.get(sample).intensity;
                if intensity <= min_height {
                    continue;
                }
                match best {
                    Some((_, best_intensity)) if intensity <= best_intensity => {}
                    _ => best = Some((sample, intensity)),
                }
            }
            match best {
                Some((sample, _)) => {
                    maxima.push(sample);
                    run += 1;
                    longest_run = longest_run.max(run);
                }
                None => run = 0,
            }
        }
        Self {
            maxima,
            longest_run,
        }
    }

    pub fn scans_with_maximum(&self) -> usize {
        self.maxima.len()
    }

    pub fn continuity_ratio(&self) -> f64 {
        if self.maxima.is_empty() {
            return 0.0;
        }
        self.longest_run as f64 / self.maxima.len() as f64
    }

    /// At least `tol_scans` maxima, and either a run of `tol_scans` or more
    /// than half of them consecutive.
    pub fn is_continuous(&self, tol_scans: usize) -> bool {
        self.scans_with_maximum() >= tol_scans
            && (self.longest_run >= tol_scans || self.continuity_ratio() > 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cluster::tests::converged;
    use crate::models::sample::tests::arena;

    fn owned_cluster(arena: &SampleArena, lo: usize, hi: usize) -> (Cluster, Ownership) {
        let cluster = Cluster::from_probes(
            1,
            &[
                converged((99.99, lo), (0, 100.0, lo, 50.0)),
                converged((100.01, hi), (0, 100.0, lo, 50.0)),
            ],
        )
        .unwrap();
        let mut ownership = Ownership::new(arena.len(), 1);
        for sample in 0..arena.len() {
            ownership.claim(sample, 0);
        }
        (cluster, ownership)
    }

    #[test]
    fn test_scan_maxima() {
        let arena = arena(
            8,
            &[
                (0, 100.0, 50.0),
                (0, 100.005, 60.0),
                // outside the mass box
                (1, 100.5, 80.0),
                (2, 100.0, 40.0),
                (3, 100.0, 10.0),
                (4, 100.0, 30.0),
                (4, 100.001, 30.0),
                (5, 100.0, 30.0),
                (6, 100.0, 30.0),
            ],
        );
        let (cluster, ownership) = owned_cluster(&arena, 0, 7);
        let maxima = ScanMaxima::collect(0, &cluster, &arena, &ownership, 10.0);
        // scan 1 has nothing in the box, scan 3 is not above the height
        assert_eq!(maxima.maxima, vec![1, 3, 5, 7, 8]);
        assert_eq!(maxima.longest_run, 3);
        assert_eq!(maxima.scans_with_maximum(), 5);
        assert!(maxima.is_continuous(3));
        assert!(maxima.is_continuous(4));
        assert!(!maxima.is_continuous(6));
    }

    #[test]
    fn test_fragmented_maxima_fail() {
        // maxima on every other scan
        let points: Vec<(usize, f64, f64)> = (0..12).step_by(2).map(|s| (s, 100.0, 50.0)).collect();
        let arena = arena(12, &points);
        let (cluster, ownership) = owned_cluster(&arena, 0, 11);
        let maxima = ScanMaxima::collect(0, &cluster, &arena, &ownership, 10.0);
        assert_eq!(maxima.scans_with_maximum(), 6);
        assert_eq!(maxima.longest_run, 1);
        assert!(!maxima.is_continuous(4));
    }

    #[test]
    fn test_samples_of_other_clusters_are_ignored() {
        let arena = arena(2, &[(0, 100.0, 50.0), (1, 100.0, 50.0)]);
        let (cluster, mut ownership) = owned_cluster(&arena, 0, 1);
        ownership.release_all(0);
        let maxima = ScanMaxima::collect(0, &cluster, &arena, &ownership, 10.0);
        assert!(maxima.maxima.is_empty());
        assert_eq!(maxima.continuity_ratio(), 0.0);
    }
}
