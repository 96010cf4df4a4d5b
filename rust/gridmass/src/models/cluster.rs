use super::probe::{
    ConvergedProbe,
    Summit,
};
use serde::Serialize;

/// 1-based, assigned in creation order.
pub type ClusterId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClusterState {
    Active,
    Merged { into: ClusterId },
    Cleared,
}

/// Probes that converged to the same local maximum.
///
/// The bounding box covers the probe origins and the center; it only grows,
/// through merges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub center: Summit,
    pub num_probes: usize,
    pub min_mz: f64,
    pub max_mz: f64,
    pub min_scan: usize,
    pub max_scan: usize,
    pub min_intensity: f64,
    pub max_intensity: f64,
    pub state: ClusterState,
}

impl Cluster {
    /// `probes` must be non empty and share one summit.
    pub fn from_probes(id: ClusterId, probes: &[ConvergedProbe]) -> Option<Self> {
        let first = probes.first()?;
        let center = first.summit;
        let mut cluster = Self {
            id,
            center,
            num_probes: 0,
            min_mz: center.mz,
            max_mz: center.mz,
            min_scan: center.scan,
            max_scan: center.scan,
            min_intensity: center.intensity,
            max_intensity: center.intensity,
            state: ClusterState::Active,
        };
        for p in probes {
            debug_assert_eq!(p.summit.sample, center.sample);
            cluster.add_probe(p);
        }
        Some(cluster)
    }

    fn add_probe(&mut self, probe: &ConvergedProbe) {
        self.num_probes += 1;
        self.min_mz = self.min_mz.min(probe.probe.origin_mz);
        self.max_mz = self.max_mz.max(probe.probe.origin_mz);
        self.min_scan = self.min_scan.min(probe.probe.origin_scan);
        self.max_scan = self.max_scan.max(probe.probe.origin_scan);
        self.min_intensity = self.min_intensity.min(probe.summit.intensity);
        self.max_intensity = self.max_intensity.max(probe.summit.intensity);
    }

    pub fn is_active(&self) -> bool {
        self.state == ClusterState::Active
    }

    /// Number of scans covered, both ends included.
    pub fn scan_span(&self) -> usize {
        self.max_scan - self.min_scan + 1
    }

    /// Scans between this cluster's range and `[lo, hi]`, 0 when they overlap.
    pub fn scan_distance(&self, lo: usize, hi: usize) -> usize {
        if self.max_scan < lo {
            lo - self.max_scan
        } else if hi < self.min_scan {
            self.min_scan - hi
        } else {
            0
        }
    }

    /// Unions box, intensity range and probe count of `other` into self.
    /// The center is kept.
    pub fn absorb(&mut self, other: &Cluster) {
        self.num_probes += other.num_probes;
        self.min_mz = self.min_mz.min(other.min_mz);
        self.max_mz = self.max_mz.max(other.max_mz);
        self.min_scan = self.min_scan.min(other.min_scan);
        self.max_scan = self.max_scan.max(other.max_scan);
        self.min_intensity = self.min_intensity.min(other.min_intensity);
        self.max_intensity = self.max_intensity.max(other.max_intensity);
    }

    pub fn contains(&self, mz: f64, scan: usize, mz_margin: f64) -> bool {
        scan >= self.min_scan
            && scan <= self.max_scan
            && mz >= self.min_mz - mz_margin
            && mz <= self.max_mz + mz_margin
    }
}

/// `min / max` of two intensities, 0 when the larger one is not positive.
pub fn intensity_similarity(a: f64, b: f64) -> f64 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    if hi <= 0.0 {
        return 0.0;
    }
    lo / hi
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::probe::Probe;

    pub(crate) fn converged(origin: (f64, usize), summit: (usize, f64, usize, f64)) -> ConvergedProbe {
        ConvergedProbe {
            probe: Probe {
                origin_mz: origin.0,
                origin_scan: origin.1,
            },
            summit: Summit {
                sample: summit.0,
                mz: summit.1,
                scan: summit.2,
                intensity: summit.3,
            },
        }
    }

    #[test]
    fn test_cluster_box_covers_origins_and_center() {
        let summit = (7, 200.0, 15, 1000.0);
        let probes = [
            converged((199.99, 13), summit),
            converged((200.02, 17), summit),
        ];
        let cluster = Cluster::from_probes(1, &probes).unwrap();
        assert_eq!(cluster.num_probes, 2);
        assert_eq!((cluster.min_scan, cluster.max_scan), (13, 17));
        assert_eq!((cluster.min_mz, cluster.max_mz), (199.99, 200.02));
        assert_eq!(cluster.scan_span(), 5);
        assert!(cluster.contains(200.025, 15, 0.01));
        assert!(!cluster.contains(200.0, 18, 0.01));
        assert!(Cluster::from_probes(2, &[]).is_none());
    }

    #[test]
    fn test_scan_distance() {
        let probes = [converged((200.0, 10), (0, 200.0, 12, 5.0))];
        let mut cluster = Cluster::from_probes(1, &probes).unwrap();
        cluster.max_scan = 14;
        assert_eq!(cluster.scan_distance(14, 20), 0);
        assert_eq!(cluster.scan_distance(17, 20), 3);
        assert_eq!(cluster.scan_distance(0, 7), 3);
        assert_eq!(cluster.scan_distance(0, 30), 0);
    }

    #[test]
    fn test_intensity_similarity() {
        assert_eq!(intensity_similarity(900.0, 1000.0), 0.9);
        assert_eq!(intensity_similarity(1000.0, 900.0), 0.9);
        assert_eq!(intensity_similarity(0.0, 0.0), 0.0);
        assert_eq!(intensity_similarity(5.0, 5.0), 1.0);
    }
}
