use super::cluster::ClusterId;
use crate::utils::trapezoid_area;
use serde::{
    Deserialize,
    Serialize,
};

/// One scan of a feature's retention time profile, un-smoothed values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeaturePoint {
    /// Position of the scan in the run.
    pub scan: usize,
    pub scan_number: u32,
    pub rt: f64,
    pub mz: f64,
    pub intensity: f64,
}

/// A detected chromatographic peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// 1-based, in cluster id order.
    pub id: u32,
    pub cluster_id: ClusterId,
    /// Mass of the apex point.
    pub mz: f64,
    pub rt_apex: f64,
    pub height: f64,
    pub rt_range: (f64, f64),
    pub area: f64,
    pub points: Vec<FeaturePoint>,
}

impl Feature {
    /// Returns `None` for an empty profile. Points must be ordered by scan.
    pub fn from_points(id: u32, cluster_id: ClusterId, points: Vec<FeaturePoint>) -> Option<Self> {
        let first = points.first()?;
        let last = points.last()?;
        let rt_range = (first.rt, last.rt);

        let mut apex = first;
        for p in points.iter() {
            if p.intensity > apex.intensity {
                apex = p;
            }
        }
        let (mz, rt_apex, height) = (apex.mz, apex.rt, apex.intensity);
        let area = trapezoid_area(points.iter().map(|p| (p.rt, p.intensity)));

        Some(Self {
            id,
            cluster_id,
            mz,
            rt_apex,
            height,
            rt_range,
            area,
            points,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
