#![allow(dead_code)]

use gridmass::{
    GridMassConfig,
    Scan,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub const NUM_SCANS: u32 = 60;
pub const RT_STEP: f64 = 0.1;
const SIGMA: f64 = 2.5;

/// rt_per_scan is 5.9 / 60, which gives 6 tolerable scans, 20 maximum
/// tolerable scans and a join gap of 3 scans.
pub fn base_config() -> GridMassConfig {
    GridMassConfig {
        min_height: 10.0,
        mz_tolerance: 0.01,
        min_time_span: 0.6,
        max_time_span: 2.0,
        smoothing_time_span: 0.0,
        smoothing_mz_tolerance: 0.0,
        intensity_similarity: 0.5,
        ignore_times: vec![],
    }
}

/// Gaussian elution profile at one mass, present on scans `first..=last`.
#[derive(Debug, Clone, Copy)]
pub struct Hill {
    pub mz: f64,
    pub first: u32,
    pub last: u32,
    pub apex_scan: u32,
    pub apex: f64,
}

impl Hill {
    pub fn new(mz: f64, first: u32, last: u32, apex: f64) -> Self {
        Self {
            mz,
            first,
            last,
            apex_scan: (first + last) / 2,
            apex,
        }
    }

    pub fn intensity(&self, scan: u32) -> Option<f64> {
        if scan < self.first || scan > self.last {
            return None;
        }
        let d = scan as f64 - self.apex_scan as f64;
        Some(self.apex * (-(d * d) / (2.0 * SIGMA * SIGMA)).exp())
    }
}

/// Scans at `rt = i * RT_STEP` holding the hills and optional noise points
/// (`count` per scan, intensity below `max_noise`).
pub fn build_scans(hills: &[Hill], noise: Option<(&mut ChaCha8Rng, usize, f64)>) -> Vec<Scan> {
    let mut noise = noise;
    (0..NUM_SCANS)
        .map(|i| {
            let mut points: Vec<(f64, f64)> = hills
                .iter()
                .filter_map(|h| h.intensity(i).map(|x| (h.mz, x)))
                .collect();
            if let Some((rng, count, max_noise)) = noise.as_mut() {
                for _ in 0..*count {
                    let mz = rng.gen_range(100.0..500.0);
                    let intensity = rng.gen_range(0.0..*max_noise);
                    points.push((mz, intensity));
                }
            }
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            let (mz, intensity) = points.into_iter().unzip();
            Scan::new(i + 1, i as f64 * RT_STEP, mz, intensity)
        })
        .collect()
}
