use crate::control::{
    Cancelled,
    RunControl,
    Stage,
};
use crate::models::{
    Sample,
    SampleArena,
};
use crate::traits::ScanSource;
use crate::utils::range_by_key;
use tracing::info;

/// Smallest mass tolerance used to match samples across scans.
pub const MIN_SMOOTHING_MZ_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    /// Width of the averaging window, 0 disables smoothing.
    pub time_span: f64,
    pub mz_tolerance: f64,
}

/// Index of the point of `mz` closest to `target` within `tolerance`.
/// Ties go to the lower mass.
fn nearest_mass(mz: &[f64], target: f64, tolerance: f64) -> Option<usize> {
    let candidates = range_by_key(mz, target - tolerance, target + tolerance, |x| *x);
    let mut best: Option<(usize, f64)> = None;
    for idx in candidates {
        let dist = (mz[idx] - target).abs();
        match best {
            Some((_, best_dist)) if dist >= best_dist => {
                // masses are sorted, once it grows it keeps growing
                if dist > best_dist {
                    break;
                }
            }
            _ => best = Some((idx, dist)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Produces the smoothed samples of every scan, not yet height filtered.
///
/// With a positive time span every positive raw point is replaced by the
/// average intensity of the nearest mass in each non excluded scan whose
/// retention time falls within `[rt - span/2, rt + span/2)`. Otherwise the
/// raw points are passed through. Excluded scans yield nothing.
pub(crate) fn smooth_scans<S: ScanSource + ?Sized>(
    source: &S,
    excluded: &[bool],
    params: SmoothingParams,
    control: &RunControl,
) -> Result<Vec<Vec<Sample>>, Cancelled> {
    let num_scans = source.num_scans();
    let retention_times: Vec<f64> = (0..num_scans).map(|i| source.retention_time(i)).collect();
    let mz_tolerance = params.mz_tolerance.max(MIN_SMOOTHING_MZ_TOLERANCE);
    let half_span = params.time_span / 2.0;

    let mut out = Vec::with_capacity(num_scans);
    let mut visited = 0usize;
    for scan in 0..num_scans {
        control.checkpoint()?;
        control.report(Stage::Smoothing, scan, num_scans);

        if excluded[scan] {
            out.push(Vec::new());
            continue;
        }

        let (mz, intensity) = source.peaks(scan);
        if params.time_span <= 0.0 {
            let samples = mz
                .iter()
                .zip(intensity.iter())
                .enumerate()
                .map(|(raw_index, (&mz, &intensity))| Sample {
                    scan,
                    mz,
                    intensity,
                    raw_mz: mz,
                    raw_intensity: intensity,
                    raw_index,
                })
                .collect();
            out.push(samples);
            continue;
        }

        let rt = retention_times[scan];
        let first = retention_times
            .partition_point(|&x| x < rt - half_span)
            .min(scan);
        let last = retention_times
            .partition_point(|&x| x < rt + half_span)
            .max(scan + 1);
        let neighbours: Vec<(&[f64], &[f64])> = (first..last)
            .filter(|&j| !excluded[j])
            .map(|j| source.peaks(j))
            .collect();

        let mut samples = Vec::with_capacity(mz.len());
        for (raw_index, (&raw_mz, &raw_intensity)) in mz.iter().zip(intensity.iter()).enumerate() {
            if raw_intensity <= 0.0 {
                continue;
            }
            visited += 1;
            control.poll(visited)?;
            let mut sum = 0.0;
            let mut count = 0usize;
            for (other_mz, other_intensity) in neighbours.iter() {
                if let Some(idx) = nearest_mass(other_mz, raw_mz, mz_tolerance) {
                    if other_intensity[idx] > 0.0 {
                        sum += other_intensity[idx];
                        count += 1;
                    }
                }
            }
            let smoothed = if count > 0 { sum / count as f64 } else { 0.0 };
            samples.push(Sample {
                scan,
                mz: raw_mz,
                intensity: smoothed,
                raw_mz,
                raw_intensity,
                raw_index,
            });
        }
        out.push(samples);
    }
    control.complete(Stage::Smoothing);
    Ok(out)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub kept: usize,
    pub dropped: usize,
}

/// Keeps samples with an intensity of at least `min_height`.
pub(crate) fn filter_samples(
    per_scan: Vec<Vec<Sample>>,
    min_height: f64,
    control: &RunControl,
) -> Result<(SampleArena, FilterCounts), Cancelled> {
    let num_scans = per_scan.len();
    let mut counts = FilterCounts::default();
    let mut kept_scans = Vec::with_capacity(num_scans);
    for (scan, mut samples) in per_scan.into_iter().enumerate() {
        control.tick(Stage::SampleFiltering, scan, num_scans)?;
        let before = samples.len();
        samples.retain(|s| s.intensity >= min_height);
        counts.kept += samples.len();
        counts.dropped += before - samples.len();
        kept_scans.push(samples);
    }
    control.complete(Stage::SampleFiltering);

    let total = counts.kept + counts.dropped;
    let pct = if total > 0 {
        counts.kept as f64 * 100.0 / total as f64
    } else {
        0.0
    };
    info!(
        "{} intensities >= {} of {} ({:.2}%)",
        counts.kept, min_height, total, pct
    );
    Ok((SampleArena::from_scans(kept_scans), counts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scan;

    fn scans(points: &[(f64, Vec<f64>, Vec<f64>)]) -> Vec<Scan> {
        points
            .iter()
            .enumerate()
            .map(|(i, (rt, mz, int))| Scan::new(i as u32, *rt, mz.clone(), int.clone()))
            .collect()
    }

    #[test]
    fn test_nearest_mass() {
        let mz = [100.0, 100.004, 100.006, 100.02];
        assert_eq!(nearest_mass(&mz, 100.0045, 0.01), Some(1));
        assert_eq!(nearest_mass(&mz, 100.0, 0.01), Some(0));
        assert_eq!(nearest_mass(&mz, 100.019, 0.01), Some(3));
        assert_eq!(nearest_mass(&mz, 99.0, 0.01), None);
        assert_eq!(nearest_mass(&[], 99.0, 0.01), None);
    }

    #[test]
    fn test_no_smoothing_passes_raw_points() {
        let data = scans(&[(0.0, vec![100.0, 101.0], vec![5.0, 0.0])]);
        let params = SmoothingParams {
            time_span: 0.0,
            mz_tolerance: 0.0,
        };
        let out = smooth_scans(&data, &[false], params, &RunControl::new()).unwrap();
        assert_eq!(out[0].len(), 2);
        assert_eq!(out[0][1].raw_index, 1);
        assert_eq!(out[0][0].intensity, out[0][0].raw_intensity);
    }

    #[test]
    fn test_time_window_average() {
        let data = scans(&[
            (0.0, vec![100.0], vec![10.0]),
            (1.0, vec![100.001], vec![40.0]),
            (2.0, vec![99.999, 150.0], vec![70.0, 8.0]),
            (3.0, vec![100.0], vec![0.0]),
        ]);
        let params = SmoothingParams {
            time_span: 2.0,
            mz_tolerance: 0.01,
        };
        let excluded = [false; 4];
        let out = smooth_scans(&data, &excluded, params, &RunControl::new()).unwrap();
        // window for scan 1 is [0, 2): scans 0 and 1
        assert_eq!(out[1][0].intensity, 25.0);
        assert_eq!(out[1][0].raw_intensity, 40.0);
        // scan 2 sees scans 1 and 2; 150 only matches itself
        assert_eq!(out[2][0].intensity, 55.0);
        assert_eq!(out[2][1].intensity, 8.0);
        // scan 3 has no positive points
        assert!(out[3].is_empty());
        // first scan, only itself and nothing earlier
        assert_eq!(out[0][0].intensity, 10.0);

        // Bounded by the largest contributor
        for scan in out.iter() {
            for s in scan {
                assert!(s.intensity <= 70.0);
            }
        }
    }

    #[test]
    fn test_excluded_scans_do_not_contribute() {
        let data = scans(&[
            (0.0, vec![100.0], vec![10.0]),
            (1.0, vec![100.0], vec![1000.0]),
            (2.0, vec![100.0], vec![30.0]),
        ]);
        let params = SmoothingParams {
            time_span: 5.0,
            mz_tolerance: 0.01,
        };
        let out = smooth_scans(&data, &[false, true, false], params, &RunControl::new()).unwrap();
        assert!(out[1].is_empty());
        assert_eq!(out[0][0].intensity, 20.0);
        assert_eq!(out[2][0].intensity, 20.0);
    }

    #[test]
    fn test_filter_samples() {
        let data = scans(&[
            (0.0, vec![100.0, 101.0, 102.0], vec![5.0, 50.0, 10.0]),
            (1.0, vec![100.0], vec![9.99]),
        ]);
        let params = SmoothingParams {
            time_span: 0.0,
            mz_tolerance: 0.0,
        };
        let control = RunControl::new();
        let smoothed = smooth_scans(&data, &[false, false], params, &control).unwrap();
        let (arena, counts) = filter_samples(smoothed, 10.0, &control).unwrap();
        assert_eq!(counts, FilterCounts { kept: 2, dropped: 2 });
        assert_eq!(arena.scan(0).len(), 2);
        assert!(arena.scan(1).is_empty());
    }

    #[test]
    fn test_smoothing_is_cancellable() {
        let data = scans(&[(0.0, vec![100.0], vec![10.0])]);
        let control = RunControl::new();
        control.cancel();
        let params = SmoothingParams {
            time_span: 1.0,
            mz_tolerance: 0.01,
        };
        assert_eq!(smooth_scans(&data, &[false], params, &control), Err(Cancelled));
    }

    #[test]
    fn test_smoothed_never_exceeds_window_max() {
        use rand::{
            Rng,
            SeedableRng,
        };
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        let data: Vec<Scan> = (0..20)
            .map(|i| {
                let mz: Vec<f64> = (0..5)
                    .map(|k| 100.0 + k as f64 + rng.gen_range(-0.004..0.004))
                    .collect();
                let intensity: Vec<f64> = (0..5).map(|_| rng.gen_range(0.0..100.0)).collect();
                Scan::new(i, i as f64, mz, intensity)
            })
            .collect();
        let params = SmoothingParams {
            time_span: 2.0,
            mz_tolerance: 0.01,
        };
        let out = smooth_scans(&data, &[false; 20], params, &RunControl::new()).unwrap();
        for (scan, samples) in out.iter().enumerate() {
            // window [rt - 1, rt + 1) holds the previous scan and this one
            let bound = data[scan.saturating_sub(1)..=scan]
                .iter()
                .flat_map(|s| s.intensity.iter().copied())
                .fold(0.0, f64::max);
            for sample in samples {
                assert!(sample.intensity > 0.0);
                assert!(sample.intensity <= bound);
            }
        }
    }
}
