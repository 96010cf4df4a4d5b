use crate::errors::{
    GridMassError,
    ScanDefect,
};

/// Read access to a time ordered sequence of centroided scans.
///
/// Index `idx` is the position of the scan in the run (0 based), not the
/// instrument scan number. Masses of a scan must be sorted ascending and
/// paired one to one with intensities.
pub trait ScanSource {
    fn num_scans(&self) -> usize;
    fn retention_time(&self, idx: usize) -> f64;
    /// Returns `(masses, intensities)` of the scan.
    fn peaks(&self, idx: usize) -> (&[f64], &[f64]);

    /// Number used in messages and reported in features.
    fn scan_number(&self, idx: usize) -> u32 {
        idx as u32
    }
}

impl<T: ScanSource + ?Sized> ScanSource for &T {
    fn num_scans(&self) -> usize {
        (**self).num_scans()
    }

    fn retention_time(&self, idx: usize) -> f64 {
        (**self).retention_time(idx)
    }

    fn peaks(&self, idx: usize) -> (&[f64], &[f64]) {
        (**self).peaks(idx)
    }

    fn scan_number(&self, idx: usize) -> u32 {
        (**self).scan_number(idx)
    }
}

/// Checks the preconditions a run relies on.
///
/// Fails on an empty source, a non finite or decreasing retention time,
/// and on scans whose arrays differ in length or whose masses are unsorted.
pub fn validate_source<S: ScanSource + ?Sized>(source: &S) -> Result<(), GridMassError> {
    if source.num_scans() == 0 {
        return Err(GridMassError::NoScans);
    }

    let mut previous_rt = f64::NEG_INFINITY;
    for idx in 0..source.num_scans() {
        let scan_number = source.scan_number(idx);
        let rt = source.retention_time(idx);
        if !rt.is_finite() {
            return Err(GridMassError::InvalidScan {
                scan_number,
                defect: ScanDefect::NonFiniteRetentionTime,
            });
        }
        if rt < previous_rt {
            return Err(GridMassError::UnorderedRetentionTimes {
                scan_number,
                rt,
                previous_rt,
            });
        }
        previous_rt = rt;

        let (mz, intensity) = source.peaks(idx);
        if mz.len() != intensity.len() {
            return Err(GridMassError::InvalidScan {
                scan_number,
                defect: ScanDefect::LengthMismatch {
                    mz: mz.len(),
                    intensity: intensity.len(),
                },
            });
        }
        // `!(a <= b)` so NaN masses are reported too
        if let Some(position) = mz.windows(2).position(|w| !(w[0] <= w[1])) {
            return Err(GridMassError::InvalidScan {
                scan_number,
                defect: ScanDefect::UnsortedMasses {
                    position: position + 1,
                },
            });
        }
    }
    Ok(())
}
