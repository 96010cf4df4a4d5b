use crate::errors::{
    ConfigError,
    TimeRangeError,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::str::FromStr;

/// Parameters of a GridMass run.
///
/// All values are plain, already resolved numbers: nothing is defaulted or
/// estimated from the data. Times share the unit of the scans' retention
/// times (minutes for most instruments) and masses are in m/z.
///
/// Example:
/// ```
/// use gridmass::GridMassConfig;
///
/// let config = GridMassConfig {
///     min_height: 1e3,
///     mz_tolerance: 0.005,
///     min_time_span: 0.1,
///     max_time_span: 3.0,
///     smoothing_time_span: 0.1,
///     smoothing_mz_tolerance: 0.05,
///     intensity_similarity: 0.5,
///     ignore_times: vec!["0-1.5".parse().unwrap()],
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridMassConfig {
    /// Samples below this (smoothed) intensity are never considered.
    pub min_height: f64,
    /// Mass tolerance used for the probe grid spacing and to join maxima.
    pub mz_tolerance: f64,
    /// Minimum time span of a peak.
    pub min_time_span: f64,
    /// Maximum time span of a peak; longer chains of similar maxima
    /// (solvent fronts, ridges) are removed.
    pub max_time_span: f64,
    /// Width of the time window averaged by the smoother, 0 disables smoothing.
    #[serde(default)]
    pub smoothing_time_span: f64,
    /// Mass tolerance used to match samples across scans while smoothing.
    #[serde(default)]
    pub smoothing_mz_tolerance: f64,
    /// Two maxima are considered similar when `min/max` of their
    /// intensities is strictly above this ratio.
    pub intensity_similarity: f64,
    /// Retention time intervals skipped entirely (eg. solvent delay).
    #[serde(default)]
    pub ignore_times: Vec<TimeRange>,
}

impl GridMassConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("min_height", self.min_height),
            ("mz_tolerance", self.mz_tolerance),
            ("min_time_span", self.min_time_span),
            ("max_time_span", self.max_time_span),
            ("smoothing_time_span", self.smoothing_time_span),
            ("smoothing_mz_tolerance", self.smoothing_mz_tolerance),
            ("intensity_similarity", self.intensity_similarity),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        // the grid spacing derives from it
        if self.mz_tolerance <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "mz_tolerance",
                value: self.mz_tolerance,
            });
        }
        if self.min_time_span > self.max_time_span {
            return Err(ConfigError::InvertedTimeSpan {
                min: self.min_time_span,
                max: self.max_time_span,
            });
        }
        if self.intensity_similarity > 1.0 {
            return Err(ConfigError::SimilarityOutOfRange(
                self.intensity_similarity,
            ));
        }
        for range in &self.ignore_times {
            TimeRange::try_new(range.start, range.end)?;
        }
        Ok(())
    }

    /// True if the retention time falls in any of the ignored intervals.
    pub fn is_excluded(&self, rt: f64) -> bool {
        self.ignore_times.iter().any(|r| r.contains(rt))
    }
}

/// Closed retention time interval [start, end].
///
/// Serialized as a two element array, and parseable from the `"start-end"`
/// text form; [parse_time_ranges] handles comma separated lists of them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct TimeRange {
    start: f64,
    end: f64,
}

impl TimeRange {
    pub fn try_new(start: f64, end: f64) -> Result<Self, TimeRangeError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(TimeRangeError::NonFinite(start, end));
        }
        if start > end {
            return Err(TimeRangeError::Inverted(start, end));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.start && value <= self.end
    }
}

impl TryFrom<(f64, f64)> for TimeRange {
    type Error = TimeRangeError;

    fn try_from(value: (f64, f64)) -> Result<Self, Self::Error> {
        Self::try_new(value.0, value.1)
    }
}

impl From<TimeRange> for (f64, f64) {
    fn from(value: TimeRange) -> Self {
        (value.start, value.end)
    }
}

impl FromStr for TimeRange {
    type Err = TimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (left, right) = s
            .split_once('-')
            .ok_or_else(|| TimeRangeError::Unparseable(s.to_string()))?;
        let start: f64 = left
            .trim()
            .parse()
            .map_err(|_| TimeRangeError::Unparseable(s.to_string()))?;
        let end: f64 = right
            .trim()
            .parse()
            .map_err(|_| TimeRangeError::Unparseable(s.to_string()))?;
        Self::try_new(start, end)
    }
}

/// Parses a list such as `"0-1.5, 30-32.5"`. Empty entries are skipped.
pub fn parse_time_ranges(s: &str) -> Result<Vec<TimeRange>, TimeRangeError> {
    s.split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(TimeRange::from_str)
        .collect()
}
