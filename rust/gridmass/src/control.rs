use serde::Serialize;
use std::sync::atomic::{
    AtomicBool,
    AtomicU64,
    Ordering,
};

/// How many inner loop iterations pass between cancellation polls.
pub(crate) const POLL_INTERVAL: usize = 64;

/// The weighted stages of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Smoothing,
    SampleFiltering,
    ProbeGrid,
    HillClimbing,
    Clustering,
    Assignment,
    Merging,
    SpanFiltering,
    Assembly,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Smoothing,
        Stage::SampleFiltering,
        Stage::ProbeGrid,
        Stage::HillClimbing,
        Stage::Clustering,
        Stage::Assignment,
        Stage::Merging,
        Stage::SpanFiltering,
        Stage::Assembly,
    ];

    /// Only used for progress feedback.
    pub fn weight(&self) -> f64 {
        1.0
    }

    pub fn total_weight() -> f64 {
        Self::ALL.iter().map(|s| s.weight()).sum()
    }

    fn offset(&self) -> f64 {
        Self::ALL
            .iter()
            .take_while(|s| *s != self)
            .map(|s| s.weight())
            .sum()
    }
}

/// Marker propagated with `?` when a run notices it was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cancelled;

/// Shared handle between a running detection and whoever hosts it.
///
/// The host keeps an `Arc<RunControl>`, polls [RunControl::progress] and
/// may call [RunControl::cancel] at any time; the run polls the flag at fine
/// granularity in every stage and unwinds without emitting features.
///
/// ```
/// use gridmass::RunControl;
/// use std::sync::Arc;
///
/// let control = Arc::new(RunControl::new());
/// let host_side = Arc::clone(&control);
/// assert_eq!(host_side.progress(), 0.0);
/// host_side.cancel();
/// assert!(control.is_cancelled());
/// ```
#[derive(Debug, Default)]
pub struct RunControl {
    cancelled: AtomicBool,
    // f64 bits, non negative floats order the same as their bit patterns
    progress_bits: AtomicU64,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Fraction of the run completed, in [0, 1]. Never decreases.
    pub fn progress(&self) -> f64 {
        f64::from_bits(self.progress_bits.load(Ordering::Relaxed))
    }

    pub(crate) fn report(&self, stage: Stage, done: usize, total: usize) {
        let fraction = if total == 0 {
            1.0
        } else {
            (done as f64 / total as f64).clamp(0.0, 1.0)
        };
        let value = ((stage.offset() + fraction * stage.weight()) / Stage::total_weight())
            .clamp(0.0, 1.0);
        self.progress_bits
            .fetch_max(value.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Called once per loop iteration; polls and reports every
    /// [POLL_INTERVAL] iterations.
    pub(crate) fn tick(&self, stage: Stage, done: usize, total: usize) -> Result<(), Cancelled> {
        if done % POLL_INTERVAL == 0 {
            self.checkpoint()?;
            self.report(stage, done, total);
        }
        Ok(())
    }

    /// Polls every [POLL_INTERVAL] iterations of an inner loop whose
    /// progress is reported by the enclosing loop.
    pub(crate) fn poll(&self, visited: usize) -> Result<(), Cancelled> {
        if visited % POLL_INTERVAL == 0 {
            self.checkpoint()?;
        }
        Ok(())
    }

    pub(crate) fn complete(&self, stage: Stage) {
        self.report(stage, 1, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotone() {
        let control = RunControl::new();
        control.report(Stage::Merging, 5, 10);
        let mid = control.progress();
        assert!(mid > 0.0 && mid < 1.0);
        // Going back to an earlier stage never lowers the value.
        control.report(Stage::Smoothing, 0, 10);
        assert_eq!(control.progress(), mid);
        control.complete(Stage::Assembly);
        assert_eq!(control.progress(), 1.0);
    }

    #[test]
    fn test_stage_offsets() {
        assert_eq!(Stage::total_weight(), 9.0);
        assert_eq!(Stage::Smoothing.offset(), 0.0);
        assert_eq!(Stage::Assembly.offset(), 8.0);
        let control = RunControl::new();
        control.report(Stage::HillClimbing, 1, 2);
        assert!((control.progress() - 3.5 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_tick_polls_cancellation() {
        let control = RunControl::new();
        assert!(control.tick(Stage::Smoothing, 0, 10).is_ok());
        control.cancel();
        // Only polled every POLL_INTERVAL iterations
        assert!(control.tick(Stage::Smoothing, 1, 10).is_ok());
        assert_eq!(control.tick(Stage::Smoothing, POLL_INTERVAL, 10), Err(Cancelled));
    }

    #[test]
    fn test_poll_checks_without_reporting() {
        let control = RunControl::new();
        control.cancel();
        assert!(control.poll(POLL_INTERVAL + 1).is_ok());
        assert_eq!(control.poll(2 * POLL_INTERVAL), Err(Cancelled));
        assert_eq!(control.progress(), 0.0);
    }
}
