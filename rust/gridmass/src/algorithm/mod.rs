//! The stages of a GridMass run, in execution order.
//!
//! 1. [smoothing]: time smoothing and height filtering into a
//!    [SampleArena](crate::models::SampleArena).
//! 2. [grid]: regular probe grid over the (mass, scan) plane.
//! 3. [climbing]: every probe climbs to its local maximum.
//! 4. [clustering]: probes sharing a maximum become a cluster.
//! 5. [ownership]: samples are handed to clusters.
//! 6. [merging]: close and similar clusters are joined, overly long chains
//!    of them removed.
//! 7. [continuity] and [assembly]: per scan maxima become features.
pub mod assembly;
pub mod climbing;
pub mod clustering;
pub mod continuity;
pub mod grid;
pub mod merging;
pub mod ownership;
pub mod smoothing;

pub use climbing::HillClimber;
pub use continuity::ScanMaxima;
pub use ownership::Ownership;
