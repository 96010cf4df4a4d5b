pub mod cluster;
pub mod feature;
pub mod geometry;
pub mod probe;
pub mod sample;
pub mod scan;

pub use cluster::{
    intensity_similarity,
    Cluster,
    ClusterId,
    ClusterState,
};
pub use feature::{
    Feature,
    FeaturePoint,
};
pub use geometry::RunGeometry;
pub use probe::{
    ConvergedProbe,
    Probe,
    Summit,
};
pub use sample::{
    Sample,
    SampleArena,
    SampleRef,
};
pub use scan::{
    Scan,
    ScanCollection,
    ScanSelection,
    SelectedScans,
};
