//! Feature preparation, analysis, scaling and clustering

pub mod analysis;
pub mod kmeans;
pub mod persist;
pub mod prepare;
pub mod scaler;
pub mod train;

pub use kmeans::{ClusteringConfig, KMeansModel};
pub use prepare::PositionPolicy;
pub use scaler::StandardScaler;
pub use train::{train_season, TrainedModels};
