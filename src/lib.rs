pub mod clean;
pub mod config;
pub mod error;
pub mod key_stats;
pub mod labeler;
pub mod ml;
pub mod model;
pub mod pipeline;
pub mod predict;
pub mod prompt;
pub mod server;
pub mod table;
pub mod xlsx;

pub use config::{DataLayout, PipelineConfig};
pub use error::{Result, StatsError};
pub use model::*;
pub use predict::{ModelRegistry, Prediction, SearchScope, SeasonModels};
