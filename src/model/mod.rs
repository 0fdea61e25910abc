pub mod archetype;
pub mod feature;
pub mod record;
pub mod season;

pub use archetype::ArchetypeLabel;
pub use feature::{FeatureVector, KeyStatsRow, LabeledPlayer, FEATURE_COUNT, FEATURE_NAMES};
pub use record::{Cell, CleanedRecord, DerivedMetrics, PlayerSeasonRecord, REQUIRED_COLUMNS};
pub use season::SeasonType;
