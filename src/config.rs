//! File layout and pipeline tunables

use crate::ml::kmeans::ClusteringConfig;
use crate::ml::prepare::PositionPolicy;
use crate::model::SeasonType;
use crate::predict::SearchScope;
use std::path::PathBuf;

/// Where every table and artifact lives, per season type, under two roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
}

impl Default for DataLayout {
    fn default() -> Self {
        DataLayout::new("data", "models")
    }
}

impl DataLayout {
    pub fn new(data_dir: impl Into<PathBuf>, models_dir: impl Into<PathBuf>) -> Self {
        DataLayout {
            data_dir: data_dir.into(),
            models_dir: models_dir.into(),
        }
    }

    fn data(&self, parts: &[&str]) -> PathBuf {
        parts.iter().fold(self.data_dir.clone(), |path, part| path.join(part))
    }

    pub fn raw(&self, season: SeasonType) -> PathBuf {
        self.data(&["raw", &format!("Combined NBA Player Stats - {}.csv", season.raw_suffix())])
    }

    pub fn cleaned(&self, season: SeasonType) -> PathBuf {
        self.data(&[
            "processed",
            "cleaned",
            &format!("Cleaned_NBA_Player_Stats_{}.csv", season.table_suffix()),
        ])
    }

    pub fn workbook(&self, season: SeasonType) -> PathBuf {
        self.data(&[
            "processed",
            "cleaned",
            &format!("Human_Readable_Cleaned_NBA_Player_Stats_{}.xlsx", season.table_suffix()),
        ])
    }

    pub fn ml_ready(&self, season: SeasonType) -> PathBuf {
        self.data(&[
            "processed",
            "ml_ready",
            &format!("ML_Ready_NBA_Player_Stats_{}.csv", season.table_suffix()),
        ])
    }

    pub fn player_mapping(&self, season: SeasonType) -> PathBuf {
        self.data(&[
            "processed",
            "ml_ready",
            &format!("Player_Mapping_{}.csv", season.table_suffix()),
        ])
    }

    pub fn key_stats(&self, season: SeasonType) -> PathBuf {
        self.data(&["key_stats", &format!("Key_Stats_{}.csv", season.table_suffix())])
    }

    pub fn clustered(&self, season: SeasonType) -> PathBuf {
        self.data(&["clustered", &format!("Clustered_Manual_{}.csv", season.table_suffix())])
    }

    pub fn correlation_report(&self, season: SeasonType) -> PathBuf {
        self.data(&["analysis", &format!("correlation_matrix_{}.csv", season.table_suffix())])
    }

    pub fn pca_report(&self, season: SeasonType) -> PathBuf {
        self.data(&["analysis", &format!("pca_variance_{}.csv", season.table_suffix())])
    }

    pub fn scaler(&self, season: SeasonType) -> PathBuf {
        self.models_dir.join(format!("scaler_{}.json", season.model_suffix()))
    }

    pub fn cluster_model(&self, season: SeasonType) -> PathBuf {
        self.models_dir.join(format!("kmeans_{}.json", season.model_suffix()))
    }
}

/// Tunables shared by the batch steps and the predictor
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Regular-season rows with fewer games are dropped before consolidation
    pub min_games: f64,
    pub clustering: ClusteringConfig,
    pub position_policy: PositionPolicy,
    pub search_scope: SearchScope,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            min_games: 20.0,
            clustering: ClusteringConfig::default(),
            position_policy: PositionPolicy::FirstListed,
            search_scope: SearchScope::Population,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = DataLayout::new("/srv/data", "/srv/models");
        assert_eq!(
            layout.raw(SeasonType::Regular),
            PathBuf::from("/srv/data/raw/Combined NBA Player Stats - Regular.csv")
        );
        assert_eq!(
            layout.cleaned(SeasonType::Playoffs),
            PathBuf::from("/srv/data/processed/cleaned/Cleaned_NBA_Player_Stats_Playoffs.csv")
        );
        assert_eq!(
            layout.key_stats(SeasonType::Regular),
            PathBuf::from("/srv/data/key_stats/Key_Stats_Regular_Season.csv")
        );
        assert_eq!(
            layout.cluster_model(SeasonType::Playoffs),
            PathBuf::from("/srv/models/kmeans_playoffs.json")
        );
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_games, 20.0);
        assert_eq!(config.clustering.k, 4);
        assert_eq!(config.clustering.seed, 42);
        assert_eq!(config.search_scope, SearchScope::Population);
    }
}
