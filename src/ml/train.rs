//! Fit and persist the scaler + cluster model for one season type

use super::kmeans::{ClusteringConfig, KMeansModel};
use super::persist::stage_json;
use super::scaler::StandardScaler;
use crate::error::Result;
use crate::key_stats::key_columns;
use crate::model::{FeatureVector, KeyStatsRow, FEATURE_COUNT, FEATURE_NAMES};
use crate::table::{read_rows, StagedOutputs, REFERENCE_DELIMITER};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModels {
    pub scaler: StandardScaler,
    pub model: KMeansModel,
    /// Cluster of each training row, in row order
    pub labels: Vec<usize>,
}

impl TrainedModels {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.model.k()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Standardize the raw feature vectors, then cluster them
pub fn fit_models(features: &[FeatureVector], config: &ClusteringConfig) -> Result<TrainedModels> {
    let rows: Vec<[f64; FEATURE_COUNT]> = features.iter().map(FeatureVector::to_array).collect();
    let scaler = StandardScaler::fit(&FEATURE_NAMES, &rows)?;
    let scaled = scaler.transform_all(&rows)?;
    let fit = KMeansModel::fit(&scaled, config)?;
    Ok(TrainedModels {
        scaler,
        model: fit.model,
        labels: fit.labels,
    })
}

/// Train on a key-stats table and write both artifacts once fitting has succeeded
pub fn train_season(
    key_stats_path: &Path,
    scaler_path: &Path,
    model_path: &Path,
    config: &ClusteringConfig,
) -> Result<TrainedModels> {
    log::info!("Loading {}...", key_stats_path.display());
    let rows: Vec<KeyStatsRow> = read_rows(key_stats_path, REFERENCE_DELIMITER, &key_columns())?;
    let features: Vec<FeatureVector> = rows.iter().map(KeyStatsRow::features).collect();

    let trained = fit_models(&features, config)?;
    log::info!(
        "Fitted {} clusters on {} players (inertia {:.3}, sizes {:?})",
        trained.model.k(),
        features.len(),
        trained.model.inertia,
        trained.cluster_sizes()
    );

    // The scaler and the model are only usable as a pair
    let mut outputs = StagedOutputs::new();
    stage_json(&mut outputs, scaler_path, &trained.scaler)?;
    stage_json(&mut outputs, model_path, &trained.model)?;
    outputs.commit()?;
    log::info!("Saved scaler to {}", scaler_path.display());
    log::info!("Saved kmeans model to {}", model_path.display());
    Ok(trained)
}
