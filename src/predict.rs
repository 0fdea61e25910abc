//! Nearest-match prediction against a season's persisted scaler, cluster model and reference table.
//!
//! Everything here is read-only once loaded: a [`ModelRegistry`] is built at startup and every
//! request names its season explicitly.

use crate::config::DataLayout;
use crate::error::{Result, StatsError};
use crate::key_stats::key_columns;
use crate::ml::kmeans::{euclidean_distance, KMeansModel};
use crate::ml::persist::load_json;
use crate::ml::scaler::StandardScaler;
use crate::model::{ArchetypeLabel, FeatureVector, LabeledPlayer, SeasonType, FEATURE_COUNT};
use crate::table::{read_rows, REFERENCE_DELIMITER};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Label shown when no reference player falls in the predicted cluster
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Which reference players are candidates for the closest match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SearchScope {
    /// Every reference player of the season
    #[default]
    Population,
    /// Only reference players assigned to the predicted cluster
    SameCluster,
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchScope::Population => write!(f, "population"),
            SearchScope::SameCluster => write!(f, "same-cluster"),
        }
    }
}

/// Outcome of one prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub season: SeasonType,
    pub cluster: usize,
    /// Archetype representing the predicted cluster, `None` when the cluster has no reference rows
    pub label: Option<ArchetypeLabel>,
    pub closest_player: String,
    /// Euclidean distance in standardized space
    pub distance: f64,
}

impl Prediction {
    pub fn label_text(&self) -> &'static str {
        self.label.map(|l| l.as_str()).unwrap_or(UNKNOWN_LABEL)
    }
}

/// Scaler, cluster model and labeled reference table for one season type
#[derive(Debug, Clone)]
pub struct SeasonModels {
    pub season: SeasonType,
    pub scaler: StandardScaler,
    pub model: KMeansModel,
    pub reference: Vec<LabeledPlayer>,
    scaled: Vec<Vec<f64>>,
    assignments: Vec<usize>,
    cluster_labels: HashMap<usize, ArchetypeLabel>,
}

impl SeasonModels {
    pub fn new(
        season: SeasonType,
        scaler: StandardScaler,
        model: KMeansModel,
        reference: Vec<LabeledPlayer>,
    ) -> Result<Self> {
        if scaler.mean.len() != FEATURE_COUNT || model.dimensions() != FEATURE_COUNT {
            return Err(StatsError::Model(format!(
                "{} artifacts do not match the {} comparison features",
                season, FEATURE_COUNT
            )));
        }
        if reference.is_empty() {
            return Err(StatsError::EmptyDataset(format!("{} reference table", season)));
        }

        let scaled = reference
            .iter()
            .map(|p| scaler.transform(&p.features().to_array()))
            .collect::<Result<Vec<_>>>()?;
        let assignments: Vec<usize> = scaled.iter().map(|row| model.predict(row)).collect();
        let cluster_labels = majority_labels(&reference, &assignments);

        Ok(SeasonModels {
            season,
            scaler,
            model,
            reference,
            scaled,
            assignments,
            cluster_labels,
        })
    }

    /// Load the persisted artifacts and the clustered reference table
    pub fn load(season: SeasonType, scaler_path: &Path, model_path: &Path, clustered_path: &Path) -> Result<Self> {
        let scaler: StandardScaler = load_json(scaler_path)?;
        let model: KMeansModel = load_json(model_path)?;
        let mut required = key_columns();
        required.push("Cluster_Label");
        let reference: Vec<LabeledPlayer> = read_rows(clustered_path, REFERENCE_DELIMITER, &required)?;
        log::info!(
            "Loaded {} models: {} clusters, {} reference players",
            season,
            model.k(),
            reference.len()
        );
        Self::new(season, scaler, model, reference)
    }

    /// Archetype representing a cluster
    pub fn cluster_label(&self, cluster: usize) -> Option<ArchetypeLabel> {
        self.cluster_labels.get(&cluster).copied()
    }

    /// Cluster of each reference player, in table order
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    pub fn predict(&self, input: &FeatureVector, scope: SearchScope) -> Result<Prediction> {
        if let Some((column, value)) = input.first_non_finite() {
            return Err(StatsError::InvalidValue {
                column: column.to_string(),
                row: 1,
                value: value.to_string(),
            });
        }
        let scaled = self.scaler.transform(&input.to_array())?;
        let cluster = self.model.predict(&scaled);

        let same_cluster = |idx: &usize| self.assignments[*idx] == cluster;
        let mut best = match scope {
            SearchScope::Population => self.closest(&scaled, |_| true),
            SearchScope::SameCluster => self.closest(&scaled, same_cluster),
        };
        if best.is_none() {
            log::warn!(
                "No reference player in cluster {} for {}, searching the whole population",
                cluster,
                self.season
            );
            best = self.closest(&scaled, |_| true);
        }
        let (idx, distance) =
            best.ok_or_else(|| StatsError::EmptyDataset(format!("{} reference table", self.season)))?;

        Ok(Prediction {
            season: self.season,
            cluster,
            label: self.cluster_label(cluster),
            closest_player: self.reference[idx].player.clone(),
            distance,
        })
    }

    /// Stable argmin of the distance over the rows accepted by `filter`
    fn closest<F>(&self, scaled: &[f64], filter: F) -> Option<(usize, f64)>
    where
        F: Fn(&usize) -> bool,
    {
        let mut best: Option<(usize, f64)> = None;
        for idx in (0..self.scaled.len()).filter(|i| filter(i)) {
            let d = euclidean_distance(scaled, &self.scaled[idx]);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((idx, d));
            }
        }
        best
    }
}

/// Most frequent archetype per cluster; ties go to the label seen first in table order
fn majority_labels(reference: &[LabeledPlayer], assignments: &[usize]) -> HashMap<usize, ArchetypeLabel> {
    // cluster -> [(label, count)] in first-seen order
    let mut counts: HashMap<usize, Vec<(ArchetypeLabel, usize)>> = HashMap::new();
    for (player, &cluster) in reference.iter().zip(assignments) {
        let entry = counts.entry(cluster).or_default();
        match entry.iter_mut().find(|(label, _)| *label == player.label) {
            Some((_, count)) => *count += 1,
            None => entry.push((player.label, 1)),
        }
    }

    counts
        .into_iter()
        .filter_map(|(cluster, labels)| {
            let mut best: Option<(ArchetypeLabel, usize)> = None;
            for (label, count) in labels {
                if best.map_or(true, |(_, best_count)| count > best_count) {
                    best = Some((label, count));
                }
            }
            best.map(|(label, _)| (cluster, label))
        })
        .collect()
}

/// Both seasons' models, loaded once and shared read-only
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    regular: SeasonModels,
    playoffs: SeasonModels,
}

impl ModelRegistry {
    pub fn new(regular: SeasonModels, playoffs: SeasonModels) -> Self {
        ModelRegistry { regular, playoffs }
    }

    pub fn load(layout: &DataLayout) -> Result<Self> {
        let load = |season| {
            SeasonModels::load(
                season,
                &layout.scaler(season),
                &layout.cluster_model(season),
                &layout.clustered(season),
            )
        };
        Ok(ModelRegistry::new(
            load(SeasonType::Regular)?,
            load(SeasonType::Playoffs)?,
        ))
    }

    pub fn season(&self, season: SeasonType) -> &SeasonModels {
        match season {
            SeasonType::Regular => &self.regular,
            SeasonType::Playoffs => &self.playoffs,
        }
    }

    pub fn predict(&self, season: SeasonType, input: &FeatureVector, scope: SearchScope) -> Result<Prediction> {
        self.season(season).predict(input, scope)
    }
}
