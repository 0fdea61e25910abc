use serde::{Deserialize, Serialize};

use super::ArchetypeLabel;

/// Column names of the comparison vector, in the fixed order shared by training and inference
pub const FEATURE_NAMES: [&str; 8] = ["PTS", "Age", "Usage Rate", "AST", "TRB", "STL", "BLK", "3P%"];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// The 8-dimensional per-player comparison vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector {
    pub pts: f64,
    pub age: f64,
    pub usage_rate: f64,
    pub ast: f64,
    pub trb: f64,
    pub stl: f64,
    pub blk: f64,
    pub three_pct: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.pts,
            self.age,
            self.usage_rate,
            self.ast,
            self.trb,
            self.stl,
            self.blk,
            self.three_pct,
        ]
    }

    /// First feature that is NaN or infinite, with its name
    pub fn first_non_finite(&self) -> Option<(&'static str, f64)> {
        FEATURE_NAMES
            .iter()
            .copied()
            .zip(self.to_array())
            .find(|(_, value)| !value.is_finite())
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [pts, age, usage_rate, ast, trb, stl, blk, three_pct] = values;
        FeatureVector {
            pts,
            age,
            usage_rate,
            ast,
            trb,
            stl,
            blk,
            three_pct,
        }
    }
}

/// One row of the key-stats table: player identity plus the raw feature columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyStatsRow {
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "PTS")]
    pub pts: f64,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Usage Rate")]
    pub usage_rate: f64,
    #[serde(rename = "AST")]
    pub ast: f64,
    #[serde(rename = "TRB")]
    pub trb: f64,
    #[serde(rename = "STL")]
    pub stl: f64,
    #[serde(rename = "BLK")]
    pub blk: f64,
    /// Blank for players without a three-point attempt
    #[serde(rename = "3P%")]
    pub three_pct: Option<f64>,
}

impl KeyStatsRow {
    /// Comparison vector for this row; a blank 3P% counts as 0.0
    pub fn features(&self) -> FeatureVector {
        FeatureVector {
            pts: self.pts,
            age: self.age,
            usage_rate: self.usage_rate,
            ast: self.ast,
            trb: self.trb,
            stl: self.stl,
            blk: self.blk,
            three_pct: self.three_pct.unwrap_or(0.0),
        }
    }
}

/// One row of the clustered reference table: key stats plus the rule-assigned archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPlayer {
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "PTS")]
    pub pts: f64,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Usage Rate")]
    pub usage_rate: f64,
    #[serde(rename = "AST")]
    pub ast: f64,
    #[serde(rename = "TRB")]
    pub trb: f64,
    #[serde(rename = "STL")]
    pub stl: f64,
    #[serde(rename = "BLK")]
    pub blk: f64,
    #[serde(rename = "3P%")]
    pub three_pct: Option<f64>,
    #[serde(rename = "Cluster_Label")]
    pub label: ArchetypeLabel,
}

impl LabeledPlayer {
    pub fn new(row: KeyStatsRow, label: ArchetypeLabel) -> Self {
        LabeledPlayer {
            player: row.player,
            pts: row.pts,
            age: row.age,
            usage_rate: row.usage_rate,
            ast: row.ast,
            trb: row.trb,
            stl: row.stl,
            blk: row.blk,
            three_pct: row.three_pct,
            label,
        }
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector {
            pts: self.pts,
            age: self.age,
            usage_rate: self.usage_rate,
            ast: self.ast,
            trb: self.trb,
            stl: self.stl,
            blk: self.blk,
            three_pct: self.three_pct.unwrap_or(0.0),
        }
    }
}
