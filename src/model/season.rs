use crate::error::{Result, StatsError};
use std::fmt;

/// Regular season or playoffs. Every table, scaler and model exists once per season type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeasonType {
    Regular,
    Playoffs,
}

impl SeasonType {
    pub const ALL: [SeasonType; 2] = [SeasonType::Regular, SeasonType::Playoffs];

    /// Parse the one-letter selector used by the form and the prompt ("R" / "P", any case)
    pub fn from_code(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "R" => Ok(SeasonType::Regular),
            "P" => Ok(SeasonType::Playoffs),
            _ => Err(StatsError::InvalidSeason(s.trim().to_string())),
        }
    }

    pub fn code(&self) -> char {
        match self {
            SeasonType::Regular => 'R',
            SeasonType::Playoffs => 'P',
        }
    }

    /// Suffix of the raw export file ("Combined NBA Player Stats - Regular.csv")
    pub fn raw_suffix(&self) -> &'static str {
        match self {
            SeasonType::Regular => "Regular",
            SeasonType::Playoffs => "Playoffs",
        }
    }

    /// Suffix of every processed table ("..._Regular_Season.csv")
    pub fn table_suffix(&self) -> &'static str {
        match self {
            SeasonType::Regular => "Regular_Season",
            SeasonType::Playoffs => "Playoffs",
        }
    }

    /// Suffix of the persisted artifacts ("scaler_regular.json")
    pub fn model_suffix(&self) -> &'static str {
        match self {
            SeasonType::Regular => "regular",
            SeasonType::Playoffs => "playoffs",
        }
    }

    /// Only the regular season drops players with too few games
    pub fn applies_min_games(&self) -> bool {
        matches!(self, SeasonType::Regular)
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonType::Regular => write!(f, "Regular Season"),
            SeasonType::Playoffs => write!(f, "Playoffs"),
        }
    }
}
