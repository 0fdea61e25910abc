//! Cleaned table → ML-ready table: identity split off, positions one-hot encoded, numbers scaled

use super::scaler::ColumnStats;
use crate::error::{Result, StatsError};
use crate::table::{StagedOutputs, Table, PROCESSED_DELIMITER};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::path::Path;

/// Columns that never reach the ML-ready table
const NON_FEATURE_COLUMNS: [&str; 3] = ["ID", "Player", "PF"];

const ONE_HOT_PREFIX: &str = "Pos_";

/// How a dual position such as `PG-SG` collapses to one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionPolicy {
    /// Keep the first listed position
    FirstListed,
    /// Pick uniformly at random from an RNG seeded once per table
    Seeded { seed: u64 },
}

/// Resolve one position string. `rng` is only consulted for dual positions.
pub fn resolve_position(pos: &str, rng: Option<&mut StdRng>) -> String {
    let parts: Vec<&str> = pos.split('-').map(str::trim).filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return pos.trim().to_string();
    }
    let chosen = match rng {
        Some(rng) => parts.choose(rng).copied(),
        None => parts.first().copied(),
    };
    chosen.unwrap_or(pos).to_string()
}

/// Resolve every value of the `Pos` column under `policy`
pub fn standardize_positions(positions: &mut [String], policy: PositionPolicy) {
    let mut rng = match policy {
        PositionPolicy::FirstListed => None,
        PositionPolicy::Seeded { seed } => Some(StdRng::seed_from_u64(seed)),
    };
    for pos in positions.iter_mut() {
        *pos = resolve_position(pos, rng.as_mut());
    }
}

/// Result of [`prepare_table`]
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTables {
    pub ml_ready: Table,
    /// `ID`, `Player` pairs for interpreting ML-ready rows
    pub mapping: Table,
}

pub fn prepare_table(mut table: Table, policy: PositionPolicy) -> Result<PreparedTables> {
    let mapping = table.select(&["ID", "Player"])?;
    table.drop_columns(&NON_FEATURE_COLUMNS);

    // Positions
    let pos_idx = table.column_index("Pos")?;
    let mut positions: Vec<String> = table
        .rows
        .iter()
        .map(|row| row.get(pos_idx).cloned().unwrap_or_default())
        .collect();
    standardize_positions(&mut positions, policy);
    table.drop_columns(&["Pos"]);

    // Scale every remaining numeric column; text columns pass through
    let headers = table.headers.clone();
    for (col, name) in headers.iter().enumerate() {
        let Ok(values) = table.numeric_column(name) else {
            log::debug!("Column '{}' is not numeric, left unscaled", name);
            continue;
        };
        let Some(stats) = ColumnStats::fit(values.iter().flatten().copied()) else {
            continue;
        };
        for (row, value) in table.rows.iter_mut().zip(&values) {
            if let (Some(cell), Some(v)) = (row.get_mut(col), value) {
                *cell = format!("{:?}", stats.apply(*v));
            }
        }
    }

    // One-hot encode positions, categories in sorted order
    let categories: BTreeSet<&str> = positions.iter().map(String::as_str).collect();
    for category in &categories {
        table.headers.push(format!("{}{}", ONE_HOT_PREFIX, category));
    }
    for (row, pos) in table.rows.iter_mut().zip(&positions) {
        for category in &categories {
            row.push(if pos == category { "1" } else { "0" }.to_string());
        }
    }

    Ok(PreparedTables {
        ml_ready: table,
        mapping,
    })
}

/// Prepare one season: write the ML-ready table and the player mapping
pub fn prepare_season(
    cleaned_path: &Path,
    ml_ready_path: &Path,
    mapping_path: &Path,
    policy: PositionPolicy,
) -> Result<usize> {
    log::info!("Processing {}...", cleaned_path.display());
    let table = Table::read(cleaned_path, PROCESSED_DELIMITER)?;
    if table.rows.is_empty() {
        return Err(StatsError::EmptyDataset(cleaned_path.display().to_string()));
    }
    let prepared = prepare_table(table, policy)?;

    let mut outputs = StagedOutputs::new();
    prepared.mapping.stage(&mut outputs, mapping_path, PROCESSED_DELIMITER)?;
    prepared.ml_ready.stage(&mut outputs, ml_ready_path, PROCESSED_DELIMITER)?;
    outputs.commit()?;
    log::info!("Saved Player Mapping to {}.", mapping_path.display());
    log::info!("ML-ready data saved to {}.", ml_ready_path.display());
    Ok(prepared.ml_ready.rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_first_listed_position() {
        assert_eq!(resolve_position("PG-SG", None), "PG");
        assert_eq!(resolve_position("C", None), "C");
        assert_eq!(resolve_position("", None), "");
    }

    #[test]
    fn test_seeded_positions_are_reproducible() {
        let original: Vec<String> = ["PG-SG", "SF-PF", "C-PF", "SG-PG", "C"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut a = original.clone();
        let mut b = original.clone();
        standardize_positions(&mut a, PositionPolicy::Seeded { seed: 7 });
        standardize_positions(&mut b, PositionPolicy::Seeded { seed: 7 });
        assert_eq!(a, b);
        for (resolved, source) in a.iter().zip(&original) {
            assert!(source.split('-').any(|p| p == resolved));
        }
    }

    #[test]
    fn test_prepare_table() {
        let cleaned = table(
            &["ID", "Player", "Pos", "PTS", "PF", "3P%"],
            &[
                &["1", "A", "PG-SG", "10", "2", "0.4"],
                &["2", "B", "C", "20", "3", ""],
                &["3", "C", "SG", "30", "1", "0.2"],
            ],
        );
        let prepared = prepare_table(cleaned, PositionPolicy::FirstListed).unwrap();

        assert_eq!(prepared.mapping.headers, vec!["ID", "Player"]);
        assert_eq!(prepared.mapping.rows[2], vec!["3", "C"]);

        let ml = prepared.ml_ready;
        assert_eq!(ml.headers, vec!["PTS", "3P%", "Pos_C", "Pos_PG", "Pos_SG"]);
        let pts = ml.numeric_column("PTS").unwrap();
        assert_eq!(pts[1], Some(0.0));
        assert!(pts[0].unwrap() < 0.0 && pts[2].unwrap() > 0.0);
        // Blank stays blank and does not skew the others
        assert_eq!(ml.rows[1][1], "");
        let three = ml.numeric_column("3P%").unwrap()[0].unwrap();
        assert!((three - 1.0).abs() < 1e-9);
        assert_eq!(&ml.rows[0][2..], ["0", "1", "0"]);
        assert_eq!(&ml.rows[1][2..], ["1", "0", "0"]);
    }

    #[test]
    fn test_prepare_requires_identity_and_position() {
        let no_pos = table(&["ID", "Player", "PTS"], &[&["1", "A", "10"]]);
        assert!(matches!(
            prepare_table(no_pos, PositionPolicy::FirstListed),
            Err(StatsError::MissingColumn(c)) if c == "Pos"
        ));
        let no_id = table(&["Player", "Pos"], &[&["A", "C"]]);
        assert!(prepare_table(no_id, PositionPolicy::FirstListed).is_err());
    }

    #[test]
    fn test_blocked_ml_ready_path_keeps_previous_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let cleaned_path = dir.path().join("cleaned.csv");
        std::fs::write(&cleaned_path, "ID;Player;Pos;PTS;PF\n1;A;PG;10;2\n2;B;C;20;3\n").unwrap();
        let mapping_path = dir.path().join("mapping.csv");
        std::fs::write(&mapping_path, "previous mapping").unwrap();
        let ml_ready_path = dir.path().join("ml_ready.csv");
        std::fs::create_dir(&ml_ready_path).unwrap();

        let result = prepare_season(&cleaned_path, &ml_ready_path, &mapping_path, PositionPolicy::FirstListed);
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&mapping_path).unwrap(), "previous mapping");
    }
}
