//! Raw export → cleaned table: name repair, minimum-games filter, consolidation, derived metrics

pub mod consolidate;
pub mod metrics;
pub mod names;

use crate::config::PipelineConfig;
use crate::error::{Result, StatsError};
use crate::model::{Cell, CleanedRecord, PlayerSeasonRecord, SeasonType, REQUIRED_COLUMNS};
use crate::table::{self, StagedOutputs, PROCESSED_DELIMITER};
use crate::xlsx;
use std::path::Path;

pub use consolidate::{average_duplicate_players, drop_players_with_few_games};
pub use metrics::{add_advanced_metrics, apply_zero_guard, derive_metrics};
pub use names::normalize_name;

/// Columns of the raw export that the cleaned table leaves out
const DROPPED_COLUMNS: [&str; 2] = ["Tm", "Rk"];

/// Round half to even at `decimals` places, the way the exported tables are rounded
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Parsed raw export
#[derive(Debug)]
pub struct RawTable {
    pub records: Vec<PlayerSeasonRecord>,
    pub has_games_column: bool,
}

/// Read a raw `;`-delimited export
pub fn read_raw(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(PROCESSED_DELIMITER)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    table::require_columns(&headers, &REQUIRED_COLUMNS)?;

    for column in DROPPED_COLUMNS {
        if headers.iter().any(|h| h == column) {
            log::info!("'{}' column dropped successfully.", column);
        }
    }

    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }

    Ok(RawTable {
        records,
        has_games_column: headers.iter().any(|h| h == "G"),
    })
}

/// Run every cleaning stage over already-parsed rows
pub fn clean_records(raw: RawTable, season: SeasonType, config: &PipelineConfig) -> Result<Vec<CleanedRecord>> {
    let RawTable {
        mut records,
        has_games_column,
    } = raw;

    let fixed = names::normalize_names(records.iter_mut().map(|r| &mut r.player));
    log::info!("Fixed {} player names.", fixed);

    if season.applies_min_games() {
        records = drop_players_with_few_games(records, config.min_games, has_games_column);
    }

    let consolidated = average_duplicate_players(records);
    log::info!("Averaged statistics for duplicate players: {} unique players.", consolidated.len());

    add_advanced_metrics(consolidated)
}

/// Stage the cleaned table as `;`-delimited CSV
pub fn stage_cleaned(outputs: &mut StagedOutputs, path: &Path, records: &[CleanedRecord]) -> Result<()> {
    let first = records
        .first()
        .ok_or_else(|| StatsError::EmptyDataset(path.display().to_string()))?;
    let headers: Vec<&str> = first.columns().into_iter().map(|(name, _)| name).collect();
    let rows: Vec<Vec<Cell>> = records
        .iter()
        .map(|r| r.columns().into_iter().map(|(_, cell)| cell).collect())
        .collect();
    table::stage_cells(outputs, path, PROCESSED_DELIMITER, &headers, &rows)
}

/// Clean one season's raw export, writing the cleaned CSV and its human-readable workbook.
///
/// Both outputs are staged and committed together: nothing is replaced unless every stage succeeds.
pub fn clean_season(
    raw_path: &Path,
    cleaned_path: &Path,
    workbook_path: &Path,
    season: SeasonType,
    config: &PipelineConfig,
) -> Result<usize> {
    log::info!("Processing {}...", raw_path.display());
    let raw = read_raw(raw_path)?;
    let cleaned = clean_records(raw, season, config)?;
    if cleaned.is_empty() {
        return Err(StatsError::EmptyDataset(raw_path.display().to_string()));
    }

    let mut outputs = StagedOutputs::new();
    xlsx::stage_cleaned_workbook(&mut outputs, &cleaned, season, workbook_path)?;
    stage_cleaned(&mut outputs, cleaned_path, &cleaned)?;
    outputs.commit()?;
    log::info!("Human-readable backup saved to {}.", workbook_path.display());
    log::info!("Cleaned data saved to {}.", cleaned_path.display());
    Ok(cleaned.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const RAW: &str = "\
Rk;Player;Pos;Age;Tm;G;GS;MP;FG;FGA;FG%;3P;3PA;3P%;2P;2PA;2P%;eFG%;FT;FTA;FT%;ORB;DRB;TRB;AST;STL;BLK;TOV;PF;PTS
1;Nikola Joki?;C;28;DEN;79;79;34.6;10.4;17.9;.583;1.1;3.3;.359;9.3;14.6;.637;.615;4.5;5.5;.817;2.8;9.9;12.7;9.0;1.4;0.9;3.0;2.5;26.4
2;Trade Guy;SG;25;TOT;60;10;20.0;3.0;7.0;.429;1.0;3.0;.333;2.0;4.0;.5;.5;1.0;1.0;1.0;0.5;2.0;2.5;2.0;0.5;0.2;1.0;1.5;8.0
3;Trade Guy;SG;25;BOS;30;5;22.0;3.5;7.5;.467;1.0;3.0;.333;2.5;4.5;.556;.533;1.0;1.5;.667;0.5;2.0;2.5;2.0;0.5;0.2;1.0;1.5;9.0
4;Short Stint;PF;22;MEM;5;0;4.0;0.0;0.0;;0.0;0.0;;0.0;0.0;;;0.0;0.0;;0.0;1.0;1.0;0.0;0.0;0.0;0.0;0.4;0.0
";

    #[test]
    fn test_round_to_half_even() {
        assert_eq!(round_to(1.3125, 3), 1.312);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(11.56, 1), 11.6);
    }

    #[test]
    fn test_clean_regular_season_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let raw_path = dir.path().join("raw.csv");
        fs::write(&raw_path, RAW).unwrap();

        let cleaned_path = dir.path().join("cleaned.csv");
        let workbook_path = dir.path().join("cleaned.xlsx");
        let count = clean_season(
            &raw_path,
            &cleaned_path,
            &workbook_path,
            SeasonType::Regular,
            &PipelineConfig::default(),
        )
        .unwrap();

        // Short Stint has 5 games, dropped; Trade Guy's two rows become one
        assert_eq!(count, 2);
        assert!(workbook_path.exists());

        let content = fs::read_to_string(&cleaned_path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("ID;Player;Pos;Age;G;"));
        assert!(header.ends_with(";Usage Rate;PIE"));
        assert!(!header.contains("Tm"));

        let first = lines.next().unwrap();
        assert!(first.starts_with("1;Nikola Jokic;C;28.0;79.0;"));
        let second = lines.next().unwrap();
        assert!(second.starts_with("2;Trade Guy;SG;25.0;45.0;"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_playoffs_keep_short_stints_and_guard_zeros() {
        let raw = RawTable {
            records: {
                let dir = tempfile::tempdir().unwrap();
                let path = dir.path().join("raw.csv");
                fs::write(&path, RAW).unwrap();
                read_raw(&path).unwrap().records
            },
            has_games_column: true,
        };
        let cleaned = clean_records(raw, SeasonType::Playoffs, &PipelineConfig::default()).unwrap();
        assert_eq!(cleaned.len(), 3);

        let short = cleaned.iter().find(|c| c.record.player == "Short Stint").unwrap();
        assert_eq!(short.record.pts, 1.0);
        assert_eq!(short.record.fga, 1.0);
        assert_eq!(short.record.three_pct, None);
        assert_eq!(short.metrics.pts_per_fga, 1.0);
    }

    #[test]
    fn test_unwritable_csv_keeps_previous_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let raw_path = dir.path().join("raw.csv");
        fs::write(&raw_path, RAW).unwrap();
        let workbook_path = dir.path().join("cleaned.xlsx");
        fs::write(&workbook_path, "previous workbook").unwrap();
        let cleaned_path = dir.path().join("cleaned.csv");
        fs::create_dir(&cleaned_path).unwrap();

        let result = clean_season(
            &raw_path,
            &cleaned_path,
            &workbook_path,
            SeasonType::Regular,
            &PipelineConfig::default(),
        );
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&workbook_path).unwrap(), "previous workbook");
    }

    #[test]
    fn test_missing_column_aborts_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let raw_path = dir.path().join("raw.csv");
        fs::write(&raw_path, "Player;Pos;Age\nA;PG;20\n").unwrap();
        let cleaned_path = dir.path().join("cleaned.csv");

        let result = clean_season(
            &raw_path,
            &cleaned_path,
            &dir.path().join("cleaned.xlsx"),
            SeasonType::Regular,
            &PipelineConfig::default(),
        );
        assert!(matches!(result, Err(StatsError::MissingColumn(_))));
        assert!(!cleaned_path.exists());
    }
}
