//! Rule-based archetype labeling of the key-stats table

use crate::error::Result;
use crate::model::{ArchetypeLabel, FeatureVector, KeyStatsRow, LabeledPlayer};
use crate::table::{read_rows, write_rows, REFERENCE_DELIMITER};
use std::path::Path;

/// Ordered decision list, first match wins.
///
/// Usage rate is compared as a per-minute fraction in the bench, defensive and shooter rules but
/// on a percentage-like scale in the all-star rule; the thresholds are kept exactly as authored.
pub fn assign_archetype(v: &FeatureVector) -> ArchetypeLabel {
    if v.pts < 5.0 || v.usage_rate < 0.2 {
        ArchetypeLabel::BenchPlayer
    } else if v.pts >= 23.0 || (v.usage_rate >= 28.0 && v.pts >= 20.0) {
        ArchetypeLabel::AllStar
    } else if v.stl + v.blk >= 2.0 {
        ArchetypeLabel::DefensiveSpecialist
    } else if v.three_pct >= 40.0 && v.usage_rate >= 0.5 {
        ArchetypeLabel::ThreePointSpecialist
    } else {
        ArchetypeLabel::RolePlayer
    }
}

pub fn label_rows(rows: Vec<KeyStatsRow>) -> Vec<LabeledPlayer> {
    rows.into_iter()
        .map(|row| {
            let label = assign_archetype(&row.features());
            LabeledPlayer::new(row, label)
        })
        .collect()
}

/// Label every row of a key-stats table and write the clustered reference table
pub fn label_season(key_stats_path: &Path, clustered_path: &Path) -> Result<usize> {
    let rows: Vec<KeyStatsRow> =
        read_rows(key_stats_path, REFERENCE_DELIMITER, &crate::key_stats::key_columns())?;
    let labeled = label_rows(rows);
    write_rows(clustered_path, REFERENCE_DELIMITER, &labeled)?;
    log::info!("Saved clustered data to {}", clustered_path.display());
    Ok(labeled.len())
}
