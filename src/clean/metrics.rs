//! Advanced per-player metrics derived from consolidated box-score counts

use super::round_to;
use crate::error::{Result, StatsError};
use crate::model::{CleanedRecord, DerivedMetrics, PlayerSeasonRecord};

/// Replace a zero PTS, MP, TOV or FGA with 1.
///
/// This rewrites the stored values, not just the divisors: the cleaned table carries the
/// substituted 1s. Run it once, before [`derive_metrics`].
pub fn apply_zero_guard(record: &mut PlayerSeasonRecord) {
    for value in [
        &mut record.pts,
        &mut record.mp,
        &mut record.tov,
        &mut record.fga,
    ] {
        if *value == 0.0 {
            *value = 1.0;
        }
    }
}

/// Compute the derived columns for a zero-guarded record.
///
/// Needs the games-played value for the rebound ratio. Applying this to a table that already has
/// derived columns is not supported.
pub fn derive_metrics(record: &PlayerSeasonRecord) -> Result<DerivedMetrics> {
    let games = record
        .games
        .ok_or_else(|| StatsError::MissingColumn("G".to_string()))?;
    let r = |x: f64| round_to(x, 3);

    Ok(DerivedMetrics {
        three_p_dependency: r(record.three_p * 3.0 / record.pts),
        two_p_dependency: r(record.two_p * 2.0 / record.pts),
        ft_dependency: r(record.ft / record.pts),
        pts_per_min: r(record.pts / record.mp),
        ast_per_min: r(record.ast / record.mp),
        trb_per_min: r(record.trb / record.mp),
        stl_per_min: r(record.stl / record.mp),
        blk_per_min: r(record.blk / record.mp),
        ast_to_tov: r(record.ast / record.tov),
        rebound_ratio: r((record.orb + record.drb) / games),
        pts_per_fga: r(record.pts / record.fga),
        ft_rate: r(record.fta / record.fga),
        usage_rate: r((record.fga + 0.44 * record.fta + record.tov) / record.mp),
        // Absolute impact score: not normalized by game totals
        pie: r(record.pts + record.fg + record.ft - record.fga - record.fta
            + record.orb
            + record.drb
            + record.ast
            + record.stl
            + record.blk
            - record.tov),
    })
}

/// Zero-guard every record, then attach its derived metrics
pub fn add_advanced_metrics(records: Vec<PlayerSeasonRecord>) -> Result<Vec<CleanedRecord>> {
    let cleaned = records
        .into_iter()
        .map(|mut record| {
            apply_zero_guard(&mut record);
            let metrics = derive_metrics(&record)?;
            Ok(CleanedRecord { record, metrics })
        })
        .collect::<Result<Vec<_>>>()?;
    log::info!("Advanced metrics added successfully.");
    Ok(cleaned)
}
