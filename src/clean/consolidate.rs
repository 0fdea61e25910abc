//! Per-player deduplication: a player traded mid-season appears once per team in the raw export

use super::round_to;
use crate::model::PlayerSeasonRecord;
use std::collections::BTreeMap;

/// Keep only rows with at least `min_games` games played.
///
/// When the table has no `G` column the filter is skipped. Rows with a blank `G` in a table that
/// has the column are dropped, since they cannot be shown to meet the minimum.
pub fn drop_players_with_few_games(
    records: Vec<PlayerSeasonRecord>,
    min_games: f64,
    has_games_column: bool,
) -> Vec<PlayerSeasonRecord> {
    if !has_games_column {
        log::info!("'G' column not found in the dataset. Skipping game count filtering.");
        return records;
    }

    let original_count = records.len();
    let kept: Vec<PlayerSeasonRecord> = records
        .into_iter()
        .filter(|r| r.games.is_some_and(|g| g >= min_games))
        .collect();
    log::info!(
        "Dropped {} players with fewer than {} games.",
        original_count - kept.len(),
        min_games
    );
    kept
}

/// Collapse rows sharing a player name into one.
///
/// Numeric fields become the mean over the player's rows rounded to one decimal (blank optional
/// fields are left out of the mean, and stay blank if every row is blank). `Pos` comes from the
/// first row seen. Output is ordered by player name and re-numbered with a dense 1-based `ID`.
pub fn average_duplicate_players(records: Vec<PlayerSeasonRecord>) -> Vec<PlayerSeasonRecord> {
    let mut groups: BTreeMap<String, Vec<PlayerSeasonRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.player.clone()).or_default().push(record);
    }

    let mut consolidated: Vec<PlayerSeasonRecord> = groups
        .into_values()
        .filter_map(average_group)
        .collect();

    for (idx, record) in consolidated.iter_mut().enumerate() {
        record.id = Some(idx as u32 + 1);
    }
    consolidated
}

fn average_group(mut rows: Vec<PlayerSeasonRecord>) -> Option<PlayerSeasonRecord> {
    let n = rows.len();
    if n == 0 {
        return None;
    }

    let count_sums = rows.iter_mut().fold(vec![0.0; 19], |mut acc, row| {
        for (sum, value) in acc.iter_mut().zip(row.counts_mut()) {
            *sum += *value;
        }
        acc
    });

    let optional_sums = rows.iter_mut().fold(vec![(0.0, 0usize); 7], |mut acc, row| {
        for ((sum, present), value) in acc.iter_mut().zip(row.optionals_mut()) {
            if let Some(v) = *value {
                *sum += v;
                *present += 1;
            }
        }
        acc
    });

    let mut merged = rows.swap_remove(0);
    if n > 1 {
        log::debug!("Averaging {} rows for {}", n, merged.player);
    }

    for (slot, sum) in merged.counts_mut().into_iter().zip(&count_sums) {
        *slot = round_to(sum / n as f64, 1);
    }
    for (slot, (sum, present)) in merged.optionals_mut().into_iter().zip(&optional_sums) {
        *slot = (*present > 0).then(|| round_to(sum / *present as f64, 1));
    }
    Some(merged)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(player: &str, pos: &str, games: f64, pts: f64) -> PlayerSeasonRecord {
        PlayerSeasonRecord {
            id: None,
            player: player.to_string(),
            pos: pos.to_string(),
            age: 25.0,
            games: Some(games),
            games_started: None,
            mp: 30.0,
            fg: 8.0,
            fga: 16.0,
            fg_pct: Some(0.5),
            three_p: 2.0,
            three_pa: 5.0,
            three_pct: Some(0.4),
            two_p: 6.0,
            two_pa: 11.0,
            two_pct: Some(0.545),
            efg_pct: Some(0.563),
            ft: 3.0,
            fta: 4.0,
            ft_pct: Some(0.75),
            orb: 1.0,
            drb: 4.0,
            trb: 5.0,
            ast: 4.0,
            stl: 1.0,
            blk: 0.5,
            tov: 2.0,
            pf: 2.0,
            pts,
        }
    }

    #[test]
    fn test_min_games_filter() {
        let records = vec![record("A", "PG", 20.0, 10.0), record("B", "SG", 19.0, 10.0)];
        let kept = drop_players_with_few_games(records, 20.0, true);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].player, "A");
    }

    #[test]
    fn test_min_games_filter_skipped_without_column() {
        let mut short = record("B", "SG", 1.0, 10.0);
        short.games = None;
        let kept = drop_players_with_few_games(vec![short], 20.0, false);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_duplicates_are_averaged() {
        let mut traded_second = record("Trade Guy", "SF", 30.0, 13.0);
        traded_second.pos = "PF".to_string();
        traded_second.three_pct = None;
        traded_second.age = 26.0;
        let records = vec![
            record("Zed", "C", 70.0, 5.0),
            record("Trade Guy", "SG", 40.0, 10.0),
            traded_second,
        ];

        let out = average_duplicate_players(records);
        assert_eq!(out.len(), 2);

        let traded = &out[0];
        assert_eq!(traded.player, "Trade Guy");
        assert_eq!(traded.pos, "SG");
        assert_eq!(traded.pts, 11.5);
        assert_eq!(traded.games, Some(35.0));
        assert_eq!(traded.age, 25.5);
        assert_eq!(traded.three_pct, Some(0.4));
        assert_eq!(traded.id, Some(1));

        assert_eq!(out[1].player, "Zed");
        assert_eq!(out[1].id, Some(2));
    }

    #[test]
    fn test_single_rows_are_rounded_and_renumbered() {
        let mut a = record("A", "PG", 50.0, 10.04);
        a.id = Some(17);
        a.ft_pct = None;
        let out = average_duplicate_players(vec![a]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].pts, 10.0);
        assert_eq!(out[0].ft_pct, None);
        assert_eq!(out[0].id, Some(1));
    }

    #[test]
    fn test_row_count_never_grows() {
        let records = vec![
            record("A", "PG", 50.0, 10.0),
            record("B", "PG", 50.0, 12.0),
            record("A", "PG", 50.0, 14.0),
        ];
        let out = average_duplicate_players(records);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].pts, 12.0);
    }
}
