use serde::Deserialize;

/// Columns every raw or cleaned table must carry. `G` is deliberately absent: a table
/// without it only skips the minimum-games filter.
pub const REQUIRED_COLUMNS: [&str; 21] = [
    "Player", "Pos", "Age", "MP", "FG", "FGA", "3P", "3PA", "2P", "2PA", "FT", "FTA", "ORB", "DRB",
    "TRB", "AST", "STL", "BLK", "TOV", "PF", "PTS",
];

/// One player's line for one season type, as found in the raw export or the cleaned table.
///
/// Team (`Tm`) and rank (`Rk`) columns are not part of the record and are dropped on read.
/// Percentages and `GS` are blank in the source when the player had no attempts/starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerSeasonRecord {
    #[serde(rename = "ID", default)]
    pub id: Option<u32>,
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "Pos")]
    pub pos: String,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "G", default)]
    pub games: Option<f64>,
    #[serde(rename = "GS", default)]
    pub games_started: Option<f64>,
    #[serde(rename = "MP")]
    pub mp: f64,
    #[serde(rename = "FG")]
    pub fg: f64,
    #[serde(rename = "FGA")]
    pub fga: f64,
    #[serde(rename = "FG%", default)]
    pub fg_pct: Option<f64>,
    #[serde(rename = "3P")]
    pub three_p: f64,
    #[serde(rename = "3PA")]
    pub three_pa: f64,
    #[serde(rename = "3P%", default)]
    pub three_pct: Option<f64>,
    #[serde(rename = "2P")]
    pub two_p: f64,
    #[serde(rename = "2PA")]
    pub two_pa: f64,
    #[serde(rename = "2P%", default)]
    pub two_pct: Option<f64>,
    #[serde(rename = "eFG%", default)]
    pub efg_pct: Option<f64>,
    #[serde(rename = "FT")]
    pub ft: f64,
    #[serde(rename = "FTA")]
    pub fta: f64,
    #[serde(rename = "FT%", default)]
    pub ft_pct: Option<f64>,
    #[serde(rename = "ORB")]
    pub orb: f64,
    #[serde(rename = "DRB")]
    pub drb: f64,
    #[serde(rename = "TRB")]
    pub trb: f64,
    #[serde(rename = "AST")]
    pub ast: f64,
    #[serde(rename = "STL")]
    pub stl: f64,
    #[serde(rename = "BLK")]
    pub blk: f64,
    #[serde(rename = "TOV")]
    pub tov: f64,
    #[serde(rename = "PF")]
    pub pf: f64,
    #[serde(rename = "PTS")]
    pub pts: f64,
}

impl PlayerSeasonRecord {
    /// Mutable handles on every numeric field that is always present
    pub fn counts_mut(&mut self) -> [&mut f64; 19] {
        [
            &mut self.age,
            &mut self.mp,
            &mut self.fg,
            &mut self.fga,
            &mut self.three_p,
            &mut self.three_pa,
            &mut self.two_p,
            &mut self.two_pa,
            &mut self.ft,
            &mut self.fta,
            &mut self.orb,
            &mut self.drb,
            &mut self.trb,
            &mut self.ast,
            &mut self.stl,
            &mut self.blk,
            &mut self.tov,
            &mut self.pf,
            &mut self.pts,
        ]
    }

    /// Mutable handles on the numeric fields that may be blank
    pub fn optionals_mut(&mut self) -> [&mut Option<f64>; 7] {
        [
            &mut self.games,
            &mut self.games_started,
            &mut self.fg_pct,
            &mut self.three_pct,
            &mut self.two_pct,
            &mut self.efg_pct,
            &mut self.ft_pct,
        ]
    }

    /// Column names and values in cleaned-table order (ID first, derived metrics excluded)
    pub fn columns(&self) -> Vec<(&'static str, Cell)> {
        vec![
            (
                "ID",
                self.id
                    .map(|id| Cell::Text(id.to_string()))
                    .unwrap_or(Cell::Blank),
            ),
            ("Player", Cell::Text(self.player.clone())),
            ("Pos", Cell::Text(self.pos.clone())),
            ("Age", Cell::Number(self.age)),
            ("G", Cell::from(self.games)),
            ("GS", Cell::from(self.games_started)),
            ("MP", Cell::Number(self.mp)),
            ("FG", Cell::Number(self.fg)),
            ("FGA", Cell::Number(self.fga)),
            ("FG%", Cell::from(self.fg_pct)),
            ("3P", Cell::Number(self.three_p)),
            ("3PA", Cell::Number(self.three_pa)),
            ("3P%", Cell::from(self.three_pct)),
            ("2P", Cell::Number(self.two_p)),
            ("2PA", Cell::Number(self.two_pa)),
            ("2P%", Cell::from(self.two_pct)),
            ("eFG%", Cell::from(self.efg_pct)),
            ("FT", Cell::Number(self.ft)),
            ("FTA", Cell::Number(self.fta)),
            ("FT%", Cell::from(self.ft_pct)),
            ("ORB", Cell::Number(self.orb)),
            ("DRB", Cell::Number(self.drb)),
            ("TRB", Cell::Number(self.trb)),
            ("AST", Cell::Number(self.ast)),
            ("STL", Cell::Number(self.stl)),
            ("BLK", Cell::Number(self.blk)),
            ("TOV", Cell::Number(self.tov)),
            ("PF", Cell::Number(self.pf)),
            ("PTS", Cell::Number(self.pts)),
        ]
    }
}

/// Advanced metrics derived from a consolidated record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedMetrics {
    pub three_p_dependency: f64,
    pub two_p_dependency: f64,
    pub ft_dependency: f64,
    pub pts_per_min: f64,
    pub ast_per_min: f64,
    pub trb_per_min: f64,
    pub stl_per_min: f64,
    pub blk_per_min: f64,
    pub ast_to_tov: f64,
    pub rebound_ratio: f64,
    pub pts_per_fga: f64,
    pub ft_rate: f64,
    pub usage_rate: f64,
    pub pie: f64,
}

impl DerivedMetrics {
    pub fn columns(&self) -> Vec<(&'static str, Cell)> {
        vec![
            ("3P Dependency", Cell::Number(self.three_p_dependency)),
            ("2P Dependency", Cell::Number(self.two_p_dependency)),
            ("FT Dependency", Cell::Number(self.ft_dependency)),
            ("PTS/MP", Cell::Number(self.pts_per_min)),
            ("AST/MP", Cell::Number(self.ast_per_min)),
            ("TRB/MP", Cell::Number(self.trb_per_min)),
            ("STL/MP", Cell::Number(self.stl_per_min)),
            ("BLK/MP", Cell::Number(self.blk_per_min)),
            ("AST/TOV", Cell::Number(self.ast_to_tov)),
            ("Rebound Ratio", Cell::Number(self.rebound_ratio)),
            ("PTS/FGA", Cell::Number(self.pts_per_fga)),
            ("FT Rate", Cell::Number(self.ft_rate)),
            ("Usage Rate", Cell::Number(self.usage_rate)),
            ("PIE", Cell::Number(self.pie)),
        ]
    }
}

/// A consolidated record together with its derived metrics: one row of the cleaned table
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub record: PlayerSeasonRecord,
    pub metrics: DerivedMetrics,
}

impl CleanedRecord {
    pub fn columns(&self) -> Vec<(&'static str, Cell)> {
        let mut columns = self.record.columns();
        columns.extend(self.metrics.columns());
        columns
    }
}

/// A single output value; blanks stay blank in CSV and empty in the workbook
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Blank,
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Blank)
    }
}

impl Cell {
    /// CSV rendering. Whole numbers keep a trailing ".0" the way float columns are exported.
    pub fn to_csv_field(&self) -> String {
        match self {
            Cell::Number(n) => format!("{:?}", n),
            Cell::Text(s) => s.clone(),
            Cell::Blank => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_rendering() {
        assert_eq!(Cell::Number(12.0).to_csv_field(), "12.0");
        assert_eq!(Cell::Number(0.375).to_csv_field(), "0.375");
        assert_eq!(Cell::Text("PG".into()).to_csv_field(), "PG");
        assert_eq!(Cell::from(None).to_csv_field(), "");
    }

    #[test]
    fn test_columns_start_with_identity() {
        let record = PlayerSeasonRecord {
            id: Some(3),
            player: "Nikola Jokic".into(),
            pos: "C".into(),
            age: 28.0,
            games: Some(69.0),
            games_started: None,
            mp: 34.6,
            fg: 10.4,
            fga: 17.9,
            fg_pct: Some(0.583),
            three_p: 1.1,
            three_pa: 3.3,
            three_pct: None,
            two_p: 9.3,
            two_pa: 14.6,
            two_pct: Some(0.637),
            efg_pct: None,
            ft: 4.5,
            fta: 5.5,
            ft_pct: Some(0.822),
            orb: 2.8,
            drb: 9.9,
            trb: 12.7,
            ast: 9.0,
            stl: 1.4,
            blk: 0.9,
            tov: 3.0,
            pf: 2.3,
            pts: 26.4,
        };
        let columns = record.columns();
        assert_eq!(columns[0], ("ID", Cell::Text("3".into())));
        assert_eq!(columns[1].0, "Player");
        assert_eq!(columns[5], ("GS", Cell::Blank));
        assert_eq!(columns.last().map(|c| c.0), Some("PTS"));
        for required in REQUIRED_COLUMNS {
            assert!(columns.iter().any(|(name, _)| *name == required), "{}", required);
        }
    }
}
