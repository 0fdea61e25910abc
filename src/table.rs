//! Delimited table I/O shared by every pipeline step.
//!
//! Raw, cleaned and ML-ready tables use `;`; the key-stats and clustered reference tables use `,`.
//! Every writer goes through [`StagedOutputs`]: a step stages all of its outputs and commits
//! them together, so a step that fails half-way leaves the previous outputs untouched.

use crate::error::{Result, StatsError};
use crate::model::Cell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Delimiter of raw, cleaned, ML-ready, mapping and analysis tables
pub const PROCESSED_DELIMITER: u8 = b';';

/// Delimiter of the key-stats and clustered reference tables
pub const REFERENCE_DELIMITER: u8 = b',';

/// Outputs of one step, each written to a temp file beside its target and only moved into
/// place by [`StagedOutputs::commit`] once every output has been written.
#[derive(Debug, Default)]
pub struct StagedOutputs {
    files: Vec<(NamedTempFile, PathBuf)>,
}

impl StagedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one output to a temp file in the destination directory
    pub fn stage<F>(&mut self, path: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        if path.is_dir() {
            return Err(StatsError::Io(std::io::Error::other(format!(
                "{} is a directory",
                path.display()
            ))));
        }
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut out = BufWriter::new(temp.as_file_mut());
            write(&mut out)?;
            out.flush()?;
        }
        self.files.push((temp, path.to_path_buf()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Rename every staged file onto its target, in staging order.
    /// Dropping an uncommitted batch deletes the temp files and leaves every target untouched.
    pub fn commit(self) -> Result<()> {
        for (temp, path) in self.files {
            temp.persist(&path)?;
        }
        Ok(())
    }
}

/// Write a single file through a temp file in the destination directory, then rename it into place
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let mut outputs = StagedOutputs::new();
    outputs.stage(path, write)?;
    outputs.commit()
}

fn reader(path: &Path, delimiter: u8) -> Result<csv::Reader<File>> {
    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

/// Fail with [`StatsError::MissingColumn`] on the first required column absent from `headers`
pub fn require_columns(headers: &csv::StringRecord, required: &[&str]) -> Result<()> {
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(StatsError::MissingColumn(column.to_string()));
        }
    }
    Ok(())
}

/// Read typed rows, checking the required columns up front. Malformed rows are errors, not skipped.
pub fn read_rows<T: DeserializeOwned>(
    path: &Path,
    delimiter: u8,
    required: &[&str],
) -> Result<Vec<T>> {
    let mut reader = reader(path, delimiter)?;
    let headers = reader.headers()?.clone();
    require_columns(&headers, required)?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Write serializable rows with a header line derived from the field names
pub fn write_rows<T: Serialize>(path: &Path, delimiter: u8, rows: &[T]) -> Result<()> {
    write_atomically(path, |out| {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(out);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    })
}

/// An untyped table: used where the column set is only known at run time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn read(path: &Path, delimiter: u8) -> Result<Self> {
        let mut reader = reader(path, delimiter)?;
        let headers = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(String::from).collect());
        }
        Ok(Table { headers, rows })
    }

    pub fn write(&self, path: &Path, delimiter: u8) -> Result<()> {
        let mut outputs = StagedOutputs::new();
        self.stage(&mut outputs, path, delimiter)?;
        outputs.commit()
    }

    /// Stage this table as one output of a multi-file step
    pub fn stage(&self, outputs: &mut StagedOutputs, path: &Path, delimiter: u8) -> Result<()> {
        outputs.stage(path, |out| {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(delimiter)
                .from_writer(out);
            writer.write_record(&self.headers)?;
            for row in &self.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
            Ok(())
        })
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| StatsError::MissingColumn(name.to_string()))
    }

    /// Project onto `columns`, in that order, preserving row order
    pub fn select(&self, columns: &[&str]) -> Result<Table> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>>>()?;

        Ok(Table {
            headers: columns.iter().map(|c| c.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row.get(i).cloned().unwrap_or_default()).collect())
                .collect(),
        })
    }

    /// Drop the named columns if present
    pub fn drop_columns(&mut self, columns: &[&str]) {
        let keep: Vec<usize> = (0..self.headers.len())
            .filter(|&i| !columns.contains(&self.headers[i].as_str()))
            .collect();
        self.headers = keep.iter().map(|&i| self.headers[i].clone()).collect();
        for row in &mut self.rows {
            *row = keep.iter().map(|&i| row.get(i).cloned().unwrap_or_default()).collect();
        }
    }

    /// Parse one column as numbers; blank cells become `None`
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let index = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let raw = row.get(index).map(|s| s.trim()).unwrap_or("");
                parse_cell(raw).ok_or_else(|| StatsError::InvalidValue {
                    column: name.to_string(),
                    row: row_idx + 1,
                    value: raw.to_string(),
                })
            })
            .collect()
    }

    /// Whether every non-blank cell in the column parses as a number
    pub fn is_numeric(&self, name: &str) -> bool {
        self.numeric_column(name).is_ok()
    }
}

/// `Some(None)` for a blank cell, `Some(Some(x))` for a number, `None` for anything else
fn parse_cell(raw: &str) -> Option<Option<f64>> {
    if raw.is_empty() {
        return Some(None);
    }
    raw.parse::<f64>().ok().map(Some)
}

/// Stage rows of [`Cell`]s under a fixed header line
pub fn stage_cells(
    outputs: &mut StagedOutputs,
    path: &Path,
    delimiter: u8,
    headers: &[&str],
    rows: &[Vec<Cell>],
) -> Result<()> {
    outputs.stage(path, |out| {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(out);
        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(row.iter().map(Cell::to_csv_field))?;
        }
        writer.flush()?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Row {
        #[serde(rename = "Player")]
        player: String,
        #[serde(rename = "PTS")]
        pts: f64,
    }

    #[test]
    fn test_read_rows_checks_required_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        fs::write(&path, "Player;AST\nA;1\n").unwrap();

        let result: Result<Vec<Row>> = read_rows(&path, b';', &["Player", "PTS"]);
        assert!(matches!(result, Err(StatsError::MissingColumn(c)) if c == "PTS"));
    }

    #[test]
    fn test_rows_round_trip_with_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("key.csv");
        let rows = vec![
            Row { player: "A".into(), pts: 30.0 },
            Row { player: "B".into(), pts: 2.5 },
        ];
        write_rows(&path, REFERENCE_DELIMITER, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Player,PTS\n"));
        let back: Vec<Row> = read_rows(&path, REFERENCE_DELIMITER, &["Player", "PTS"]).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_failed_write_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "old").unwrap();

        let result = write_atomically(&path, |out| {
            out.write_all(b"partial")?;
            Err(StatsError::EmptyDataset("boom".into()))
        });
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn test_staged_outputs_commit_together() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        fs::write(&first, "old first").unwrap();

        let mut outputs = StagedOutputs::new();
        outputs.stage(&first, |out| Ok(out.write_all(b"new first")?)).unwrap();
        assert_eq!(fs::read_to_string(&first).unwrap(), "old first");

        outputs.stage(&second, |out| Ok(out.write_all(b"new second")?)).unwrap();
        assert_eq!(outputs.len(), 2);
        outputs.commit().unwrap();
        assert_eq!(fs::read_to_string(&first).unwrap(), "new first");
        assert_eq!(fs::read_to_string(&second).unwrap(), "new second");
    }

    #[test]
    fn test_failed_second_output_keeps_first() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.csv");
        let blocked = dir.path().join("blocked");
        fs::write(&first, "old").unwrap();
        fs::create_dir(&blocked).unwrap();

        let mut outputs = StagedOutputs::new();
        outputs.stage(&first, |out| Ok(out.write_all(b"new")?)).unwrap();
        let result = outputs.stage(&blocked, |out| Ok(out.write_all(b"new")?));
        assert!(matches!(result, Err(StatsError::Io(_))));
        drop(outputs);

        assert_eq!(fs::read_to_string(&first).unwrap(), "old");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_table_select_and_drop() {
        let mut table = Table {
            headers: vec!["ID".into(), "Player".into(), "PTS".into()],
            rows: vec![vec!["1".into(), "A".into(), "".into()]],
        };
        let selected = table.select(&["PTS", "Player"]).unwrap();
        assert_eq!(selected.headers, vec!["PTS", "Player"]);
        assert_eq!(selected.rows[0], vec!["", "A"]);
        assert!(matches!(table.select(&["BLK"]), Err(StatsError::MissingColumn(_))));

        assert_eq!(table.numeric_column("PTS").unwrap(), vec![None]);
        assert!(!table.is_numeric("Player"));

        table.drop_columns(&["ID", "PF"]);
        assert_eq!(table.headers, vec!["Player", "PTS"]);
        assert_eq!(table.rows[0], vec!["A", ""]);
    }
}
