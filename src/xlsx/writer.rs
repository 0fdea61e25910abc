use crate::error::Result;
use crate::model::{Cell, CleanedRecord, SeasonType};
use crate::table::StagedOutputs;
use rust_xlsxwriter::{
    ConditionalFormat3ColorScale, Format, FormatAlign, FormatBorder, Workbook, Worksheet,
};
use std::path::Path;

/// Write the cleaned table to a human-readable Excel workbook
pub fn write_cleaned_workbook(records: &[CleanedRecord], season: SeasonType, path: &Path) -> Result<()> {
    let mut outputs = StagedOutputs::new();
    stage_cleaned_workbook(&mut outputs, records, season, path)?;
    outputs.commit()
}

/// Build the workbook in memory and stage it as one output of the cleaning step
pub fn stage_cleaned_workbook(
    outputs: &mut StagedOutputs,
    records: &[CleanedRecord],
    season: SeasonType,
    path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    write_cleaned_sheet(worksheet, records)?;
    worksheet.set_name(season.to_string())?;

    let buffer = workbook.save_to_buffer()?;
    outputs.stage(path, |out| {
        out.write_all(&buffer)?;
        Ok(())
    })
}

/// Write cleaned records to a worksheet: one header row, one row per player
fn write_cleaned_sheet(sheet: &mut Worksheet, records: &[CleanedRecord]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.columns().into_iter().map(|(name, _)| name).collect();

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border_bottom(FormatBorder::Thin);

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        let width = match *header {
            "Player" => 24,
            "ID" | "Pos" => 6,
            h if h.len() > 8 => 14,
            _ => 8,
        };
        sheet.set_column_width(col as u16, width)?;
    }

    // Data formats
    let number_format = Format::new().set_align(FormatAlign::Right).set_num_format("0.0##");
    let left_format = Format::new().set_align(FormatAlign::Left);

    for (row_idx, record) in records.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col, (_, cell)) in record.columns().into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Number(n) => {
                    sheet.write_number_with_format(row, col, n, &number_format)?;
                }
                Cell::Text(s) => {
                    sheet.write_string_with_format(row, col, &s, &left_format)?;
                }
                Cell::Blank => {}
            }
        }
    }

    let last_row = records.len() as u32;
    let last_col = (headers.len() - 1) as u16;
    sheet.set_freeze_panes(1, 2)?;
    sheet.autofilter(0, 0, last_row, last_col)?;

    // Red (low) -> Yellow (mid) -> Green (high) on the impact score
    if let Some(pie_col) = headers.iter().position(|h| *h == "PIE") {
        let pie_conditional_format = ConditionalFormat3ColorScale::new()
            .set_minimum_color("F8696B")
            .set_midpoint_color("FFEB84")
            .set_maximum_color("63BE7B");
        sheet.add_conditional_format(1, pie_col as u16, last_row, pie_col as u16, &pie_conditional_format)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::add_advanced_metrics;
    use crate::clean::consolidate::tests::record;

    #[test]
    fn test_workbook_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("Human_Readable.xlsx");
        let records = add_advanced_metrics(vec![record("A", "PG", 50.0, 20.0)]).unwrap();

        write_cleaned_workbook(&records, SeasonType::Playoffs, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_empty_table_still_produces_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        write_cleaned_workbook(&[], SeasonType::Regular, &path).unwrap();
        assert!(path.exists());
    }
}
