/*!
 * Spreadsheet input and output.
 *
 * Season tables have the columns `Subtitle`, `Cultural Note` and `Category`.
 * The cross-season matrix has one `Category` column followed by one column
 * per season.
 */

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{utility, Format, Workbook};
use std::path::Path;

use crate::annotation::AnnotationRecord;
use crate::errors::ReportError;
use crate::file_utils::FileManager;

pub const SUBTITLE_COLUMN: &str = "Subtitle";
pub const NOTE_COLUMN: &str = "Cultural Note";
pub const CATEGORY_COLUMN: &str = "Category";

/// One row of a season table as read back from disk
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeasonRow {
    pub subtitle: String,
    pub note: String,
    pub category: String,
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> ReportError {
    ReportError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn read_error(path: &Path, e: impl std::fmt::Display) -> ReportError {
    ReportError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Check a worksheet name against the rules the writer enforces:
/// not blank, at most 31 characters, none of `[ ] : * ? / \`, no leading or
/// trailing apostrophe.
pub fn check_sheet_name(name: &str) -> Result<(), ReportError> {
    utility::check_sheet_name(name).map_err(|e| ReportError::InvalidSheetName {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Write annotation records, one row each in input order.
///
/// Empty notes and categories are left as blank cells.
pub fn write_season_table(records: &[AnnotationRecord], path: &Path, sheet_name: &str) -> Result<(), ReportError> {
    FileManager::ensure_parent_dir(path).map_err(|e| write_error(path, e))?;

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(|e| write_error(path, e))?;

    for (col, title) in [SUBTITLE_COLUMN, NOTE_COLUMN, CATEGORY_COLUMN].iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *title, &header)
            .map_err(|e| write_error(path, e))?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        let note = record.note();
        for (col, value) in [record.subtitle.as_str(), note.as_str(), record.category()].iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet
                .write_string(row, col as u16, *value)
                .map_err(|e| write_error(path, e))?;
        }
    }

    worksheet.set_column_width(0, 60).map_err(|e| write_error(path, e))?;
    worksheet.set_column_width(1, 80).map_err(|e| write_error(path, e))?;
    worksheet.set_column_width(2, 20).map_err(|e| write_error(path, e))?;

    workbook.save(path).map_err(|e| write_error(path, e))
}

/// Read every row of a season table
pub fn read_season_table(path: &Path, sheet_name: &str) -> Result<Vec<SeasonRow>, ReportError> {
    let rows = read_sheet(path, sheet_name)?;
    let mut rows = rows.into_iter();
    let header = rows.next().unwrap_or_default();

    let category = column_index(&header, CATEGORY_COLUMN).ok_or_else(|| ReportError::MissingColumn {
        path: path.display().to_string(),
        column: CATEGORY_COLUMN.to_string(),
    })?;
    let subtitle = column_index(&header, SUBTITLE_COLUMN);
    let note = column_index(&header, NOTE_COLUMN);

    let cell = |row: &[String], index: Option<usize>| index.and_then(|i| row.get(i)).cloned().unwrap_or_default();

    Ok(rows
        .map(|row| SeasonRow {
            subtitle: cell(&row, subtitle),
            note: cell(&row, note),
            category: cell(&row, Some(category)),
        })
        .collect())
}

/// Non-empty values of the `Category` column
pub fn read_category_column(path: &Path, sheet_name: &str) -> Result<Vec<String>, ReportError> {
    Ok(read_season_table(path, sheet_name)?
        .into_iter()
        .map(|row| row.category)
        .filter(|category| !category.is_empty())
        .collect())
}

/// Write the category x season matrix
pub fn write_matrix_table(matrix: &super::CategoryCountMatrix, path: &Path) -> Result<(), ReportError> {
    FileManager::ensure_parent_dir(path).map_err(|e| write_error(path, e))?;

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    worksheet
        .write_string_with_format(0, 0, CATEGORY_COLUMN, &header)
        .map_err(|e| write_error(path, e))?;
    for (index, season) in matrix.seasons().iter().enumerate() {
        worksheet
            .write_string_with_format(0, index as u16 + 1, season, &header)
            .map_err(|e| write_error(path, e))?;
    }

    for (index, category) in matrix.categories().iter().enumerate() {
        let row = index as u32 + 1;
        worksheet
            .write_string(row, 0, category)
            .map_err(|e| write_error(path, e))?;
        for (col, count) in matrix.row(index).iter().enumerate() {
            worksheet
                .write_number(row, col as u16 + 1, *count as f64)
                .map_err(|e| write_error(path, e))?;
        }
    }

    worksheet.set_column_width(0, 24).map_err(|e| write_error(path, e))?;
    workbook.save(path).map_err(|e| write_error(path, e))
}

/// Read the matrix spreadsheet back as (category, per-season counts) rows
pub fn read_matrix_table(path: &Path) -> Result<(Vec<String>, Vec<(String, Vec<usize>)>), ReportError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| read_error(path, e))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| read_error(path, "workbook has no sheets"))?;
    let rows = sheet_rows(&mut workbook, &sheet, path)?;
    let mut rows = rows.into_iter();

    let seasons = rows.next().map(|header| header.into_iter().skip(1).collect()).unwrap_or_default();
    let body = rows
        .map(|row| {
            let mut cells = row.into_iter();
            let category = cells.next().unwrap_or_default();
            let counts = cells.map(|c| c.parse::<f64>().map_or(0, |v| v as usize)).collect();
            (category, counts)
        })
        .collect();

    Ok((seasons, body))
}

fn read_sheet(path: &Path, sheet_name: &str) -> Result<Vec<Vec<String>>, ReportError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| read_error(path, e))?;
    sheet_rows(&mut workbook, sheet_name, path)
}

fn sheet_rows<R>(workbook: &mut Xlsx<R>, sheet_name: &str, path: &Path) -> Result<Vec<Vec<String>>, ReportError>
where
    R: std::io::Read + std::io::Seek,
{
    let range = workbook.worksheet_range(sheet_name).map_err(|e| read_error(path, e))?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn column_index(header: &[String], name: &str) -> Option<usize> {
    header.iter().position(|h| h.trim() == name)
}
