use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::types::{PART_ONE_MARKER, PART_TWO_MARKER};
use crate::models::CellValue;

/// Largest magnitude an f64 holds without losing integer precision.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Canonical column name: trimmed, lower-cased, spaces as underscores and
/// accents removed (`" Código Postal "` becomes `codigo_postal`).
pub fn clean_column_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "_")
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Raw label for a header cell. Blank cells get a positional placeholder.
pub fn header_label(cell: &CellValue, column: usize) -> String {
    cell.label().unwrap_or_else(|| format!("Unnamed: {}", column))
}

/// The text a sheet's table is introduced by in its first column.
pub fn search_key(sheet_name: &str) -> String {
    sheet_name
        .replace(PART_ONE_MARKER, "")
        .replace(PART_TWO_MARKER, "")
        .to_lowercase()
}

pub fn cell_from_data(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Absent,
        // #N/A and friends are the workbook's own missing marker
        Data::Error(_) => CellValue::Absent,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => float_cell(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => float_cell(dt.as_f64()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => CellValue::Date(d),
            None => float_cell(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn float_cell(f: f64) -> CellValue {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT {
        CellValue::Int(f as i64)
    } else {
        CellValue::Float(f)
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
