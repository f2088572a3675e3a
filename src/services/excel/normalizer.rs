use super::types::{NormalizedSheet, RawGrid, SheetKind};
use super::utils::{clean_column_name, header_label};
use crate::error::AppError;
use crate::models::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerSettings {
    /// Leading columns of a `_Parte_N` sheet whose label sits one row above
    /// the rest of the header.
    pub partial_header_width: usize,
    pub skip_blank_rows: bool,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            partial_header_width: 7,
            skip_blank_rows: true,
        }
    }
}

/// Turns a located sheet into canonical records.
pub struct SchemaNormalizer {
    settings: NormalizerSettings,
}

impl SchemaNormalizer {
    pub fn new(settings: NormalizerSettings) -> Self {
        Self { settings }
    }

    pub fn normalize(
        &self,
        grid: &RawGrid,
        sheet_name: &str,
        start_offset: usize,
    ) -> Result<NormalizedSheet, AppError> {
        let kind = SheetKind::from_sheet_name(sheet_name);

        let (raw_header, header_row) = if kind.is_multi_part() {
            let width = self.settings.partial_header_width;
            let partial: Vec<String> = self
                .header_at(grid, sheet_name, start_offset)?
                .into_iter()
                .take(width)
                .collect();
            let full = self.header_at(grid, sheet_name, start_offset + 1)?;
            let merged = merge_headers(&partial, full, width).map_err(|reason| {
                AppError::MalformedHeader {
                    sheet: sheet_name.to_string(),
                    reason,
                }
            })?;
            (merged, start_offset + 1)
        } else {
            (self.header_at(grid, sheet_name, start_offset)?, start_offset)
        };

        let header: Vec<String> = raw_header.iter().map(|label| clean_column_name(label)).collect();

        let records: Vec<Record> = grid
            .rows_after(header_row)
            .filter(|row| !(self.settings.skip_blank_rows && row.iter().all(|cell| cell.is_missing())))
            .map(|row| Record::from_row(&header, row))
            .collect();

        tracing::debug!(
            "Sheet {} ({:?}): header at row {}, {} columns, {} records",
            sheet_name,
            kind,
            header_row,
            header.len(),
            records.len()
        );

        Ok(NormalizedSheet {
            name: sheet_name.to_string(),
            header,
            records,
        })
    }

    fn header_at(&self, grid: &RawGrid, sheet_name: &str, idx: usize) -> Result<Vec<String>, AppError> {
        let row = grid.row(idx).ok_or_else(|| AppError::MalformedHeader {
            sheet: sheet_name.to_string(),
            reason: format!("header row {} is past the end of the sheet ({} rows)", idx, grid.height()),
        })?;

        Ok(row
            .iter()
            .enumerate()
            .map(|(column, cell)| header_label(cell, column))
            .collect())
    }
}

/// Overlays `partial` onto the first `width` positions of `full`.
///
/// Fails when either header is narrower than `width`; the partial labels are
/// never silently truncated.
pub fn merge_headers(partial: &[String], mut full: Vec<String>, width: usize) -> Result<Vec<String>, String> {
    if full.len() < width {
        return Err(format!(
            "expected at least {} header columns, found {}",
            width,
            full.len()
        ));
    }
    if partial.len() < width {
        return Err(format!(
            "expected {} partial header labels, found {}",
            width,
            partial.len()
        ));
    }

    full[..width].clone_from_slice(&partial[..width]);
    Ok(full)
}
