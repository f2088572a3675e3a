use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};

use super::types::RawGrid;
use super::utils::cell_from_data;
use crate::error::AppError;
use crate::models::CellValue;

/// Ordered, named sheets and the raw cells behind each of them.
pub trait SheetSource {
    fn sheet_names(&self) -> Vec<String>;

    fn raw_grid(&mut self, sheet_name: &str) -> Result<RawGrid, AppError>;
}

/// A workbook on disk, in any format calamine can detect.
pub struct CalamineWorkbook {
    sheets: Sheets<BufReader<File>>,
}

impl CalamineWorkbook {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let sheets = open_workbook_auto(path).map_err(|e| {
            tracing::error!("Failed to open workbook {}: {}", path.display(), e);
            AppError::Workbook(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self { sheets })
    }
}

impl SheetSource for CalamineWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    fn raw_grid(&mut self, sheet_name: &str) -> Result<RawGrid, AppError> {
        let range = self
            .sheets
            .worksheet_range(sheet_name)
            .map_err(|e| AppError::Workbook(format!("Failed to read worksheet {}: {}", sheet_name, e)))?;
        Ok(grid_from_range(&range))
    }
}

/// Places the used range at its absolute position so row and column indices
/// match the sheet's own.
pub fn grid_from_range(range: &Range<Data>) -> RawGrid {
    let Some((first_row, first_col)) = range.start() else {
        return RawGrid::default();
    };
    if range.is_empty() {
        return RawGrid::default();
    }

    let mut rows: Vec<Vec<CellValue>> = (0..first_row).map(|_| Vec::new()).collect();
    rows.extend(range.rows().map(|row| {
        std::iter::repeat(CellValue::Absent)
            .take(first_col as usize)
            .chain(row.iter().map(cell_from_data))
            .collect()
    }));

    RawGrid::from_rows(rows)
}

/// Sheets held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<(String, RawGrid)>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, grid: RawGrid) -> Self {
        self.sheets.push((name.into(), grid));
        self
    }
}

impl SheetSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn raw_grid(&mut self, sheet_name: &str) -> Result<RawGrid, AppError> {
        self.sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, grid)| grid.clone())
            .ok_or_else(|| AppError::Workbook(format!("Worksheet {} not found", sheet_name)))
    }
}
