use crate::models::{CellValue, Record};

pub const PART_ONE_MARKER: &str = "_Parte_1";
pub const PART_TWO_MARKER: &str = "_Parte_2";

static ABSENT: CellValue = CellValue::Absent;

/// How a sheet's header is laid out, derived from the sheet name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Simple,
    Part1,
    Part2,
}

impl SheetKind {
    pub fn from_sheet_name(name: &str) -> Self {
        if name.contains(PART_ONE_MARKER) {
            SheetKind::Part1
        } else if name.contains(PART_TWO_MARKER) {
            SheetKind::Part2
        } else {
            SheetKind::Simple
        }
    }

    /// Part sheets split their leading header columns across two rows.
    pub fn is_multi_part(self) -> bool {
        !matches!(self, SheetKind::Simple)
    }
}

/// A sheet's cells with no header assumed. Rows are padded to a common width
/// and indexed by absolute sheet position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl RawGrid {
    pub fn from_rows(mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Absent);
        }
        Self { rows, width }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<&[CellValue]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    pub fn first_column(&self) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(|row| row.first().unwrap_or(&ABSENT))
    }

    /// Every row strictly after `idx`.
    pub fn rows_after(&self, idx: usize) -> impl Iterator<Item = &[CellValue]> + '_ {
        self.rows.iter().skip(idx + 1).map(Vec::as_slice)
    }
}

/// The converted form of one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSheet {
    pub name: String,
    pub header: Vec<String>,
    pub records: Vec<Record>,
}
