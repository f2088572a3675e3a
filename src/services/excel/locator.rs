use super::types::RawGrid;
use super::utils::search_key;
use crate::error::AppError;

/// Finds where a sheet's table begins.
///
/// Catalog sheets carry an arbitrary number of title rows above the table.
/// The table is introduced by a first-column cell holding the sheet's own name
/// (without any `_Parte_N` marker); the header starts on the row after it.
pub struct TableLocator;

impl TableLocator {
    /// Returns the start offset: the row index right after the first
    /// first-column cell matching the sheet's search key.
    pub fn locate(&self, grid: &RawGrid, sheet_name: &str) -> Result<usize, AppError> {
        let key = search_key(sheet_name);

        grid.first_column()
            .position(|cell| cell.as_text().is_some_and(|text| text.to_lowercase() == key))
            .map(|idx| idx + 1)
            .ok_or_else(|| AppError::HeaderNotFound {
                sheet: sheet_name.to_string(),
                search_key: key,
            })
    }
}
