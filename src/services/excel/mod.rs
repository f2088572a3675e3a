pub mod locator;
pub mod normalizer;
pub mod processor;
pub mod types;
pub mod utils;
pub mod workbook;

pub use locator::TableLocator;
pub use normalizer::{NormalizerSettings, SchemaNormalizer};
pub use processor::{ConversionSummary, ExcelProcessor};
pub use types::{NormalizedSheet, RawGrid, SheetKind};
pub use workbook::{CalamineWorkbook, MemoryWorkbook, SheetSource};
