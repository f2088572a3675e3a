use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::locator::TableLocator;
use super::normalizer::{NormalizerSettings, SchemaNormalizer};
use super::types::NormalizedSheet;
use super::workbook::SheetSource;
use crate::error::AppError;
use crate::models::Record;

/// What happened to each sheet during one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionSummary {
    pub converted: Vec<String>,
    pub skipped_existing: Vec<String>,
    pub failed: Vec<SheetFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetFailure {
    pub sheet: String,
    pub reason: String,
}

pub struct ExcelProcessor {
    locator: TableLocator,
    normalizer: SchemaNormalizer,
    output_dir: PathBuf,
}

impl ExcelProcessor {
    pub fn new(output_dir: impl Into<PathBuf>, settings: NormalizerSettings) -> Self {
        Self {
            locator: TableLocator,
            normalizer: SchemaNormalizer::new(settings),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_path(&self, sheet_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", sheet_name))
    }

    /// Converts every sheet of `source` that has no artifact yet.
    ///
    /// Sheets that cannot be located or parsed are logged and skipped; only
    /// failures of the output location abort the run.
    pub fn process_workbook<S: SheetSource>(&self, source: &mut S) -> Result<ConversionSummary, AppError> {
        fs::create_dir_all(&self.output_dir)?;

        let sheet_names = source.sheet_names();
        tracing::info!("Processing {} sheets", sheet_names.len());

        let mut summary = ConversionSummary::default();
        for sheet_name in &sheet_names {
            tracing::info!("Processing sheet: {}", sheet_name);

            let output_path = self.output_path(sheet_name);
            if output_path.exists() {
                tracing::debug!("{} already exists, skipping", output_path.display());
                summary.skipped_existing.push(sheet_name.clone());
                continue;
            }

            match self.convert_sheet(source, sheet_name) {
                Ok(sheet) => {
                    write_records(&output_path, &sheet.records)?;
                    tracing::info!(
                        "Wrote {} records for sheet {} to {}",
                        sheet.records.len(),
                        sheet_name,
                        output_path.display()
                    );
                    summary.converted.push(sheet_name.clone());
                }
                Err(e) if e.is_sheet_level() => {
                    tracing::warn!("Skipping sheet {}: {}", sheet_name, e);
                    summary.failed.push(SheetFailure {
                        sheet: sheet_name.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "Converted {} sheets, {} already present, {} skipped",
            summary.converted.len(),
            summary.skipped_existing.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    pub fn convert_sheet<S: SheetSource>(&self, source: &mut S, sheet_name: &str) -> Result<NormalizedSheet, AppError> {
        let grid = source.raw_grid(sheet_name)?;
        let start_offset = self.locator.locate(&grid, sheet_name)?;
        self.normalizer.normalize(&grid, sheet_name, start_offset)
    }
}

/// Writes `records` as a 4-space indented JSON array.
///
/// The file is written under a temporary name and renamed into place, so an
/// interrupted run never leaves a partial artifact behind.
pub fn write_records(path: &Path, records: &[Record]) -> Result<(), AppError> {
    let tmp_path = path.with_extension("json.tmp");
    {
        let file = fs::File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        records.serialize(&mut serializer)?;
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}
