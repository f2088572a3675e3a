use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::AppError;
use crate::services::catalog_fetcher::{release_label, CatalogFetcher};
use crate::services::excel::{CalamineWorkbook, ConversionSummary, ExcelProcessor, NormalizerSettings};

/// One full run: obtain the workbook, then convert its sheets into
/// `<output_dir>/<release>/`.
///
/// With `workbook` set the download step is skipped and that file is used.
pub async fn run_conversion(config: &Config, workbook: Option<PathBuf>) -> Result<ConversionSummary, AppError> {
    let start = std::time::Instant::now();
    tracing::info!("Starting catalog conversion process...");

    let workbook_path = match workbook {
        Some(path) => path,
        None => CatalogFetcher::new(config.source.clone())?.fetch_latest().await?,
    };

    let output_dir = release_output_dir(config, &workbook_path);
    let settings = NormalizerSettings {
        partial_header_width: config.partial_header_width,
        skip_blank_rows: config.skip_blank_rows,
    };

    tracing::info!(
        "Converting {} into {}",
        workbook_path.display(),
        output_dir.display()
    );

    let summary = tokio::task::spawn_blocking(move || {
        let mut workbook = CalamineWorkbook::open(&workbook_path)?;
        ExcelProcessor::new(output_dir, settings).process_workbook(&mut workbook)
    })
    .await
    .map_err(|e| AppError::Internal(format!("conversion task failed: {}", e)))??;

    tracing::info!("Catalog conversion completed successfully in {:?}", start.elapsed());
    Ok(summary)
}

pub fn release_output_dir(config: &Config, workbook_path: &Path) -> PathBuf {
    config.output_dir.join(release_label(workbook_path, &config.source))
}
