use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{Days, NaiveDate, Utc};
use reqwest::Client;

use crate::config::SourceConfig;
use crate::error::AppError;

/// Downloads the most recent catalog workbook.
///
/// The publisher names each release after its date, so the fetcher walks
/// backwards one day at a time from yesterday until a file turns up, either
/// already on disk or on the publisher's server.
pub struct CatalogFetcher {
    config: SourceConfig,
    client: Client,
}

impl CatalogFetcher {
    pub fn new(config: SourceConfig) -> Result<Self, AppError> {
        let client = Client::builder().timeout(config.download_timeout).build()?;
        Ok(Self { config, client })
    }

    /// Today's date in the publisher's local time.
    pub fn local_today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.utc_offset).date_naive()
    }

    /// Dates to try, newest first, starting the day before `today`.
    pub fn candidate_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        (1..=u64::from(self.config.search_window_days))
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .collect()
    }

    pub async fn fetch_latest(&self) -> Result<PathBuf, AppError> {
        self.fetch_latest_from(self.local_today()).await
    }

    pub async fn fetch_latest_from(&self, today: NaiveDate) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.config.input_dir).await?;

        let candidates = self.candidate_dates(today);
        if let Some(first) = candidates.first() {
            tracing::info!("Searching for catalogs starting from: {}", first.format(&self.config.date_format));
        }

        for date in candidates {
            let file_name = self.config.file_name_for(date);
            let file_path = self.config.input_dir.join(&file_name);

            if tokio::fs::try_exists(&file_path).await.unwrap_or(false) {
                tracing::info!("File already exists locally: {}", file_path.display());
                return Ok(file_path);
            }

            let url = format!("{}{}", self.config.base_url, file_name);
            tracing::debug!("Attempting to download: {}", url);

            match self.download(&url).await {
                Ok(body) => {
                    save_atomically(&file_path, &body).await?;
                    tracing::info!(
                        "File downloaded successfully: {} ({}KB)",
                        file_path.display(),
                        body.len() / 1024
                    );
                    return Ok(file_path);
                }
                Err(e) => {
                    tracing::debug!("No catalog at {}: {}", url, e);
                }
            }
        }

        Err(AppError::SourceUnavailable {
            days: self.config.search_window_days,
        })
    }

    async fn download(&self, url: &str) -> Result<Bytes, AppError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::NotFound(format!(
                "Failed to fetch file. Status: {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?)
    }
}

/// The release date encoded in a workbook file name, e.g. `20251110` for
/// `catCFDI_V_4_20251110.xls`. Falls back to the bare file stem.
pub fn release_label(path: &Path, config: &SourceConfig) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    file_name
        .strip_prefix(config.file_prefix.as_str())
        .and_then(|rest| rest.strip_suffix(config.file_extension.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or(file_name)
        })
}

async fn save_atomically(path: &Path, body: &[u8]) -> Result<(), AppError> {
    let tmp_path = path.with_extension("part");
    tokio::fs::write(&tmp_path, body).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::time::Duration;

    fn source_config(input_dir: &Path) -> SourceConfig {
        let mut source = Config::from_lookup(|_| None).unwrap().source;
        source.input_dir = input_dir.to_path_buf();
        source.base_url = "http://127.0.0.1:9/".to_string();
        source.download_timeout = Duration::from_secs(1);
        source
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn search_starts_yesterday_and_walks_back() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = CatalogFetcher::new(source_config(dir.path())).unwrap();

        let dates = fetcher.candidate_dates(date(2025, 11, 11));
        assert_eq!(dates.len(), 31);
        assert_eq!(dates[0], date(2025, 11, 10));
        assert_eq!(dates[1], date(2025, 11, 9));
        assert_eq!(dates[30], date(2025, 10, 11));
    }

    #[test]
    fn existing_local_file_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("catCFDI_V_4_20251108.xls");
        std::fs::write(&existing, b"cached").unwrap();

        let mut config = source_config(dir.path());
        config.search_window_days = 5;
        let fetcher = CatalogFetcher::new(config).unwrap();

        let found = tokio_test::block_on(fetcher.fetch_latest_from(date(2025, 11, 11))).unwrap();
        assert_eq!(found, existing);
    }

    #[tokio::test]
    async fn exhausted_window_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = source_config(dir.path());
        config.search_window_days = 2;
        let fetcher = CatalogFetcher::new(config).unwrap();

        let err = fetcher.fetch_latest_from(date(2025, 11, 11)).await.unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable { days: 2 }));
    }

    #[test]
    fn release_label_comes_from_file_name() {
        let config = source_config(Path::new("input"));
        assert_eq!(
            release_label(Path::new("input/catCFDI_V_4_20251110.xls"), &config),
            "20251110"
        );
        assert_eq!(release_label(Path::new("/tmp/catalogo.xlsx"), &config), "catalogo");
    }
}
