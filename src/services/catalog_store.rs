use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::AppError;

/// Read access to converted catalogs. Each run writes into its own dated
/// subdirectory; the greatest name is the latest release.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    root: PathBuf,
}

impl CatalogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn latest_release_dir(&self) -> Result<PathBuf, AppError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound("No data directories found".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut releases = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                releases.push(entry.file_name());
            }
        }

        releases
            .into_iter()
            .max()
            .map(|name| self.root.join(name))
            .ok_or_else(|| AppError::NotFound("No data directories found".to_string()))
    }

    /// Parsed contents of `file_name` from the latest release.
    pub fn latest_catalog(&self, file_name: &str) -> Result<Value, AppError> {
        let release_dir = self.latest_release_dir()?;
        let path = release_dir.join(file_name);

        if !path.is_file() {
            return Err(AppError::NotFound(format!(
                "File {} not found in latest data ({})",
                file_name,
                dir_name(&release_dir)
            )));
        }

        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn picks_greatest_release() {
        let dir = tempfile::tempdir().unwrap();
        for release in ["20251001", "20251110", "20250915"] {
            fs::create_dir_all(dir.path().join(release)).unwrap();
        }
        fs::write(dir.path().join("20991231.json"), "[]").unwrap();
        fs::write(dir.path().join("20251110").join("c_FormaPago.json"), r#"[{"c_formapago":"01"}]"#).unwrap();

        let store = CatalogStore::new(dir.path());
        assert_eq!(store.latest_release_dir().unwrap(), dir.path().join("20251110"));
        assert_eq!(store.latest_catalog("c_FormaPago.json").unwrap(), json!([{"c_formapago": "01"}]));
    }

    #[test]
    fn missing_data_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(dir.path().join("output"));
        assert!(matches!(store.latest_release_dir(), Err(AppError::NotFound(_))));

        fs::create_dir_all(dir.path().join("output").join("20251110")).unwrap();
        let err = store.latest_catalog("c_Pais.json").unwrap_err();
        assert_eq!(err.to_string(), "File c_Pais.json not found in latest data (20251110)");
    }
}
