//! JSON artifact persistence.

use super::types::TestCase;
use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_err)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_testcases(path: &Path, cases: &[TestCase]) -> Result<(), StoreError> {
    write_json(path, cases)?;
    info!("Saved {} testcases to {}", cases.len(), path.display());
    Ok(())
}

pub fn load_testcases(path: &Path) -> Result<Vec<TestCase>, StoreError> {
    let cases: Vec<TestCase> = read_json(path)?;
    info!("Loaded {} testcases from {}", cases.len(), path.display());
    Ok(cases)
}
