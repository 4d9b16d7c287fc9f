// src/pipeline/directory.rs

//! Loading a directory of per-record JSON files.
//!
//! Each file holds one record. A missing directory yields no records, and
//! a file that cannot be read, parsed, or normalized is skipped with a
//! warning instead of failing the batch.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::Record;

/// Records loaded from a directory, plus the files that were skipped.
#[derive(Debug)]
pub struct LoadReport<T> {
    pub records: Vec<T>,
    pub failures: Vec<LoadFailure>,
}

impl<T> Default for LoadReport<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// A skipped file and why.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: AppError,
}

/// Load every `*.json` file in `dir` as a `T`, in file-name order.
pub async fn load_directory<T: Record>(dir: &Path) -> Result<LoadReport<T>> {
    let mut report = LoadReport::default();

    let (files, failures) = match list_json_files(dir).await {
        Ok(listing) => listing,
        Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No {} directory at {}, skipping", T::KIND, dir.display());
            return Ok(report);
        }
        Err(e) => return Err(e),
    };

    for failure in failures {
        log::warn!("Skipping {} {}: {}", T::KIND, failure.path.display(), failure.error);
        report.failures.push(failure);
    }

    for path in files {
        match load_file::<T>(&path).await {
            Ok(record) => report.records.push(record),
            Err(error) => {
                log::warn!("Skipping {} {}: {}", T::KIND, path.display(), error);
                report.failures.push(LoadFailure { path, error });
            }
        }
    }

    log::info!(
        "Loaded {} {} record(s) from {} ({} skipped)",
        report.records.len(),
        T::KIND,
        dir.display(),
        report.failures.len()
    );
    Ok(report)
}

/// Only a failure to open `dir` itself is an error. Entries that cannot be
/// listed or stat'ed come back as failures.
async fn list_json_files(dir: &Path) -> Result<(Vec<PathBuf>, Vec<LoadFailure>)> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    let mut failures = Vec::new();

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                failures.push(LoadFailure {
                    path: dir.to_path_buf(),
                    error: e.into(),
                });
                break;
            }
        };

        let path = entry.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            continue;
        }
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => failures.push(LoadFailure {
                path,
                error: e.into(),
            }),
        }
    }

    files.sort();
    failures.sort_by(|a, b| a.path.cmp(&b.path));
    Ok((files, failures))
}

async fn load_file<T: Record>(path: &Path) -> Result<T> {
    let text = tokio::fs::read_to_string(path).await?;
    let value: Value = serde_json::from_str(&text).map_err(|e| AppError::parse(path, e))?;

    let source = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    T::from_raw(&value, &source)
}
