use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use astro_core::{
    CatalogRecord, SelectionDocument, export_selection, import_selection, parse_catalog,
};

use crate::error::{Result, StoreError};

/// Load a catalog file. Any read or parse failure is returned whole; no
/// partial catalog is ever produced.
pub fn read_catalog_file(path: &Path) -> Result<Vec<CatalogRecord>> {
    let json = read_text(path)?;
    let records = parse_catalog(&json).map_err(|e| {
        StoreError::InvalidData(format!("malformed catalog {}: {e}", path.display()))
    })?;
    tracing::info!(path = %path.display(), records = records.len(), "loaded catalog");
    Ok(records)
}

pub fn read_selection_file(path: &Path) -> Result<SelectionDocument> {
    let json = read_text(path)?;
    import_selection(&json).map_err(|e| {
        StoreError::InvalidData(format!("malformed selection {}: {e}", path.display()))
    })
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        StoreError::Io(io::Error::new(
            e.kind(),
            format!("failed to read {}: {e}", path.display()),
        ))
    })
}

/// Write a selection document atomically: the bytes go to a sibling
/// `*.tmp` file which is synced and then renamed over `path`. A crash
/// leaves either the previous file or the new one, never a mix. Concurrent
/// writers to the same path: last rename wins.
pub fn write_selection_file(path: &Path, document: &SelectionDocument) -> Result<()> {
    let json = export_selection(document)
        .map_err(|e| StoreError::InvalidData(format!("JSON export failed: {e}")))?;
    write_atomic(path, json.as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let temp_path = temp_path_for(path);

    let result = (|| -> Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    } else {
        tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote selection");
    }
    result
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "selection".into());
    name.push(".tmp");
    path.with_file_name(name)
}
