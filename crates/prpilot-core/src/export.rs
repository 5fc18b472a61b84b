//! Saving a generated document to disk.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::GenerationResult;

/// `{kind}-{slug}.yaml`, where the slug is the title with every character
/// outside `[A-Za-z0-9]` replaced by `-`, lowercased.
pub fn download_file_name(result: &GenerationResult) -> String {
    let slug: String = result
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{}-{}.yaml", result.kind.as_str(), slug)
}

/// Write `result.content` byte-for-byte into `dir`, returning the path.
pub fn write_download(result: &GenerationResult, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create download directory {}", dir.display()))?;

    let path = dir.join(download_file_name(result));
    fs::write(&path, result.content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "saved generated document");
    Ok(path)
}
