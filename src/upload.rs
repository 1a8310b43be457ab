//! Guards applied to files before they reach the pipeline

use std::path::Path;

/// Accepted file extensions (lowercase)
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub fn is_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read an upload after checking its extension and size
pub fn read_upload(path: &Path) -> anyhow::Result<Vec<u8>> {
    if !is_allowed_extension(path) {
        anyhow::bail!(
            "Invalid file type: {}. Allowed: {}",
            path.display(),
            ALLOWED_EXTENSIONS.join(", ")
        );
    }

    let size = std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("File not found: {} ({})", path.display(), e))?
        .len();
    if size > MAX_UPLOAD_BYTES {
        anyhow::bail!(
            "File too large: {} is {} bytes (limit {})",
            path.display(),
            size,
            MAX_UPLOAD_BYTES
        );
    }

    Ok(std::fs::read(path)?)
}
