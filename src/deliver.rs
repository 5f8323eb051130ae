//! Naming and saving rendered transcripts.

use crate::render::{OutputFormat, RenderedDocument};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("no file name given")]
    EmptyFileName,
    #[error("failed to write '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn replace_specials(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// A default stem derived from a page or meeting title. Case is kept.
pub fn title_stem(title: &str) -> String {
    replace_specials(title).trim().to_string()
}

/// Makes a user-chosen name safe to use as a file stem.
///
/// Whitespace survives; everything else outside `[a-z0-9]` becomes `_`.
pub fn sanitize_stem(name: &str) -> String {
    replace_specials(name).to_lowercase()
}

/// `<stem><suffix><extension>` for the given format.
pub fn file_name(stem: &str, format: OutputFormat) -> Result<String, DeliveryError> {
    let stem = stem.trim();
    if stem.is_empty() {
        return Err(DeliveryError::EmptyFileName);
    }
    Ok(format!(
        "{}{}{}",
        sanitize_stem(stem),
        format.file_suffix(),
        format.extension()
    ))
}

/// Writes `document` into `dir` and returns where it landed.
pub async fn save(
    document: &RenderedDocument,
    dir: &Path,
    stem: &str,
) -> Result<PathBuf, DeliveryError> {
    let path = dir.join(file_name(stem, document.format)?);
    tokio::fs::write(&path, &document.body)
        .await
        .map_err(|source| DeliveryError::Write {
            path: path.clone(),
            source,
        })?;
    info!(
        mime = document.mime_type(),
        "saved {} bytes to {}",
        document.body.len(),
        path.display()
    );
    Ok(path)
}
