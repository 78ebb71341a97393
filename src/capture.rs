use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::surface::FormSurface;

/// Proof of submission written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationArtifact {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Wait until `settle` has passed since `submitted_at`, then write a
/// screenshot to `path`, replacing whatever was there.
pub async fn capture<S: FormSurface>(
    surface: &S,
    path: &Path,
    submitted_at: Instant,
    settle: Duration,
) -> Result<ConfirmationArtifact> {
    tokio::time::sleep_until(submitted_at + settle).await;

    let png = surface.screenshot().await?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| Error::Capture {
                path: path.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, &png)
        .await
        .map_err(|source| Error::Capture {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(path = %path.display(), bytes = png.len(), "confirmation captured");
    Ok(ConfirmationArtifact {
        path: path.to_path_buf(),
        bytes: png.len(),
    })
}
