//! Bounded waits for drafter output assets.
//!
//! The external drafter writes its rendered files to disk on its own
//! schedule. This module polls for a file with a fixed retry count and
//! interval; it never waits indefinitely.

use redraw_core::error::{RedrawError, Result};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::time::sleep;

/// Waits for a non-empty file to appear at `path`.
///
/// Polls up to `retries` times, sleeping `interval` between attempts. A file
/// that exists but is still empty does not count as present; the drafter may
/// have created it but not finished writing.
///
/// # Errors
///
/// Returns `ArtifactTimeout` if the file is still absent or empty after the
/// final attempt.
pub async fn wait_for_artifact(path: &Path, retries: u32, interval: Duration) -> Result<()> {
    for attempt in 1..=retries {
        if let Ok(metadata) = fs::metadata(path).await {
            if metadata.is_file() && metadata.len() > 0 {
                tracing::debug!(
                    "[artifacts] Found artifact after {} attempt(s): {:?}",
                    attempt,
                    path
                );
                return Ok(());
            }
        }

        if attempt < retries {
            sleep(interval).await;
        }
    }

    Err(RedrawError::artifact_timeout(path.display().to_string()))
}
