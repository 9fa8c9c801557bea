// src/pipeline/publish.rs

//! Moving the finished artifact to where the user asked for it.

use std::io;
use std::path::Path;

use tokio::fs;
use tracing::{debug, info, warn};

use crate::errors::{PatchError, Result};

/// Rename `working` to `destination`.
///
/// - If the rename fails while `destination` exists, the existing file is
///   deleted and the rename is retried exactly once.
/// - If the two paths are on different filesystems, the artifact is copied
///   and the working copy removed.
///
/// Any other failure is a `Publish` error. A failed publish never modifies
/// `working`.
pub async fn publish(working: &Path, destination: &Path) -> Result<()> {
    let first = match fs::rename(working, destination).await {
        Ok(()) => {
            info!(destination = %destination.display(), "artifact published");
            return Ok(());
        }
        Err(e) => e,
    };

    if first.kind() == io::ErrorKind::CrossesDevices {
        return copy_across(working, destination).await;
    }

    if !fs::try_exists(destination).await.unwrap_or(false) {
        return Err(publish_error(working, destination, first));
    }

    warn!(
        destination = %destination.display(),
        error = %first,
        "rename onto existing destination failed; replacing it"
    );
    if let Err(e) = fs::remove_file(destination).await {
        debug!(error = %e, "could not remove existing destination");
    }

    match fs::rename(working, destination).await {
        Ok(()) => {
            info!(destination = %destination.display(), "artifact published");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_across(working, destination).await
        }
        Err(e) => Err(publish_error(working, destination, e)),
    }
}

async fn copy_across(working: &Path, destination: &Path) -> Result<()> {
    debug!(destination = %destination.display(), "cross-device publish; copying");
    fs::copy(working, destination)
        .await
        .map_err(|e| publish_error(working, destination, e))?;
    if let Err(e) = fs::remove_file(working).await {
        debug!(error = %e, "working copy left for directory cleanup");
    }
    info!(destination = %destination.display(), "artifact published");
    Ok(())
}

fn publish_error(working: &Path, destination: &Path, source: io::Error) -> PatchError {
    PatchError::Publish {
        working: working.to_path_buf(),
        destination: destination.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replaces_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let working = dir.path().join("gz.z64");
        let destination = dir.path().join("out.z64");
        std::fs::write(&working, b"patched").unwrap();
        std::fs::write(&destination, b"old contents").unwrap();

        publish(&working, &destination).await.unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"patched");
        assert!(!working.exists());
    }

    #[tokio::test]
    async fn unwritable_destination_leaves_working_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let working = dir.path().join("gz.wad");
        let destination = dir.path().join("missing-dir").join("out.wad");
        std::fs::write(&working, b"patched").unwrap();

        let err = publish(&working, &destination).await.unwrap_err();

        assert!(matches!(err, PatchError::Publish { .. }));
        assert_eq!(std::fs::read(&working).unwrap(), b"patched");
    }

    #[tokio::test]
    async fn directory_in_the_way_is_a_publish_error() {
        let dir = tempfile::tempdir().unwrap();
        let working = dir.path().join("gz.iso");
        let destination = dir.path().join("taken");
        std::fs::write(&working, b"patched").unwrap();
        std::fs::create_dir(&destination).unwrap();
        std::fs::write(destination.join("keep"), b"x").unwrap();

        let err = publish(&working, &destination).await.unwrap_err();

        assert!(matches!(err, PatchError::Publish { .. }));
        assert_eq!(std::fs::read(&working).unwrap(), b"patched");
        assert!(destination.join("keep").exists());
    }
}
