// src/request/master_quest.rs

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Disc IDs of the GameCube discs that also carry Master Quest (JP and US).
pub const MASTER_QUEST_IDS: [&[u8; 6]; 2] = [b"D43J01", b"D43E01"];

/// Whether the disc image at `iso` is a Master Quest variant.
///
/// Only the 6-byte game ID at the start of the image is inspected. Images
/// shorter than that are simply not Master Quest.
pub fn detect_master_quest(fs: &dyn FileSystem, iso: &Path) -> Result<bool> {
    let reader = fs.open_read(iso)?;

    let mut id = Vec::with_capacity(6);
    reader
        .take(6)
        .read_to_end(&mut id)
        .with_context(|| format!("reading disc header of {:?}", iso))?;

    let is_mq = MASTER_QUEST_IDS.iter().any(|mq| id.as_slice() == mq.as_slice());
    debug!(iso = %iso.display(), game_id = %String::from_utf8_lossy(&id), is_mq, "read disc id");
    Ok(is_mq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn recognizes_both_master_quest_ids() {
        let fs = MockFileSystem::new();
        fs.add_file("jp.iso", b"D43J01rest-of-header".to_vec());
        fs.add_file("us.iso", b"D43E01".to_vec());
        fs.add_file("ce.iso", b"D43U01rest".to_vec());
        fs.add_file("tiny.iso", b"D43".to_vec());

        assert!(detect_master_quest(&fs, Path::new("jp.iso")).unwrap());
        assert!(detect_master_quest(&fs, Path::new("us.iso")).unwrap());
        assert!(!detect_master_quest(&fs, Path::new("ce.iso")).unwrap());
        assert!(!detect_master_quest(&fs, Path::new("tiny.iso")).unwrap());
    }

    #[test]
    fn unreadable_iso_is_an_error() {
        let fs = MockFileSystem::new();
        assert!(detect_master_quest(&fs, Path::new("nope.iso")).is_err());
    }
}
