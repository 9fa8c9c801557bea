// src/request/validate.rs

use std::path::Path;

use crate::errors::{PatchError, Result};
use crate::fs::FileSystem;
use crate::request::PatchRequest;

impl PatchRequest {
    /// Check that the request can start a run.
    ///
    /// - the primary input must be named,
    /// - every enabled optional ROM must be named,
    /// - every named file must exist,
    /// - every path must be valid UTF-8, since it is passed on a command line.
    ///
    /// A MQ merge ROM on a non-MQ disc is ignored, not rejected.
    pub fn validate(&self, fs: &dyn FileSystem) -> Result<()> {
        require_file(fs, "input", self.input())?;

        match self {
            PatchRequest::Rom(r) => {
                if let Some(ucode) = &r.microcode {
                    require_file(fs, "microcode ROM", ucode)?;
                }
            }
            PatchRequest::Wad(w) => {
                if let Some(rom) = &w.merge_rom {
                    require_file(fs, "merge ROM", rom)?;
                }
            }
            PatchRequest::Iso(i) => {
                if let Some(rom) = &i.merge_rom {
                    require_file(fs, "merge ROM", rom)?;
                }
                if let Some(rom) = i.effective_merge_mq_rom() {
                    require_file(fs, "Master Quest merge ROM", rom)?;
                }
            }
        }

        Ok(())
    }
}

fn require_file(fs: &dyn FileSystem, what: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(PatchError::InvalidRequest(format!("no {what} selected")));
    }
    if path.to_str().is_none() {
        return Err(PatchError::InvalidRequest(format!(
            "{what} path {} is not valid UTF-8",
            path.display()
        )));
    }
    if !fs.is_file(path) {
        return Err(PatchError::InvalidRequest(format!(
            "{what} {} does not exist or is not a file",
            path.display()
        )));
    }
    Ok(())
}
