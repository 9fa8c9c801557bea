use std::path::{Path, PathBuf};

use gzpatch::config::{ConfigFile, Toolchain};

/// Builder for `Toolchain` to simplify test setup.
pub struct ToolchainBuilder {
    toolchain: Toolchain,
}

impl ToolchainBuilder {
    /// Built-in tool locations, working directories under `temp_root`.
    pub fn new(temp_root: impl AsRef<Path>) -> Self {
        let mut toolchain = ConfigFile::builtin().toolchain();
        toolchain.temp_root = Some(temp_root.as_ref().to_path_buf());
        Self { toolchain }
    }

    pub fn patcher(mut self, path: impl Into<PathBuf>) -> Self {
        self.toolchain.patcher = path.into();
        self
    }

    pub fn injector(mut self, path: impl Into<PathBuf>) -> Self {
        self.toolchain.injector = path.into();
        self
    }

    pub fn script_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.toolchain.script_dir = path.into();
        self
    }

    pub fn build(self) -> Toolchain {
        self.toolchain
    }
}

/// Number of entries left in a directory.
pub fn entries_in(dir: impl AsRef<Path>) -> usize {
    std::fs::read_dir(dir).map(|rd| rd.count()).unwrap_or(0)
}
