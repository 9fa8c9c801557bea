// src/install.rs

//! Installation check: are the tools, scripts and data the pipelines rely
//! on actually there?

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::config::ConfigFile;
use crate::fs::FileSystem;
use crate::pipeline::REQUIRED_SCRIPTS;

pub const MISSING_FILES_MESSAGE: &str = "Files are missing! If you've downloaded this program as \
     part of a package, be sure to extract all of the files inside the package.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingItem {
    /// Executable not found or not executable.
    Tool(PathBuf),
    Script(PathBuf),
    DataDir(PathBuf),
}

impl fmt::Display for MissingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingItem::Tool(p) => write!(f, "executable {}", p.display()),
            MissingItem::Script(p) => write!(f, "script {}", p.display()),
            MissingItem::DataDir(p) => write!(f, "directory {}", p.display()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub missing: Vec<MissingItem>,
}

impl InstallReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub fn verify_installation(fs: &dyn FileSystem, config: &ConfigFile) -> InstallReport {
    let toolchain = config.toolchain();
    let mut missing = Vec::new();

    for tool in [&toolchain.patcher, &toolchain.injector] {
        if !fs.is_executable(tool) {
            missing.push(MissingItem::Tool(tool.clone()));
        }
    }

    for script in REQUIRED_SCRIPTS {
        let path = toolchain.script(script);
        if !fs.is_file(&path) {
            missing.push(MissingItem::Script(path));
        }
    }

    for dir in &config.run.data_dirs {
        if !fs.is_dir(dir) {
            missing.push(MissingItem::DataDir(dir.clone()));
        }
    }

    debug!(missing = missing.len(), "installation check finished");
    InstallReport { missing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn complete_install(fs: &MockFileSystem, config: &ConfigFile) {
        let tc = config.toolchain();
        fs.add_executable(&tc.patcher);
        fs.add_executable(&tc.injector);
        for script in REQUIRED_SCRIPTS {
            fs.add_file(tc.script(script), b"-- lua".to_vec());
        }
        for dir in &config.run.data_dirs {
            fs.add_dir(dir);
        }
    }

    #[test]
    fn complete_install_has_nothing_missing() {
        let fs = MockFileSystem::new();
        let config = ConfigFile::builtin();
        complete_install(&fs, &config);

        assert!(verify_installation(&fs, &config).is_complete());
    }

    #[test]
    fn non_executable_tool_is_reported() {
        let fs = MockFileSystem::new();
        let config = ConfigFile::builtin();
        complete_install(&fs, &config);

        let patcher = config.toolchain().patcher;
        fs.add_file(&patcher, b"#!/bin/sh".to_vec());

        let report = verify_installation(&fs, &config);
        assert_eq!(report.missing, vec![MissingItem::Tool(patcher)]);
    }

    #[test]
    fn empty_install_reports_everything() {
        let fs = MockFileSystem::new();
        let config = ConfigFile::builtin();

        let report = verify_installation(&fs, &config);
        assert!(!report.is_complete());
        assert_eq!(report.missing.len(), 2 + REQUIRED_SCRIPTS.len() + 2);
        assert!(report
            .missing
            .contains(&MissingItem::DataDir(std::path::PathBuf::from("gzi"))));
    }
}
