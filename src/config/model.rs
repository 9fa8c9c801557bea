// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;
use tempfile::TempDir;

use crate::errors::{PatchError, Result};
use crate::types::{ConsoleRegion, ControllerRemap};

/// Environment variable that tells the patcher where the injector lives.
pub const DEFAULT_INJECTOR_ENV: &str = "GZINJECT";

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [tools]
/// patcher = "bin/gru"
/// injector = "bin/gzinject"
/// script_dir = "lua"
/// injector_env = "GZINJECT"
///
/// [run]
/// temp_root = "/var/tmp"
/// data_dirs = ["ups", "gzi"]
///
/// [defaults]
/// remap = "raphnet"
/// region = "free"
/// trim = true
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub defaults: DefaultsSection,
}

/// Validated configuration. Only constructed through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub tools: ToolsSection,
    pub run: RunSection,
    pub defaults: DefaultsSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        tools: ToolsSection,
        run: RunSection,
        defaults: DefaultsSection,
    ) -> Self {
        Self {
            tools,
            run,
            defaults,
        }
    }

    /// Built-in configuration used when no config file is present.
    pub fn builtin() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.tools, raw.run, raw.defaults)
    }

    /// The tool locations a pipeline run needs.
    pub fn toolchain(&self) -> Toolchain {
        Toolchain {
            patcher: self.tools.patcher.clone(),
            injector: self.tools.injector.clone(),
            script_dir: self.tools.script_dir.clone(),
            injector_env: self.tools.injector_env.clone(),
            temp_root: self.run.temp_root.clone(),
        }
    }
}

/// `[tools]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// Script host that applies patches and prints the suggested file name.
    #[serde(default = "default_patcher")]
    pub patcher: PathBuf,

    /// WAD injector; also used for common-key generation.
    #[serde(default = "default_injector")]
    pub injector: PathBuf,

    /// Directory holding the patch scripts.
    #[serde(default = "default_script_dir")]
    pub script_dir: PathBuf,

    #[serde(default = "default_injector_env")]
    pub injector_env: String,
}

fn default_patcher() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("bin\\gru.exe")
    } else {
        PathBuf::from("bin/gru")
    }
}

fn default_injector() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("bin\\gzinject.exe")
    } else {
        PathBuf::from("bin/gzinject")
    }
}

fn default_script_dir() -> PathBuf {
    PathBuf::from("lua")
}

fn default_injector_env() -> String {
    DEFAULT_INJECTOR_ENV.to_string()
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            patcher: default_patcher(),
            injector: default_injector(),
            script_dir: default_script_dir(),
            injector_env: default_injector_env(),
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// Parent directory for per-run working directories.
    ///
    /// If `None`, the system temp directory is used.
    #[serde(default)]
    pub temp_root: Option<PathBuf>,

    /// Data directories the patch scripts read from.
    #[serde(default = "default_data_dirs")]
    pub data_dirs: Vec<PathBuf>,
}

fn default_data_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("ups"), PathBuf::from("gzi")]
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            temp_root: None,
            data_dirs: default_data_dirs(),
        }
    }
}

/// `[defaults]` section: initial values for options the CLI does not set.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsSection {
    #[serde(default)]
    pub remap: ControllerRemap,

    #[serde(default)]
    pub region: ConsoleRegion,

    /// Remove unneeded files from patched ISOs.
    #[serde(default = "default_trim")]
    pub trim: bool,
}

fn default_trim() -> bool {
    true
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            remap: ControllerRemap::default(),
            region: ConsoleRegion::default(),
            trim: default_trim(),
        }
    }
}

/// Resolved tool locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub patcher: PathBuf,
    pub injector: PathBuf,
    pub script_dir: PathBuf,
    pub injector_env: String,
    pub temp_root: Option<PathBuf>,
}

impl Default for Toolchain {
    fn default() -> Self {
        ConfigFile::builtin().toolchain()
    }
}

impl Toolchain {
    /// Path of a patch script inside `script_dir`.
    pub fn script(&self, name: &str) -> PathBuf {
        self.script_dir.join(name)
    }

    /// Create the private working directory for a run.
    ///
    /// The directory and everything in it is removed when the returned guard
    /// is dropped.
    pub fn create_workdir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("gzpatch-");
        let dir = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(PatchError::WorkDir)
    }
}
