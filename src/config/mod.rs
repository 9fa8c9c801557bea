// src/config/mod.rs

//! Configuration loading and validation for gzpatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, falling back to built-ins (`loader.rs`).
//! - Validate tool paths and run settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_builtin};
pub use model::{
    ConfigFile, DefaultsSection, RawConfigFile, RunSection, Toolchain, ToolsSection,
    DEFAULT_INJECTOR_ENV,
};
