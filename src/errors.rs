// src/errors.rs

//! Crate-wide error type.
//!
//! Every fault a run can hit is a `PatchError`. The worker captures these and
//! hands them back at join time; the consumer turns them into a
//! [`crate::pipeline::PatchStatus`] for display.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("pipe {op} failed for `{command}`: {source}")]
    PipeIo {
        command: String,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("step '{step}' exited with status {code}")]
    ToolExit { step: &'static str, code: i32 },

    #[error("input was not recognized by the patcher (exit status {code})")]
    RomUnrecognized { code: i32 },

    #[error("could not save {} to {}: {source}", working.display(), destination.display())]
    Publish {
        working: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not create working directory: {0}")]
    WorkDir(#[source] std::io::Error),

    #[error("consumer went away before answering the destination request")]
    ConsumerGone,

    #[error("worker task panicked: {0}")]
    WorkerPanicked(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PatchError>;
