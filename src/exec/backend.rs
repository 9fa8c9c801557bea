// src/exec/backend.rs

//! Pluggable subprocess channel abstraction.
//!
//! The pipeline talks to a `SubprocessChannel` instead of spawning processes
//! itself. Production code uses [`TokioChannel`]; tests can provide a fake
//! that replays canned output without touching the OS.

use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::Result;

/// Callback receiving one chunk of a child's output stream.
pub type ChunkFn<'a> = &'a mut (dyn FnMut(&[u8]) + Send);

/// A fully composed step invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Shell command line, already quoted.
    pub line: String,
    /// Extra environment for the child only.
    pub env: Vec<(String, OsString)>,
    /// Executable the line starts. When set, it must exist and be executable
    /// before anything is spawned.
    pub program: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            env: Vec::new(),
            program: None,
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Trait abstracting how one step process is run.
///
/// Contract shared by every backend:
/// - fail with `Spawn` when the child cannot be started, including a
///   `program` that is missing or not executable,
/// - spawn the child with stdin, stdout and stderr all piped,
/// - write `input` completely, then close stdin,
/// - drain stdout and stderr without letting either block the other, handing
///   each chunk to its callback in arrival order for that stream,
/// - once both streams hit end-of-stream, wait for exit and return the code.
///
/// Callbacks are only borrowed for the duration of the call, so no chunk can
/// be delivered after the returned future completes.
pub trait SubprocessChannel: Send + Sync {
    fn execute<'a>(
        &'a self,
        spec: &'a CommandSpec,
        input: &'a [u8],
        on_stdout: ChunkFn<'a>,
        on_stderr: ChunkFn<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>>;
}
