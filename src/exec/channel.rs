// src/exec/channel.rs

//! Real subprocess channel built on `tokio::process`.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tracing::{debug, info, warn};

use crate::errors::{PatchError, Result};
use crate::exec::backend::{ChunkFn, CommandSpec, SubprocessChannel};
use crate::fs::{FileSystem, RealFileSystem};

/// Read size for each output pipe.
const CHUNK_SIZE: usize = 1024;

/// Which shell interprets a step's command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    /// `sh -c <line>`
    Posix,
    /// `cmd /S /C "<line>"`
    Cmd,
}

impl Shell {
    /// The shell of the platform we were compiled for.
    pub fn native() -> Self {
        if cfg!(windows) { Shell::Cmd } else { Shell::Posix }
    }

    fn command(self, line: &str) -> Command {
        match self {
            Shell::Posix => {
                let mut c = Command::new("sh");
                c.arg("-c").arg(line);
                c
            }
            Shell::Cmd => {
                let mut c = Command::new("cmd");
                // cmd.exe does its own parsing; hand it the line untouched.
                #[cfg(windows)]
                c.raw_arg("/S /C").raw_arg(cmd_wrapped(line));
                #[cfg(not(windows))]
                c.arg("/S").arg("/C").arg(cmd_wrapped(line));
                c
            }
        }
    }
}

/// Outer quote pair for `cmd /S /C`.
///
/// With `/S`, cmd.exe removes exactly the first and last quote of the
/// command string and runs the rest verbatim, so the inner quoting of the
/// program and its arguments survives.
fn cmd_wrapped(line: &str) -> String {
    format!("\"{line}\"")
}

impl Default for Shell {
    fn default() -> Self {
        Shell::native()
    }
}

/// Production channel: spawns the step through the platform shell and
/// multiplexes stdin writes and both output reads inside one task.
#[derive(Debug, Clone, Default)]
pub struct TokioChannel {
    shell: Shell,
}

impl TokioChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shell(shell: Shell) -> Self {
        Self { shell }
    }
}

impl SubprocessChannel for TokioChannel {
    fn execute<'a>(
        &'a self,
        spec: &'a CommandSpec,
        input: &'a [u8],
        on_stdout: ChunkFn<'a>,
        on_stderr: ChunkFn<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>> {
        Box::pin(execute(self.shell, spec, input, on_stdout, on_stderr))
    }
}

async fn execute(
    shell: Shell,
    spec: &CommandSpec,
    input: &[u8],
    on_stdout: ChunkFn<'_>,
    on_stderr: ChunkFn<'_>,
) -> Result<i32> {
    debug!(cmd = %spec.line, input_len = input.len(), "spawning step process");

    // The shell itself always starts, so a missing tool would otherwise only
    // show up as an exit code.
    if let Some(program) = &spec.program {
        if resolve_program(&RealFileSystem, program).is_none() {
            warn!(cmd = %spec.line, program = %program.display(), "program cannot be launched");
            return Err(PatchError::Spawn {
                command: spec.line.clone(),
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} is missing or not executable", program.display()),
                ),
            });
        }
    }

    let mut cmd = shell.command(&spec.line);
    cmd.envs(spec.env.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| PatchError::Spawn {
        command: spec.line.clone(),
        source,
    })?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| missing_pipe(spec, "stdout"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| missing_pipe(spec, "stderr"))?;

    let mut stdin = child.stdin.take();
    let mut pending = input;
    if pending.is_empty() {
        // Nothing to send: close right away so the child sees end-of-input.
        stdin = None;
    }

    let mut out_buf = [0u8; CHUNK_SIZE];
    let mut err_buf = [0u8; CHUNK_SIZE];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            written = write_some(&mut stdin, pending), if stdin.is_some() => {
                match written {
                    Ok(n) => {
                        pending = &pending[n..];
                        if pending.is_empty() {
                            stdin = None;
                            debug!(cmd = %spec.line, "stdin fully written and closed");
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        warn!(
                            cmd = %spec.line,
                            unsent = pending.len(),
                            "child closed stdin before reading all input"
                        );
                        stdin = None;
                    }
                    Err(source) => return Err(pipe_error(spec, "write", source)),
                }
            }
            read = stdout.read(&mut out_buf), if out_open => {
                let n = read.map_err(|source| pipe_error(spec, "read", source))?;
                if n == 0 {
                    out_open = false;
                } else {
                    on_stdout(&out_buf[..n]);
                }
            }
            read = stderr.read(&mut err_buf), if err_open => {
                let n = read.map_err(|source| pipe_error(spec, "read", source))?;
                if n == 0 {
                    err_open = false;
                } else {
                    on_stderr(&err_buf[..n]);
                }
            }
        }
    }

    // Both outputs are closed; the child may still hold stdin open.
    drop(stdin);

    let status = child
        .wait()
        .await
        .map_err(|source| pipe_error(spec, "wait", source))?;

    let code = status.code().unwrap_or(-1);
    info!(
        cmd = %spec.line,
        exit_code = code,
        success = status.success(),
        "step process exited"
    );

    Ok(code)
}

/// Where `program` would be found, if it is a launchable file.
///
/// A bare name is searched on `PATH`, like the shell does. On Windows a name
/// without an extension also matches `<name>.exe`.
fn resolve_program(fs: &dyn FileSystem, program: &Path) -> Option<PathBuf> {
    let bare = program.components().count() == 1 && !program.is_absolute();
    if !bare {
        return executable_candidates(program.to_path_buf())
            .into_iter()
            .find(|p| fs.is_executable(p));
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .flat_map(|dir| executable_candidates(dir.join(program)))
        .find(|p| fs.is_executable(p))
}

fn executable_candidates(path: PathBuf) -> Vec<PathBuf> {
    if cfg!(windows) && path.extension().is_none() {
        vec![path.with_extension("exe"), path]
    } else {
        vec![path]
    }
}

async fn write_some(stdin: &mut Option<ChildStdin>, data: &[u8]) -> io::Result<usize> {
    match stdin {
        Some(pipe) => pipe.write(data).await,
        None => std::future::pending().await,
    }
}

fn pipe_error(spec: &CommandSpec, op: &'static str, source: io::Error) -> PatchError {
    PatchError::PipeIo {
        command: spec.line.clone(),
        op,
        source,
    }
}

fn missing_pipe(spec: &CommandSpec, which: &'static str) -> PatchError {
    pipe_error(
        spec,
        "open",
        io::Error::other(format!("{which} was not captured")),
    )
}


#[cfg(all(test, windows))]
mod windows_tests {
    use super::*;
    use crate::exec::CommandLine;

    #[tokio::test]
    async fn quoted_program_and_argument_survive_cmd() {
        let dir = tempfile::tempdir().unwrap();
        let tool_dir = dir.path().join("tool dir");
        std::fs::create_dir(&tool_dir).unwrap();
        let tool = tool_dir.join("echo arg.bat");
        std::fs::write(&tool, "@echo off\r\necho %~1\r\nexit /b 4\r\n").unwrap();

        let spec = CommandLine::new(&tool).arg("with space").into_spec();
        let channel = TokioChannel::with_shell(Shell::Cmd);
        let mut out = Vec::new();
        let code = channel
            .execute(&spec, b"", &mut |c: &[u8]| out.extend_from_slice(c), &mut |_: &[u8]| {})
            .await
            .unwrap();

        assert_eq!(code, 4);
        assert_eq!(String::from_utf8_lossy(&out).trim_end(), "with space");
    }
}
