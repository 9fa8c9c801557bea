use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use gzpatch::errors::{PatchError, Result};
use gzpatch::exec::{ChunkFn, CommandSpec, SubprocessChannel};

/// Canned behaviour for commands matching a pattern.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResponse {
    /// Delivered to `on_stdout` one element per chunk.
    pub stdout: Vec<Vec<u8>>,
    pub stderr: Vec<Vec<u8>>,
    pub exit_code: i32,
    /// Create the file named after `-o` in the command line.
    pub writes_output: bool,
    /// Fail as if the process could not be started.
    pub spawn_fails: bool,
}

impl ScriptedResponse {
    pub fn ok() -> Self {
        Self::default()
    }

    /// Exit 0, print `name` on stdout and create the `-o` file.
    pub fn patched(name: &str) -> Self {
        Self {
            stdout: vec![name.as_bytes().to_vec()],
            writes_output: true,
            ..Self::default()
        }
    }

    pub fn exit(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::default()
        }
    }

    pub fn spawn_failure() -> Self {
        Self {
            spawn_fails: true,
            ..Self::default()
        }
    }

    pub fn with_stdout(mut self, chunk: impl Into<Vec<u8>>) -> Self {
        self.stdout.push(chunk.into());
        self
    }

    pub fn with_stderr(mut self, chunk: impl Into<Vec<u8>>) -> Self {
        self.stderr.push(chunk.into());
        self
    }
}

/// One recorded `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub spec: CommandSpec,
    pub input: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    rules: Vec<(String, ScriptedResponse)>,
    calls: Vec<RecordedCall>,
}

/// A fake channel that:
/// - records every command it is asked to run, with its stdin,
/// - replies with the first response whose pattern is a substring of the
///   command line (exit 0 and no output if none match).
#[derive(Clone, Default)]
pub struct ScriptedChannel {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, pattern: &str, response: ScriptedResponse) -> Self {
        self.inner
            .lock()
            .unwrap()
            .rules
            .push((pattern.to_string(), response));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.spec.line).collect()
    }

    fn respond(&self, spec: &CommandSpec, input: &[u8]) -> ScriptedResponse {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RecordedCall {
            spec: spec.clone(),
            input: input.to_vec(),
        });
        inner
            .rules
            .iter()
            .find(|(pattern, _)| spec.line.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_default()
    }
}

/// The quoted value following ` -o ` in a composed command line.
pub fn output_path(line: &str) -> Option<PathBuf> {
    let start = line.find(" -o \"")? + 5;
    let len = line[start..].find('"')?;
    Some(PathBuf::from(&line[start..start + len]))
}

impl SubprocessChannel for ScriptedChannel {
    fn execute<'a>(
        &'a self,
        spec: &'a CommandSpec,
        input: &'a [u8],
        on_stdout: ChunkFn<'a>,
        on_stderr: ChunkFn<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.respond(spec, input);
            if response.spawn_fails {
                return Err(PatchError::Spawn {
                    command: spec.line.clone(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }

            if response.writes_output {
                if let Some(path) = output_path(&spec.line) {
                    std::fs::write(path, b"patched").map_err(PatchError::Io)?;
                }
            }

            for chunk in &response.stdout {
                on_stdout(chunk.as_slice());
            }
            for chunk in &response.stderr {
                on_stderr(chunk.as_slice());
            }
            Ok(response.exit_code)
        })
    }
}
