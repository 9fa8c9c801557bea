// src/consumer.rs

//! Terminal consumer: services the sink bridge for one run.
//!
//! Log text is written to the given writer as it arrives. Destination
//! requests are answered according to a [`DestinationPolicy`]. Once the run
//! reports completion the worker is joined and its result classified.

use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::bridge::{DestinationPrompt, DestinationRequest, SinkEvent, SinkReceiver};
use crate::pipeline::{PatchStatus, RunResult};
use crate::worker::WorkerTask;

/// How destination requests are answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationPolicy {
    /// Always this path. An existing directory receives the suggested name.
    Fixed(PathBuf),
    /// Never save.
    Skip,
    /// Ask on the terminal.
    Prompt,
}

/// Final result of a serviced run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub result: RunResult,
    pub status: PatchStatus,
}

impl RunReport {
    /// Process exit code for this run.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            PatchStatus::Success | PatchStatus::SkippedByUser => 0,
            PatchStatus::RomUnrecognized => 2,
            PatchStatus::ToolError | PatchStatus::PublishError => 1,
        }
    }
}

pub struct Consumer<W> {
    log: W,
    policy: DestinationPolicy,
}

impl<W: Write> Consumer<W> {
    pub fn new(log: W, policy: DestinationPolicy) -> Self {
        Self { log, policy }
    }

    pub fn into_log(self) -> W {
        self.log
    }

    /// Service `events` until the run completes, then join `worker`.
    pub async fn drive(&mut self, events: &mut SinkReceiver, worker: &mut WorkerTask) -> RunReport {
        while let Some(event) = events.recv().await {
            match event {
                SinkEvent::Log(text) => self.write_log(&text),
                SinkEvent::Destination(prompt) => self.answer(prompt).await,
                SinkEvent::Done(status) => {
                    debug!(?status, "run reported completion");
                    break;
                }
            }
        }

        let result = worker.join().await;
        let status = PatchStatus::of(&result);
        if let Err(err) = &result {
            self.write_log(&format!("error: {err}\n"));
        }
        RunReport { result, status }
    }

    fn write_log(&mut self, text: &str) {
        let written = self
            .log
            .write_all(text.as_bytes())
            .and_then(|_| self.log.flush());
        if let Err(e) = written {
            debug!(error = %e, "failed to write patch log");
        }
    }

    async fn answer(&mut self, prompt: DestinationPrompt) {
        match &self.policy {
            DestinationPolicy::Fixed(path) => {
                let destination = resolve_fixed(path, &prompt.request.suggested_name);
                prompt.answer(destination);
            }
            DestinationPolicy::Skip => prompt.skip(),
            DestinationPolicy::Prompt => match ask_terminal(&prompt.request).await {
                Ok(Some(destination)) => prompt.answer(destination),
                Ok(None) => prompt.skip(),
                Err(e) => {
                    warn!(error = %e, "could not read destination; not saving");
                    prompt.skip();
                }
            },
        }
    }
}

fn resolve_fixed(path: &Path, suggested: &str) -> PathBuf {
    if path.is_dir() {
        path.join(suggested)
    } else {
        path.to_path_buf()
    }
}

async fn ask_terminal(request: &DestinationRequest) -> std::io::Result<Option<PathBuf>> {
    eprint!(
        "{} [{}] ({}; '-' to discard): ",
        request.prompt, request.suggested_name, request.filter
    );
    std::io::stderr().flush()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let line = lines.next_line().await?;
    Ok(interpret_answer(line.as_deref(), &request.suggested_name))
}

/// Turn a typed answer into a destination.
///
/// Enter accepts the suggestion, `-` or end of input discards the result.
fn interpret_answer(line: Option<&str>, suggested: &str) -> Option<PathBuf> {
    match line.map(str::trim) {
        None | Some("-") => None,
        Some("") => Some(PathBuf::from(suggested)),
        Some(path) => Some(PathBuf::from(path)),
    }
}
