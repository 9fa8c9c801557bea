// src/pipeline/executor.rs

//! Drives one pipeline run from first step to terminal outcome.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::bridge::{DestinationRequest, PatchSink};
use crate::config::Toolchain;
use crate::errors::Result;
use crate::exec::{SubprocessChannel, Utf8Chunker};
use crate::request::PatchRequest;

use super::{
    publish, ExecutionResult, PatchOutcome, PipelinePlan, PipelineStep, StepOutput, SAVE_PROMPT,
};

/// Where a run currently is.
#[derive(Debug)]
enum Phase {
    /// Run the step at this index; past the end means patching is done.
    Step(usize),
    RequestDestination,
    Publish(PathBuf),
    Done(PatchOutcome),
}

/// Runs plans through a subprocess channel, reporting to a sink.
///
/// Steps are strictly sequential: at most one child process exists at any
/// time. The run's working directory is created here and removed before
/// `run` returns, whatever the outcome.
pub struct PipelineExecutor<'a, C: ?Sized, S: ?Sized> {
    toolchain: &'a Toolchain,
    channel: &'a C,
    sink: &'a S,
}

impl<'a, C, S> PipelineExecutor<'a, C, S>
where
    C: SubprocessChannel + ?Sized,
    S: PatchSink + ?Sized,
{
    pub fn new(toolchain: &'a Toolchain, channel: &'a C, sink: &'a S) -> Self {
        Self {
            toolchain,
            channel,
            sink,
        }
    }

    pub async fn run(&self, request: &PatchRequest) -> Result<PatchOutcome> {
        let workdir = self.toolchain.create_workdir()?;
        info!(
            mode = %request.mode(),
            input = %request.input().display(),
            workdir = %workdir.path().display(),
            "starting patch run"
        );

        let plan = PipelinePlan::for_request(self.toolchain, request, workdir.path());
        let outcome = self.drive(&plan).await;

        let workdir_path = workdir.path().to_path_buf();
        if let Err(e) = workdir.close() {
            warn!(workdir = %workdir_path.display(), error = %e, "failed to remove working directory");
        }

        match &outcome {
            Ok(o) => info!(outcome = ?o, "patch run finished"),
            Err(e) => warn!(error = %e, "patch run failed"),
        }
        outcome
    }

    async fn drive(&self, plan: &PipelinePlan) -> Result<PatchOutcome> {
        let mut suggested_name: Option<String> = None;
        let mut phase = Phase::Step(0);

        loop {
            debug!(?phase, "pipeline phase");
            phase = match phase {
                Phase::Step(index) => match plan.steps.get(index) {
                    Some(step) => {
                        let result = self.run_step(step).await?;
                        if result.exit_code != 0 {
                            warn!(step = step.name, exit_code = result.exit_code, "step failed");
                            return Err(step.failure(result.exit_code));
                        }
                        if suggested_name.is_none() {
                            suggested_name =
                                result.captured.map(|text| text.trim_end().to_string());
                        }
                        Phase::Step(index + 1)
                    }
                    None => Phase::RequestDestination,
                },

                Phase::RequestDestination => {
                    let suggested = suggested_name
                        .take()
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| plan.fallback_name());
                    let request = DestinationRequest {
                        prompt: SAVE_PROMPT.to_string(),
                        suggested_name: suggested,
                        filter: plan.filter.to_string(),
                    };
                    match self.sink.request_destination(request).await? {
                        Some(destination) => Phase::Publish(destination),
                        None => {
                            info!("no destination chosen; discarding artifact");
                            Phase::Done(PatchOutcome::SkippedByUser)
                        }
                    }
                }

                Phase::Publish(destination) => {
                    self.sink
                        .append_log(&format!("saving: {}\n", destination.display()));
                    publish(&plan.artifact, &destination).await?;
                    Phase::Done(PatchOutcome::Success { destination })
                }

                Phase::Done(outcome) => return Ok(outcome),
            };
        }
    }

    async fn run_step(&self, step: &PipelineStep) -> Result<ExecutionResult> {
        info!(step = step.name, cmd = %step.command.line, "executing step");
        self.sink
            .append_log(&format!("executing: {}\n", step.command.line));

        let sink = self.sink;
        let capture = step.output == StepOutput::Capture;
        let mut captured = Vec::new();
        let mut out_text = Utf8Chunker::new();
        let mut err_text = Utf8Chunker::new();

        let exit_code = {
            let mut on_stdout = |chunk: &[u8]| {
                if capture {
                    captured.extend_from_slice(chunk);
                } else {
                    log_text(sink, &out_text.push(chunk));
                }
            };
            let mut on_stderr = |chunk: &[u8]| log_text(sink, &err_text.push(chunk));

            self.channel
                .execute(&step.command, step.input, &mut on_stdout, &mut on_stderr)
                .await?
        };

        if !capture {
            log_text(sink, &out_text.finish());
        }
        log_text(sink, &err_text.finish());

        Ok(ExecutionResult {
            exit_code,
            captured: capture.then(|| String::from_utf8_lossy(&captured).into_owned()),
        })
    }
}

fn log_text<S: PatchSink + ?Sized>(sink: &S, text: &str) {
    if !text.is_empty() {
        sink.append_log(text);
    }
}
