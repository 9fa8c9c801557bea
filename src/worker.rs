// src/worker.rs

//! Runs one pipeline off the consumer's task.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::bridge::PatchSink;
use crate::config::Toolchain;
use crate::errors::PatchError;
use crate::exec::SubprocessChannel;
use crate::pipeline::{PatchStatus, PipelineExecutor, RunResult};
use crate::request::PatchRequest;

enum State {
    Running(JoinHandle<RunResult>),
    Finished(RunResult),
}

/// Handle to a single pipeline run.
///
/// The run owns its request, toolchain, channel and sink. Faults never
/// escape the spawned task; they are captured in the [`RunResult`] handed
/// back by [`WorkerTask::join`]. The sink receives `report_done` once the
/// run reaches a terminal outcome.
pub struct WorkerTask {
    state: State,
}

impl WorkerTask {
    /// Start a run. Must be called from within a Tokio runtime.
    pub fn spawn<C, S>(request: PatchRequest, toolchain: Toolchain, channel: C, sink: S) -> Self
    where
        C: SubprocessChannel + 'static,
        S: PatchSink + 'static,
    {
        let handle = tokio::spawn(async move {
            let executor = PipelineExecutor::new(&toolchain, &channel, &sink);
            let result = executor.run(&request).await.map_err(Arc::new);
            sink.report_done(PatchStatus::of(&result));
            result
        });

        Self {
            state: State::Running(handle),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            State::Running(handle) => handle.is_finished(),
            State::Finished(_) => true,
        }
    }

    /// Wait for the run and return its result.
    ///
    /// The first call waits for completion; later calls return the cached
    /// result immediately. Nothing is ever run twice.
    pub async fn join(&mut self) -> RunResult {
        loop {
            match &mut self.state {
                State::Finished(result) => return result.clone(),
                State::Running(handle) => {
                    let result = match handle.await {
                        Ok(result) => result,
                        Err(e) => {
                            error!(error = %e, "patch worker did not complete");
                            Err(Arc::new(PatchError::WorkerPanicked(e.to_string())))
                        }
                    };
                    debug!(status = ?PatchStatus::of(&result), "worker joined");
                    self.state = State::Finished(result);
                }
            }
        }
    }
}
