// src/bridge/mod.rs

//! Boundary between a running pipeline and its consumer.
//!
//! The pipeline needs three things from whoever started it:
//! - somewhere to append log text,
//! - a blocking answer to "where should the result be saved?",
//! - a completion notice.
//!
//! [`PatchSink`] is that contract. [`channel`] builds the standard
//! implementation: a single unbounded event queue carrying log chunks,
//! destination prompts and the completion notice in producer order, with a
//! one-shot reply slot per prompt. Because log writes never wait on the
//! consumer and the prompt travels behind any earlier log text, the consumer
//! can service everything from one loop without deadlocking.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::errors::{PatchError, Result};
use crate::pipeline::PatchStatus;

/// What the pipeline asks for once the patched artifact is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationRequest {
    /// Dialog caption, e.g. "Save as...".
    pub prompt: String,
    /// File name printed by the patcher.
    pub suggested_name: String,
    /// File-type filter, e.g. "Nintendo Wii WAD (*.wad)".
    pub filter: String,
}

/// Consumer-facing surface the pipeline calls into.
pub trait PatchSink: Send + Sync {
    /// Fire-and-forget log append. Must not block on the consumer.
    fn append_log(&self, text: &str);

    /// Ask for a destination and wait for the answer.
    ///
    /// `Ok(None)` means the user chose not to save. There is no timeout: an
    /// unresponsive consumer stalls the run.
    fn request_destination(
        &self,
        request: DestinationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<PathBuf>>> + Send + '_>>;

    /// Terminal notice, sent exactly once per run after all log text.
    fn report_done(&self, status: PatchStatus);
}

/// Events delivered to the consumer, in the order the worker produced them.
#[derive(Debug)]
pub enum SinkEvent {
    Log(String),
    Destination(DestinationPrompt),
    Done(PatchStatus),
}

/// A pending destination request. Answer it exactly once.
///
/// Dropping it unanswered makes the run fail with `ConsumerGone`.
#[derive(Debug)]
pub struct DestinationPrompt {
    pub request: DestinationRequest,
    reply: oneshot::Sender<Option<PathBuf>>,
}

impl DestinationPrompt {
    /// Answer with a path; an empty path counts as "don't save".
    pub fn answer(self, path: impl Into<PathBuf>) {
        let path = path.into();
        let answer = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        };
        self.reply_with(answer);
    }

    /// Decline to save the artifact.
    pub fn skip(self) {
        self.reply_with(None);
    }

    fn reply_with(self, answer: Option<PathBuf>) {
        if self.reply.send(answer).is_err() {
            debug!("destination answer dropped; worker no longer waiting");
        }
    }
}

/// Worker half of the standard bridge.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

/// Consumer half of the standard bridge.
#[derive(Debug)]
pub struct SinkReceiver {
    rx: mpsc::UnboundedReceiver<SinkEvent>,
}

impl SinkReceiver {
    /// Next event, or `None` once every `ChannelSink` is gone.
    pub async fn recv(&mut self) -> Option<SinkEvent> {
        self.rx.recv().await
    }
}

/// Create a connected sink / receiver pair.
pub fn channel() -> (ChannelSink, SinkReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink { tx }, SinkReceiver { rx })
}

impl PatchSink for ChannelSink {
    fn append_log(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.tx.send(SinkEvent::Log(text.to_string())).is_err() {
            debug!("log receiver closed; dropping log text");
        }
    }

    fn request_destination(
        &self,
        request: DestinationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<PathBuf>>> + Send + '_>> {
        Box::pin(async move {
            let (reply, answer) = oneshot::channel();
            self.tx
                .send(SinkEvent::Destination(DestinationPrompt { request, reply }))
                .map_err(|_| PatchError::ConsumerGone)?;
            answer.await.map_err(|_| PatchError::ConsumerGone)
        })
    }

    fn report_done(&self, status: PatchStatus) {
        if self.tx.send(SinkEvent::Done(status)).is_err() {
            debug!(?status, "completion receiver closed");
        }
    }
}
