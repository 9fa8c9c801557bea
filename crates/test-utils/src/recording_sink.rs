use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use gzpatch::bridge::{DestinationRequest, PatchSink};
use gzpatch::errors::Result;
use gzpatch::pipeline::PatchStatus;

#[derive(Default)]
struct Inner {
    log: Vec<String>,
    requests: Vec<DestinationRequest>,
    done: Vec<PatchStatus>,
}

/// A sink that records everything and answers destination requests with a
/// fixed path (or declines, when constructed with `None`).
#[derive(Clone)]
pub struct RecordingSink {
    answer: Option<PathBuf>,
    inner: Arc<Mutex<Inner>>,
}

impl RecordingSink {
    pub fn answering(destination: impl Into<PathBuf>) -> Self {
        Self {
            answer: Some(destination.into()),
            inner: Arc::default(),
        }
    }

    pub fn declining() -> Self {
        Self {
            answer: None,
            inner: Arc::default(),
        }
    }

    /// Log chunks joined together.
    pub fn log_text(&self) -> String {
        self.inner.lock().unwrap().log.concat()
    }

    /// Log lines starting with `prefix`.
    pub fn log_lines_starting_with(&self, prefix: &str) -> Vec<String> {
        self.log_text()
            .lines()
            .filter(|l| l.starts_with(prefix))
            .map(str::to_string)
            .collect()
    }

    pub fn requests(&self) -> Vec<DestinationRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn done(&self) -> Vec<PatchStatus> {
        self.inner.lock().unwrap().done.clone()
    }
}

impl PatchSink for RecordingSink {
    fn append_log(&self, text: &str) {
        self.inner.lock().unwrap().log.push(text.to_string());
    }

    fn request_destination(
        &self,
        request: DestinationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<PathBuf>>> + Send + '_>> {
        self.inner.lock().unwrap().requests.push(request);
        let answer = self.answer.clone();
        Box::pin(async move { Ok(answer) })
    }

    fn report_done(&self, status: PatchStatus) {
        self.inner.lock().unwrap().done.push(status);
    }
}
