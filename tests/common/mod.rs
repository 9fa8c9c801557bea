#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gzpatch::config::Toolchain;
use gzpatch::pipeline::{PipelineExecutor, RunResult};
use gzpatch::request::PatchRequest;
use gzpatch_test_utils::recording_sink::RecordingSink;
use gzpatch_test_utils::scripted_channel::ScriptedChannel;

pub use gzpatch_test_utils::{init_tracing, with_timeout};

/// Run one request through the executor with fakes on both sides.
pub async fn run_scripted(
    toolchain: &Toolchain,
    channel: &ScriptedChannel,
    sink: &RecordingSink,
    request: impl Into<PatchRequest>,
) -> RunResult {
    let executor = PipelineExecutor::new(toolchain, channel, sink);
    with_timeout(executor.run(&request.into()))
        .await
        .map_err(Arc::new)
}

pub fn write_input(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"input").unwrap();
    path
}

/// A fresh, empty directory for working directories.
pub fn work_root(dir: &Path) -> PathBuf {
    let root = dir.join("work");
    std::fs::create_dir(&root).unwrap();
    root
}
