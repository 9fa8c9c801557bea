// src/pipeline/iso.rs

//! ISO mode: patch the disc image, then save.
//!
//! The patch-iso flag set is provisional; see DESIGN.md.

use std::path::Path;

use crate::config::Toolchain;
use crate::request::IsoRequest;

use super::{
    non_empty, patcher_line, patcher_spec, OnFailure, PipelinePlan, PipelineStep, StepOutput,
    PATCH_ISO_SCRIPT,
};

pub const ISO_FILTER: &str = "Nintendo GameCube ISO (*.iso)";

pub fn plan(toolchain: &Toolchain, request: &IsoRequest, workdir: &Path) -> PipelinePlan {
    let extract = workdir.join("isoextract");
    let artifact = workdir.join("gz.iso");

    let patch = patcher_line(toolchain, PATCH_ISO_SCRIPT)
        .flag("-s")
        .opt("-d", &extract)
        .flags(request.remap.flag())
        .opt_if("-i", non_empty(&request.game_id))
        .opt_if("-t", non_empty(&request.game_name))
        .flag_if("--no-trim", !request.trim)
        .opt_if("-m", request.merge_rom.as_ref())
        .opt_if("--merge-mq", request.effective_merge_mq_rom())
        .opt("-o", &artifact)
        .arg(&request.iso);

    PipelinePlan {
        steps: vec![PipelineStep {
            name: "patch-iso",
            command: patcher_spec(toolchain, patch),
            input: b"",
            output: StepOutput::Capture,
            on_failure: OnFailure::ToolError,
        }],
        artifact,
        filter: ISO_FILTER,
    }
}
