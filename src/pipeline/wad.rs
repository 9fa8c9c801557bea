// src/pipeline/wad.rs

//! WAD mode: generate the common key, patch, then save.

use std::path::Path;

use crate::config::Toolchain;
use crate::exec::CommandLine;
use crate::request::WadRequest;

use super::{
    non_empty, patcher_line, patcher_spec, OnFailure, PipelinePlan, PipelineStep, StepOutput,
    PATCH_WAD_SCRIPT,
};

pub const WAD_FILTER: &str = "Nintendo Wii WAD (*.wad)";

/// Seed the injector reads on stdin when generating the common key.
pub const GENKEY_SEED: &[u8] = b"45e";

pub fn plan(toolchain: &Toolchain, request: &WadRequest, workdir: &Path) -> PipelinePlan {
    let key = workdir.join("common-key.bin");
    let extract = workdir.join("wadextract");
    let artifact = workdir.join("gz.wad");

    let genkey = CommandLine::new(&toolchain.injector)
        .flag("-a")
        .flag("genkey")
        .opt("-k", &key);

    let patch = patcher_line(toolchain, PATCH_WAD_SCRIPT)
        .flag("-s")
        .opt("-k", &key)
        .opt("-d", &extract)
        .flags(request.remap.flag())
        .opt_if("-i", non_empty(&request.channel_id))
        .opt_if("-t", non_empty(&request.channel_title))
        .flag("-r")
        .flag(&request.region.code().to_string())
        .opt_if("-m", request.merge_rom.as_ref())
        .opt("-o", &artifact)
        .arg(&request.wad);

    let steps = vec![
        PipelineStep {
            name: "genkey",
            command: genkey.into_spec(),
            input: GENKEY_SEED,
            output: StepOutput::Stream,
            on_failure: OnFailure::ToolError,
        },
        PipelineStep {
            name: "patch-wad",
            command: patcher_spec(toolchain, patch),
            input: b"",
            output: StepOutput::Capture,
            on_failure: OnFailure::ToolError,
        },
    ];

    PipelinePlan {
        steps,
        artifact,
        filter: WAD_FILTER,
    }
}
