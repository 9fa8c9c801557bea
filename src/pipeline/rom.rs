// src/pipeline/rom.rs

//! ROM mode: patch, optionally inject microcode, then save.

use std::path::Path;

use crate::config::Toolchain;
use crate::request::RomRequest;

use super::{
    patcher_line, patcher_spec, OnFailure, PipelinePlan, PipelineStep, StepOutput,
    INJECT_UCODE_SCRIPT, PATCH_ROM_SCRIPT,
};

pub const ROM_FILTER: &str = "Nintendo 64 ROM (Big Endian) (*.z64)";

pub fn plan(toolchain: &Toolchain, request: &RomRequest, workdir: &Path) -> PipelinePlan {
    let artifact = workdir.join("gz.z64");

    let patch = patcher_line(toolchain, PATCH_ROM_SCRIPT)
        .flag("-s")
        .opt("-o", &artifact)
        .arg(&request.rom);

    let mut steps = vec![PipelineStep {
        name: "patch-rom",
        command: patcher_spec(toolchain, patch),
        input: b"",
        output: StepOutput::Capture,
        on_failure: OnFailure::RomUnrecognized,
    }];

    if let Some(ucode) = &request.microcode {
        // Mutates the working artifact in place.
        let inject = patcher_line(toolchain, INJECT_UCODE_SCRIPT)
            .arg(&artifact)
            .arg(ucode);
        steps.push(PipelineStep {
            name: "inject-ucode",
            command: patcher_spec(toolchain, inject),
            input: b"",
            output: StepOutput::Stream,
            on_failure: OnFailure::ToolError,
        });
    }

    PipelinePlan {
        steps,
        artifact,
        filter: ROM_FILTER,
    }
}
