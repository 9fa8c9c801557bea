// src/pipeline/mod.rs

//! Patch pipelines.
//!
//! Every mode runs the same phases:
//!
//! `Patch (one or more steps) -> RequestDestination -> Publish -> Done`
//!
//! - [`rom`], [`wad`] and [`iso`] turn a request into a [`PipelinePlan`]:
//!   the ordered steps, the working artifact and the file filter.
//! - [`executor`] walks a plan step by step through a
//!   [`SubprocessChannel`](crate::exec::SubprocessChannel), asks the sink for
//!   a destination and publishes the artifact.
//! - [`publish`] moves the artifact into place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Toolchain;
use crate::errors::PatchError;
use crate::exec::{CommandLine, CommandSpec};
use crate::request::PatchRequest;

pub mod executor;
pub mod iso;
pub mod publish;
pub mod rom;
pub mod wad;

pub use executor::PipelineExecutor;
pub use publish::publish;

pub const PATCH_ROM_SCRIPT: &str = "patch-rom.lua";
pub const INJECT_UCODE_SCRIPT: &str = "inject_ucode.lua";
pub const PATCH_WAD_SCRIPT: &str = "patch-wad.lua";
pub const PATCH_ISO_SCRIPT: &str = "patch-iso.lua";
pub const ROM_TABLE_SCRIPT: &str = "rom_table.lua";

/// Every script the patcher may load during a run.
pub const REQUIRED_SCRIPTS: [&str; 5] = [
    PATCH_ROM_SCRIPT,
    PATCH_WAD_SCRIPT,
    PATCH_ISO_SCRIPT,
    ROM_TABLE_SCRIPT,
    INJECT_UCODE_SCRIPT,
];

/// Caption of the destination request.
pub const SAVE_PROMPT: &str = "Save as...";

/// How a step's stdout is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutput {
    /// Collected; the text becomes the suggested artifact name.
    Capture,
    /// Forwarded to the log as it arrives.
    Stream,
}

/// How a non-zero exit of a step is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    ToolError,
    /// The patcher gives no other signal that it did not recognize its input.
    RomUnrecognized,
}

/// One tool invocation in a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStep {
    pub name: &'static str,
    pub command: CommandSpec,
    /// Bytes written to the child's stdin.
    pub input: &'static [u8],
    pub output: StepOutput,
    pub on_failure: OnFailure,
}

impl PipelineStep {
    /// The fault for a non-zero exit of this step.
    pub fn failure(&self, code: i32) -> PatchError {
        match self.on_failure {
            OnFailure::ToolError => PatchError::ToolExit {
                step: self.name,
                code,
            },
            OnFailure::RomUnrecognized => PatchError::RomUnrecognized { code },
        }
    }
}

/// Result of running one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    /// Collected stdout for `Capture` steps.
    pub captured: Option<String>,
}

/// Everything the executor needs to run one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePlan {
    pub steps: Vec<PipelineStep>,
    /// Working artifact inside the run's directory.
    pub artifact: PathBuf,
    /// File-type filter for the destination request.
    pub filter: &'static str,
}

impl PipelinePlan {
    pub fn for_request(toolchain: &Toolchain, request: &PatchRequest, workdir: &Path) -> Self {
        match request {
            PatchRequest::Rom(r) => rom::plan(toolchain, r, workdir),
            PatchRequest::Wad(w) => wad::plan(toolchain, w, workdir),
            PatchRequest::Iso(i) => iso::plan(toolchain, i, workdir),
        }
    }

    /// Name offered when the patcher printed nothing usable.
    pub fn fallback_name(&self) -> String {
        self.artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Start a patcher command line: `<patcher> <script>`.
pub(crate) fn patcher_line(toolchain: &Toolchain, script: &str) -> CommandLine {
    CommandLine::new(&toolchain.patcher).arg(toolchain.script(script))
}

/// Wrap a patcher line with the environment telling it where the injector is.
pub(crate) fn patcher_spec(toolchain: &Toolchain, line: CommandLine) -> CommandSpec {
    line.into_spec().with_env(&toolchain.injector_env, &toolchain.injector)
}

/// `Some` only for non-empty text.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Terminal result of a run that did not fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The artifact was published here.
    Success { destination: PathBuf },
    /// The destination request was answered empty; nothing was written.
    SkippedByUser,
}

/// What a worker's join yields: the outcome, or the fault that ended the run.
pub type RunResult = std::result::Result<PatchOutcome, Arc<PatchError>>;

/// Consumer-facing classification of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStatus {
    Success,
    RomUnrecognized,
    ToolError,
    PublishError,
    SkippedByUser,
}

const MSG_ROM_UNRECOGNIZED: &str =
    "Your ROM wasn't recognized. Try a different input rom and/or microcode rom.";
const MSG_GENERIC_FAILURE: &str = "Something went wrong! Refer to the output log for details.";

impl PatchStatus {
    pub fn of(result: &RunResult) -> Self {
        match result {
            Ok(PatchOutcome::Success { .. }) => PatchStatus::Success,
            Ok(PatchOutcome::SkippedByUser) => PatchStatus::SkippedByUser,
            Err(err) => PatchStatus::from_error(err),
        }
    }

    pub fn from_error(err: &PatchError) -> Self {
        match err {
            PatchError::RomUnrecognized { .. } => PatchStatus::RomUnrecognized,
            PatchError::Publish { .. } => PatchStatus::PublishError,
            _ => PatchStatus::ToolError,
        }
    }

    pub fn is_failure(self) -> bool {
        !matches!(self, PatchStatus::Success | PatchStatus::SkippedByUser)
    }

    /// Message to show the user, if the run needs one.
    pub fn user_message(self) -> Option<&'static str> {
        match self {
            PatchStatus::Success | PatchStatus::SkippedByUser => None,
            PatchStatus::RomUnrecognized => Some(MSG_ROM_UNRECOGNIZED),
            PatchStatus::ToolError | PatchStatus::PublishError => Some(MSG_GENERIC_FAILURE),
        }
    }
}
