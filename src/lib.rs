// src/lib.rs

pub mod bridge;
pub mod cli;
pub mod config;
pub mod consumer;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod install;
pub mod logging;
pub mod pipeline;
pub mod request;
pub mod types;
pub mod worker;

use std::path::Path;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::cli::{CliArgs, Command, SaveArgs};
use crate::config::{load_or_builtin, Toolchain};
use crate::consumer::{Consumer, DestinationPolicy};
use crate::exec::TokioChannel;
use crate::fs::{FileSystem, RealFileSystem};
use crate::install::{verify_installation, InstallReport, MISSING_FILES_MESSAGE};
use crate::pipeline::PipelinePlan;
use crate::request::PatchRequest;
use crate::worker::WorkerTask;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading and the installation check
/// - request construction and validation
/// - the worker running the pipeline
/// - the terminal consumer servicing the sink bridge
/// - Ctrl-C handling (a run cannot be interrupted)
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_builtin(args.config.as_deref())?;
    let fs = RealFileSystem;
    let install = verify_installation(&fs, &cfg);

    let (request, save) = match &args.command {
        Command::Check => return Ok(print_install_report(&install)),
        Command::Rom(a) => (PatchRequest::from(a.to_request()), a.save.clone()),
        Command::Wad(a) => (PatchRequest::from(a.to_request(&cfg.defaults)), a.save.clone()),
        Command::Iso(a) => {
            require_input(&fs, &a.iso)?;
            (PatchRequest::from(a.to_request(&fs, &cfg.defaults)?), a.save.clone())
        }
    };

    if !install.is_complete() {
        for item in &install.missing {
            warn!(%item, "missing from installation");
        }
        eprintln!("{MISSING_FILES_MESSAGE}");
    }

    request.validate(&fs)?;

    let toolchain = cfg.toolchain();
    if save.dry_run {
        print_dry_run(&toolchain, &request);
        return Ok(0);
    }

    patch(request, toolchain, &save).await
}

async fn patch(request: PatchRequest, toolchain: Toolchain, save: &SaveArgs) -> Result<i32> {
    let policy = match (&save.output, save.skip_save) {
        (Some(path), _) => DestinationPolicy::Fixed(path.clone()),
        (None, true) => DestinationPolicy::Skip,
        (None, false) => DestinationPolicy::Prompt,
    };

    let (sink, mut events) = bridge::channel();
    let mut worker = WorkerTask::spawn(request, toolchain, TokioChannel::new(), sink);

    // Ctrl-C only gets a notice; the run always finishes.
    let interrupt_notice = tokio::spawn(async {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            eprintln!("Patching is still in progress; please wait for it to finish.");
        }
    });

    let mut consumer = Consumer::new(std::io::stdout(), policy);
    let report = consumer.drive(&mut events, &mut worker).await;
    interrupt_notice.abort();

    if report.status.is_failure() {
        error!(status = ?report.status, "patching failed");
    } else {
        info!(status = ?report.status, "patching finished");
    }
    if let Some(message) = report.status.user_message() {
        eprintln!("{message}");
    }

    Ok(report.exit_code())
}

fn require_input(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    if !fs.exists(path) {
        anyhow::bail!("input {} does not exist", path.display());
    }
    Ok(())
}

fn print_install_report(report: &InstallReport) -> i32 {
    if report.is_complete() {
        println!("installation complete");
        return 0;
    }
    println!("missing ({}):", report.missing.len());
    for item in &report.missing {
        println!("  - {item}");
    }
    println!();
    println!("{MISSING_FILES_MESSAGE}");
    1
}

/// Print the steps a run would execute. No process is started and no
/// working directory is created.
fn print_dry_run(toolchain: &Toolchain, request: &PatchRequest) {
    let plan = PipelinePlan::for_request(toolchain, request, Path::new("<workdir>"));
    println!("gzpatch dry-run ({} mode)", request.mode());
    for step in &plan.steps {
        println!("  - {}", step.name);
        println!("      cmd: {}", step.command.line);
        for (key, value) in &step.command.env {
            println!("      env: {key}={}", value.to_string_lossy());
        }
        if !step.input.is_empty() {
            println!("      stdin: {:?}", String::from_utf8_lossy(step.input));
        }
    }
    println!("  artifact: {}", plan.artifact.display());
    println!("  filter: {}", plan.filter);
}

