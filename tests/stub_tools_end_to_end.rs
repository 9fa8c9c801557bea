// tests/stub_tools_end_to_end.rs
#![cfg(unix)]

mod common;

use common::{init_tracing, with_timeout};
use gzpatch::bridge;
use gzpatch::errors::PatchError;
use gzpatch::consumer::{Consumer, DestinationPolicy};
use gzpatch::exec::TokioChannel;
use gzpatch::fs::RealFileSystem;
use gzpatch::install::verify_installation;
use gzpatch::pipeline::{PatchOutcome, PatchStatus};
use gzpatch::request::{PatchRequest, RomRequest, WadRequest};
use gzpatch::worker::WorkerTask;
use gzpatch_test_utils::builders::entries_in;
use gzpatch_test_utils::stub_tools::StubInstall;

async fn run_with_consumer(
    install: &StubInstall,
    request: PatchRequest,
    policy: DestinationPolicy,
) -> (gzpatch::consumer::RunReport, String) {
    run_with_toolchain(install.toolchain(), request, policy).await
}

async fn run_with_toolchain(
    toolchain: gzpatch::config::Toolchain,
    request: PatchRequest,
    policy: DestinationPolicy,
) -> (gzpatch::consumer::RunReport, String) {
    let (sink, mut events) = bridge::channel();
    let mut worker = WorkerTask::spawn(request, toolchain, TokioChannel::new(), sink);

    let mut consumer = Consumer::new(Vec::new(), policy);
    let report = with_timeout(consumer.drive(&mut events, &mut worker)).await;
    let log = String::from_utf8(consumer.into_log()).unwrap();
    (report, log)
}

#[tokio::test]
async fn stub_install_passes_the_installation_check() {
    init_tracing();
    let install = StubInstall::new();
    let report = verify_installation(&RealFileSystem, &install.config());
    assert!(report.is_complete(), "missing: {:?}", report.missing);
}

#[tokio::test]
async fn wad_end_to_end_publishes_and_logs_both_steps() {
    init_tracing();
    let install = StubInstall::new();
    let wad = install.input("oot.wad", b"wad contents");
    let destination = install.path().join("out.wad");

    let (report, log) = run_with_consumer(
        &install,
        WadRequest::new(&wad).into(),
        DestinationPolicy::Fixed(destination.clone()),
    )
    .await;

    assert_eq!(report.status, PatchStatus::Success);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        report.result.unwrap(),
        PatchOutcome::Success {
            destination: destination.clone()
        }
    );
    assert_eq!(std::fs::read(&destination).unwrap(), b"wad contents");

    let executing: Vec<_> = log.lines().filter(|l| l.starts_with("executing: ")).collect();
    assert_eq!(executing.len(), 2, "log was:\n{log}");
    assert!(log.contains("generated common-key.bin"));
    assert!(log.contains("running patch-wad.lua"));
    assert_eq!(entries_in(install.temp_root()), 0);
}

#[tokio::test]
async fn fixed_directory_destination_uses_suggested_name() {
    init_tracing();
    let install = StubInstall::new();
    let rom = install.input("oot.z64", b"rom");
    let out_dir = install.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();

    let (report, _) = run_with_consumer(
        &install,
        RomRequest::new(&rom).into(),
        DestinationPolicy::Fixed(out_dir.clone()),
    )
    .await;

    assert_eq!(report.status, PatchStatus::Success);
    assert!(out_dir.join("gz-oot.z64").is_file());
}

#[tokio::test]
async fn unrecognized_rom_exits_with_code_two() {
    init_tracing();
    let install = StubInstall::new();
    let rom = install.input("bad.z64", b"UNRECOGNIZED");

    let (report, log) = run_with_consumer(
        &install,
        RomRequest::new(&rom).into(),
        DestinationPolicy::Fixed(install.path().join("never.z64")),
    )
    .await;

    assert_eq!(report.status, PatchStatus::RomUnrecognized);
    assert_eq!(report.exit_code(), 2);
    assert!(log.contains("unknown rom"));
    assert!(log.contains("error: input was not recognized"));
    assert!(!install.path().join("never.z64").exists());
    assert_eq!(entries_in(install.temp_root()), 0);
}

#[tokio::test]
async fn skip_policy_discards_the_result() {
    init_tracing();
    let install = StubInstall::new();
    let rom = install.input("oot.z64", b"rom");

    let (report, log) =
        run_with_consumer(&install, RomRequest::new(&rom).into(), DestinationPolicy::Skip).await;

    assert_eq!(report.status, PatchStatus::SkippedByUser);
    assert_eq!(report.exit_code(), 0);
    assert!(!log.contains("saving:"));
    assert_eq!(entries_in(install.temp_root()), 0);
}

#[tokio::test]
async fn missing_patcher_is_a_tool_error_not_an_unrecognized_rom() {
    init_tracing();
    let install = StubInstall::new();
    let rom = install.input("oot.z64", b"rom");
    let mut toolchain = install.toolchain();
    toolchain.patcher = install.path().join("bin/no-such-gru");

    let (report, log) = run_with_toolchain(
        toolchain,
        RomRequest::new(&rom).into(),
        DestinationPolicy::Fixed(install.path().join("never.z64")),
    )
    .await;

    assert!(matches!(
        report.result.as_ref().map_err(|e| &**e),
        Err(PatchError::Spawn { .. })
    ));
    assert_eq!(report.status, PatchStatus::ToolError);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(
        report.status.user_message(),
        Some("Something went wrong! Refer to the output log for details.")
    );
    assert!(log.contains("error: failed to launch"));
    assert!(!install.path().join("never.z64").exists());
    assert_eq!(entries_in(install.temp_root()), 0);
}

#[tokio::test]
async fn non_executable_injector_fails_wad_before_patching() {
    init_tracing();
    let install = StubInstall::new();
    let wad = install.input("oot.wad", b"wad");
    let injector = install.input("plain-gzinject", b"#!/bin/sh\n");
    let mut toolchain = install.toolchain();
    toolchain.injector = injector;

    let (report, log) = run_with_toolchain(
        toolchain,
        WadRequest::new(&wad).into(),
        DestinationPolicy::Skip,
    )
    .await;

    assert_eq!(report.status, PatchStatus::ToolError);
    assert_eq!(log.matches("executing: ").count(), 1);
    assert!(!log.contains("running patch-wad.lua"));
}
