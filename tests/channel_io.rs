// tests/channel_io.rs
#![cfg(unix)]

mod common;

use common::{init_tracing, with_timeout};
use gzpatch::errors::PatchError;
use gzpatch::exec::{CommandLine, CommandSpec, SubprocessChannel, TokioChannel};

async fn run(spec: &CommandSpec, input: &[u8]) -> (i32, Vec<u8>, Vec<u8>) {
    let channel = TokioChannel::new();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = {
        let mut on_out = |c: &[u8]| out.extend_from_slice(c);
        let mut on_err = |c: &[u8]| err.extend_from_slice(c);
        with_timeout(channel.execute(spec, input, &mut on_out, &mut on_err))
            .await
            .unwrap()
    };
    (code, out, err)
}

#[tokio::test]
async fn echoes_stdin_and_reports_both_streams() {
    init_tracing();
    let spec = CommandSpec::new("cat; echo warn >&2; exit 3");

    let (code, out, err) = run(&spec, b"hello\n").await;

    assert_eq!(code, 3);
    assert_eq!(out, b"hello\n");
    assert_eq!(err, b"warn\n");
}

#[tokio::test]
async fn large_output_on_both_streams_does_not_deadlock() {
    init_tracing();
    // ~1 MiB on each stream, far beyond any pipe buffer.
    let spec = CommandSpec::new(
        "head -c 1048576 /dev/zero; head -c 1048576 /dev/zero >&2; cat >/dev/null",
    );
    let input = vec![b'x'; 512 * 1024];

    let (code, out, err) = run(&spec, &input).await;

    assert_eq!(code, 0);
    assert_eq!(out.len(), 1_048_576);
    assert_eq!(err.len(), 1_048_576);
}

#[tokio::test]
async fn child_env_is_scoped_to_the_child() {
    init_tracing();
    let spec = CommandSpec::new("printf '%s' \"$GZPATCH_TEST_VAR\"")
        .with_env("GZPATCH_TEST_VAR", "bin/gzinject");

    let (_, out, _) = run(&spec, b"").await;

    assert_eq!(out, b"bin/gzinject");
    assert!(std::env::var_os("GZPATCH_TEST_VAR").is_none());
}

#[tokio::test]
async fn quoted_arguments_survive_the_shell() {
    init_tracing();
    let line = CommandLine::new("printf")
        .arg("%s|")
        .arg("with space")
        .arg("say \"hi\"")
        .build();

    let (code, out, _) = run(&CommandSpec::new(line), b"").await;

    assert_eq!(code, 0);
    assert_eq!(out, b"with space|say \"hi\"|");
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let spec = CommandLine::new(dir.path().join("no-such-gru"))
        .arg("lua/patch-rom.lua")
        .into_spec();

    let channel = TokioChannel::new();
    let mut called = false;
    let result = {
        let mut on_out = |_: &[u8]| called = true;
        with_timeout(channel.execute(&spec, b"", &mut on_out, &mut |_: &[u8]| {})).await
    };

    match result {
        Err(PatchError::Spawn { command, .. }) => assert_eq!(command, spec.line),
        other => panic!("Expected Spawn error, got: {:?}", other),
    }
    assert!(!called);
}

#[tokio::test]
async fn non_executable_program_is_a_spawn_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let tool = dir.path().join("gru");
    std::fs::write(&tool, "#!/bin/sh\nexit 0\n").unwrap();

    let spec = CommandLine::new(&tool).into_spec();
    let result = with_timeout(TokioChannel::new().execute(
        &spec,
        b"",
        &mut |_: &[u8]| {},
        &mut |_: &[u8]| {},
    ))
    .await;

    assert!(matches!(result, Err(PatchError::Spawn { .. })));
}

#[tokio::test]
async fn bare_program_name_is_found_on_path() {
    init_tracing();
    let spec = CommandLine::new("sh").flag("-c").arg("exit 5").into_spec();

    let (code, _, _) = run(&spec, b"").await;

    assert_eq!(code, 5);
}
