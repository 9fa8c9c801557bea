// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;

use gzpatch::config::{load_and_validate, load_or_builtin};
use gzpatch::errors::PatchError;
use gzpatch::types::{ConsoleRegion, ControllerRemap};
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_loaded() {
    let file = config_file(
        r#"
[tools]
patcher = "/opt/gz/gru"
injector = "/opt/gz/gzinject"
script_dir = "/opt/gz/lua"
injector_env = "GZINJECT_PATH"

[run]
temp_root = "/var/tmp"
data_dirs = ["/opt/gz/ups"]

[defaults]
remap = "none"
region = "jp"
trim = false
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    let tc = cfg.toolchain();

    assert_eq!(tc.patcher, PathBuf::from("/opt/gz/gru"));
    assert_eq!(tc.script("patch-rom.lua"), PathBuf::from("/opt/gz/lua/patch-rom.lua"));
    assert_eq!(tc.injector_env, "GZINJECT_PATH");
    assert_eq!(tc.temp_root, Some(PathBuf::from("/var/tmp")));
    assert_eq!(cfg.run.data_dirs, vec![PathBuf::from("/opt/gz/ups")]);
    assert_eq!(cfg.defaults.remap, ControllerRemap::None);
    assert_eq!(cfg.defaults.region, ConsoleRegion::Jp);
    assert!(!cfg.defaults.trim);
}

#[test]
fn empty_file_uses_builtin_values() {
    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.toolchain(), gzpatch::config::Toolchain::default());
    assert!(cfg.defaults.trim);
    assert_eq!(cfg.defaults.region, ConsoleRegion::Free);
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = config_file("[tools\npatcher = ");
    match load_and_validate(file.path()) {
        Err(PatchError::TomlError(_)) => {}
        other => panic!("Expected TomlError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn unknown_remap_value_is_rejected() {
    let file = config_file("[defaults]\nremap = \"sideways\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(PatchError::TomlError(_))
    ));
}

#[test]
fn bad_injector_env_is_a_config_error() {
    let file = config_file("[tools]\ninjector_env = \"A=B\"\n");
    match load_and_validate(file.path()) {
        Err(PatchError::ConfigError(msg)) => assert!(msg.contains("injector_env")),
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn explicit_missing_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        load_or_builtin(Some(missing.as_path())),
        Err(PatchError::Io(_))
    ));
}
