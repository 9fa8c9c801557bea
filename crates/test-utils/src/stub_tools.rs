//! POSIX shell stand-ins for the patcher and the injector.
//!
//! Stub patcher (`bin/gru <script> [args...] [-o OUT] INPUT`):
//! - exits 9 if the injector environment variable is unset,
//! - exits 3 if INPUT contains the text `UNRECOGNIZED`,
//! - exits 4 if `-k KEY` names a file that does not exist,
//! - otherwise copies INPUT to OUT and prints `gz-<basename of INPUT>`.
//!
//! Stub injector (`bin/gzinject -a genkey -k KEY`): writes its whole stdin to
//! KEY.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use gzpatch::config::{load_and_validate, ConfigFile, Toolchain, DEFAULT_INJECTOR_ENV};
use gzpatch::pipeline::REQUIRED_SCRIPTS;
use tempfile::TempDir;

const STUB_PATCHER: &str = r#"#!/bin/sh
script="$1"
shift
out=""
key=""
input=""
while [ $# -gt 0 ]; do
    case "$1" in
        -o) out="$2"; shift 2 ;;
        -k) key="$2"; shift 2 ;;
        *) input="$1"; shift ;;
    esac
done
echo "running $(basename "$script")" >&2
if [ -z "$__INJECTOR_ENV__" ]; then
    echo "injector not configured" >&2
    exit 9
fi
if [ -n "$key" ] && [ ! -f "$key" ]; then
    echo "missing key $key" >&2
    exit 4
fi
if grep -q UNRECOGNIZED "$input" 2>/dev/null; then
    echo "unknown rom" >&2
    exit 3
fi
if [ -n "$out" ]; then
    cp "$input" "$out" || exit 5
    printf 'gz-%s\n' "$(basename "$input")"
fi
"#;

const STUB_INJECTOR: &str = r#"#!/bin/sh
key=""
while [ $# -gt 0 ]; do
    case "$1" in
        -k) key="$2"; shift 2 ;;
        *) shift ;;
    esac
done
cat > "$key"
echo "generated $(basename "$key")"
"#;

/// A complete fake installation in a temporary directory.
pub struct StubInstall {
    root: TempDir,
}

impl StubInstall {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create stub install dir");
        let base = root.path();

        fs::create_dir_all(base.join("bin")).unwrap();
        fs::create_dir_all(base.join("lua")).unwrap();
        fs::create_dir_all(base.join("ups")).unwrap();
        fs::create_dir_all(base.join("gzi")).unwrap();
        fs::create_dir_all(base.join("tmp")).unwrap();

        write_executable(
            &base.join("bin/gru"),
            &STUB_PATCHER.replace("__INJECTOR_ENV__", DEFAULT_INJECTOR_ENV),
        );
        write_executable(&base.join("bin/gzinject"), STUB_INJECTOR);
        for script in REQUIRED_SCRIPTS {
            fs::write(base.join("lua").join(script), "-- stub\n").unwrap();
        }

        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Parent of the per-run working directories.
    pub fn temp_root(&self) -> PathBuf {
        self.path().join("tmp")
    }

    /// Write a `gzpatch.toml` pointing at the stubs and return its path.
    pub fn write_config(&self) -> PathBuf {
        let base = self.path().display();
        let config = format!(
            r#"
[tools]
patcher = "{base}/bin/gru"
injector = "{base}/bin/gzinject"
script_dir = "{base}/lua"

[run]
temp_root = "{base}/tmp"
data_dirs = ["{base}/ups", "{base}/gzi"]
"#
        );
        let path = self.path().join("gzpatch.toml");
        fs::write(&path, config).unwrap();
        path
    }

    pub fn config(&self) -> ConfigFile {
        load_and_validate(self.write_config()).expect("stub config is valid")
    }

    pub fn toolchain(&self) -> Toolchain {
        self.config().toolchain()
    }

    /// Create an input file with the given content inside the install dir.
    pub fn input(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }
}

impl Default for StubInstall {
    fn default() -> Self {
        Self::new()
    }
}

fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}
