// src/exec/quote.rs

//! Command-line composition.
//!
//! Steps are run through the platform shell, so every argument that carries
//! a path or free text is wrapped in double quotes. Only embedded double
//! quotes are escaped (with a backslash); nothing else is touched.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::exec::CommandSpec;

/// Quote a single argument: `abc` becomes `"abc"`, `a"b` becomes `"a\"b"`.
pub fn quote(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if c == '"' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Builder for a single shell command line.
///
/// ```
/// use gzpatch::exec::CommandLine;
///
/// let line = CommandLine::new("bin/gru")
///     .arg("lua/patch-rom.lua")
///     .flag("-s")
///     .opt("-o", "out dir/gz.z64")
///     .build();
/// assert_eq!(line, r#""bin/gru" "lua/patch-rom.lua" -s -o "out dir/gz.z64""#);
/// ```
#[derive(Debug, Clone)]
pub struct CommandLine {
    program: PathBuf,
    line: String,
}

impl CommandLine {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: PathBuf::from(program.as_ref()),
            line: quote_os(program.as_ref()),
        }
    }

    /// Append a quoted argument.
    pub fn arg(mut self, value: impl AsRef<OsStr>) -> Self {
        self.line.push(' ');
        self.line.push_str(&quote_os(value.as_ref()));
        self
    }

    /// Append a bare flag such as `-s`.
    pub fn flag(mut self, flag: &str) -> Self {
        self.line.push(' ');
        self.line.push_str(flag);
        self
    }

    /// Append a flag followed by its quoted value.
    pub fn opt(self, flag: &str, value: impl AsRef<OsStr>) -> Self {
        self.flag(flag).arg(value)
    }

    /// Like [`CommandLine::opt`], but only when a value is present.
    pub fn opt_if<V: AsRef<OsStr>>(self, flag: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.opt(flag, v),
            None => self,
        }
    }

    /// Append zero or more bare flags.
    pub fn flags<'f>(self, flags: impl IntoIterator<Item = &'f str>) -> Self {
        flags.into_iter().fold(self, |line, f| line.flag(f))
    }

    /// Append a bare flag only when `enabled`.
    pub fn flag_if(self, flag: &str, enabled: bool) -> Self {
        if enabled { self.flag(flag) } else { self }
    }

    pub fn build(self) -> String {
        self.line
    }

    /// Finish into a spec that also names the program, so the channel can
    /// check it before spawning.
    pub fn into_spec(self) -> CommandSpec {
        CommandSpec::new(self.line).with_program(self.program)
    }
}

fn quote_os(value: &OsStr) -> String {
    match value.to_str() {
        Some(text) => quote(text),
        None => {
            let lossy = Path::new(value).to_string_lossy();
            warn!(arg = %lossy, "argument is not valid UTF-8; passing a lossy copy");
            quote(&lossy)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_wraps_plain_text() {
        assert_eq!(quote("abc"), "\"abc\"");
    }

    #[test]
    fn quote_escapes_embedded_double_quote() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }

    #[test]
    fn quote_leaves_other_specials_alone() {
        assert_eq!(quote("$HOME\\x 'y'"), "\"$HOME\\x 'y'\"");
    }

    #[test]
    fn optional_parts_are_skipped_when_absent() {
        let line = CommandLine::new("tool")
            .opt_if("-i", None::<&str>)
            .opt_if("-t", Some("My Title"))
            .flag_if("--no-trim", false)
            .build();
        assert_eq!(line, "\"tool\" -t \"My Title\"");
    }

    #[test]
    fn finished_command_keeps_unquoted_program() {
        let spec = CommandLine::new("bin/gru").arg("lua/patch-rom.lua").into_spec();
        assert_eq!(spec.line, "\"bin/gru\" \"lua/patch-rom.lua\"");
        assert_eq!(spec.program, Some(PathBuf::from("bin/gru")));
    }
}
