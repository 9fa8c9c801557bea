// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::DefaultsSection;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::request::{IsoRequest, RomRequest, WadRequest};
use crate::types::{ConsoleRegion, ControllerRemap};

/// Command-line arguments for `gzpatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gzpatch",
    version,
    about = "Patch Ocarina of Time ROMs, WADs and ISOs with the gz practice tools.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `gzpatch.toml` in the current working directory if present,
    /// built-in settings otherwise.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GZPATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Patch an N64 ROM.
    Rom(RomArgs),
    /// Patch a Wii Virtual Console WAD.
    Wad(WadArgs),
    /// Patch a GameCube ISO.
    Iso(IsoArgs),
    /// Verify the tools, scripts and data directories are installed.
    Check,
}

/// Where the patched file goes.
#[derive(Debug, Clone, Default, Args)]
pub struct SaveArgs {
    /// Save the result here. An existing directory receives the suggested
    /// file name. Without this you are asked after patching.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Patch, but discard the result.
    #[arg(long, conflicts_with = "output")]
    pub skip_save: bool,

    /// Print the commands that would run, without running them.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RomArgs {
    pub rom: PathBuf,

    /// Inject microcode taken from this ROM.
    #[arg(long, value_name = "ROM")]
    pub ucode: Option<PathBuf>,

    #[command(flatten)]
    pub save: SaveArgs,
}

#[derive(Debug, Clone, Args)]
pub struct WadArgs {
    pub wad: PathBuf,

    /// Merge this ROM into the WAD instead of the embedded one.
    #[arg(long, value_name = "ROM")]
    pub merge_rom: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub remap: Option<ControllerRemap>,

    /// Four-character channel ID.
    #[arg(long, value_name = "ID")]
    pub channel_id: Option<String>,

    #[arg(long, value_name = "TITLE")]
    pub channel_title: Option<String>,

    #[arg(long, value_enum)]
    pub region: Option<ConsoleRegion>,

    #[command(flatten)]
    pub save: SaveArgs,
}

#[derive(Debug, Clone, Args)]
pub struct IsoArgs {
    pub iso: PathBuf,

    #[arg(long, value_name = "ROM")]
    pub merge_rom: Option<PathBuf>,

    /// ROM merged into Master Quest discs; ignored for other discs.
    #[arg(long, value_name = "ROM")]
    pub merge_mq_rom: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub remap: Option<ControllerRemap>,

    /// Six-character game ID.
    #[arg(long, value_name = "ID")]
    pub game_id: Option<String>,

    #[arg(long, value_name = "NAME")]
    pub game_name: Option<String>,

    /// Keep files the patched disc does not need.
    #[arg(long)]
    pub no_trim: bool,

    #[command(flatten)]
    pub save: SaveArgs,
}

impl RomArgs {
    pub fn to_request(&self) -> RomRequest {
        RomRequest {
            rom: self.rom.clone(),
            microcode: self.ucode.clone(),
        }
    }
}

impl WadArgs {
    pub fn to_request(&self, defaults: &DefaultsSection) -> WadRequest {
        WadRequest {
            wad: self.wad.clone(),
            merge_rom: self.merge_rom.clone(),
            remap: self.remap.unwrap_or(defaults.remap),
            channel_id: self.channel_id.clone(),
            channel_title: self.channel_title.clone(),
            region: self.region.unwrap_or(defaults.region),
        }
    }
}

impl IsoArgs {
    /// Reads the disc header to decide whether this is a Master Quest disc.
    pub fn to_request(&self, fs: &dyn FileSystem, defaults: &DefaultsSection) -> Result<IsoRequest> {
        let mut request = IsoRequest::new(fs, &self.iso)?;
        request.merge_rom = self.merge_rom.clone();
        request.merge_mq_rom = self.merge_mq_rom.clone();
        request.remap = self.remap.unwrap_or(defaults.remap);
        request.game_id = self.game_id.clone();
        request.game_name = self.game_name.clone();
        request.trim = defaults.trim && !self.no_trim;
        Ok(request)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn wad_options_fall_back_to_config_defaults() {
        let args = CliArgs::try_parse_from(["gzpatch", "wad", "in.wad", "--channel-id", "GZLE"])
            .unwrap();
        let Command::Wad(wad) = args.command else {
            panic!("expected wad subcommand");
        };

        let defaults = DefaultsSection {
            remap: ControllerRemap::Raphnet,
            region: ConsoleRegion::Us,
            trim: true,
        };
        let request = wad.to_request(&defaults);
        assert_eq!(request.remap, ControllerRemap::Raphnet);
        assert_eq!(request.region, ConsoleRegion::Us);
        assert_eq!(request.channel_id.as_deref(), Some("GZLE"));
    }

    #[test]
    fn explicit_flags_win_over_defaults() {
        let args = CliArgs::try_parse_from([
            "gzpatch", "wad", "in.wad", "--remap", "none", "--region", "jp",
        ])
        .unwrap();
        let Command::Wad(wad) = args.command else {
            panic!("expected wad subcommand");
        };

        let request = wad.to_request(&DefaultsSection::default());
        assert_eq!(request.remap, ControllerRemap::None);
        assert_eq!(request.region, ConsoleRegion::Jp);
    }

    #[test]
    fn iso_request_reads_master_quest_from_header() {
        let fs = MockFileSystem::new();
        fs.add_file("mq.iso", b"D43E01 rest of header".to_vec());

        let args = CliArgs::try_parse_from([
            "gzpatch",
            "iso",
            "mq.iso",
            "--merge-mq-rom",
            "mq.z64",
            "--no-trim",
        ])
        .unwrap();
        let Command::Iso(iso) = args.command else {
            panic!("expected iso subcommand");
        };

        let request = iso.to_request(&fs, &DefaultsSection::default()).unwrap();
        assert!(request.master_quest);
        assert!(!request.trim);
        assert_eq!(
            request.effective_merge_mq_rom(),
            Some(std::path::Path::new("mq.z64"))
        );
    }

    #[test]
    fn output_and_skip_save_conflict() {
        let res = CliArgs::try_parse_from([
            "gzpatch",
            "rom",
            "oot.z64",
            "--output",
            "out.z64",
            "--skip-save",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn global_options_parse_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "gzpatch",
            "check",
            "--config",
            "alt.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert!(matches!(args.command, Command::Check));
        assert_eq!(args.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
