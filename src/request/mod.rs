// src/request/mod.rs

//! Immutable description of one patch run.
//!
//! A `PatchRequest` is built by the consumer before a run starts and is moved
//! into the worker, which only ever reads it. Mutable form state stays on the
//! consumer side.

mod master_quest;
mod validate;

use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::{ConsoleRegion, ControllerRemap, PatchMode};

pub use master_quest::{detect_master_quest, MASTER_QUEST_IDS};

/// Snapshot of everything a run needs, one variant per patch mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchRequest {
    Rom(RomRequest),
    Wad(WadRequest),
    Iso(IsoRequest),
}

impl PatchRequest {
    pub fn mode(&self) -> PatchMode {
        match self {
            PatchRequest::Rom(_) => PatchMode::Rom,
            PatchRequest::Wad(_) => PatchMode::Wad,
            PatchRequest::Iso(_) => PatchMode::Iso,
        }
    }

    /// Primary input file.
    pub fn input(&self) -> &Path {
        match self {
            PatchRequest::Rom(r) => &r.rom,
            PatchRequest::Wad(w) => &w.wad,
            PatchRequest::Iso(i) => &i.iso,
        }
    }
}

impl From<RomRequest> for PatchRequest {
    fn from(r: RomRequest) -> Self {
        PatchRequest::Rom(r)
    }
}

impl From<WadRequest> for PatchRequest {
    fn from(w: WadRequest) -> Self {
        PatchRequest::Wad(w)
    }
}

impl From<IsoRequest> for PatchRequest {
    fn from(i: IsoRequest) -> Self {
        PatchRequest::Iso(i)
    }
}

/// Patch an N64 ROM, optionally injecting microcode from a second ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomRequest {
    pub rom: PathBuf,
    pub microcode: Option<PathBuf>,
}

impl RomRequest {
    pub fn new(rom: impl Into<PathBuf>) -> Self {
        Self {
            rom: rom.into(),
            microcode: None,
        }
    }

    pub fn with_microcode(mut self, rom: impl Into<PathBuf>) -> Self {
        self.microcode = Some(rom.into());
        self
    }
}

/// Patch a Wii VC WAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadRequest {
    pub wad: PathBuf,
    /// External ROM merged into the WAD instead of the embedded one.
    pub merge_rom: Option<PathBuf>,
    pub remap: ControllerRemap,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub region: ConsoleRegion,
}

impl WadRequest {
    pub fn new(wad: impl Into<PathBuf>) -> Self {
        Self {
            wad: wad.into(),
            merge_rom: None,
            remap: ControllerRemap::default(),
            channel_id: None,
            channel_title: None,
            region: ConsoleRegion::default(),
        }
    }
}

/// Patch a GameCube ISO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoRequest {
    pub iso: PathBuf,
    /// Derived from the disc header, see [`detect_master_quest`].
    pub master_quest: bool,
    pub merge_rom: Option<PathBuf>,
    /// Only used when `master_quest` is set.
    pub merge_mq_rom: Option<PathBuf>,
    pub remap: ControllerRemap,
    pub game_id: Option<String>,
    pub game_name: Option<String>,
    pub trim: bool,
}

impl IsoRequest {
    /// Build a request for `iso`, reading its header to derive `master_quest`.
    pub fn new(fs: &dyn FileSystem, iso: impl Into<PathBuf>) -> Result<Self> {
        let iso = iso.into();
        let master_quest = detect_master_quest(fs, &iso)?;
        Ok(Self::with_master_quest(iso, master_quest))
    }

    /// Build a request with an already known Master Quest flag.
    pub fn with_master_quest(iso: impl Into<PathBuf>, master_quest: bool) -> Self {
        Self {
            iso: iso.into(),
            master_quest,
            merge_rom: None,
            merge_mq_rom: None,
            remap: ControllerRemap::default(),
            game_id: None,
            game_name: None,
            trim: true,
        }
    }

    /// MQ merge ROM as seen by the pipeline.
    pub fn effective_merge_mq_rom(&self) -> Option<&Path> {
        if self.master_quest {
            self.merge_mq_rom.as_deref()
        } else {
            None
        }
    }
}
