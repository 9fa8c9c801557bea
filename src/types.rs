// src/types.rs

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

/// Which kind of input the pipeline patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchMode {
    /// Nintendo 64 ROM.
    Rom,
    /// Wii Virtual Console WAD.
    Wad,
    /// GameCube disc image.
    Iso,
}

impl fmt::Display for PatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatchMode::Rom => "rom",
            PatchMode::Wad => "wad",
            PatchMode::Iso => "iso",
        };
        f.write_str(s)
    }
}

/// Controller remapping applied by the WAD and ISO patch scripts.
///
/// - `Default`: keep the script's built-in remappings.
/// - `Raphnet`: remappings for raphnet adapters.
/// - `None`: disable controller remappings entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ControllerRemap {
    #[default]
    Default,
    Raphnet,
    None,
}

impl ControllerRemap {
    /// Extra patcher flag for this remap choice, if any.
    pub fn flag(self) -> Option<&'static str> {
        match self {
            ControllerRemap::Default => None,
            ControllerRemap::Raphnet => Some("--raphnet"),
            ControllerRemap::None => Some("--disable-controller-remappings"),
        }
    }
}

/// Console region written into a patched WAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleRegion {
    Jp,
    Us,
    Eu,
    #[default]
    Free,
}

impl ConsoleRegion {
    /// Numeric code the patch script expects after `-r`.
    pub fn code(self) -> u8 {
        match self {
            ConsoleRegion::Jp => 0,
            ConsoleRegion::Us => 1,
            ConsoleRegion::Eu => 2,
            ConsoleRegion::Free => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_codes_follow_script_numbering() {
        assert_eq!(ConsoleRegion::Jp.code(), 0);
        assert_eq!(ConsoleRegion::Us.code(), 1);
        assert_eq!(ConsoleRegion::Eu.code(), 2);
        assert_eq!(ConsoleRegion::Free.code(), 3);
    }

    #[test]
    fn default_remap_adds_no_flag() {
        assert_eq!(ControllerRemap::Default.flag(), None);
        assert_eq!(ControllerRemap::Raphnet.flag(), Some("--raphnet"));
    }
}
