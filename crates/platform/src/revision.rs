//! Board identification and peripheral addressing
//!
//! The SoC family is the 4-bit processor field of the revision code in
//! `/proc/cpuinfo`:
//!
//! ```text
//!   Revision        : c03114
//!   family = (0xc03114 >> 12) & 0xF = 3   (BCM2711, Raspberry Pi 4)
//! ```
//!
//! Each supported family fixes the peripheral base address and the PLLD
//! output frequency the dividers are computed against.

use std::fmt;
use std::path::{Path, PathBuf};

/// Case-insensitive prefix of the revision line.
const REVISION_PREFIX: &str = "revision\t:";

/// Failure to identify a supported board.
#[derive(Debug, thiserror::Error)]
pub enum RevisionError {
    /// The family code is not one this tool knows how to address.
    #[error("unsupported hardware revision code ({code:#x})")]
    Unsupported {
        /// Extracted 4-bit family code.
        code: u8,
    },
    /// No well-formed revision line was found.
    #[error("no hardware revision found in {}", .path.display())]
    NotFound {
        /// File that was scanned.
        path: PathBuf,
    },
    /// The identification file could not be read.
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Supported SoC families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardFamily {
    /// BCM2836 (family code 1).
    Pi2,
    /// BCM2837 (family code 2).
    Pi3,
    /// BCM2711 (family code 3).
    Pi4,
}

/// Where the peripherals live and what clock feeds the dividers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeripheralLayout {
    /// Family this layout was resolved for.
    pub family: BoardFamily,
    /// Physical address of the peripheral window.
    pub peripheral_base: u32,
    /// PLLD output in kHz.
    pub pll_source_khz: u32,
}

impl BoardFamily {
    /// Family for a 4-bit processor code, if supported.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Pi2),
            2 => Some(Self::Pi3),
            3 => Some(Self::Pi4),
            _ => None,
        }
    }

    /// The processor code this family is identified by.
    pub const fn code(self) -> u8 {
        match self {
            Self::Pi2 => 1,
            Self::Pi3 => 2,
            Self::Pi4 => 3,
        }
    }

    /// Peripheral base and PLLD frequency. Pi 2 and Pi 3 share addressing.
    pub const fn layout(self) -> PeripheralLayout {
        let (peripheral_base, pll_source_khz) = match self {
            Self::Pi2 | Self::Pi3 => (0x3F00_0000, 500_000),
            Self::Pi4 => (0xFE00_0000, 750_000),
        };
        PeripheralLayout {
            family: self,
            peripheral_base,
            pll_source_khz,
        }
    }
}

impl fmt::Display for BoardFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pi2 | Self::Pi3 => "Raspberry Pi 2/3",
            Self::Pi4 => "Raspberry Pi 4",
        })
    }
}

/// Resolve a family code to its layout.
pub fn resolve(code: u8) -> Result<PeripheralLayout, RevisionError> {
    BoardFamily::from_code(code)
        .map(BoardFamily::layout)
        .ok_or(RevisionError::Unsupported { code })
}

/// Processor field of a raw revision code.
#[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)] // masked to 4 bits
pub const fn family_code(raw: u32) -> u8 {
    ((raw >> 12) & 0xF) as u8
}

/// Raw revision code from cpuinfo text.
///
/// A line counts when it starts with `revision\t:` (any case) and carries a
/// hex value ending the line. Later lines win; anything else is skipped.
pub fn parse_cpuinfo(text: &str) -> Option<u32> {
    text.split_inclusive('\n')
        .filter_map(parse_revision_line)
        .last()
}

fn parse_revision_line(line: &str) -> Option<u32> {
    let prefix = line.get(..REVISION_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(REVISION_PREFIX) {
        return None;
    }
    let value = line.get(REVISION_PREFIX.len()..)?.strip_suffix('\n')?;
    let value = value.trim_start();
    let value = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(value, 16).ok()
}

/// Read `path` and return the raw revision code.
pub fn read_revision(path: impl AsRef<Path>) -> Result<u32, RevisionError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| RevisionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_cpuinfo(&text).ok_or_else(|| RevisionError::NotFound {
        path: path.to_path_buf(),
    })
}

/// Identify the board from a cpuinfo file.
pub fn detect(path: impl AsRef<Path>) -> Result<PeripheralLayout, RevisionError> {
    let raw = read_revision(path)?;
    let code = family_code(raw);
    tracing::debug!(raw = format_args!("{raw:#x}"), code, "hardware revision");
    resolve(code)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PI4_CPUINFO: &str = "processor\t: 0\n\
        BogoMIPS\t: 108.00\n\
        Hardware\t: BCM2835\n\
        Revision\t: c03114\n\
        Serial\t\t: 10000000abcdef01\n\
        Model\t\t: Raspberry Pi 4 Model B Rev 1.4\n";

    #[test]
    fn pi4_revision_is_found() {
        assert_eq!(parse_cpuinfo(PI4_CPUINFO), Some(0x00c0_3114));
        assert_eq!(family_code(0x00c0_3114), 3);
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        assert_eq!(parse_cpuinfo("REVISION\t: a02082\n"), Some(0x00a0_2082));
        assert_eq!(parse_cpuinfo("revision\t: a02082\n"), Some(0x00a0_2082));
    }

    #[test]
    fn last_revision_line_wins() {
        let text = "Revision\t: a21041\nRevision\t: c03114\n";
        assert_eq!(parse_cpuinfo(text), Some(0x00c0_3114));
    }

    #[test]
    fn malformed_lines_are_ignored() {
        // spaces instead of tab, missing value, trailing junk, no newline
        let text = "Revision    : c03114\n\
            Revision\t:\n\
            Revision\t: c03114 junk\n\
            Revision\t: a02082\n\
            Revision\t: c03111";
        assert_eq!(parse_cpuinfo(text), Some(0x00a0_2082));
    }

    #[test]
    fn no_revision_line() {
        assert_eq!(parse_cpuinfo("processor\t: 0\n"), None);
        assert_eq!(parse_cpuinfo(""), None);
    }

    #[test]
    fn family_layouts() {
        assert_eq!(resolve(1).unwrap().peripheral_base, 0x3F00_0000);
        assert_eq!(resolve(2).unwrap().pll_source_khz, 500_000);
        let pi4 = resolve(3).unwrap();
        assert_eq!(pi4.peripheral_base, 0xFE00_0000);
        assert_eq!(pi4.pll_source_khz, 750_000);
        assert_eq!(pi4.family, BoardFamily::Pi4);
    }

    #[test]
    fn unknown_codes_are_rejected() {
        for code in [0u8, 4, 5, 0xF] {
            assert!(matches!(
                resolve(code),
                Err(RevisionError::Unsupported { code: c }) if c == code
            ));
        }
        assert_eq!(
            RevisionError::Unsupported { code: 0 }.to_string(),
            "unsupported hardware revision code (0x0)"
        );
    }

    #[test]
    fn code_round_trips_for_supported_families() {
        for family in [BoardFamily::Pi2, BoardFamily::Pi3, BoardFamily::Pi4] {
            assert_eq!(BoardFamily::from_code(family.code()), Some(family));
        }
    }

    #[test]
    fn family_labels() {
        assert_eq!(BoardFamily::Pi3.to_string(), "Raspberry Pi 2/3");
        assert_eq!(BoardFamily::Pi4.to_string(), "Raspberry Pi 4");
    }

    #[test]
    fn detect_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpuinfo");
        std::fs::write(&path, PI4_CPUINFO).unwrap();
        assert_eq!(detect(&path).unwrap(), BoardFamily::Pi4.layout());
    }

    #[test]
    fn detect_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = detect(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, RevisionError::Io { .. }));
    }

    #[test]
    fn detect_without_revision_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpuinfo");
        std::fs::write(&path, "processor\t: 0\n").unwrap();
        assert!(matches!(detect(&path), Err(RevisionError::NotFound { .. })));
    }
}
