//! Physical register windows mapped from `/dev/mem`.
//!
//! The clock manager and the GPIO controller sit at fixed offsets from the
//! SoC's peripheral base:
//!
//! | Block         | Offset     | Length |
//! |---------------|------------|--------|
//! | Clock manager | `0x101000` | `0xA8` |
//! | GPIO          | `0x200000` | `0xB4` |
//!
//! Both offsets are page aligned, so each block is mapped directly.
//! [`PeripheralMap::map`] maps both or returns an error; there is no
//! half-mapped state. The mapping lives until the handle is dropped.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use memmap2::{MmapOptions, MmapRaw};

use crate::registers::{RegisterBlock, RegisterError};

/// Clock-manager block offset from the peripheral base.
pub const CLOCK_BLOCK_OFFSET: u32 = 0x0010_1000;
/// Clock-manager block length in bytes (through CM_PWMDIV).
pub const CLOCK_BLOCK_LEN: usize = 0xA8;
/// GPIO block offset from the peripheral base.
pub const GPIO_BLOCK_OFFSET: u32 = 0x0020_0000;
/// GPIO block length in bytes (through GPPUDCLK1).
pub const GPIO_BLOCK_LEN: usize = 0xB4;

/// Failure to obtain the register windows.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The device exists but this process may not open it.
    #[error("cannot open {}: this program needs root privileges, try using sudo", .path.display())]
    PermissionDenied {
        /// Device that was refused.
        path: PathBuf,
    },
    /// The device could not be opened for another reason.
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        /// Device that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The kernel rejected the mapping.
    #[error("memory mapping of the {block} block at {address:#010x} failed: {source}")]
    Map {
        /// Which block failed ("clock" or "gpio").
        block: &'static str,
        /// Physical address requested.
        address: u64,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// One mapped window of 32-bit device registers.
pub struct MappedRegion {
    map: MmapRaw,
    words: usize,
    physical: u64,
}

impl MappedRegion {
    /// Map `len_bytes` of physical memory at `physical` through `device`.
    pub fn map(device: &File, physical: u64, len_bytes: usize) -> io::Result<Self> {
        let map = MmapOptions::new()
            .offset(physical)
            .len(len_bytes)
            .map_raw(device)?;
        Ok(Self {
            map,
            words: len_bytes / 4,
            physical,
        })
    }

    /// Physical address of word 0.
    pub fn physical_address(&self) -> u64 {
        self.physical
    }

    fn check(&self, index: usize) -> Result<(), RegisterError> {
        if index < self.words {
            Ok(())
        } else {
            Err(RegisterError {
                index,
                len: self.words,
            })
        }
    }
}

impl RegisterBlock for MappedRegion {
    fn len_words(&self) -> usize {
        self.words
    }

    fn read(&self, index: usize) -> Result<u32, RegisterError> {
        self.check(index)?;
        // SAFETY: `index < words` and the mapping is `words * 4` bytes long,
        // page aligned (so 4-byte aligned), and alive for `&self`.
        let value = unsafe { self.map.as_ptr().cast::<u32>().add(index).read_volatile() };
        Ok(value)
    }

    fn write(&mut self, index: usize, value: u32) -> Result<(), RegisterError> {
        self.check(index)?;
        // SAFETY: as in `read`; `&mut self` gives exclusive use of the window
        // within this process.
        unsafe {
            self.map
                .as_mut_ptr()
                .cast::<u32>()
                .add(index)
                .write_volatile(value);
        }
        Ok(())
    }
}

impl core::fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MappedRegion")
            .field("physical", &format_args!("{:#010x}", self.physical))
            .field("words", &self.words)
            .finish()
    }
}

/// The two register blocks the tool needs, owned together.
///
/// Generic so flows can run against [`crate::mocks::MockRegisters`].
#[derive(Debug)]
pub struct Peripherals<C, G> {
    /// Clock-manager block.
    pub clock: C,
    /// GPIO block.
    pub gpio: G,
}

/// Both blocks mapped from physical memory.
pub type PeripheralMap = Peripherals<MappedRegion, MappedRegion>;

impl PeripheralMap {
    /// Open `device` (normally `/dev/mem`) and map both blocks relative to
    /// `peripheral_base`.
    ///
    /// The device is opened read/write with `O_SYNC` so accesses are uncached.
    /// The file handle is closed once both mappings exist.
    #[allow(clippy::arithmetic_side_effects)] // u32 + u32 widened to u64
    pub fn map(device: impl AsRef<Path>, peripheral_base: u32) -> Result<Self, MapError> {
        let path = device.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(path)
            .map_err(|source| match source.kind() {
                io::ErrorKind::PermissionDenied => MapError::PermissionDenied {
                    path: path.to_path_buf(),
                },
                _ => MapError::Open {
                    path: path.to_path_buf(),
                    source,
                },
            })?;

        let gpio_address = u64::from(peripheral_base) + u64::from(GPIO_BLOCK_OFFSET);
        let clock_address = u64::from(peripheral_base) + u64::from(CLOCK_BLOCK_OFFSET);

        let gpio = MappedRegion::map(&file, gpio_address, GPIO_BLOCK_LEN).map_err(|source| {
            MapError::Map {
                block: "gpio",
                address: gpio_address,
                source,
            }
        })?;
        let clock = MappedRegion::map(&file, clock_address, CLOCK_BLOCK_LEN).map_err(|source| {
            MapError::Map {
                block: "clock",
                address: clock_address,
                source,
            }
        })?;

        tracing::debug!(
            clock = format_args!("{clock_address:#010x}"),
            gpio = format_args!("{gpio_address:#010x}"),
            "peripheral blocks mapped"
        );
        Ok(Self { clock, gpio })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn block_offsets_are_page_aligned() {
        assert_eq!(CLOCK_BLOCK_OFFSET % 4096, 0);
        assert_eq!(GPIO_BLOCK_OFFSET % 4096, 0);
    }

    /// The generators this tool drives must fall inside the mapped window.
    #[test]
    fn clock_window_covers_pcm_div() {
        use crate::clock_config::ClockGenerator;
        assert!(ClockGenerator::Pcm.div_index() < CLOCK_BLOCK_LEN / 4);
        assert!(ClockGenerator::GeneralPurpose0.div_index() < CLOCK_BLOCK_LEN / 4);
    }

    #[test]
    fn pi4_block_addresses() {
        let base = u64::from(0xFE00_0000u32);
        assert_eq!(base + u64::from(CLOCK_BLOCK_OFFSET), 0xFE10_1000);
        assert_eq!(base + u64::from(GPIO_BLOCK_OFFSET), 0xFE20_0000);
    }

    #[test]
    fn missing_device_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-mem");
        let err = PeripheralMap::map(&missing, 0x3F00_0000).unwrap_err();
        assert!(matches!(err, MapError::Open { .. }), "{err}");
        assert!(err.to_string().contains("no-such-mem"));
    }

    /// A regular file stands in for the device. Mapping past EOF is allowed
    /// by the kernel as long as nothing is touched, so only the geometry is
    /// checked here.
    #[test]
    fn regular_file_maps_with_block_geometry() {
        let file = tempfile::NamedTempFile::new().unwrap();
        match PeripheralMap::map(file.path(), 0) {
            Ok(map) => {
                assert_eq!(map.clock.len_words(), CLOCK_BLOCK_LEN / 4);
                assert_eq!(map.gpio.len_words(), GPIO_BLOCK_LEN / 4);
                assert_eq!(map.clock.physical_address(), u64::from(CLOCK_BLOCK_OFFSET));
            }
            Err(err) => assert!(matches!(err, MapError::Map { .. }), "{err}"),
        }
    }

    #[test]
    fn permission_error_mentions_root() {
        let err = MapError::PermissionDenied {
            path: PathBuf::from("/dev/mem"),
        };
        assert!(err.to_string().contains("root privileges"));
    }
}
