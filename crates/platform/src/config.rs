//! Application configuration and constants
//!
//! Central configuration values used across the workspace. Entry points
//! take their defaults from here rather than hardcoding paths or timings.

/// Name shown in the startup log line.
pub const APP_NAME: &str = "rpi-audio-clock";

/// Version reported by `--version` and the startup log line.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// System identification source scanned for the board revision.
pub const DEFAULT_CPUINFO_PATH: &str = "/proc/cpuinfo";

/// Physical memory device the register blocks are mapped from.
pub const DEFAULT_MEM_DEVICE: &str = "/dev/mem";

/// Sleep between BUSY polls while waiting for a generator to stop.
pub const BUSY_POLL_INTERVAL_US: u32 = 10;

/// Settle time after each DIV/CTL write before the next one.
pub const SETTLE_DELAY_US: u32 = 10;
