//! Hardware layer for Raspberry Pi audio clock bring-up
//!
//! This crate programs the BCM2835-family clock manager so that a PLL-derived
//! audio clock appears either on a GPIO pin (MCLK) or on the PCM/I2S block
//! (BCLK), without a kernel clock-framework driver.
//!
//! # Architecture Layers
//!
//! ```text
//! Entry points (clock-setup crate: setup-mclk, setup-i2s-rate)
//!         ↓
//! Clock Sequencer (kill → await stop → divider → source → enable)
//!     ↓                     ↓
//! Divider Calculator    Pin Mode Controller
//!         ↓
//! Register Access Surface (RegisterBlock trait)
//!         ↓
//! /dev/mem mapping (memmap2) or MockRegisters in tests
//! ```
//!
//! # Example
//!
//! ```no_run
//! use platform::clock_config::{ClockGenerator, MCLK_TARGET_HZ};
//! use platform::clock_sequencer::ClockSequencer;
//! use platform::delay::ThreadDelay;
//! use platform::mmio::PeripheralMap;
//! use platform::revision::BoardFamily;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = BoardFamily::Pi4.layout();
//! let mut map = PeripheralMap::map("/dev/mem", layout.peripheral_base)?;
//! let mut delay = ThreadDelay;
//! let mut sequencer = ClockSequencer::new(&mut map.clock, &mut delay);
//! sequencer.reprogram(ClockGenerator::GeneralPurpose0, layout.pll_source_khz, MCLK_TARGET_HZ, true)?;
//! # Ok(())
//! # }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
// Pedantic lints suppressed for this hardware crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod audio_types;
pub mod clock_config;
pub mod clock_divider;
pub mod clock_sequencer;
pub mod config;
pub mod delay;
pub mod gpio;
pub mod mmio;
pub mod mocks;
pub mod registers;
pub mod revision;

// Re-export the types every entry point touches
pub use audio_types::{OutOfRangeError, SampleRateHz};
pub use clock_config::ClockGenerator;
pub use clock_divider::{ClockDivider, DividerError};
pub use clock_sequencer::{ClockError, ClockSequencer};
pub use gpio::PinMode;
pub use mmio::{MapError, MappedRegion, PeripheralMap, Peripherals};
pub use registers::{RegisterBlock, RegisterError};
pub use revision::{BoardFamily, PeripheralLayout, RevisionError};
