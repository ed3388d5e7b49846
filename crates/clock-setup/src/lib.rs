//! Audio clock bring-up tools for Raspberry Pi
//!
//! Two entry points share this library:
//!
//! - `setup-i2s-rate <SAMPLE_RATE_HZ>` programs the PCM clock generator to
//!   `64 × fs` so the I2S block runs at the requested LRCLK.
//! - `setup-mclk [--disable]` programs GPCLK0 to 12.288 MHz and routes it to
//!   GPIO 4 (header pin 7), or returns the pin to input.
//!
//! # Architecture
//!
//! ```text
//! bin/ (argument parsing, process exit)
//!         ↓
//! flows (board identification, clock plans, hardware orchestration)
//!         ↓
//! platform (divider math, sequencer, register windows)
//! ```
//!
//! # Examples
//!
//! ```bash
//! sudo setup-i2s-rate 48000
//! sudo setup-mclk
//! setup-mclk --dry-run --cpuinfo ./cpuinfo-pi4.txt
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // progress goes through tracing
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod exit;
pub mod flows;
pub mod logging;

pub use flows::ClockPlan;
