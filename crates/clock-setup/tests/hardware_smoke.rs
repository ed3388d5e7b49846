//! Smoke tests on a real Raspberry Pi.
//!
//! These need root and a Pi 2, 3 or 4. Run them on the board with:
//!
//! ```bash
//! sudo -E cargo test -p clock-setup --test hardware_smoke -- --ignored --test-threads=1
//! ```
//!
//! They reprogram live clocks: disconnect anything sensitive to MCLK/BCLK
//! glitches first.
// Test file: unwrap is the assertion mechanism here.
#![allow(clippy::unwrap_used)]

use clap::Parser;
use clock_setup::cli::{I2sRateArgs, MclkArgs};
use clock_setup::flows;
use platform::clock_config::{ClockGenerator, CLK_CTL_BUSY, CLK_CTL_ENAB};
use platform::config::{DEFAULT_CPUINFO_PATH, DEFAULT_MEM_DEVICE};
use platform::mmio::PeripheralMap;
use platform::registers::RegisterBlock;
use platform::revision;

fn mapped() -> PeripheralMap {
    let layout = revision::detect(DEFAULT_CPUINFO_PATH).unwrap();
    PeripheralMap::map(DEFAULT_MEM_DEVICE, layout.peripheral_base).unwrap()
}

#[test]
#[ignore = "needs root on a Raspberry Pi"]
fn board_is_identified() {
    let layout = revision::detect(DEFAULT_CPUINFO_PATH).unwrap();
    assert!(layout.pll_source_khz == 500_000 || layout.pll_source_khz == 750_000);
}

#[test]
#[ignore = "needs root on a Raspberry Pi"]
fn i2s_48k_leaves_pcm_clock_running() {
    flows::run_i2s_rate(&I2sRateArgs::parse_from(["setup-i2s-rate", "48000"])).unwrap();

    let map = mapped();
    let ctl = map.clock.read(ClockGenerator::Pcm.ctl_index()).unwrap();
    assert_ne!(ctl & CLK_CTL_ENAB, 0);
    assert_ne!(ctl & CLK_CTL_BUSY, 0);
    assert_eq!(ctl & 0xF, 6, "source should be PLLD");
}

#[test]
#[ignore = "needs root on a Raspberry Pi"]
fn mclk_enable_then_disable() {
    flows::run_mclk(&MclkArgs::parse_from(["setup-mclk"])).unwrap();
    let map = mapped();
    assert_eq!((map.gpio.read(0).unwrap() >> 12) & 0b111, 0b100);

    flows::run_mclk(&MclkArgs::parse_from(["setup-mclk", "--disable"])).unwrap();
    assert_eq!((map.gpio.read(0).unwrap() >> 12) & 0b111, 0b000);
}
