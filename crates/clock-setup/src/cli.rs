//! Command-line arguments for both tools.

use std::path::PathBuf;

use clap::{Args, Parser};
use platform::config::{APP_VERSION, DEFAULT_CPUINFO_PATH, DEFAULT_MEM_DEVICE};

/// Options shared by every tool that touches the clock hardware.
#[derive(Debug, Clone, Args)]
pub struct HardwareArgs {
    /// File the board revision is read from
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CPUINFO_PATH)]
    pub cpuinfo: PathBuf,

    /// Physical memory device the register blocks are mapped from
    #[arg(long, value_name = "PATH", default_value = DEFAULT_MEM_DEVICE)]
    pub mem_device: PathBuf,

    /// Identify the board and compute dividers, but do not touch hardware
    #[arg(long)]
    pub dry_run: bool,
}

/// `setup-i2s-rate`: program the PCM bit clock for a sample rate.
#[derive(Debug, Clone, Parser)]
#[command(name = "setup-i2s-rate")]
#[command(about = "Program the PCM/I2S bit clock for an arbitrary sample rate", long_about = None)]
#[command(version = APP_VERSION)]
#[command(after_help = "Example: setup-i2s-rate 48000")]
pub struct I2sRateArgs {
    /// LRCLK (sample) rate in Hz, at least 8000
    #[arg(value_name = "SAMPLE_RATE_HZ")]
    pub sample_rate: u32,

    #[command(flatten)]
    pub hardware: HardwareArgs,
}

/// `setup-mclk`: drive a 12.288 MHz master clock on GPIO 4.
#[derive(Debug, Clone, Parser)]
#[command(name = "setup-mclk")]
#[command(about = "Output a 12.288 MHz MCLK on GPIO4 (pin 7) from GPCLK0", long_about = None)]
#[command(version = APP_VERSION)]
pub struct MclkArgs {
    /// Stop driving MCLK: return GPIO4 to input
    #[arg(long)]
    pub disable: bool,

    #[command(flatten)]
    pub hardware: HardwareArgs,
}
