//! `setup-i2s-rate <SAMPLE_RATE_HZ>`: program the PCM bit clock to 64 × fs.

use std::process::ExitCode;

use clap::Parser;
use clock_setup::cli::I2sRateArgs;
use clock_setup::{exit, flows, logging};

fn main() -> ExitCode {
    let args = I2sRateArgs::parse();
    if let Err(err) = logging::init() {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    exit::finish(flows::run_i2s_rate(&args))
}
