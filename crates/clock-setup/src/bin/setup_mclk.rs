//! `setup-mclk [--disable]`: 12.288 MHz MCLK on GPIO4 (header pin 7).

use std::process::ExitCode;

use clap::Parser;
use clock_setup::cli::MclkArgs;
use clock_setup::{exit, flows, logging};

fn main() -> ExitCode {
    let args = MclkArgs::parse();
    if let Err(err) = logging::init() {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    exit::finish(flows::run_mclk(&args))
}
