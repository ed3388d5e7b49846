// Desktop/tooling crate: unwrap/expect/panic and plain arithmetic are fine here.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]
#![allow(missing_docs)]

mod check;
mod doc;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "rpi-audio-clock development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the workspace on the host and for the Raspberry Pi targets
    Check {
        /// Skip aarch64/armv7 checks (no cross toolchain installed)
        #[arg(long)]
        skip_cross: bool,
    },
    /// Run all tests (unit, integration, doc)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
        /// Also run the ignored hardware smoke tests (root, on a Pi)
        #[arg(long)]
        hardware: bool,
    },
    /// Build and optionally open documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
        /// Include private items
        #[arg(long)]
        private: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { skip_cross } => check::run(skip_cross),
        Commands::Test {
            unit,
            integration,
            hardware,
        } => test::run(test::Selection {
            unit_only: unit,
            integration_only: integration,
            hardware,
        }),
        Commands::Doc { open, private } => doc::run(open, private),
    }
}
