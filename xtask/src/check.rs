use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// Linux targets the tools are deployed to.
pub const CROSS_TARGETS: &[(&str, &str)] = &[
    ("aarch64-unknown-linux-gnu", "64-bit Raspberry Pi OS"),
    ("armv7-unknown-linux-gnueabihf", "32-bit Raspberry Pi OS"),
];

pub fn run(skip_cross: bool) -> Result<()> {
    println!();
    println!("{}", "🔍 Checking workspace builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // Check 1: Host build (mocks, tests, dry runs)
    cargo_step("host", &["check", "--workspace", "--all-targets"], true)?;

    // Check 2: Board targets
    if skip_cross {
        println!("{}", "  ⚠ Skipping cross-target checks".yellow());
        println!();
    } else {
        for (target, label) in CROSS_TARGETS {
            cargo_step(
                &format!("{target} ({label})"),
                &[
                    "check",
                    "-p",
                    "platform",
                    "-p",
                    "clock-setup",
                    "--bins",
                    "--lib",
                    "--target",
                    target,
                ],
                true,
            )?;
        }
    }

    // Check 3: Clippy lints
    cargo_step(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        false,
    )?;

    // Check 4: Format check
    let fmt_output = Command::new("cargo")
        .args(["fmt", "--all", "--check"])
        .output()
        .context("Failed to run cargo fmt")?;

    if fmt_output.status.success() {
        println!("{}", "  ✓ Formatting check passed".green());
    } else {
        eprintln!("{}", "  ⚠ Formatting issues found".yellow().bold());
        eprintln!("     Run 'cargo fmt --all' to fix");
    }
    println!();

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}

/// Run one cargo invocation; `required` steps abort the check on failure.
fn cargo_step(name: &str, args: &[&str], required: bool) -> Result<()> {
    println!("{}", format!("  Checking {name}...").cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(args)
        .output()
        .with_context(|| format!("Failed to run cargo for {name}"))?;

    if output.status.success() {
        println!(
            "{}",
            format!(
                "  ✓ {name} passed in {:.2}s",
                start.elapsed().as_secs_f64()
            )
            .green()
        );
    } else if required {
        eprintln!("{}", format!("  ✗ {name} failed").red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("{name} check failed");
    } else {
        eprintln!("{}", format!("  ⚠ {name} reported problems").yellow().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
    }
    println!();
    Ok(())
}
