use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// Crates that must stay `no_std`, checked on a bare-metal target.
const NO_STD_CRATES: &[&str] = &["platform", "playback", "mas3507d"];
const NO_STD_TARGET: &str = "thumbv7em-none-eabihf";

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking workspace...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // Check 1: no_std crates on a bare-metal target
    for krate in NO_STD_CRATES {
        println!("{}", format!("  Checking {krate} (no_std, {NO_STD_TARGET})...").cyan());
        let start = Instant::now();

        let output = Command::new("cargo")
            .args(["check", "-p", krate, "--target", NO_STD_TARGET, "--no-default-features"])
            .output()
            .with_context(|| format!("Failed to check {krate}"))?;

        if !output.status.success() {
            eprintln!("{}", format!("  ✗ {krate} no_std check failed").red().bold());
            eprintln!();
            eprintln!("{}", String::from_utf8_lossy(&output.stderr));
            anyhow::bail!("{krate} no_std check failed");
        }

        println!(
            "{}",
            format!("  ✓ {krate} passed in {:.2}s", start.elapsed().as_secs_f64()).green()
        );
    }
    println!();

    // Check 2: host build with the real decoder
    println!("{}", "  Checking host build (mp3 feature)...".cyan());
    let host_start = Instant::now();

    let host_output = Command::new("cargo")
        .args(["check", "--workspace", "--all-targets", "--features", "mas3507d/mp3"])
        .output()
        .context("Failed to check host build")?;

    if !host_output.status.success() {
        eprintln!("{}", "  ✗ Host check failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&host_output.stderr));
        anyhow::bail!("Host check failed");
    }

    println!(
        "{}",
        format!(
            "  ✓ Host check passed in {:.2}s",
            host_start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();

    // Check 3: Clippy lints
    println!("{}", "  Running clippy lints...".cyan());
    let clippy_start = Instant::now();

    let clippy_output = Command::new("cargo")
        .args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])
        .output()
        .context("Failed to run clippy")?;

    if clippy_output.status.success() {
        println!(
            "{}",
            format!(
                "  ✓ Clippy passed in {:.2}s",
                clippy_start.elapsed().as_secs_f64()
            )
            .green()
        );
    } else {
        eprintln!("{}", "  ⚠ Clippy warnings found".yellow().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&clippy_output.stderr));
        // Don't fail on clippy warnings, just show them
    }
    println!();

    // Check 4: Format check
    println!("{}", "  Checking code formatting...".cyan());

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
