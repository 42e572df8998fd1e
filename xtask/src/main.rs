// Desktop/tooling crate — unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod decode;
mod test;
mod wav;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "MAS 3507D emulator development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode MP3 files through the emulated device into 16-bit stereo WAV
    Decode {
        /// MP3 file, or a directory searched recursively for `.mp3` files
        input: PathBuf,
        /// Output WAV file, or a directory when `input` is a directory
        output: PathBuf,
        /// 20-bit gain word written to both output gain cells (e.g. 0xc0000
        /// for unity); omitted leaves the power-on unity gain
        #[arg(long, value_parser = parse_gain)]
        gain: Option<u32>,
        /// Frames pulled per produce call, like a host mixer block
        #[arg(long, default_value_t = 512)]
        block: usize,
    },
    /// Check the no_std crates, clippy and formatting
    Check,
    /// Run all tests (unit, integration, and doc)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
}

fn parse_gain(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    }
    .map_err(|e| format!("invalid gain word {s:?}: {e}"))?;
    if parsed > platform::GainRegister::MAX {
        return Err(format!("gain word {parsed:#x} exceeds 20 bits"));
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            input,
            output,
            gain,
            block,
        } => decode::run(&input, &output, gain, block),
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_gain;

    #[test]
    fn gain_accepts_hex_and_decimal() {
        assert_eq!(parse_gain("0xc0000"), Ok(0xc0000));
        assert_eq!(parse_gain("524288"), Ok(0x80000));
    }

    #[test]
    fn gain_rejects_wide_words() {
        assert!(parse_gain("0x100000").is_err());
        assert!(parse_gain("loud").is_err());
    }
}
