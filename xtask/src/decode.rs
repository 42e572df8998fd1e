//! xtask decode — run MP3 files through the emulated device and write WAV.
//!
//! The loop behaves like a host: it pushes compressed bytes while the device
//! asserts demand, then pulls one mixer block. Once the input is exhausted a
//! single padding byte lets the last frame count as buffered.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use mas3507d::Mas3507d;
use platform::{AudioSource, BitBangMaster, NoSignals, StereoFrame};
use playback::NanoMp3Decoder;
use walkdir::WalkDir;

use crate::wav::WavWriter;

/// Device write address on the control bus.
const DEVICE_WRITE: u8 = 0x3a;
/// Bank 1 output gain cells: left→left and right→right.
const GAIN_CELLS: [u16; 2] = [0x7f8, 0x7fb];

type Device = Mas3507d<NanoMp3Decoder, NoSignals>;

/// Result of decoding one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub frames: u32,
    pub sample_rate: u32,
    pub resets: u32,
}

/// Entry point called from main.rs
pub fn run(input: &Path, output: &Path, gain: Option<u32>, block: usize) -> Result<()> {
    if block == 0 {
        bail!("block size must be at least one frame");
    }
    let jobs = plan(input, output)?;
    if jobs.is_empty() {
        println!("{}", format!("No .mp3 files under {}", input.display()).yellow());
        return Ok(());
    }

    println!();
    println!("{}", format!("🎵 Decoding {} file(s)...", jobs.len()).cyan().bold());
    println!();

    let total_start = Instant::now();
    for (src, dst) in &jobs {
        let start = Instant::now();
        let summary = decode_file(src, dst, gain, block)
            .with_context(|| format!("decoding {}", src.display()))?;
        println!(
            "{}",
            format!(
                "  ✓ {} → {} ({} stereo frames @ {} Hz) in {:.2}s",
                src.display(),
                dst.display(),
                summary.frames,
                summary.sample_rate,
                start.elapsed().as_secs_f64()
            )
            .green()
        );
        if summary.resets > 0 {
            println!(
                "{}",
                format!("    ⚠ {} corrupt stretch(es) skipped", summary.resets).yellow()
            );
        }
    }
    println!();
    println!(
        "{}",
        format!("✓ Done in {:.2}s", total_start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();
    Ok(())
}

/// Pair each input file with its output path.
fn plan(input: &Path, output: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    if !input.is_dir() {
        return Ok(vec![(input.to_path_buf(), output.to_path_buf())]);
    }
    std::fs::create_dir_all(output)
        .with_context(|| format!("creating {}", output.display()))?;
    let mut jobs = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry?;
        let is_mp3 = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("mp3"));
        if !entry.file_type().is_file() || !is_mp3 {
            continue;
        }
        let relative = entry.path().strip_prefix(input).unwrap_or(entry.path());
        let dst = output.join(relative).with_extension("wav");
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        jobs.push((entry.into_path(), dst));
    }
    Ok(jobs)
}

/// Program both output gains through the bus, like a host driver would.
fn program_gain(device: &mut Device, gain: u32) -> Result<()> {
    let mut master = BitBangMaster::new(device);
    for cell in GAIN_CELLS {
        let [hi, lo] = cell.to_be_bytes();
        let [_, top, mid, low] = gain.to_be_bytes();
        master
            .write(DEVICE_WRITE, &[0x68, 0xb0, 0x00, 0x00, 0x01, hi, lo, mid, low, 0x00, top & 0x0f])
            .with_context(|| format!("writing gain cell {cell:#05x}"))?;
    }
    Ok(())
}

pub fn decode_file(input: &Path, output: &Path, gain: Option<u32>, block: usize) -> Result<Summary> {
    let data = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let mut device: Box<Device> = Box::new(Mas3507d::new(NanoMp3Decoder::new(), NoSignals));
    device.reset();
    if let Some(gain) = gain {
        program_gain(&mut device, gain)?;
    }

    let file = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    let mut wav: Option<WavWriter<BufWriter<File>>> = None;
    let mut pending = Some(BufWriter::new(file));
    let mut buf = vec![StereoFrame::SILENCE; block];
    let mut bytes = data.iter().copied();
    let mut padded = false;
    let mut resets = 0u32;

    loop {
        while device.demand() {
            match bytes.next() {
                Some(b) => device.feed_byte(b),
                None if !padded => {
                    device.feed_byte(0);
                    padded = true;
                }
                None => break,
            }
        }

        let before = device.decoded_frame_count();
        let written = device.produce(&mut buf);
        if device.decoded_frame_count() < before {
            resets = resets.saturating_add(1);
        }
        if written == 0 {
            if padded && !device.frame_buffered() {
                break;
            }
            // A decode failure resets the pipeline; feed again.
            if !device.demand() {
                bail!("device stalled with a full ring and nothing decodable");
            }
            continue;
        }

        let rate = device.sample_rate();
        if wav.is_none() {
            let sink = pending.take().context("output writer lost")?;
            wav = Some(WavWriter::new(sink, rate)?);
        }
        let Some(writer) = wav.as_mut() else {
            bail!("output writer lost");
        };
        if writer.sample_rate() != rate {
            tracing::warn!(
                from = writer.sample_rate(),
                to = rate,
                "sample rate changed mid-stream; output keeps the first rate"
            );
        }
        if let Some(decoded) = buf.get(..written) {
            writer.write_frames(decoded)?;
        }
    }

    let (frames, sample_rate) = match wav {
        Some(w) => {
            let frames = w.frame_count();
            let rate = w.sample_rate();
            w.finish()?.flush()?;
            (frames, rate)
        }
        None => {
            tracing::warn!(input = %input.display(), "no decodable frames");
            let sink = pending.context("output writer lost")?;
            WavWriter::new(sink, device.sample_rate())?.finish()?.flush()?;
            (0, device.sample_rate())
        }
    };
    tracing::info!(
        input = %input.display(),
        frames,
        sample_rate,
        resets,
        "decoded"
    );
    Ok(Summary {
        frames,
        sample_rate,
        resets,
    })
}
