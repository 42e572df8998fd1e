//! MPEG audio Layer III frame header parsing and frame-boundary detection.
//!
//! Header layout (32 bits, big-endian):
//!
//! ```text
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//!  A  sync (11 bits, all ones)     E  bitrate index
//!  B  version (00=2.5, 10=2, 11=1) F  sample-rate index
//!  C  layer (01 = Layer III)       G  padding bit
//!  D  protection bit               I  channel mode (11 = mono)
//! ```
//!
//! A header alone is weak evidence: `0xFF 0xFx` shows up in random data. A
//! frame is only accepted when the header that follows it is consistent
//! (same version, layer and sample rate), chaining up to three frames, or
//! when a single frame exactly fills a buffer starting at offset zero.
//! Free-format streams (bitrate index 0) are not supported.

use crate::decoder::FrameSpan;

/// Size of a frame header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Number of chained headers that settle a match early.
const MAX_FRAME_SYNC_MATCHES: usize = 3;

/// Layer III bitrates in kbps, MPEG-1.
const BITRATES_MPEG1: [u32; 15] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];
/// Layer III bitrates in kbps, MPEG-2 and MPEG-2.5.
const BITRATES_MPEG2: [u32; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];
/// MPEG-1 sample rates; MPEG-2 halves them, MPEG-2.5 quarters them.
const SAMPLE_RATES_MPEG1: [u32; 3] = [44_100, 48_000, 32_000];

/// MPEG audio version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MpegVersion {
    /// MPEG-1 (32–48 kHz)
    Mpeg1,
    /// MPEG-2 LSF (16–24 kHz)
    Mpeg2,
    /// MPEG-2.5 (8–12 kHz)
    Mpeg25,
}

/// A parsed, valid Layer III frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    raw: [u8; HEADER_SIZE],
    /// MPEG version
    pub version: MpegVersion,
    /// Bitrate in kbps
    pub bitrate_kbps: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Padding slot present
    pub padding: bool,
    /// 1 for mono, 2 for all stereo modes
    pub channels: u8,
}

impl FrameHeader {
    /// Parse the header at the start of `bytes`.
    ///
    /// Returns `None` for short input, missing sync, reserved fields, other
    /// layers, or free-format bitrate.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; HEADER_SIZE] = bytes.get(..HEADER_SIZE)?.try_into().ok()?;
        let [b0, b1, b2, b3] = raw;
        if b0 != 0xFF || b1 & 0xE0 != 0xE0 {
            return None;
        }
        let version = match (b1 >> 3) & 3 {
            0 => MpegVersion::Mpeg25,
            2 => MpegVersion::Mpeg2,
            3 => MpegVersion::Mpeg1,
            _ => return None,
        };
        if (b1 >> 1) & 3 != 1 {
            return None;
        }
        let bitrate_index = usize::from(b2 >> 4);
        let table = match version {
            MpegVersion::Mpeg1 => &BITRATES_MPEG1,
            MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => &BITRATES_MPEG2,
        };
        let bitrate_kbps = *table.get(bitrate_index)?;
        if bitrate_kbps == 0 {
            return None;
        }
        let base_rate = *SAMPLE_RATES_MPEG1.get(usize::from((b2 >> 2) & 3))?;
        let sample_rate = match version {
            MpegVersion::Mpeg1 => base_rate,
            MpegVersion::Mpeg2 => base_rate / 2,
            MpegVersion::Mpeg25 => base_rate / 4,
        };
        Some(Self {
            raw,
            version,
            bitrate_kbps,
            sample_rate,
            padding: (b2 >> 1) & 1 != 0,
            channels: if b3 >> 6 == 3 { 1 } else { 2 },
        })
    }

    /// Frame length in bytes, header and padding included.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // bitrate ≤ 320, sample_rate ≥ 8000: no overflow, no div by zero
    pub fn frame_len(&self) -> usize {
        let slots_per_kbps = match self.version {
            MpegVersion::Mpeg1 => 144_000,
            MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => 72_000,
        };
        let len = slots_per_kbps * self.bitrate_kbps / self.sample_rate + u32::from(self.padding);
        len as usize
    }

    /// PCM samples per channel this frame decodes to.
    #[must_use]
    pub const fn samples_per_channel(&self) -> usize {
        match self.version {
            MpegVersion::Mpeg1 => 1152,
            MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => 576,
        }
    }

    /// `true` when `other` can belong to the same stream: same version,
    /// layer and sample rate.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        let [_, a1, a2, _] = self.raw;
        let [_, b1, b2, _] = other.raw;
        (a1 ^ b1) & 0xFE == 0 && (a2 ^ b2) & 0x0C == 0
    }
}

/// Follow the frame chain from `first` at the start of `buf`.
///
/// `true` once `MAX_FRAME_SYNC_MATCHES` consistent headers were seen, or the
/// buffer ends after at least one of them.
fn chain_matches(buf: &[u8], first: &FrameHeader) -> bool {
    let mut pos = 0usize;
    let mut current = *first;
    for nmatch in 0..MAX_FRAME_SYNC_MATCHES {
        pos = pos.saturating_add(current.frame_len());
        if pos.saturating_add(HEADER_SIZE) > buf.len() {
            return nmatch > 0;
        }
        match buf.get(pos..).and_then(FrameHeader::parse) {
            Some(next) if first.is_compatible(&next) => current = next,
            _ => return false,
        }
    }
    true
}

/// Locate the first confirmed Layer III frame in `input`.
pub fn find_frame(input: &[u8]) -> Option<FrameSpan> {
    let last_start = input.len().checked_sub(HEADER_SIZE)?;
    for offset in 0..last_start {
        let Some(rest) = input.get(offset..) else {
            break;
        };
        let Some(header) = FrameHeader::parse(rest) else {
            continue;
        };
        let len = header.frame_len();
        let fits = offset.saturating_add(len) <= input.len();
        if (fits && chain_matches(rest, &header)) || (offset == 0 && len == input.len()) {
            return Some(FrameSpan { offset, len });
        }
    }
    None
}
