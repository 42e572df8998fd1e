//! Scripted decoder for host tests.
//!
//! `ScriptedDecoder` understands a tiny synthetic frame format so pipeline
//! and device tests can drive frame detection, decode, rate changes and
//! decode failures without real MP3 data.
//!
//! ```text
//! byte 0   SYNC (0xA5)
//! byte 1   total frame length in bytes, header included (>= 5)
//! byte 2   rate code: 0 = 44 100, 1 = 48 000, 2 = 32 000, 3 = 22 050 Hz
//! byte 3   samples per channel (0 = decode yields nothing)
//! byte 4   channels (1 or 2)
//! byte 5.. payload, ignored
//! ```
//!
//! Decoded sample `i` is `(i + 1) * 100` on the left channel and its
//! negation on the right; mono frames carry only the left value.

#![cfg(any(test, feature = "std"))]

use std::vec::Vec;

use crate::decoder::{DecodeError, FrameDecoder, FrameSpan, PcmFrame};

/// First byte of every scripted frame.
pub const SYNC: u8 = 0xA5;
/// Bytes before the payload.
pub const HEADER_LEN: usize = 5;

const RATES: [u32; 4] = [44_100, 48_000, 32_000, 22_050];

/// Build one scripted frame of `len` bytes.
///
/// # Panics
///
/// Panics if `len` is shorter than the header.
#[allow(clippy::panic)] // test helper: a malformed script is a test bug
pub fn frame(len: u8, rate_code: u8, samples: u8, channels: u8) -> Vec<u8> {
    if usize::from(len) < HEADER_LEN {
        panic!("scripted frame must be at least {HEADER_LEN} bytes");
    }
    let mut out = std::vec![0u8; usize::from(len)];
    if let Some(header) = out.get_mut(..HEADER_LEN) {
        header.copy_from_slice(&[SYNC, len, rate_code, samples, channels]);
    }
    out
}

/// Decoder for the scripted frame format.
#[derive(Debug, Default)]
pub struct ScriptedDecoder {
    decode_calls: usize,
    resets: usize,
}

impl ScriptedDecoder {
    /// Create a decoder with zeroed call counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `decode_frame` calls so far.
    pub fn decode_calls(&self) -> usize {
        self.decode_calls
    }

    /// Number of `reset` calls so far.
    pub fn resets(&self) -> usize {
        self.resets
    }
}

fn header_at(input: &[u8], offset: usize) -> Option<(usize, u32, usize, u8)> {
    let header = input.get(offset..offset.checked_add(HEADER_LEN)?)?;
    let &[sync, len, rate, samples, channels] = header else {
        return None;
    };
    if sync != SYNC || usize::from(len) < HEADER_LEN || !(1..=2).contains(&channels) {
        return None;
    }
    let rate = *RATES.get(usize::from(rate))?;
    Some((usize::from(len), rate, usize::from(samples), channels))
}

impl FrameDecoder for ScriptedDecoder {
    fn find_frame(&self, input: &[u8]) -> Option<FrameSpan> {
        (0..input.len()).find_map(|offset| {
            let (len, ..) = header_at(input, offset)?;
            (offset.checked_add(len)? <= input.len()).then_some(FrameSpan { offset, len })
        })
    }

    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)] // i <= 255
    fn decode_frame(&mut self, input: &[u8], output: &mut PcmFrame) -> Result<usize, DecodeError> {
        self.decode_calls = self.decode_calls.saturating_add(1);
        output.len = 0;
        let span = self.find_frame(input).ok_or(DecodeError::NoFrame)?;
        let (_, rate, samples, channels) =
            header_at(input, span.offset).ok_or(DecodeError::InvalidData)?;

        let stride = usize::from(channels);
        for i in 0..samples {
            let value = ((i + 1) * 100) as i16;
            if let Some(slot) = output.samples.get_mut(i * stride) {
                *slot = value;
            }
            if stride == 2 {
                if let Some(slot) = output.samples.get_mut(i * stride + 1) {
                    *slot = -value;
                }
            }
        }
        output.len = samples;
        output.sample_rate = rate;
        output.channels = channels;
        Ok(span.end())
    }

    fn reset(&mut self) {
        self.resets = self.resets.saturating_add(1);
    }
}
