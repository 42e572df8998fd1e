//! nanomp3-based MP3 frame decoder.
//!
//! Implements the `FrameDecoder` trait using the `nanomp3` crate.
//! nanomp3 is a pure-Rust, no_std c2rust translation of minimp3 with ARM
//! soundness fixes.
//!
//! # Feature flag
//!
//! The `nanomp3` dependency and the real decode path are both gated behind the
//! `mp3` feature. Frame-boundary detection is pure Rust ([`crate::frame_header`])
//! and works either way, so a build without `mp3` still buffers frames and
//! then reports every decode as unsupported.

use crate::decoder::{DecodeError, FrameDecoder, FrameSpan, PcmFrame};
use crate::frame_header;

// ─── Implementation ───────────────────────────────────────────────────────────

/// MP3 frame decoder backed by nanomp3.
///
/// `nanomp3::Decoder` has no internal input buffering; the pipeline hands it
/// the whole compressed ring on every call and removes the consumed prefix.
pub struct NanoMp3Decoder {
    #[cfg(feature = "mp3")]
    inner: nanomp3::Decoder,
    #[cfg(feature = "mp3")]
    scratch: [f32; platform::config::MAX_SAMPLES_PER_FRAME],
    #[cfg(not(feature = "mp3"))]
    _phantom: (),
}

impl NanoMp3Decoder {
    /// Create a new MP3 decoder with empty inter-frame state.
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "mp3")]
            inner: nanomp3::Decoder::new(),
            #[cfg(feature = "mp3")]
            scratch: [0.0; platform::config::MAX_SAMPLES_PER_FRAME],
            #[cfg(not(feature = "mp3"))]
            _phantom: (),
        }
    }
}

impl Default for NanoMp3Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a decoder float sample to native 16-bit, saturating.
#[allow(clippy::cast_possible_truncation)] // clamped to the i16 range first
#[cfg_attr(not(feature = "mp3"), allow(dead_code))]
fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32768.0).clamp(-32768.0, 32767.0) as i16
}

impl FrameDecoder for NanoMp3Decoder {
    fn find_frame(&self, input: &[u8]) -> Option<FrameSpan> {
        frame_header::find_frame(input)
    }

    /// Decode one MP3 frame from `input` into `output`.
    ///
    /// # nanomp3 API
    ///
    /// `nanomp3::Decoder::decode(mp3: &[u8], pcm: &mut [f32]) -> (usize, Option<FrameInfo>)`
    ///
    /// - Returns `(bytes_consumed, Some(FrameInfo))` on success.
    /// - Returns `(bytes_consumed, None)` when no frame was decoded (garbage
    ///   at start, or the frame is incomplete).
    /// - The `pcm` slice must be at least `MAX_SAMPLES_PER_FRAME` (= 2304)
    ///   elements long.
    fn decode_frame(&mut self, input: &[u8], output: &mut PcmFrame) -> Result<usize, DecodeError> {
        if input.is_empty() {
            return Err(DecodeError::NoFrame);
        }

        #[cfg(feature = "mp3")]
        {
            let (consumed, info) = self.inner.decode(input, &mut self.scratch);
            let info = info.ok_or(DecodeError::NoFrame)?;

            let channels = info.channels.num();
            // nanomp3 reports at most 2 channels.
            #[allow(clippy::cast_possible_truncation)]
            let channel_count = channels as u8;
            let per_channel = (info.samples_produced as usize)
                .min(output.samples.len() / usize::from(channel_count.max(1)));
            let total = per_channel.saturating_mul(usize::from(channel_count.max(1)));
            for (dst, &src) in output.samples.iter_mut().zip(self.scratch.iter()).take(total) {
                *dst = f32_to_i16(src);
            }
            output.len = per_channel;
            output.sample_rate = info.sample_rate;
            output.channels = channel_count;
            Ok(consumed.min(input.len()))
        }

        #[cfg(not(feature = "mp3"))]
        {
            output.len = 0;
            Err(DecodeError::UnsupportedFormat)
        }
    }

    fn reset(&mut self) {
        #[cfg(feature = "mp3")]
        {
            self.inner = nanomp3::Decoder::new();
        }
    }
}
