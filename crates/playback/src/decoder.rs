//! Decoder abstractions — PCM frame type, frame location, codec trait.
//!
//! The bitstream decoder is an external collaborator: the pipeline only needs
//! to ask it two questions. "Is there a complete frame in these bytes, and
//! where?" and "Decode the next frame out of these bytes." Everything else
//! (bit reservoir, synthesis filter state) stays inside the implementation.
//!
//! # Implementations
//!
//! * [`NanoMp3Decoder`](crate::mp3_decoder::NanoMp3Decoder): real MPEG Layer
//!   III decoding via `nanomp3`, behind the `mp3` feature.
//! * `ScriptedDecoder` (in `mocks`, `std` feature): a synthetic frame format
//!   for pipeline tests.

use platform::config::MAX_SAMPLES_PER_FRAME;

/// A decoded PCM frame — up to 1 152 samples per channel, interleaved.
///
/// The array is always fully allocated; `len` indicates the valid prefix in
/// samples per channel. Samples are native signed 16-bit.
#[derive(Clone)]
pub struct PcmFrame {
    /// Interleaved sample storage (`channels` samples per time step).
    pub samples: [i16; MAX_SAMPLES_PER_FRAME],
    /// Number of valid samples in `samples` (per channel).
    pub len: usize,
    /// Sample rate in Hz (e.g. 32 000, 44 100, 48 000).
    pub sample_rate: u32,
    /// Channel count (1 = mono, 2 = stereo).
    pub channels: u8,
}

impl PcmFrame {
    /// Create a zeroed `PcmFrame` suitable for use as an output buffer.
    pub const fn zeroed() -> Self {
        Self {
            samples: [0i16; MAX_SAMPLES_PER_FRAME],
            len: 0,
            sample_rate: 0,
            channels: 0,
        }
    }

    /// Forget the decoded content and zero the storage.
    pub fn clear(&mut self) {
        *self = Self::zeroed();
    }
}

impl Default for PcmFrame {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Location of one complete frame inside a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameSpan {
    /// Bytes of junk before the frame header.
    pub offset: usize,
    /// Frame length in bytes, header and padding included.
    pub len: usize,
}

impl FrameSpan {
    /// One past the last byte of the frame.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset.saturating_add(self.len)
    }
}

/// Errors that a [`FrameDecoder`] may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// No complete frame could be found in the input.
    #[error("no decodable frame in input")]
    NoFrame,
    /// The input bitstream contains invalid or corrupt data.
    #[error("invalid or corrupt frame data")]
    InvalidData,
    /// This build cannot decode the stream (e.g. the `mp3` feature is off).
    #[error("stream format not supported by this decoder")]
    UnsupportedFormat,
}

/// Trait for stateful, frame-by-frame audio decoders.
///
/// Implementations must be `no_std`-safe and must not allocate.
pub trait FrameDecoder {
    /// Locate the first complete, decodable frame in `input`.
    ///
    /// Returns `None` when no frame boundary can be confirmed yet. This must
    /// not change decoder state; the pipeline calls it after every byte.
    fn find_frame(&self, input: &[u8]) -> Option<FrameSpan>;

    /// Decode one frame from the start of `input` into `output`.
    ///
    /// # Returns
    ///
    /// `Ok(bytes_consumed)` on success, where `bytes_consumed ≤ input.len()`
    /// and includes any junk skipped before the frame. `output.len` may be
    /// zero, which the caller treats as a failed decode.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] on bitstream errors or missing frames.
    fn decode_frame(&mut self, input: &[u8], output: &mut PcmFrame) -> Result<usize, DecodeError>;

    /// Drop all inter-frame state (bit reservoir, overlap buffers).
    fn reset(&mut self);
}

impl<T: FrameDecoder + ?Sized> FrameDecoder for &mut T {
    fn find_frame(&self, input: &[u8]) -> Option<FrameSpan> {
        (**self).find_frame(input)
    }

    fn decode_frame(&mut self, input: &[u8], output: &mut PcmFrame) -> Result<usize, DecodeError> {
        (**self).decode_frame(input, output)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}
