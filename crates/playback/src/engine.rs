//! Streaming pipeline: compressed ring → frame detection → decode → samples.
//!
//! `StreamPipeline` is a pure, `no_std`, allocation-free engine. It owns the
//! compressed byte ring and the decoded sample buffer and knows nothing about
//! the serial bus or registers. The host pushes bytes with
//! [`feed_byte`](StreamPipeline::feed_byte) and pulls stereo frames with
//! [`produce`](StreamPipeline::produce); both report the demand and
//! frame-sync lines through a [`DeviceSignals`] sink passed by the caller.
//!
//! # Demand
//!
//! More data is wanted while no complete frame is buffered, or while the
//! ring still has room:
//!
//! ```text
//! demand = !frame_buffered || len < capacity
//! ```
//!
//! # Decode failure
//!
//! A decoder error or a decode that yields zero samples is treated as a
//! corrupt stream: the whole pipeline resets (ring cleared, counters zeroed,
//! decoder state dropped) and playback restarts from the next frame pushed.

use platform::audio::StereoFrame;
use platform::audio_types::SampleRateHz;
use platform::config::{DEFAULT_SAMPLE_RATE_HZ, MAX_SAMPLES_PER_FRAME, MP3_RING_CAPACITY};
use platform::signals::DeviceSignals;

use crate::decoder::FrameDecoder;
use crate::ring_buffer::ByteRing;
use crate::sample_buffer::SampleBuffer;

/// Errors returned by [`StreamPipeline::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RestoreError {
    /// More compressed bytes than the ring holds.
    #[error("compressed data of {len} bytes exceeds ring capacity {capacity}")]
    RingOverflow {
        /// Bytes offered
        len: usize,
        /// Ring capacity
        capacity: usize,
    },
    /// More decoded samples than one frame holds.
    #[error("{len} decoded samples exceed frame capacity {capacity}")]
    SampleOverflow {
        /// Samples offered
        len: usize,
        /// Frame capacity
        capacity: usize,
    },
    /// Channel count other than 1 or 2 with samples present.
    #[error("unsupported channel count {0}")]
    BadChannels(u8),
}

/// Borrowed view of everything the pipeline needs to resume.
///
/// Decoder-internal state is not part of it: a restored pipeline resumes
/// with a fresh decoder at the next frame boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineState<'a> {
    /// Compressed bytes, oldest first.
    pub compressed: &'a [u8],
    /// Valid interleaved samples of the current decoded frame.
    pub samples: &'a [i16],
    /// Channels of the current decoded frame (0 when none).
    pub channels: u8,
    /// Time steps already read from the current frame.
    pub cursor: usize,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Frames decoded since the last reset.
    pub decoded_frame_count: u32,
    /// Stereo frames handed to the host since the last reset.
    pub decoded_samples: u32,
}

/// Compressed-stream to PCM engine.
///
/// `N` is the compressed ring capacity in bytes.
pub struct StreamPipeline<D: FrameDecoder, const N: usize = MP3_RING_CAPACITY> {
    decoder: D,
    ring: ByteRing<N>,
    samples: SampleBuffer,
    frame_buffered: bool,
    sample_rate: u32,
    decoded_frame_count: u32,
    decoded_samples: u32,
}

impl<D: FrameDecoder, const N: usize> StreamPipeline<D, N> {
    /// Create an empty pipeline around `decoder`.
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            ring: ByteRing::new(),
            samples: SampleBuffer::new(),
            frame_buffered: false,
            sample_rate: DEFAULT_SAMPLE_RATE_HZ,
            decoded_frame_count: 0,
            decoded_samples: 0,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    /// `true` when the ring holds at least one complete frame.
    pub fn frame_buffered(&self) -> bool {
        self.frame_buffered
    }

    /// Current value of the demand line.
    pub fn demand(&self) -> bool {
        !self.frame_buffered || !self.ring.is_full()
    }

    /// Frames decoded since the last reset.
    pub fn decoded_frame_count(&self) -> u32 {
        self.decoded_frame_count
    }

    /// Stereo frames handed to the host since the last reset.
    pub fn decoded_samples(&self) -> u32 {
        self.decoded_samples
    }

    /// Sample rate of the most recently decoded frame, in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Override the output rate; used by a device reset.
    pub fn set_sample_rate(&mut self, hz: u32) {
        self.sample_rate = hz;
    }

    /// Compressed bytes currently buffered.
    pub fn buffered_bytes(&self) -> usize {
        self.ring.len()
    }

    /// Time steps left in the current decoded frame.
    pub fn pending_samples(&self) -> usize {
        self.samples.remaining()
    }

    /// The wrapped decoder.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    // ── Ingestion ────────────────────────────────────────────────────────────

    /// Append one compressed byte.
    ///
    /// A full ring drops its oldest byte. Frame detection runs only while no
    /// frame is buffered yet. The demand line is updated afterwards.
    pub fn feed_byte<S: DeviceSignals + ?Sized>(&mut self, byte: u8, signals: &mut S) {
        if self.ring.push_evicting(byte) {
            tracing::trace!(target: "playback::pipeline", "ring full, oldest byte dropped");
        }
        if !self.frame_buffered {
            self.detect_frame();
        }
        signals.on_demand(self.demand());
    }

    /// Recompute `frame_buffered` from the ring contents.
    ///
    /// A frame counts only when at least one byte follows it, so that the
    /// decoder always sees where the next header starts.
    fn detect_frame(&mut self) {
        self.frame_buffered = match self.decoder.find_frame(self.ring.as_slice()) {
            Some(span) => span.len > 0 && span.end() < self.ring.len(),
            None => false,
        };
        if self.frame_buffered {
            tracing::trace!(
                target: "playback::pipeline",
                buffered = self.ring.len(),
                "frame buffered"
            );
        }
    }

    // ── Decode ───────────────────────────────────────────────────────────────

    /// Decode the next buffered frame into the sample buffer.
    ///
    /// Frame sync drops first and rises again only after a successful decode.
    fn fill<S: DeviceSignals + ?Sized>(&mut self, signals: &mut S) {
        signals.on_frame_sync(false);
        if !self.frame_buffered {
            signals.on_demand(self.demand());
            return;
        }

        let result = self
            .decoder
            .decode_frame(self.ring.as_slice(), self.samples.frame_mut());
        self.samples.rewind();

        let consumed = match result {
            Ok(consumed) if self.samples.frame().len > 0 => consumed,
            Ok(consumed) => {
                tracing::warn!(
                    target: "playback::pipeline",
                    consumed,
                    "decoder produced no samples, resetting"
                );
                self.reset();
                signals.on_demand(self.demand());
                return;
            }
            Err(err) => {
                tracing::warn!(
                    target: "playback::pipeline",
                    error = ?err,
                    "decode failed, resetting"
                );
                self.reset();
                signals.on_demand(self.demand());
                return;
            }
        };

        self.ring.consume(consumed);
        let frame = self.samples.frame();
        match SampleRateHz::new(frame.sample_rate) {
            Ok(rate) => self.sample_rate = rate.get(),
            Err(err) => tracing::warn!(
                target: "playback::pipeline",
                error = %err,
                "decoded frame reports no usable rate, keeping {} Hz",
                self.sample_rate
            ),
        }
        self.decoded_frame_count = self.decoded_frame_count.wrapping_add(1);
        tracing::debug!(
            target: "playback::pipeline",
            frame = self.decoded_frame_count,
            consumed,
            samples = frame.len,
            rate = frame.sample_rate,
            "frame decoded"
        );

        self.detect_frame();
        signals.on_frame_sync(true);
        signals.on_demand(self.demand());
    }

    /// Fill `out` with decoded stereo frames.
    ///
    /// Decodes a new frame whenever the current one is exhausted. When no
    /// frame can be decoded the rest of `out` is silence. Returns the number
    /// of frames that carry decoded audio.
    pub fn produce<S: DeviceSignals + ?Sized>(
        &mut self,
        out: &mut [StereoFrame],
        signals: &mut S,
    ) -> usize {
        let mut written = 0usize;
        for slot in out.iter_mut() {
            if self.samples.is_exhausted() {
                self.fill(signals);
            }
            let Some((left, right)) = self.samples.next_pair() else {
                break;
            };
            *slot = StereoFrame::from_i16(left, right);
            self.decoded_samples = self.decoded_samples.wrapping_add(1);
            written = written.saturating_add(1);
        }
        if let Some(rest) = out.get_mut(written..) {
            rest.fill(StereoFrame::SILENCE);
        }
        written
    }

    // ── Reset and persistence ────────────────────────────────────────────────

    /// Drop all buffered data and counters.
    ///
    /// The sample rate is kept; the decoder's inter-frame state is discarded.
    pub fn reset(&mut self) {
        self.ring.clear();
        self.samples.clear();
        self.frame_buffered = false;
        self.decoded_frame_count = 0;
        self.decoded_samples = 0;
        self.decoder.reset();
        tracing::debug!(target: "playback::pipeline", "pipeline reset");
    }

    /// Borrow the resumable state.
    pub fn state(&self) -> PipelineState<'_> {
        PipelineState {
            compressed: self.ring.as_slice(),
            samples: self.samples.valid_samples(),
            channels: self.samples.frame().channels,
            cursor: self.samples.cursor(),
            sample_rate: self.sample_rate,
            decoded_frame_count: self.decoded_frame_count,
            decoded_samples: self.decoded_samples,
        }
    }

    /// Resume from a saved state.
    ///
    /// Frame detection runs again on the restored ring.
    ///
    /// # Errors
    ///
    /// Returns [`RestoreError`] if the state does not fit this pipeline; the
    /// pipeline is left unchanged in that case.
    pub fn restore(&mut self, state: &PipelineState<'_>) -> Result<(), RestoreError> {
        Self::check(state)?;
        self.reset();
        self.load(state)
    }

    /// Reject a state before anything is overwritten.
    fn check(state: &PipelineState<'_>) -> Result<(), RestoreError> {
        if state.compressed.len() > N {
            return Err(RestoreError::RingOverflow {
                len: state.compressed.len(),
                capacity: N,
            });
        }
        if state.samples.is_empty() {
            return Ok(());
        }
        if state.samples.len() > MAX_SAMPLES_PER_FRAME {
            return Err(RestoreError::SampleOverflow {
                len: state.samples.len(),
                capacity: MAX_SAMPLES_PER_FRAME,
            });
        }
        match state.channels {
            1 | 2 => Ok(()),
            other => Err(RestoreError::BadChannels(other)),
        }
    }

    #[allow(clippy::arithmetic_side_effects)] // stride is 1 or 2
    fn load(&mut self, state: &PipelineState<'_>) -> Result<(), RestoreError> {
        self.ring
            .load(state.compressed)
            .map_err(|()| RestoreError::RingOverflow {
                len: state.compressed.len(),
                capacity: N,
            })?;

        if !state.samples.is_empty() {
            let stride = match state.channels {
                1 => 1usize,
                2 => 2,
                other => return Err(RestoreError::BadChannels(other)),
            };
            let frame = self.samples.frame_mut();
            let capacity = frame.samples.len();
            let dst = frame
                .samples
                .get_mut(..state.samples.len())
                .ok_or(RestoreError::SampleOverflow {
                    len: state.samples.len(),
                    capacity,
                })?;
            dst.copy_from_slice(state.samples);
            frame.len = state.samples.len() / stride;
            frame.channels = state.channels;
            frame.sample_rate = state.sample_rate;
            self.samples.seek(state.cursor);
        }

        self.sample_rate = state.sample_rate;
        self.decoded_frame_count = state.decoded_frame_count;
        self.decoded_samples = state.decoded_samples;
        self.detect_frame();
        Ok(())
    }
}
