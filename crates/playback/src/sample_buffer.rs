//! Decoded sample buffer with a read cursor.
//!
//! Holds exactly one decoded frame. The cursor counts time steps (one sample
//! per channel) already handed to the mixer; the buffer is logically empty
//! once the cursor reaches `len`, and only then may the next frame be decoded
//! into it.

use crate::decoder::PcmFrame;

/// One decoded frame plus the mixer's read position inside it.
pub struct SampleBuffer {
    frame: PcmFrame,
    cursor: usize,
}

impl SampleBuffer {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            frame: PcmFrame::zeroed(),
            cursor: 0,
        }
    }

    /// `true` when every decoded time step has been read.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.frame.len
    }

    /// Time steps left to read.
    pub fn remaining(&self) -> usize {
        self.frame.len.saturating_sub(self.cursor)
    }

    /// Read position, in time steps.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The decoded frame.
    pub fn frame(&self) -> &PcmFrame {
        &self.frame
    }

    /// Mutable access for the decoder. Call [`rewind`](Self::rewind) afterwards.
    pub fn frame_mut(&mut self) -> &mut PcmFrame {
        &mut self.frame
    }

    /// Restart reading at the first time step.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Restore a previously saved read position, clamped to the frame.
    pub fn seek(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.frame.len);
    }

    /// Drop the frame and zero the storage.
    pub fn clear(&mut self) {
        self.frame.clear();
        self.cursor = 0;
    }

    /// Samples stored per time step: 1 for mono, 2 otherwise.
    ///
    /// Streams with more than two channels are read as their first pair.
    fn stride(&self) -> usize {
        usize::from(self.frame.channels.clamp(1, 2))
    }

    /// Read the next (left, right) pair and advance the cursor.
    ///
    /// Mono frames return the same sample on both sides.
    #[allow(clippy::arithmetic_side_effects)] // cursor < len <= samples.len() / stride
    pub fn next_pair(&mut self) -> Option<(i16, i16)> {
        if self.is_exhausted() {
            return None;
        }
        let stride = self.stride();
        let base = self.cursor * stride;
        let left = *self.frame.samples.get(base)?;
        let right = *self.frame.samples.get(base + stride / 2)?;
        self.cursor += 1;
        Some((left, right))
    }

    /// The valid interleaved samples (`len * stride` values).
    pub fn valid_samples(&self) -> &[i16] {
        let n = self.frame.len.saturating_mul(self.stride());
        self.frame.samples.get(..n).unwrap_or(&self.frame.samples)
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}
