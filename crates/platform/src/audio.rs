//! Audio output abstraction

/// One interleaved stereo output frame, normalised to `[-1.0, 1.0]` before gain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StereoFrame {
    /// Left channel sample
    pub left: f32,
    /// Right channel sample
    pub right: f32,
}

impl StereoFrame {
    /// A silent frame.
    pub const SILENCE: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    /// Create a frame from two samples.
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Convert a pair of native 16-bit decoder samples to an output frame.
    ///
    /// Full scale is 32768, so `i16::MIN` maps exactly to `-1.0`.
    pub fn from_i16(left: i16, right: i16) -> Self {
        Self {
            left: f32::from(left) / 32768.0,
            right: f32::from(right) / 32768.0,
        }
    }

    /// Apply a per-channel linear gain.
    #[must_use]
    pub fn scaled(self, left_gain: f32, right_gain: f32) -> Self {
        Self {
            left: self.left * left_gain,
            right: self.right * right_gain,
        }
    }
}

/// Pull interface used by the host mixer.
///
/// The mixer asks for a fixed-size block on its own clock; the source must
/// always fill the whole block, padding with silence when it has nothing.
pub trait AudioSource {
    /// Current output sample rate in Hz. May change between pulls.
    fn sample_rate(&self) -> u32;

    /// Fill every frame of `frames`.
    fn fill(&mut self, frames: &mut [StereoFrame]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_i16_full_scale() {
        let f = StereoFrame::from_i16(i16::MIN, 16384);
        assert_eq!(f.left, -1.0);
        assert_eq!(f.right, 0.5);
    }

    #[test]
    fn scaled_applies_each_channel_independently() {
        let f = StereoFrame::new(0.5, 0.5).scaled(2.0, 0.0);
        assert_eq!(f, StereoFrame::new(1.0, 0.0));
    }

    #[test]
    fn default_is_silence() {
        assert_eq!(StereoFrame::default(), StereoFrame::SILENCE);
    }
}
