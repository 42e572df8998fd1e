//! Property-based tests for audio domain newtypes and frame math.
//! Verifies invariants hold for ALL valid inputs, not just fixed examples.

use platform::audio_types::{GainRegister, SampleRateHz};
use platform::StereoFrame;

proptest::proptest! {
    /// GainRegister::new never panics and always yields a 20-bit value.
    #[test]
    fn gain_register_new_never_exceeds_20_bits(raw in 0u32..=u32::MAX) {
        let g = GainRegister::new(raw);
        assert!(g.get() <= GainRegister::MAX);
        assert_eq!(g.get(), raw & 0xF_FFFF);
    }

    /// try_new agrees with new on the valid range.
    #[test]
    fn gain_register_try_new_matches_new_in_range(raw in 0u32..=0xF_FFFFu32) {
        assert_eq!(GainRegister::try_new(raw), Ok(GainRegister::new(raw)));
    }

    /// SampleRateHz::new never panics for any u32 input.
    #[test]
    fn sample_rate_hz_new_never_panics(hz in 0u32..=u32::MAX) {
        let _ = SampleRateHz::new(hz);
    }

    /// SampleRateHz valid range [8000, 48000] always succeeds.
    #[test]
    fn sample_rate_hz_valid_range_always_ok(hz in 8000u32..=48_000u32) {
        assert!(SampleRateHz::new(hz).is_ok(),
            "SampleRateHz::new({}) should be Ok within [8000, 48000]", hz);
    }

    /// Converted samples always land in [-1.0, 1.0).
    #[test]
    fn from_i16_stays_normalised(l in i16::MIN..=i16::MAX, r in i16::MIN..=i16::MAX) {
        let f = StereoFrame::from_i16(l, r);
        assert!((-1.0..1.0).contains(&f.left));
        assert!((-1.0..1.0).contains(&f.right));
    }

    /// Conversion preserves sign and ordering.
    #[test]
    fn from_i16_is_monotone(a in i16::MIN..=i16::MAX, b in i16::MIN..=i16::MAX) {
        let fa = StereoFrame::from_i16(a, a);
        let fb = StereoFrame::from_i16(b, b);
        if a < b {
            assert!(fa.left < fb.left);
        }
    }
}
