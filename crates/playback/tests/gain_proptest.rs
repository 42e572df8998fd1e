//! Property-based tests for the gain word conversion.

use platform::GainRegister;
use playback::volume::{gain_to_db, gain_to_percentage};

proptest::proptest! {
    /// A larger gain word never yields a louder output.
    #[test]
    fn percentage_is_non_increasing(a in 1u32..=GainRegister::MAX, b in 1u32..=GainRegister::MAX) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let p_lo = gain_to_percentage(GainRegister::new(lo));
        let p_hi = gain_to_percentage(GainRegister::new(hi));
        proptest::prop_assert!(p_hi <= p_lo, "{hi:#x} -> {p_hi} louder than {lo:#x} -> {p_lo}");
    }

    /// Every non-zero word gives a finite, positive factor whose decibel
    /// value sits in the representable range.
    #[test]
    fn percentage_is_finite_and_positive(raw in 1u32..=GainRegister::MAX) {
        let g = GainRegister::new(raw);
        let pct = gain_to_percentage(g);
        proptest::prop_assert!(pct.is_finite());
        proptest::prop_assert!(pct > 0.0);
        let db = gain_to_db(g);
        proptest::prop_assert!((-114..=6).contains(&db), "db {db} out of range");
    }

    /// Bits above the 20-bit word are ignored.
    #[test]
    fn high_bits_are_masked(raw in proptest::num::u32::ANY) {
        let masked = GainRegister::new(raw & GainRegister::MAX);
        proptest::prop_assert_eq!(gain_to_db(GainRegister::new(raw)), gain_to_db(masked));
    }
}

#[test]
fn zero_word_is_silence() {
    assert_eq!(gain_to_percentage(GainRegister::MUTED), 0.0);
}
