//! Type system enforcement tests for audio domain newtypes.
//! These newtypes keep raw register encodings and sample rates in range.

// ── GainRegister ─────────────────────────────────────────────────────────────

#[test]
fn gain_register_new_masks_to_20_bits() {
    use platform::audio_types::GainRegister;
    let g = GainRegister::new(0x1F_FFFF);
    assert_eq!(g.get(), 0xF_FFFF, "GainRegister::new should keep the low 20 bits");
}

#[test]
fn gain_register_try_new_rejects_21_bit_values() {
    use platform::audio_types::GainRegister;
    assert!(GainRegister::try_new(0x10_0000).is_err());
    assert!(GainRegister::try_new(u32::MAX).is_err());
}

#[test]
fn gain_register_try_new_accepts_valid_range() {
    use platform::audio_types::GainRegister;
    assert!(GainRegister::try_new(0).is_ok());
    assert!(GainRegister::try_new(0x8_0000).is_ok());
    assert!(GainRegister::try_new(0xF_FFFF).is_ok());
}

#[test]
fn gain_register_zero_is_mute() {
    use platform::audio_types::GainRegister;
    assert!(GainRegister::new(0).is_muted());
    assert!(GainRegister::MUTED.is_muted());
    assert!(!GainRegister::new(1).is_muted());
}

#[test]
fn gain_register_error_reports_bounds() {
    use platform::audio_types::{GainRegister, OutOfRangeError};
    assert_eq!(
        GainRegister::try_new(0x12_3456),
        Err(OutOfRangeError {
            value: 0x12_3456,
            min: 0,
            max: 0xF_FFFF,
        })
    );
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

#[test]
fn sample_rate_accepts_every_mpeg_rate() {
    use platform::audio_types::SampleRateHz;
    for hz in [
        8_000, 11_025, 12_000, 16_000, 22_050, 24_000, 32_000, 44_100, 48_000,
    ] {
        assert!(SampleRateHz::new(hz).is_ok(), "{hz} Hz should be valid");
    }
}

#[test]
fn sample_rate_rejects_outside_range() {
    use platform::audio_types::SampleRateHz;
    assert!(SampleRateHz::new(0).is_err());
    assert!(SampleRateHz::new(7_999).is_err());
    assert!(SampleRateHz::new(96_000).is_err());
}

#[test]
fn sample_rate_default_is_44100() {
    use platform::audio_types::SampleRateHz;
    assert_eq!(SampleRateHz::default().get(), 44_100);
    assert_eq!(
        SampleRateHz::DEFAULT.get(),
        platform::config::DEFAULT_SAMPLE_RATE_HZ
    );
}

#[test]
fn sample_rate_is_u32_sized() {
    use platform::audio_types::SampleRateHz;
    assert_eq!(core::mem::size_of::<SampleRateHz>(), 4);
}
