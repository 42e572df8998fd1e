//! Gain mapping for the decoder's 20-bit gain cells.
//!
//! The device stores each matrix gain (left→left, left→right, right→left,
//! right→right) as a 20-bit fraction of `0x80000`. The host-facing output gain
//! is a linear factor:
//!
//! ```text
//! db         = round(20 * log10((0x100000 - raw) / 0x80000))
//! percentage = raw == 0 ? 0 : 10 ^ ((db + 6) / 20)
//! ```
//!
//! | `raw`     | dB  | linear   |
//! |-----------|-----|----------|
//! | `0x00000` | —   | 0 (mute) |
//! | `0x80000` | 0   | ≈ 1.995  |
//! | `0xC0000` | −6  | ≈ 1.0    |

use platform::audio_types::GainRegister;

/// Full-scale reference of the gain encoding.
const GAIN_ONE: f64 = 524_288.0; // 0x80000
/// Upper bound of the encoding plus one.
const GAIN_SPAN: f64 = 1_048_576.0; // 0x100000

/// Convert a raw gain cell to whole decibels.
///
/// The argument of the logarithm is at least `1 / 0x80000` for any 20-bit
/// value, so the result is always finite.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // |db| <= 115 fits easily
pub fn gain_to_db(raw: GainRegister) -> i32 {
    let ratio = (GAIN_SPAN - f64::from(raw.get())) / GAIN_ONE;
    libm::round(20.0 * libm::log10(ratio)) as i32
}

/// Convert a raw gain cell to the linear output factor.
///
/// Zero is the channel mute encoding and maps to `0.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)] // db is a small integer
pub fn gain_to_percentage(raw: GainRegister) -> f32 {
    if raw.is_muted() {
        return 0.0;
    }
    let db = gain_to_db(raw) as f32;
    libm::powf(10.0, (db + 6.0) / 20.0)
}
