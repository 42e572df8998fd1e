//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common errors:
//! - `GainRegister`: the device's 20-bit gain encoding, masked on construction
//! - `SampleRateHz`: validates the MPEG audio sample-rate range

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("value {value} outside {min}..={max}")]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── GainRegister ─────────────────────────────────────────────────────────────

/// Raw 20-bit gain value as written into the device's gain memory cells.
///
/// The encoding is a fraction of `0x80000`:
///
/// ```text
/// db = round(20 * log10((0x100000 - raw) / 0x80000))
/// ```
///
/// Zero is reserved as "channel muted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct GainRegister(u32);

impl GainRegister {
    /// Largest encodable value.
    pub const MAX: u32 = 0xF_FFFF;

    /// The reserved "channel muted" value.
    pub const MUTED: Self = Self(0);

    /// Create a `GainRegister`, keeping only the low 20 bits.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw & Self::MAX)
    }

    /// Create a `GainRegister`, returning an error if `raw` does not fit in 20 bits.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `raw > 0xFFFFF`.
    pub fn try_new(raw: u32) -> Result<Self, OutOfRangeError> {
        if raw > Self::MAX {
            Err(OutOfRangeError {
                value: raw,
                min: 0,
                max: Self::MAX,
            })
        } else {
            Ok(Self(raw))
        }
    }

    /// Return the raw 20-bit value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// `true` for the reserved mute encoding.
    #[must_use]
    pub const fn is_muted(self) -> bool {
        self.0 == 0
    }
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Output sample rate in Hz, validated to the range MPEG audio can produce.
///
/// Valid range: 8000–48000 Hz (MPEG-2.5 lowest to MPEG-1 highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (MPEG-2.5).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 48000 Hz (MPEG-1).
    pub const MAX_HZ: u32 = 48_000;

    /// Rate the device reports after reset, before any frame is decoded.
    pub const DEFAULT: Self = Self(44_100);

    /// Create a `SampleRateHz`, returning an error if out of 8000–48000 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > 48000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if !(Self::MIN_HZ..=Self::MAX_HZ).contains(&hz) {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        } else {
            Ok(Self(hz))
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for SampleRateHz {
    fn default() -> Self {
        Self::DEFAULT
    }
}
