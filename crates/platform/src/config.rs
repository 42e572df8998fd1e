//! Device configuration and constants
//!
//! Central values shared by the device model, the decode pipeline and host
//! tooling. Everything that talks to the emulated chip should reference these
//! constants rather than hardcoding values.

// ── Control bus ──────────────────────────────────────────────────────────────

/// 8-bit address byte for a write transaction (7-bit address 0x1d, R/W = 0).
pub const I2C_DEVICE_WRITE: u8 = 0x3a;
/// 8-bit address byte for a read transaction (7-bit address 0x1d, R/W = 1).
pub const I2C_DEVICE_READ: u8 = 0x3b;

/// First data byte selecting the data-write (command stream) sub-destination.
pub const I2C_DATA_WRITE: u8 = 0x68;
/// First data byte selecting the data-read sub-destination.
pub const I2C_DATA_READ: u8 = 0x69;
/// First data byte selecting the control sub-destination.
pub const I2C_CONTROL_WRITE: u8 = 0x6a;

// ── Decode pipeline ──────────────────────────────────────────────────────────

/// Capacity of the compressed byte ring, in bytes.
pub const MP3_RING_CAPACITY: usize = 0xe00;

/// Largest number of PCM samples one MPEG Layer III frame can decode to
/// (1152 samples per channel, two channels, interleaved).
pub const MAX_SAMPLES_PER_FRAME: usize = 1152 * 2;

/// Output sample rate in Hz after reset, before any frame has been decoded.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 44_100;
