//! Host-boundary abstractions for the MAS 3507D decoder model
//!
//! This crate defines everything the emulated device shares with the machine
//! that hosts it, without depending on the device itself.
//!
//! # Architecture Layers
//!
//! ```text
//! Host (machine driver, mixer, data source)
//!         ↓
//! Device model (mas3507d crate)
//!         ↓
//! Decode pipeline (playback crate)
//!         ↓
//! Host boundary (this crate - traits and value types)
//! ```
//!
//! # Boundaries
//!
//! - [`I2cLines`] - the two open-drain control bus lines, driven and read by the host
//! - [`DeviceSignals`] - out-of-band demand and frame-sync notifications
//! - [`AudioSource`] - the mixer's pull interface for decoded stereo frames
//!
//! # Features
//!
//! - `std`: Host-side mocks for tests and desktop tools
//! - `defmt`: Enable defmt formatting on public value types
//!
//! # Example
//!
//! ```no_run
//! use platform::{BitBangMaster, I2cLines};
//!
//! fn program<L: I2cLines>(lines: &mut L) {
//!     let mut master = BitBangMaster::new(lines);
//!     let _ = master.write(0x3a, &[0x68, 0x9a, 0xa1, 0x00, 0x00]);
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod audio;
pub mod audio_types;
pub mod config;
pub mod peripheral;
pub mod signals;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use audio::{AudioSource, StereoFrame};
pub use audio_types::{GainRegister, OutOfRangeError, SampleRateHz};
pub use peripheral::{BitBangMaster, I2cError, I2cLines};
pub use signals::{DeviceSignals, NoSignals};
