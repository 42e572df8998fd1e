//! Micronas MAS 3507D MPEG audio decoder model
//!
//! An emulated serial-bus-controlled decoder peripheral. The host configures
//! it over a two-wire open-drain control bus, pushes compressed audio one byte
//! at a time, and pulls decoded stereo frames at its own block rate.
//!
//! # Architecture
//!
//! ```text
//!  host edges ──► bus::I2cBus ──bytes──► command::CommandInterpreter
//!                                              │ Action
//!                                              ▼
//!                                   registers::DeviceConfig ──gains──┐
//!                                                                    ▼
//!  host bytes ──► playback::StreamPipeline ──────────────────► produce()
//!                       │ demand / frame sync
//!                       ▼
//!                 platform::DeviceSignals
//! ```
//!
//! [`Mas3507d`] ties the pieces together and implements
//! [`platform::I2cLines`] and [`platform::AudioSource`].
//!
//! # Features
//!
//! - `mp3`: real MPEG Layer III decoding through nanomp3
//! - `std`: host-side mocks from `platform` and `playback`
//! - `defmt`: `defmt::Format` on public value types

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

extern crate alloc;

pub mod bus;
pub mod command;
pub mod device;
pub mod registers;
pub mod snapshot;

pub use bus::{BusError, BusState, I2cBus, I2cTarget};
pub use command::{Action, CommandInterpreter, Overrun, PendingCommand, SubDestination};
pub use device::Mas3507d;
pub use registers::DeviceConfig;
pub use snapshot::{DeviceSnapshot, SnapshotError};
