//! Decode pipeline for the MAS 3507D model: compressed ring, frame detection,
//! MP3 decoding and sample delivery
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]

#[cfg(feature = "std")]
extern crate std;

pub mod decoder;
pub mod engine;
pub mod frame_header;
pub mod mp3_decoder;
pub mod ring_buffer;
pub mod sample_buffer;
pub mod volume;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use decoder::{DecodeError, FrameDecoder, FrameSpan, PcmFrame};
pub use engine::{PipelineState, RestoreError, StreamPipeline};
pub use mp3_decoder::NanoMp3Decoder;
