//! Save-state snapshots.
//!
//! A snapshot holds every piece of device state the host must persist: bus
//! automaton, command session, configuration, compressed ring, decoded sample
//! buffer and counters. Frame-boundary detection is not stored; it is
//! recomputed on restore.
//!
//! # Wire format
//!
//! ```text
//! "MAS3"  version:u8  crc32(body):u32 LE  body (postcard)
//! ```

use alloc::vec::Vec;

use playback::engine::{PipelineState, RestoreError};
use serde::{Deserialize, Serialize};

use crate::bus::I2cBus;
use crate::command::CommandInterpreter;
use crate::registers::DeviceConfig;

/// Leading bytes of every encoded snapshot.
pub const MAGIC: [u8; 4] = *b"MAS3";
/// Current encoding version.
pub const VERSION: u8 = 1;
/// Magic, version and checksum.
pub const HEADER_LEN: usize = 9;

/// Errors from encoding, decoding or applying a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Input shorter than the header.
    #[error("snapshot truncated: {0} bytes")]
    Truncated(usize),
    /// Magic bytes do not match.
    #[error("not a device snapshot")]
    BadMagic,
    /// Encoded by an incompatible version.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u8),
    /// Body does not match its checksum.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Checksum in the header
        stored: u32,
        /// Checksum of the body
        computed: u32,
    },
    /// postcard failed to encode or decode the body.
    #[error("snapshot body: {0}")]
    Encoding(postcard::Error),
    /// The pipeline part does not fit this device.
    #[error(transparent)]
    Restore(#[from] RestoreError),
}

/// Owned copy of the pipeline's resumable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    /// Compressed bytes, oldest first.
    pub compressed: Vec<u8>,
    /// Valid interleaved samples of the current frame.
    pub samples: Vec<i16>,
    /// Channels of the current frame.
    pub channels: u8,
    /// Read position in time steps.
    pub cursor: usize,
    /// Output rate in Hz.
    pub sample_rate: u32,
    /// Frames decoded since reset.
    pub decoded_frame_count: u32,
    /// Stereo frames delivered since reset.
    pub decoded_samples: u32,
}

impl PipelineSnapshot {
    /// Copy a borrowed pipeline state.
    pub fn capture(state: &PipelineState<'_>) -> Self {
        Self {
            compressed: state.compressed.to_vec(),
            samples: state.samples.to_vec(),
            channels: state.channels,
            cursor: state.cursor,
            sample_rate: state.sample_rate,
            decoded_frame_count: state.decoded_frame_count,
            decoded_samples: state.decoded_samples,
        }
    }

    /// Borrow as a pipeline state.
    pub fn as_state(&self) -> PipelineState<'_> {
        PipelineState {
            compressed: &self.compressed,
            samples: &self.samples,
            channels: self.channels,
            cursor: self.cursor,
            sample_rate: self.sample_rate,
            decoded_frame_count: self.decoded_frame_count,
            decoded_samples: self.decoded_samples,
        }
    }
}

/// Complete device state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Bus automaton, line levels included.
    pub bus: I2cBus,
    /// Command session.
    pub commands: CommandInterpreter,
    /// Configuration.
    pub config: DeviceConfig,
    /// Decode pipeline.
    pub pipeline: PipelineSnapshot,
}

impl DeviceSnapshot {
    /// Encode with header and checksum.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Encoding`] if postcard fails.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        let body = postcard::to_allocvec(self).map_err(SnapshotError::Encoding)?;
        let mut out = Vec::with_capacity(HEADER_LEN.saturating_add(body.len()));
        out.extend_from_slice(&MAGIC);
        out.push(VERSION);
        out.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Validate the header and checksum, then decode the body.
    ///
    /// # Errors
    ///
    /// Any [`SnapshotError`] except `Restore`.
    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let (header, body) = bytes
            .split_at_checked(HEADER_LEN)
            .ok_or(SnapshotError::Truncated(bytes.len()))?;
        let (magic, rest) = header.split_at(MAGIC.len());
        if magic != MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        let (version, crc) = rest.split_at(1);
        if version != [VERSION] {
            return Err(SnapshotError::UnsupportedVersion(
                version.first().copied().unwrap_or_default(),
            ));
        }
        let stored = crc
            .try_into()
            .map(u32::from_le_bytes)
            .map_err(|_| SnapshotError::Truncated(bytes.len()))?;
        let computed = crc32fast::hash(body);
        if stored != computed {
            return Err(SnapshotError::ChecksumMismatch { stored, computed });
        }
        postcard::from_bytes(body).map_err(SnapshotError::Encoding)
    }
}
