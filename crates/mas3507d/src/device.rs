//! The device aggregate.
//!
//! `Mas3507d` wires the bus automaton, the command interpreter, the
//! configuration and the decode pipeline together and exposes the three host
//! entry points: line edges ([`I2cLines`]), compressed bytes
//! ([`Mas3507d::feed_byte`]) and audio pulls ([`AudioSource`]).

use alloc::vec::Vec;

use platform::audio::{AudioSource, StereoFrame};
use platform::config::{DEFAULT_SAMPLE_RATE_HZ, MP3_RING_CAPACITY};
use platform::peripheral::I2cLines;
use platform::signals::DeviceSignals;
use playback::decoder::FrameDecoder;
use playback::engine::StreamPipeline;

use crate::bus::{BusState, ByteResponse, I2cBus, I2cTarget};
use crate::command::{CommandInterpreter, SubDestination};
use crate::registers::DeviceConfig;
use crate::snapshot::{DeviceSnapshot, PipelineSnapshot, SnapshotError};

/// Emulated MAS 3507D.
///
/// `D` decodes frames, `S` receives the demand and frame-sync signals and
/// `RING` is the compressed ring capacity in bytes. The struct embeds both
/// buffers; place it in a `Box` or a `static` on small stacks.
pub struct Mas3507d<D: FrameDecoder, S: DeviceSignals, const RING: usize = MP3_RING_CAPACITY> {
    bus: I2cBus,
    commands: CommandInterpreter,
    config: DeviceConfig,
    pipeline: StreamPipeline<D, RING>,
    signals: S,
}

/// Routes completed bus bytes to the interpreter and configuration.
struct BusTarget<'a> {
    commands: &'a mut CommandInterpreter,
    config: &'a mut DeviceConfig,
    frames: u32,
}

impl I2cTarget for BusTarget<'_> {
    fn address(&mut self, byte: u8) -> bool {
        self.commands.address(byte)
    }

    fn byte(&mut self, byte: u8) -> ByteResponse {
        match self.commands.byte(byte, self.frames) {
            Ok(Some(action)) => {
                self.config.apply(action);
                ByteResponse::Ack
            }
            Ok(None) => ByteResponse::Ack,
            Err(overrun) => {
                tracing::debug!(target: "mas3507d::other", "NAK: {overrun}");
                ByteResponse::Nak
            }
        }
    }

    fn stop(&mut self) {
        self.commands.stop();
    }

    fn read_bit(&mut self, bit: u8) -> Option<bool> {
        self.commands.read_bit(bit)
    }
}

impl<D: FrameDecoder, S: DeviceSignals, const RING: usize> Mas3507d<D, S, RING> {
    /// Construct a device in its reset state.
    pub fn new(decoder: D, signals: S) -> Self {
        Self {
            bus: I2cBus::new(),
            commands: CommandInterpreter::new(),
            config: DeviceConfig::new(),
            pipeline: StreamPipeline::new(decoder),
            signals,
        }
    }

    /// Device reset: lines released, session and configuration cleared,
    /// pipeline emptied, output rate back to 44.1 kHz.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.commands.reset();
        self.config.reset();
        self.pipeline.reset();
        self.pipeline.set_sample_rate(DEFAULT_SAMPLE_RATE_HZ);
        tracing::debug!(target: "mas3507d::other", "device reset");
    }

    // ── Data path ────────────────────────────────────────────────────────────

    /// Ingest one compressed byte. Never blocks, never rejects.
    pub fn feed_byte(&mut self, byte: u8) {
        self.pipeline.feed_byte(byte, &mut self.signals);
    }

    /// Fill `out` with decoded audio, output gains applied.
    ///
    /// Returns the number of frames carrying decoded audio; the rest is
    /// silence.
    pub fn produce(&mut self, out: &mut [StereoFrame]) -> usize {
        let written = self.pipeline.produce(out, &mut self.signals);
        let (left, right) = self.config.output_gain();
        for frame in out.iter_mut() {
            *frame = frame.scaled(left, right);
        }
        written
    }

    // ── Observers ────────────────────────────────────────────────────────────

    /// Bus protocol state.
    pub fn bus_state(&self) -> BusState {
        self.bus.state()
    }

    /// Current transaction sub-destination.
    pub fn subdestination(&self) -> SubDestination {
        self.commands.subdestination()
    }

    /// Configuration written over the bus.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// `true` when a complete frame is buffered.
    pub fn frame_buffered(&self) -> bool {
        self.pipeline.frame_buffered()
    }

    /// Current demand level.
    pub fn demand(&self) -> bool {
        self.pipeline.demand()
    }

    /// Frames decoded since the last reset.
    pub fn decoded_frame_count(&self) -> u32 {
        self.pipeline.decoded_frame_count()
    }

    /// Stereo frames delivered since the last reset.
    pub fn decoded_samples(&self) -> u32 {
        self.pipeline.decoded_samples()
    }

    /// The decode pipeline.
    pub fn pipeline(&self) -> &StreamPipeline<D, RING> {
        &self.pipeline
    }

    /// The signal sink.
    pub fn signals(&self) -> &S {
        &self.signals
    }

    /// Mutable access to the signal sink.
    pub fn signals_mut(&mut self) -> &mut S {
        &mut self.signals
    }

    // ── Save state ───────────────────────────────────────────────────────────

    /// Capture the device state.
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            bus: self.bus.clone(),
            commands: self.commands.clone(),
            config: self.config.clone(),
            pipeline: PipelineSnapshot::capture(&self.pipeline.state()),
        }
    }

    /// Serialise the device state.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Encoding`] if serialisation fails.
    pub fn save_state(&self) -> Result<Vec<u8>, SnapshotError> {
        self.snapshot().encode()
    }

    /// Resume from a captured state.
    ///
    /// Frame detection is recomputed; decoder-internal state starts fresh.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Restore`] if the pipeline part does not fit
    /// this device; nothing else is changed in that case.
    pub fn restore(&mut self, snapshot: DeviceSnapshot) -> Result<(), SnapshotError> {
        self.pipeline.restore(&snapshot.pipeline.as_state())?;
        self.bus = snapshot.bus;
        self.commands = snapshot.commands;
        self.config = snapshot.config;
        tracing::debug!(target: "mas3507d::other", "state restored");
        Ok(())
    }

    /// Decode and resume from bytes produced by [`save_state`](Self::save_state).
    ///
    /// # Errors
    ///
    /// Any [`SnapshotError`]; the device is unchanged unless the framing and
    /// body were valid.
    pub fn restore_state(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        let snapshot = DeviceSnapshot::decode(bytes)?;
        self.restore(snapshot)
    }

    fn target(&mut self) -> (&mut I2cBus, BusTarget<'_>) {
        let frames = self.pipeline.decoded_frame_count();
        (
            &mut self.bus,
            BusTarget {
                commands: &mut self.commands,
                config: &mut self.config,
                frames,
            },
        )
    }
}

impl<D: FrameDecoder, S: DeviceSignals, const RING: usize> I2cLines for Mas3507d<D, S, RING> {
    fn set_clock_line(&mut self, level: bool) {
        let (bus, mut target) = self.target();
        bus.set_clock_line(level, &mut target);
    }

    fn set_data_line(&mut self, level: bool) {
        let (bus, mut target) = self.target();
        bus.set_data_line(level, &mut target);
    }

    fn clock_line(&self) -> bool {
        self.bus.clock_line()
    }

    fn data_line(&self) -> bool {
        self.bus.data_line()
    }
}

impl<D: FrameDecoder, S: DeviceSignals, const RING: usize> AudioSource for Mas3507d<D, S, RING> {
    fn sample_rate(&self) -> u32 {
        self.pipeline.sample_rate()
    }

    fn fill(&mut self, frames: &mut [StereoFrame]) {
        self.produce(frames);
    }
}
