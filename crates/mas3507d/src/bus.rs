//! Two-wire bus protocol state machine.
//!
//! The bus sees nothing but level changes on two open-drain lines. It turns
//! them into START/STOP conditions and whole bytes, runs the acknowledge
//! handshake, and hands completed bytes to an [`I2cTarget`]. Only edge order
//! matters; there is no notion of time.
//!
//! ```text
//!            data fall, clock high (START, from any state)
//!                          │
//!   Idle ──────────────► Started ──8th clock rise──► Ack ──clock rise──► Ack2
//!    ▲                     ▲  │                       │                   │
//!    │                     │  └─address mismatch──► Nak                   │
//!    │                     └──────────────clock fall──────────────────────┘
//!    └── data rise, clock high (STOP, from any state)
//! ```

use serde::{Deserialize, Serialize};

/// Protocol state of the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusState {
    /// No transaction in progress.
    Idle,
    /// Shifting in (or out) the bits of a byte.
    Started,
    /// Byte complete; the acknowledge clock has not risen yet.
    Ack,
    /// Acknowledge clock is high; the device holds data low.
    Ack2,
    /// Transaction rejected; ignored until the next START or STOP.
    Nak,
}

/// Address resolution within the current transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressState {
    /// The next completed byte is the address byte.
    Unknown,
    /// The address matched; completed bytes go to the target.
    Validated,
    /// The address did not match this device.
    Wrong,
}

/// How the target answers a completed data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteResponse {
    /// Accept the byte.
    Ack,
    /// Reject the byte and abandon the transaction.
    Nak,
}

/// Errors reported by [`I2cBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// A NAK can only be forced while a completed byte awaits acknowledge.
    #[error("NAK forced in state {0:?}, expected Ack")]
    NakOutsideAck(BusState),
}

/// Receiver of the bytes the bus reconstructs.
pub trait I2cTarget {
    /// The first byte after START. Returns `true` when it addresses this
    /// device.
    fn address(&mut self, byte: u8) -> bool;

    /// A completed byte after a matching address.
    fn byte(&mut self, byte: u8) -> ByteResponse;

    /// A STOP condition.
    fn stop(&mut self);

    /// Level the device drives while bit `bit` (7 = MSB) of the current byte
    /// is clocked. `None` means the device is not sourcing data and holds the
    /// line at the acknowledge level.
    fn read_bit(&mut self, bit: u8) -> Option<bool>;
}

/// Edge-driven bus automaton.
///
/// Each line has an input side (driven by the host) and an output side
/// (driven by the device); observers see the wired-AND of the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I2cBus {
    state: BusState,
    address: AddressState,
    scl_in: bool,
    scl_out: bool,
    sda_in: bool,
    sda_out: bool,
    bit: u8,
    value: u8,
}

impl I2cBus {
    /// A bus with both lines released and no transaction in progress.
    pub const fn new() -> Self {
        Self {
            state: BusState::Idle,
            address: AddressState::Unknown,
            scl_in: true,
            scl_out: true,
            sda_in: true,
            sda_out: true,
            bit: 7,
            value: 0,
        }
    }

    /// Release both lines and drop any transaction.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current protocol state.
    pub fn state(&self) -> BusState {
        self.state
    }

    /// Current address resolution.
    pub fn address_state(&self) -> AddressState {
        self.address
    }

    /// Observed clock level.
    pub fn clock_line(&self) -> bool {
        self.scl_in && self.scl_out
    }

    /// Observed data level.
    pub fn data_line(&self) -> bool {
        self.sda_in && self.sda_out
    }

    /// Host drives the clock line.
    pub fn set_clock_line<T: I2cTarget + ?Sized>(&mut self, level: bool, target: &mut T) {
        if level == self.scl_in {
            return;
        }
        self.scl_in = level;

        match (level, self.state) {
            (true, BusState::Started) => self.clock_in_bit(target),
            (true, BusState::Ack) => {
                self.state = BusState::Ack2;
                self.sda_out = false;
            }
            (false, BusState::Ack2) => {
                self.state = BusState::Started;
                self.bit = 7;
                self.value = 0;
                self.sda_out = false;
            }
            _ => {}
        }
    }

    /// Host drives the data line.
    ///
    /// With the clock high a falling edge is START and a rising edge is STOP.
    pub fn set_data_line<T: I2cTarget + ?Sized>(&mut self, level: bool, target: &mut T) {
        if level == self.sda_in {
            return;
        }
        self.sda_in = level;
        if !self.scl_in {
            return;
        }

        if level {
            target.stop();
            self.state = BusState::Idle;
            self.sda_out = true;
        } else {
            tracing::trace!(target: "mas3507d::other", "START");
            self.state = BusState::Started;
        }
        self.address = AddressState::Unknown;
        self.bit = 7;
        self.value = 0;
    }

    /// Force the pending byte to be rejected.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NakOutsideAck`] unless the bus is in
    /// [`BusState::Ack`]; the state is left unchanged.
    pub fn nak(&mut self) -> Result<(), BusError> {
        if self.state != BusState::Ack {
            return Err(BusError::NakOutsideAck(self.state));
        }
        self.state = BusState::Nak;
        self.sda_out = true;
        Ok(())
    }

    fn clock_in_bit<T: I2cTarget + ?Sized>(&mut self, target: &mut T) {
        if self.sda_in {
            self.value |= 1u8.checked_shl(u32::from(self.bit)).unwrap_or(0);
        }
        self.sda_out = target.read_bit(self.bit).unwrap_or(false);

        match self.bit.checked_sub(1) {
            Some(next) => self.bit = next,
            None => self.byte_complete(target),
        }
    }

    fn byte_complete<T: I2cTarget + ?Sized>(&mut self, target: &mut T) {
        let byte = self.value;
        match self.address {
            AddressState::Unknown => {
                if target.address(byte) {
                    self.state = BusState::Ack;
                    self.address = AddressState::Validated;
                    self.value = 0;
                } else {
                    tracing::trace!(target: "mas3507d::other", address = byte, "address mismatch");
                    self.state = BusState::Nak;
                    self.address = AddressState::Wrong;
                    self.sda_out = true;
                }
            }
            AddressState::Validated => {
                self.state = BusState::Ack;
                if target.byte(byte) == ByteResponse::Nak {
                    self.state = BusState::Nak;
                    self.sda_out = true;
                }
            }
            AddressState::Wrong => {}
        }
    }
}

impl Default for I2cBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    /// Target that records bytes and answers from a script.
    #[derive(Default)]
    struct Recorder {
        addresses: std::vec::Vec<u8>,
        bytes: std::vec::Vec<u8>,
        stops: usize,
        nak_after: Option<usize>,
    }

    impl I2cTarget for Recorder {
        fn address(&mut self, byte: u8) -> bool {
            self.addresses.push(byte);
            byte & 0xfe == 0x3a
        }

        fn byte(&mut self, byte: u8) -> ByteResponse {
            self.bytes.push(byte);
            match self.nak_after {
                Some(n) if self.bytes.len() > n => ByteResponse::Nak,
                _ => ByteResponse::Ack,
            }
        }

        fn stop(&mut self) {
            self.stops += 1;
        }

        fn read_bit(&mut self, _bit: u8) -> Option<bool> {
            None
        }
    }

    fn start(bus: &mut I2cBus, t: &mut Recorder) {
        bus.set_data_line(true, t);
        bus.set_clock_line(true, t);
        bus.set_data_line(false, t);
        bus.set_clock_line(false, t);
    }

    fn stop(bus: &mut I2cBus, t: &mut Recorder) {
        bus.set_data_line(false, t);
        bus.set_clock_line(true, t);
        bus.set_data_line(true, t);
    }

    /// Clock a byte out and return the level seen in the acknowledge slot.
    fn send(bus: &mut I2cBus, t: &mut Recorder, byte: u8) -> bool {
        for bit in (0..8).rev() {
            bus.set_data_line((byte >> bit) & 1 != 0, t);
            bus.set_clock_line(true, t);
            bus.set_clock_line(false, t);
        }
        bus.set_data_line(true, t);
        bus.set_clock_line(true, t);
        let level = bus.data_line();
        bus.set_clock_line(false, t);
        level
    }

    #[test]
    fn idle_bus_has_both_lines_high() {
        let bus = I2cBus::new();
        assert_eq!(bus.state(), BusState::Idle);
        assert!(bus.clock_line());
        assert!(bus.data_line());
    }

    #[test]
    fn start_condition_enters_started() {
        let mut bus = I2cBus::new();
        let mut t = Recorder::default();
        start(&mut bus, &mut t);
        assert_eq!(bus.state(), BusState::Started);
        assert_eq!(bus.address_state(), AddressState::Unknown);
    }

    #[test]
    fn matching_address_is_acknowledged() {
        let mut bus = I2cBus::new();
        let mut t = Recorder::default();
        start(&mut bus, &mut t);
        assert!(!send(&mut bus, &mut t, 0x3a), "ACK pulls data low");
        assert_eq!(bus.state(), BusState::Started);
        assert_eq!(bus.address_state(), AddressState::Validated);
        assert_eq!(t.addresses, [0x3a]);
    }

    #[test]
    fn data_bytes_reach_the_target() {
        let mut bus = I2cBus::new();
        let mut t = Recorder::default();
        start(&mut bus, &mut t);
        send(&mut bus, &mut t, 0x3a);
        send(&mut bus, &mut t, 0x68);
        send(&mut bus, &mut t, 0x91);
        stop(&mut bus, &mut t);
        assert_eq!(t.bytes, [0x68, 0x91]);
        assert_eq!(t.stops, 1);
        assert_eq!(bus.state(), BusState::Idle);
        assert!(bus.data_line(), "data released after STOP");
    }

    #[test]
    fn wrong_address_naks_and_ignores_the_rest() {
        let mut bus = I2cBus::new();
        let mut t = Recorder::default();
        start(&mut bus, &mut t);
        assert!(send(&mut bus, &mut t, 0x50), "NAK leaves data high");
        assert_eq!(bus.state(), BusState::Nak);
        send(&mut bus, &mut t, 0x68);
        assert!(t.bytes.is_empty());
        assert_eq!(bus.state(), BusState::Nak);
    }

    #[test]
    fn target_nak_rejects_the_byte() {
        let mut bus = I2cBus::new();
        let mut t = Recorder {
            nak_after: Some(1),
            ..Recorder::default()
        };
        start(&mut bus, &mut t);
        send(&mut bus, &mut t, 0x3a);
        assert!(!send(&mut bus, &mut t, 0x01));
        assert!(send(&mut bus, &mut t, 0x02), "second byte rejected");
        assert_eq!(bus.state(), BusState::Nak);
        assert!(bus.data_line(), "data released after NAK");

        assert!(send(&mut bus, &mut t, 0x03));
        assert_eq!(t.bytes, [0x01, 0x02], "bytes after a NAK are ignored");
        stop(&mut bus, &mut t);
        assert_eq!(bus.state(), BusState::Idle);
    }

    #[test]
    fn repeated_start_resets_address() {
        let mut bus = I2cBus::new();
        let mut t = Recorder::default();
        start(&mut bus, &mut t);
        send(&mut bus, &mut t, 0x3a);
        start(&mut bus, &mut t);
        assert_eq!(bus.address_state(), AddressState::Unknown);
        send(&mut bus, &mut t, 0x3b);
        assert_eq!(t.addresses, [0x3a, 0x3b]);
    }

    #[test]
    fn nak_outside_ack_is_an_error() {
        let mut bus = I2cBus::new();
        assert_eq!(bus.nak(), Err(BusError::NakOutsideAck(BusState::Idle)));
        assert_eq!(bus.state(), BusState::Idle);
    }

    #[test]
    fn repeated_levels_are_not_edges() {
        let mut bus = I2cBus::new();
        let mut t = Recorder::default();
        bus.set_data_line(true, &mut t);
        bus.set_clock_line(true, &mut t);
        assert_eq!(bus.state(), BusState::Idle);
        assert_eq!(t.stops, 0);
    }
}
