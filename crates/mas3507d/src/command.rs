//! Command interpreter.
//!
//! Turns the byte stream of an addressed bus transaction into device actions.
//! The first data byte after the address selects a [`SubDestination`]; on the
//! data-write sub-destination the next byte selects a [`PendingCommand`], whose
//! operands are assembled from the bytes that follow.
//!
//! | first command byte | command        | operand bytes                                   |
//! |--------------------|----------------|-------------------------------------------------|
//! | `0x0n` / `0x1n`    | run program    | 1: address low byte                             |
//! | `0x3-`             | read control   | none                                            |
//! | `0x9r`             | write register | 3: `a:v0`, `v[19:12]`, `v[11:4]`                |
//! | `0xa-` / `0xb-`    | write memory   | 1 ignored, count (BE16), base (BE16), 4 per word |
//! | `0xd-`             | read register  | none                                            |
//! | `0xe-` / `0xf-`    | read memory    | none                                            |
//!
//! Operand overruns are reported as [`Overrun`]; the bus answers them with
//! NAK.

use platform::config::{I2C_CONTROL_WRITE, I2C_DATA_READ, I2C_DATA_WRITE, I2C_DEVICE_READ, I2C_DEVICE_WRITE};
use serde::{Deserialize, Serialize};

/// Logical target of a transaction, chosen by its first data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubDestination {
    /// Nothing selected yet.
    Undefined,
    /// Control bytes; logged only.
    Control,
    /// Command stream.
    DataWrite,
    /// Read-back of the decoded-frame counter.
    DataRead,
    /// Unknown selector; bytes are dropped.
    Bad,
}

/// Command selected by the first data-write byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PendingCommand {
    /// Run a DSP program.
    Run,
    /// Write a 20-bit register.
    WriteReg,
    /// Write one or more 20-bit memory words.
    WriteMem,
    /// Read a register.
    ReadReg,
    /// Read memory.
    ReadMem,
    /// Read the control word.
    ReadCtrl,
    /// Unknown command nibble.
    Bad,
}

/// A fully assembled command, ready to be applied to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Execute the program at `address`.
    RunProgram {
        /// Program address
        address: u32,
    },
    /// Store `value` in register `address`.
    WriteRegister {
        /// Register address
        address: u32,
        /// 20-bit value
        value: u32,
    },
    /// Store `value` at `address` in memory `bank`.
    WriteMemory {
        /// 0 = D0, 1 = D1
        bank: u8,
        /// Word address
        address: u32,
        /// 20-bit value
        value: u32,
    },
    /// Read-control request.
    ReadControl,
    /// Read-register request.
    ReadRegister,
    /// Read-memory request.
    ReadMemory {
        /// 0 = D0, 1 = D1
        bank: u8,
    },
}

/// A command received more bytes than its operands take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("{subdest:?}/{command:?} overrun at byte {position}")]
pub struct Overrun {
    /// Sub-destination of the transaction
    pub subdest: SubDestination,
    /// Command being assembled
    pub command: PendingCommand,
    /// Position of the rejected byte after the selector
    pub position: u32,
}

/// Pack the decoded-frame counter into the order the host reads it back:
/// bits 15..8, 7..0, then 31..24, 23..16.
pub fn frame_count_payload(frames: u32) -> u32 {
    let [b31, b23, b15, b7] = frames.to_be_bytes();
    u32::from_le_bytes([b15, b7, b31, b23])
}

/// Byte-level interpreter for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInterpreter {
    subdest: SubDestination,
    command: PendingCommand,
    position: u32,
    bank: u8,
    address: u32,
    count: u32,
    value: u32,
    payload: u32,
}

impl CommandInterpreter {
    /// An interpreter with no session state.
    pub const fn new() -> Self {
        Self {
            subdest: SubDestination::Undefined,
            command: PendingCommand::Bad,
            position: 0,
            bank: 0,
            address: 0,
            count: 0,
            value: 0,
            payload: 0,
        }
    }

    /// Forget the session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current sub-destination.
    pub fn subdestination(&self) -> SubDestination {
        self.subdest
    }

    /// Command being assembled on the data-write sub-destination.
    pub fn command(&self) -> PendingCommand {
        self.command
    }

    /// Bytes accepted since the sub-destination was selected.
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Pending read payload.
    pub fn payload(&self) -> u32 {
        self.payload
    }

    /// Check an address byte.
    ///
    /// The read address pre-selects data-read; any other address clears the
    /// sub-destination. Both directions of the device address match.
    pub fn address(&mut self, byte: u8) -> bool {
        self.subdest = if byte == I2C_DEVICE_READ {
            SubDestination::DataRead
        } else {
            SubDestination::Undefined
        };
        byte & 0xfe == I2C_DEVICE_WRITE
    }

    /// Level to drive for bit `bit` of the current byte.
    ///
    /// Outside data-read the payload is dropped and nothing is sourced.
    pub fn read_bit(&mut self, bit: u8) -> Option<bool> {
        if self.subdest != SubDestination::DataRead {
            self.payload = 0;
            return None;
        }
        let index = self
            .position
            .checked_mul(8)
            .and_then(|base| base.checked_add(u32::from(bit)));
        Some(
            index
                .and_then(|i| self.payload.checked_shr(i))
                .is_some_and(|v| v & 1 != 0),
        )
    }

    /// A STOP ended the transaction.
    ///
    /// The sub-destination, position and payload survive; a host selects
    /// data-read with `0x69`, stops, then reads through the read address.
    pub fn stop(&mut self) {
        tracing::trace!(target: "mas3507d::other", "got stop");
    }

    /// Interpret one completed data byte.
    ///
    /// `frames` is the decoded-frame counter, latched into the read payload
    /// when data-read is selected.
    ///
    /// # Errors
    ///
    /// Returns [`Overrun`] when the byte does not fit the current command;
    /// the byte is not counted.
    pub fn byte(&mut self, byte: u8, frames: u32) -> Result<Option<Action>, Overrun> {
        match self.subdest {
            SubDestination::Undefined => {
                self.select(byte, frames);
                Ok(None)
            }
            SubDestination::Bad => {
                tracing::trace!(target: "mas3507d::other", byte, "dropping byte");
                Ok(None)
            }
            SubDestination::Control => {
                tracing::trace!(target: "mas3507d::other", byte, "control byte");
                Ok(None)
            }
            SubDestination::DataRead => {
                match self.position {
                    0 => self.value = u32::from(byte),
                    1 => self.value |= u32::from(byte) << 8,
                    _ => return Err(self.overrun()),
                }
                tracing::trace!(
                    target: "mas3507d::read",
                    position = self.position,
                    byte,
                    value = self.value,
                    "data read"
                );
                self.position = self.position.saturating_add(1);
                Ok(None)
            }
            SubDestination::DataWrite => {
                let action = if self.position == 0 {
                    self.begin_command(byte)
                } else {
                    self.operand(byte)?
                };
                self.position = self.position.saturating_add(1);
                Ok(action)
            }
        }
    }

    fn select(&mut self, byte: u8, frames: u32) {
        self.subdest = match byte {
            I2C_DATA_WRITE => SubDestination::DataWrite,
            I2C_DATA_READ => {
                self.payload = frame_count_payload(frames);
                SubDestination::DataRead
            }
            I2C_CONTROL_WRITE => SubDestination::Control,
            _ => SubDestination::Bad,
        };
        self.position = 0;
        self.value = 0;
    }

    fn overrun(&self) -> Overrun {
        Overrun {
            subdest: self.subdest,
            command: self.command,
            position: self.position,
        }
    }

    fn begin_command(&mut self, byte: u8) -> Option<Action> {
        let nibble = byte >> 4;
        let (command, action) = match nibble {
            0 | 1 => {
                self.address = u32::from(byte & 0x0f) << 8;
                (PendingCommand::Run, None)
            }
            3 => (PendingCommand::ReadCtrl, Some(Action::ReadControl)),
            9 => {
                self.address = u32::from(byte & 0x0f) << 4;
                (PendingCommand::WriteReg, None)
            }
            0xa | 0xb => {
                self.bank = nibble & 1;
                (PendingCommand::WriteMem, None)
            }
            0xd => (PendingCommand::ReadReg, Some(Action::ReadRegister)),
            0xe | 0xf => {
                self.bank = nibble & 1;
                (PendingCommand::ReadMem, Some(Action::ReadMemory { bank: self.bank }))
            }
            _ => (PendingCommand::Bad, None),
        };
        tracing::trace!(target: "mas3507d::write", byte, command = ?command, "command selected");
        self.command = command;
        action
    }

    #[allow(clippy::arithmetic_side_effects)] // position >= 6 checked; shifts of widened bytes stay below 2^20
    fn operand(&mut self, byte: u8) -> Result<Option<Action>, Overrun> {
        let b = u32::from(byte);
        match self.command {
            PendingCommand::WriteReg => match self.position {
                1 => {
                    self.address |= b >> 4;
                    self.value = b & 0x0f;
                }
                2 => self.value |= b << 12,
                3 => {
                    self.value |= b << 4;
                    return Ok(Some(Action::WriteRegister {
                        address: self.address,
                        value: self.value,
                    }));
                }
                _ => return Err(self.overrun()),
            },
            PendingCommand::Run => {
                if self.position > 1 {
                    return Err(self.overrun());
                }
                self.address |= b;
                return Ok(Some(Action::RunProgram { address: self.address }));
            }
            PendingCommand::WriteMem => match self.position {
                1 => {}
                2 => self.count = b << 8,
                3 => self.count |= b,
                4 => self.address = b << 8,
                5 => self.address |= b,
                pos => {
                    let word = (pos - 6) >> 2;
                    if word >= self.count {
                        return Err(self.overrun());
                    }
                    match (pos - 6) & 3 {
                        0 => self.value = b << 8,
                        1 => self.value |= b,
                        3 => {
                            self.value |= (b & 0x0f) << 16;
                            return Ok(Some(Action::WriteMemory {
                                bank: self.bank,
                                address: self.address.wrapping_add(word),
                                value: self.value,
                            }));
                        }
                        _ => {}
                    }
                }
            },
            PendingCommand::ReadReg
            | PendingCommand::ReadMem
            | PendingCommand::ReadCtrl
            | PendingCommand::Bad => {
                tracing::trace!(target: "mas3507d::write", byte, "ignoring byte");
            }
        }
        Ok(None)
    }
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::new()
    }
}
