//! Register and memory map, and the configuration state it drives.
//!
//! Only a handful of cells have an effect in this model. The left→left and
//! right→right gain words set the output gains; the mute/bypass register
//! overrides both. Everything else is logged and kept in a small last-written
//! table for diagnostics.

use heapless::Vec;
use platform::audio_types::GainRegister;
use playback::volume::{gain_to_db, gain_to_percentage};
use serde::{Deserialize, Serialize};

use crate::command::Action;

/// Register addresses.
pub mod reg {
    /// DC/DC converter frequency.
    pub const DCCF: u32 = 0x8e;
    /// Mute/bypass; 1 mutes both outputs.
    pub const MUTE_BYPASS: u32 = 0xaa;
    /// Startup configuration.
    pub const STARTUP_CONFIG: u32 = 0xe6;
    /// Prescaler.
    pub const KPRESCALE: u32 = 0xe7;
    /// Bass tone control.
    pub const KBASS: u32 = 0x6b;
    /// Treble tone control.
    pub const KTREBLE: u32 = 0x6f;
}

/// Memory cells, keyed `bank << 16 | address`.
pub mod mem {
    /// PLL offset for 48 kHz streams.
    pub const PLL_OFFSET_48: u32 = 0x0032d;
    /// PLL offset for 44.1 kHz streams.
    pub const PLL_OFFSET_44: u32 = 0x0032e;
    /// Output configuration.
    pub const OUTPUT_CONFIG: u32 = 0x0032f;
    /// Left input to left output gain.
    pub const GAIN_LL: u32 = 0x107f8;
    /// Left input to right output gain.
    pub const GAIN_LR: u32 = 0x107f9;
    /// Right input to left output gain.
    pub const GAIN_RL: u32 = 0x107fa;
    /// Right input to right output gain.
    pub const GAIN_RR: u32 = 0x107fb;

    /// Combine a bank and a word address into a cell key.
    pub const fn key(bank: u8, address: u32) -> u32 {
        if bank != 0 {
            address | 0x10000
        } else {
            address
        }
    }
}

/// Program that validates the output configuration.
pub const PROGRAM_VALIDATE_OUTPUT_CONFIG: u32 = 0xfcb;

/// Entries kept per last-written table.
pub const TABLE_CAPACITY: usize = 16;

/// One remembered write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cell {
    /// Register address or memory key
    pub address: u32,
    /// Last value written
    pub value: u32,
}

/// Configuration written over the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    gain_ll: f32,
    gain_rr: f32,
    is_muted: bool,
    output_gain: [f32; 2],
    registers: Vec<Cell, TABLE_CAPACITY>,
    memory: Vec<Cell, TABLE_CAPACITY>,
}

impl DeviceConfig {
    /// Power-on configuration: gains zero, unmuted, outputs at unity.
    pub const fn new() -> Self {
        Self {
            gain_ll: 0.0,
            gain_rr: 0.0,
            is_muted: false,
            output_gain: [1.0, 1.0],
            registers: Vec::new(),
            memory: Vec::new(),
        }
    }

    /// Return to the power-on configuration.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Last computed left→left gain.
    pub fn gain_ll(&self) -> f32 {
        self.gain_ll
    }

    /// Last computed right→right gain.
    pub fn gain_rr(&self) -> f32 {
        self.gain_rr
    }

    /// Mute flag set by the mute/bypass register.
    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    /// Gains currently applied to the (left, right) outputs.
    pub fn output_gain(&self) -> (f32, f32) {
        let [left, right] = self.output_gain;
        (left, right)
    }

    /// Last value written to register `address`.
    pub fn register(&self, address: u32) -> Option<u32> {
        lookup(&self.registers, address)
    }

    /// Last value written to memory `address` in `bank`.
    pub fn memory(&self, bank: u8, address: u32) -> Option<u32> {
        lookup(&self.memory, mem::key(bank, address))
    }

    /// Apply a dispatched command.
    pub fn apply(&mut self, action: Action) {
        tracing::trace!(target: "mas3507d::register", action = ?action, "dispatch");
        match action {
            Action::RunProgram { address } => self.run_program(address),
            Action::WriteRegister { address, value } => self.reg_write(address, value),
            Action::WriteMemory { bank, address, value } => self.mem_write(bank, address, value),
            Action::ReadControl => tracing::debug!(target: "mas3507d::write", "READ_CTRL"),
            Action::ReadRegister => tracing::debug!(target: "mas3507d::write", "READ_REG"),
            Action::ReadMemory { bank } => {
                tracing::debug!(target: "mas3507d::write", bank, "READ_MEM");
            }
        }
    }

    /// Register write.
    pub fn reg_write(&mut self, address: u32, value: u32) {
        remember(&mut self.registers, address, value);
        match address {
            reg::DCCF => tracing::debug!(target: "mas3507d::config", "DCCF = {value:05x}"),
            reg::MUTE_BYPASS => {
                tracing::debug!(target: "mas3507d::config", "Mute/bypass = {value:05x}");
                self.is_muted = value == 1;
                self.output_gain = if self.is_muted {
                    [0.0, 0.0]
                } else {
                    [self.gain_ll, self.gain_rr]
                };
            }
            reg::STARTUP_CONFIG => {
                tracing::debug!(target: "mas3507d::config", "StartupConfig = {value:05x}");
            }
            reg::KPRESCALE => tracing::debug!(target: "mas3507d::config", "Kprescale = {value:05x}"),
            reg::KBASS => tracing::debug!(target: "mas3507d::config", "Kbass = {value:05x}"),
            reg::KTREBLE => tracing::debug!(target: "mas3507d::config", "Ktreble = {value:05x}"),
            _ => tracing::debug!(target: "mas3507d::config", "reg {address:02x} = {value:05x}"),
        }
    }

    /// Memory write.
    pub fn mem_write(&mut self, bank: u8, address: u32, value: u32) {
        let key = mem::key(bank, address);
        remember(&mut self.memory, key, value);
        let raw = GainRegister::new(value);
        match key {
            mem::PLL_OFFSET_48 => tracing::debug!(target: "mas3507d::config", "PLLOffset48 = {value:05x}"),
            mem::PLL_OFFSET_44 => tracing::debug!(target: "mas3507d::config", "PLLOffset44 = {value:05x}"),
            mem::OUTPUT_CONFIG => tracing::debug!(target: "mas3507d::config", "OutputConfig = {value:05x}"),
            mem::GAIN_LL => {
                self.gain_ll = gain_to_percentage(raw);
                log_gain("left->left", raw, self.gain_ll);
                if !self.is_muted {
                    self.output_gain[0] = self.gain_ll;
                }
            }
            mem::GAIN_LR => log_gain("left->right", raw, gain_to_percentage(raw)),
            mem::GAIN_RL => log_gain("right->left", raw, gain_to_percentage(raw)),
            mem::GAIN_RR => {
                self.gain_rr = gain_to_percentage(raw);
                log_gain("right->right", raw, self.gain_rr);
                if !self.is_muted {
                    self.output_gain[1] = self.gain_rr;
                }
            }
            _ => tracing::debug!(target: "mas3507d::config", "{bank}:{address:04x} = {value:05x}"),
        }
    }

    /// Program execution. Nothing is computed; known programs are logged.
    pub fn run_program(&mut self, address: u32) {
        match address {
            PROGRAM_VALIDATE_OUTPUT_CONFIG => {
                tracing::debug!(target: "mas3507d::config", "validate OutputConfig");
            }
            _ => tracing::debug!(target: "mas3507d::config", "run {address:04x}"),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn log_gain(path: &str, raw: GainRegister, percentage: f32) {
    tracing::debug!(
        target: "mas3507d::config",
        "{path} gain = {:05x} ({} dB, {percentage})",
        raw.get(),
        gain_to_db(raw)
    );
}

fn lookup(table: &[Cell], address: u32) -> Option<u32> {
    table.iter().find(|c| c.address == address).map(|c| c.value)
}

fn remember<const N: usize>(table: &mut Vec<Cell, N>, address: u32, value: u32) {
    if let Some(cell) = table.iter_mut().find(|c| c.address == address) {
        cell.value = value;
    } else if table.push(Cell { address, value }).is_err() {
        tracing::trace!(target: "mas3507d::register", address, "last-written table full");
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation, clippy::float_cmp)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn power_on_outputs_at_unity() {
        let c = DeviceConfig::new();
        assert_eq!(c.output_gain(), (1.0, 1.0));
        assert_eq!(c.gain_ll(), 0.0);
        assert!(!c.is_muted());
    }

    #[test]
    fn gain_words_set_outputs() {
        let mut c = DeviceConfig::new();
        c.mem_write(1, 0x7f8, 0x80000);
        c.mem_write(1, 0x7fb, 0xc0000);
        let (l, r) = c.output_gain();
        assert!(close(l, 1.995_262), "left {l}");
        assert!(close(r, 1.0), "right {r}");
    }

    #[test]
    fn cross_gains_are_not_applied() {
        let mut c = DeviceConfig::new();
        c.mem_write(1, 0x7f9, 0x80000);
        c.mem_write(1, 0x7fa, 0x80000);
        assert_eq!(c.output_gain(), (1.0, 1.0));
        assert_eq!(c.memory(1, 0x7f9), Some(0x80000));
    }

    #[test]
    fn bank_zero_gain_address_is_not_a_gain() {
        let mut c = DeviceConfig::new();
        c.mem_write(0, 0x7f8, 0x80000);
        assert_eq!(c.gain_ll(), 0.0);
        assert_eq!(c.memory(0, 0x7f8), Some(0x80000));
        assert_eq!(c.memory(1, 0x7f8), None);
    }

    #[test]
    fn mute_zeroes_and_unmute_restores() {
        let mut c = DeviceConfig::new();
        c.mem_write(1, 0x7f8, 0x80000);
        c.mem_write(1, 0x7fb, 0xc0000);
        let before = c.output_gain();
        c.reg_write(reg::MUTE_BYPASS, 1);
        assert!(c.is_muted());
        assert_eq!(c.output_gain(), (0.0, 0.0));
        c.reg_write(reg::MUTE_BYPASS, 0);
        assert!(!c.is_muted());
        assert_eq!(c.output_gain(), before);
    }

    #[test]
    fn gain_write_while_muted_is_deferred() {
        let mut c = DeviceConfig::new();
        c.reg_write(reg::MUTE_BYPASS, 1);
        c.mem_write(1, 0x7f8, 0xc0000);
        assert_eq!(c.output_gain(), (0.0, 0.0));
        c.reg_write(reg::MUTE_BYPASS, 0);
        assert!(close(c.output_gain().0, 1.0));
    }

    #[test]
    fn zero_gain_is_channel_mute() {
        let mut c = DeviceConfig::new();
        c.mem_write(1, 0x7fb, 0);
        assert_eq!(c.output_gain(), (1.0, 0.0));
        assert!(!c.is_muted());
    }

    #[test]
    fn last_written_table_updates_in_place() {
        let mut c = DeviceConfig::new();
        c.reg_write(reg::KBASS, 3);
        c.reg_write(reg::KBASS, 4);
        assert_eq!(c.register(reg::KBASS), Some(4));
        assert_eq!(c.register(reg::KTREBLE), None);
    }

    #[test]
    fn full_table_keeps_earliest_entries() {
        let mut c = DeviceConfig::new();
        for a in 0..(TABLE_CAPACITY as u32 + 4) {
            c.reg_write(0x100 + a, a);
        }
        assert_eq!(c.register(0x100), Some(0));
        assert_eq!(c.register(0x100 + TABLE_CAPACITY as u32), None);
    }

    #[test]
    fn apply_routes_actions() {
        let mut c = DeviceConfig::new();
        c.apply(Action::WriteRegister {
            address: reg::MUTE_BYPASS,
            value: 1,
        });
        assert!(c.is_muted());
        c.apply(Action::RunProgram {
            address: PROGRAM_VALIDATE_OUTPUT_CONFIG,
        });
        c.apply(Action::ReadMemory { bank: 0 });
        assert!(c.is_muted());
    }
}
