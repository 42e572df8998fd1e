//! Two-wire control bus abstraction
//!
//! The emulated device sees the control bus as two open-drain lines. The host
//! drives its side of each line with [`I2cLines::set_clock_line`] and
//! [`I2cLines::set_data_line`] and reads back the wired-AND of both sides.
//!
//! [`BitBangMaster`] is a host-side bus master that turns byte transactions
//! into the edge sequence a real controller would produce. It has no notion of
//! time; only the order of edges matters.

/// The device side of a two-wire, open-drain control bus.
pub trait I2cLines {
    /// Drive the clock line from the host side (`true` = released/high).
    fn set_clock_line(&mut self, level: bool);

    /// Drive the data line from the host side (`true` = released/high).
    fn set_data_line(&mut self, level: bool);

    /// Observed clock level: host drive AND device drive.
    fn clock_line(&self) -> bool;

    /// Observed data level: host drive AND device drive.
    fn data_line(&self) -> bool;
}

/// Errors reported by [`BitBangMaster`] transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// No device acknowledged the address byte.
    #[error("address byte {0:#04x} not acknowledged")]
    AddressNak(u8),
    /// The device stopped acknowledging part-way through a write.
    #[error("data byte {index} not acknowledged")]
    DataNak {
        /// Zero-based position of the rejected byte in the write buffer.
        index: usize,
    },
}

/// Edge-level bus master for driving an [`I2cLines`] implementation.
///
/// Addresses are 8-bit address bytes (7-bit address shifted left, R/W bit in
/// bit 0), matching how the device documents its `0x3a`/`0x3b` pair.
pub struct BitBangMaster<'a, L: I2cLines + ?Sized> {
    lines: &'a mut L,
}

impl<'a, L: I2cLines + ?Sized> BitBangMaster<'a, L> {
    /// Wrap a bus. Both lines are assumed to be idle (high).
    pub fn new(lines: &'a mut L) -> Self {
        Self { lines }
    }

    /// Access the underlying lines.
    pub fn lines(&mut self) -> &mut L {
        self.lines
    }

    /// Generate a START (or repeated START) condition.
    ///
    /// Leaves the clock low, ready for the first bit.
    pub fn start(&mut self) {
        // Clock is low (after a byte) or idle-high with data high, so raising
        // data here never looks like a STOP.
        self.lines.set_data_line(true);
        self.lines.set_clock_line(true);
        self.lines.set_data_line(false);
        self.lines.set_clock_line(false);
    }

    /// Generate a STOP condition, leaving both lines high.
    pub fn stop(&mut self) {
        self.lines.set_data_line(false);
        self.lines.set_clock_line(true);
        self.lines.set_data_line(true);
    }

    /// Clock one bit out, MSB-first framing is the caller's concern.
    fn write_bit(&mut self, bit: bool) {
        self.lines.set_data_line(bit);
        self.lines.set_clock_line(true);
        self.lines.set_clock_line(false);
    }

    /// Clock one bit in with the data line released.
    fn read_bit(&mut self) -> bool {
        self.lines.set_clock_line(true);
        let bit = self.lines.data_line();
        self.lines.set_clock_line(false);
        bit
    }

    /// Send one byte MSB first and sample the acknowledge slot.
    ///
    /// Returns `true` when the device pulled data low (ACK).
    pub fn write_byte(&mut self, byte: u8) -> bool {
        for bit in (0..8).rev() {
            self.write_bit((byte >> bit) & 1 != 0);
        }
        self.lines.set_data_line(true);
        !self.read_bit()
    }

    /// Receive one byte MSB first, then drive ACK (`ack = true`) or NAK.
    pub fn read_byte(&mut self, ack: bool) -> u8 {
        self.lines.set_data_line(true);
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | u8::from(self.read_bit());
        }
        self.write_bit(!ack);
        self.lines.set_data_line(true);
        byte
    }

    /// Complete write transaction: START, address, payload, STOP.
    ///
    /// # Errors
    ///
    /// Returns [`I2cError::AddressNak`] or [`I2cError::DataNak`]; the bus is
    /// always released with a STOP before returning.
    pub fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), I2cError> {
        self.start();
        if !self.write_byte(address) {
            self.stop();
            return Err(I2cError::AddressNak(address));
        }
        for (index, &byte) in bytes.iter().enumerate() {
            if !self.write_byte(byte) {
                self.stop();
                return Err(I2cError::DataNak { index });
            }
        }
        self.stop();
        Ok(())
    }

    /// Complete read transaction: START, address, `buf.len()` bytes, STOP.
    ///
    /// Every byte except the last is acknowledged by the master.
    ///
    /// # Errors
    ///
    /// Returns [`I2cError::AddressNak`] if the address is not acknowledged.
    pub fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), I2cError> {
        self.start();
        if !self.write_byte(address) {
            self.stop();
            return Err(I2cError::AddressNak(address));
        }
        let last = buf.len().saturating_sub(1);
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = self.read_byte(i != last);
        }
        self.stop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lines with no device attached: the host alone sets the levels.
    #[derive(Default)]
    struct PullUps {
        scl: bool,
        sda: bool,
        edges: std::vec::Vec<(char, bool)>,
    }

    impl I2cLines for PullUps {
        fn set_clock_line(&mut self, level: bool) {
            if level != self.scl {
                self.edges.push(('c', level));
            }
            self.scl = level;
        }
        fn set_data_line(&mut self, level: bool) {
            if level != self.sda {
                self.edges.push(('d', level));
            }
            self.sda = level;
        }
        fn clock_line(&self) -> bool {
            self.scl
        }
        fn data_line(&self) -> bool {
            self.sda
        }
    }

    fn idle() -> PullUps {
        PullUps {
            scl: true,
            sda: true,
            edges: std::vec::Vec::new(),
        }
    }

    #[test]
    fn start_is_data_fall_while_clock_high() {
        let mut bus = idle();
        BitBangMaster::new(&mut bus).start();
        assert_eq!(bus.edges, [('d', false), ('c', false)]);
    }

    #[test]
    fn stop_is_data_rise_while_clock_high() {
        let mut bus = idle();
        let mut m = BitBangMaster::new(&mut bus);
        m.start();
        m.stop();
        assert_eq!(bus.edges.last(), Some(&('d', true)));
        assert!(bus.scl && bus.sda);
    }

    #[test]
    fn write_without_device_is_address_nak() {
        let mut bus = idle();
        let result = BitBangMaster::new(&mut bus).write(0x3a, &[0x68]);
        assert_eq!(result, Err(I2cError::AddressNak(0x3a)));
    }

    #[test]
    fn data_never_changes_while_clock_high_inside_byte() {
        let mut bus = idle();
        let mut m = BitBangMaster::new(&mut bus);
        m.start();
        let _ = m.write_byte(0xa5);
        let mut clock = false;
        for &(line, level) in &bus.edges[2..] {
            match line {
                'c' => clock = level,
                _ => assert!(!clock, "data edge with clock high inside a byte"),
            }
        }
    }
}
