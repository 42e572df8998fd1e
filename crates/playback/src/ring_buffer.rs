//! Const-generic, stack-allocated byte ring for compressed input.
//!
//! `ByteRing<N>` stores up to `N` compressed bytes without heap allocation.
//! Unlike a classic ring it keeps its contents contiguous at the front of the
//! array, because the bitstream decoder wants one slice starting at the oldest
//! byte:
//!
//! - pushing into a full ring shifts everything left by one, evicting the
//!   oldest byte (lossy; the producer is never refused)
//! - consuming a decoded prefix shifts the remainder to the front
//!
//! Both shifts are observable through [`ByteRing::as_slice`].
//!
//! # Constraints
//!
//! - `no_std`, no `heapless` — the backing store lives inline in the owner.
//! - Not interrupt-safe or `Sync`; the device serialises all access.

/// A fixed-capacity, front-aligned byte buffer with evict-oldest semantics.
pub struct ByteRing<const N: usize> {
    buf: [u8; N],
    /// Number of valid bytes, always at `buf[..count]`.
    count: usize,
}

impl<const N: usize> ByteRing<N> {
    /// Create a new, empty ring.
    ///
    /// This function is `const` so that rings may be stored in `static`
    /// variables without a runtime initialiser.
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            count: 0,
        }
    }

    /// Append one byte, evicting the oldest byte first if the ring is full.
    ///
    /// Returns `true` when a byte was evicted.
    #[allow(clippy::arithmetic_side_effects)] // count < N after eviction, so count + 1 <= N
    pub fn push_evicting(&mut self, byte: u8) -> bool {
        if N == 0 {
            return false;
        }
        let evicted = self.count >= N;
        if evicted {
            self.buf.copy_within(1.., 0);
            self.count = N - 1;
        }
        if let Some(slot) = self.buf.get_mut(self.count) {
            *slot = byte;
            self.count += 1;
        }
        evicted
    }

    /// Remove the first `n` bytes, shifting the rest to the front.
    ///
    /// Consuming more than [`len`](Self::len) empties the ring.
    #[allow(clippy::arithmetic_side_effects)] // n <= count checked before subtraction
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.count);
        self.buf.copy_within(n..self.count, 0);
        self.count -= n;
    }

    /// Replace the contents with `bytes`.
    ///
    /// # Errors
    ///
    /// Returns `Err(())` if `bytes` does not fit; the ring is left unchanged.
    #[allow(clippy::result_unit_err)] // overflow is the only error; () is sufficient
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), ()> {
        let dst = self.buf.get_mut(..bytes.len()).ok_or(())?;
        dst.copy_from_slice(bytes);
        self.count = bytes.len();
        Ok(())
    }

    /// Discard all bytes and zero the storage.
    pub fn clear(&mut self) {
        self.buf.fill(0);
        self.count = 0;
    }

    /// The valid bytes, oldest first.
    pub fn as_slice(&self) -> &[u8] {
        self.buf.get(..self.count).unwrap_or(&[])
    }

    /// Number of bytes currently held.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Maximum number of bytes the ring can hold.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// `true` when no bytes are present.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `true` when the ring is completely full.
    pub fn is_full(&self) -> bool {
        self.count >= N
    }
}

impl<const N: usize> Default for ByteRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
