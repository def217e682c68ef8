//! Read-and-clear error register.
//!
//! Raised from interrupt context and from the send path, read by the caller.
//! A single atomic word means raising never blocks and a read never misses a
//! flag raised concurrently: it either lands before the swap and is returned,
//! or after it and is kept for the next read.

use core::sync::atomic::{AtomicU16, Ordering};

use ps2io_abi::Ps2ErrorFlags;

pub struct StatusRegister {
    bits: AtomicU16,
}

impl StatusRegister {
    pub const fn new() -> Self {
        Self {
            bits: AtomicU16::new(0),
        }
    }

    #[inline]
    pub fn raise(&self, flags: Ps2ErrorFlags) {
        if !flags.is_empty() {
            self.bits.fetch_or(flags.bits(), Ordering::AcqRel);
        }
    }

    /// Current flags, left in place.
    #[inline]
    pub fn peek(&self) -> Ps2ErrorFlags {
        Ps2ErrorFlags::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }

    /// Everything raised since the last take; the register is left empty.
    #[inline]
    pub fn take(&self) -> Ps2ErrorFlags {
        Ps2ErrorFlags::from_bits_truncate(self.bits.swap(0, Ordering::AcqRel))
    }

    #[inline]
    pub fn clear(&self) {
        self.bits.store(0, Ordering::Release);
    }
}

impl Default for StatusRegister {
    fn default() -> Self {
        Self::new()
    }
}
