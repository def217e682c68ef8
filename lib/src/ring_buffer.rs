//! Fixed-capacity byte ring shared between an interrupt handler and a caller.
//!
//! One producer (interrupt context) and one consumer (caller context). Head
//! and tail are free-running counters; the slot index is the counter masked by
//! `N - 1`, so `N` must be a power of two. Slots are atomics, which keeps the
//! drop-oldest path sound when the producer reclaims a slot the consumer is
//! about to read.

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

pub struct ByteRing<const N: usize> {
    slots: [AtomicU8; N],
    /// Next slot the producer writes.
    head: AtomicU32,
    /// Next slot the consumer reads.
    tail: AtomicU32,
}

impl<const N: usize> ByteRing<N> {
    const CAPACITY_OK: () = assert!(N.is_power_of_two() && N <= (u32::MAX / 2) as usize);
    const MASK: u32 = (N as u32).wrapping_sub(1);

    /// Create an empty ring. Const so it can live in a `static`.
    pub const fn new() -> Self {
        let () = Self::CAPACITY_OK;
        Self {
            slots: [const { AtomicU8::new(0) }; N],
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
        }
    }

    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns the current number of bytes in the ring.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        (head.wrapping_sub(tail) as usize).min(N)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    #[inline(always)]
    fn slot(&self, index: u32) -> &AtomicU8 {
        &self.slots[(index & Self::MASK) as usize]
    }

    /// Push without overwrite; returns true on success, false if full.
    ///
    /// Producer side only. On failure the new byte is dropped and the
    /// buffered bytes are untouched.
    #[inline]
    pub fn push(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head.wrapping_sub(tail) as usize >= N {
            return false;
        }
        self.slot(head).store(byte, Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    /// Push with overwrite of the oldest byte when full.
    ///
    /// Producer side only. Returns false if a byte had to be dropped.
    #[inline]
    pub fn push_overwrite(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let mut dropped = false;
        if head.wrapping_sub(tail) as usize >= N {
            // Losing this race means the consumer just freed the slot.
            dropped = self
                .tail
                .compare_exchange(
                    tail,
                    tail.wrapping_add(1),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok();
        }
        self.slot(head).store(byte, Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        !dropped
    }

    /// Pop the oldest byte; returns `None` when empty.
    ///
    /// Consumer side only.
    #[inline]
    pub fn pop(&self) -> Option<u8> {
        loop {
            let tail = self.tail.load(Ordering::Acquire);
            let head = self.head.load(Ordering::Acquire);
            if head == tail {
                return None;
            }
            let byte = self.slot(tail).load(Ordering::Relaxed);
            if self
                .tail
                .compare_exchange(
                    tail,
                    tail.wrapping_add(1),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                return Some(byte);
            }
        }
    }

    /// Peek at the oldest byte without removing it.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        Some(self.slot(tail).load(Ordering::Relaxed))
    }

    /// Discard everything buffered. Consumer side only.
    #[inline]
    pub fn clear(&self) {
        let head = self.head.load(Ordering::Acquire);
        self.tail.store(head, Ordering::Release);
    }
}

impl<const N: usize> Default for ByteRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
