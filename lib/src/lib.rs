#![cfg_attr(not(test), no_std)]
#![allow(unsafe_op_in_unsafe_fn)]

pub mod clock;
pub mod cpu;
pub mod klog;
pub mod ring_buffer;
pub mod spinlock;

pub use clock::Deadline;
pub use klog::{
    KlogLevel, klog_get_level, klog_init, klog_is_enabled, klog_register_backend, klog_set_level,
};
pub use ring_buffer::ByteRing;
pub use spinlock::{IrqMutex, IrqMutexGuard};
