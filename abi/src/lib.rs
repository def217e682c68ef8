//! ps2io shared types
//!
//! This crate holds the definitions shared between the protocol engine, the
//! platform glue that owns the GPIO pins, and any binding layer that exposes
//! the driver to callers. Keeping them here gives one source of truth for:
//! - wire-level constants (frame layout, command and response bytes)
//! - the error flag bitmap reported by the status register
//! - the signed return-code convention used by integer-only bindings

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pin;
pub mod ps2;

pub use error::*;
pub use pin::*;
pub use ps2::*;
