//! Pin identity and pin-level failures reported by the platform.

use core::fmt;

/// Platform-assigned GPIO number.
///
/// The engine never interprets the value; it is handed back to the platform
/// for every line operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub u16);

impl PinId {
    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Reasons a platform refuses a pin at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// No such pin on this board.
    NoSuchPin,
    /// Pin already claimed by another driver.
    InUse,
    /// Pin cannot raise edge interrupts (required for the clock line).
    NoEdgeInterrupt,
    /// The interrupt controller refused the registration.
    IrqUnavailable,
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchPin => write!(f, "no such pin"),
            Self::InUse => write!(f, "pin in use"),
            Self::NoEdgeInterrupt => write!(f, "pin does not support edge interrupts"),
            Self::IrqUnavailable => write!(f, "edge interrupt unavailable"),
        }
    }
}
