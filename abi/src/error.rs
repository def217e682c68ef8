//! Error flags and typed errors for the PS/2 engine.
//!
//! Two layers exist side by side:
//!
//! - [`Ps2ErrorFlags`] is the cumulative bitmap kept by the status register.
//!   Receive errors arise asynchronously while frames are clocked in; transmit
//!   errors can only arise in the course of a send.
//! - [`Ps2Error`] / [`TxFailure`] are returned synchronously by driver calls.
//!
//! Binding layers that only speak integers use [`encode_byte`] and
//! [`encode_send`], where a negative value always means failure.

use core::fmt;

use bitflags::bitflags;

use crate::pin::{PinError, PinId};

bitflags! {
    /// Cumulative communication error bitmap (read-and-clear).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Ps2ErrorFlags: u16 {
        /// Start bit was not 0.
        const START_BIT = 0x0001;
        /// A receive stall or any transmit timeout.
        const TIMEOUT = 0x0002;
        /// Parity bit did not make the frame odd.
        const PARITY = 0x0004;
        /// Stop bit was not 1.
        const STOP_BIT = 0x0008;
        /// Received byte arrived with the queue full.
        const BUFFER_OVERFLOW = 0x0010;
        /// Clock did not go low in time during a send.
        const TX_CLOCK_LOW = 0x0100;
        /// Clock did not go high in time during a send.
        const TX_CLOCK_HIGH = 0x0200;
        /// Device did not pull Data low for the ACK bit.
        const TX_ACK_DATA = 0x0400;
        /// Device did not release Clock after the ACK bit.
        const TX_ACK_CLOCK = 0x0800;
        /// Device did not start clocking after request-to-send.
        const TX_REQUEST = 0x1000;
        /// Device did not send a response byte in time.
        const TX_NO_RESPONSE = 0x2000;
    }
}

impl Ps2ErrorFlags {
    /// Flags raised by the receive path.
    pub const RECEIVE_MASK: Self = Self::START_BIT
        .union(Self::TIMEOUT)
        .union(Self::PARITY)
        .union(Self::STOP_BIT)
        .union(Self::BUFFER_OVERFLOW);

    /// Flags only a send can raise.
    pub const TRANSMIT_MASK: Self = Self::TX_CLOCK_LOW
        .union(Self::TX_CLOCK_HIGH)
        .union(Self::TX_ACK_DATA)
        .union(Self::TX_ACK_CLOCK)
        .union(Self::TX_REQUEST)
        .union(Self::TX_NO_RESPONSE);

    /// Frame-level errors that cause a received frame to be discarded.
    pub const FRAME_MASK: Self = Self::START_BIT.union(Self::PARITY).union(Self::STOP_BIT);

    #[inline]
    pub const fn has_frame_error(self) -> bool {
        self.intersects(Self::FRAME_MASK)
    }
}

/// Why a send did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxFailure {
    /// Device never started clocking after request-to-send.
    RequestTimeout,
    /// Clock sat high mid-byte: the device stopped pulsing.
    ClockLowTimeout,
    /// Clock held low mid-byte.
    ClockHighTimeout,
    /// ACK bit was high.
    NoAck,
    /// Clock still low after the ACK bit.
    AckClockTimeout,
    /// No response frame after the ACK.
    NoResponse,
    /// Response frame failed start, parity or stop checks.
    BadResponse(Ps2ErrorFlags),
}

impl TxFailure {
    /// Register bits recorded for this failure. A bad response keeps every
    /// flag the decoder raised, including a stall timeout.
    pub const fn flags(self) -> Ps2ErrorFlags {
        match self {
            Self::BadResponse(flags) => flags,
            Self::NoAck => self.detail(),
            _ => self.detail().union(Ps2ErrorFlags::TIMEOUT),
        }
    }

    /// The flag that distinguishes this failure from the others.
    pub const fn detail(self) -> Ps2ErrorFlags {
        match self {
            Self::RequestTimeout => Ps2ErrorFlags::TX_REQUEST,
            Self::ClockLowTimeout => Ps2ErrorFlags::TX_CLOCK_LOW,
            Self::ClockHighTimeout => Ps2ErrorFlags::TX_CLOCK_HIGH,
            Self::NoAck => Ps2ErrorFlags::TX_ACK_DATA,
            Self::AckClockTimeout => Ps2ErrorFlags::TX_ACK_CLOCK,
            Self::NoResponse => Ps2ErrorFlags::TX_NO_RESPONSE,
            Self::BadResponse(flags) => flags.intersection(Ps2ErrorFlags::FRAME_MASK),
        }
    }

    #[inline]
    pub const fn is_timeout(self) -> bool {
        self.flags().contains(Ps2ErrorFlags::TIMEOUT)
    }
}

impl fmt::Display for TxFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestTimeout => write!(f, "device did not answer request-to-send"),
            Self::ClockLowTimeout => write!(f, "clock did not go low in time"),
            Self::ClockHighTimeout => write!(f, "clock did not go high in time"),
            Self::NoAck => write!(f, "device did not acknowledge"),
            Self::AckClockTimeout => write!(f, "clock not released after acknowledge"),
            Self::NoResponse => write!(f, "no response byte"),
            Self::BadResponse(flags) => write!(f, "malformed response frame ({:#06x})", flags.bits()),
        }
    }
}

/// Driver configuration values the engine cannot run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Inhibit shorter than the protocol minimum; devices miss the request.
    InhibitTooShort(u32),
    /// A zero poll interval never yields to the clock interrupt.
    ZeroPollInterval,
    /// A zero stall window treats every inter-bit gap as a stall.
    ZeroStallWindow,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InhibitTooShort(us) => write!(f, "inhibit of {}us is below the minimum", us),
            Self::ZeroPollInterval => write!(f, "poll interval must be non-zero"),
            Self::ZeroStallWindow => write!(f, "receive stall window must be non-zero"),
        }
    }
}

/// Errors returned by driver operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ps2Error {
    /// The driver was deinitialised; no hardware was touched.
    Deinited,
    /// Data and clock were given the same pin.
    SamePin(PinId),
    /// The platform rejected a pin.
    Pin { pin: PinId, error: PinError },
    /// The link is already bound to another driver instance.
    LinkBusy,
    /// The configuration was rejected before any pin was touched.
    Config(ConfigError),
    /// A send failed.
    Transmit(TxFailure),
}

impl fmt::Display for Ps2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deinited => write!(f, "object has been deinitialized"),
            Self::SamePin(pin) => write!(f, "data and clock share {}", pin),
            Self::Pin { pin, error } => write!(f, "{}: {}", pin, error),
            Self::LinkBusy => write!(f, "link already bound to a driver"),
            Self::Config(error) => write!(f, "bad config: {}", error),
            Self::Transmit(failure) => write!(f, "send failed: {}", failure),
        }
    }
}

impl From<ConfigError> for Ps2Error {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

impl From<TxFailure> for Ps2Error {
    fn from(failure: TxFailure) -> Self {
        Self::Transmit(failure)
    }
}

/// Convenience result type for driver operations.
pub type Ps2Result<T = ()> = Result<T, Ps2Error>;

// =============================================================================
// Integer return codes
// =============================================================================

/// `get_byte` code when the queue is empty.
pub const GET_BYTE_EMPTY: i16 = -1;

/// Code for any call on a deinitialised driver.
pub const ERR_DEINITED: i16 = -0x4000;

/// Code for construction failures.
pub const ERR_CONFIG: i16 = -0x4001;

impl Ps2Error {
    /// Signed code for integer-only bindings. Always negative.
    pub const fn code(&self) -> i16 {
        match self {
            Self::Deinited => ERR_DEINITED,
            Self::SamePin(_) | Self::Pin { .. } | Self::LinkBusy | Self::Config(_) => ERR_CONFIG,
            Self::Transmit(failure) => -(failure.detail().bits() as i16),
        }
    }
}

/// Encode a `get_byte` result: the byte, or [`GET_BYTE_EMPTY`].
#[inline]
pub const fn encode_byte(byte: Option<u8>) -> i16 {
    match byte {
        Some(b) => b as i16,
        None => GET_BYTE_EMPTY,
    }
}

/// Encode a `send_byte` result: the response byte, or a negative error code.
#[inline]
pub const fn encode_send(result: &Ps2Result<u8>) -> i16 {
    match result {
        Ok(b) => *b as i16,
        Err(err) => err.code(),
    }
}
