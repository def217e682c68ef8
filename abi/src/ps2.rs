//! PS/2 wire protocol constants.
//!
//! # Frame layout (device to host)
//!
//! | Bit | Name   | Value |
//! |-----|--------|-------|
//! | 0   | START  | always 0 |
//! | 1-8 | DATA   | LSB first |
//! | 9   | PARITY | odd parity over DATA |
//! | 10  | STOP   | always 1 |
//!
//! Host to device frames reuse the same layout and add an ACK window after
//! the stop bit, during which the device pulls Data low.

// =============================================================================
// Frame Layout
// =============================================================================

/// Bits in a device-to-host frame.
pub const FRAME_BITS: u8 = 11;

/// Bit index of the start bit.
pub const FRAME_START_BIT: u8 = 0;

/// Bit index of the parity bit.
pub const FRAME_PARITY_BIT: u8 = 9;

/// Bit index of the stop bit.
pub const FRAME_STOP_BIT: u8 = 10;

/// Data bits per frame.
pub const FRAME_DATA_BITS: u8 = 8;

/// Received-byte queue capacity (power of two).
pub const RX_QUEUE_CAPACITY: usize = 16;

// =============================================================================
// Device Commands (host to device)
// =============================================================================

/// Set keyboard LEDs (followed by one data byte).
pub const DEV_CMD_SET_LEDS: u8 = 0xED;

/// Echo (device answers 0xEE instead of ACK).
pub const DEV_CMD_ECHO: u8 = 0xEE;

/// Identify device (ACK followed by 0-2 id bytes).
pub const DEV_CMD_IDENTIFY: u8 = 0xF2;

/// Set typematic rate / sample rate (followed by one data byte).
pub const DEV_CMD_SET_RATE: u8 = 0xF3;

/// Enable data reporting.
pub const DEV_CMD_ENABLE: u8 = 0xF4;

/// Disable data reporting.
pub const DEV_CMD_DISABLE: u8 = 0xF5;

/// Set device defaults.
pub const DEV_CMD_DEFAULTS: u8 = 0xF6;

/// Resend last byte.
pub const DEV_CMD_RESEND: u8 = 0xFE;

/// Reset and run self test (ACK followed by 0xAA).
pub const DEV_CMD_RESET: u8 = 0xFF;

// =============================================================================
// Device Responses (device to host)
// =============================================================================

/// Device acknowledge response.
pub const DEV_ACK: u8 = 0xFA;

/// Device resend request.
pub const DEV_RESEND: u8 = 0xFE;

/// Self test passed.
pub const DEV_SELF_TEST_OK: u8 = 0xAA;

/// Echo response.
pub const DEV_ECHO: u8 = 0xEE;

// =============================================================================
// Timing (PS/2 standard)
// =============================================================================

/// Minimum time the host holds Clock low before a request to send.
pub const INHIBIT_MIN_US: u32 = 100;

/// Device must start clocking within this window after a request to send.
pub const REQUEST_TO_SEND_TIMEOUT_US: u32 = 15_000;

/// A host-to-device byte must be fully clocked within this window.
pub const TRANSFER_TIMEOUT_US: u32 = 2_000;

/// Window for the device to release Clock after the ACK bit.
pub const ACK_RELEASE_TIMEOUT_US: u32 = 500;

/// Window for the device to start the response frame after ACK.
pub const RESPONSE_TIMEOUT_US: u32 = 25_000;

/// Shortest legal clock half period (16.7 kHz).
pub const CLOCK_HALF_PERIOD_MIN_US: u32 = 30;

/// Longest legal clock half period (10 kHz).
pub const CLOCK_HALF_PERIOD_MAX_US: u32 = 50;

/// Odd parity bit for `byte`: 1 when `byte` has an even number of ones.
#[inline]
pub const fn odd_parity(byte: u8) -> bool {
    byte.count_ones() % 2 == 0
}

/// Line levels of a complete device-to-host frame for `byte`, in wire order.
pub const fn frame_bits(byte: u8) -> [bool; FRAME_BITS as usize] {
    let mut bits = [false; FRAME_BITS as usize];
    let mut i = 0;
    while i < FRAME_DATA_BITS as usize {
        bits[FRAME_START_BIT as usize + 1 + i] = (byte >> i) & 1 != 0;
        i += 1;
    }
    bits[FRAME_PARITY_BIT as usize] = odd_parity(byte);
    bits[FRAME_STOP_BIT as usize] = true;
    bits
}
