//! PS/2 over two GPIO lines.
//!
//! The host bit-bangs the protocol directly: Data and Clock are open-drain
//! GPIOs and every falling Clock edge raises an interrupt. The device owns the
//! clock; to write, the host inhibits the bus and issues a request-to-send,
//! after which the device clocks the host's bits in.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  send_byte   ┌──────────────────┐  drive/release  ┌──────────┐
//! │   Ps2<H>     │─────────────▶│  transmit::send  │────────────────▶│  Ps2Hal  │
//! │  (driver)    │              └──────────────────┘                 └──────────┘
//! └──────────────┘                       │ phase                          │
//!        │ get_byte/get_error            ▼                                │ falling edge
//!        │                     ┌───────────────────┐                      │
//!        └────────────────────▶│     Ps2Link       │◀─────────────────────┘
//!                              │ decoder, tx, ring │
//!                              │  status register  │
//!                              └───────────────────┘
//! ```
//!
//! # Error Register
//!
//! | Bit    | Name            | Description |
//! |--------|-----------------|-------------|
//! | 0x0001 | START_BIT       | Start bit was 1 |
//! | 0x0002 | TIMEOUT         | Receive stall or any send timeout |
//! | 0x0004 | PARITY          | Parity check failed |
//! | 0x0008 | STOP_BIT        | Stop bit was 0 |
//! | 0x0010 | BUFFER_OVERFLOW | Byte arrived with the queue full |
//! | 0x0100 | TX_CLOCK_LOW    | Clock did not go low in time |
//! | 0x0200 | TX_CLOCK_HIGH   | Clock did not go high in time |
//! | 0x0400 | TX_ACK_DATA     | Device did not ACK on Data |
//! | 0x0800 | TX_ACK_CLOCK    | Device did not release Clock after ACK |
//! | 0x1000 | TX_REQUEST      | No clocking after request-to-send |
//! | 0x2000 | TX_NO_RESPONSE  | No response byte |

pub mod config;
pub mod driver;
pub mod frame;
pub mod hal;
pub mod link;
pub mod status;
pub mod transmit;

pub use config::{OverflowPolicy, Ps2Config, config_from_cmdline};
pub use driver::Ps2;
pub use frame::{FrameDecoder, FrameEvent};
pub use hal::{DataLine, Ps2Hal, Ps2Pins};
pub use link::Ps2Link;
pub use status::StatusRegister;
pub use transmit::{TransmitSequencer, TxPhase};
