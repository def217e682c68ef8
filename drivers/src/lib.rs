#![cfg_attr(not(test), no_std)]

pub mod ps2;

pub use ps2::{
    DataLine, FrameDecoder, OverflowPolicy, Ps2, Ps2Config, Ps2Hal, Ps2Link, Ps2Pins,
    StatusRegister, TransmitSequencer, TxPhase, config_from_cmdline,
};
