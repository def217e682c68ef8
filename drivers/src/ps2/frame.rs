//! Device-to-host frame decoder.
//!
//! Fed one Data sample per falling Clock edge. Bit 0 is the start bit, bits
//! 1-8 carry the byte LSB first, bit 9 is odd parity and bit 10 the stop bit.
//! The parity verdict is held until the stop edge so a bad frame is always
//! consumed whole and its stop bit is never mistaken for a new start bit.

use ps2io_abi::{FRAME_PARITY_BIT, FRAME_START_BIT, FRAME_STOP_BIT, Ps2ErrorFlags};

/// Outcome of one sampled edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Mid-frame, or idle with nothing to report.
    Pending,
    /// A frame passed all checks.
    Byte(u8),
    /// Flags to raise. Frame errors mean the frame was discarded.
    Error(Ps2ErrorFlags),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    Idle,
    Receiving {
        /// Index of the next bit expected on the wire.
        bit_index: u8,
        shift: u8,
        ones: u8,
        parity_ok: bool,
    },
}

pub struct FrameDecoder {
    state: RxState,
    last_edge_us: u64,
    /// Partial frames older than this are dropped. `None` disables resync.
    stall_us: Option<u32>,
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            state: RxState::Idle,
            last_edge_us: 0,
            stall_us: None,
        }
    }

    /// Abandon any partial frame.
    #[inline]
    pub fn reset(&mut self) {
        self.state = RxState::Idle;
    }

    #[inline]
    pub fn set_stall_window(&mut self, stall_us: Option<u32>) {
        self.stall_us = stall_us;
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == RxState::Idle
    }

    /// Bits of the current frame seen so far (0 when idle).
    #[inline]
    pub fn bits_seen(&self) -> u8 {
        match self.state {
            RxState::Idle => 0,
            RxState::Receiving { bit_index, .. } => bit_index,
        }
    }

    /// Consume the Data level sampled at one falling Clock edge.
    pub fn sample(&mut self, data_high: bool, now_us: u64) -> FrameEvent {
        let mut raised = Ps2ErrorFlags::empty();

        if let (RxState::Receiving { .. }, Some(window)) = (self.state, self.stall_us) {
            if now_us.saturating_sub(self.last_edge_us) > window as u64 {
                // The device went quiet mid-frame; this edge starts over.
                self.state = RxState::Idle;
                raised |= Ps2ErrorFlags::TIMEOUT;
            }
        }
        self.last_edge_us = now_us;

        match self.state {
            RxState::Idle => {
                if data_high {
                    raised |= Ps2ErrorFlags::START_BIT;
                } else {
                    self.state = RxState::Receiving {
                        bit_index: FRAME_START_BIT + 1,
                        shift: 0,
                        ones: 0,
                        parity_ok: false,
                    };
                }
            }
            RxState::Receiving {
                bit_index,
                shift,
                ones,
                parity_ok,
            } => {
                let bit = data_high as u8;
                if bit_index < FRAME_PARITY_BIT {
                    self.state = RxState::Receiving {
                        bit_index: bit_index + 1,
                        shift: shift | (bit << (bit_index - 1)),
                        ones: ones + bit,
                        parity_ok,
                    };
                } else if bit_index == FRAME_PARITY_BIT {
                    self.state = RxState::Receiving {
                        bit_index: FRAME_STOP_BIT,
                        shift,
                        ones,
                        parity_ok: (ones + bit) % 2 == 1,
                    };
                } else {
                    self.state = RxState::Idle;
                    if !parity_ok {
                        raised |= Ps2ErrorFlags::PARITY;
                    }
                    if !data_high {
                        raised |= Ps2ErrorFlags::STOP_BIT;
                    }
                    if raised.is_empty() {
                        return FrameEvent::Byte(shift);
                    }
                }
            }
        }

        if raised.is_empty() {
            FrameEvent::Pending
        } else {
            FrameEvent::Error(raised)
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
