//! Host-side harness for the PS/2 engine.
//!
//! [`sim`] provides a simulated bus and keyboard implementing the driver's
//! HAL; [`log_capture`] collects klog output so tests can assert on it. The
//! end-to-end suites live next to them as `#[cfg(test)]` modules.


pub use sim::{
    DeviceMode, Keyboard, SIM_CLOCK, SIM_DATA, SIM_NO_IRQ, SimPlatform, leak_link, open,
};

#[cfg(test)]
mod rx_tests;
#[cfg(test)]
mod tx_tests;
