use ps2io_abi::{
    ACK_RELEASE_TIMEOUT_US, ConfigError, INHIBIT_MIN_US, REQUEST_TO_SEND_TIMEOUT_US, RESPONSE_TIMEOUT_US,
    TRANSFER_TIMEOUT_US,
};

const DEFAULT_POLL_INTERVAL_US: u32 = 10;
const DEFAULT_OVERFLOW: OverflowPolicy = OverflowPolicy::DropNewest;
const DEFAULT_RX_STALL_US: Option<u32> = None;

/// Stall window used when `ps2.rx_stall=on` is given without a duration.
const DEFAULT_RX_STALL_ON_US: u32 = 100;

/// What to do with a received byte when the queue is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Keep the queue, discard the new byte.
    DropNewest,
    /// Discard the oldest queued byte to make room.
    DropOldest,
}

impl OverflowPolicy {
    pub fn from_str(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("newest") || value.eq_ignore_ascii_case("drop_newest") {
            Some(OverflowPolicy::DropNewest)
        } else if value.eq_ignore_ascii_case("oldest") || value.eq_ignore_ascii_case("drop_oldest")
        {
            Some(OverflowPolicy::DropOldest)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverflowPolicy::DropNewest => "newest",
            OverflowPolicy::DropOldest => "oldest",
        }
    }
}

impl core::fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Timing windows and queue behaviour of one driver instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ps2Config {
    /// How long Clock is held low before request-to-send.
    pub inhibit_us: u32,
    pub request_timeout_us: u32,
    pub transfer_timeout_us: u32,
    pub ack_release_timeout_us: u32,
    pub response_timeout_us: u32,
    /// Sleep between polls while a send waits on the device.
    pub poll_interval_us: u32,
    pub overflow: OverflowPolicy,
    /// Inter-bit gap after which a partial frame is dropped.
    pub rx_stall_us: Option<u32>,
}

impl Default for Ps2Config {
    fn default() -> Self {
        Self {
            inhibit_us: INHIBIT_MIN_US,
            request_timeout_us: REQUEST_TO_SEND_TIMEOUT_US,
            transfer_timeout_us: TRANSFER_TIMEOUT_US,
            ack_release_timeout_us: ACK_RELEASE_TIMEOUT_US,
            response_timeout_us: RESPONSE_TIMEOUT_US,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
            overflow: DEFAULT_OVERFLOW,
            rx_stall_us: DEFAULT_RX_STALL_US,
        }
    }
}

impl Ps2Config {
    /// Reject values the protocol engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inhibit_us < INHIBIT_MIN_US {
            return Err(ConfigError::InhibitTooShort(self.inhibit_us));
        }
        if self.poll_interval_us == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.rx_stall_us == Some(0) {
            return Err(ConfigError::ZeroStallWindow);
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("on")
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("enabled")
        || value == "1"
    {
        Some(true)
    } else if value.eq_ignore_ascii_case("off")
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("no")
        || value.eq_ignore_ascii_case("disabled")
        || value == "0"
    {
        Some(false)
    } else {
        None
    }
}

/// Parse `250`, `250us` or `3ms` into microseconds.
fn parse_us(value: &str) -> Option<u32> {
    if let Some(ms) = value.strip_suffix("ms") {
        ms.parse::<u32>().ok()?.checked_mul(1000)
    } else {
        value.trim_end_matches("us").parse::<u32>().ok()
    }
}

/// Build a config from whitespace separated `ps2.<key>=<value>` tokens.
/// Unknown keys and unparsable values leave the default in place.
pub fn config_from_cmdline(cmdline: Option<&str>) -> Ps2Config {
    let mut cfg = Ps2Config::default();
    if let Some(cmdline) = cmdline {
        for token in cmdline.split_whitespace() {
            let Some((key, value)) = token
                .strip_prefix("ps2.")
                .and_then(|rest| rest.split_once('='))
            else {
                continue;
            };
            match key {
                "inhibit" => {
                    if let Some(us) = parse_us(value) {
                        // Below the protocol minimum the device may not notice.
                        cfg.inhibit_us = us.max(INHIBIT_MIN_US);
                    }
                }
                "request_timeout" => {
                    if let Some(us) = parse_us(value) {
                        cfg.request_timeout_us = us;
                    }
                }
                "transfer_timeout" => {
                    if let Some(us) = parse_us(value) {
                        cfg.transfer_timeout_us = us;
                    }
                }
                "ack_timeout" => {
                    if let Some(us) = parse_us(value) {
                        cfg.ack_release_timeout_us = us;
                    }
                }
                "response_timeout" => {
                    if let Some(us) = parse_us(value) {
                        cfg.response_timeout_us = us;
                    }
                }
                "poll" => {
                    if let Some(us) = parse_us(value) {
                        cfg.poll_interval_us = us.max(1);
                    }
                }
                "overflow" => {
                    if let Some(policy) = OverflowPolicy::from_str(value) {
                        cfg.overflow = policy;
                    }
                }
                "rx_stall" => {
                    if let Some(enabled) = parse_bool(value) {
                        cfg.rx_stall_us = enabled.then_some(DEFAULT_RX_STALL_ON_US);
                    } else if let Some(us) = parse_us(value) {
                        // A zero window reads as "off".
                        cfg.rx_stall_us = (us > 0).then_some(us);
                    }
                }
                _ => {}
            }
        }
    }
    cfg
}
