use paste::paste;
use ps2io_abi::{
    DEV_ACK, DEV_CMD_DEFAULTS, DEV_CMD_DISABLE, DEV_CMD_ECHO, DEV_CMD_ENABLE, DEV_CMD_IDENTIFY,
    DEV_CMD_RESET, DEV_CMD_SET_LEDS, DEV_CMD_SET_RATE, DEV_ECHO, DEV_RESEND, DEV_SELF_TEST_OK,
    Ps2Error, Ps2ErrorFlags, TxFailure, encode_send,
};
use ps2io_drivers::{Ps2, Ps2Config, Ps2Hal, TxPhase};

use crate::log_capture;
use crate::sim::{DeviceMode, KEYBOARD_ID, SIM_CLOCK, SIM_DATA, SimPlatform, leak_link, open};

fn drain(ps2: &mut Ps2<SimPlatform>) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(byte) = ps2.get_byte().unwrap() {
        out.push(byte);
    }
    out
}

// =============================================================================
// Commands against a well-behaved keyboard
// =============================================================================

macro_rules! command_cases {
    ($($name:ident: $cmd:expr => $resp:expr $(, then [$($extra:expr),*])?;)*) => {
        paste! {
            $(
                #[test]
                fn [<test_command_ $name>]() {
                    let sim = SimPlatform::new();
                    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

                    assert_eq!(ps2.send_byte($cmd as u32), Ok($resp));
                    ps2.hal_mut().settle();

                    let expected: Vec<u8> = vec![$($($extra),*)?];
                    assert_eq!(drain(&mut ps2), expected);
                    assert_eq!(ps2.get_error(), Ok(Ps2ErrorFlags::empty()));
                    assert_eq!(sim.keyboard().received, vec![$cmd]);
                }
            )*
        }
    };
}

command_cases! {
    echo: DEV_CMD_ECHO => DEV_ECHO;
    enable: DEV_CMD_ENABLE => DEV_ACK;
    disable: DEV_CMD_DISABLE => DEV_ACK;
    defaults: DEV_CMD_DEFAULTS => DEV_ACK;
    set_leds: DEV_CMD_SET_LEDS => DEV_ACK;
    set_rate: DEV_CMD_SET_RATE => DEV_ACK;
    identify: DEV_CMD_IDENTIFY => DEV_ACK, then [KEYBOARD_ID[0], KEYBOARD_ID[1]];
    reset: DEV_CMD_RESET => DEV_ACK, then [DEV_SELF_TEST_OK];
    unknown: 0x42u8 => DEV_RESEND;
}

#[test]
fn test_set_leds_with_argument() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    assert_eq!(ps2.send_byte(DEV_CMD_SET_LEDS as u32), Ok(DEV_ACK));
    assert_eq!(ps2.send_byte(0x05), Ok(DEV_ACK));

    let kbd = sim.keyboard();
    assert_eq!(kbd.leds, 0x05);
    assert_eq!(kbd.received, vec![DEV_CMD_SET_LEDS, 0x05]);
    assert!(ps2.is_empty().unwrap());
}

#[test]
fn test_only_low_byte_is_sent() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    assert_eq!(ps2.send_byte(0xABCD_00F5), Ok(DEV_ACK));
    assert_eq!(sim.keyboard().received, vec![0xF5]);
    assert!(!sim.keyboard().scanning);
}

#[test]
fn test_every_byte_value_reaches_device() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    // Echo the whole range through the set-rate argument slot.
    for byte in 0..=255u8 {
        assert_eq!(ps2.send_byte(DEV_CMD_SET_RATE as u32), Ok(DEV_ACK));
        assert_eq!(ps2.send_byte(byte as u32), Ok(DEV_ACK));
        assert_eq!(sim.keyboard().typematic, byte);
    }
    assert!(ps2.get_error().unwrap().is_empty());
}

#[test]
fn test_send_leaves_bus_idle() {
    let sim = SimPlatform::new();
    let link = leak_link();
    let mut ps2 =
        Ps2::new(sim.clone(), link, SIM_DATA, SIM_CLOCK, Ps2Config::default()).unwrap();

    assert_eq!(ps2.send_byte(DEV_CMD_ENABLE as u32), Ok(DEV_ACK));
    assert!(!sim.host_driving(SIM_DATA));
    assert!(!sim.host_driving(SIM_CLOCK));
    assert!(sim.line_high(SIM_DATA));
    assert!(sim.line_high(SIM_CLOCK));
    assert_eq!(link.tx_phase(), TxPhase::Idle);
}

#[test]
fn test_queued_bytes_survive_a_send() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    sim.device_send(0x1C);
    assert_eq!(ps2.send_byte(DEV_CMD_ECHO as u32), Ok(DEV_ECHO));
    sim.device_send(0x32);
    assert_eq!(drain(&mut ps2), vec![0x1C, 0x32]);
}

#[test]
fn test_resend_repeats_last_device_byte() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    assert_eq!(ps2.send_byte(DEV_CMD_ECHO as u32), Ok(DEV_ECHO));
    assert_eq!(ps2.send_byte(0xFE), Ok(DEV_ECHO));
}

// =============================================================================
// Failure modes
// =============================================================================

macro_rules! failure_cases {
    ($($name:ident: $mode:expr => $failure:expr;)*) => {
        paste! {
            $(
                #[test]
                fn [<test_failure_ $name>]() {
                    let sim = SimPlatform::new();
                    let link = leak_link();
                    let mut ps2 =
                        Ps2::new(sim.clone(), link, SIM_DATA, SIM_CLOCK, Ps2Config::default())
                            .unwrap();
                    let failure: TxFailure = $failure;

                    sim.set_mode($mode);
                    let result = ps2.send_byte(DEV_CMD_ENABLE as u32);
                    assert_eq!(result, Err(Ps2Error::Transmit(failure)));
                    assert_eq!(encode_send(&result), -(failure.detail().bits() as i16));
                    assert_eq!(ps2.get_error(), Ok(failure.flags()));

                    // Every exit path leaves the bus and the sequencer idle.
                    assert!(!sim.host_driving(SIM_DATA));
                    assert!(!sim.host_driving(SIM_CLOCK));
                    assert_eq!(link.tx_phase(), TxPhase::Idle);
                    assert!(ps2.is_empty().unwrap());

                    // A healthy device afterwards works normally.
                    sim.set_mode(DeviceMode::Responsive);
                    assert_eq!(ps2.send_byte(DEV_CMD_ECHO as u32), Ok(DEV_ECHO));
                    assert_eq!(ps2.get_error(), Ok(Ps2ErrorFlags::empty()));
                }
            )*
        }
    };
}

failure_cases! {
    absent: DeviceMode::Absent => TxFailure::RequestTimeout;
    clock_stalls_high: DeviceMode::StallAfter(4) => TxFailure::ClockLowTimeout;
    clock_stuck_low: DeviceMode::HoldClockAfter(3) => TxFailure::ClockHighTimeout;
    nack: DeviceMode::Nack => TxFailure::NoAck;
    clock_held_after_ack: DeviceMode::HoldClockAfterAck => TxFailure::AckClockTimeout;
    silent: DeviceMode::Silent => TxFailure::NoResponse;
    garbled_response: DeviceMode::GarbledResponse => TxFailure::BadResponse(Ps2ErrorFlags::PARITY);
}

#[test]
fn test_timeout_flags_include_timeout_bit() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    sim.set_mode(DeviceMode::Silent);
    assert!(ps2.send_byte(DEV_CMD_ENABLE as u32).is_err());
    assert_eq!(
        ps2.get_error(),
        Ok(Ps2ErrorFlags::TX_NO_RESPONSE | Ps2ErrorFlags::TIMEOUT)
    );
}

#[test]
fn test_receive_and_transmit_errors_share_register() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    sim.glitch();
    sim.set_mode(DeviceMode::Nack);
    assert_eq!(
        ps2.send_byte(DEV_CMD_ENABLE as u32),
        Err(Ps2Error::Transmit(TxFailure::NoAck))
    );
    assert_eq!(
        ps2.get_error(),
        Ok(Ps2ErrorFlags::START_BIT | Ps2ErrorFlags::TX_ACK_DATA)
    );
}

#[test]
fn test_request_timeout_follows_config() {
    let sim = SimPlatform::new();
    let config = Ps2Config {
        request_timeout_us: 1_000,
        ..Ps2Config::default()
    };
    let mut ps2 = open(&sim, config).unwrap();

    sim.set_mode(DeviceMode::Absent);
    let start = sim.now_us();
    assert_eq!(
        ps2.send_byte(DEV_CMD_ENABLE as u32),
        Err(Ps2Error::Transmit(TxFailure::RequestTimeout))
    );
    let elapsed = sim.now_us() - start;
    assert!(elapsed > 1_000, "gave up after {}us", elapsed);
    assert!(elapsed < 1_500, "waited {}us", elapsed);
}

#[test]
fn test_failed_send_is_logged() {
    log_capture::install();
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    sim.set_mode(DeviceMode::Absent);
    assert!(ps2.send_byte(0xF6).is_err());
    assert!(log_capture::contains("ps2: send 0xf6 failed"));
}
