use ps2io_abi::{FRAME_PARITY_BIT, FRAME_STOP_BIT, Ps2ErrorFlags, RX_QUEUE_CAPACITY, frame_bits};
use ps2io_drivers::{OverflowPolicy, Ps2, Ps2Config};

use crate::sim::{SimPlatform, open};

fn drain(ps2: &mut Ps2<SimPlatform>) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(byte) = ps2.get_byte().unwrap() {
        out.push(byte);
    }
    out
}

#[test]
fn test_single_frame_is_queued() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    sim.device_send(0x1C);
    assert_eq!(sim.edges(), 11);
    assert_eq!(ps2.len(), Ok(1));
    assert_eq!(ps2.get_byte(), Ok(Some(0x1C)));
    assert_eq!(ps2.get_byte(), Ok(None));
    assert_eq!(ps2.get_error(), Ok(Ps2ErrorFlags::empty()));
}

#[test]
fn test_frame_for_0x41_pops_once() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    sim.device_transmit(&[false, true, false, false, false, false, false, true, false, true, true]);
    assert_eq!(ps2.len(), Ok(1));
    assert_eq!(ps2.get_byte(), Ok(Some(0x41)));
    assert_eq!(ps2.len(), Ok(0));
    assert_eq!(ps2.get_error(), Ok(Ps2ErrorFlags::empty()));
}

#[test]
fn test_bytes_come_out_in_arrival_order() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    let sequence = [0xE0, 0xF0, 0x75, 0x1C, 0x00, 0xFF];
    for byte in sequence {
        sim.device_send(byte);
    }
    assert_eq!(drain(&mut ps2), sequence);
}

#[test]
fn test_every_byte_value_decodes() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    for byte in 0..=255u8 {
        sim.device_send(byte);
        assert_eq!(ps2.get_byte(), Ok(Some(byte)));
    }
    assert!(ps2.get_error().unwrap().is_empty());
}

#[test]
fn test_glitch_raises_start_bit_error() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    sim.glitch();
    assert_eq!(ps2.is_empty(), Ok(true));
    assert_eq!(ps2.get_error(), Ok(Ps2ErrorFlags::START_BIT));

    // The decoder stayed idle, so the next frame lines up.
    sim.device_send(0x29);
    assert_eq!(drain(&mut ps2), vec![0x29]);
}

#[test]
fn test_parity_error_discards_frame() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    let mut bits = frame_bits(0x5A);
    bits[FRAME_PARITY_BIT as usize] = !bits[FRAME_PARITY_BIT as usize];
    sim.device_transmit(&bits);
    sim.device_send(0x5B);

    assert_eq!(drain(&mut ps2), vec![0x5B]);
    assert_eq!(ps2.get_error(), Ok(Ps2ErrorFlags::PARITY));
}

#[test]
fn test_stop_bit_error_discards_frame() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    let mut bits = frame_bits(0x12);
    bits[FRAME_STOP_BIT as usize] = false;
    sim.device_transmit(&bits);

    assert_eq!(ps2.len(), Ok(0));
    assert_eq!(ps2.get_error(), Ok(Ps2ErrorFlags::STOP_BIT));
}

#[test]
fn test_error_register_clears_on_read() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    sim.glitch();
    let mut bits = frame_bits(0x33);
    bits[FRAME_STOP_BIT as usize] = false;
    sim.device_transmit(&bits);

    assert_eq!(
        ps2.get_error(),
        Ok(Ps2ErrorFlags::START_BIT | Ps2ErrorFlags::STOP_BIT)
    );
    assert_eq!(ps2.get_error(), Ok(Ps2ErrorFlags::empty()));
}

#[test]
fn test_overflow_drops_newest() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    for byte in 0..=RX_QUEUE_CAPACITY as u8 {
        sim.device_send(byte);
    }
    assert_eq!(ps2.len(), Ok(RX_QUEUE_CAPACITY));
    assert_eq!(ps2.get_error(), Ok(Ps2ErrorFlags::BUFFER_OVERFLOW));

    let expected: Vec<u8> = (0..RX_QUEUE_CAPACITY as u8).collect();
    assert_eq!(drain(&mut ps2), expected);
}

#[test]
fn test_overflow_drop_oldest_policy() {
    let sim = SimPlatform::new();
    let config = Ps2Config {
        overflow: OverflowPolicy::DropOldest,
        ..Ps2Config::default()
    };
    let mut ps2 = open(&sim, config).unwrap();

    for byte in 0..RX_QUEUE_CAPACITY as u8 + 3 {
        sim.device_send(byte);
    }
    assert_eq!(ps2.get_error(), Ok(Ps2ErrorFlags::BUFFER_OVERFLOW));

    let expected: Vec<u8> = (3..RX_QUEUE_CAPACITY as u8 + 3).collect();
    assert_eq!(drain(&mut ps2), expected);
}

#[test]
fn test_slow_device_is_tolerated_by_default() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    let bits = frame_bits(0x4D);
    sim.device_transmit(&bits[..6]);
    sim.advance_us(5_000);
    sim.device_transmit(&bits[6..]);

    assert_eq!(drain(&mut ps2), vec![0x4D]);
    assert!(ps2.get_error().unwrap().is_empty());
}

#[test]
fn test_stall_resync_recovers_next_frame() {
    let sim = SimPlatform::new();
    let config = Ps2Config {
        rx_stall_us: Some(200),
        ..Ps2Config::default()
    };
    let mut ps2 = open(&sim, config).unwrap();

    sim.device_transmit(&frame_bits(0x4D)[..4]);
    sim.advance_us(1_000);
    sim.device_send(0x99);

    assert_eq!(drain(&mut ps2), vec![0x99]);
    assert_eq!(ps2.get_error(), Ok(Ps2ErrorFlags::TIMEOUT));
}

#[test]
fn test_send_aborts_partial_frame() {
    let sim = SimPlatform::new();
    let mut ps2 = open(&sim, Ps2Config::default()).unwrap();

    sim.device_transmit(&frame_bits(0x55)[..5]);
    assert_eq!(ps2.send_byte(0xF4), Ok(0xFA));

    sim.device_send(0x1C);
    assert_eq!(drain(&mut ps2), vec![0x1C]);
    assert!(ps2.get_error().unwrap().is_empty());
}
