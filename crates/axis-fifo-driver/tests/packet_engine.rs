//! Packet engine validation against the simulated peripheral.

use axis_fifo_chip::geometry::MAX_PACKET_BYTES;
use axis_fifo_chip::regs::isr;
use axis_fifo_driver::{AxisFifo, FifoError, SimFifo};

fn fifo() -> AxisFifo<SimFifo> {
    AxisFifo::new(SimFifo::new())
}

#[test]
fn round_trip_preserves_every_length() {
    let mut fifo = fifo();
    let mut buf = [0u8; 256];
    for n in 0..=64usize {
        let payload: Vec<u8> = (0..n).map(|i| (i * 7 + n) as u8).collect();
        assert_eq!(fifo.send(&payload).unwrap(), n);
        assert_eq!(fifo.recv(&mut buf).unwrap(), n);
        assert_eq!(&buf[..n], &payload[..], "length {n} corrupted in transit");
    }
}

#[test]
fn largest_packet_round_trips() {
    let mut fifo = fifo();
    let capacity_bytes = fifo.bus().vacancy() as usize * 4;
    let payload: Vec<u8> = (0..capacity_bytes).map(|i| (i % 251) as u8).collect();

    assert_eq!(fifo.send(&payload).unwrap(), capacity_bytes);
    let mut buf = vec![0u8; capacity_bytes];
    assert_eq!(fifo.recv(&mut buf).unwrap(), capacity_bytes);
    assert_eq!(buf, payload);
}

#[test]
fn recv_without_packet_is_not_an_error_and_mutates_nothing() {
    let mut fifo = fifo();
    let isr_before = fifo.bus().isr();
    let vacancy_before = fifo.bus().vacancy();

    let mut buf = [0u8; 16];
    assert_eq!(fifo.recv(&mut buf).unwrap(), 0);

    let sim = fifo.bus();
    assert_eq!(sim.consuming_reads(), 0);
    assert_eq!(sim.isr(), isr_before);
    assert_eq!(sim.vacancy(), vacancy_before);
}

#[test]
fn oversized_packet_is_drained_whole_and_dropped() {
    let mut fifo = fifo();
    fifo.send(&[0xAA; 22]).unwrap(); // 6 words, too big for the buffer below
    fifo.send(&[0x55; 8]).unwrap(); // the packet that must survive the drop

    let mut small = [0u8; 16];
    match fifo.recv(&mut small) {
        Err(FifoError::BufferTooSmall { length, capacity }) => {
            assert_eq!(length, 22);
            assert_eq!(capacity, 16);
        }
        other => panic!("expected BufferTooSmall, got {other:?}"),
    }
    // exactly ceil(22/4) words flushed through the read port, no more
    assert_eq!(fifo.bus().data_port_reads(), 6);
    assert_eq!(fifo.bus().draining_words(), 0);

    // the stream stays consistent: the next packet arrives intact
    assert_eq!(fifo.recv(&mut small).unwrap(), 8);
    assert_eq!(&small[..8], &[0x55; 8]);
}

#[test]
fn transmit_without_room_touches_no_register() {
    let mut fifo = fifo();
    let vacancy = fifo.bus().vacancy();
    let too_big = vec![0u8; (vacancy as usize + 1) * 4];

    match fifo.send(&too_big) {
        Err(FifoError::InsufficientCapacity { words, vacancy: v }) => {
            assert_eq!(words, vacancy as usize + 1);
            assert_eq!(v, vacancy);
        }
        other => panic!("expected InsufficientCapacity, got {other:?}"),
    }

    let sim = fifo.bus();
    assert_eq!(sim.data_port_writes(), 0, "no partial write may occur");
    assert_eq!(sim.staged_words(), 0);
    assert_eq!(sim.pending_packets(), 0);
    assert_eq!(sim.isr() & isr::TC, 0, "no completion flag may be touched");
}

#[test]
fn nine_byte_packet_moves_three_words() {
    let mut fifo = fifo();
    let payload = *b"framing!!";
    fifo.send(&payload).unwrap();
    assert_eq!(fifo.bus().data_port_writes(), 3);

    let mut buf = [0u8; 12];
    assert_eq!(fifo.recv(&mut buf).unwrap(), 9);
    assert_eq!(fifo.bus().data_port_reads(), 3);
    assert_eq!(&buf[..9], &payload);
    // word-granular transfer: the final word's padding lands in the
    // buffer and carries the transmit side's zero fill
    assert_eq!(&buf[9..12], &[0, 0, 0]);
}

#[test]
fn corrupt_length_is_reported_without_a_drain() {
    let mut fifo = fifo();
    fifo.bus().inject_rx_packet(60_000, &[0xDEAD_BEEF]);

    let mut buf = [0u8; 64];
    match fifo.recv(&mut buf) {
        Err(FifoError::CorruptLength { length, max }) => {
            assert_eq!(length, 60_000);
            assert_eq!(max, MAX_PACKET_BYTES);
        }
        other => panic!("expected CorruptLength, got {other:?}"),
    }
    assert_eq!(fifo.bus().data_port_reads(), 0, "no unbounded drain");
}

#[test]
fn transmit_completion_timeout_surfaces() {
    let sim = SimFifo::new().with_transmit_latency(1_000);
    let mut fifo = AxisFifo::new(sim).with_poll_limit(10);
    match fifo.send(&[1, 2, 3]) {
        Err(FifoError::Timeout { flag, polls }) => {
            assert_eq!(flag, "TC");
            assert_eq!(polls, 10);
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[test]
fn transmit_waits_out_a_slow_peripheral() {
    let sim = SimFifo::new().with_transmit_latency(5);
    let mut fifo = AxisFifo::new(sim).with_poll_limit(64);
    assert_eq!(fifo.send(&[9; 5]).unwrap(), 5);
}

#[test]
fn empty_packet_round_trips_as_zero_bytes() {
    let mut fifo = fifo();
    assert_eq!(fifo.send(&[]).unwrap(), 0);
    // a zero-length packet is indistinguishable from "no data" at the
    // interface, but it still consumes the pending packet
    let mut buf = [0u8; 4];
    assert_eq!(fifo.recv(&mut buf).unwrap(), 0);
    assert_eq!(fifo.bus().pending_packets(), 0);
}

#[test]
fn explicit_reset_recovers_a_desynchronized_stream() {
    let mut fifo = fifo();
    fifo.bus().inject_rx_packet(60_000, &[0x1]);
    let mut buf = [0u8; 16];
    assert!(matches!(
        fifo.recv(&mut buf),
        Err(FifoError::CorruptLength { .. })
    ));

    fifo.reset().unwrap();
    fifo.send(&[7; 7]).unwrap();
    assert_eq!(fifo.recv(&mut buf).unwrap(), 7);
    assert_eq!(&buf[..7], &[7; 7]);
}
