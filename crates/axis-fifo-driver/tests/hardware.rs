//! Hardware-backed tests.
//!
//! These require a Zynq target with the FIFO in the programmable logic,
//! the fabric configured to loop packets back, and root access to
//! `/dev/mem`.

use axis_fifo_driver::{AxisFifo, FifoError};

#[test]
#[ignore] // Requires hardware
fn map_and_loop_one_packet() {
    let mut fifo = AxisFifo::map().expect("map register window");
    assert_eq!(fifo.send(b"hello, fifo").expect("transmit"), 11);

    let mut buf = [0u8; 1500];
    loop {
        let n = fifo.recv(&mut buf).expect("receive");
        if n > 0 {
            assert_eq!(&buf[..n], b"hello, fifo");
            break;
        }
    }
}

#[test]
#[ignore] // Requires hardware
fn second_map_in_one_process_fails() {
    let _first = AxisFifo::map().expect("first mapping");
    assert!(matches!(AxisFifo::map(), Err(FifoError::AlreadyMapped)));
}
