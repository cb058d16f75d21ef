//! Error types for FIFO operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for FIFO operations.
pub type Result<T> = std::result::Result<T, FifoError>;

/// Errors that can occur while mapping the register window or moving
/// packets.
///
/// Setup failures (`AlreadyMapped`, `DeviceOpen`, `Map`) are fatal for
/// this subsystem within the current process; retrying will not change
/// the outcome. Capacity failures are per-call and leave the FIFO usable.
#[derive(Debug, Error)]
pub enum FifoError {
    /// The register window is already mapped in this process. The
    /// existing mapping stays intact and usable.
    #[error("AXIS FIFO register window is already mapped in this process")]
    AlreadyMapped,

    /// The physical-memory device could not be opened.
    #[error("cannot open {path}: {source}")]
    DeviceOpen {
        /// Device path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Mapping the register page failed.
    #[error("mmap of FIFO register page failed: {source}")]
    Map {
        /// Errno reported by the mapping syscall.
        #[source]
        source: rustix::io::Errno,
    },

    /// A received packet is longer than the caller's buffer. The packet
    /// has been drained from the FIFO and dropped; the next packet will
    /// be received intact.
    #[error("received packet of {length} bytes exceeds buffer capacity {capacity}; packet dropped")]
    BufferTooSmall {
        /// Byte length the hardware reported for the packet.
        length: usize,
        /// Capacity of the caller's buffer.
        capacity: usize,
    },

    /// A transmit packet does not fit the FIFO right now. No register was
    /// written.
    #[error("packet needs {words} FIFO words but only {vacancy} are vacant")]
    InsufficientCapacity {
        /// Words the packet requires.
        words: usize,
        /// Words the transmit FIFO reported free.
        vacancy: u32,
    },

    /// The hardware reported a receive length the FIFO cannot hold. No
    /// drain was attempted; the peripheral needs a reset.
    #[error("hardware reported receive length {length} beyond FIFO maximum {max}")]
    CorruptLength {
        /// Length read from the receive-length register.
        length: u32,
        /// Largest packet the receive FIFO can deliver.
        max: u32,
    },

    /// A bounded busy-wait on a status flag expired.
    #[error("timed out waiting for {flag} after {polls} status polls")]
    Timeout {
        /// Mnemonic of the flag that never asserted.
        flag: &'static str,
        /// Number of status polls performed.
        polls: u32,
    },
}
