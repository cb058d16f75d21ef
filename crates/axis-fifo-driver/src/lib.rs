//! Userspace packet driver for the FPGA AXI4-Stream FIFO.
//!
//! Until a dedicated character device exists, the FIFO in the programmable
//! logic is reached by memory-mapping its register window out of the
//! generic physical-memory device. On top of that window this crate
//! implements the packet interface the fabric speaks: non-blocking
//! receive, blocking transmit, with packet boundaries carried by the
//! length registers rather than any in-band delimiter.
//!
//! # Components
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`RegisterBus`] | Register access seam between engine and window |
//! | [`DevMemWindow`] | Page-aligned `/dev/mem` mapping of the registers |
//! | [`AxisFifo`] | The packet engine — the only type callers need |
//! | [`SimFifo`] | Register-accurate software peripheral for tests |
//! | [`diag`] | Read-only register dump (feature `diagnostics`) |
//!
//! # Quick start
//!
//! ```no_run
//! use axis_fifo_driver::AxisFifo;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut fifo = AxisFifo::map()?;
//! fifo.send(b"ping")?;
//!
//! let mut buf = [0u8; 1500];
//! loop {
//!     match fifo.recv(&mut buf)? {
//!         0 => continue, // no packet yet — the normal polling outcome
//!         n => {
//!             println!("{:02x?}", &buf[..n]);
//!             break;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Hazards the types enforce
//!
//! The occupancy and receive-length registers are FIFO-backed: reading
//! them consumes hardware state. Only the receive path of [`AxisFifo`]
//! reads them, and [`diag`] iterates the chip model's safe-register list
//! so a dump can never touch them. One mapping per process: a second
//! [`AxisFifo::map`] fails with [`FifoError::AlreadyMapped`] while the
//! first handle keeps working.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod bus;
#[cfg(feature = "diagnostics")]
pub mod diag;
mod error;
mod fifo;
mod mmap;
mod reset;
pub mod sim;

pub use bus::RegisterBus;
#[cfg(feature = "diagnostics")]
pub use diag::FifoSnapshot;
pub use error::{FifoError, Result};
pub use fifo::AxisFifo;
pub use mmap::DevMemWindow;
pub use sim::SimFifo;
