//! Reset handshake for the FIFO's transmit and receive paths.
//!
//! Writing the key to SRR resets both stream paths. Each path raises its
//! reset-complete flag when done, and the IP also raises the programmable
//! full flag for that path as part of reset; both are cleared per phase
//! before the FIFO is considered idle.

use crate::bus::RegisterBus;
use crate::error::{FifoError, Result};
use axis_fifo_chip::regs::{isr, Register, RESET_KEY};

/// Status polls allowed before a handshake is declared dead.
///
/// Working hardware completes reset within a handful of bus cycles, so
/// the bound only ever matters when the peripheral is gone.
pub(crate) const DEFAULT_POLL_LIMIT: u32 = 1_000_000;

/// Drive the peripheral through the two-phase reset handshake.
pub(crate) fn run<B: RegisterBus>(bus: &mut B, poll_limit: u32) -> Result<()> {
    bus.write32(Register::Srr, RESET_KEY);

    wait_for(bus, isr::TRC, "TRC", poll_limit)?;
    // W1C: the mask clears exactly these two flags and nothing else
    bus.write32(Register::Isr, isr::TRC | isr::TFPF);

    wait_for(bus, isr::RRC, "RRC", poll_limit)?;
    bus.write32(Register::Isr, isr::RRC | isr::RFPF);

    tracing::debug!("AXIS FIFO reset complete");
    Ok(())
}

/// Busy-wait until `flag` is observed in ISR, at most `poll_limit` reads.
pub(crate) fn wait_for<B: RegisterBus>(
    bus: &mut B,
    flag: u32,
    name: &'static str,
    poll_limit: u32,
) -> Result<()> {
    for _ in 0..poll_limit {
        if bus.read32(Register::Isr) & flag != 0 {
            return Ok(());
        }
    }
    Err(FifoError::Timeout {
        flag: name,
        polls: poll_limit,
    })
}
