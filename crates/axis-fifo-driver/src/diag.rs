//! Read-only register dump for debugging.
//!
//! Captures only registers that are safe to read at any time. The
//! occupancy and receive-length registers are FIFO-backed — reading them
//! consumes hardware state — so they are excluded by construction: the
//! capture iterates [`Register::READ_SAFE`] and nothing else.

use crate::bus::RegisterBus;
use axis_fifo_chip::regs::{isr, Register};
use std::fmt;

/// Point-in-time copy of the FIFO's inspectable registers.
#[derive(Debug, Clone, Copy)]
pub struct FifoSnapshot {
    /// Interrupt status.
    pub isr: u32,
    /// Interrupt enable.
    pub ier: u32,
    /// Transmit vacancy in 32-bit words.
    pub tdfv: u32,
    /// Transmit destination id.
    pub tdr: u32,
    /// Receive destination id.
    pub rdr: u32,
}

impl FifoSnapshot {
    /// Read the inspectable registers off the bus.
    pub fn capture<B: RegisterBus>(bus: &mut B) -> Self {
        let mut snap = Self {
            isr: 0,
            ier: 0,
            tdfv: 0,
            tdr: 0,
            rdr: 0,
        };
        for reg in Register::READ_SAFE {
            let value = bus.read32(reg);
            match reg {
                Register::Isr => snap.isr = value,
                Register::Ier => snap.ier = value,
                Register::Tdfv => snap.tdfv = value,
                Register::Tdr => snap.tdr = value,
                Register::Rdr => snap.rdr = value,
                _ => unreachable!("READ_SAFE contains no other register"),
            }
        }
        snap
    }

    /// Mnemonics of the status flags currently set.
    #[must_use]
    pub fn flags(&self) -> Vec<&'static str> {
        isr::ALL
            .iter()
            .filter(|(mask, _, _)| self.isr & mask != 0)
            .map(|(_, name, _)| *name)
            .collect()
    }
}

impl fmt::Display for FifoSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AXIS FIFO state")?;
        writeln!(f, "  ISR : {:08X}\t(interrupt status)", self.isr)?;
        for (mask, name, note) in isr::ALL {
            if self.isr & mask != 0 {
                writeln!(f, "    {name:<5}: {note}")?;
            }
        }
        writeln!(f, "  IER : {:08X}\t(interrupt enable)", self.ier)?;
        writeln!(f, "  TDFV: {}\t(transmit vacancy in 32-bit words)", self.tdfv)?;
        writeln!(f, "  TDR : {}\t(transmit destination)", self.tdr)?;
        write!(f, "  RDR : {}\t(receive destination)", self.rdr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimFifo;
    use crate::AxisFifo;

    #[test]
    fn snapshot_reads_no_consuming_register() {
        let mut fifo = AxisFifo::new(SimFifo::new());
        fifo.send(&[1, 2, 3, 4, 5]).unwrap(); // leave a packet pending

        let snap = fifo.snapshot();
        assert_ne!(snap.isr & isr::RC, 0);
        assert_eq!(fifo.bus().consuming_reads(), 0);

        // the pending packet is intact afterwards
        let mut buf = [0u8; 8];
        assert_eq!(fifo.recv(&mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn display_decodes_flags_by_name() {
        let snap = FifoSnapshot {
            isr: isr::RC | isr::TFPE,
            ier: 0,
            tdfv: 508,
            tdr: 0,
            rdr: 0,
        };
        assert_eq!(snap.flags(), vec!["RC", "TFPE"]);
        let text = snap.to_string();
        assert!(text.contains("Receive packet complete"));
        assert!(text.contains("TDFV: 508"));
    }
}
