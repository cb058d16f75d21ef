//! Register map of the AXI4-Stream FIFO.
//!
//! Thirteen 32-bit registers in a 52-byte window at a fixed physical
//! address in the programmable logic. The layout is an immutable contract
//! with the hardware.
//!
//! ```text
//! 0x00 ISR   interrupt status          0x1C RDFO  receive occupancy (FIFO-backed)
//! 0x04 IER   interrupt enable          0x20 RDFD  receive read port  (FIFO-backed)
//! 0x08 TDFR  transmit path reset       0x24 RLR   receive length     (FIFO-backed)
//! 0x0C TDFV  transmit vacancy          0x28 SRR   AXI4-Stream reset
//! 0x10 TDFD  transmit write port       0x2C TDR   transmit destination
//! 0x14 TLR   transmit length           0x30 RDR   receive destination
//! 0x18 RDFR  receive path reset
//! ```

/// Physical base address of the register window (Zynq PL, fixed at synthesis).
pub const BASE_ADDR: u64 = 0x43C0_0000;

/// Size of the register window in bytes (13 × 32-bit registers).
pub const WINDOW_BYTES: usize = 0x34;

/// Value the reset registers require to trigger a reset.
pub const RESET_KEY: u32 = 0x0000_00A5;

/// The thirteen FIFO registers, named by their hardware mnemonics.
///
/// `RDFO`, `RDFD` and `RLR` are **FIFO-backed**: a read consumes hardware
/// state exactly as reading the data port does. They never appear in
/// [`Register::READ_SAFE`], so an inspection pass that iterates that list
/// cannot touch them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Register {
    /// Interrupt status — sticky write-one-to-clear event flags, see [`isr`].
    Isr = 0x00,
    /// Interrupt enable.
    Ier = 0x04,
    /// Transmit data FIFO reset trigger; takes [`RESET_KEY`].
    Tdfr = 0x08,
    /// Transmit data FIFO vacancy in 32-bit words.
    Tdfv = 0x0C,
    /// Transmit data FIFO write port.
    Tdfd = 0x10,
    /// Transmit length in bytes; writing it releases the staged packet.
    Tlr = 0x14,
    /// Receive data FIFO reset trigger; takes [`RESET_KEY`].
    Rdfr = 0x18,
    /// Receive data FIFO occupancy in words — FIFO-backed.
    Rdfo = 0x1C,
    /// Receive data FIFO read port — FIFO-backed.
    Rdfd = 0x20,
    /// Receive length in bytes — FIFO-backed.
    Rlr = 0x24,
    /// AXI4-Stream reset for both paths; takes [`RESET_KEY`].
    Srr = 0x28,
    /// Transmit destination id.
    Tdr = 0x2C,
    /// Receive destination id.
    Rdr = 0x30,
}

impl Register {
    /// Registers whose read has no hardware side effect — everything an
    /// inspection pass may look at. The occupancy, read-port and
    /// receive-length registers are deliberately absent.
    pub const READ_SAFE: [Self; 5] = [Self::Isr, Self::Ier, Self::Tdfv, Self::Tdr, Self::Rdr];

    /// Byte offset of this register within the window.
    #[must_use]
    pub const fn offset(self) -> usize {
        self as usize
    }

    /// Whether reading this register consumes FIFO state.
    #[must_use]
    pub const fn is_consuming(self) -> bool {
        matches!(self, Self::Rdfo | Self::Rdfd | Self::Rlr)
    }
}

/// Interrupt status register bits.
///
/// Each bit is a sticky event flag cleared by writing a `1` to its
/// position; zeros in the written mask leave the other flags untouched.
pub mod isr {
    /// Receive packet length underrun read error — RLR read when empty.
    pub const RPURE: u32 = 1 << 31;
    /// Receive packet data overrun read error — RDFD read beyond the current packet.
    pub const RPORE: u32 = 1 << 30;
    /// Receive packet data underrun error — RDFD read when empty.
    pub const RPUE: u32 = 1 << 29;
    /// Transmit packet data overrun error — TDFD written when full.
    pub const TPOE: u32 = 1 << 28;
    /// Transmit complete — one or more packets transmitted.
    pub const TC: u32 = 1 << 27;
    /// Receive complete — one or more packets received.
    pub const RC: u32 = 1 << 26;
    /// Transmit size error — words available < requested transmit length.
    pub const TSE: u32 = 1 << 25;
    /// Transmit reset complete.
    pub const TRC: u32 = 1 << 24;
    /// Receive reset complete.
    pub const RRC: u32 = 1 << 23;
    /// Transmit FIFO programmable full threshold crossed.
    pub const TFPF: u32 = 1 << 22;
    /// Transmit FIFO programmable empty threshold crossed.
    pub const TFPE: u32 = 1 << 21;
    /// Receive FIFO programmable full threshold crossed.
    pub const RFPF: u32 = 1 << 20;
    /// Receive FIFO programmable empty threshold crossed.
    pub const RFPE: u32 = 1 << 19;

    /// Every defined flag with its mnemonic and meaning, in dump order.
    pub const ALL: [(u32, &str, &str); 13] = [
        (RPURE, "RPURE", "Receive packet length underrun read error. RLR read when empty."),
        (RPORE, "RPORE", "Receive packet data overrun read error. RDFD read beyond current packet."),
        (RPUE, "RPUE", "Receive packet data underrun error. RDFD read when empty."),
        (TPOE, "TPOE", "Transmit packet data overrun error. TDFD written when FIFO full."),
        (TC, "TC", "Transmit packet complete."),
        (RC, "RC", "Receive packet complete."),
        (TSE, "TSE", "Transmit size error. FIFO words available < requested transmit length."),
        (TRC, "TRC", "Transmit reset complete."),
        (RRC, "RRC", "Receive reset complete."),
        (TFPF, "TFPF", "Transmit FIFO programmable full. TX full threshold crossed."),
        (TFPE, "TFPE", "Transmit FIFO programmable empty. TX empty threshold crossed."),
        (RFPF, "RFPF", "Receive FIFO programmable full. RX full threshold crossed."),
        (RFPE, "RFPE", "Receive FIFO programmable empty. RX empty threshold crossed."),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_offsets_match_the_hardware_window() {
        assert_eq!(Register::Isr.offset(), 0x00);
        assert_eq!(Register::Tdfd.offset(), 0x10);
        assert_eq!(Register::Rdfd.offset(), 0x20);
        assert_eq!(Register::Srr.offset(), 0x28);
        assert_eq!(Register::Rdr.offset(), 0x30);
        assert_eq!(Register::Rdr.offset() + 4, WINDOW_BYTES);
    }

    #[test]
    fn consuming_registers_are_exactly_the_fifo_backed_three() {
        for reg in [Register::Rdfo, Register::Rdfd, Register::Rlr] {
            assert!(reg.is_consuming());
        }
        for reg in Register::READ_SAFE {
            assert!(!reg.is_consuming(), "{reg:?} must be safe to read");
        }
    }

    #[test]
    fn isr_flags_are_distinct_and_contiguous() {
        let mut seen = 0u32;
        for (mask, name, _) in isr::ALL {
            assert_eq!(seen & mask, 0, "{name} overlaps another flag");
            seen |= mask;
        }
        // bits 19..=31, nothing below
        assert_eq!(seen, 0xFFF8_0000);
    }
}
