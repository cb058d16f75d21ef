//! FIFO geometry: depths, word size, packet-length bounds.
//!
//! Packets cross the register window a word at a time; every byte length
//! is rounded up to whole 32-bit words on both paths.

/// Width of the data ports in bytes.
pub const WORD_BYTES: usize = 4;

/// Transmit FIFO depth in 32-bit words (synthesis parameter).
pub const TX_FIFO_DEPTH_WORDS: u32 = 512;

/// Receive FIFO depth in 32-bit words (synthesis parameter).
pub const RX_FIFO_DEPTH_WORDS: u32 = 512;

/// Vacancy the transmit side reports right after reset. The IP holds four
/// words back for internal use, so this is depth − 4.
pub const TX_VACANCY_AT_RESET: u32 = TX_FIFO_DEPTH_WORDS - 4;

/// Largest packet the receive FIFO can deliver, in bytes. A receive
/// length above this cannot have come from the FIFO.
pub const MAX_PACKET_BYTES: u32 = RX_FIFO_DEPTH_WORDS * WORD_BYTES as u32;

/// Number of 32-bit words needed to carry `len` bytes, the final partial
/// word rounded up.
#[must_use]
pub const fn words_for(len: usize) -> usize {
    len.div_ceil(WORD_BYTES)
}
