//! Packet engine: the caller-facing read/write interface.

use crate::bus::RegisterBus;
use crate::error::{FifoError, Result};
use crate::mmap::DevMemWindow;
use crate::reset;
use axis_fifo_chip::geometry::{words_for, MAX_PACKET_BYTES, WORD_BYTES};
use axis_fifo_chip::regs::{isr, Register};

/// Packet interface to one AXIS FIFO.
///
/// Non-blocking receive, blocking transmit; packet boundaries come from
/// the length registers, never from in-band delimiters. Both operations
/// take `&mut self`, so all register traffic flows through a single owner
/// and the multi-step sequences of either path cannot interleave. Sharing
/// a handle across threads requires an external lock held around whole
/// calls, never across them.
#[derive(Debug)]
pub struct AxisFifo<B: RegisterBus = DevMemWindow> {
    bus: B,
    poll_limit: u32,
}

impl AxisFifo<DevMemWindow> {
    /// Map the hardware register window and return a reset, ready handle.
    ///
    /// # Errors
    ///
    /// Propagates the mapping errors of [`DevMemWindow::map`]: a second
    /// mapping in one process fails with [`FifoError::AlreadyMapped`],
    /// `/dev/mem` problems surface as [`FifoError::DeviceOpen`] or
    /// [`FifoError::Map`], and an unresponsive peripheral as
    /// [`FifoError::Timeout`]. All are fatal for this subsystem.
    pub fn map() -> Result<Self> {
        Ok(Self::new(DevMemWindow::map()?))
    }
}

impl<B: RegisterBus> AxisFifo<B> {
    /// Wrap an already-initialized register bus.
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            poll_limit: reset::DEFAULT_POLL_LIMIT,
        }
    }

    /// Bound every busy-wait to `polls` status reads.
    #[must_use]
    pub fn with_poll_limit(mut self, polls: u32) -> Self {
        self.poll_limit = polls;
        self
    }

    /// The underlying register bus.
    pub fn bus(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Re-run the hardware reset handshake (error recovery).
    ///
    /// # Errors
    ///
    /// [`FifoError::Timeout`] if either path never reports reset complete.
    pub fn reset(&mut self) -> Result<()> {
        reset::run(&mut self.bus, self.poll_limit)
    }

    /// Receive at most one pending packet into `buf`.
    ///
    /// Returns `Ok(0)` when no packet is pending — the expected common
    /// case under polling, not an error. A positive return is the byte
    /// length of a real packet. Data moves in whole 32-bit words, so up
    /// to three bytes past the reported length may be written into `buf`
    /// where there is room; only the first `n` bytes are packet data.
    ///
    /// # Errors
    ///
    /// [`FifoError::CorruptLength`] if the hardware reports a length the
    /// FIFO cannot hold (nothing is drained; the peripheral needs a
    /// [`reset`](Self::reset)), and [`FifoError::BufferTooSmall`] if the
    /// packet is longer than `buf` — the packet is drained and dropped so
    /// the next one is received intact.
    pub fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.bus.read32(Register::Isr) & isr::RC == 0 {
            return Ok(0); // no packet pending
        }

        // One RLR read, then exactly `words` data-port reads. Both
        // registers are FIFO-backed; any other access pattern
        // desynchronizes every receive after this one.
        let reported = self.bus.read32(Register::Rlr);
        if reported > MAX_PACKET_BYTES {
            return Err(FifoError::CorruptLength {
                length: reported,
                max: MAX_PACKET_BYTES,
            });
        }
        let length = reported as usize;
        let words = words_for(length);

        if length > buf.len() {
            tracing::warn!(length, capacity = buf.len(), "dropping over-length packet");
            for _ in 0..words {
                let _ = self.bus.read32(Register::Rdfd);
            }
            return Err(FifoError::BufferTooSmall {
                length,
                capacity: buf.len(),
            });
        }

        for k in 0..words {
            let word = self.bus.read32(Register::Rdfd).to_le_bytes();
            let start = k * WORD_BYTES;
            let end = usize::min(start + WORD_BYTES, buf.len());
            buf[start..end].copy_from_slice(&word[..end - start]);
        }

        // W1C: only the receive-complete flag
        self.bus.write32(Register::Isr, isr::RC);

        Ok(length)
    }

    /// Transmit one packet, blocking until the hardware reports
    /// completion. Returns the number of bytes accepted, which is always
    /// `data.len()` on success.
    ///
    /// # Errors
    ///
    /// [`FifoError::InsufficientCapacity`] if the FIFO does not have room
    /// for the whole packet — no register is written — and
    /// [`FifoError::Timeout`] if transmit completion is never flagged.
    pub fn send(&mut self, data: &[u8]) -> Result<usize> {
        let words = words_for(data.len());
        let vacancy = self.bus.read32(Register::Tdfv);
        if words > vacancy as usize {
            return Err(FifoError::InsufficientCapacity { words, vacancy });
        }

        for chunk in data.chunks(WORD_BYTES) {
            let mut word = [0u8; WORD_BYTES];
            word[..chunk.len()].copy_from_slice(chunk);
            self.bus.write32(Register::Tdfd, u32::from_le_bytes(word));
        }

        // the length write releases the packet; it must come after every
        // data word or the packet is misframed
        #[allow(clippy::cast_possible_truncation)]
        let length = data.len() as u32;
        self.bus.write32(Register::Tlr, length);

        reset::wait_for(&mut self.bus, isr::TC, "TC", self.poll_limit)?;
        self.bus.write32(Register::Isr, isr::TC);

        Ok(data.len())
    }

    /// Capture a read-only snapshot of the inspectable registers.
    #[cfg(feature = "diagnostics")]
    pub fn snapshot(&mut self) -> crate::diag::FifoSnapshot {
        crate::diag::FifoSnapshot::capture(&mut self.bus)
    }
}
