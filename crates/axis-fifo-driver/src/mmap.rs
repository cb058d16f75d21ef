//! `/dev/mem` mapping of the FIFO register window.
//!
//! The FIFO sits at a fixed physical address in the programmable logic.
//! The generic physical-memory device only maps on page boundaries, so
//! the page containing the window is mapped whole and the register block
//! is reached through its in-page offset.

use crate::bus::RegisterBus;
use crate::error::{FifoError, Result};
use crate::reset;
use axis_fifo_chip::regs::{self, Register};
use rustix::fs::OFlags;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsFd;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};

const DEV_MEM: &str = "/dev/mem";

/// Process-wide single-mapping guard.
///
/// The register window is mapped at most once per process; a second
/// mapping would hand two owners the same volatile hardware state.
#[derive(Debug)]
pub(crate) struct MapGuard {
    taken: AtomicBool,
}

impl MapGuard {
    pub(crate) const fn new() -> Self {
        Self {
            taken: AtomicBool::new(false),
        }
    }

    /// Claim the mapping slot.
    pub(crate) fn acquire(&self) -> Result<()> {
        if self.taken.swap(true, Ordering::AcqRel) {
            Err(FifoError::AlreadyMapped)
        } else {
            Ok(())
        }
    }

    /// Return the slot after a failed setup so the next attempt reports
    /// its own failure instead of `AlreadyMapped`.
    pub(crate) fn release(&self) {
        self.taken.store(false, Ordering::Release);
    }
}

static WINDOW_GUARD: MapGuard = MapGuard::new();

/// Owned mapping of the FIFO register window out of `/dev/mem`.
///
/// Created by [`DevMemWindow::map`], which also drives the peripheral
/// through its reset handshake; unmapped on drop. At most one window may
/// exist per process for the lifetime of that process.
#[derive(Debug)]
pub struct DevMemWindow {
    page: NonNull<u8>,
    page_len: usize,
    window_offset: usize,
    _mem: File,
}

impl DevMemWindow {
    /// Map the register window and reset the peripheral.
    ///
    /// # Errors
    ///
    /// [`FifoError::AlreadyMapped`] if a window is already mapped in this
    /// process (the existing one stays usable), [`FifoError::DeviceOpen`]
    /// if `/dev/mem` cannot be opened, [`FifoError::Map`] if the mapping
    /// syscall fails, and [`FifoError::Timeout`] if the peripheral never
    /// acknowledges reset.
    pub fn map() -> Result<Self> {
        WINDOW_GUARD.acquire()?;
        let window = Self::map_unguarded(regs::BASE_ADDR);
        if window.is_err() {
            WINDOW_GUARD.release();
        }
        window
    }

    fn map_unguarded(base: u64) -> Result<Self> {
        // O_SYNC: register accesses must reach the bus, not a cache
        #[allow(clippy::cast_possible_wrap)]
        let sync_flag = OFlags::SYNC.bits() as i32;

        let mem = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(sync_flag)
            .open(DEV_MEM)
            .map_err(|source| FifoError::DeviceOpen {
                path: DEV_MEM.into(),
                source,
            })?;

        let page_len = rustix::param::page_size();
        let page_mask = page_len as u64 - 1;
        let page_base = base & !page_mask;
        #[allow(clippy::cast_possible_truncation)]
        let window_offset = (base & page_mask) as usize;
        debug_assert!(window_offset + regs::WINDOW_BYTES <= page_len);

        // SAFETY: mapping device memory. The fd was just opened
        // read/write, the length is one full page and the offset is
        // page-aligned by construction. The returned pointer is only
        // dereferenced through the bounds-checked volatile accessors
        // below, and the fd stays open for the life of the mapping.
        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                page_len,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                mem.as_fd(),
                page_base,
            )
            .map_err(|source| FifoError::Map { source })?
        };

        let page =
            NonNull::new(ptr.cast::<u8>()).expect("rustix mmap returns non-null pointer on success");

        tracing::info!(
            "mapped FIFO registers: phys {:#x} at {:p}+{:#x}",
            base,
            page.as_ptr(),
            window_offset
        );

        let mut window = Self {
            page,
            page_len,
            window_offset,
            _mem: mem,
        };
        reset::run(&mut window, reset::DEFAULT_POLL_LIMIT)?;
        Ok(window)
    }

    fn reg_ptr(&self, reg: Register) -> *mut u32 {
        let offset = self.window_offset + reg.offset();
        debug_assert!(offset + 4 <= self.page_len);
        // SAFETY: register offsets are bounded by WINDOW_BYTES and the
        // window fits inside the mapped page, so the pointer stays in
        // bounds. Hardware registers are 4-byte aligned.
        unsafe { self.page.as_ptr().add(offset).cast::<u32>() }
    }
}

impl RegisterBus for DevMemWindow {
    fn read32(&mut self, reg: Register) -> u32 {
        // SAFETY: volatile is required for MMIO. The hardware changes
        // values between reads, and FIFO-backed reads have side effects
        // the compiler must not elide or reorder.
        unsafe { self.reg_ptr(reg).read_volatile() }
    }

    fn write32(&mut self, reg: Register, value: u32) {
        // SAFETY: volatile is required for MMIO. Writes trigger hardware
        // side effects and must not be elided or reordered.
        unsafe { self.reg_ptr(reg).write_volatile(value) }
    }
}

impl Drop for DevMemWindow {
    fn drop(&mut self) {
        // SAFETY: page/page_len are exactly what mmap returned in map().
        // Drop runs at most once and nothing else aliases the mapping.
        unsafe {
            if let Err(e) = munmap(self.page.as_ptr().cast(), self.page_len) {
                tracing::error!("munmap of FIFO register page failed: {e}");
            }
        }
        tracing::debug!("unmapped FIFO register window");
    }
}

// SAFETY: the window owns its mapping and fd exclusively; moving it to
// another thread does not invalidate either. All access goes through
// `&mut self`.
unsafe impl Send for DevMemWindow {}

#[cfg(test)]
mod tests {
    use super::MapGuard;
    use crate::error::FifoError;

    #[test]
    fn second_mapping_attempt_is_rejected() {
        let guard = MapGuard::new();
        guard.acquire().unwrap();
        assert!(matches!(guard.acquire(), Err(FifoError::AlreadyMapped)));
        // the first claim is unaffected by the rejected second one
        assert!(matches!(guard.acquire(), Err(FifoError::AlreadyMapped)));
    }

    #[test]
    fn failed_setup_returns_the_slot() {
        let guard = MapGuard::new();
        guard.acquire().unwrap();
        guard.release();
        guard.acquire().unwrap();
    }
}
