//! Physical register reads through `/dev/mem`
//!
//! Each read maps the page that holds the register, performs one volatile
//! 32-bit load and unmaps again. Nothing stays mapped between reads, and the
//! mapping is `PROT_READ` only.

// Register addresses are physical u64; page arithmetic needs usize.
#![allow(clippy::cast_possible_truncation)]

use crate::error::{PmgrError, Result};
use crate::reader::RegisterReader;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsFd;
use std::path::{Path, PathBuf};

/// Default physical memory device
pub const DEV_MEM: &str = "/dev/mem";

/// Read-only physical memory reader
#[derive(Debug)]
pub struct DevMem {
    file: File,
    path: PathBuf,
    page_size: u64,
}

impl DevMem {
    /// Open `/dev/mem`
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::File` if the device cannot be opened (usually
    /// missing privileges or a kernel built with `STRICT_DEVMEM`).
    pub fn open() -> Result<Self> {
        Self::open_path(DEV_MEM)
    }

    /// Open a physical memory device at `path`
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::File` if the device cannot be opened.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_SYNC)
            .open(path)
            .map_err(|e| PmgrError::file(path, e))?;

        let page_size = rustix::param::page_size() as u64;
        tracing::info!("Opened {} (page size {page_size:#x})", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
            page_size,
        })
    }
}

impl RegisterReader for DevMem {
    fn read32(&self, addr: u64) -> Result<u32> {
        if addr % 4 != 0 {
            return Err(PmgrError::access(addr, "unaligned 32-bit read"));
        }

        let page = addr & !(self.page_size - 1);
        let offset = (addr - page) as usize;
        let len = self.page_size as usize;

        // SAFETY: mmap of one page of /dev/mem, read-only.
        // Invariants: (1) fd is open for reading for the lifetime of self;
        // (2) len is the system page size and page is page-aligned;
        // (3) PROT_READ only, so the mapping can never be used to write hardware.
        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                len,
                ProtFlags::READ,
                MapFlags::SHARED,
                self.file.as_fd(),
                page,
            )
        }
        .map_err(|e| PmgrError::access(addr, format!("mmap of page {page:#x} failed: {e}")))?;

        // SAFETY: Volatile read from a memory-mapped hardware register.
        // Invariants: (1) ptr is valid for len bytes (successful mmap above);
        // (2) offset + 4 <= len since addr is 4-byte aligned and offset < len;
        // (3) the register is naturally aligned.
        #[allow(clippy::cast_ptr_alignment)]
        let value = unsafe { ptr.cast::<u8>().add(offset).cast::<u32>().read_volatile() };

        // SAFETY: ptr/len are exactly the mapping created above; no reference
        // into it outlives this call.
        if let Err(e) = unsafe { munmap(ptr, len) } {
            tracing::error!("munmap of page {page:#x} failed: {e}");
        }

        tracing::trace!("Read u32 @ {addr:#x} = {value:#x}");
        Ok(value)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
