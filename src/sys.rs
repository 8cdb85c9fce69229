//! Platform implementations
//!
//! Only Linux has evdev and joydev. Everywhere else [`RawHandle`] is
//! uninhabited and every operation fails with [`Error::NotImplemented`].
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;

use crate::error::{Error, Result};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub(crate) use self::linux::*;

#[cfg(not(target_os = "linux"))]
mod unsupported;
#[cfg(not(target_os = "linux"))]
pub(crate) use self::unsupported::*;

/// Lifecycle shared by the evdev and joystick handles.
///
/// Owns at most one open file descriptor. Closing is idempotent, and every
/// operation on a closed handle fails with [`Error::Closed`].
#[derive(Debug)]
pub(crate) struct Handle {
    path: PathBuf,
    raw: Option<RawHandle>,
    read_only: bool,
}

impl Handle {
    pub fn open(path: &Path) -> Result<Self> {
        let (raw, read_only) = RawHandle::open(path)?;
        debug!(
            "Opened {} ({})",
            path.display(),
            if read_only { "read-only" } else { "read-write" }
        );
        Ok(Self {
            path: path.to_path_buf(),
            raw: Some(raw),
            read_only,
        })
    }

    /// Open `path` read-only, whether or not writing would be permitted.
    #[cfg(all(test, target_os = "linux"))]
    pub fn open_read_only(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            raw: Some(RawHandle::open_read_only(path)?),
            read_only: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.raw.is_none()
    }

    pub fn is_read_only(&self) -> bool {
        self.raw.is_none() || self.read_only
    }

    pub fn raw(&self) -> Result<&RawHandle> {
        self.raw.as_ref().ok_or(Error::Closed)
    }

    /// Like [`Handle::raw`], but also refuses read-only handles.
    pub fn writable(&self) -> Result<&RawHandle> {
        let raw = self.raw()?;
        if self.read_only {
            return Err(Error::ReadOnly);
        }
        Ok(raw)
    }

    pub fn close(&mut self) -> Result<()> {
        match self.raw.take() {
            Some(raw) => {
                self.read_only = false;
                debug!("Closing {}", self.path.display());
                raw.close()
            }
            None => Ok(()),
        }
    }

    /// Wait up to `timeout` for the device to become readable, then read
    /// exactly one `N` byte record.
    ///
    /// [`None`] waits forever.
    pub fn read_record<const N: usize>(&self, timeout: Option<Duration>) -> Result<[u8; N]> {
        let raw = self.raw()?;
        raw.wait_readable(timeout)?;
        let mut buf = [0; N];
        raw.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Write one record in a single `write(2)`.
    pub fn write_record(&self, buf: &[u8]) -> Result<()> {
        self.writable()?.write_exact(buf)
    }
}

/// Call `f`, a typed ioctl wrapper from an `_impl` module, on `raw`.
///
/// Errors are converted to [`Error::Io`]. Off Linux the handle is
/// uninhabited, so the call is never even compiled.
macro_rules! ioctl_call {
    ($raw:expr, $f:path $(, $arg:expr)*) => {{
        let raw: &$crate::sys::RawHandle = $raw;
        // Safety: the wrappers are typed to exactly what the request
        // encodes, and `raw` is open.
        #[cfg(target_os = "linux")]
        let ret = unsafe { $f(raw.as_raw_fd() $(, $arg)*) }.map_err(::std::io::Error::from)?;
        #[cfg(not(target_os = "linux"))]
        let ret = match *raw {};
        ret
    }};
}
pub(crate) use ioctl_call;

/// Kernel strings come back NUL padded
pub(crate) fn nul_trimmed(buf: &[u8]) -> String {
    let len = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..len]).into_owned()
}
