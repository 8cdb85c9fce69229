//! Linux device file access
use std::{
    fs::{File, OpenOptions},
    io,
    os::unix::io::{AsRawFd, IntoRawFd, RawFd},
    path::Path,
    time::{Duration, Instant},
};

use log::debug;
use nix::{
    errno::Errno,
    poll::{poll, PollFd, PollFlags},
    unistd::close,
};
use rustix::fd::AsFd;

use crate::error::{Error, Result};

/// Errno values meaning "this device doesn't support that"
pub(crate) const UNSUPPORTED_ERRNO: &[i32] = &[libc::EINVAL, libc::ENODEV, libc::ENOTTY, libc::ENOENT];

/// sysfs and device files exist here.
pub(crate) fn ensure_supported() -> Result<()> {
    Ok(())
}

/// An open device file
#[derive(Debug)]
pub(crate) struct RawHandle {
    file: File,
}

impl RawHandle {
    /// Open `path` read-write, or read-only if writing isn't permitted.
    ///
    /// Returns whether the handle ended up read-only.
    pub fn open(path: &Path) -> Result<(Self, bool)> {
        match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => Ok((Self { file }, false)),
            Err(e)
                if e.kind() == io::ErrorKind::PermissionDenied
                    || e.raw_os_error() == Some(libc::EROFS) =>
            {
                debug!("Could not open {} for writing ({}), trying read-only", path.display(), e);
                let file = File::open(path)?;
                Ok((Self { file }, true))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open `path` read-only no matter the permissions
    #[cfg(test)]
    pub fn open_read_only(path: &Path) -> Result<Self> {
        Ok(Self {
            file: File::open(path)?,
        })
    }

    /// Close the descriptor, reporting any error from `close(2)`.
    pub fn close(self) -> Result<()> {
        close(self.file.into_raw_fd()).map_err(io::Error::from)?;
        Ok(())
    }

    pub fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Block until readable, or until `timeout` elapses.
    ///
    /// Retries on `EINTR` with whatever time is left.
    pub fn wait_readable(&self, timeout: Option<Duration>) -> Result<()> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let ms = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    // Round up, so we never wake before the deadline
                    let ms = left.as_millis() + u128::from(left.subsec_nanos() % 1_000_000 != 0);
                    libc::c_int::try_from(ms).unwrap_or(libc::c_int::MAX)
                }
                None => -1,
            };
            let mut fds = [PollFd::new(self.file.as_raw_fd(), PollFlags::POLLIN)];
            match poll(&mut fds, ms) {
                Ok(0) => return Err(Error::Timeout),
                Ok(_) => return Ok(()),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(Error::Io(e.into())),
            }
        }
    }

    /// Fill `buf` from the device.
    ///
    /// `EINTR` is returned like any other error. Signals arriving while
    /// blocked in `poll` are retried there instead.
    pub fn read_exact(&self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match rustix::io::read(self.file.as_fd(), &mut buf[filled..]) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
                Ok(n) => filled += n,
                Err(e) => return Err(Error::Io(e.into())),
            }
        }
        Ok(())
    }

    /// Write all of `buf` in one call. A short write is an error.
    pub fn write_exact(&self, buf: &[u8]) -> Result<()> {
        let n = rustix::io::write(self.file.as_fd(), buf).map_err(io::Error::from)?;
        if n != buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write, {n} of {} bytes", buf.len()),
            )
            .into());
        }
        Ok(())
    }
}
