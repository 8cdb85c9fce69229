//! Platforms without evdev or joydev
use std::{path::Path, time::Duration};

use crate::error::{Error, Result};

pub(crate) const UNSUPPORTED_ERRNO: &[i32] = &[];

pub(crate) fn ensure_supported() -> Result<()> {
    Err(Error::NotImplemented)
}

/// Can never be constructed
#[derive(Debug)]
pub(crate) enum RawHandle {}

impl RawHandle {
    pub fn open(_path: &Path) -> Result<(Self, bool)> {
        Err(Error::NotImplemented)
    }

    pub fn close(self) -> Result<()> {
        match self {}
    }

    pub fn wait_readable(&self, _timeout: Option<Duration>) -> Result<()> {
        match *self {}
    }

    pub fn read_exact(&self, _buf: &mut [u8]) -> Result<()> {
        match *self {}
    }

    pub fn write_exact(&self, _buf: &[u8]) -> Result<()> {
        match *self {}
    }
}
