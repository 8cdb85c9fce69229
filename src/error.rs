//! Error handling stuff
use displaydoc::Display;
use std::io;
use thiserror::Error;

use crate::codes::EventKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for this crate
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum Error {
    /// device is closed
    Closed,

    /// no matching device found
    NotFound,

    /// device opened read-only
    ReadOnly,

    /// read timed out
    Timeout,

    /// not implemented on this platform
    NotImplemented,

    /// unsupported event type {0}
    UnsupportedEventType(EventKind),

    /// {kind} code {code:#x} out of range
    InvalidCode { kind: EventKind, code: u16 },

    /// LED brightness out of range: {0}
    BrightnessOutOfRange(i32),

    /// {map} map length {len}, want {expected}
    MapLength {
        map: &'static str,
        len: usize,
        expected: usize,
    },

    /// unexpected value `{value}` in {attribute}
    InvalidData { attribute: String, value: String },

    /// IO Failed
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this is the timeout signal from a blocking read.
    ///
    /// Polling loops should treat this as "nothing happened yet".
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout)
    }

    /// Whether the kernel reported the request as unsupported by this
    /// device.
    ///
    /// Many devices lack `phys`/`uniq` strings, absolute axes, or
    /// joystick ioctls. The kernel answers those with `EINVAL`, `ENODEV`,
    /// `ENOTTY` or `ENOENT`, which callers should treat as a missing
    /// feature rather than a failure.
    pub fn is_unsupported(&self) -> bool {
        match self {
            Error::Io(e) => {
                e.kind() == io::ErrorKind::NotFound
                    || e.raw_os_error()
                        .map_or(false, |n| crate::sys::UNSUPPORTED_ERRNO.contains(&n))
            }
            _ => false,
        }
    }
}

/// Shorthand for an [`Error::InvalidData`] about `attribute`.
pub(crate) fn invalid_data(attribute: impl ToString, value: impl Into<String>) -> Error {
    Error::InvalidData {
        attribute: attribute.to_string(),
        value: value.into(),
    }
}
