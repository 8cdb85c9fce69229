//! Interface to the legacy joystick API, `/dev/input/js*`
//!
//! See the [kernel docs][1] for details.
//!
//! [1]: https://www.kernel.org/doc/html/latest/input/joydev/joystick-api.html
use std::{mem, path::Path, time::Duration};

use bitflags::bitflags;

use crate::{
    codes::{ABS_CNT, BTN_MISC, KEY_MAX},
    error::{Error, Result},
    raw::JsEvent,
    sys::{ioctl_call, nul_trimmed, Handle},
};

/// Internal ioctl stuff
pub(crate) mod _impl {
    use std::mem::size_of;

    use super::{Correction, AXIS_MAP_LEN, BUTTON_MAP_LEN};
    use crate::ioctl::{ior, iow, request_code, Direction};

    /// joydev's ioctl type
    const JOYDEV: u8 = b'j';

    pub const fn jsiocgversion() -> u32 {
        ior(JOYDEV, 0x01, size_of::<u32>())
    }

    pub const fn jsiocgaxes() -> u32 {
        ior(JOYDEV, 0x11, size_of::<u8>())
    }

    pub const fn jsiocgbuttons() -> u32 {
        ior(JOYDEV, 0x12, size_of::<u8>())
    }

    pub const fn jsiocgname(len: usize) -> u32 {
        request_code(Direction::Read, JOYDEV, 0x13, len)
    }

    /// The size is one `js_corr`, but the kernel transfers one per axis.
    pub const fn jsiocscorr() -> u32 {
        iow(JOYDEV, 0x21, size_of::<Correction>())
    }

    /// See [`jsiocscorr`]
    pub const fn jsiocgcorr() -> u32 {
        ior(JOYDEV, 0x22, size_of::<Correction>())
    }

    pub const fn jsiocsaxmap() -> u32 {
        iow(JOYDEV, 0x31, AXIS_MAP_LEN)
    }

    pub const fn jsiocgaxmap() -> u32 {
        ior(JOYDEV, 0x32, AXIS_MAP_LEN)
    }

    pub const fn jsiocsbtnmap() -> u32 {
        iow(JOYDEV, 0x33, BUTTON_MAP_LEN * size_of::<u16>())
    }

    pub const fn jsiocgbtnmap() -> u32 {
        ior(JOYDEV, 0x34, BUTTON_MAP_LEN * size_of::<u16>())
    }

    #[cfg(target_os = "linux")]
    pub use self::linux::*;

    #[cfg(target_os = "linux")]
    mod linux {
        use nix::*;

        use super::{
            jsiocgaxes, jsiocgaxmap, jsiocgbtnmap, jsiocgbuttons, jsiocgcorr, jsiocgname,
            jsiocgversion, jsiocsaxmap, jsiocsbtnmap, jsiocscorr,
        };
        use crate::{
            codes::ABS_CNT,
            joystick::{Correction, AXIS_MAP_LEN, BUTTON_MAP_LEN, NAME_LEN},
        };

        ioctl_read_bad!(get_version, jsiocgversion(), u32);
        ioctl_read_bad!(get_axes, jsiocgaxes(), u8);
        ioctl_read_bad!(get_buttons, jsiocgbuttons(), u8);
        ioctl_read_bad!(get_name, jsiocgname(NAME_LEN), [u8; NAME_LEN]);

        ioctl_read_bad!(get_axis_map, jsiocgaxmap(), [u8; AXIS_MAP_LEN]);
        ioctl_write_ptr_bad!(set_axis_map, jsiocsaxmap(), [u8; AXIS_MAP_LEN]);
        ioctl_read_bad!(get_button_map, jsiocgbtnmap(), [u16; BUTTON_MAP_LEN]);
        ioctl_write_ptr_bad!(set_button_map, jsiocsbtnmap(), [u16; BUTTON_MAP_LEN]);

        ioctl_read_bad!(
            /// Room for every axis the kernel can have, it writes one per axis
            get_correction,
            jsiocgcorr(),
            [Correction; ABS_CNT]
        );
        ioctl_write_ptr_bad!(
            /// Only the first `axes` entries are read
            set_correction,
            jsiocscorr(),
            [Correction; ABS_CNT]
        );
    }
}

/// Joystick names are truncated to this
pub(crate) const NAME_LEN: usize = 128;

/// Length of an axis map, one entry per absolute axis
pub const AXIS_MAP_LEN: usize = ABS_CNT;

/// Length of a button map, one entry per key code from [`BTN_MISC`] up
pub const BUTTON_MAP_LEN: usize = (KEY_MAX - BTN_MISC + 1) as usize;

bitflags! {
    /// Joystick event type
    ///
    /// When the device is opened the kernel first sends synthetic events
    /// describing the current state, with [`JsEventType::INIT`] set.
    /// Mask it off to get the underlying type.
    #[derive(Default)]
    pub struct JsEventType: u8 {
        const BUTTON = 0x01;
        const AXIS = 0x02;
        const INIT = 0x80;
    }
}

/// A joystick event
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct JoystickEvent {
    /// Milliseconds, from an arbitrary base
    pub time: u32,
    pub value: i16,
    pub kind: JsEventType,

    /// The type byte as the kernel sent it, including any bits
    /// [`JsEventType`] doesn't know about
    pub raw_type: u8,

    /// Axis or button index
    pub number: u8,
}

impl JoystickEvent {
    /// Whether this is a synthetic startup event
    pub fn is_init(&self) -> bool {
        self.kind.contains(JsEventType::INIT)
    }
}

/// Correction type for [`Correction`]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CorrectionType(pub u16);

impl CorrectionType {
    /// Raw values
    pub const NONE: Self = Self(0x00);

    /// Broken line, with a dead zone in the middle
    pub const BROKEN: Self = Self(0x01);
}

/// Axis calibration, `struct js_corr`
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Correction {
    pub coef: [i32; 8],
    pub prec: i16,
    pub kind: CorrectionType,
}

/// An open joystick device
///
/// Like [`Device`](crate::Device), this owns its file descriptor and has no
/// internal locking.
#[derive(Debug)]
pub struct Joystick {
    handle: Handle,
}

impl Joystick {
    /// Open the joystick at `path`, read-write if permitted.
    ///
    /// # Errors
    ///
    /// - If the device can't be opened at all
    /// - [`Error::NotImplemented`] on platforms without joydev
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            handle: Handle::open(path.as_ref())?,
        })
    }

    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    /// Whether remapping and calibration will be refused. Closed joysticks
    /// are read-only.
    pub fn is_read_only(&self) -> bool {
        self.handle.is_read_only()
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Close the joystick. Closing twice does nothing.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }

    #[cfg(target_os = "linux")]
    pub fn as_raw_fd(&self) -> Result<std::os::unix::io::RawFd> {
        Ok(self.handle.raw()?.as_raw_fd())
    }

    #[cfg(test)]
    pub(crate) fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// Driver version, such as `0x020100` for 2.1.0
    pub fn version(&self) -> Result<u32> {
        let mut v = 0;
        ioctl_call!(self.handle.raw()?, _impl::get_version, &mut v);
        Ok(v)
    }

    /// Number of axes
    pub fn axes(&self) -> Result<u8> {
        let mut n = 0;
        ioctl_call!(self.handle.raw()?, _impl::get_axes, &mut n);
        Ok(n)
    }

    /// Number of buttons
    pub fn buttons(&self) -> Result<u8> {
        let mut n = 0;
        ioctl_call!(self.handle.raw()?, _impl::get_buttons, &mut n);
        Ok(n)
    }

    pub fn name(&self) -> Result<String> {
        let mut buf = [0; NAME_LEN];
        ioctl_call!(self.handle.raw()?, _impl::get_name, &mut buf);
        Ok(nul_trimmed(&buf))
    }

    /// Which `ABS_*` code each joystick axis reports
    pub fn axis_map(&self) -> Result<Vec<u8>> {
        let mut map = [0u8; AXIS_MAP_LEN];
        ioctl_call!(self.handle.raw()?, _impl::get_axis_map, &mut map);
        Ok(map.to_vec())
    }

    /// Replace the axis map.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnly`]
    /// - [`Error::MapLength`] unless `map` has exactly [`AXIS_MAP_LEN`]
    ///   entries
    pub fn set_axis_map(&self, map: &[u8]) -> Result<()> {
        let raw = self.handle.writable()?;
        let map: [u8; AXIS_MAP_LEN] = map.try_into().map_err(|_| Error::MapLength {
            map: "axis",
            len: map.len(),
            expected: AXIS_MAP_LEN,
        })?;
        ioctl_call!(raw, _impl::set_axis_map, &map);
        Ok(())
    }

    /// Which key code each joystick button reports
    pub fn button_map(&self) -> Result<Vec<u16>> {
        let mut map = [0u16; BUTTON_MAP_LEN];
        ioctl_call!(self.handle.raw()?, _impl::get_button_map, &mut map);
        Ok(map.to_vec())
    }

    /// Replace the button map.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnly`]
    /// - [`Error::MapLength`] unless `map` has exactly [`BUTTON_MAP_LEN`]
    ///   entries
    pub fn set_button_map(&self, map: &[u16]) -> Result<()> {
        let raw = self.handle.writable()?;
        let map: [u16; BUTTON_MAP_LEN] = map.try_into().map_err(|_| Error::MapLength {
            map: "button",
            len: map.len(),
            expected: BUTTON_MAP_LEN,
        })?;
        ioctl_call!(raw, _impl::set_button_map, &map);
        Ok(())
    }

    /// Calibration for every axis, in axis order
    pub fn correction(&self) -> Result<Vec<Correction>> {
        let axes = usize::from(self.axes()?);
        let mut corr = [Correction::default(); ABS_CNT];
        ioctl_call!(self.handle.raw()?, _impl::get_correction, &mut corr);
        Ok(corr[..axes.min(ABS_CNT)].to_vec())
    }

    /// Replace the calibration of every axis.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnly`]
    /// - [`Error::MapLength`] unless there is exactly one entry per axis
    pub fn set_correction(&self, corr: &[Correction]) -> Result<()> {
        let raw = self.handle.writable()?;
        let axes = usize::from(self.axes()?);
        if corr.len() != axes {
            return Err(Error::MapLength {
                map: "correction",
                len: corr.len(),
                expected: axes,
            });
        }
        let mut all = [Correction::default(); ABS_CNT];
        for (dst, src) in all.iter_mut().zip(corr) {
            *dst = *src;
        }
        ioctl_call!(raw, _impl::set_correction, &all);
        Ok(())
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// [`None`] waits forever.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if nothing arrived in time
    /// - [`Error::Closed`]
    pub fn read_event(&self, timeout: Option<Duration>) -> Result<JoystickEvent> {
        let buf = self.handle.read_record::<{ JsEvent::SIZE }>(timeout)?;
        let raw = JsEvent::from_bytes(&buf);
        Ok(JoystickEvent {
            time: raw.time,
            value: raw.value,
            kind: JsEventType::from_bits_truncate(raw.type_),
            raw_type: raw.type_,
            number: raw.number,
        })
    }
}

const _: () = assert!(mem::size_of::<Correction>() == 36);
