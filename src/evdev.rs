//! Interface to evdev, `/dev/input/event*`
//!
//! See the [kernel docs][1] for details.
//!
//! [1]: https://www.kernel.org/doc/html/latest/input/input.html#event-interface
use std::{
    mem,
    path::Path,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::{
    bits,
    codes::*,
    error::{Error, Result},
    raw::{InputEvent, TimeVal},
    sys::{ioctl_call, nul_trimmed, Handle},
};

/// Internal ioctl stuff
pub(crate) mod _impl {
    use std::mem::size_of;

    use crate::ioctl::{ior, iow, request_code, Direction};

    /// evdev's ioctl type
    const EVDEV: u8 = b'E';

    pub const fn eviocgid() -> u32 {
        ior(EVDEV, 0x02, size_of::<super::InputId>())
    }

    pub const fn eviocgname(len: usize) -> u32 {
        request_code(Direction::Read, EVDEV, 0x06, len)
    }

    pub const fn eviocgphys(len: usize) -> u32 {
        request_code(Direction::Read, EVDEV, 0x07, len)
    }

    pub const fn eviocguniq(len: usize) -> u32 {
        request_code(Direction::Read, EVDEV, 0x08, len)
    }

    /// `kind` 0 returns the supported event types themselves
    pub const fn eviocgbit(kind: u16, len: usize) -> u32 {
        request_code(Direction::Read, EVDEV, 0x20u16.wrapping_add(kind) as u8, len)
    }

    /// Only meaningful for `code <= ABS_MAX`. Past that the number runs
    /// into other requests.
    pub const fn eviocgabs(code: u16) -> u32 {
        ior(EVDEV, 0x40u16.wrapping_add(code) as u8, size_of::<super::AbsInfo>())
    }

    pub const fn eviocsff() -> u32 {
        iow(EVDEV, 0x80, crate::raw::FfEffect::SIZE)
    }

    pub const fn eviocrmff() -> u32 {
        iow(EVDEV, 0x81, size_of::<i32>())
    }

    pub const fn eviocgeffects() -> u32 {
        ior(EVDEV, 0x84, size_of::<i32>())
    }

    pub const fn eviocgrab() -> u32 {
        iow(EVDEV, 0x90, size_of::<i32>())
    }

    #[cfg(target_os = "linux")]
    pub use self::linux::*;

    #[cfg(target_os = "linux")]
    mod linux {
        use nix::{
            errno::Errno,
            libc::{self, c_int},
            *,
        };

        use super::{
            eviocgabs, eviocgbit, eviocgeffects, eviocgid, eviocgname, eviocgphys, eviocgrab,
            eviocguniq, eviocrmff, eviocsff,
        };
        use crate::{
            bits::byte_len,
            codes::*,
            evdev::{AbsInfo, InputId, STRING_LEN},
            raw::FfEffect,
        };

        ioctl_read_bad!(get_id, eviocgid(), InputId);
        ioctl_read_bad!(get_name, eviocgname(STRING_LEN), [u8; STRING_LEN]);
        ioctl_read_bad!(get_phys, eviocgphys(STRING_LEN), [u8; STRING_LEN]);
        ioctl_read_bad!(get_uniq, eviocguniq(STRING_LEN), [u8; STRING_LEN]);

        ioctl_read_bad!(
            /// Supported event types
            get_type_bits,
            eviocgbit(0, byte_len(EV_MAX)),
            [u8; byte_len(EV_MAX)]
        );
        ioctl_read_bad!(
            get_key_bits,
            eviocgbit(EventKind::KEY.0, byte_len(KEY_MAX)),
            [u8; byte_len(KEY_MAX)]
        );
        ioctl_read_bad!(
            get_rel_bits,
            eviocgbit(EventKind::REL.0, byte_len(REL_MAX)),
            [u8; byte_len(REL_MAX)]
        );
        ioctl_read_bad!(
            get_abs_bits,
            eviocgbit(EventKind::ABS.0, byte_len(ABS_MAX)),
            [u8; byte_len(ABS_MAX)]
        );
        ioctl_read_bad!(
            get_msc_bits,
            eviocgbit(EventKind::MSC.0, byte_len(MSC_MAX)),
            [u8; byte_len(MSC_MAX)]
        );
        ioctl_read_bad!(
            get_sw_bits,
            eviocgbit(EventKind::SW.0, byte_len(SW_MAX)),
            [u8; byte_len(SW_MAX)]
        );
        ioctl_read_bad!(
            get_led_bits,
            eviocgbit(EventKind::LED.0, byte_len(LED_MAX)),
            [u8; byte_len(LED_MAX)]
        );
        ioctl_read_bad!(
            get_snd_bits,
            eviocgbit(EventKind::SND.0, byte_len(SND_MAX)),
            [u8; byte_len(SND_MAX)]
        );
        ioctl_read_bad!(
            get_ff_bits,
            eviocgbit(EventKind::FF.0, byte_len(FF_MAX)),
            [u8; byte_len(FF_MAX)]
        );

        ioctl_read_bad!(get_effects, eviocgeffects(), c_int);

        ioctl_readwrite_bad!(
            /// Encoded as a write, but the kernel writes the assigned id back.
            upload_effect,
            eviocsff(),
            FfEffect
        );

        ioctl_write_int_bad!(
            /// Takes the effect id by value
            erase_effect,
            eviocrmff()
        );

        ioctl_write_int_bad!(
            /// Takes the grab flag by value
            grab,
            eviocgrab()
        );

        /// `EVIOCGABS(code)`, the axis is part of the request number.
        ///
        /// # Safety
        ///
        /// `code` must be at most `ABS_MAX`
        pub unsafe fn get_abs(fd: c_int, code: u16, data: *mut AbsInfo) -> nix::Result<c_int> {
            Errno::result(libc::ioctl(fd, eviocgabs(code) as _, data))
        }
    }
}

/// evdev string buffers are this big
pub(crate) const STRING_LEN: usize = 256;

/// Device identity, `struct input_id`
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct InputId {
    pub bus_type: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

/// Absolute axis information, `struct input_absinfo`
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct AbsInfo {
    /// Latest reported value
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,

    /// Noise filter, changes smaller than this are dropped
    pub fuzz: i32,

    /// Dead zone around the center
    pub flat: i32,

    /// Units per millimeter, or per radian for rotational axes
    pub resolution: i32,
}

/// An input event
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Event {
    /// When the kernel generated the event.
    ///
    /// [`UNIX_EPOCH`] means "unset", and [`Device::send_event`] substitutes
    /// the current time.
    pub time: SystemTime,
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
}

impl Event {
    /// A new event without a timestamp
    pub fn new(kind: EventKind, code: u16, value: i32) -> Self {
        Self {
            time: UNIX_EPOCH,
            kind,
            code,
            value,
        }
    }
}

// Private
impl Event {
    fn from_raw(raw: InputEvent) -> Self {
        Self {
            time: raw.time.to_system_time(),
            kind: EventKind(raw.type_),
            code: raw.code,
            value: raw.value,
        }
    }

    fn to_raw(self) -> InputEvent {
        let time = if self.time == UNIX_EPOCH {
            SystemTime::now()
        } else {
            self.time
        };
        InputEvent {
            time: TimeVal::from_system_time(time),
            type_: self.kind.0,
            code: self.code,
            value: self.value,
        }
    }
}

/// An open evdev device
///
/// Owns its file descriptor. Dropping closes it, or use [`Device::close`]
/// to see any error.
///
/// There is no internal locking, sharing between threads is up to you.
#[derive(Debug)]
pub struct Device {
    handle: Handle,
}

// Lifecycle
impl Device {
    /// Open the device at `path`
    ///
    /// Read-write is tried first, for force feedback and [`Device::send_event`].
    /// If that isn't permitted the device is opened read-only instead,
    /// see [`Device::is_read_only`].
    ///
    /// # Errors
    ///
    /// - If the device can't be opened at all
    /// - [`Error::NotImplemented`] on platforms without evdev
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            handle: Handle::open(path.as_ref())?,
        })
    }

    /// Path this device was opened from
    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    /// Whether writes will be refused. Closed devices are read-only.
    pub fn is_read_only(&self) -> bool {
        self.handle.is_read_only()
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Close the device.
    ///
    /// Closing an already closed device does nothing.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }

    /// The underlying file descriptor
    #[cfg(target_os = "linux")]
    pub fn as_raw_fd(&self) -> Result<std::os::unix::io::RawFd> {
        Ok(self.handle.raw()?.as_raw_fd())
    }

    pub(crate) fn handle(&self) -> &Handle {
        &self.handle
    }

    #[cfg(test)]
    pub(crate) fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

// Identity and capabilities
impl Device {
    /// Device name
    ///
    /// # Errors
    ///
    /// - [`Error::Closed`]
    /// - If the ioctl fails
    pub fn name(&self) -> Result<String> {
        let mut buf = [0; STRING_LEN];
        ioctl_call!(self.handle.raw()?, _impl::get_name, &mut buf);
        Ok(nul_trimmed(&buf))
    }

    /// Physical location, such as `usb-0000:00:14.0-2/input0`
    ///
    /// # Errors
    ///
    /// Many devices don't have one, see [`Error::is_unsupported`].
    pub fn phys(&self) -> Result<String> {
        let mut buf = [0; STRING_LEN];
        ioctl_call!(self.handle.raw()?, _impl::get_phys, &mut buf);
        Ok(nul_trimmed(&buf))
    }

    /// Unique identifier, usually a serial number
    ///
    /// # Errors
    ///
    /// Many devices don't have one, see [`Error::is_unsupported`].
    pub fn uniq(&self) -> Result<String> {
        let mut buf = [0; STRING_LEN];
        ioctl_call!(self.handle.raw()?, _impl::get_uniq, &mut buf);
        Ok(nul_trimmed(&buf))
    }

    /// Bus, vendor, product and version IDs
    pub fn id(&self) -> Result<InputId> {
        let mut id = InputId::default();
        ioctl_call!(self.handle.raw()?, _impl::get_id, &mut id);
        Ok(id)
    }

    /// Information about absolute axis `code`, one of the `ABS_*` codes.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCode`] if `code` is past [`ABS_MAX`], without
    ///   asking the kernel
    pub fn abs_info(&self, code: u16) -> Result<AbsInfo> {
        let raw = self.handle.raw()?;
        if code > ABS_MAX {
            return Err(Error::InvalidCode {
                kind: EventKind::ABS,
                code,
            });
        }
        let mut info = AbsInfo::default();
        ioctl_call!(raw, _impl::get_abs, code, &mut info);
        Ok(info)
    }

    /// Bitset of supported event types, see [`bits`]
    pub fn event_types(&self) -> Result<Vec<u8>> {
        self.bitset(EventKind::SYN)
    }

    /// Whether the device reports events of type `kind`
    pub fn has_event_type(&self, kind: EventKind) -> Result<bool> {
        Ok(bits::test(&self.event_types()?, kind.0))
    }

    /// Bitset of supported codes for `kind`, see [`bits`]
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedEventType`] if `kind` has no known code space,
    ///   see [`EventKind::max_code`]
    pub fn event_codes(&self, kind: EventKind) -> Result<Vec<u8>> {
        kind.max_code().ok_or(Error::UnsupportedEventType(kind))?;
        self.bitset(kind)
    }

    /// Whether the device reports `code` for events of type `kind`
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedEventType`] if `kind` has no known code space,
    ///   see [`EventKind::max_code`]
    pub fn has_event_code(&self, kind: EventKind, code: u16) -> Result<bool> {
        Ok(bits::test(&self.event_codes(kind)?, code))
    }

    /// Number of force feedback effects the device can hold at once
    pub fn effect_count(&self) -> Result<i32> {
        let mut count = 0;
        ioctl_call!(self.handle.raw()?, _impl::get_effects, &mut count);
        Ok(count)
    }

    /// Grab, or release, exclusive access to the device.
    ///
    /// While grabbed, no other client receives its events.
    pub fn grab(&self, grab: bool) -> Result<()> {
        ioctl_call!(self.handle.raw()?, _impl::grab, grab.into());
        Ok(())
    }

    /// `EVIOCGBIT` for `kind`, [`EventKind::SYN`] meaning the event types
    /// themselves.
    fn bitset(&self, kind: EventKind) -> Result<Vec<u8>> {
        let raw = self.handle.raw()?;
        macro_rules! read_bits {
            ($f:path, $max:expr) => {{
                let mut buf = [0u8; bits::byte_len($max)];
                ioctl_call!(raw, $f, &mut buf);
                buf.to_vec()
            }};
        }
        Ok(match kind {
            EventKind::SYN => read_bits!(_impl::get_type_bits, EV_MAX),
            EventKind::KEY => read_bits!(_impl::get_key_bits, KEY_MAX),
            EventKind::REL => read_bits!(_impl::get_rel_bits, REL_MAX),
            EventKind::ABS => read_bits!(_impl::get_abs_bits, ABS_MAX),
            EventKind::MSC => read_bits!(_impl::get_msc_bits, MSC_MAX),
            EventKind::SW => read_bits!(_impl::get_sw_bits, SW_MAX),
            EventKind::LED => read_bits!(_impl::get_led_bits, LED_MAX),
            EventKind::SND => read_bits!(_impl::get_snd_bits, SND_MAX),
            EventKind::FF => read_bits!(_impl::get_ff_bits, FF_MAX),
            _ => return Err(Error::UnsupportedEventType(kind)),
        })
    }
}

// Events
impl Device {
    /// Wait up to `timeout` for the next event.
    ///
    /// [`None`] waits forever.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if nothing arrived in time. This is expected when
    ///   polling, see [`Error::is_timeout`].
    /// - [`Error::Closed`]
    /// - If reading fails, such as when the device is unplugged.
    pub fn read_event(&self, timeout: Option<Duration>) -> Result<Event> {
        let buf = self.handle.read_record::<{ InputEvent::SIZE }>(timeout)?;
        Ok(Event::from_raw(InputEvent::from_bytes(&buf)))
    }

    /// Write an event to the device.
    ///
    /// This is how LEDs and force feedback are driven.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnly`] if the device was opened read-only
    /// - [`Error::Closed`]
    /// - If writing fails
    pub fn send_event(&self, event: &Event) -> Result<()> {
        self.handle.write_record(&event.to_raw().to_bytes())
    }
}

/// Size check for the ioctl structures
const _: () = assert!(mem::size_of::<InputId>() == 8 && mem::size_of::<AbsInfo>() == 24);

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use anyhow::Result;
    use nix::{sys::stat::Mode, unistd::mkfifo};

    use super::*;
    use crate::{codes::*, testutil::TempDir};

    #[test]
    fn request_codes() {
        // Values from <linux/input.h> on x86_64
        assert_eq!(_impl::eviocgid(), 0x8008_4502);
        assert_eq!(_impl::eviocgname(256), 0x8100_4506);
        assert_eq!(_impl::eviocgbit(0, 4), 0x8004_4520);
        assert_eq!(_impl::eviocgbit(EventKind::KEY.0, 96), 0x8060_4521);
        assert_eq!(_impl::eviocgabs(ABS_X), 0x8018_4540);
        assert_eq!(_impl::eviocgabs(ABS_HAT0Y), 0x8018_4551);
        assert_eq!(_impl::eviocrmff(), 0x4004_4581);
        assert_eq!(_impl::eviocgeffects(), 0x8004_4584);
        assert_eq!(_impl::eviocgrab(), 0x4004_4590);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn upload_request_code() {
        assert_eq!(_impl::eviocsff(), 0x4030_4580);
    }

    /// A fifo behaves enough like an idle device to check the event path
    fn fifo_device(dir: &TempDir) -> Result<Device> {
        let fifo = dir.path().join("event0");
        mkfifo(&fifo, Mode::S_IRWXU)?;
        Ok(Device::open(&fifo)?)
    }

    #[test]
    fn send_then_read() -> Result<()> {
        let dir = TempDir::new("evdev")?;
        let dev = fifo_device(&dir)?;
        assert!(!dev.is_read_only());

        let sent = Event {
            time: UNIX_EPOCH + Duration::new(1_600_000_000, 250_000_000),
            ..Event::new(EventKind::KEY, BTN_A, 1)
        };
        dev.send_event(&sent)?;
        let got = dev.read_event(Some(Duration::from_secs(1)))?;
        assert_eq!(got, sent);

        // Missing timestamps become "now"
        let before = SystemTime::now() - Duration::from_secs(1);
        dev.send_event(&Event::new(EventKind::ABS, ABS_X, -32768))?;
        let got = dev.read_event(Some(Duration::from_secs(1)))?;
        assert!(got.time > before);
        assert_eq!((got.kind, got.code, got.value), (EventKind::ABS, ABS_X, -32768));
        Ok(())
    }

    #[test]
    fn idle_read_times_out() -> Result<()> {
        let dir = TempDir::new("evdev-idle")?;
        let dev = fifo_device(&dir)?;
        let e = dev.read_event(Some(Duration::from_millis(5))).unwrap_err();
        assert!(e.is_timeout(), "{e:?}");
        Ok(())
    }

    #[test]
    fn closed_device() -> Result<()> {
        let dir = TempDir::new("evdev-closed")?;
        let mut dev = fifo_device(&dir)?;
        dev.close()?;
        dev.close()?;
        assert!(dev.is_closed());
        assert!(matches!(dev.name(), Err(Error::Closed)));
        assert!(matches!(dev.id(), Err(Error::Closed)));
        assert!(matches!(dev.event_types(), Err(Error::Closed)));
        assert!(matches!(dev.grab(true), Err(Error::Closed)));
        assert!(matches!(dev.read_event(None), Err(Error::Closed)));
        assert!(matches!(
            dev.send_event(&Event::new(EventKind::SYN, SYN_REPORT, 0)),
            Err(Error::Closed)
        ));
        assert!(matches!(dev.as_raw_fd(), Err(Error::Closed)));
        Ok(())
    }

    #[test]
    fn unknown_event_type() -> Result<()> {
        let dir = TempDir::new("evdev-kind")?;
        let dev = fifo_device(&dir)?;
        assert!(matches!(
            dev.has_event_code(EventKind::SYN, 0),
            Err(Error::UnsupportedEventType(EventKind::SYN))
        ));
        // The fifo isn't an evdev device, so the kernel refuses the query
        assert!(dev.has_event_code(EventKind::ABS, ABS_X).unwrap_err().is_unsupported());
        Ok(())
    }

    #[test]
    fn kernel_refuses_fifo() -> Result<()> {
        let dir = TempDir::new("evdev-ioctl")?;
        let dev = fifo_device(&dir)?;
        let errors = [
            dev.name().err(),
            dev.phys().err(),
            dev.uniq().err(),
            dev.id().err(),
            dev.event_types().err(),
            dev.effect_count().err(),
            dev.abs_info(ABS_X).err(),
            dev.grab(true).err(),
            dev.grab(false).err(),
        ];
        for e in errors {
            let e = e.expect("fifo accepted an evdev ioctl");
            assert!(e.is_unsupported(), "{e:?}");
        }
        Ok(())
    }

    #[test]
    fn abs_code_range() -> Result<()> {
        // Past ABS_MAX the request number wraps into EVIOCGBIT
        assert_eq!(_impl::eviocgabs(0xe0), _impl::eviocgbit(0, 24));

        let dir = TempDir::new("evdev-abs")?;
        let dev = fifo_device(&dir)?;
        for code in [ABS_MAX + 1, 0xe0, u16::MAX] {
            let e = dev.abs_info(code).unwrap_err();
            assert!(
                matches!(e, Error::InvalidCode { kind: EventKind::ABS, code: c } if c == code),
                "{e:?}"
            );
        }

        let mut dev = dev;
        dev.close()?;
        assert!(matches!(dev.abs_info(0xe0), Err(Error::Closed)));
        Ok(())
    }

    /// Exercise a real controller, if one is attached.
    #[test]
    #[ignore = "needs a controller"]
    fn hardware() -> Result<()> {
        let infos = crate::discovery::find_xpad_devices()?;
        let Some(info) = infos.first() else {
            return Ok(());
        };
        let dev = info.open()?;
        dbg!(dev.name()?);
        for r in [dev.phys(), dev.uniq()] {
            match r {
                Ok(s) => {
                    dbg!(s);
                }
                Err(e) if e.is_unsupported() => (),
                Err(e) => return Err(e.into()),
            }
        }
        dbg!(dev.id()?);
        if dev.has_event_type(EventKind::ABS)? && dev.has_event_code(EventKind::ABS, ABS_X)? {
            dbg!(dev.abs_info(ABS_X)?);
        }
        dbg!(dev.effect_count()?);
        match dev.read_event(Some(Duration::from_millis(5))) {
            Ok(ev) => {
                dbg!(ev);
            }
            Err(e) if e.is_timeout() => (),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}
