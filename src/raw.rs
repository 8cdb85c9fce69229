//! Kernel ABI structures
//!
//! Records read from and written to device files are converted explicitly
//! to and from their little-endian byte layout. Structures passed through
//! `ioctl` are `#[repr(C)]` mirrors of their kernel counterparts.
use std::{
    mem,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

#[cfg(target_os = "linux")]
type TimeT = libc::time_t;
#[cfg(target_os = "linux")]
type SusecondsT = libc::suseconds_t;
#[cfg(not(target_os = "linux"))]
type TimeT = libc::c_long;
#[cfg(not(target_os = "linux"))]
type SusecondsT = libc::c_long;

/// `struct timeval`
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[repr(C)]
pub(crate) struct TimeVal {
    pub sec: TimeT,
    pub usec: SusecondsT,
}

impl TimeVal {
    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(d) => Self {
                sec: d.as_secs() as TimeT,
                usec: d.subsec_micros() as SusecondsT,
            },
            Err(e) => {
                // Before the epoch, keep usec positive like the kernel does
                let d = e.duration();
                let mut sec = -(d.as_secs() as TimeT);
                let mut usec = d.subsec_micros() as SusecondsT;
                if usec > 0 {
                    sec -= 1;
                    usec = 1_000_000 - usec;
                }
                Self { sec, usec }
            }
        }
    }

    pub fn to_system_time(self) -> SystemTime {
        let sec = self.sec as i64;
        let usec = (self.usec as i64).clamp(0, 999_999);
        let nanos = usec as u32 * 1000;
        if sec >= 0 {
            UNIX_EPOCH + Duration::new(sec as u64, nanos)
        } else {
            UNIX_EPOCH - Duration::from_secs(sec.unsigned_abs()) + Duration::from_nanos(nanos as u64)
        }
    }
}

/// Copy `N` bytes starting at `at`
fn take<const N: usize>(buf: &[u8], at: usize) -> [u8; N] {
    let mut out = [0; N];
    out.copy_from_slice(&buf[at..at + N]);
    out
}

/// `struct input_event`
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[repr(C)]
pub(crate) struct InputEvent {
    pub time: TimeVal,
    pub type_: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    pub const SIZE: usize = mem::size_of::<Self>();

    const SEC: usize = mem::size_of::<TimeT>();
    const USEC: usize = mem::size_of::<SusecondsT>();
    const TYPE: usize = mem::size_of::<TimeVal>();

    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut buf = [0; Self::SIZE];
        buf[..Self::SEC].copy_from_slice(&self.time.sec.to_le_bytes());
        buf[Self::SEC..Self::SEC + Self::USEC].copy_from_slice(&self.time.usec.to_le_bytes());
        buf[Self::TYPE..Self::TYPE + 2].copy_from_slice(&self.type_.to_le_bytes());
        buf[Self::TYPE + 2..Self::TYPE + 4].copy_from_slice(&self.code.to_le_bytes());
        buf[Self::TYPE + 4..Self::TYPE + 8].copy_from_slice(&self.value.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            time: TimeVal {
                sec: TimeT::from_le_bytes(take(buf, 0)),
                usec: SusecondsT::from_le_bytes(take(buf, Self::SEC)),
            },
            type_: u16::from_le_bytes(take(buf, Self::TYPE)),
            code: u16::from_le_bytes(take(buf, Self::TYPE + 2)),
            value: i32::from_le_bytes(take(buf, Self::TYPE + 4)),
        }
    }
}

/// `struct js_event`
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[repr(C)]
pub(crate) struct JsEvent {
    /// Milliseconds, arbitrary base
    pub time: u32,
    pub value: i16,
    pub type_: u8,
    pub number: u8,
}

impl JsEvent {
    pub const SIZE: usize = 8;

    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            time: u32::from_le_bytes(take(buf, 0)),
            value: i16::from_le_bytes(take(buf, 4)),
            type_: buf[6],
            number: buf[7],
        }
    }
}

/// `struct ff_trigger`
#[derive(Debug, Copy, Clone, Default)]
#[repr(C)]
pub(crate) struct FfTrigger {
    pub button: u16,
    pub interval: u16,
}

/// `struct ff_replay`, in milliseconds
#[derive(Debug, Copy, Clone, Default)]
#[repr(C)]
pub(crate) struct FfReplay {
    pub length: u16,
    pub delay: u16,
}

/// `struct ff_envelope`
#[derive(Debug, Copy, Clone, Default)]
#[repr(C)]
pub(crate) struct FfEnvelope {
    pub attack_length: u16,
    pub attack_level: u16,
    pub fade_length: u16,
    pub fade_level: u16,
}

/// `struct ff_periodic_effect`
///
/// Never filled in, but it is the largest member of the effect union and so
/// fixes the size and alignment of [`FfEffect`].
#[derive(Debug, Copy, Clone)]
#[repr(C)]
pub(crate) struct FfPeriodicEffect {
    pub waveform: u16,
    pub period: u16,
    pub magnitude: i16,
    pub offset: i16,
    pub phase: u16,
    pub envelope: FfEnvelope,
    pub custom_len: u32,
    pub custom_data: *mut i16,
}

/// `struct ff_rumble_effect`
#[derive(Debug, Copy, Clone, Default)]
#[repr(C)]
pub(crate) struct FfRumbleEffect {
    pub strong_magnitude: u16,
    pub weak_magnitude: u16,
}

/// The anonymous effect union inside `struct ff_effect`
#[derive(Copy, Clone)]
#[repr(C)]
pub(crate) union FfEffectData {
    pub rumble: FfRumbleEffect,
    pub periodic: FfPeriodicEffect,
}

/// `struct ff_effect`
///
/// Only rumble effects are built by this crate, so the union is only ever
/// written through its `rumble` member, and never read.
#[derive(Copy, Clone)]
#[repr(C)]
pub struct FfEffect {
    pub type_: u16,
    /// Slot, `-1` asks the kernel for a new one. Written back on upload.
    pub id: i16,
    pub direction: u16,
    pub trigger: FfTrigger,
    pub replay: FfReplay,
    pub u: FfEffectData,
}

impl FfEffect {
    pub const SIZE: usize = mem::size_of::<Self>();

    pub fn rumble(id: i16, strong: u16, weak: u16, replay: FfReplay) -> Self {
        let mut u = FfEffectData {
            periodic: FfPeriodicEffect {
                waveform: 0,
                period: 0,
                magnitude: 0,
                offset: 0,
                phase: 0,
                envelope: FfEnvelope::default(),
                custom_len: 0,
                custom_data: std::ptr::null_mut(),
            },
        };
        u.rumble = FfRumbleEffect {
            strong_magnitude: strong,
            weak_magnitude: weak,
        };
        Self {
            type_: crate::codes::FF_RUMBLE,
            id,
            direction: 0,
            trigger: FfTrigger::default(),
            replay,
            u,
        }
    }
}
