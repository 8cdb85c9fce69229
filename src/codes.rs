//! Input event types and codes
//!
//! These are open sets. The kernel adds new codes over time and drivers
//! may emit vendor codes, so types and codes stay plain integers with named
//! constants for the well-known subset.
//!
//! See `<linux/input-event-codes.h>`.
use std::fmt;

/// An input event type, `EV_*`
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct EventKind(pub u16);

impl EventKind {
    pub const SYN: Self = Self(0x00);
    pub const KEY: Self = Self(0x01);
    pub const REL: Self = Self(0x02);
    pub const ABS: Self = Self(0x03);
    pub const MSC: Self = Self(0x04);
    pub const SW: Self = Self(0x05);
    pub const LED: Self = Self(0x11);
    pub const SND: Self = Self(0x12);
    pub const REP: Self = Self(0x14);
    pub const FF: Self = Self(0x15);
    pub const PWR: Self = Self(0x16);
    pub const FF_STATUS: Self = Self(0x17);

    /// Highest code of this type, which sizes its capability bitset.
    ///
    /// [`None`] for types without a well-known code space.
    pub const fn max_code(self) -> Option<u16> {
        match self {
            Self::KEY => Some(KEY_MAX),
            Self::REL => Some(REL_MAX),
            Self::ABS => Some(ABS_MAX),
            Self::MSC => Some(MSC_MAX),
            Self::SW => Some(SW_MAX),
            Self::LED => Some(LED_MAX),
            Self::SND => Some(SND_MAX),
            Self::FF => Some(FF_MAX),
            _ => None,
        }
    }
}

impl From<u16> for EventKind {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::SYN => "EV_SYN",
            Self::KEY => "EV_KEY",
            Self::REL => "EV_REL",
            Self::ABS => "EV_ABS",
            Self::MSC => "EV_MSC",
            Self::SW => "EV_SW",
            Self::LED => "EV_LED",
            Self::SND => "EV_SND",
            Self::REP => "EV_REP",
            Self::FF => "EV_FF",
            Self::PWR => "EV_PWR",
            Self::FF_STATUS => "EV_FF_STATUS",
            Self(n) => return write!(f, "{n:#04x}"),
        };
        f.write_str(name)
    }
}

// Maximums
pub const EV_MAX: u16 = 0x1f;
pub const KEY_MAX: u16 = 0x2ff;
pub const REL_MAX: u16 = 0x0f;
pub const ABS_MAX: u16 = 0x3f;
pub const ABS_CNT: usize = ABS_MAX as usize + 1;
pub const MSC_MAX: u16 = 0x07;
pub const SW_MAX: u16 = 0x10;
pub const LED_MAX: u16 = 0x0f;
pub const SND_MAX: u16 = 0x07;
pub const FF_MAX: u16 = 0x7f;

/// First button code, joydev maps keys from here up.
pub const BTN_MISC: u16 = 0x100;

// Synchronization
pub const SYN_REPORT: u16 = 0;
pub const SYN_CONFIG: u16 = 1;
pub const SYN_MT_REPORT: u16 = 2;
pub const SYN_DROPPED: u16 = 3;

// Absolute axes
pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_Z: u16 = 0x02;
pub const ABS_RX: u16 = 0x03;
pub const ABS_RY: u16 = 0x04;
pub const ABS_RZ: u16 = 0x05;
pub const ABS_HAT0X: u16 = 0x10;
pub const ABS_HAT0Y: u16 = 0x11;
pub const ABS_PROFILE: u16 = 0x21;

// Gamepad buttons
pub const BTN_A: u16 = 0x130;
pub const BTN_B: u16 = 0x131;
pub const BTN_X: u16 = 0x133;
pub const BTN_Y: u16 = 0x134;
pub const BTN_TL: u16 = 0x136;
pub const BTN_TR: u16 = 0x137;
pub const BTN_TL2: u16 = 0x138;
pub const BTN_TR2: u16 = 0x139;
pub const BTN_SELECT: u16 = 0x13a;
pub const BTN_START: u16 = 0x13b;
pub const BTN_MODE: u16 = 0x13c;
pub const BTN_THUMBL: u16 = 0x13d;
pub const BTN_THUMBR: u16 = 0x13e;

// D-pad as buttons, when xpad's `dpad_to_buttons` is set
pub const BTN_DPAD_UP: u16 = 0x220;
pub const BTN_DPAD_DOWN: u16 = 0x221;
pub const BTN_DPAD_LEFT: u16 = 0x222;
pub const BTN_DPAD_RIGHT: u16 = 0x223;

// xpad reports d-pad and paddles through these on some models
pub const BTN_TRIGGER_HAPPY1: u16 = 0x2c0;
pub const BTN_TRIGGER_HAPPY2: u16 = 0x2c1;
pub const BTN_TRIGGER_HAPPY3: u16 = 0x2c2;
pub const BTN_TRIGGER_HAPPY4: u16 = 0x2c3;
pub const BTN_TRIGGER_HAPPY5: u16 = 0x2c4;
pub const BTN_TRIGGER_HAPPY6: u16 = 0x2c5;
pub const BTN_TRIGGER_HAPPY7: u16 = 0x2c6;
pub const BTN_TRIGGER_HAPPY8: u16 = 0x2c7;

/// Share button on newer controllers
pub const KEY_RECORD: u16 = 0x0a7;

// Force feedback
pub const FF_RUMBLE: u16 = 0x50;
pub const FF_GAIN: u16 = 0x60;
pub const FF_AUTOCENTER: u16 = 0x61;
