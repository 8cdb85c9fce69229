//! Bindings to the Linux interfaces for xpad game controllers
//!
//! Xbox and compatible controllers handled by the kernel's `xpad` driver
//! show up as several devices at once:
//!
//! - An evdev device, `/dev/input/event*`, see [`Device`]. This is where
//!   input events, capabilities, and force feedback live.
//! - A legacy joystick device, `/dev/input/js*`, see [`Joystick`].
//! - An LED, `/sys/class/leds/xpad*`, see [`Led`].
//! - Driver wide settings, `/sys/module/xpad/parameters`, see [`params`].
//!
//! [`discovery`] finds all of them and ties them together.
//!
//! # Implementation details
//!
//! Everything here is a thin layer over ioctls and sysfs files. There is no
//! caching, every query goes to the kernel, and no locking, sharing handles
//! between threads is up to you.
//!
//! Only Linux has these interfaces. Elsewhere this crate still builds, but
//! every operation fails with [`Error::NotImplemented`].
#![doc(html_root_url = "https://docs.rs/xpad/0.1.0")]

pub mod bits;
pub mod codes;
pub mod discovery;
pub mod error;
pub mod evdev;
pub mod ff;
pub mod ioctl;
pub mod joystick;
pub mod led;
pub mod params;
pub mod util;

mod raw;
mod sys;

#[cfg(test)]
mod testutil;

pub use crate::{
    codes::EventKind,
    discovery::{find_xpad_devices, list_devices, open_first_xpad, DeviceInfo, Scanner},
    error::{Error, Result},
    evdev::{AbsInfo, Device, Event, InputId},
    ff::RumbleEffect,
    joystick::{Correction, CorrectionType, JoystickEvent, Joystick, JsEventType},
    led::{Led, LedCommand},
    params::{ModuleParams, Param, Parameters},
};
