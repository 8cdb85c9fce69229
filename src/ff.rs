//! Force feedback, rumble in particular
//!
//! Effects live in the kernel, in numbered slots. Uploading an effect
//! returns its slot id, which is then used to play, stop, and erase it.
//! Ids belong to the [`Device`] they were uploaded to.
//!
//! See the [kernel docs][1] for details.
//!
//! [1]: https://www.kernel.org/doc/html/latest/input/ff.html
use std::time::Duration;

use crate::{
    codes::{EventKind, FF_AUTOCENTER, FF_GAIN},
    error::Result,
    evdev::{Device, _impl, Event},
    raw::{FfEffect, FfReplay},
    sys::ioctl_call,
};

/// Upload into a new slot
pub const FF_NEW_EFFECT: i16 = -1;

/// A rumble effect
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RumbleEffect {
    /// Slot to upload into, [`FF_NEW_EFFECT`] for a new one.
    ///
    /// Reusing the id of an uploaded effect replaces it.
    pub id: i16,

    /// Heavy motor magnitude
    pub strong: u16,

    /// Light motor magnitude
    pub weak: u16,

    /// How long the effect plays for, at millisecond granularity, up to
    /// `u16::MAX` milliseconds
    pub length: Duration,

    /// Delay before it starts
    pub delay: Duration,
}

impl RumbleEffect {
    /// A new rumble effect, uploaded to a new slot and starting immediately
    pub fn new(strong: u16, weak: u16, length: Duration) -> Self {
        Self {
            id: FF_NEW_EFFECT,
            strong,
            weak,
            length,
            delay: Duration::ZERO,
        }
    }
}

/// Kernel replay times are `u16` milliseconds, saturate rather than wrap.
pub(crate) fn duration_to_millis(d: Duration) -> u16 {
    u16::try_from(d.as_millis()).unwrap_or(u16::MAX)
}

impl Device {
    /// Upload `effect`, returning the slot it now occupies.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnly`](crate::Error::ReadOnly)
    /// - If the device has no free slots, or doesn't support rumble
    pub fn upload_rumble(&self, effect: &RumbleEffect) -> Result<i16> {
        let raw = self.handle().writable()?;
        let mut ff = FfEffect::rumble(
            effect.id,
            effect.strong,
            effect.weak,
            FfReplay {
                length: duration_to_millis(effect.length),
                delay: duration_to_millis(effect.delay),
            },
        );
        ioctl_call!(raw, _impl::upload_effect, &mut ff);
        Ok(ff.id)
    }

    /// Remove the effect in slot `id`, freeing it.
    pub fn erase_effect(&self, id: i16) -> Result<()> {
        ioctl_call!(self.handle().writable()?, _impl::erase_effect, id.into());
        Ok(())
    }

    /// Play the effect in slot `id`, `repeat` times.
    ///
    /// A `repeat` of 0 stops it.
    pub fn play_effect(&self, id: i16, repeat: i32) -> Result<()> {
        self.send_event(&Event::new(EventKind::FF, id as u16, repeat))
    }

    /// Stop the effect in slot `id`
    pub fn stop_effect(&self, id: i16) -> Result<()> {
        self.play_effect(id, 0)
    }

    /// Set the overall strength of all effects, `0..=0xffff`
    pub fn set_gain(&self, gain: u16) -> Result<()> {
        self.send_event(&Event::new(EventKind::FF, FF_GAIN, gain.into()))
    }

    /// Set the autocenter strength, `0..=0xffff`. 0 disables it.
    pub fn set_autocenter(&self, autocenter: u16) -> Result<()> {
        self.send_event(&Event::new(EventKind::FF, FF_AUTOCENTER, autocenter.into()))
    }

    /// Upload a rumble effect to a new slot and play it once.
    ///
    /// Returns the slot, which stays occupied until erased.
    pub fn rumble(&self, strong: u16, weak: u16, length: Duration) -> Result<i16> {
        let id = self.upload_rumble(&RumbleEffect::new(strong, weak, length))?;
        self.play_effect(id, 1)?;
        Ok(id)
    }
}
