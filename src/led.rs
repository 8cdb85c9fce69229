//! Controller LEDs, `/sys/class/leds/xpad*`
//!
//! xpad exposes the ring of light around the guide button as an LED whose
//! brightness selects one of a fixed set of patterns, see [`LedCommand`].
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    error::{invalid_data, Error, Result},
    sys,
    util::read_attribute,
};

/// Highest brightness xpad accepts
pub const MAX_BRIGHTNESS: i32 = 15;

/// An LED pattern.
///
/// The value is the brightness that selects it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LedCommand {
    Off = 0,
    AllBlink = 1,
    Player1Flash = 2,
    Player2Flash = 3,
    Player3Flash = 4,
    Player4Flash = 5,
    Player1 = 6,
    Player2 = 7,
    Player3 = 8,
    Player4 = 9,
    Rotate1 = 10,
    Rotate2 = 11,
    Rotate3 = 12,
    Rotate4 = 13,
    BlinkFast = 14,
    BlinkSlow = 15,
}

/// Names the driver documentation uses for the upper patterns
impl LedCommand {
    pub const ROTATE: Self = Self::Rotate1;
    pub const BLINK_PREVIOUS: Self = Self::Rotate2;
    pub const BLINK_SLOW_PREVIOUS: Self = Self::Rotate3;
    pub const ROTATE_DUAL: Self = Self::Rotate4;
    pub const BLINK_ALL_SLOW: Self = Self::BlinkFast;
    pub const BLINK_ONCE: Self = Self::BlinkSlow;
}

impl LedCommand {
    const ALL: [Self; 16] = [
        Self::Off,
        Self::AllBlink,
        Self::Player1Flash,
        Self::Player2Flash,
        Self::Player3Flash,
        Self::Player4Flash,
        Self::Player1,
        Self::Player2,
        Self::Player3,
        Self::Player4,
        Self::Rotate1,
        Self::Rotate2,
        Self::Rotate3,
        Self::Rotate4,
        Self::BlinkFast,
        Self::BlinkSlow,
    ];

    /// Steady light for `player`, 1 through 4
    pub fn player(player: u8) -> Option<Self> {
        match player {
            1..=4 => Some(Self::ALL[usize::from(player) + 5]),
            _ => None,
        }
    }

    /// The brightness selecting this pattern
    pub fn brightness(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for LedCommand {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(Error::BrightnessOutOfRange(value))
    }
}

impl fmt::Display for LedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An xpad LED
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Led {
    path: PathBuf,
    brightness_path: PathBuf,
}

impl Led {
    /// The LED at `path`, either its sysfs directory or the `brightness`
    /// file in it.
    ///
    /// Nothing is checked until it's used.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let brightness_path = if path.file_name().map_or(false, |n| n == "brightness") {
            path.to_path_buf()
        } else {
            path.join("brightness")
        };
        Self {
            path: brightness_path
                .parent()
                .map_or_else(PathBuf::new, Path::to_path_buf),
            brightness_path,
        }
    }

    /// sysfs directory of the LED
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn brightness_path(&self) -> &Path {
        &self.brightness_path
    }

    /// Current brightness
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidData`] if the file doesn't hold a number
    pub fn brightness(&self) -> Result<i32> {
        sys::ensure_supported()?;
        let text = read_attribute(&self.brightness_path)?;
        text.parse()
            .map_err(|_| invalid_data(self.brightness_path.display(), text))
    }

    /// Set the brightness, `0..=15`
    ///
    /// # Errors
    ///
    /// - [`Error::BrightnessOutOfRange`], before touching the file
    /// - Usually needs root
    pub fn set_brightness(&self, value: i32) -> Result<()> {
        sys::ensure_supported()?;
        if !(0..=MAX_BRIGHTNESS).contains(&value) {
            return Err(Error::BrightnessOutOfRange(value));
        }
        debug!("Setting {} to {}", self.brightness_path.display(), value);
        fs::write(&self.brightness_path, value.to_string())?;
        Ok(())
    }

    /// The pattern currently showing
    pub fn command(&self) -> Result<LedCommand> {
        LedCommand::try_from(self.brightness()?)
    }

    /// Show `cmd`
    pub fn set_command(&self, cmd: LedCommand) -> Result<()> {
        self.set_brightness(cmd.brightness())
    }
}
