//! xpad module parameters, `/sys/module/xpad/parameters`
//!
//! Each parameter is its own file, and they're read and written
//! independently. Writing usually needs root, and only affects controllers
//! connected afterwards.
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    error::{invalid_data, Result},
    sys,
    util::{read_attribute, SYSFS_PATH},
};

/// A boolean xpad parameter
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Param {
    /// Report the d-pad as buttons rather than a hat
    DpadToButtons,

    /// Report the triggers as buttons rather than axes
    TriggersToButtons,

    /// Don't report the sticks at all
    SticksToNull,

    /// Turn wireless controllers off with the guide button
    AutoPowerOff,
}

impl Param {
    pub const ALL: [Self; 4] = [
        Self::DpadToButtons,
        Self::TriggersToButtons,
        Self::SticksToNull,
        Self::AutoPowerOff,
    ];

    /// File name under the parameters directory
    pub fn file_name(self) -> &'static str {
        match self {
            Self::DpadToButtons => "dpad_to_buttons",
            Self::TriggersToButtons => "triggers_to_buttons",
            Self::SticksToNull => "sticks_to_null",
            Self::AutoPowerOff => "auto_poweroff",
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Every parameter at once
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModuleParams {
    pub dpad_to_buttons: bool,
    pub triggers_to_buttons: bool,
    pub sticks_to_null: bool,
    pub auto_poweroff: bool,
}

impl ModuleParams {
    pub fn get(&self, param: Param) -> bool {
        match param {
            Param::DpadToButtons => self.dpad_to_buttons,
            Param::TriggersToButtons => self.triggers_to_buttons,
            Param::SticksToNull => self.sticks_to_null,
            Param::AutoPowerOff => self.auto_poweroff,
        }
    }

    pub fn set(&mut self, param: Param, value: bool) {
        let field = match param {
            Param::DpadToButtons => &mut self.dpad_to_buttons,
            Param::TriggersToButtons => &mut self.triggers_to_buttons,
            Param::SticksToNull => &mut self.sticks_to_null,
            Param::AutoPowerOff => &mut self.auto_poweroff,
        };
        *field = value;
    }
}

/// A module parameters directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    path: PathBuf,
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new()
    }
}

impl Parameters {
    /// The loaded xpad module's parameters
    pub fn new() -> Self {
        Self::at(Path::new(SYSFS_PATH).join("module/xpad/parameters"))
    }

    /// Parameters in `path` instead
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one parameter
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidData`](crate::Error::InvalidData) if the file isn't
    ///   a recognizable boolean
    /// - If the module isn't loaded
    pub fn get(&self, param: Param) -> Result<bool> {
        sys::ensure_supported()?;
        let path = self.path.join(param.file_name());
        let text = read_attribute(&path)?;
        parse_bool(&text).ok_or_else(|| invalid_data(path.display(), text))
    }

    /// Write one parameter
    pub fn set(&self, param: Param, value: bool) -> Result<()> {
        sys::ensure_supported()?;
        let path = self.path.join(param.file_name());
        debug!("Setting {} to {}", path.display(), value);
        fs::write(path, if value { "1" } else { "0" })?;
        Ok(())
    }

    /// Read every parameter, failing on the first that can't be read.
    pub fn read(&self) -> Result<ModuleParams> {
        let mut params = ModuleParams::default();
        for p in Param::ALL {
            params.set(p, self.get(p)?);
        }
        Ok(params)
    }

    /// Write every parameter, in [`Param::ALL`] order.
    ///
    /// Stops at the first failure, leaving earlier ones written.
    pub fn write(&self, params: &ModuleParams) -> Result<()> {
        for p in Param::ALL {
            self.set(p, params.get(p))?;
        }
        Ok(())
    }
}

/// Read every xpad parameter, see [`Parameters::read`]
pub fn module_params() -> Result<ModuleParams> {
    Parameters::new().read()
}

/// Write every xpad parameter, see [`Parameters::write`]
pub fn set_module_params(params: &ModuleParams) -> Result<()> {
    Parameters::new().write(params)
}

/// Read one xpad parameter
pub fn param(param: Param) -> Result<bool> {
    Parameters::new().get(param)
}

/// Write one xpad parameter
pub fn set_param(param: Param, value: bool) -> Result<()> {
    Parameters::new().set(param, value)
}

/// Kernel `bool` parameters read back as `Y`/`N`, but people write all
/// sorts.
fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "1" | "true" | "on" => Some(true),
        "n" | "no" | "0" | "false" | "off" => Some(false),
        _ => None,
    }
}
