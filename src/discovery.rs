//! Finding controllers through sysfs
//!
//! Every event device under `/dev/input` is matched with its sysfs node,
//! the joystick device and LED sharing its backing device, and the identity
//! attributes sysfs exposes.
//!
//! A scan is a snapshot. Devices come and go, and [`DeviceInfo`] is never
//! refreshed.
//!
//! See the [sysfs rules][1] for details
//!
//! [1]: https://www.kernel.org/doc/html/latest/admin-guide/sysfs-rules.html
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    error::{Error, Result},
    evdev::Device,
    joystick::Joystick,
    led::{Led, LedCommand},
    sys,
    util::{entries, link_name, parse_id, read_attribute, DEV_PATH, SYSFS_PATH},
};

/// Driver names containing this are xpad
const DRIVER_TOKEN: &str = "xpad";

/// Device names containing any of these are xpad
const NAME_TOKENS: &[&str] = &["xpad", "xbox", "x-box"];

/// A discovered input device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Event device, such as `/dev/input/event3`
    pub path: PathBuf,

    /// sysfs node for [`DeviceInfo::path`], such as
    /// `/sys/class/input/event3`
    pub sysfs_path: PathBuf,

    /// Canonical sysfs path of the backing input device
    pub device_path: Option<PathBuf>,

    /// Joystick device for the same controller, such as `/dev/input/js0`
    pub joystick_path: Option<PathBuf>,

    /// sysfs LED directory, such as `/sys/class/leds/xpad0`
    pub led_path: Option<PathBuf>,

    /// The `brightness` file in [`DeviceInfo::led_path`]
    pub led_brightness_path: Option<PathBuf>,

    pub name: String,
    pub phys: String,
    pub uniq: String,

    /// Driver bound to the controller, empty if unknown
    pub driver: String,

    pub bus_type: u16,
    pub vendor_id: u16,
    pub product_id: u16,
    pub version_id: u16,
}

impl DeviceInfo {
    /// Whether this looks like a controller handled by xpad.
    ///
    /// This is a guess from the driver and device names, and can be wrong
    /// both ways.
    pub fn is_xpad(&self) -> bool {
        if self.driver.to_lowercase().contains(DRIVER_TOKEN) {
            return true;
        }
        let name = self.name.to_lowercase();
        NAME_TOKENS.iter().any(|t| name.contains(t))
    }

    /// Open the event device
    pub fn open(&self) -> Result<Device> {
        Device::open(&self.path)
    }

    /// Open the joystick device
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if there isn't one
    pub fn open_joystick(&self) -> Result<Joystick> {
        Joystick::open(self.joystick_path.as_ref().ok_or(Error::NotFound)?)
    }

    /// The controller's LED
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if there isn't one
    pub fn led(&self) -> Result<Led> {
        let path = self
            .led_brightness_path
            .as_ref()
            .or(self.led_path.as_ref())
            .ok_or(Error::NotFound)?;
        Ok(Led::open(path))
    }

    /// Show `cmd` on the controller's LED
    pub fn set_led(&self, cmd: LedCommand) -> Result<()> {
        self.led()?.set_command(cmd)
    }
}

/// Scans sysfs and `/dev` for input devices
#[derive(Debug, Clone)]
pub struct Scanner {
    sysfs: PathBuf,
    dev: PathBuf,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Scan the real system, at [`SYSFS_PATH`] and [`DEV_PATH`]
    pub fn new() -> Self {
        Self::with_roots(SYSFS_PATH, DEV_PATH)
    }

    /// Scan a tree with sysfs at `sysfs` and device files at `dev`
    pub fn with_roots<S: Into<PathBuf>, D: Into<PathBuf>>(sysfs: S, dev: D) -> Self {
        Self {
            sysfs: sysfs.into(),
            dev: dev.into(),
        }
    }

    /// All event devices, sorted by path.
    ///
    /// Missing attributes are left empty or zero, and missing siblings as
    /// [`None`]. One odd device never fails the whole scan.
    ///
    /// # Errors
    ///
    /// - [`Error::NotImplemented`] on platforms without sysfs
    /// - If a device directory exists but can't be listed
    pub fn devices(&self) -> Result<Vec<DeviceInfo>> {
        sys::ensure_supported()?;
        let class = self.sysfs.join("class");
        let input_dev = self.dev.join("input");

        let joysticks: HashMap<PathBuf, PathBuf> = backing_devices(&class.join("input"), "js")?
            .into_iter()
            .filter_map(|(backing, node)| Some((backing, input_dev.join(node.file_name()?))))
            .collect();
        let leds = backing_devices(&class.join("leds"), "xpad")?;

        let mut infos = Vec::new();
        for path in entries(&input_dev, "event")? {
            let Some(base) = path.file_name() else {
                continue;
            };
            let sysfs_path = class.join("input").join(base);
            let dev_link = sysfs_path.join("device");

            let mut info = DeviceInfo {
                device_path: fs::canonicalize(&dev_link).ok(),
                name: attribute(&dev_link.join("name")),
                phys: attribute(&dev_link.join("phys")),
                uniq: attribute(&dev_link.join("uniq")),
                driver: link_name(&dev_link.join("driver"))
                    .or_else(|| link_name(&dev_link.join("device").join("driver")))
                    .unwrap_or_default(),
                bus_type: id(&dev_link, "bustype"),
                vendor_id: id(&dev_link, "vendor"),
                product_id: id(&dev_link, "product"),
                version_id: id(&dev_link, "version"),
                path,
                sysfs_path,
                ..Default::default()
            };

            match &info.device_path {
                Some(backing) => {
                    info.joystick_path = joysticks.get(backing).cloned();
                    if let Some(led) = nearest_led(&leds, backing) {
                        info.led_brightness_path = Some(led.join("brightness"));
                        info.led_path = Some(led.to_path_buf());
                    }
                }
                None => debug!("{} has no backing device", info.sysfs_path.display()),
            }
            infos.push(info);
        }

        infos.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(infos)
    }

    /// Only the devices that [look like xpad](DeviceInfo::is_xpad)
    pub fn xpad_devices(&self) -> Result<Vec<DeviceInfo>> {
        let mut infos = self.devices()?;
        infos.retain(DeviceInfo::is_xpad);
        Ok(infos)
    }
}

/// All event devices on the system, see [`Scanner::devices`]
pub fn list_devices() -> Result<Vec<DeviceInfo>> {
    Scanner::new().devices()
}

/// All xpad controllers on the system, see [`DeviceInfo::is_xpad`]
pub fn find_xpad_devices() -> Result<Vec<DeviceInfo>> {
    Scanner::new().xpad_devices()
}

/// Open the first xpad controller, by path
///
/// # Errors
///
/// - [`Error::NotFound`] if there are none
pub fn open_first_xpad() -> Result<Device> {
    find_xpad_devices()?
        .first()
        .ok_or(Error::NotFound)?
        .open()
}

/// Class nodes in `class_dir` starting with `prefix`, with the canonical
/// path of their backing device.
///
/// Nodes without one are skipped.
fn backing_devices(class_dir: &Path, prefix: &str) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut out = Vec::new();
    for node in entries(class_dir, prefix)? {
        match fs::canonicalize(node.join("device")) {
            Ok(backing) => out.push((backing, node)),
            Err(e) => debug!("Skipping {}: {}", node.display(), e),
        }
    }
    Ok(out)
}

/// The LED on `backing`, or failing that, on its closest parent.
///
/// Controller LEDs hang off the USB interface, above the input device.
/// A parent only counts if exactly one LED hangs off it, several there
/// can't be told apart.
fn nearest_led<'a>(leds: &'a [(PathBuf, PathBuf)], backing: &Path) -> Option<&'a Path> {
    let above = || leds.iter().filter(|(led_backing, _)| backing.starts_with(led_backing));
    let depth = above()
        .map(|(led_backing, _)| led_backing.components().count())
        .max()?;
    let mut nearest = above().filter(|(led_backing, _)| led_backing.components().count() == depth);
    let (_, node) = nearest.next()?;
    if nearest.next().is_some() {
        debug!("{} has several equally close LEDs, using none", backing.display());
        return None;
    }
    Some(node)
}

fn attribute(path: &Path) -> String {
    read_attribute(path).unwrap_or_default()
}

fn id(dev: &Path, name: &str) -> u16 {
    read_attribute(&dev.join("id").join(name))
        .ok()
        .and_then(|s| parse_id(&s))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, driver: &str) -> DeviceInfo {
        DeviceInfo {
            name: name.into(),
            driver: driver.into(),
            ..Default::default()
        }
    }

    #[test]
    fn classify() {
        assert!(info("", "hid-xpad").is_xpad());
        assert!(info("", "XPAD").is_xpad());
        assert!(info("Xbox 360 Controller", "").is_xpad());
        assert!(info("Microsoft X-Box pad v1 (US)", "").is_xpad());
        assert!(info("X-BOX Controller", "usbhid").is_xpad());
        assert!(!info("Generic Gamepad", "hid-generic").is_xpad());
        assert!(!info("", "").is_xpad());
    }

    #[test]
    fn nearest() {
        let leds = vec![
            (PathBuf::from("/sys/devices/usb1/1-1/1-1:1.0"), PathBuf::from("xpad0")),
            (PathBuf::from("/sys/devices/usb1/1-1/1-1:1.2"), PathBuf::from("xpad1")),
            (PathBuf::from("/sys/devices/usb1/1-1"), PathBuf::from("xpad9")),
        ];
        let found = |p: &str| nearest_led(&leds, Path::new(p)).map(Path::to_path_buf);
        assert_eq!(
            found("/sys/devices/usb1/1-1/1-1:1.0/input/input5"),
            Some("xpad0".into())
        );
        assert_eq!(found("/sys/devices/usb1/1-1/1-1:1.2"), Some("xpad1".into()));
        // Path components, not string prefixes
        assert_eq!(
            found("/sys/devices/usb1/1-1/1-1:1.20/input/input7"),
            Some("xpad9".into())
        );
        assert_eq!(found("/sys/devices/virtual/input/input9"), None);

        // Two LEDs on the same parent, neither wins
        let shared = vec![
            (PathBuf::from("/sys/devices/usb1/1-1"), PathBuf::from("xpad0")),
            (PathBuf::from("/sys/devices/usb1/1-1"), PathBuf::from("xpad1")),
            (PathBuf::from("/sys/devices/usb1/1-1/1-1:1.2"), PathBuf::from("xpad2")),
        ];
        let found = |p: &str| nearest_led(&shared, Path::new(p)).map(Path::to_path_buf);
        assert_eq!(found("/sys/devices/usb1/1-1/1-1:1.0/input/input5"), None);
        assert_eq!(found("/sys/devices/usb1/1-1"), None);
        // A closer LED still does
        assert_eq!(
            found("/sys/devices/usb1/1-1/1-1:1.2/input/input6"),
            Some("xpad2".into())
        );
    }

    #[cfg(target_os = "linux")]
    mod linux {
        use anyhow::Result;

        use super::*;
        use crate::testutil::TempDir;

        /// A wired pad with a joystick and LED, a generic gamepad, and an
        /// event device sysfs doesn't know about.
        fn fixture() -> Result<TempDir> {
            let t = TempDir::new("discovery")?;
            let sys = t.path().join("sys");

            for dev in ["event3", "event10", "event7", "js0", "mouse0"] {
                t.file(format!("dev/input/{dev}"), "")?;
            }

            let xpad = t.dir("sys/bus/usb/drivers/xpad")?;
            let iface = t.dir("sys/devices/usb1/1-1/1-1:1.0")?;
            t.symlink(&xpad, "sys/devices/usb1/1-1/1-1:1.0/driver")?;
            let input5 = iface.join("input/input5");
            t.symlink(&iface, input5.join("device"))?;
            t.file(input5.join("name"), "Microsoft X-Box 360 pad\n")?;
            t.file(input5.join("phys"), "usb-0000:00:14.0-1/input0\n")?;
            t.file(input5.join("uniq"), "\n")?;
            t.file(input5.join("id/bustype"), "0003\n")?;
            t.file(input5.join("id/vendor"), "045e\n")?;
            t.file(input5.join("id/product"), "028e\n")?;
            t.file(input5.join("id/version"), "0114\n")?;
            t.file(iface.join("leds/xpad0/brightness"), "6\n")?;

            t.symlink(&input5, "sys/class/input/event3/device")?;
            t.symlink(&input5, "sys/class/input/js0/device")?;
            t.symlink(iface.join("leds/xpad0"), "sys/class/leds/xpad0")?;
            t.symlink(&iface, iface.join("leds/xpad0/device"))?;

            let generic = t.dir("sys/bus/hid/drivers/hid-generic")?;
            let input9 = t.dir("sys/devices/virtual/input/input9")?;
            t.symlink(&generic, input9.join("driver"))?;
            t.file(input9.join("name"), "Generic Gamepad\n")?;
            t.file(input9.join("id/vendor"), "not hex\n")?;
            t.symlink(&input9, "sys/class/input/event10/device")?;

            // A dangling LED shouldn't break anything
            t.symlink(t.path().join("gone"), "sys/class/leds/xpad1/device")?;
            Ok(t)
        }

        #[test]
        fn scan() -> Result<()> {
            let t = fixture()?;
            let root = t.path();
            let infos = Scanner::with_roots(root.join("sys"), root.join("dev")).devices()?;

            let paths: Vec<_> = infos.iter().map(|i| i.path.clone()).collect();
            assert_eq!(
                paths,
                ["event10", "event3", "event7"].map(|e| root.join("dev/input").join(e))
            );

            let pad = &infos[1];
            let input5 = fs::canonicalize(root.join("sys/devices/usb1/1-1/1-1:1.0/input/input5"))?;
            assert_eq!(pad.sysfs_path, root.join("sys/class/input/event3"));
            assert_eq!(pad.device_path.as_ref(), Some(&input5));
            assert_eq!(pad.joystick_path, Some(root.join("dev/input/js0")));
            assert_eq!(pad.led_path, Some(root.join("sys/class/leds/xpad0")));
            assert_eq!(
                pad.led_brightness_path,
                Some(root.join("sys/class/leds/xpad0/brightness"))
            );
            assert_eq!(pad.name, "Microsoft X-Box 360 pad");
            assert_eq!(pad.phys, "usb-0000:00:14.0-1/input0");
            assert_eq!(pad.uniq, "");
            // From the parent, input devices have no driver
            assert_eq!(pad.driver, "xpad");
            assert_eq!(
                (pad.bus_type, pad.vendor_id, pad.product_id, pad.version_id),
                (0x0003, 0x045e, 0x028e, 0x0114)
            );
            assert!(pad.is_xpad());
            assert_eq!(pad.led()?.brightness()?, 6);

            let generic = &infos[0];
            assert_eq!(generic.name, "Generic Gamepad");
            assert_eq!(generic.driver, "hid-generic");
            assert_eq!(generic.vendor_id, 0);
            assert_eq!(generic.joystick_path, None);
            assert_eq!(generic.led_path, None);
            assert!(!generic.is_xpad());
            assert!(matches!(generic.open_joystick(), Err(Error::NotFound)));
            assert!(matches!(generic.led(), Err(Error::NotFound)));

            let unknown = &infos[2];
            assert_eq!(unknown.device_path, None);
            assert_eq!(unknown.name, "");
            assert_eq!(unknown.driver, "");

            // Deterministic
            assert_eq!(Scanner::with_roots(root.join("sys"), root.join("dev")).devices()?, infos);

            let xpads = Scanner::with_roots(root.join("sys"), root.join("dev")).xpad_devices()?;
            assert_eq!(xpads, [pad.clone()]);
            Ok(())
        }

        #[test]
        fn set_led_through_info() -> Result<()> {
            let t = fixture()?;
            let root = t.path();
            let pad = Scanner::with_roots(root.join("sys"), root.join("dev"))
                .xpad_devices()?
                .remove(0);
            pad.set_led(LedCommand::Player2)?;
            assert_eq!(
                fs::read_to_string(root.join("sys/devices/usb1/1-1/1-1:1.0/leds/xpad0/brightness"))?,
                "7"
            );
            Ok(())
        }

        #[test]
        fn shared_parent_leds() -> Result<()> {
            let t = TempDir::new("discovery-shared")?;
            let root = t.path();
            let usb = t.dir("sys/devices/usb1/1-1")?;

            let pads = [("event0", "1-1:1.0", "input5"), ("event1", "1-1:1.2", "input6")];
            for (event, iface, input) in pads {
                t.file(format!("dev/input/{event}"), "")?;
                let input = usb.join(iface).join("input").join(input);
                t.file(input.join("name"), "Xbox 360 Wireless Receiver\n")?;
                t.symlink(&input, format!("sys/class/input/{event}/device"))?;
            }
            for led in ["xpad0", "xpad1"] {
                let dir = usb.join("leds").join(led);
                t.file(dir.join("brightness"), "0\n")?;
                t.symlink(&usb, dir.join("device"))?;
                t.symlink(&dir, format!("sys/class/leds/{led}"))?;
            }

            let scanner = Scanner::with_roots(root.join("sys"), root.join("dev"));
            let infos = scanner.devices()?;
            assert_eq!(infos.len(), 2);
            for info in &infos {
                assert!(info.device_path.is_some(), "{info:?}");
                assert_eq!(info.led_path, None, "{info:?}");
                assert_eq!(info.led_brightness_path, None);
                assert!(matches!(info.led(), Err(Error::NotFound)));
            }

            // An LED on the second interface itself is unambiguous
            let iface = usb.join("1-1:1.2");
            let own = iface.join("leds/xpad2");
            t.file(own.join("brightness"), "0\n")?;
            t.symlink(&iface, own.join("device"))?;
            t.symlink(&own, "sys/class/leds/xpad2")?;

            let infos = scanner.devices()?;
            assert_eq!(infos[0].led_path, None);
            assert_eq!(infos[1].led_path, Some(root.join("sys/class/leds/xpad2")));
            Ok(())
        }

        #[test]
        fn empty_system() -> Result<()> {
            let t = TempDir::new("discovery-empty")?;
            let scanner = Scanner::with_roots(t.path().join("sys"), t.path().join("dev"));
            assert!(scanner.devices()?.is_empty());
            assert!(scanner.xpad_devices()?.is_empty());
            Ok(())
        }
    }
}
