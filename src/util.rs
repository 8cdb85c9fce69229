//! Utility functions
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

/// Technically Linux requires sysfs to be at `/sys`, calling it a system
/// configuration error otherwise.
///
/// It's kept in one place anyway, and everything that reads sysfs has a
/// variant taking a different root.
pub const SYSFS_PATH: &str = "/sys";

/// Device file location. Same reasons as [`SYSFS_PATH`].
pub const DEV_PATH: &str = "/dev";

/// Read a sysfs attribute, without surrounding whitespace
pub(crate) fn read_attribute(path: &Path) -> io::Result<String> {
    Ok(fs::read_to_string(path)?.trim().to_owned())
}

/// Last component of the symlink at `path`, such as a driver name.
pub(crate) fn link_name(path: &Path) -> Option<String> {
    let target = path.read_link().ok()?;
    Some(target.file_name()?.to_string_lossy().into_owned())
}

/// Parse a sysfs ID, which are hex without a prefix.
///
/// Anything with a `0x`, `0o` or `0b` prefix, octal with a leading `0`,
/// or plain decimal is also accepted.
pub(crate) fn parse_id(text: &str) -> Option<u16> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(v) = u16::from_str_radix(text, 16) {
        return Some(v);
    }
    let text = text.replace('_', "");
    let (digits, radix) = match text.get(..2) {
        Some("0x" | "0X") => (&text[2..], 16),
        Some("0o" | "0O") => (&text[2..], 8),
        Some("0b" | "0B") => (&text[2..], 2),
        _ if text.len() > 1 && text.starts_with('0') => (&text[1..], 8),
        _ => (&text[..], 10),
    };
    u16::from_str_radix(digits, radix).ok()
}

/// Entries directly inside `dir` whose names start with `prefix`, sorted by
/// name.
///
/// A missing `dir` has no entries.
pub(crate) fn entries(dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 && e.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) => {
                return Ok(Vec::new())
            }
            Err(e) => return Err(e.into()),
        };
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::testutil::TempDir;

    #[test]
    fn ids() {
        assert_eq!(parse_id("045e"), Some(0x045e));
        assert_eq!(parse_id(" 028e\n"), Some(0x028e));
        assert_eq!(parse_id("FFFF"), Some(0xffff));
        assert_eq!(parse_id("0x1b"), Some(0x1b));
        assert_eq!(parse_id("0o17"), Some(0o17));
        assert_eq!(parse_id(""), None);
        // Too big for hex, but fine as decimal
        assert_eq!(parse_id("10000"), Some(10000));
        assert_eq!(parse_id("fffff"), None);
        assert_eq!(parse_id("pad"), None);
    }

    #[test]
    fn attributes() -> Result<()> {
        let dir = TempDir::new("util")?;
        let name = dir.file("name", "Xbox 360 Wireless Receiver \n")?;
        assert_eq!(read_attribute(&name)?, "Xbox 360 Wireless Receiver");
        assert!(read_attribute(&dir.path().join("missing")).is_err());

        let driver = dir.dir("bus/usb/drivers/xpad")?;
        let link = dir.symlink(&driver, "dev/driver")?;
        assert_eq!(link_name(&link).as_deref(), Some("xpad"));
        assert_eq!(link_name(&name), None);
        Ok(())
    }

    #[test]
    fn listing() -> Result<()> {
        let dir = TempDir::new("util-entries")?;
        dir.file("input/event2", "")?;
        dir.file("input/event10", "")?;
        dir.file("input/mouse0", "")?;
        dir.dir("input/by-id/event9")?;

        let found = entries(&dir.path().join("input"), "event")?;
        let names: Vec<_> = found
            .iter()
            .filter_map(|p| p.file_name()?.to_str())
            .collect();
        assert_eq!(names, ["event10", "event2"]);

        assert!(entries(&dir.path().join("missing"), "event")?.is_empty());
        Ok(())
    }
}
