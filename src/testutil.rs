//! Fixtures for tests that need a scratch filesystem
use std::{
    env,
    fs,
    io,
    path::{Path, PathBuf},
    process,
    sync::atomic::{AtomicUsize, Ordering},
};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A uniquely named directory, removed on drop
#[derive(Debug)]
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(name: &str) -> io::Result<Self> {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = env::temp_dir().join(format!("xpad-{}-{}-{}", name, process::id(), n));
        if path.exists() {
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn file(&self, rel: impl AsRef<Path>, contents: &str) -> io::Result<PathBuf> {
        let path = self.path.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Create directory `rel`.
    pub fn dir(&self, rel: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.path.join(rel);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Create a symlink at `rel` pointing at `target`.
    #[cfg(unix)]
    pub fn symlink(&self, target: impl AsRef<Path>, rel: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.path.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        std::os::unix::fs::symlink(target, &path)?;
        Ok(path)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}
