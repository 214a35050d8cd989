//! Request-scoped staging directory.

use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::debug;

use crate::error::Result;

/// A private temporary directory for one generation request. Removed with
/// everything in it when dropped.
#[derive(Debug)]
pub struct RequestWorkspace {
    dir: TempDir,
}

impl RequestWorkspace {
    pub fn new() -> Result<Self> {
        let dir = Builder::new().prefix("dd1750-").tempdir()?;
        debug!(path = %dir.path().display(), "created request workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a file inside the workspace. Only the final component of
    /// `name` is used.
    pub fn file(&self, name: &str) -> PathBuf {
        let base = Path::new(name)
            .file_name()
            .map_or_else(|| "file".into(), |n| n.to_os_string());
        self.dir.path().join(base)
    }

    /// Write `bytes` to `name` inside the workspace.
    pub fn stage(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.file(name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_files_vanish_on_drop() {
        let ws = RequestWorkspace::new().unwrap();
        let staged = ws.stage("../../escape.pdf", b"%PDF").unwrap();
        assert_eq!(staged.parent(), Some(ws.path()));
        assert!(staged.exists());
        let root = ws.path().to_path_buf();
        drop(ws);
        assert!(!root.exists());
    }
}
