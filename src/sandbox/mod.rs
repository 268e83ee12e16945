//! Scratch-directory management under `out/.hex/`.
//!
//! Each task gets a fresh, uniquely numbered build directory. The scratch
//! root is wiped once at the start of a run; individual build directories
//! are never cleaned up automatically, even on failure — they are kept
//! around deliberately so a failing rule can be inspected after the fact.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

pub struct SandboxManager {
    root: PathBuf,
    next_id: AtomicU64,
}

impl SandboxManager {
    pub fn new(out_root: &Path) -> Self {
        Self {
            root: out_root.join(".hex"),
            next_id: AtomicU64::new(0),
        }
    }

    /// Recursively delete and recreate the scratch root. Call exactly once
    /// before a run begins.
    pub fn clean(&self) -> Result<()> {
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)?;
        }
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Atomically allocate and create a fresh build directory. Safe to call
    /// concurrently from multiple worker threads — two concurrent calls
    /// always yield two distinct directories.
    pub fn make_build_dir(&self) -> Result<PathBuf> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let dir = self.root.join(format!("build{id}"));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
