//! Lock Module
//!
//! Single-instance advisory lock. The lock is an empty file created with
//! exclusive-create semantics; its existence alone is the signal.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{ModalError, Result};

/// Lock guard
pub struct LockGuard {
    path: PathBuf,
    held: bool,
}

impl LockGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            held: false,
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Create the marker file. An existing file means another instance runs.
    pub fn acquire(&mut self) -> Result<()> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|source| ModalError::LockHeld {
                path: self.path.clone(),
                source,
            })?;

        self.held = true;
        debug!("Acquired lock {:?}", self.path);
        Ok(())
    }

    /// Remove the marker file. No-op unless the lock is held.
    pub fn release(&mut self) -> Result<()> {
        if !self.held {
            return Ok(());
        }
        // cleared first so a failed removal is never retried
        self.held = false;

        fs::remove_file(&self.path).map_err(|source| ModalError::LockRelease {
            path: self.path.clone(),
            source,
        })?;

        debug!("Released lock {:?}", self.path);
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("{}", e);
        }
    }
}
