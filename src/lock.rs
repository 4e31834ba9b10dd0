// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-zone advisory file locking.
//!
//! Every mutating operation on a zone runs under an exclusive `flock` on a
//! per-zone lock file, serializing cooperating bindctl processes on one host.
//! Distinct zones lock distinct files and proceed concurrently. Read paths
//! may take a shared lock; shared and exclusive holders mutually exclude per
//! the usual flock semantics.
//!
//! Cross-host coordination is explicitly not provided.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};

use crate::errors::LockError;

/// A handle on a per-zone advisory lock.
///
/// Acquisition is non-blocking: a lock held elsewhere yields
/// [`LockError::Contended`] immediately. The OS lock is released when the
/// handle is released or dropped.
pub struct ZoneLock {
    path: PathBuf,
    shared: bool,
    guard: Option<Flock<File>>,
}

impl std::fmt::Debug for ZoneLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneLock")
            .field("path", &self.path)
            .field("shared", &self.shared)
            .field("held", &self.guard.is_some())
            .finish()
    }
}

impl ZoneLock {
    /// Create an exclusive (writer) lock handle for the given path.
    ///
    /// Nothing is locked until [`acquire`](Self::acquire) is called.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            shared: false,
            guard: None,
        }
    }

    /// Create a shared (reader) lock handle for the given path.
    #[must_use]
    pub fn new_shared(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            shared: true,
            guard: None,
        }
    }

    /// Attempt to take the lock without blocking.
    ///
    /// Creates the parent directory and the lock file if absent.
    ///
    /// # Errors
    ///
    /// - [`LockError::Reentry`] if this handle already holds the lock
    /// - [`LockError::Contended`] if another holder has it
    /// - [`LockError::Io`] for any other OS failure
    pub fn acquire(&mut self) -> Result<(), LockError> {
        if self.guard.is_some() {
            return Err(LockError::Reentry {
                path: self.path.clone(),
            });
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| LockError::Io {
                path: self.path.clone(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|source| LockError::Io {
                path: self.path.clone(),
                source,
            })?;

        let arg = if self.shared {
            FlockArg::LockSharedNonblock
        } else {
            FlockArg::LockExclusiveNonblock
        };

        match Flock::lock(file, arg) {
            Ok(guard) => {
                self.guard = Some(guard);
                Ok(())
            }
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => Err(LockError::Contended {
                path: self.path.clone(),
            }),
            Err((_, errno)) => Err(LockError::Io {
                path: self.path.clone(),
                source: std::io::Error::from_raw_os_error(errno as i32),
            }),
        }
    }

    /// Release the lock. Releasing an unheld handle is a no-op.
    pub fn release(&mut self) {
        self.guard = None;
    }

    /// Whether this handle currently holds the lock.
    #[must_use]
    pub fn held(&self) -> bool {
        self.guard.is_some()
    }

    /// The lock file path this handle operates on.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lock file path for a zone: `<dir>/zone--<apex-without-dot>.lock`.
#[must_use]
pub fn zone_lock_path(lock_dir: &Path, zone: &str) -> PathBuf {
    let name = zone.strip_suffix('.').unwrap_or(zone);
    lock_dir.join(format!("zone--{name}.lock"))
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod lock_tests;
