// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `lock.rs`

use super::*;
use crate::errors::LockError;
use tempfile::TempDir;

#[test]
fn test_acquire_and_release() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("zone--example.com.lock");

    let mut lock = ZoneLock::new(&path);
    assert!(!lock.held());

    lock.acquire().unwrap();
    assert!(lock.held());
    assert!(path.exists());

    lock.release();
    assert!(!lock.held());
}

#[test]
fn test_release_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut lock = ZoneLock::new(dir.path().join("zone--example.com.lock"));

    lock.acquire().unwrap();
    lock.release();
    lock.release();
    assert!(!lock.held());
}

#[test]
fn test_reacquire_after_release() {
    let dir = TempDir::new().unwrap();
    let mut lock = ZoneLock::new(dir.path().join("zone--example.com.lock"));

    lock.acquire().unwrap();
    lock.release();
    lock.acquire().unwrap();
    assert!(lock.held());
}

#[test]
fn test_reentry_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut lock = ZoneLock::new(dir.path().join("zone--example.com.lock"));

    lock.acquire().unwrap();
    assert!(matches!(lock.acquire(), Err(LockError::Reentry { .. })));
    // the original hold survives the failed re-acquire
    assert!(lock.held());
}

#[test]
fn test_second_handle_is_contended() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("zone--example.com.lock");

    let mut first = ZoneLock::new(&path);
    first.acquire().unwrap();

    let mut second = ZoneLock::new(&path);
    assert!(matches!(
        second.acquire(),
        Err(LockError::Contended { .. })
    ));

    // releasing the first handle frees the lock for the second
    first.release();
    second.acquire().unwrap();
}

#[test]
fn test_shared_excludes_exclusive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("zone--example.com.lock");

    let mut reader = ZoneLock::new_shared(&path);
    reader.acquire().unwrap();

    let mut writer = ZoneLock::new(&path);
    assert!(matches!(
        writer.acquire(),
        Err(LockError::Contended { .. })
    ));

    // a second reader is fine
    let mut reader2 = ZoneLock::new_shared(&path);
    reader2.acquire().unwrap();
}

#[test]
fn test_distinct_zones_lock_concurrently() {
    let dir = TempDir::new().unwrap();

    let mut a = ZoneLock::new(zone_lock_path(dir.path(), "example.com."));
    let mut b = ZoneLock::new(zone_lock_path(dir.path(), "example.org."));

    a.acquire().unwrap();
    b.acquire().unwrap();
    assert!(a.held() && b.held());
}

#[test]
fn test_drop_releases_the_lock() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("zone--example.com.lock");

    {
        let mut lock = ZoneLock::new(&path);
        lock.acquire().unwrap();
    }

    let mut next = ZoneLock::new(&path);
    next.acquire().unwrap();
}

#[test]
fn test_creates_missing_parent_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/locks/zone--example.com.lock");

    let mut lock = ZoneLock::new(&path);
    lock.acquire().unwrap();
    assert!(path.exists());
}

#[test]
fn test_zone_lock_path_strips_trailing_dot() {
    let path = zone_lock_path(Path::new("/run/bindctl/locks"), "example.com.");
    assert_eq!(
        path,
        PathBuf::from("/run/bindctl/locks/zone--example.com.lock")
    );
}
