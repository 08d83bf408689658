//! Permission normalization of extracted output.
//!
//! Archives routinely arrive with modes the extracting user cannot work
//! with (read-only trees, 0000 files from hostile packagers). The
//! normalizer guarantees the owner can read and write everything and
//! traverse every directory, preserves intentional execute bits, and never
//! widens group/other. Failures are reported, never fatal: a chmod that
//! fails should not void an otherwise successful extraction.

use std::path::{Path, PathBuf};

/// A single path whose permissions could not be adjusted.
pub type Failure = (PathBuf, std::io::Error);

/// Walk `root` and adjust mode bits; returns the paths that failed.
#[cfg(unix)]
pub fn normalize(root: &Path) -> Vec<Failure> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let mut failures = Vec::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                failures.push((
                    path,
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("walk failed")),
                ));
                continue;
            }
        };
        if entry.path_is_symlink() {
            continue;
        }
        let meta = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                failures.push((
                    entry.path().to_path_buf(),
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("stat failed")),
                ));
                continue;
            }
        };
        let mode = meta.permissions().mode() & 0o7777;
        let mut want = mode | 0o600;
        if meta.is_dir() || mode & 0o111 != 0 {
            want |= 0o100;
        }
        if want != mode {
            if let Err(e) = fs::set_permissions(entry.path(), fs::Permissions::from_mode(want)) {
                failures.push((entry.path().to_path_buf(), e));
            }
        }
    }
    failures
}

/// Mode bits are a Unix concern; elsewhere this is a no-op.
#[cfg(not(unix))]
pub fn normalize(_root: &Path) -> Vec<Failure> {
    Vec::new()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o7777
    }

    #[test]
    fn test_owner_gets_read_write() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("locked");
        fs::write(&file, b"x").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o000)).unwrap();

        let failures = normalize(dir.path());
        assert!(failures.is_empty());
        assert_eq!(mode_of(&file), 0o600);
    }

    #[test]
    fn test_execute_bit_preserved_not_invented() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("run.sh");
        fs::write(&script, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o011)).unwrap();
        let plain = dir.path().join("notes.txt");
        fs::write(&plain, b"x").unwrap();
        fs::set_permissions(&plain, fs::Permissions::from_mode(0o400)).unwrap();

        normalize(dir.path());
        // Had an execute bit somewhere: owner gains execute too.
        assert_eq!(mode_of(&script), 0o711);
        // Had none: none invented.
        assert_eq!(mode_of(&plain), 0o600);
    }

    #[test]
    fn test_group_other_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("shared");
        fs::write(&file, b"x").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).unwrap();

        normalize(dir.path());
        assert_eq!(mode_of(&file), 0o644);
    }

    #[test]
    fn test_directories_become_traversable() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("closed");
        fs::create_dir(&sub).unwrap();
        let inner = sub.join("file");
        fs::write(&inner, b"x").unwrap();
        fs::set_permissions(&inner, fs::Permissions::from_mode(0o000)).unwrap();
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o600)).unwrap();

        let failures = normalize(dir.path());
        assert!(failures.is_empty());
        assert_eq!(mode_of(&sub), 0o700);
        assert_eq!(mode_of(&inner), 0o600);
    }

    #[test]
    fn test_single_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out");
        fs::write(&file, b"x").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o200)).unwrap();
        normalize(&file);
        assert_eq!(mode_of(&file), 0o600);
    }
}
