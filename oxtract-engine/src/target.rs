//! Target naming and collision resolution.
//!
//! The namer never hands out a path that already exists unless the caller
//! explicitly opted into reuse; otherwise it appends numeric suffixes until
//! it finds a free name, bounded so a pathological directory state fails
//! loudly instead of looping.

use std::path::{Path, PathBuf};

use oxtract_core::{Error, Result};

/// How far the numeric-suffix search goes before giving up.
pub const SUFFIX_CEILING: u32 = 1000;

/// How a target path was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// A fresh name, nothing to collide with.
    NewDir,
    /// An existing entry reused because `--overwrite` was given.
    Reused,
    /// A numeric-suffix alternative because the base name was taken.
    Renamed,
    /// The current directory itself (`--flat`).
    FlatCwd,
}

/// A resolved extraction destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Where extraction output goes.
    pub path: PathBuf,
    /// How the path was chosen.
    pub disposition: Disposition,
}

/// Choose the destination for an archive with the given base name.
pub fn choose_target(base_name: &str, cwd: &Path, overwrite: bool, flat: bool) -> Result<Target> {
    if flat {
        return Ok(Target {
            path: cwd.to_path_buf(),
            disposition: Disposition::FlatCwd,
        });
    }
    resolve_name(cwd, base_name, overwrite)
}

/// Resolve a single name (directory or file alike) against the collision
/// policy: free name wins, `overwrite` reuses, otherwise `name-1`, `name-2`,
/// ... up to the ceiling.
pub fn resolve_name(cwd: &Path, name: &str, overwrite: bool) -> Result<Target> {
    let candidate = cwd.join(name);
    if !occupied(&candidate) {
        return Ok(Target {
            path: candidate,
            disposition: Disposition::NewDir,
        });
    }
    if overwrite {
        return Ok(Target {
            path: candidate,
            disposition: Disposition::Reused,
        });
    }
    for n in 1..=SUFFIX_CEILING {
        let alternative = cwd.join(format!("{name}-{n}"));
        if !occupied(&alternative) {
            return Ok(Target {
                path: alternative,
                disposition: Disposition::Renamed,
            });
        }
    }
    Err(Error::NameExhausted {
        base: name.to_string(),
        ceiling: SUFFIX_CEILING,
    })
}

/// Existence check that also sees dangling symlinks.
fn occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_fresh_name() {
        let dir = tempfile::tempdir().unwrap();
        let t = choose_target("foo", dir.path(), false, false).unwrap();
        assert_eq!(t.path, dir.path().join("foo"));
        assert_eq!(t.disposition, Disposition::NewDir);
    }

    #[test]
    fn test_suffix_sequence() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("foo")).unwrap();
        let t = choose_target("foo", dir.path(), false, false).unwrap();
        assert_eq!(t.path, dir.path().join("foo-1"));
        assert_eq!(t.disposition, Disposition::Renamed);

        fs::create_dir(dir.path().join("foo-1")).unwrap();
        let t = choose_target("foo", dir.path(), false, false).unwrap();
        assert_eq!(t.path, dir.path().join("foo-2"));
    }

    #[test]
    fn test_overwrite_reuses() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("foo")).unwrap();
        let t = choose_target("foo", dir.path(), true, false).unwrap();
        assert_eq!(t.path, dir.path().join("foo"));
        assert_eq!(t.disposition, Disposition::Reused);
    }

    #[test]
    fn test_flat_is_cwd() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("foo")).unwrap();
        let t = choose_target("foo", dir.path(), false, true).unwrap();
        assert_eq!(t.path, dir.path());
        assert_eq!(t.disposition, Disposition::FlatCwd);
    }

    #[test]
    fn test_collides_with_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo"), b"x").unwrap();
        let t = choose_target("foo", dir.path(), false, false).unwrap();
        assert_eq!(t.path, dir.path().join("foo-1"));
    }
}
