//! Content inspection: what would an extraction actually put here?
//!
//! Works from a listing when the format has one, or from a directory walk
//! after the fact when it does not.

use std::io;
use std::path::Path;

/// Facts derived from an archive's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// Number of listed entries.
    pub entry_count: usize,
    /// The one shared top-level name, when every entry lives under it.
    pub single_top: Option<String>,
}

/// Derive entry count and the shared top-level component from a listing.
pub fn inspect_listing(entries: &[String]) -> Inspection {
    let mut entry_count = 0;
    let mut top: Option<&str> = None;
    let mut multiple = false;

    for entry in entries {
        let Some(first) = top_component(entry) else {
            continue;
        };
        entry_count += 1;
        match top {
            None => top = Some(first),
            Some(seen) if seen == first => {}
            Some(_) => multiple = true,
        }
    }

    Inspection {
        entry_count,
        single_top: if multiple {
            None
        } else {
            top.map(String::from)
        },
    }
}

/// Inspect a directory the way a listing would be inspected: its immediate
/// children are the top-level entries.
pub fn inspect_dir(dir: &Path) -> io::Result<Inspection> {
    let mut entry_count = 0;
    let mut single_top = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        entry_count += 1;
        single_top = match entry_count {
            1 => entry.file_name().to_str().map(String::from),
            _ => None,
        };
    }
    Ok(Inspection {
        entry_count,
        single_top,
    })
}

/// Does the single-entry policy apply?
///
/// Yes only when there is exactly one top-level name and it differs from the
/// archive's base name (case-sensitive): an archive whose sole entry already
/// matches its base name extracts normally into a directory of that name.
pub fn is_single_entry(inspection: &Inspection, base_name: &str) -> bool {
    match &inspection.single_top {
        Some(top) => top != base_name,
        None => false,
    }
}

/// First real path component of a listing entry, with `./` noise removed.
fn top_component(entry: &str) -> Option<&str> {
    entry
        .trim_start_matches("./")
        .split('/')
        .find(|c| !c.is_empty() && *c != ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_shared_top() {
        let insp = inspect_listing(&listing(&["pkg/", "pkg/a.txt", "pkg/sub/b.txt"]));
        assert_eq!(insp.single_top.as_deref(), Some("pkg"));
        assert_eq!(insp.entry_count, 3);
    }

    #[test]
    fn test_multiple_tops() {
        let insp = inspect_listing(&listing(&["a.txt", "b.txt"]));
        assert_eq!(insp.single_top, None);
        assert!(!is_single_entry(&insp, "base"));
    }

    #[test]
    fn test_dot_slash_prefixes() {
        let insp = inspect_listing(&listing(&["./pkg/a", "./pkg/b"]));
        assert_eq!(insp.single_top.as_deref(), Some("pkg"));
    }

    #[test]
    fn test_empty_listing() {
        let insp = inspect_listing(&[]);
        assert_eq!(insp.entry_count, 0);
        assert_eq!(insp.single_top, None);
        assert!(!is_single_entry(&insp, "base"));
    }

    #[test]
    fn test_single_entry_policy_gate() {
        let insp = inspect_listing(&listing(&["payload.bin"]));
        assert!(is_single_entry(&insp, "data"));
        // Sole entry matching the base name is not single-entry-ambiguous.
        let insp = inspect_listing(&listing(&["data/", "data/x"]));
        assert!(!is_single_entry(&insp, "data"));
        // Case-sensitive comparison.
        let insp = inspect_listing(&listing(&["Data"]));
        assert!(is_single_entry(&insp, "data"));
    }

    #[test]
    fn test_inspect_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("only")).unwrap();
        let insp = inspect_dir(dir.path()).unwrap();
        assert_eq!(insp.entry_count, 1);
        assert_eq!(insp.single_top.as_deref(), Some("only"));

        std::fs::write(dir.path().join("second"), b"x").unwrap();
        let insp = inspect_dir(dir.path()).unwrap();
        assert_eq!(insp.entry_count, 2);
        assert_eq!(insp.single_top, None);
    }
}
