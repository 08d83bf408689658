//! The per-archive extraction state machine.
//!
//! One archive flows classify → list → resolve target → extract → normalize
//! permissions → (recurse). Failures terminate only that archive's run;
//! sibling archives and the rest of the batch continue. Recursion is
//! depth-first and sequential so collision-resolved names stay
//! deterministic.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use oxtract_core::{Classification, Error, Format, Result, classify, sniff};

use crate::backend::{self, ToolCache};
use crate::inspect::{inspect_dir, inspect_listing, is_single_entry};
use crate::permissions;
use crate::target::{Disposition, Target, choose_target, resolve_name};

/// Nesting ceiling for recursive extraction. Only degenerate inputs
/// (self-reproducing compressed files) get anywhere near it.
pub const MAX_DEPTH: usize = 64;

/// What to do with an archive whose contents are a single top-level entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnePolicy {
    /// Extract into a dedicated directory anyway (the default).
    #[default]
    Inside,
    /// Extract the sole entry here, renamed to the archive's base name.
    Rename,
    /// Extract the sole entry here with its original name.
    Here,
}

/// The resolved flag set for one run. Immutable; borrowed everywhere.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Extract archives found inside extracted output.
    pub recursive: bool,
    /// Pre-selected single-entry policy, if any.
    pub one_policy: Option<OnePolicy>,
    /// Reuse existing target names instead of suffixing.
    pub overwrite: bool,
    /// Extract everything into the current directory.
    pub flat: bool,
    /// Never prompt; fall back to defaults.
    pub noninteractive: bool,
    /// List contents instead of extracting.
    pub list_only: bool,
    /// Extract package metadata instead of contents.
    pub metadata_only: bool,
    /// Effective verbosity (verbose count minus quiet count).
    pub verbosity: i8,
}

/// Per-archive outcome when the state machine finishes without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Contents landed at this path.
    Extracted(PathBuf),
    /// List-only mode: the entries, in archive order.
    Listed(Vec<String>),
    /// Nothing was done, for the stated reason.
    Skipped(String),
}

/// The one synchronous human decision in the pipeline.
///
/// Substituted with a scripted chooser in tests; the CLI wires up an
/// interactive selector.
pub trait Prompt {
    /// Pick a policy for a single-entry archive.
    fn one_entry(&self, archive: &Path, entry: &str) -> OnePolicy;
}

/// Sink for diagnostics and progress output.
pub trait Report {
    /// A non-fatal problem worth telling the user about.
    fn warn(&self, message: &str);
    /// A path written by extraction (verbosity ≥ 1).
    fn extracted_path(&self, path: &Path);
    /// A nested archive finished during recursion.
    fn nested_outcome(&self, archive: &Path, outcome: &Outcome);
    /// A nested archive failed during recursion.
    fn nested_failure(&self, archive: &Path, error: &Error);
}

/// Where extraction output landed: what to report, and which filesystem
/// roots to normalize and scan.
struct Landed {
    outcome: PathBuf,
    roots: Vec<PathBuf>,
}

/// Drives the state machine for every archive in a run.
pub struct Orchestrator<'a> {
    config: &'a RunConfig,
    prompt: &'a dyn Prompt,
    report: &'a dyn Report,
    tools: ToolCache,
    reported_missing: HashSet<String>,
    visited: HashSet<PathBuf>,
    nested_failures: usize,
}

impl<'a> Orchestrator<'a> {
    /// Build an orchestrator for one run.
    pub fn new(config: &'a RunConfig, prompt: &'a dyn Prompt, report: &'a dyn Report) -> Self {
        Self {
            config,
            prompt,
            report,
            tools: ToolCache::new(),
            reported_missing: HashSet::new(),
            visited: HashSet::new(),
            nested_failures: 0,
        }
    }

    /// The shared tool cache (the downloader uses it too).
    pub fn tools_mut(&mut self) -> &mut ToolCache {
        &mut self.tools
    }

    /// Did any nested extraction fail during recursion?
    pub fn any_nested_failures(&self) -> bool {
        self.nested_failures > 0
    }

    /// Run the state machine for one command-line archive, extracting
    /// relative to `cwd`.
    pub fn process(&mut self, archive: &Path, cwd: &Path) -> Result<Outcome> {
        let result = self.run_one(archive, cwd, 0);
        if let Err(e) = &result {
            if let Some(tool) = e.missing_tool() {
                if !self.reported_missing.insert(tool.to_string()) {
                    // Already diagnosed in full once this run.
                    return Ok(Outcome::Skipped(format!(
                        "needs `{tool}`, reported missing above"
                    )));
                }
            }
        }
        result
    }

    fn run_one(&mut self, archive: &Path, cwd: &Path, depth: usize) -> Result<Outcome> {
        if depth > MAX_DEPTH {
            return Err(Error::TooDeep {
                path: archive.to_path_buf(),
            });
        }
        let cls = classify(archive)?;

        if self.config.list_only {
            let entries = backend::list(&cls, archive, &mut self.tools)?;
            return Ok(Outcome::Listed(entries));
        }

        let landed = if self.config.metadata_only {
            if !cls.format.metadata_capable() {
                return Ok(Outcome::Skipped(format!(
                    "{} archives carry no package metadata",
                    cls.format
                )));
            }
            self.land_metadata(&cls, archive, cwd)?
        } else if cls.is_stream() {
            self.land_stream(&cls, archive, cwd)?
        } else {
            match self.land_container(&cls, archive, cwd)? {
                Some(landed) => landed,
                None => return Ok(Outcome::Skipped("archive is empty".to_string())),
            }
        };

        for root in &landed.roots {
            for (path, err) in permissions::normalize(root) {
                self.report.warn(&format!(
                    "could not fix permissions on {}: {err}",
                    path.display()
                ));
            }
        }
        if self.config.verbosity >= 1 {
            for root in &landed.roots {
                self.report_tree(root);
            }
        }
        if self.config.recursive && !self.config.metadata_only {
            self.recurse(&landed.roots, depth);
        }
        Ok(Outcome::Extracted(landed.outcome))
    }

    /// Decompress a raw stream to a single file named after the archive.
    fn land_stream(&mut self, cls: &Classification, archive: &Path, cwd: &Path) -> Result<Landed> {
        let mut target = if self.config.flat {
            Target {
                path: cwd.join(&cls.base_name),
                disposition: Disposition::FlatCwd,
            }
        } else {
            resolve_name(cwd, &cls.base_name, self.config.overwrite)?
        };
        // A magic-classified file keeps its full name as base name, which
        // under --overwrite or --flat would point the output at the source.
        if is_same_file(archive, &target.path) {
            target = resolve_name(cwd, &cls.base_name, false)?;
        }
        backend::extract(cls, archive, &target.path, &mut self.tools)?;
        Ok(Landed {
            outcome: target.path.clone(),
            roots: vec![target.path],
        })
    }

    /// Extract a container according to flat/single-entry/inside policy.
    ///
    /// Returns `None` for an archive whose listing holds no entries:
    /// extracting it would only litter the place with an empty directory.
    fn land_container(
        &mut self,
        cls: &Classification,
        archive: &Path,
        cwd: &Path,
    ) -> Result<Option<Landed>> {
        let listing = if cls.format.supports_listing() {
            let entries = backend::list(cls, archive, &mut self.tools)?;
            backend::ensure_safe_entries(&entries)?;
            Some(entries)
        } else {
            None
        };

        let inspection = listing.as_ref().map(|entries| inspect_listing(entries));
        if inspection.as_ref().is_some_and(|i| i.entry_count == 0) {
            return Ok(None);
        }

        if self.config.flat {
            // No directory, no collision checks: the backend's own
            // overwrite semantics govern. Snapshot the directory so the
            // normalizer and recursion only touch what this archive wrote.
            let before = child_names(cwd)?;
            backend::extract(cls, archive, cwd, &mut self.tools)?;
            let mut roots: Vec<PathBuf> = child_names(cwd)?
                .difference(&before)
                .map(|name| cwd.join(name))
                .collect();
            roots.sort();
            return Ok(Some(Landed {
                outcome: cwd.to_path_buf(),
                roots,
            }));
        }

        let single_top = inspection.as_ref().and_then(|i| i.single_top.clone());

        if let (Some(inspection), Some(top)) = (&inspection, single_top) {
            if !is_single_entry(inspection, &cls.base_name) {
                // The archive already names its own directory: extracting
                // into a fresh `base/` would nest it as `base/base/`.
                return self.land_self_named(cls, archive, cwd, &top).map(Some);
            }
            match self.one_policy_for(archive, &top) {
                OnePolicy::Inside => {}
                OnePolicy::Here => {
                    backend::extract(cls, archive, cwd, &mut self.tools)?;
                    let path = cwd.join(&top);
                    return Ok(Some(Landed {
                        outcome: path.clone(),
                        roots: vec![path],
                    }));
                }
                OnePolicy::Rename => {
                    backend::extract(cls, archive, cwd, &mut self.tools)?;
                    let from = cwd.join(&top);
                    let target = resolve_name(cwd, &cls.base_name, self.config.overwrite)?;
                    if target.disposition == Disposition::Reused {
                        // A bare rename cannot replace an occupied name.
                        remove_entry(&target.path)?;
                    }
                    fs::rename(&from, &target.path)?;
                    return Ok(Some(Landed {
                        outcome: target.path.clone(),
                        roots: vec![target.path],
                    }));
                }
            }
        }

        let target = choose_target(&cls.base_name, cwd, self.config.overwrite, false)?;
        fs::create_dir_all(&target.path)?;
        backend::extract(cls, archive, &target.path, &mut self.tools)?;
        if listing.is_none()
            && matches!(
                target.disposition,
                Disposition::NewDir | Disposition::Renamed
            )
        {
            // Formats without listings reveal their shape only after
            // extraction; the single-entry rules apply post hoc.
            return self.settle_unlisted(cls, archive, cwd, target).map(Some);
        }
        Ok(Some(Landed {
            outcome: target.path.clone(),
            roots: vec![target.path],
        }))
    }

    /// Resolve the single-entry policy for this run.
    fn one_policy_for(&self, archive: &Path, top: &str) -> OnePolicy {
        self.config.one_policy.unwrap_or_else(|| {
            if self.config.noninteractive {
                OnePolicy::default()
            } else {
                self.prompt.one_entry(archive, top)
            }
        })
    }

    /// Apply the single-entry rules to a directory just filled by a
    /// no-listing backend.
    fn settle_unlisted(
        &mut self,
        cls: &Classification,
        archive: &Path,
        cwd: &Path,
        target: Target,
    ) -> Result<Landed> {
        let inspection = inspect_dir(&target.path)?;
        let Some(top) = inspection.single_top.clone() else {
            return Ok(Landed {
                outcome: target.path.clone(),
                roots: vec![target.path],
            });
        };
        let child = target.path.join(&top);
        if !is_single_entry(&inspection, &cls.base_name) {
            // Sole entry named like the archive: hoist it out of the
            // directory we created around it.
            return self.hoist(cwd, &target.path, &child, &cls.base_name);
        }
        match self.one_policy_for(archive, &top) {
            OnePolicy::Inside => Ok(Landed {
                outcome: target.path.clone(),
                roots: vec![target.path],
            }),
            OnePolicy::Here => {
                let dest = resolve_name(cwd, &top, false)?;
                fs::rename(&child, &dest.path)?;
                fs::remove_dir(&target.path)?;
                Ok(Landed {
                    outcome: dest.path.clone(),
                    roots: vec![dest.path],
                })
            }
            OnePolicy::Rename => self.hoist(cwd, &target.path, &child, &cls.base_name),
        }
    }

    /// Move `child` out of `dir` and give it `name` (suffixed on collision),
    /// removing the then-empty `dir`. Parks the child in a staging directory
    /// first because `name` may be `dir` itself.
    fn hoist(&self, cwd: &Path, dir: &Path, child: &Path, name: &str) -> Result<Landed> {
        let staging = tempfile::Builder::new()
            .prefix(".oxtract-")
            .tempdir_in(cwd)?;
        let parked = staging.path().join("entry");
        fs::rename(child, &parked)?;
        fs::remove_dir(dir)?;
        let dest = resolve_name(cwd, name, false)?;
        fs::rename(&parked, &dest.path)?;
        Ok(Landed {
            outcome: dest.path.clone(),
            roots: vec![dest.path],
        })
    }

    /// Sole top-level entry already matches the base name: land it as
    /// `cwd/base` directly, suffixing through a staging directory when the
    /// name is taken and reuse wasn't requested.
    fn land_self_named(
        &mut self,
        cls: &Classification,
        archive: &Path,
        cwd: &Path,
        top: &str,
    ) -> Result<Landed> {
        let direct = cwd.join(top);
        if self.config.overwrite || direct.symlink_metadata().is_err() {
            backend::extract(cls, archive, cwd, &mut self.tools)?;
            return Ok(Landed {
                outcome: direct.clone(),
                roots: vec![direct],
            });
        }
        let staging = tempfile::Builder::new()
            .prefix(".oxtract-")
            .tempdir_in(cwd)?;
        backend::extract(cls, archive, staging.path(), &mut self.tools)?;
        let target = resolve_name(cwd, &cls.base_name, false)?;
        fs::rename(staging.path().join(top), &target.path)?;
        Ok(Landed {
            outcome: target.path.clone(),
            roots: vec![target.path],
        })
    }

    /// Extract only package metadata into a dedicated directory.
    fn land_metadata(
        &mut self,
        cls: &Classification,
        archive: &Path,
        cwd: &Path,
    ) -> Result<Landed> {
        let target = choose_target(&cls.base_name, cwd, self.config.overwrite, self.config.flat)?;
        if target.disposition != Disposition::FlatCwd {
            fs::create_dir_all(&target.path)?;
        }
        backend::extract_metadata(cls, archive, &target.path, &mut self.tools)?;
        Ok(Landed {
            outcome: target.path.clone(),
            roots: vec![target.path],
        })
    }

    /// Depth-first scan of freshly extracted output for nested archives.
    fn recurse(&mut self, roots: &[PathBuf], depth: usize) {
        let mut candidates = Vec::new();
        for root in roots {
            if root.is_dir() {
                for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
                    let Ok(entry) = entry else { continue };
                    if entry.file_type().is_file() {
                        candidates.push(entry.into_path());
                    }
                }
            } else if root.is_file() {
                candidates.push(root.clone());
            }
        }

        for candidate in candidates {
            if !self.is_nested_archive(&candidate) {
                continue;
            }
            let canonical = candidate.canonicalize().unwrap_or_else(|_| candidate.clone());
            if !self.visited.insert(canonical) {
                continue;
            }
            let parent = candidate
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            match self.run_one(&candidate, &parent, depth + 1) {
                Ok(outcome) => self.report.nested_outcome(&candidate, &outcome),
                Err(e) => {
                    if let Some(tool) = e.missing_tool() {
                        if !self.reported_missing.insert(tool.to_string()) {
                            self.report.nested_outcome(
                                &candidate,
                                &Outcome::Skipped(format!(
                                    "needs `{tool}`, reported missing above"
                                )),
                            );
                            continue;
                        }
                    }
                    self.nested_failures += 1;
                    self.report.nested_failure(&candidate, &e);
                }
            }
        }
    }

    /// Is this extracted file worth recursing into?
    fn is_nested_archive(&self, path: &Path) -> bool {
        if classify(path).is_err() {
            return false;
        }
        // .exe is only a ZIP when its signature says so; anything else is
        // just a program that happens to be lying around.
        if path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("exe"))
        {
            return matches!(sniff(path), Ok(Some(Format::Zip)));
        }
        true
    }

    fn report_tree(&self, root: &Path) {
        if root.is_dir() {
            for entry in walkdir::WalkDir::new(root)
                .min_depth(1)
                .sort_by_file_name()
            {
                if let Ok(entry) = entry {
                    self.report.extracted_path(entry.path());
                }
            }
        } else {
            self.report.extracted_path(root);
        }
    }
}

fn child_names(dir: &Path) -> Result<HashSet<std::ffi::OsString>> {
    let mut names = HashSet::new();
    for entry in fs::read_dir(dir)? {
        names.insert(entry?.file_name());
    }
    Ok(names)
}

/// Remove whatever occupies `path`, directory tree or not.
fn remove_entry(path: &Path) -> std::io::Result<()> {
    if path.symlink_metadata()?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
