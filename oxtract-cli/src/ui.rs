//! Terminal output and the interactive single-entry prompt.

use std::path::Path;

use console::style;
use dialoguer::Select;
use oxtract_core::Error;
use oxtract_engine::{OnePolicy, Outcome, Prompt, Report};

/// Verbosity-gated terminal reporter.
///
/// Level 0 is the default: outcomes and warnings. `-q` drops warnings,
/// `-qq` drops errors too; `-v` adds per-file output and fetch notes.
pub struct Reporter {
    verbosity: i8,
}

impl Reporter {
    pub fn new(verbosity: i8) -> Self {
        Self { verbosity }
    }

    /// An archive failed; printed unless errors are silenced.
    pub fn failure(&self, context: &str, error: &Error) {
        if self.verbosity >= -1 {
            eprintln!("{} {context}: {error}", style("error:").red().bold());
        }
    }

    /// An archive was skipped with a reason.
    pub fn skipped(&self, context: &str, reason: &str) {
        if self.verbosity >= 0 {
            eprintln!("{} {context}: {reason}", style("skipped:").yellow().bold());
        }
    }

    /// An archive finished extracting.
    pub fn finished(&self, archive: &str, target: &Path) {
        if self.verbosity >= 0 {
            println!("{archive} -> {}", target.display());
        }
    }

    /// Progress chatter, shown only when asked for.
    pub fn note(&self, message: &str) {
        if self.verbosity >= 1 {
            eprintln!("{message}");
        }
    }
}

impl Report for Reporter {
    fn warn(&self, message: &str) {
        if self.verbosity >= 0 {
            eprintln!("{} {message}", style("warning:").yellow().bold());
        }
    }

    fn extracted_path(&self, path: &Path) {
        if self.verbosity >= 1 {
            println!("{}", path.display());
        }
    }

    fn nested_outcome(&self, archive: &Path, outcome: &Outcome) {
        match outcome {
            Outcome::Extracted(target) => {
                if self.verbosity >= 0 {
                    println!("{} -> {}", archive.display(), target.display());
                }
            }
            Outcome::Skipped(reason) => {
                self.warn(&format!("{}: {reason}", archive.display()));
            }
            Outcome::Listed(_) => {}
        }
    }

    fn nested_failure(&self, archive: &Path, error: &Error) {
        if self.verbosity >= -1 {
            eprintln!(
                "{} {}: {error}",
                style("error:").red().bold(),
                archive.display()
            );
        }
    }
}

/// Asks the user what to do with a single-entry archive.
pub struct InteractivePrompt;

impl Prompt for InteractivePrompt {
    fn one_entry(&self, archive: &Path, entry: &str) -> OnePolicy {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| archive.display().to_string());
        let items = [
            "extract inside a new directory".to_string(),
            format!("extract `{entry}` here, renamed to the archive's base name"),
            format!("extract `{entry}` here, unchanged"),
        ];
        let choice = Select::new()
            .with_prompt(format!("{name} contains only `{entry}`"))
            .items(&items)
            .default(0)
            .interact();
        match choice {
            Ok(1) => OnePolicy::Rename,
            Ok(2) => OnePolicy::Here,
            // Cancelled or not a terminal: take the safe default.
            _ => OnePolicy::Inside,
        }
    }
}
