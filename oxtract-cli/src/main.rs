//! oxtract CLI - one command for every archive format.
//!
//! Classifies each argument, hands it to the right external tool, and
//! normalizes the result: a dedicated directory named after the archive,
//! readable and writable by the invoking user.

mod ui;

use clap::{ArgAction, Parser, ValueEnum};
use oxtract_engine::download;
use oxtract_engine::{OnePolicy, Orchestrator, Outcome, RunConfig};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxtract")]
#[command(
    author,
    version,
    about = "Intelligently extract archives of many different formats"
)]
#[command(long_about = "
oxtract extracts tar, zip, 7z, cab, rar, lzh, arj, cpio, rpm, deb, gem,
InstallShield and self-extracting .exe archives, and decompresses files
compressed with gzip, bzip2, xz, lzma, lrzip, lzip or compress - all with
one command and one consistent result: contents land in a directory named
after the archive, with permissions the invoking user can work with.

Examples:
  oxtract package.tar.gz
  oxtract -r bundle.zip
  oxtract --one rename release.tar.xz
  oxtract -l archive.deb
  oxtract -m package.gem
  oxtract https://example.com/dist/tool-1.2.tar.bz2
")]
struct Cli {
    /// Archive files or URLs to extract
    #[arg(required = true, value_name = "ARCHIVE")]
    archives: Vec<String>,

    /// Also extract archives found inside the extracted output
    #[arg(short, long)]
    recursive: bool,

    /// Policy for archives that contain a single top-level entry
    #[arg(
        long = "one",
        visible_alias = "one-entry",
        value_enum,
        value_name = "POLICY"
    )]
    one: Option<OneArg>,

    /// Reuse existing target names instead of adding numeric suffixes
    #[arg(short, long)]
    overwrite: bool,

    /// Extract everything straight into the current directory
    #[arg(short, long)]
    flat: bool,

    /// Never prompt; pick the default wherever input would be needed
    #[arg(short, long)]
    noninteractive: bool,

    /// List archive contents instead of extracting
    #[arg(
        short = 'l',
        long = "list",
        visible_short_alias = 't',
        visible_alias = "table"
    )]
    list: bool,

    /// Extract package metadata instead of contents (deb, gem)
    #[arg(short, long)]
    metadata: bool,

    /// Print less; repeat to silence warnings, then errors
    #[arg(short, long, action = ArgAction::Count)]
    quiet: u8,

    /// Print more; repeat for extra detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit listings as JSON (machine-readable, with --list)
    #[arg(long, requires = "list")]
    json: bool,
}

/// Single-entry policy as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OneArg {
    /// Extract into a dedicated directory anyway
    Inside,
    /// Extract the sole entry and rename it to the archive's base name
    Rename,
    /// Extract the sole entry here with its original name
    Here,
}

impl From<OneArg> for OnePolicy {
    fn from(arg: OneArg) -> Self {
        match arg {
            OneArg::Inside => OnePolicy::Inside,
            OneArg::Rename => OnePolicy::Rename,
            OneArg::Here => OnePolicy::Here,
        }
    }
}

#[derive(Serialize)]
struct JsonListing<'a> {
    archive: &'a str,
    entries: &'a [String],
}

fn main() {
    let cli = Cli::parse();
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let config = RunConfig {
        recursive: cli.recursive,
        one_policy: cli.one.map(Into::into),
        overwrite: cli.overwrite,
        flat: cli.flat,
        noninteractive: cli.noninteractive,
        list_only: cli.list,
        metadata_only: cli.metadata,
        verbosity: cli.verbose as i8 - cli.quiet as i8,
    };
    let reporter = ui::Reporter::new(config.verbosity);
    let prompt = ui::InteractivePrompt;
    let mut orchestrator = Orchestrator::new(&config, &prompt, &reporter);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            reporter.failure(".", &e.into());
            return 1;
        }
    };

    let multiple = cli.archives.len() > 1;
    let mut failed = false;
    for arg in &cli.archives {
        let path = if download::is_url(arg) {
            reporter.note(&format!("fetching {arg}"));
            match download::fetch(arg, &cwd, config.overwrite, orchestrator.tools_mut()) {
                Ok(path) => path,
                Err(e) => {
                    reporter.failure(arg, &e);
                    failed = true;
                    continue;
                }
            }
        } else {
            PathBuf::from(arg)
        };

        match orchestrator.process(&path, &cwd) {
            Ok(Outcome::Listed(entries)) => print_listing(arg, &entries, cli.json, multiple),
            Ok(Outcome::Extracted(target)) => reporter.finished(arg, &target),
            Ok(Outcome::Skipped(reason)) => reporter.skipped(arg, &reason),
            Err(e) => {
                reporter.failure(arg, &e);
                failed = true;
            }
        }
    }
    if orchestrator.any_nested_failures() {
        failed = true;
    }
    if failed { 1 } else { 0 }
}

fn print_listing(archive: &str, entries: &[String], json: bool, multiple: bool) {
    if json {
        let doc = JsonListing { archive, entries };
        match serde_json::to_string_pretty(&doc) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("error: could not serialize listing: {e}"),
        }
        return;
    }
    if multiple {
        println!("{archive}:");
    }
    for entry in entries {
        println!("{entry}");
    }
    if multiple {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flag_parsing() {
        let cli = Cli::parse_from(["oxtract", "-rn", "-vv", "--one", "rename", "a.tar.gz"]);
        assert!(cli.recursive);
        assert!(cli.noninteractive);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.one, Some(OneArg::Rename));
        assert_eq!(cli.archives, vec!["a.tar.gz"]);
    }

    #[test]
    fn test_list_aliases() {
        for flag in ["-l", "-t", "--list", "--table"] {
            let cli = Cli::parse_from(["oxtract", flag, "a.zip"]);
            assert!(cli.list, "{flag} should enable listing");
        }
    }

    #[test]
    fn test_json_requires_list() {
        assert!(Cli::try_parse_from(["oxtract", "--json", "a.zip"]).is_err());
        assert!(Cli::try_parse_from(["oxtract", "--json", "-l", "a.zip"]).is_ok());
    }
}
