//! URL fetching for positional URL arguments.
//!
//! Downloading is delegated the same way extraction is: to whichever of
//! curl or wget is installed. The downloaded filename goes through the same
//! collision resolution as any other target, so a re-run never silently
//! clobbers an earlier download.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use oxtract_core::{Error, Result};

use crate::backend::ToolCache;
use crate::target::resolve_name;

/// Is this argument a URL rather than a local path?
pub fn is_url(arg: &str) -> bool {
    arg.starts_with("http://") || arg.starts_with("https://") || arg.starts_with("ftp://")
}

/// Filename implied by a URL's last path segment.
pub fn url_filename(url: &str) -> &str {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let rest = without_query
        .split_once("://")
        .map_or(without_query, |(_, r)| r);
    // Everything up to the first slash is the host, not a filename.
    match rest.trim_end_matches('/').split_once('/') {
        Some((_, path)) => match path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => "download",
        },
        None => "download",
    }
}

/// Fetch a URL into `cwd` and return the local path.
pub fn fetch(url: &str, cwd: &Path, overwrite: bool, tools: &mut ToolCache) -> Result<PathBuf> {
    let target = resolve_name(cwd, url_filename(url), overwrite)?;
    let out = target.path.clone();

    let mut cmd = if let Some(curl) = tools.locate("curl") {
        let mut c = Command::new(curl);
        c.arg("-L").arg("-f").arg("-sS").arg("-o").arg(&out).arg(url);
        c
    } else if let Some(wget) = tools.locate("wget") {
        let mut c = Command::new(wget);
        c.arg("-q").arg("-O").arg(&out).arg(url);
        c
    } else {
        return Err(Error::download(url, "neither curl nor wget is installed"));
    };

    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = match stderr.trim() {
            "" => format!("downloader exited with {}", output.status),
            s => s.to_string(),
        };
        return Err(Error::download(url, detail));
    }
    Ok(out)
}
