//! # oxtract core
//!
//! Core components for oxtract, the unified archive-extraction front end:
//!
//! - [`format`]: the format registry: tags, suffix table, magic sniffing,
//!   classification chains, base-name stripping
//! - [`error`]: the error taxonomy shared by the whole pipeline
//!
//! This crate never spawns processes and never writes to the filesystem;
//! its only I/O is reading a file's leading bytes during classification.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod format;

pub use error::{Error, Result};
pub use format::{Classification, Format, classify, sniff, strip_suffixes};
