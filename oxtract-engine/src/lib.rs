//! # oxtract engine
//!
//! The extraction policy engine behind the `oxtract` binary:
//!
//! - [`backend`]: external tool command plans and invocation
//! - [`inspect`]: entry counts and the single-entry heuristic
//! - [`target`]: destination naming and collision resolution
//! - [`permissions`]: mode-bit normalization of extracted output
//! - [`download`]: fetching positional URL arguments
//! - [`orchestrate`]: the per-archive state machine tying it together
//!
//! Processing is single-threaded and sequential by design: the destination
//! namespace is the one contended resource, and collision resolution is
//! only sound because no two extractions run at once.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod download;
pub mod inspect;
pub mod orchestrate;
pub mod permissions;
pub mod target;

pub use backend::ToolCache;
pub use orchestrate::{OnePolicy, Orchestrator, Outcome, Prompt, Report, RunConfig};
pub use target::{Disposition, Target};
