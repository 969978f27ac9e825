//! Resumable file-by-file campaigns driven by an external agent.
//!
//! A campaign is a persisted registry of per-file tasks under a directory
//! root. Two kinds exist: code reading (`.code-read/`) and security auditing
//! (`.security-audit/`). The layout follows a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (classification, filtering,
//!   selection, view rendering, invariants). No I/O.
//! - **[`io`]**: Side-effecting operations (scanning, store persistence,
//!   config, prompts, process execution).
//!
//! Orchestration modules ([`select`], [`mark`], [`looping`]) combine both to
//! implement CLI commands.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod mark;
pub mod select;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
