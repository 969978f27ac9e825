//! I/O helpers for campaign commands.

pub mod config;
pub mod init;
pub mod process;
pub mod prompt;
pub mod registry_store;
pub mod report;
pub mod scanner;
pub mod worker;
