//! Command-line interface for scrobble-minder.
//!
//! This module provides CLI commands for syncing a user's listening
//! history and running period queries against it.

mod commands;

pub use commands::{Cli, Commands, run_command};
