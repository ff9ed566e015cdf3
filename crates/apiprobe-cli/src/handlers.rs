//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod check;
mod fixtures;
mod run;
mod utils;

pub use check::handle_check;
pub use fixtures::handle_fixtures;
pub use run::handle_run;
