//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod instance;
mod schema;
mod utils;

pub use instance::handle_instance;
pub use schema::handle_schema;
