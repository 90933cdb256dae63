//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod check;
mod config;
mod filter;
mod infer;
mod schema;
mod utils;
mod validate;

pub use check::handle_check;
pub use config::handle_config;
pub use filter::handle_filter;
pub use infer::handle_infer;
pub use schema::{handle_json_schema, handle_sdl};
pub use validate::handle_validate;
