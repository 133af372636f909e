// Gateway module for the command line interface

mod args;
mod commands;

pub use args::{Cli, Commands};
pub use commands::handle_command;
