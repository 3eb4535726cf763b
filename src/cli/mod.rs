pub mod commands;
pub mod core;
pub mod formatters;
pub mod help;
pub mod output;
pub mod prompts;
pub mod registry;
mod shell;
pub mod shell_context;
pub mod ui;

pub use shell::{run_cli, SCRIPT_ENV};
