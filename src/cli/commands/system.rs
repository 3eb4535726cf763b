use budgetwise_domain::CURRENT_SCHEMA_VERSION;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("help", "List commands or show one command's usage", "help [command]", cmd_help)
            .aliases(&["?"]),
        CommandEntry::new("version", "Show version and build details", "version", cmd_version),
        CommandEntry::new("exit", "Leave the shell", "exit", cmd_exit).aliases(&["quit", "q"]),
    ]
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Budgetwise {}", meta.version));
    let schema = format!("v{CURRENT_SCHEMA_VERSION}");
    let build = format!("{} ({})", meta.git_hash, meta.git_status);
    for (label, value) in [
        ("Book schema", schema.as_str()),
        ("Build", build.as_str()),
        ("Built at", meta.timestamp),
        ("Target", meta.target),
        ("Profile", meta.profile),
        ("Compiler", meta.rustc),
    ] {
        output::info(format!("  {label:<12} {value}"));
    }
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        Some(name) => match context.command(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        },
        None => help::print_overview(&context.registry),
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
