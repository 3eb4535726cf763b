use crate::cli::output::{info, section};
use crate::cli::registry::{CommandEntry, CommandRegistry};
use crate::cli::ui::table::{Table, TableColumn};

pub fn print_overview(registry: &CommandRegistry) {
    section("Commands");
    let mut table = Table::new(vec![
        TableColumn::left("Command"),
        TableColumn::left("Aliases"),
        TableColumn::left("Description").max_width(60),
    ]);
    for entry in registry.list() {
        table.push(vec![
            entry.name.to_string(),
            entry.aliases.join(", "),
            entry.description.to_string(),
        ]);
    }
    println!("{}", table.render());
    info("Type `help <command>` for usage. Arguments with spaces need quotes.");
}

pub fn print_command(entry: &CommandEntry) {
    section(entry.name);
    info(entry.description);
    info(format!("usage: {}", entry.usage));
    if !entry.subcommands.is_empty() {
        info(format!("actions: {}", entry.subcommands.join(", ")));
    }
    if !entry.aliases.is_empty() {
        info(format!("aliases: {}", entry.aliases.join(", ")));
    }
}
