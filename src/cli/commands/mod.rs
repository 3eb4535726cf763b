pub mod auth;
pub mod backup;
pub mod budget;
pub mod category;
pub mod config;
pub mod report;
pub mod system;
pub mod transaction;

use crate::cli::registry::{CommandEntry, CommandRegistry};

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(auth::definitions());
    commands.extend(category::definitions());
    commands.extend(transaction::definitions());
    commands.extend(budget::definitions());
    commands.extend(report::definitions());
    commands.extend(backup::definitions());
    commands.extend(config::definitions());
    commands
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in all_definitions() {
        registry.register(entry);
    }
}
