use crate::cli::core::{usage, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "backup",
        "Snapshot and restore your book",
        "backup <create [note]|list|restore <name>>",
        cmd_backup,
    )
    .subcommands(&["create", "list", "restore"])]
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list(context);
    };

    match action.to_lowercase().as_str() {
        "create" => {
            let note = (args.len() > 1).then(|| args[1..].join(" "));
            let info = context.api.backup(note.as_deref())?;
            output::success(format!("Backup `{}` created.", info.id));
            Ok(())
        }
        "list" => list(context),
        "restore" => {
            let name = args.get(1).ok_or_else(|| usage("backup restore <name>"))?;
            let info = context.api.restore(name)?;
            output::success(format!("Book restored from `{}`.", info.id));
            Ok(())
        }
        other => Err(usage(&format!(
            "backup <create|list|restore> (unknown action `{}`)",
            other
        ))),
    }
}

fn list(context: &ShellContext) -> CommandResult {
    let backups = context.api.backups()?;
    if backups.is_empty() {
        output::warning("No backups yet. Use `backup create [note]`.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Name"),
        TableColumn::left("Created"),
        TableColumn::left("Note"),
        TableColumn::right("Size"),
    ]);
    for info in &backups {
        table.push(vec![
            info.id.clone(),
            info.created_at.clone(),
            info.note.clone().unwrap_or_else(|| "-".into()),
            format_size(info.size_bytes),
        ]);
    }
    println!("{}", table.render());
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::format_size;

    #[test]
    fn sizes_switch_to_kilobytes() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
    }
}
