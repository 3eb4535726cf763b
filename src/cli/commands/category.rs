use budgetwise_domain::{Category, CategoryKind};

use crate::cli::core::{parse_category_kind, short_id, usage, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "category",
        "Manage income and expense categories",
        "category <list [income|expense]|add <name> <income|expense>|remove <name|id>|seed>",
        cmd_category,
    )
    .aliases(&["cat"])
    .subcommands(&["list", "add", "remove", "seed"])]
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list_categories(context, None);
    };

    match action.to_lowercase().as_str() {
        "list" => {
            let kind = args.get(1).map(|kind| parse_category_kind(kind)).transpose()?;
            list_categories(context, kind)
        }
        "add" => {
            if args.len() < 3 {
                return Err(usage("category add <name> <income|expense>"));
            }
            let kind = parse_category_kind(args[2])?;
            let category = context.api.add_category(args[1], kind)?;
            output::success(format!(
                "Category `{}` ({}) added.",
                category.name, category.kind
            ));
            Ok(())
        }
        "remove" | "rm" => {
            let token = args.get(1).ok_or_else(|| usage("category remove <name|id>"))?;
            let removed = context.api.remove_category(token)?;
            output::success(format!("Category `{}` removed.", removed.name));
            Ok(())
        }
        "seed" => {
            let created = context.api.seed_categories()?;
            if created == 0 {
                output::info("Default categories already present.");
            } else {
                output::success(format!("Added {} default categories.", created));
            }
            Ok(())
        }
        other => Err(usage(&format!(
            "category <list|add|remove|seed> (unknown action `{}`)",
            other
        ))),
    }
}

fn list_categories(context: &ShellContext, kind: Option<CategoryKind>) -> CommandResult {
    let categories = context.api.categories(kind)?;
    if categories.is_empty() {
        output::warning("No categories yet. Use `category seed` or `category add`.");
        return Ok(());
    }
    println!("{}", category_table(&categories).render());
    Ok(())
}

fn category_table(categories: &[Category]) -> Table {
    let mut table = Table::new(vec![
        TableColumn::left("ID"),
        TableColumn::left("Name").max_width(28),
        TableColumn::left("Kind"),
        TableColumn::left("Default"),
    ]);
    for category in categories {
        table.push(vec![
            short_id(category.id),
            category.name.clone(),
            category.kind.to_string(),
            if category.is_default { "yes" } else { "" }.to_string(),
        ]);
    }
    table
}
