use budgetwise_core::format::DateFormatter;
use budgetwise_domain::{MonthKey, Transaction, TransactionDraft, TransactionPatch};

use crate::cli::core::{
    parse_amount, parse_assignments, parse_count, parse_date, parse_month, parse_transaction_kind,
    parse_year, short_id, usage, CommandError, CommandResult, ShellContext,
};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};

const ADD_USAGE: &str =
    "transaction add <income|expense> <amount> <YYYY-MM-DD> [category] [note] [method=<value>]";
const EDIT_USAGE: &str =
    "transaction edit <id> <amount|category|date|note|method>=<value>...";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "transaction",
        "Record, list and edit income and expenses",
        "transaction <add|list [kind]|recent [n]|month <m> <yyyy> [kind]|edit <id> field=value...|remove <id>>",
        cmd_transaction,
    )
    .aliases(&["tx"])
    .subcommands(&["add", "list", "recent", "month", "edit", "remove"])]
}

fn cmd_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list(context, &[]);
    };

    match action.to_lowercase().as_str() {
        "add" => add(context, &args[1..]),
        "list" => list(context, &args[1..]),
        "recent" => {
            let limit = args.get(1).map(|value| parse_count(value)).transpose()?;
            let recent = context.api.recent_transactions(limit)?;
            render(context, &recent)
        }
        "month" => {
            if args.len() < 3 {
                return Err(usage("transaction month <m> <yyyy> [income|expense]"));
            }
            let month = parse_month(args[1])?;
            let year = parse_year(args[2])?;
            let kind = args.get(3).map(|kind| parse_transaction_kind(kind)).transpose()?;
            let period = MonthKey { year, month };
            let found = context.api.month_transactions(period, kind)?;
            output::info(format!("{} {}", period.label(), year));
            render(context, &found)
        }
        "edit" => edit(context, &args[1..]),
        "remove" | "rm" => {
            let token = args.get(1).ok_or_else(|| usage("transaction remove <id>"))?;
            let removed = context.api.remove_transaction(token)?;
            output::success(format!(
                "Removed {} of {} dated {}.",
                removed.kind,
                context.formatters.money(removed.amount),
                context.formatters.format_date(removed.date)
            ));
            Ok(())
        }
        other => Err(usage(&format!(
            "transaction <add|list|recent|month|edit|remove> (unknown action `{}`)",
            other
        ))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(usage(ADD_USAGE));
    }
    let kind = parse_transaction_kind(args[0])?;
    let amount = parse_amount(args[1])?;
    let date = parse_date(args[2])?;

    let (assignments, positional): (Vec<&str>, Vec<&str>) = args[3..]
        .iter()
        .copied()
        .partition(|arg| arg.to_ascii_lowercase().starts_with("method="));

    let mut draft = TransactionDraft::new(kind, amount, date);
    if let Some(category) = positional.first() {
        let category = context
            .api
            .resolve_category(category, Some(kind.category_kind()))?;
        draft = draft.category(category.id);
    }
    if positional.len() > 1 {
        draft = draft.note(positional[1..].join(" "));
    }
    if let Some((_, method)) = parse_assignments(&assignments)?.pop() {
        draft = draft.payment_method(method);
    }

    let txn = context.api.add_transaction(draft)?;
    output::success(format!(
        "Recorded {} of {} on {} [{}].",
        txn.kind,
        context.formatters.money(txn.amount),
        context.formatters.format_date(txn.date),
        short_id(txn.id)
    ));
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = args.first().map(|kind| parse_transaction_kind(kind)).transpose()?;
    let transactions = context.api.transactions(kind)?;
    render(context, &transactions)
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(usage(EDIT_USAGE));
    }
    let token = args[0];
    let mut patch = TransactionPatch::default();
    for (field, value) in parse_assignments(&args[1..])? {
        match field.as_str() {
            "amount" => patch.amount = Some(parse_amount(&value)?),
            "date" => patch.date = Some(parse_date(&value)?),
            "note" => patch.note = Some(value),
            "method" | "payment_method" => patch.payment_method = Some(value),
            "category" => {
                let current = context.api.transactions(None)?;
                let kind = current
                    .iter()
                    .find(|txn| txn.id.to_string().starts_with(&token.to_ascii_lowercase()))
                    .map(|txn| txn.kind.category_kind());
                patch.category_id = Some(context.api.resolve_category(&value, kind)?.id);
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown transaction field `{}`",
                    other
                )))
            }
        }
    }

    let txn = context.api.update_transaction(token, patch)?;
    output::success(format!(
        "Transaction {} updated: {} on {}.",
        short_id(txn.id),
        context.formatters.money(txn.amount),
        context.formatters.format_date(txn.date)
    ));
    Ok(())
}

fn render(context: &ShellContext, transactions: &[Transaction]) -> CommandResult {
    if transactions.is_empty() {
        output::warning("No transactions found.");
        return Ok(());
    }
    let names = context.api.categories(None)?;
    let mut table = Table::new(vec![
        TableColumn::left("ID"),
        TableColumn::left("Date"),
        TableColumn::left("Kind"),
        TableColumn::right("Amount"),
        TableColumn::left("Category").max_width(20),
        TableColumn::left("Note").max_width(32),
        TableColumn::left("Method").max_width(16),
    ]);
    for txn in transactions {
        let category = txn
            .category_id
            .and_then(|id| names.iter().find(|category| category.id == id))
            .map(|category| category.name.clone())
            .unwrap_or_default();
        table.push(vec![
            short_id(txn.id),
            context.formatters.format_date(txn.date),
            txn.kind.to_string(),
            context.formatters.money(txn.amount),
            category,
            txn.note.clone().unwrap_or_default(),
            txn.payment_method.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table.render());
    Ok(())
}
