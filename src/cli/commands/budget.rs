use budgetwise_core::format::format_percent;
use budgetwise_domain::{month_label, Budget, BudgetStatusReport, CategoryKind};

use crate::cli::core::{
    parse_amount, parse_assignments, parse_month, parse_year, short_id, usage, CommandError,
    CommandResult, ShellContext,
};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "budget",
        "Set monthly category budgets and track spending against them",
        "budget <set <category> <m> <yyyy> <amount>|list|current|status <category> <m> <yyyy>|overview <m> <yyyy>|edit <id> field=value...|remove <id>>",
        cmd_budget,
    )
    .subcommands(&[
        "set", "list", "current", "status", "overview", "edit", "remove",
    ])]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        let budgets = context.api.current_budgets()?;
        return render_budgets(context, &budgets);
    };

    match action.to_lowercase().as_str() {
        "set" => {
            if args.len() < 5 {
                return Err(usage("budget set <category> <m> <yyyy> <amount>"));
            }
            let category = context
                .api
                .resolve_category(args[1], Some(CategoryKind::Expense))?;
            let month = parse_month(args[2])?;
            let year = parse_year(args[3])?;
            let amount = parse_amount(args[4])?;
            context.api.set_budget(category.id, month, year, amount)?;
            output::success(format!(
                "Budget for {} in {} {} set to {}.",
                category.name,
                month_label(month),
                year,
                context.formatters.money(amount)
            ));
            Ok(())
        }
        "list" => {
            let budgets = context.api.budgets()?;
            render_budgets(context, &budgets)
        }
        "current" => {
            let budgets = context.api.current_budgets()?;
            render_budgets(context, &budgets)
        }
        "status" => {
            if args.len() < 4 {
                return Err(usage("budget status <category> <m> <yyyy>"));
            }
            let category = context
                .api
                .resolve_category(args[1], Some(CategoryKind::Expense))?;
            let month = parse_month(args[2])?;
            let year = parse_year(args[3])?;
            let report = context.api.budget_status(category.id, month, year)?;
            render_reports(context, &[report]);
            Ok(())
        }
        "overview" => {
            if args.len() < 3 {
                return Err(usage("budget overview <m> <yyyy>"));
            }
            let month = parse_month(args[1])?;
            let year = parse_year(args[2])?;
            let reports = context.api.budget_overview(month, year)?;
            if reports.is_empty() {
                output::warning(format!(
                    "No budgets for {} {}.",
                    month_label(month),
                    year
                ));
                return Ok(());
            }
            render_reports(context, &reports);
            Ok(())
        }
        "edit" => edit(context, &args[1..]),
        "remove" | "rm" => {
            let token = args.get(1).ok_or_else(|| usage("budget remove <id>"))?;
            let removed = context.api.remove_budget(token)?;
            output::success(format!(
                "Budget {} for {} {} removed.",
                short_id(removed.id),
                month_label(removed.month),
                removed.year
            ));
            Ok(())
        }
        other => Err(usage(&format!(
            "budget <set|list|current|status|overview|edit|remove> (unknown action `{}`)",
            other
        ))),
    }
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(usage(
            "budget edit <id> <amount|month|year|category>=<value>...",
        ));
    }
    let token = args[0];
    let mut amount = None;
    let mut month = None;
    let mut year = None;
    let mut category_id = None;
    for (field, value) in parse_assignments(&args[1..])? {
        match field.as_str() {
            "amount" => amount = Some(parse_amount(&value)?),
            "month" => month = Some(parse_month(&value)?),
            "year" => year = Some(parse_year(&value)?),
            "category" => {
                category_id = Some(
                    context
                        .api
                        .resolve_category(&value, Some(CategoryKind::Expense))?
                        .id,
                )
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown budget field `{}`",
                    other
                )))
            }
        }
    }

    let budget = context.api.update_budget(token, |patch| {
        if let Some(amount) = amount {
            patch.amount = amount;
        }
        if let Some(month) = month {
            patch.month = month;
        }
        if let Some(year) = year {
            patch.year = year;
        }
        patch.category_id = category_id;
    })?;
    output::success(format!(
        "Budget {} now {} for {} {}.",
        short_id(budget.id),
        context.formatters.money(budget.amount),
        month_label(budget.month),
        budget.year
    ));
    Ok(())
}

fn render_budgets(context: &ShellContext, budgets: &[Budget]) -> CommandResult {
    if budgets.is_empty() {
        output::warning("No budgets found.");
        return Ok(());
    }
    let categories = context.api.categories(Some(CategoryKind::Expense))?;
    let mut table = Table::new(vec![
        TableColumn::left("ID"),
        TableColumn::left("Category").max_width(24),
        TableColumn::left("Period"),
        TableColumn::right("Amount"),
    ]);
    for budget in budgets {
        let name = categories
            .iter()
            .find(|category| category.id == budget.category_id)
            .map(|category| category.name.clone())
            .unwrap_or_else(|| "Unknown".into());
        table.push(vec![
            short_id(budget.id),
            name,
            budget.period().to_string(),
            context.formatters.money(budget.amount),
        ]);
    }
    println!("{}", table.render());
    Ok(())
}

fn render_reports(context: &ShellContext, reports: &[BudgetStatusReport]) {
    let mut table = Table::new(vec![
        TableColumn::left("Category").max_width(24),
        TableColumn::right("Budget"),
        TableColumn::right("Spent"),
        TableColumn::right("Remaining"),
        TableColumn::right("Used"),
        TableColumn::left("Status"),
    ]);
    for report in reports {
        table.push(vec![
            report.category_name.clone(),
            context.formatters.money(report.budget_amount),
            context.formatters.money(report.actual_spent),
            context.formatters.money(report.remaining_amount),
            format_percent(report.percent_used),
            report.status.to_string(),
        ]);
    }
    println!("{}", table.render());
}
