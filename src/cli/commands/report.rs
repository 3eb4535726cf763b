//! Read-only financial reports over the signed-in user's book.

use budgetwise_core::format::{format_percent, DateFormatter};
use budgetwise_core::Totals;
use chrono::Datelike;

use crate::cli::core::{parse_year, usage, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};
use crate::services::Clock;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "report",
        "Summaries, breakdowns and trends",
        "report [summary|breakdown|trend|yearly <yyyy>|dashboard]",
        cmd_report,
    )
    .subcommands(&["summary", "breakdown", "trend", "yearly", "dashboard"])]
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args.first().map(|a| a.to_lowercase());
    match action.as_deref().unwrap_or("summary") {
        "summary" => summary(context),
        "breakdown" => breakdown(context),
        "trend" => trend(context),
        "yearly" => {
            let year = match args.get(1) {
                Some(value) => parse_year(value)?,
                None => context.api.clock().today().year(),
            };
            yearly(context, year)
        }
        "dashboard" => dashboard(context),
        other => Err(usage(&format!(
            "report [summary|breakdown|trend|yearly <yyyy>|dashboard] (unknown report `{}`)",
            other
        ))),
    }
}

fn summary(context: &ShellContext) -> CommandResult {
    let totals = context.api.totals()?;
    output::section("Summary");
    print_totals(context, &totals);
    output::info(format!(
        "  Categories used : {}",
        context.api.categories_used()?
    ));
    Ok(())
}

fn print_totals(context: &ShellContext, totals: &Totals) {
    output::info(format!(
        "  Total income    : {}",
        context.formatters.money(totals.total_income)
    ));
    output::info(format!(
        "  Total expense   : {}",
        context.formatters.money(totals.total_expense)
    ));
    output::info(format!(
        "  Net balance     : {}",
        context.formatters.money(totals.net_balance)
    ));
}

fn breakdown(context: &ShellContext) -> CommandResult {
    let entries = context.api.expense_breakdown()?;
    if entries.is_empty() {
        output::warning("No expenses recorded yet.");
        return Ok(());
    }
    let total: f64 = entries.iter().map(|entry| entry.amount).sum();
    let mut table = Table::new(vec![
        TableColumn::left("Category").max_width(28),
        TableColumn::right("Amount"),
        TableColumn::right("Share"),
    ]);
    for entry in &entries {
        table.push(vec![
            entry.category.clone(),
            context.formatters.money(entry.amount),
            format_percent(entry.amount / total * 100.0),
        ]);
    }
    output::section("Expense breakdown");
    println!("{}", table.render());
    Ok(())
}

fn trend(context: &ShellContext) -> CommandResult {
    let points = context.api.spending_trend()?;
    if points.is_empty() {
        output::warning("No expenses recorded yet.");
        return Ok(());
    }
    let mut table = Table::new(vec![TableColumn::left("Date"), TableColumn::right("Spent")]);
    for point in &points {
        table.push(vec![
            context.formatters.format_date(point.date),
            context.formatters.money(point.amount),
        ]);
    }
    output::section("Daily spending");
    println!("{}", table.render());
    Ok(())
}

fn yearly(context: &ShellContext, year: i32) -> CommandResult {
    let buckets = context.api.income_vs_expense(year)?;
    let mut table = Table::new(vec![
        TableColumn::left("Month"),
        TableColumn::right("Income"),
        TableColumn::right("Expense"),
        TableColumn::right("Net"),
    ]);
    for bucket in &buckets {
        table.push(vec![
            bucket.label.clone(),
            context.formatters.money(bucket.income),
            context.formatters.money(bucket.expense),
            context.formatters.money(bucket.income - bucket.expense),
        ]);
    }
    output::section(format!("Income vs expense {}", year));
    println!("{}", table.render());
    Ok(())
}

fn dashboard(context: &ShellContext) -> CommandResult {
    let dashboard = context.api.dashboard()?;
    output::section("Dashboard");
    print_totals(context, &dashboard.totals);
    output::info(format!(
        "  {} income   : {}",
        dashboard.month,
        context.formatters.money(dashboard.monthly.total_income)
    ));
    output::info(format!(
        "  {} expense  : {}",
        dashboard.month,
        context.formatters.money(dashboard.monthly.total_expense)
    ));
    output::info(format!(
        "  Savings rate    : {}",
        format_percent(dashboard.savings_rate)
    ));
    output::info(format!(
        "  Avg monthly exp : {}",
        context.formatters.money(dashboard.average_monthly_expense)
    ));
    if let Some(top) = &dashboard.highest_spending {
        output::info(format!(
            "  Top category    : {} ({})",
            top.category,
            context.formatters.money(top.amount)
        ));
    }
    if !dashboard.recent.is_empty() {
        output::section("Recent transactions");
        for txn in &dashboard.recent {
            output::info(format!(
                "  {}  {:<7} {}",
                context.formatters.format_date(txn.date),
                txn.kind,
                context.formatters.money(txn.amount)
            ));
        }
    }
    Ok(())
}
