//! Core CLI dispatch, error reporting, and argument parsing helpers.

use std::io;

use budgetwise_config::ConfigError;
use budgetwise_core::CoreError;
use budgetwise_domain::{is_valid_month, CategoryKind, TransactionKind};
use chrono::NaiveDate;
use strsim::levenshtein;
use uuid::Uuid;

pub use crate::cli::shell_context::{CliMode, ShellContext};
use crate::core::errors::BudgetError;
pub use crate::core::errors::CliError;

use super::registry::CommandEntry;
use super::{output, prompts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        crate::cli::shell::handle_line(self, line)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = closest_command(self.registry.names(), input) {
            output::info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        prompts::confirm(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(BudgetError::Core(CoreError::Unauthorized(message))) => {
                self.print_error(&message);
                self.print_hint("Use `login <email>` to sign in, or `register` to create an account.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        output::error(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        output::hint(message);
    }
}

/// Nearest registered command within an edit distance of three.
pub(crate) fn closest_command<'a>(
    names: impl Iterator<Item = &'a str>,
    input: &str,
) -> Option<&'a str> {
    let needle = input.to_lowercase();
    names
        .map(|name| (levenshtein(name, &needle), name))
        .min_by_key(|(distance, _)| *distance)
        .filter(|(distance, _)| *distance <= 3)
        .map(|(_, name)| name)
}

pub(crate) fn usage(message: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {message}"))
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))
}

pub(crate) fn parse_month(input: &str) -> Result<u32, CommandError> {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|month| is_valid_month(*month))
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!("invalid month `{}` (use 1-12)", input))
        })
}

pub(crate) fn parse_year(input: &str) -> Result<i32, CommandError> {
    input
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|year| (1900..=9999).contains(year))
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid year `{}`", input)))
}

pub(crate) fn parse_count(input: &str) -> Result<usize, CommandError> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!("`{}` must be a positive number", input))
        })
}

pub(crate) fn parse_category_kind(input: &str) -> Result<CategoryKind, CommandError> {
    input
        .parse::<CategoryKind>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

pub(crate) fn parse_transaction_kind(input: &str) -> Result<TransactionKind, CommandError> {
    input
        .parse::<TransactionKind>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

/// Splits `field=value` edit arguments.
pub(crate) fn parse_assignments(args: &[&str]) -> Result<Vec<(String, String)>, CommandError> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "expected <field>=<value>, got `{}`",
                        arg
                    ))
                })
        })
        .collect()
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.to_string();
    short.truncate(8);
    short
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Core(BudgetError::Core(err))
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownKey(_) | ConfigError::InvalidValue { .. } => {
                CommandError::InvalidArguments(err.to_string())
            }
            other => CommandError::Core(BudgetError::Config(other)),
        }
    }
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Core(inner),
            CliError::Command(message) => CommandError::Message(message),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    base: std::path::PathBuf,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_base_dir(CliMode::Script, base)?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetwise_domain::MonthKey;
    use tempfile::tempdir;

    #[test]
    fn parse_line_handles_quotes() {
        let tokens =
            crate::cli::shell::parse_command_line("category add \"Pet Care\" expense").unwrap();
        assert_eq!(tokens, vec!["category", "add", "Pet Care", "expense"]);
    }

    #[test]
    fn suggestions_stay_within_distance() {
        let names = ["transaction", "budget", "report"];
        assert_eq!(
            closest_command(names.iter().copied(), "budgte"),
            Some("budget")
        );
        assert_eq!(closest_command(names.iter().copied(), "zzzzzzzz"), None);
    }

    #[test]
    fn argument_parsers_reject_bad_input() {
        assert!(parse_month("13").is_err());
        assert_eq!(parse_month("7").unwrap(), 7);
        assert!(parse_amount("abc").is_err());
        assert!(parse_date("2024/01/01").is_err());
        assert!(parse_count("0").is_err());
        let pairs = parse_assignments(&["amount=12.5", "Note=lunch break"]).unwrap();
        assert_eq!(pairs[1], ("note".to_string(), "lunch break".to_string()));
        assert!(parse_assignments(&["amount"]).is_err());
    }

    #[test]
    fn script_runner_records_transactions() {
        let dir = tempdir().unwrap();
        let context = process_script(
            dir.path().to_path_buf(),
            &[
                "register \"Ada Lovelace\" ada@example.com secret1",
                "login ada@example.com secret1",
                "transaction add income 2500 2024-05-01 Salary \"May pay\"",
                "transaction add expense 42.5 2024-05-03 \"Food & Dining\"",
                "budget set \"Food & Dining\" 5 2024 300",
                "exit",
            ],
        )
        .unwrap();

        let totals = context.api.totals().expect("totals");
        assert_eq!(totals.total_income, 2500.0);
        assert_eq!(totals.total_expense, 42.5);
        let may = MonthKey::new(2024, 5).unwrap();
        assert_eq!(context.api.month_transactions(may, None).unwrap().len(), 2);
        assert_eq!(context.api.budgets().unwrap().len(), 1);
    }

    #[test]
    fn transaction_add_accepts_a_payment_method() {
        let dir = tempdir().unwrap();
        let context = process_script(
            dir.path().to_path_buf(),
            &[
                "register \"Ada Lovelace\" ada@example.com secret1",
                "login ada@example.com secret1",
                "transaction add expense 12 2024-05-04 Transport method=card \"bus pass\"",
                "transaction add income 80 2024-05-05 method=cash",
            ],
        )
        .unwrap();

        let recorded = context.api.transactions(None).unwrap();
        assert_eq!(recorded.len(), 2);
        let bus = &recorded[1];
        assert_eq!(bus.payment_method.as_deref(), Some("card"));
        assert_eq!(bus.note.as_deref(), Some("bus pass"));
        assert!(bus.category_id.is_some());
        let cash = &recorded[0];
        assert_eq!(cash.payment_method.as_deref(), Some("cash"));
        assert!(cash.category_id.is_none());
    }

    #[test]
    fn oversized_session_lifetime_is_rejected_before_login() {
        let dir = tempdir().unwrap();
        let context = process_script(
            dir.path().to_path_buf(),
            &[
                "config set session_ttl_hours 4000000000",
                "register \"Ada Lovelace\" ada@example.com secret1",
                "login ada@example.com secret1",
            ],
        )
        .unwrap();

        assert_eq!(context.config.session_ttl_hours, 24);
        assert_eq!(context.api.current_user().unwrap().email, "ada@example.com");
    }

    #[test]
    fn commands_require_login() {
        let dir = tempdir().unwrap();
        let mut context =
            ShellContext::with_base_dir(CliMode::Script, dir.path().to_path_buf()).unwrap();
        let err = context
            .process_line("transaction list")
            .expect_err("not logged in");
        assert!(matches!(
            err,
            CommandError::Core(BudgetError::Core(CoreError::Unauthorized(_)))
        ));
    }

    #[test]
    fn command_failures_are_not_reported_as_usage_errors() {
        let err = CommandError::from(CliError::Command("disk full".into()));
        assert!(matches!(err, CommandError::Message(ref message) if message == "disk full"));
    }

    #[test]
    fn exit_stops_the_loop() {
        let dir = tempdir().unwrap();
        let mut context =
            ShellContext::with_base_dir(CliMode::Script, dir.path().to_path_buf()).unwrap();
        assert_eq!(context.process_line("exit").unwrap(), LoopControl::Exit);
        assert_eq!(context.process_line("  ").unwrap(), LoopControl::Continue);
    }
}
