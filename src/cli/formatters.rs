use budgetwise_config::Config;
use budgetwise_core::format::{CurrencyFormatter, DateFormatter};
use chrono::NaiveDate;

/// Formatter implementations backed by a snapshot of the active configuration.
#[derive(Debug, Clone)]
pub struct CliFormatters {
    currency: String,
    precision: usize,
}

impl CliFormatters {
    pub fn new(config: &Config) -> Self {
        Self {
            currency: config.currency.clone(),
            precision: config.currency_precision as usize,
        }
    }

    /// Formats `amount` in the configured currency.
    pub fn money(&self, amount: f64) -> String {
        self.format_amount(amount, "")
    }
}

impl CurrencyFormatter for CliFormatters {
    fn format_amount(&self, amount: f64, currency: &str) -> String {
        let code = if currency.is_empty() {
            self.currency.as_str()
        } else {
            currency
        };
        format!(
            "{amount:.prec$} {code}",
            amount = amount,
            prec = self.precision,
            code = code
        )
    }
}

impl DateFormatter for CliFormatters {
    fn format_date(&self, date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }
}
