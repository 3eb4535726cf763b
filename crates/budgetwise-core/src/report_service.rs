//! Aggregates derived from a book's transactions.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use budgetwise_domain::{month_label, Book, MonthKey, Transaction, TransactionKind};

use crate::transaction_service::TransactionService;

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Income, expense and their difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_balance: f64,
}

impl Totals {
    fn from_transactions<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Self {
        let mut totals = Totals::default();
        for txn in transactions {
            match txn.kind {
                TransactionKind::Income => totals.total_income += txn.amount,
                TransactionKind::Expense => totals.total_expense += txn.amount,
            }
        }
        totals.net_balance = totals.total_income - totals.total_expense;
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub month: u32,
    pub label: String,
    pub income: f64,
    pub expense: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Summary bundle shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub totals: Totals,
    pub month: MonthKey,
    pub monthly: Totals,
    pub savings_rate: f64,
    pub average_monthly_expense: f64,
    pub highest_spending: Option<CategoryTotal>,
    pub recent: Vec<Transaction>,
}

pub struct ReportService;

impl ReportService {
    pub fn totals(book: &Book) -> Totals {
        Totals::from_transactions(book.transactions.iter())
    }

    /// Totals restricted to the calendar month containing `today`.
    pub fn monthly_totals(book: &Book, today: NaiveDate) -> Totals {
        let period = MonthKey::of(today);
        Totals::from_transactions(book.transactions.iter().filter(|txn| period.contains(txn.date)))
    }

    /// Percentage of income kept, rounded to one decimal. Negative when overspending.
    pub fn savings_rate(totals: &Totals) -> f64 {
        if totals.total_income == 0.0 {
            return 0.0;
        }
        let rate = (totals.total_income - totals.total_expense) / totals.total_income * 100.0;
        (rate * 10.0).round() / 10.0
    }

    /// Total expense divided by the number of months that contain expenses.
    pub fn average_monthly_expense(book: &Book) -> f64 {
        let expenses: Vec<_> = book.transactions.iter().filter(|txn| txn.is_expense()).collect();
        let months: HashSet<MonthKey> = expenses.iter().map(|txn| MonthKey::of(txn.date)).collect();
        if months.is_empty() {
            return 0.0;
        }
        expenses.iter().map(|txn| txn.amount).sum::<f64>() / months.len() as f64
    }

    /// Distinct category references across all transactions. Uncategorized counts once.
    pub fn categories_used(book: &Book) -> usize {
        book.transactions
            .iter()
            .map(|txn| txn.category_id)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Expense totals per category name, largest first.
    pub fn expense_breakdown(book: &Book) -> Vec<CategoryTotal> {
        let mut totals: HashMap<String, f64> = HashMap::new();
        for txn in book.transactions.iter().filter(|txn| txn.is_expense()) {
            let name = book
                .category_name(txn.category_id)
                .unwrap_or(UNCATEGORIZED_LABEL);
            *totals.entry(name.to_string()).or_insert(0.0) += txn.amount;
        }
        let mut breakdown: Vec<_> = totals
            .into_iter()
            .map(|(category, amount)| CategoryTotal { category, amount })
            .collect();
        breakdown.sort_by(|a, b| {
            b.amount
                .total_cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
        });
        breakdown
    }

    pub fn highest_spending_category(book: &Book) -> Option<CategoryTotal> {
        Self::expense_breakdown(book).into_iter().next()
    }

    /// Twelve buckets of income and expense for `year`.
    pub fn income_vs_expense(book: &Book, year: i32) -> Vec<MonthBucket> {
        let mut buckets: Vec<MonthBucket> = (1..=12)
            .map(|month| MonthBucket {
                month,
                label: month_label(month).to_string(),
                income: 0.0,
                expense: 0.0,
            })
            .collect();
        for txn in book.transactions.iter().filter(|txn| txn.date.year() == year) {
            let bucket = &mut buckets[txn.date.month0() as usize];
            match txn.kind {
                TransactionKind::Income => bucket.income += txn.amount,
                TransactionKind::Expense => bucket.expense += txn.amount,
            }
        }
        buckets
    }

    /// Daily expense totals, oldest first.
    pub fn spending_trend(book: &Book) -> Vec<TrendPoint> {
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for txn in book.transactions.iter().filter(|txn| txn.is_expense()) {
            *daily.entry(txn.date).or_insert(0.0) += txn.amount;
        }
        daily
            .into_iter()
            .map(|(date, amount)| TrendPoint { date, amount })
            .collect()
    }

    pub fn dashboard(book: &Book, today: NaiveDate, recent_limit: usize) -> Dashboard {
        let totals = Self::totals(book);
        Dashboard {
            totals,
            month: MonthKey::of(today),
            monthly: Self::monthly_totals(book, today),
            savings_rate: Self::savings_rate(&totals),
            average_monthly_expense: Self::average_monthly_expense(book),
            highest_spending: Self::highest_spending_category(book),
            recent: TransactionService::recent(book, recent_limit)
                .into_iter()
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use budgetwise_domain::{Category, CategoryKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn add(book: &mut Book, kind: TransactionKind, amount: f64, category: Option<Uuid>, when: NaiveDate) {
        book.add_transaction(Transaction::new(kind, amount, category, when, Utc::now()));
    }

    fn sample() -> Book {
        let mut book = Book::new(Uuid::new_v4());
        let food = book.add_category(Category::new("Food", CategoryKind::Expense));
        let rent = book.add_category(Category::new("Rent", CategoryKind::Expense));
        add(&mut book, TransactionKind::Income, 1000.0, None, date(2024, 1, 1));
        add(&mut book, TransactionKind::Expense, 500.0, Some(rent), date(2024, 1, 2));
        add(&mut book, TransactionKind::Expense, 100.0, Some(food), date(2024, 1, 2));
        add(&mut book, TransactionKind::Expense, 50.0, Some(food), date(2024, 2, 10));
        add(&mut book, TransactionKind::Expense, 20.0, None, date(2024, 2, 11));
        book
    }

    #[test]
    fn totals_and_savings_rate() {
        let book = sample();
        let totals = ReportService::totals(&book);
        assert_eq!(totals.total_income, 1000.0);
        assert_eq!(totals.total_expense, 670.0);
        assert_eq!(totals.net_balance, 330.0);
        assert_eq!(ReportService::savings_rate(&totals), 33.0);
    }

    #[test]
    fn savings_rate_is_unclamped_and_zero_without_income() {
        let overspent = Totals {
            total_income: 300.0,
            total_expense: 400.0,
            net_balance: -100.0,
        };
        assert_eq!(ReportService::savings_rate(&overspent), -33.3);
        assert_eq!(ReportService::savings_rate(&Totals::default()), 0.0);
    }

    #[test]
    fn average_monthly_expense_uses_months_with_expenses() {
        let book = sample();
        assert_eq!(ReportService::average_monthly_expense(&book), 335.0);
        assert_eq!(
            ReportService::average_monthly_expense(&Book::new(Uuid::new_v4())),
            0.0
        );
    }

    #[test]
    fn breakdown_groups_uncategorized_and_sorts_descending() {
        let book = sample();
        let breakdown = ReportService::expense_breakdown(&book);
        let labels: Vec<_> = breakdown.iter().map(|row| row.category.as_str()).collect();
        assert_eq!(labels, vec!["Rent", "Food", UNCATEGORIZED_LABEL]);
        assert_eq!(breakdown[1].amount, 150.0);
        assert_eq!(
            ReportService::highest_spending_category(&book).map(|row| row.category),
            Some("Rent".to_string())
        );
    }

    #[test]
    fn categories_used_counts_uncategorized_once() {
        assert_eq!(ReportService::categories_used(&sample()), 3);
    }

    #[test]
    fn income_vs_expense_has_twelve_buckets() {
        let buckets = ReportService::income_vs_expense(&sample(), 2024);
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].label, "Jan");
        assert_eq!(buckets[0].income, 1000.0);
        assert_eq!(buckets[1].expense, 70.0);
        assert_eq!(buckets[11].expense, 0.0);
    }

    #[test]
    fn spending_trend_sums_per_day_in_order() {
        let trend = ReportService::spending_trend(&sample());
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].date, date(2024, 1, 2));
        assert_eq!(trend[0].amount, 600.0);
    }

    #[test]
    fn dashboard_uses_current_month() {
        let board = ReportService::dashboard(&sample(), date(2024, 2, 20), 2);
        assert_eq!(board.monthly.total_expense, 70.0);
        assert_eq!(board.monthly.total_income, 0.0);
        assert_eq!(board.recent.len(), 2);
        assert_eq!(board.recent[0].date, date(2024, 2, 11));
    }
}
