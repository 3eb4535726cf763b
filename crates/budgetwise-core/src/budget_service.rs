//! Monthly per-category budgets and spend-vs-budget status.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use budgetwise_domain::{
    is_valid_month, Book, Budget, BudgetPatch, BudgetState, BudgetStatusReport, CategoryKind,
    MonthKey,
};

use crate::{CoreError, ServiceResult};

pub struct BudgetService;

impl BudgetService {
    /// Inserts or updates the budget for (category, month, year).
    pub fn set_budget(
        book: &mut Book,
        category_id: Uuid,
        month: u32,
        year: i32,
        amount: f64,
        now: DateTime<Utc>,
    ) -> ServiceResult<Uuid> {
        validate_amount(amount)?;
        validate_month(month)?;
        validate_category(book, category_id)?;

        if let Some(existing) = book
            .budgets
            .iter_mut()
            .find(|budget| budget.matches(category_id, month, year))
        {
            existing.amount = amount;
            existing.updated_at = Some(now);
            let id = existing.id;
            book.touch();
            return Ok(id);
        }
        Ok(book.add_budget(Budget::new(category_id, month, year, amount, now)))
    }

    pub fn update(
        book: &mut Book,
        id: Uuid,
        patch: BudgetPatch,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        validate_amount(patch.amount)?;
        validate_month(patch.month)?;
        let current_category = book
            .budget(id)
            .map(|budget| budget.category_id)
            .ok_or_else(|| CoreError::NotFound("Budget not found".into()))?;
        let category_id = patch.category_id.unwrap_or(current_category);
        validate_category(book, category_id)?;
        if book.budgets.iter().any(|budget| {
            budget.id != id && budget.matches(category_id, patch.month, patch.year)
        }) {
            return Err(CoreError::Validation(
                "A budget already exists for this category and period".into(),
            ));
        }

        let budget = book
            .budget_mut(id)
            .ok_or_else(|| CoreError::NotFound("Budget not found".into()))?;
        budget.amount = patch.amount;
        budget.month = patch.month;
        budget.year = patch.year;
        budget.category_id = category_id;
        budget.updated_at = Some(now);
        book.touch();
        Ok(())
    }

    pub fn remove(book: &mut Book, id: Uuid) -> ServiceResult<Budget> {
        let index = book
            .budgets
            .iter()
            .position(|budget| budget.id == id)
            .ok_or_else(|| CoreError::NotFound("Budget not found".into()))?;
        let removed = book.budgets.remove(index);
        book.touch();
        Ok(removed)
    }

    pub fn list(book: &Book) -> Vec<&Budget> {
        book.budgets.iter().collect()
    }

    /// Finds a budget by full id or unique id prefix.
    pub fn resolve<'a>(book: &'a Book, token: &str) -> ServiceResult<&'a Budget> {
        let needle = token.trim().to_ascii_lowercase();
        if needle.len() >= 4 {
            let mut matches = book
                .budgets
                .iter()
                .filter(|budget| budget.id.to_string().starts_with(&needle));
            if let (Some(found), None) = (matches.next(), matches.next()) {
                return Ok(found);
            }
        }
        Err(CoreError::NotFound(format!("Budget `{}` not found", token.trim())))
    }

    pub fn budget_for(book: &Book, category_id: Uuid, month: u32, year: i32) -> Option<&Budget> {
        book.budgets
            .iter()
            .find(|budget| budget.matches(category_id, month, year))
    }

    /// Sum of expenses in `category_id` dated within the month.
    pub fn spent(book: &Book, category_id: Uuid, month: u32, year: i32) -> f64 {
        let period = MonthKey { year, month };
        book.transactions
            .iter()
            .filter(|txn| txn.is_expense())
            .filter(|txn| txn.category_id == Some(category_id))
            .filter(|txn| period.contains(txn.date))
            .map(|txn| txn.amount)
            .sum()
    }

    /// `amount - spent`, or zero when no budget exists.
    pub fn remaining(book: &Book, category_id: Uuid, month: u32, year: i32) -> f64 {
        match Self::budget_for(book, category_id, month, year) {
            Some(budget) => budget.amount - Self::spent(book, category_id, month, year),
            None => 0.0,
        }
    }

    pub fn is_over_budget(book: &Book, category_id: Uuid, month: u32, year: i32) -> bool {
        Self::remaining(book, category_id, month, year) < 0.0
    }

    /// Share of the budget spent, capped at 100.
    pub fn spending_percentage(book: &Book, category_id: Uuid, month: u32, year: i32) -> f64 {
        match Self::budget_for(book, category_id, month, year) {
            Some(budget) if budget.amount > 0.0 => {
                let spent = Self::spent(book, category_id, month, year);
                (spent / budget.amount * 100.0).min(100.0)
            }
            _ => 0.0,
        }
    }

    pub fn current_month_budgets(book: &Book, today: NaiveDate) -> Vec<&Budget> {
        let period = MonthKey::of(today);
        book.budgets
            .iter()
            .filter(|budget| budget.period() == period)
            .collect()
    }

    pub fn status(
        book: &Book,
        category_id: Uuid,
        month: u32,
        year: i32,
    ) -> ServiceResult<BudgetStatusReport> {
        let budget = Self::budget_for(book, category_id, month, year)
            .ok_or_else(|| CoreError::NotFound("Budget not found for this period".into()))?;
        Ok(Self::report_for(book, budget))
    }

    /// Status of every budget in the month, ordered by category name.
    pub fn month_overview(book: &Book, month: u32, year: i32) -> Vec<BudgetStatusReport> {
        let period = MonthKey { year, month };
        let mut reports: Vec<_> = book
            .budgets
            .iter()
            .filter(|budget| budget.period() == period)
            .map(|budget| Self::report_for(book, budget))
            .collect();
        reports.sort_by(|a, b| {
            a.category_name
                .to_lowercase()
                .cmp(&b.category_name.to_lowercase())
        });
        reports
    }

    fn report_for(book: &Book, budget: &Budget) -> BudgetStatusReport {
        let spent = Self::spent(book, budget.category_id, budget.month, budget.year);
        let remaining = budget.amount - spent;
        BudgetStatusReport {
            budget_id: budget.id,
            category_id: budget.category_id,
            category_name: book
                .category_name(Some(budget.category_id))
                .unwrap_or("Unknown")
                .to_string(),
            month: budget.month,
            year: budget.year,
            budget_amount: budget.amount,
            actual_spent: spent,
            remaining_amount: remaining,
            percent_used: Self::spending_percentage(
                book,
                budget.category_id,
                budget.month,
                budget.year,
            ),
            status: BudgetState::from_remaining(remaining),
        }
    }
}

fn validate_amount(amount: f64) -> ServiceResult<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "Budget amount must be greater than zero".into(),
        ))
    }
}

fn validate_month(month: u32) -> ServiceResult<()> {
    if is_valid_month(month) {
        Ok(())
    } else {
        Err(CoreError::Validation("Month must be between 1 and 12".into()))
    }
}

fn validate_category(book: &Book, category_id: Uuid) -> ServiceResult<()> {
    let category = book
        .category(category_id)
        .ok_or_else(|| CoreError::NotFound("Category not found".into()))?;
    if category.kind != CategoryKind::Expense {
        return Err(CoreError::Validation(format!(
            "Budgets can only be set on expense categories, `{}` is income",
            category.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetwise_domain::{Category, Transaction, TransactionKind};

    fn setup() -> (Book, Uuid) {
        let mut book = Book::new(Uuid::new_v4());
        let food = book.add_category(Category::new("Food", CategoryKind::Expense));
        (book, food)
    }

    fn spend(book: &mut Book, category: Uuid, amount: f64, y: i32, m: u32, d: u32) {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        book.add_transaction(Transaction::new(
            TransactionKind::Expense,
            amount,
            Some(category),
            date,
            Utc::now(),
        ));
    }

    #[test]
    fn set_budget_upserts_by_period() {
        let (mut book, food) = setup();
        let first = BudgetService::set_budget(&mut book, food, 4, 2024, 100.0, Utc::now()).unwrap();
        let second =
            BudgetService::set_budget(&mut book, food, 4, 2024, 150.0, Utc::now()).unwrap();
        assert_eq!(first, second);
        assert_eq!(book.budgets.len(), 1);
        assert_eq!(book.budgets[0].amount, 150.0);
    }

    #[test]
    fn set_budget_rejects_invalid_input() {
        let (mut book, food) = setup();
        let salary = book.add_category(Category::new("Salary", CategoryKind::Income));
        assert!(BudgetService::set_budget(&mut book, food, 13, 2024, 10.0, Utc::now()).is_err());
        assert!(BudgetService::set_budget(&mut book, food, 1, 2024, 0.0, Utc::now()).is_err());
        assert!(BudgetService::set_budget(&mut book, salary, 1, 2024, 10.0, Utc::now()).is_err());
    }

    #[test]
    fn spent_only_counts_matching_month_and_category() {
        let (mut book, food) = setup();
        let other = book.add_category(Category::new("Fun", CategoryKind::Expense));
        spend(&mut book, food, 40.0, 2024, 4, 2);
        spend(&mut book, food, 10.0, 2024, 4, 30);
        spend(&mut book, food, 99.0, 2024, 5, 1);
        spend(&mut book, other, 7.0, 2024, 4, 3);
        assert_eq!(BudgetService::spent(&book, food, 4, 2024), 50.0);
    }

    #[test]
    fn status_reports_over_budget_and_caps_percentage() {
        let (mut book, food) = setup();
        BudgetService::set_budget(&mut book, food, 4, 2024, 100.0, Utc::now()).unwrap();
        spend(&mut book, food, 130.0, 2024, 4, 2);
        let report = BudgetService::status(&book, food, 4, 2024).unwrap();
        assert_eq!(report.status, BudgetState::OverBudget);
        assert_eq!(report.remaining_amount, -30.0);
        assert_eq!(report.percent_used, 100.0);
        assert!(BudgetService::is_over_budget(&book, food, 4, 2024));
    }

    #[test]
    fn missing_budget_yields_zeroes_and_not_found_status() {
        let (book, food) = setup();
        assert_eq!(BudgetService::remaining(&book, food, 1, 2024), 0.0);
        assert_eq!(BudgetService::spending_percentage(&book, food, 1, 2024), 0.0);
        let err = BudgetService::status(&book, food, 1, 2024).expect_err("missing");
        assert_eq!(err.to_string(), "Budget not found for this period");
    }

    #[test]
    fn update_rejects_collision_with_existing_period() {
        let (mut book, food) = setup();
        BudgetService::set_budget(&mut book, food, 1, 2024, 10.0, Utc::now()).unwrap();
        let feb = BudgetService::set_budget(&mut book, food, 2, 2024, 10.0, Utc::now()).unwrap();
        let patch = BudgetPatch {
            month: 1,
            ..BudgetPatch::from_budget(book.budget(feb).unwrap())
        };
        let err = BudgetService::update(&mut book, feb, patch, Utc::now()).expect_err("collide");
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn overview_sorts_by_category_name() {
        let (mut book, food) = setup();
        let bills = book.add_category(Category::new("Bills", CategoryKind::Expense));
        BudgetService::set_budget(&mut book, food, 6, 2024, 10.0, Utc::now()).unwrap();
        BudgetService::set_budget(&mut book, bills, 6, 2024, 10.0, Utc::now()).unwrap();
        let names: Vec<_> = BudgetService::month_overview(&book, 6, 2024)
            .into_iter()
            .map(|report| report.category_name)
            .collect();
        assert_eq!(names, vec!["Bills", "Food"]);
    }
}
