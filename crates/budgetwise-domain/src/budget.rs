//! Monthly spending limits attached to expense categories.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::MonthKey;

/// A spending limit for one category in one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub category_id: Uuid,
    pub month: u32,
    pub year: i32,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Budget {
    pub fn new(
        category_id: Uuid,
        month: u32,
        year: i32,
        amount: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            month,
            year,
            amount,
            created_at,
            updated_at: None,
        }
    }

    pub fn period(&self) -> MonthKey {
        MonthKey {
            year: self.year,
            month: self.month,
        }
    }

    pub fn matches(&self, category_id: Uuid, month: u32, year: i32) -> bool {
        self.category_id == category_id && self.month == month && self.year == year
    }
}

/// Changes applied by a budget edit. Amount, month and year are always replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetPatch {
    pub amount: f64,
    pub month: u32,
    pub year: i32,
    pub category_id: Option<Uuid>,
}

impl BudgetPatch {
    pub fn from_budget(budget: &Budget) -> Self {
        Self {
            amount: budget.amount,
            month: budget.month,
            year: budget.year,
            category_id: None,
        }
    }
}

/// Whether spending stayed within the budgeted amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetState {
    UnderBudget,
    OverBudget,
}

impl BudgetState {
    pub fn from_remaining(remaining: f64) -> Self {
        if remaining >= 0.0 {
            BudgetState::UnderBudget
        } else {
            BudgetState::OverBudget
        }
    }
}

impl fmt::Display for BudgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetState::UnderBudget => "Under Budget",
            BudgetState::OverBudget => "Over Budget",
        };
        f.write_str(label)
    }
}

/// Budget compared against actual spending for one category and month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetStatusReport {
    pub budget_id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub month: u32,
    pub year: i32,
    pub budget_amount: f64,
    pub actual_spent: f64,
    pub remaining_amount: f64,
    pub percent_used: f64,
    pub status: BudgetState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_treats_zero_remaining_as_under_budget() {
        assert_eq!(BudgetState::from_remaining(0.0), BudgetState::UnderBudget);
        assert_eq!(BudgetState::from_remaining(-0.01), BudgetState::OverBudget);
    }

    #[test]
    fn state_serializes_like_status_strings() {
        let json = serde_json::to_string(&BudgetState::OverBudget).unwrap();
        assert_eq!(json, "\"OVER_BUDGET\"");
    }
}
