//! Domain types representing income and expense categories.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the catch-all category seeded for both kinds. It cannot be removed.
pub const OTHERS_CATEGORY_NAME: &str = "Others";

/// Income categories seeded for a brand-new user.
pub const DEFAULT_INCOME_CATEGORIES: &[&str] = &[
    "Salary",
    "Freelance",
    "Business",
    "Investment",
    "Gift",
    "Bonus",
    OTHERS_CATEGORY_NAME,
];

/// Expense categories seeded for a brand-new user.
pub const DEFAULT_EXPENSE_CATEGORIES: &[&str] = &[
    "Food & Dining",
    "Transport",
    "Housing & Rent",
    "Utilities",
    "Healthcare",
    "Education",
    "Entertainment",
    "Shopping",
    "Savings",
    OTHERS_CATEGORY_NAME,
];

/// Groups transactions for budgeting and reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    #[serde(default)]
    pub is_default: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            is_default: false,
        }
    }

    pub fn seeded(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            is_default: true,
            ..Self::new(name, kind)
        }
    }

    pub fn is_others(&self) -> bool {
        self.name.trim().eq_ignore_ascii_case(OTHERS_CATEGORY_NAME)
    }
}

/// Supported category types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn all() -> [CategoryKind; 2] {
        [CategoryKind::Income, CategoryKind::Expense]
    }

    pub fn defaults(self) -> &'static [&'static str] {
        match self {
            CategoryKind::Income => DEFAULT_INCOME_CATEGORIES,
            CategoryKind::Expense => DEFAULT_EXPENSE_CATEGORIES,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        };
        f.write_str(label)
    }
}

/// Error returned when a kind label is neither `income` nor `expense`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown kind `{}` (expected income or expense)", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for CategoryKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            _ => Err(UnknownKind(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("INCOME".parse::<CategoryKind>(), Ok(CategoryKind::Income));
        assert_eq!(" expense ".parse::<CategoryKind>(), Ok(CategoryKind::Expense));
        assert!("transfer".parse::<CategoryKind>().is_err());
    }

    #[test]
    fn kind_serializes_uppercase() {
        let json = serde_json::to_string(&CategoryKind::Expense).unwrap();
        assert_eq!(json, "\"EXPENSE\"");
    }

    #[test]
    fn defaults_end_with_others() {
        for kind in CategoryKind::all() {
            assert_eq!(kind.defaults().last(), Some(&OTHERS_CATEGORY_NAME));
        }
        assert!(Category::seeded("others", CategoryKind::Income).is_others());
    }
}
