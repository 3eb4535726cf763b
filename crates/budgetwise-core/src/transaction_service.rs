//! Business logic helpers for managing transactions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use budgetwise_domain::{
    Book, MonthKey, Transaction, TransactionDraft, TransactionKind, TransactionPatch,
};

use crate::{CoreError, ServiceResult};

pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Provides validated CRUD helpers for book transactions.
pub struct TransactionService;

impl TransactionService {
    /// Validates `draft` and adds it to the top of the list, returning its identifier.
    pub fn add(book: &mut Book, draft: TransactionDraft, now: DateTime<Utc>) -> ServiceResult<Uuid> {
        validate_amount(draft.amount)?;
        validate_category(book, draft.category_id, draft.kind)?;
        let mut transaction =
            Transaction::new(draft.kind, draft.amount, draft.category_id, draft.date, now);
        transaction.note = non_blank(draft.note);
        transaction.payment_method = non_blank(draft.payment_method);
        Ok(book.add_transaction(transaction))
    }

    /// Applies the fields present in `patch`. A zero amount keeps the stored amount.
    pub fn update(
        book: &mut Book,
        id: Uuid,
        patch: TransactionPatch,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        let kind = book
            .transaction(id)
            .map(|txn| txn.kind)
            .ok_or_else(|| CoreError::NotFound("Transaction not found".into()))?;
        if let Some(amount) = patch.amount.filter(|amount| *amount != 0.0) {
            validate_amount(amount)?;
        }
        if patch.category_id.is_some() {
            validate_category(book, patch.category_id, kind)?;
        }

        let txn = book
            .transaction_mut(id)
            .ok_or_else(|| CoreError::NotFound("Transaction not found".into()))?;
        if let Some(amount) = patch.amount.filter(|amount| *amount != 0.0) {
            txn.amount = amount;
        }
        if let Some(category_id) = patch.category_id {
            txn.category_id = Some(category_id);
        }
        if let Some(date) = patch.date {
            txn.date = date;
        }
        if let Some(note) = patch.note {
            txn.note = non_blank(Some(note));
        }
        if let Some(method) = patch.payment_method {
            txn.payment_method = non_blank(Some(method));
        }
        txn.updated_at = Some(now);
        book.touch();
        Ok(())
    }

    /// Removes the transaction identified by `id`, returning the removed instance.
    pub fn remove(book: &mut Book, id: Uuid) -> ServiceResult<Transaction> {
        book.remove_transaction(id)
            .ok_or_else(|| CoreError::NotFound("Transaction not found".into()))
    }

    pub fn list(book: &Book) -> Vec<&Transaction> {
        book.transactions.iter().collect()
    }

    pub fn by_kind(book: &Book, kind: TransactionKind) -> Vec<&Transaction> {
        book.transactions
            .iter()
            .filter(|txn| txn.kind == kind)
            .collect()
    }

    pub fn by_month(
        book: &Book,
        period: MonthKey,
        kind: Option<TransactionKind>,
    ) -> Vec<&Transaction> {
        book.transactions
            .iter()
            .filter(|txn| period.contains(txn.date))
            .filter(|txn| kind.map_or(true, |kind| txn.kind == kind))
            .collect()
    }

    /// The `limit` most recent transactions by date, newest first.
    pub fn recent(book: &Book, limit: usize) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = book.transactions.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted.truncate(limit);
        sorted
    }

    /// Finds a transaction by full id or unique id prefix.
    pub fn resolve<'a>(book: &'a Book, token: &str) -> ServiceResult<&'a Transaction> {
        let needle = token.trim().to_ascii_lowercase();
        if needle.len() >= 4 {
            let mut matches = book
                .transactions
                .iter()
                .filter(|txn| txn.id.to_string().starts_with(&needle));
            if let (Some(found), None) = (matches.next(), matches.next()) {
                return Ok(found);
            }
        }
        Err(CoreError::NotFound(format!(
            "Transaction `{}` not found",
            token.trim()
        )))
    }
}

fn validate_amount(amount: f64) -> ServiceResult<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Validation("Amount must be greater than zero".into()))
    }
}

fn validate_category(
    book: &Book,
    category_id: Option<Uuid>,
    kind: TransactionKind,
) -> ServiceResult<()> {
    let Some(id) = category_id else {
        return Ok(());
    };
    let category = book
        .category(id)
        .ok_or_else(|| CoreError::NotFound("Category not found".into()))?;
    if category.kind != kind.category_kind() {
        return Err(CoreError::Validation(format!(
            "Category `{}` is not an {} category",
            category.name, kind
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetwise_domain::{Category, CategoryKind};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn book_with_categories() -> (Book, Uuid, Uuid) {
        let mut book = Book::new(Uuid::new_v4());
        let salary = book.add_category(Category::new("Salary", CategoryKind::Income));
        let food = book.add_category(Category::new("Food", CategoryKind::Expense));
        (book, salary, food)
    }

    #[test]
    fn add_rejects_non_positive_amounts() {
        let (mut book, _, _) = book_with_categories();
        let draft = TransactionDraft::new(TransactionKind::Expense, 0.0, date(2024, 1, 1));
        let err = TransactionService::add(&mut book, draft, Utc::now()).expect_err("zero");
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn add_rejects_category_of_other_kind() {
        let (mut book, salary, _) = book_with_categories();
        let draft =
            TransactionDraft::new(TransactionKind::Expense, 10.0, date(2024, 1, 1)).category(salary);
        let err = TransactionService::add(&mut book, draft, Utc::now()).expect_err("mismatch");
        assert!(err.to_string().contains("Salary"));
    }

    #[test]
    fn update_keeps_amount_when_zero() {
        let (mut book, _, food) = book_with_categories();
        let draft =
            TransactionDraft::new(TransactionKind::Expense, 25.0, date(2024, 1, 1)).category(food);
        let id = TransactionService::add(&mut book, draft, Utc::now()).unwrap();
        let patch = TransactionPatch {
            amount: Some(0.0),
            note: Some("lunch".into()),
            ..TransactionPatch::default()
        };
        TransactionService::update(&mut book, id, patch, Utc::now()).unwrap();
        let stored = book.transaction(id).unwrap();
        assert_eq!(stored.amount, 25.0);
        assert_eq!(stored.note.as_deref(), Some("lunch"));
        assert!(stored.updated_at.is_some());
    }

    #[test]
    fn update_revalidates_the_category() {
        let (mut book, salary, food) = book_with_categories();
        let draft =
            TransactionDraft::new(TransactionKind::Expense, 25.0, date(2024, 1, 1)).category(food);
        let id = TransactionService::add(&mut book, draft, Utc::now()).unwrap();

        let wrong_kind = TransactionPatch {
            category_id: Some(salary),
            ..TransactionPatch::default()
        };
        let err = TransactionService::update(&mut book, id, wrong_kind, Utc::now())
            .expect_err("income category on an expense");
        assert!(matches!(err, CoreError::Validation(_)));

        let unknown = TransactionPatch {
            category_id: Some(Uuid::new_v4()),
            amount: Some(99.0),
            ..TransactionPatch::default()
        };
        assert!(matches!(
            TransactionService::update(&mut book, id, unknown, Utc::now()),
            Err(CoreError::NotFound(_))
        ));

        let stored = book.transaction(id).unwrap();
        assert_eq!(stored.category_id, Some(food));
        assert_eq!(stored.amount, 25.0);
        assert!(stored.updated_at.is_none());
    }

    #[test]
    fn remove_unknown_is_not_found() {
        let (mut book, _, _) = book_with_categories();
        let err = TransactionService::remove(&mut book, Uuid::new_v4()).expect_err("missing");
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn recent_sorts_by_date_descending() {
        let (mut book, _, _) = book_with_categories();
        for day in [3, 1, 7, 5] {
            let draft = TransactionDraft::new(TransactionKind::Income, 1.0, date(2024, 2, day));
            TransactionService::add(&mut book, draft, Utc::now()).unwrap();
        }
        let recent = TransactionService::recent(&book, 2);
        let days: Vec<_> = recent.iter().map(|txn| txn.date).collect();
        assert_eq!(days, vec![date(2024, 2, 7), date(2024, 2, 5)]);
    }

    #[test]
    fn by_month_filters_year_month_and_kind() {
        let (mut book, _, _) = book_with_categories();
        for (kind, when) in [
            (TransactionKind::Income, date(2024, 3, 1)),
            (TransactionKind::Expense, date(2024, 3, 9)),
            (TransactionKind::Expense, date(2023, 3, 9)),
        ] {
            TransactionService::add(&mut book, TransactionDraft::new(kind, 5.0, when), Utc::now())
                .unwrap();
        }
        let march = MonthKey::new(2024, 3).unwrap();
        assert_eq!(TransactionService::by_month(&book, march, None).len(), 2);
        assert_eq!(
            TransactionService::by_month(&book, march, Some(TransactionKind::Expense)).len(),
            1
        );
    }
}
