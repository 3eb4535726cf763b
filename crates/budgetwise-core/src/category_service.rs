use tracing::info;
use uuid::Uuid;

use budgetwise_domain::{Book, Category, CategoryKind};

use crate::{CoreError, ServiceResult};

pub struct CategoryService;

impl CategoryService {
    pub fn list(book: &Book) -> Vec<&Category> {
        book.categories.iter().collect()
    }

    pub fn by_kind(book: &Book, kind: CategoryKind) -> Vec<&Category> {
        book.categories
            .iter()
            .filter(|category| category.kind == kind)
            .collect()
    }

    pub fn add(book: &mut Book, name: &str, kind: CategoryKind) -> ServiceResult<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Category name is required".into()));
        }
        Self::validate_name(book, kind, name)?;
        Ok(book.add_category(Category::new(name, kind)))
    }

    pub fn remove(book: &mut Book, id: Uuid) -> ServiceResult<Category> {
        let category = book
            .category(id)
            .ok_or_else(|| CoreError::NotFound("Category not found".into()))?;
        if category.is_others() {
            return Err(CoreError::Validation(
                "The Others category cannot be removed".into(),
            ));
        }
        if book
            .transactions
            .iter()
            .any(|txn| txn.category_id == Some(id))
        {
            return Err(CoreError::Validation(
                "Category has linked transactions".into(),
            ));
        }
        if book.budgets.iter().any(|budget| budget.category_id == id) {
            return Err(CoreError::Validation("Category has linked budgets".into()));
        }
        let index = book
            .categories
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| CoreError::NotFound("Category not found".into()))?;
        let removed = book.categories.remove(index);
        book.touch();
        Ok(removed)
    }

    /// Seeds the default income and expense categories once per book.
    /// Returns how many were created.
    pub fn seed_defaults(book: &mut Book) -> usize {
        if book.defaults_seeded || !book.categories.is_empty() {
            return 0;
        }
        book.defaults_seeded = true;
        let mut created = 0;
        for kind in CategoryKind::all() {
            for name in kind.defaults() {
                if Self::validate_name(book, kind, name).is_ok() {
                    book.add_category(Category::seeded(*name, kind));
                    created += 1;
                }
            }
        }
        book.touch();
        info!(user_id = %book.user_id, created, "seeded default categories");
        created
    }

    pub fn others_id(book: &Book, kind: CategoryKind) -> Option<Uuid> {
        book.categories
            .iter()
            .find(|category| category.kind == kind && category.is_others())
            .map(|category| category.id)
    }

    /// Finds a category by case-insensitive name or by a unique id prefix.
    pub fn resolve<'a>(
        book: &'a Book,
        token: &str,
        kind: Option<CategoryKind>,
    ) -> ServiceResult<&'a Category> {
        let needle = token.trim().to_ascii_lowercase();
        let candidates = || {
            book.categories
                .iter()
                .filter(move |category| kind.map_or(true, |kind| category.kind == kind))
        };
        if let Some(found) =
            candidates().find(|category| category.name.trim().to_ascii_lowercase() == needle)
        {
            return Ok(found);
        }
        if needle.len() >= 4 {
            let mut matches =
                candidates().filter(|category| category.id.to_string().starts_with(&needle));
            if let (Some(found), None) = (matches.next(), matches.next()) {
                return Ok(found);
            }
        }
        Err(CoreError::NotFound(format!("Category `{}` not found", token.trim())))
    }

    fn validate_name(book: &Book, kind: CategoryKind, candidate: &str) -> ServiceResult<()> {
        let normalized = candidate.trim().to_ascii_lowercase();
        let duplicate = book.categories.iter().any(|category| {
            category.kind == kind && category.name.trim().to_ascii_lowercase() == normalized
        });
        if duplicate {
            Err(CoreError::Duplicate(format!(
                "Category `{}` already exists",
                candidate
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetwise_domain::{
        Budget, Transaction, TransactionKind, DEFAULT_EXPENSE_CATEGORIES,
        DEFAULT_INCOME_CATEGORIES,
    };
    use chrono::{NaiveDate, Utc};

    fn book() -> Book {
        Book::new(Uuid::new_v4())
    }

    #[test]
    fn seeding_happens_once() {
        let mut book = book();
        let created = CategoryService::seed_defaults(&mut book);
        assert_eq!(
            created,
            DEFAULT_INCOME_CATEGORIES.len() + DEFAULT_EXPENSE_CATEGORIES.len()
        );
        assert!(book.defaults_seeded);
        assert_eq!(CategoryService::seed_defaults(&mut book), 0);
        assert_eq!(book.categories.len(), created);
    }

    #[test]
    fn seeding_skips_books_that_already_have_categories() {
        let mut book = book();
        CategoryService::add(&mut book, "Rent", CategoryKind::Expense).unwrap();
        assert_eq!(CategoryService::seed_defaults(&mut book), 0);
        assert_eq!(book.categories.len(), 1);
    }

    #[test]
    fn same_name_is_allowed_across_kinds() {
        let mut book = book();
        CategoryService::add(&mut book, "Gifts", CategoryKind::Income).unwrap();
        CategoryService::add(&mut book, "gifts", CategoryKind::Expense).unwrap();
        let err = CategoryService::add(&mut book, " GIFTS ", CategoryKind::Expense)
            .expect_err("duplicate within kind");
        assert!(matches!(err, CoreError::Duplicate(_)));
    }

    #[test]
    fn others_is_protected() {
        let mut book = book();
        CategoryService::seed_defaults(&mut book);
        let others = CategoryService::others_id(&book, CategoryKind::Expense).unwrap();
        let err = CategoryService::remove(&mut book, others).expect_err("protected");
        assert!(err.to_string().contains("Others"));
    }

    #[test]
    fn linked_categories_cannot_be_removed() {
        let mut book = book();
        let rent = CategoryService::add(&mut book, "Rent", CategoryKind::Expense).unwrap();
        let travel = CategoryService::add(&mut book, "Travel", CategoryKind::Expense).unwrap();
        let spare = CategoryService::add(&mut book, "Spare", CategoryKind::Expense).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        book.add_transaction(Transaction::new(
            TransactionKind::Expense,
            900.0,
            Some(rent),
            date,
            Utc::now(),
        ));
        book.add_budget(Budget::new(travel, 2, 2024, 300.0, Utc::now()));

        let err = CategoryService::remove(&mut book, rent).expect_err("has transactions");
        assert_eq!(
            err.to_string(),
            "Validation failed: Category has linked transactions"
        );
        let err = CategoryService::remove(&mut book, travel).expect_err("has budgets");
        assert_eq!(err.to_string(), "Validation failed: Category has linked budgets");
        assert_eq!(book.categories.len(), 3);

        let removed = CategoryService::remove(&mut book, spare).unwrap();
        assert_eq!(removed.name, "Spare");
        assert!(matches!(
            CategoryService::remove(&mut book, spare),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn resolve_matches_name_then_id_prefix() {
        let mut book = book();
        let id = CategoryService::add(&mut book, "Travel", CategoryKind::Expense).unwrap();
        assert_eq!(
            CategoryService::resolve(&book, "travel", None).unwrap().id,
            id
        );
        let prefix = &id.to_string()[..8];
        assert_eq!(
            CategoryService::resolve(&book, prefix, Some(CategoryKind::Expense))
                .unwrap()
                .id,
            id
        );
        assert!(CategoryService::resolve(&book, "travel", Some(CategoryKind::Income)).is_err());
    }
}
