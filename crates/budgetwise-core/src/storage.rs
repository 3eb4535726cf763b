use std::{collections::HashSet, path::PathBuf};

use uuid::Uuid;

use budgetwise_domain::{Book, Session, UserDirectory};

use crate::CoreError;

/// Describes a persisted backup artifact for a user's book.
#[derive(Debug, Clone)]
pub struct BookBackupInfo {
    pub user_id: Uuid,
    pub id: String,
    pub created_at: String,
    pub note: Option<String>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing users, books, sessions and backups.
pub trait FinanceStorage: Send + Sync {
    fn load_users(&self) -> Result<UserDirectory, CoreError>;
    fn save_users(&self, directory: &UserDirectory) -> Result<(), CoreError>;
    /// Returns an empty book when none has been saved for `user_id`.
    fn load_book(&self, user_id: Uuid) -> Result<Book, CoreError>;
    fn save_book(&self, book: &Book) -> Result<(), CoreError>;
    fn load_session(&self) -> Result<Option<Session>, CoreError>;
    fn save_session(&self, session: &Session) -> Result<(), CoreError>;
    fn clear_session(&self) -> Result<(), CoreError>;
    fn backup_book(&self, book: &Book, note: Option<&str>) -> Result<BookBackupInfo, CoreError>;
    /// Newest first.
    fn list_backups(&self, user_id: Uuid) -> Result<Vec<BookBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &BookBackupInfo) -> Result<Book, CoreError>;
}

/// Detects dangling references within a book snapshot.
pub fn book_warnings(book: &Book) -> Vec<String> {
    let category_ids: HashSet<_> = book.categories.iter().map(|c| c.id).collect();
    let mut warnings = Vec::new();

    for txn in &book.transactions {
        if let Some(category) = txn.category_id {
            if !category_ids.contains(&category) {
                warnings.push(format!(
                    "transaction {} references missing category {}",
                    txn.id, category
                ));
            }
        }
    }
    for budget in &book.budgets {
        if !category_ids.contains(&budget.category_id) {
            warnings.push(format!(
                "budget {} references missing category {}",
                budget.id, budget.category_id
            ));
        }
    }
    warnings
}
