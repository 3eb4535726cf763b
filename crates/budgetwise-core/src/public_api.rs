//! Stable, public-facing entry point that wraps the service layer.
//!
//! [`FinanceApi`] authenticates the persisted session before every data
//! operation, loads the caller's book, applies a service call and saves the
//! book again when it changed. Frontends (the shell, tests) talk to this
//! type instead of wiring services and storage themselves.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use budgetwise_domain::{
    Book, Budget, BudgetPatch, BudgetStatusReport, Category, CategoryKind, MonthKey, Session,
    Transaction, TransactionDraft, TransactionKind, TransactionPatch, User,
};

use crate::{
    auth_service::AuthService,
    budget_service::BudgetService,
    category_service::CategoryService,
    report_service::{CategoryTotal, Dashboard, MonthBucket, ReportService, Totals, TrendPoint},
    storage::{book_warnings, BookBackupInfo, FinanceStorage},
    time::Clock,
    transaction_service::{TransactionService, DEFAULT_RECENT_LIMIT},
    CoreError, ServiceResult,
};

/// Behaviour knobs supplied by the application configuration.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub session_ttl: Duration,
    pub seed_default_categories: bool,
    pub recent_limit: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(24),
            seed_default_categories: true,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

pub struct FinanceApi {
    storage: Arc<dyn FinanceStorage>,
    clock: Arc<dyn Clock>,
    settings: ApiSettings,
}

impl FinanceApi {
    pub fn new(
        storage: Arc<dyn FinanceStorage>,
        clock: Arc<dyn Clock>,
        settings: ApiSettings,
    ) -> Self {
        Self {
            storage,
            clock,
            settings,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // ----- auth -----

    pub fn register(&self, full_name: &str, email: &str, password: &str) -> ServiceResult<User> {
        let mut directory = self.storage.load_users()?;
        let user =
            AuthService::register(&mut directory, full_name, email, password, self.clock.now())?;
        self.storage.save_users(&directory)?;
        Ok(user)
    }

    /// Verifies credentials, persists a new session and seeds default categories when due.
    pub fn login(&self, email: &str, password: &str) -> ServiceResult<User> {
        let directory = self.storage.load_users()?;
        let (user, session) = AuthService::login(
            &directory,
            email,
            password,
            self.clock.now(),
            self.settings.session_ttl,
        )?;
        self.storage.save_session(&session)?;
        if self.settings.seed_default_categories {
            let mut book = self.storage.load_book(user.id)?;
            if CategoryService::seed_defaults(&mut book) > 0 {
                self.storage.save_book(&book)?;
            }
        }
        Ok(user)
    }

    /// Clears the persisted session. Returns whether one existed.
    pub fn logout(&self) -> ServiceResult<bool> {
        let existed = self.storage.load_session()?.is_some();
        self.storage.clear_session()?;
        if existed {
            info!("session cleared");
        }
        Ok(existed)
    }

    pub fn current_user(&self) -> ServiceResult<User> {
        self.authenticated()
    }

    pub fn session(&self) -> ServiceResult<Option<Session>> {
        self.storage.load_session()
    }

    fn authenticated(&self) -> ServiceResult<User> {
        let directory = self.storage.load_users()?;
        let session = self.storage.load_session()?;
        match AuthService::authenticate(&directory, session.as_ref(), self.clock.now()) {
            Ok(user) => Ok(user.clone()),
            Err(err) => {
                if err.is_unauthorized() && session.is_some() {
                    warn!("discarding invalid session");
                    self.storage.clear_session()?;
                }
                Err(err)
            }
        }
    }

    fn read_book<T>(&self, read: impl FnOnce(&Book) -> ServiceResult<T>) -> ServiceResult<T> {
        let user = self.authenticated()?;
        let book = self.storage.load_book(user.id)?;
        read(&book)
    }

    fn write_book<T>(
        &self,
        write: impl FnOnce(&mut Book) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let user = self.authenticated()?;
        let mut book = self.storage.load_book(user.id)?;
        let result = write(&mut book)?;
        self.storage.save_book(&book)?;
        Ok(result)
    }

    // ----- categories -----

    pub fn categories(&self, kind: Option<CategoryKind>) -> ServiceResult<Vec<Category>> {
        self.read_book(|book| {
            let found = match kind {
                Some(kind) => CategoryService::by_kind(book, kind),
                None => CategoryService::list(book),
            };
            Ok(found.into_iter().cloned().collect())
        })
    }

    pub fn add_category(&self, name: &str, kind: CategoryKind) -> ServiceResult<Category> {
        self.write_book(|book| {
            let id = CategoryService::add(book, name, kind)?;
            book.category(id)
                .cloned()
                .ok_or_else(|| CoreError::NotFound("Category not found".into()))
        })
    }

    pub fn remove_category(&self, token: &str) -> ServiceResult<Category> {
        self.write_book(|book| {
            let id = CategoryService::resolve(book, token, None)?.id;
            CategoryService::remove(book, id)
        })
    }

    /// Seeds default categories for the current user. Returns how many were created.
    pub fn seed_categories(&self) -> ServiceResult<usize> {
        self.write_book(|book| Ok(CategoryService::seed_defaults(book)))
    }

    pub fn resolve_category(
        &self,
        token: &str,
        kind: Option<CategoryKind>,
    ) -> ServiceResult<Category> {
        self.read_book(|book| CategoryService::resolve(book, token, kind).cloned())
    }

    // ----- transactions -----

    pub fn add_transaction(&self, draft: TransactionDraft) -> ServiceResult<Transaction> {
        let now = self.clock.now();
        self.write_book(|book| {
            let id = TransactionService::add(book, draft, now)?;
            book.transaction(id)
                .cloned()
                .ok_or_else(|| CoreError::NotFound("Transaction not found".into()))
        })
    }

    pub fn update_transaction(
        &self,
        token: &str,
        patch: TransactionPatch,
    ) -> ServiceResult<Transaction> {
        let now = self.clock.now();
        self.write_book(|book| {
            let id = TransactionService::resolve(book, token)?.id;
            TransactionService::update(book, id, patch, now)?;
            book.transaction(id)
                .cloned()
                .ok_or_else(|| CoreError::NotFound("Transaction not found".into()))
        })
    }

    pub fn remove_transaction(&self, token: &str) -> ServiceResult<Transaction> {
        self.write_book(|book| {
            let id = TransactionService::resolve(book, token)?.id;
            TransactionService::remove(book, id)
        })
    }

    pub fn transactions(&self, kind: Option<TransactionKind>) -> ServiceResult<Vec<Transaction>> {
        self.read_book(|book| {
            let found = match kind {
                Some(kind) => TransactionService::by_kind(book, kind),
                None => TransactionService::list(book),
            };
            Ok(found.into_iter().cloned().collect())
        })
    }

    pub fn recent_transactions(&self, limit: Option<usize>) -> ServiceResult<Vec<Transaction>> {
        let limit = limit.unwrap_or(self.settings.recent_limit);
        self.read_book(|book| {
            Ok(TransactionService::recent(book, limit)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    pub fn month_transactions(
        &self,
        period: MonthKey,
        kind: Option<TransactionKind>,
    ) -> ServiceResult<Vec<Transaction>> {
        self.read_book(|book| {
            Ok(TransactionService::by_month(book, period, kind)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    // ----- budgets -----

    pub fn set_budget(
        &self,
        category_id: Uuid,
        month: u32,
        year: i32,
        amount: f64,
    ) -> ServiceResult<Budget> {
        let now = self.clock.now();
        self.write_book(|book| {
            let id = BudgetService::set_budget(book, category_id, month, year, amount, now)?;
            book.budget(id)
                .cloned()
                .ok_or_else(|| CoreError::NotFound("Budget not found".into()))
        })
    }

    /// Edits a budget through `mutator`, which starts from the stored values.
    pub fn update_budget<F>(&self, token: &str, mutator: F) -> ServiceResult<Budget>
    where
        F: FnOnce(&mut BudgetPatch),
    {
        let now = self.clock.now();
        self.write_book(|book| {
            let budget = BudgetService::resolve(book, token)?;
            let id = budget.id;
            let mut patch = BudgetPatch::from_budget(budget);
            mutator(&mut patch);
            BudgetService::update(book, id, patch, now)?;
            book.budget(id)
                .cloned()
                .ok_or_else(|| CoreError::NotFound("Budget not found".into()))
        })
    }

    pub fn remove_budget(&self, token: &str) -> ServiceResult<Budget> {
        self.write_book(|book| {
            let id = BudgetService::resolve(book, token)?.id;
            BudgetService::remove(book, id)
        })
    }

    pub fn budgets(&self) -> ServiceResult<Vec<Budget>> {
        self.read_book(|book| Ok(BudgetService::list(book).into_iter().cloned().collect()))
    }

    pub fn current_budgets(&self) -> ServiceResult<Vec<Budget>> {
        let today = self.clock.today();
        self.read_book(|book| {
            Ok(BudgetService::current_month_budgets(book, today)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    pub fn budget_status(
        &self,
        category_id: Uuid,
        month: u32,
        year: i32,
    ) -> ServiceResult<BudgetStatusReport> {
        self.read_book(|book| BudgetService::status(book, category_id, month, year))
    }

    pub fn budget_overview(&self, month: u32, year: i32) -> ServiceResult<Vec<BudgetStatusReport>> {
        self.read_book(|book| Ok(BudgetService::month_overview(book, month, year)))
    }

    // ----- reports -----

    pub fn totals(&self) -> ServiceResult<Totals> {
        self.read_book(|book| Ok(ReportService::totals(book)))
    }

    pub fn expense_breakdown(&self) -> ServiceResult<Vec<CategoryTotal>> {
        self.read_book(|book| Ok(ReportService::expense_breakdown(book)))
    }

    pub fn spending_trend(&self) -> ServiceResult<Vec<TrendPoint>> {
        self.read_book(|book| Ok(ReportService::spending_trend(book)))
    }

    pub fn income_vs_expense(&self, year: i32) -> ServiceResult<Vec<MonthBucket>> {
        self.read_book(|book| Ok(ReportService::income_vs_expense(book, year)))
    }

    pub fn categories_used(&self) -> ServiceResult<usize> {
        self.read_book(|book| Ok(ReportService::categories_used(book)))
    }

    pub fn dashboard(&self) -> ServiceResult<Dashboard> {
        let today = self.clock.today();
        let limit = self.settings.recent_limit;
        self.read_book(|book| Ok(ReportService::dashboard(book, today, limit)))
    }

    // ----- backups -----

    pub fn backup(&self, note: Option<&str>) -> ServiceResult<BookBackupInfo> {
        self.read_book(|book| self.storage.backup_book(book, note))
    }

    pub fn backups(&self) -> ServiceResult<Vec<BookBackupInfo>> {
        let user = self.authenticated()?;
        self.storage.list_backups(user.id)
    }

    /// Restores the backup whose id starts with `name`. The current book is snapshotted first.
    pub fn restore(&self, name: &str) -> ServiceResult<BookBackupInfo> {
        let user = self.authenticated()?;
        let needle = name.trim();
        let backups = self.storage.list_backups(user.id)?;
        let info = match backups.iter().find(|info| info.id == needle) {
            Some(info) => info.clone(),
            None => {
                let mut matches = backups
                    .iter()
                    .filter(|info| !needle.is_empty() && info.id.starts_with(needle));
                match (matches.next(), matches.next()) {
                    (Some(info), None) => info.clone(),
                    (Some(_), Some(_)) => {
                        return Err(CoreError::Validation(format!(
                            "Backup name `{needle}` is ambiguous"
                        )))
                    }
                    _ => return Err(CoreError::NotFound(format!("Backup `{needle}` not found"))),
                }
            }
        };
        let restored = self.storage.restore_backup(&info)?;
        if restored.user_id != user.id {
            return Err(CoreError::Validation(
                "Backup belongs to a different user".into(),
            ));
        }
        for warning in book_warnings(&restored) {
            warn!(%warning, "restored book");
        }
        self.storage.save_book(&restored)?;
        info!(user_id = %user.id, backup = %info.id, "restored backup");
        Ok(info)
    }
}
