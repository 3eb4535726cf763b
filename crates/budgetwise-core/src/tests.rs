use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    storage::{BookBackupInfo, FinanceStorage},
    time::{Clock, FixedClock},
    ApiSettings, CoreError, FinanceApi,
};
use budgetwise_domain::{
    Book, CategoryKind, MonthKey, Session, TransactionDraft, TransactionKind, UserDirectory,
};

#[derive(Default)]
struct MemoryStorage {
    users: Mutex<UserDirectory>,
    books: Mutex<HashMap<Uuid, Book>>,
    session: Mutex<Option<Session>>,
    backups: Mutex<Vec<(BookBackupInfo, Book)>>,
}

impl FinanceStorage for MemoryStorage {
    fn load_users(&self) -> Result<UserDirectory, CoreError> {
        Ok(self.users.lock().unwrap().clone())
    }

    fn save_users(&self, directory: &UserDirectory) -> Result<(), CoreError> {
        *self.users.lock().unwrap() = directory.clone();
        Ok(())
    }

    fn load_book(&self, user_id: Uuid) -> Result<Book, CoreError> {
        Ok(self
            .books
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Book::new(user_id)))
    }

    fn save_book(&self, book: &Book) -> Result<(), CoreError> {
        self.books.lock().unwrap().insert(book.user_id, book.clone());
        Ok(())
    }

    fn load_session(&self) -> Result<Option<Session>, CoreError> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn save_session(&self, session: &Session) -> Result<(), CoreError> {
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> Result<(), CoreError> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    fn backup_book(&self, book: &Book, note: Option<&str>) -> Result<BookBackupInfo, CoreError> {
        let mut backups = self.backups.lock().unwrap();
        let id = format!("{}_{}{}", book.user_id, backups.len(), note.unwrap_or_default());
        let info = BookBackupInfo {
            user_id: book.user_id,
            id: id.clone(),
            created_at: String::new(),
            note: note.map(str::to_string),
            size_bytes: 0,
            path: PathBuf::from(id),
        };
        backups.push((info.clone(), book.clone()));
        Ok(info)
    }

    fn list_backups(&self, user_id: Uuid) -> Result<Vec<BookBackupInfo>, CoreError> {
        Ok(self
            .backups
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(info, _)| info.user_id == user_id)
            .map(|(info, _)| info.clone())
            .collect())
    }

    fn restore_backup(&self, backup: &BookBackupInfo) -> Result<Book, CoreError> {
        self.backups
            .lock()
            .unwrap()
            .iter()
            .find(|(info, _)| info.id == backup.id)
            .map(|(_, book)| book.clone())
            .ok_or_else(|| CoreError::NotFound(backup.id.clone()))
    }
}

struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

fn api() -> (FinanceApi, Arc<TestClock>) {
    let clock = Arc::new(TestClock(Mutex::new(
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
    )));
    let api = FinanceApi::new(
        Arc::new(MemoryStorage::default()),
        clock.clone(),
        ApiSettings::default(),
    );
    (api, clock)
}

fn logged_in() -> (FinanceApi, Arc<TestClock>) {
    let (api, clock) = api();
    api.register("Grace Hopper", "grace@example.com", "cobol1")
        .expect("register");
    api.login("grace@example.com", "cobol1").expect("login");
    (api, clock)
}

#[test]
fn data_operations_require_login() {
    let (api, _) = api();
    let err = api.transactions(None).expect_err("no session");
    assert!(err.is_unauthorized());
}

#[test]
fn login_seeds_default_categories_once() {
    let (api, _) = logged_in();
    let seeded = api.categories(None).unwrap().len();
    assert!(seeded > 0);
    api.logout().unwrap();
    api.login("GRACE@example.com", "cobol1").unwrap();
    assert_eq!(api.categories(None).unwrap().len(), seeded);
    assert_eq!(api.seed_categories().unwrap(), 0);
}

#[test]
fn expired_session_is_cleared() {
    let (api, clock) = logged_in();
    clock.advance(Duration::hours(25));
    let err = api.current_user().expect_err("expired");
    assert!(err.is_unauthorized());
    assert!(api.session().unwrap().is_none());
}

#[test]
fn users_do_not_see_each_other_data() {
    let (api, _) = logged_in();
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    api.add_transaction(TransactionDraft::new(TransactionKind::Income, 50.0, date))
        .unwrap();
    api.register("Alan Turing", "alan@example.com", "enigma1")
        .unwrap();
    api.login("alan@example.com", "enigma1").unwrap();
    assert!(api.transactions(None).unwrap().is_empty());
}

#[test]
fn budget_flow_through_api() {
    let (api, _) = logged_in();
    let food = api
        .resolve_category("food & dining", Some(CategoryKind::Expense))
        .unwrap();
    api.set_budget(food.id, 3, 2024, 200.0).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    api.add_transaction(
        TransactionDraft::new(TransactionKind::Expense, 50.0, date).category(food.id),
    )
    .unwrap();

    let status = api.budget_status(food.id, 3, 2024).unwrap();
    assert_eq!(status.actual_spent, 50.0);
    assert_eq!(status.percent_used, 25.0);
    assert_eq!(api.current_budgets().unwrap().len(), 1);

    let budget_id = api.budgets().unwrap()[0].id.to_string();
    let edited = api
        .update_budget(&budget_id, |patch| patch.amount = 40.0)
        .unwrap();
    assert_eq!(edited.amount, 40.0);
    let period = MonthKey::new(2024, 3).unwrap();
    assert_eq!(api.month_transactions(period, None).unwrap().len(), 1);
    assert!(api.budget_overview(3, 2024).unwrap()[0].remaining_amount < 0.0);
}

#[test]
fn restore_brings_back_previous_book() {
    let (api, _) = logged_in();
    let backup = api.backup(Some("clean")).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    api.add_transaction(TransactionDraft::new(TransactionKind::Expense, 9.0, date))
        .unwrap();
    assert_eq!(api.transactions(None).unwrap().len(), 1);
    api.restore(&backup.id).unwrap();
    assert!(api.transactions(None).unwrap().is_empty());
}

#[test]
fn dashboard_reports_the_clock_month() {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 7, 4, 9, 0, 0).unwrap());
    let api = FinanceApi::new(
        Arc::new(MemoryStorage::default()),
        Arc::new(clock),
        ApiSettings::default(),
    );
    api.register("Ada Lovelace", "ada@example.com", "engine1")
        .unwrap();
    api.login("ada@example.com", "engine1").unwrap();
    for (day, kind, amount) in [
        (1, TransactionKind::Income, 1000.0),
        (2, TransactionKind::Expense, 250.0),
    ] {
        let date = NaiveDate::from_ymd_opt(2024, 7, day).unwrap();
        api.add_transaction(TransactionDraft::new(kind, amount, date))
            .unwrap();
    }
    api.add_transaction(TransactionDraft::new(
        TransactionKind::Expense,
        50.0,
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
    ))
    .unwrap();

    let dashboard = api.dashboard().unwrap();
    assert_eq!(dashboard.month, MonthKey::new(2024, 7).unwrap());
    assert_eq!(dashboard.monthly.total_expense, 250.0);
    assert_eq!(dashboard.totals.total_expense, 300.0);
    assert_eq!(dashboard.savings_rate, 70.0);
    assert_eq!(dashboard.recent[0].date, NaiveDate::from_ymd_opt(2024, 7, 2).unwrap());
}

#[test]
fn restore_rejects_a_book_owned_by_someone_else() {
    let storage = Arc::new(MemoryStorage::default());
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()));
    let api = FinanceApi::new(storage.clone(), clock, ApiSettings::default());
    api.register("Grace Hopper", "grace@example.com", "cobol1")
        .unwrap();
    let alan = api
        .register("Alan Turing", "alan@example.com", "enigma1")
        .unwrap();
    let grace = api.login("grace@example.com", "cobol1").unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    api.add_transaction(TransactionDraft::new(TransactionKind::Income, 75.0, date))
        .unwrap();

    let foreign = BookBackupInfo {
        user_id: grace.id,
        id: "foreign.json".into(),
        created_at: String::new(),
        note: None,
        size_bytes: 0,
        path: PathBuf::from("foreign.json"),
    };
    storage
        .backups
        .lock()
        .unwrap()
        .push((foreign, Book::new(alan.id)));

    let err = api.restore("foreign.json").expect_err("other user's book");
    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(api.transactions(None).unwrap().len(), 1);
    assert!(storage.books.lock().unwrap().get(&alan.id).is_none());
}
