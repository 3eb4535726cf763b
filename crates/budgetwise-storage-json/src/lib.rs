use std::{
    cmp::Reverse,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use budgetwise_core::{
    storage::{BookBackupInfo, FinanceStorage},
    Clock, CoreError, SystemClock,
};
use budgetwise_domain::{Book, Session, UserDirectory};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

const JSON_EXTENSION: &str = "json";
const BACKUP_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const BACKUP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TMP_SUFFIX: &str = "tmp";
const AUTO_SNAPSHOT_NOTE: &str = "auto";
const DEFAULT_RETENTION: usize = 5;
const MAX_BACKUPS_PER_SECOND: u32 = 99;

/// Filesystem-backed JSON persistence for users, books, the session and backups.
///
/// Layout under the data root:
///
/// ```text
/// users.json
/// session.json
/// books/<user-id>.json
/// backups/<user-id>/<user-id>_<YYYYmmdd>_<HHMMSS>[-n][_note].json
/// ```
///
/// Backup files are never overwritten. A second backup within the same second
/// gets a `-2`, `-3`, ... suffix on its time segment.
#[derive(Clone)]
pub struct JsonFinanceStorage {
    root: PathBuf,
    books_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    clock: Arc<dyn Clock>,
}

impl JsonFinanceStorage {
    pub fn new(root: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(root, DEFAULT_RETENTION)
    }

    pub fn with_retention(root: PathBuf, retention: usize) -> Result<Self, CoreError> {
        let books_dir = root.join("books");
        let backups_dir = root.join("backups");
        fs::create_dir_all(&books_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            root,
            books_dir,
            backups_dir,
            retention: retention.max(1),
            clock: Arc::new(SystemClock),
        })
    }

    /// Stamps backup names with `clock` instead of the system time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn users_path(&self) -> PathBuf {
        self.root.join(format!("users.{JSON_EXTENSION}"))
    }

    pub fn session_path(&self) -> PathBuf {
        self.root.join(format!("session.{JSON_EXTENSION}"))
    }

    pub fn book_path(&self, user_id: Uuid) -> PathBuf {
        self.books_dir.join(format!("{user_id}.{JSON_EXTENSION}"))
    }

    fn backup_dir(&self, user_id: Uuid) -> PathBuf {
        self.backups_dir.join(user_id.to_string())
    }

    /// Writes `data` under the first free backup name for the current second.
    fn write_backup(
        &self,
        user_id: Uuid,
        note: Option<&str>,
        data: &str,
    ) -> Result<BookBackupInfo, CoreError> {
        let dir = self.backup_dir(user_id);
        fs::create_dir_all(&dir)?;
        let now = self.clock.now();
        let stamp = now.format(BACKUP_STAMP_FORMAT).to_string();
        let label = sanitize_backup_note(note);
        for sequence in 1..=MAX_BACKUPS_PER_SECOND {
            let file_name = backup_file_name(user_id, &stamp, sequence, label.as_deref());
            let path = dir.join(&file_name);
            match write_new(&path, data) {
                Ok(()) => {
                    return Ok(BookBackupInfo {
                        user_id,
                        id: file_name,
                        created_at: now.format(BACKUP_DISPLAY_FORMAT).to_string(),
                        note: label,
                        size_bytes: data.len() as u64,
                        path,
                    })
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(CoreError::Storage(format!(
            "too many backups created at {stamp}"
        )))
    }

    fn backup_existing_file(&self, user_id: Uuid, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let previous = fs::read_to_string(path)?;
        let info = self.write_backup(user_id, Some(AUTO_SNAPSHOT_NOTE), &previous)?;
        debug!(%user_id, backup = %info.id, "snapshotted book before save");
        self.prune_backups(user_id)
    }

    /// Keeps the newest `retention` automatic snapshots and the newest `retention` manual backups.
    fn prune_backups(&self, user_id: Uuid) -> Result<(), CoreError> {
        let entries = self.list_backups(user_id)?;
        let (auto, manual): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|info| info.note.as_deref() == Some(AUTO_SNAPSHOT_NOTE));
        for entry in auto
            .into_iter()
            .skip(self.retention)
            .chain(manual.into_iter().skip(self.retention))
        {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl FinanceStorage for JsonFinanceStorage {
    fn load_users(&self) -> Result<UserDirectory, CoreError> {
        Ok(load_optional(&self.users_path())?.unwrap_or_default())
    }

    fn save_users(&self, directory: &UserDirectory) -> Result<(), CoreError> {
        save_json(&self.users_path(), directory)
    }

    fn load_book(&self, user_id: Uuid) -> Result<Book, CoreError> {
        Ok(load_optional(&self.book_path(user_id))?.unwrap_or_else(|| Book::new(user_id)))
    }

    fn save_book(&self, book: &Book) -> Result<(), CoreError> {
        let path = self.book_path(book.user_id);
        self.backup_existing_file(book.user_id, &path)?;
        save_json(&path, book)
    }

    fn load_session(&self) -> Result<Option<Session>, CoreError> {
        load_optional(&self.session_path())
    }

    fn save_session(&self, session: &Session) -> Result<(), CoreError> {
        save_json(&self.session_path(), session)
    }

    fn clear_session(&self) -> Result<(), CoreError> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn backup_book(&self, book: &Book, note: Option<&str>) -> Result<BookBackupInfo, CoreError> {
        let info = self.write_backup(book.user_id, note, &serde_json::to_string_pretty(book)?)?;
        self.prune_backups(book.user_id)?;
        info!(user_id = %book.user_id, backup = %info.id, "created backup");
        Ok(info)
    }

    fn list_backups(&self, user_id: Uuid) -> Result<Vec<BookBackupInfo>, CoreError> {
        let dir = self.backup_dir(user_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JSON_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let metadata = entry.metadata()?;
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            let parsed = BackupName::parse(file_name);
            let timestamp = parsed.as_ref().and_then(BackupName::timestamp);
            let sequence = parsed.as_ref().map_or(1, |name| name.sequence);
            entries.push((
                (timestamp, sequence, modified),
                BookBackupInfo {
                    user_id,
                    id: file_name.to_string(),
                    created_at: timestamp
                        .map(|ts| ts.format(BACKUP_DISPLAY_FORMAT).to_string())
                        .unwrap_or_default(),
                    note: parsed.and_then(|name| name.note.map(str::to_string)),
                    size_bytes: metadata.len(),
                    path: path.clone(),
                },
            ));
        }
        entries.sort_by_key(|(key, info)| Reverse((*key, info.id.clone())));
        Ok(entries.into_iter().map(|(_, info)| info).collect())
    }

    fn restore_backup(&self, backup: &BookBackupInfo) -> Result<Book, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        load_json(&backup.path)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn load_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CoreError> {
    if path.exists() {
        load_json(path).map(Some)
    } else {
        Ok(None)
    }
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn backup_file_name(user_id: Uuid, stamp: &str, sequence: u32, note: Option<&str>) -> String {
    let mut stem = format!("{user_id}_{stamp}");
    if sequence > 1 {
        stem.push_str(&format!("-{sequence}"));
    }
    if let Some(label) = note {
        stem.push('_');
        stem.push_str(label);
    }
    format!("{stem}.{JSON_EXTENSION}")
}

/// The segments of `<user-id>_<date>_<time>[-n][_note].json`.
#[derive(Debug, PartialEq)]
struct BackupName<'a> {
    date: &'a str,
    time: &'a str,
    sequence: u32,
    note: Option<&'a str>,
}

impl<'a> BackupName<'a> {
    fn parse(name: &'a str) -> Option<Self> {
        let trimmed = name.strip_suffix(&format!(".{JSON_EXTENSION}"))?;
        let mut segments = trimmed.splitn(4, '_');
        let _user = segments.next()?;
        let date = segments.next().filter(|date| is_digits(date, 8))?;
        let time_segment = segments.next()?;
        let (time, sequence) = match time_segment.split_once('-') {
            Some((time, sequence)) => (time, sequence.parse().ok()?),
            None => (time_segment, 1),
        };
        // Older names stop at the minute.
        if !(is_digits(time, 6) || is_digits(time, 4)) {
            return None;
        }
        Some(Self {
            date,
            time,
            sequence,
            note: segments.next(),
        })
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        let format = if self.time.len() == 6 {
            "%Y%m%d%H%M%S"
        } else {
            "%Y%m%d%H%M"
        };
        NaiveDateTime::parse_from_str(&format!("{}{}", self.date, self.time), format)
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// Fails with `AlreadyExists` instead of replacing `path`.
fn write_new(path: &Path, data: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()
}
