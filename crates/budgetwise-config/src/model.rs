use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Stores user-configurable preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_currency_precision")]
    pub currency_precision: u8,
    #[serde(default = "Config::default_session_ttl_hours")]
    pub session_ttl_hours: u32,
    #[serde(default = "Config::default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "Config::default_true")]
    pub seed_default_categories: bool,
    #[serde(default = "Config::default_true")]
    pub ui_color_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for user data. Defaults to the base directory.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            currency_precision: Self::default_currency_precision(),
            session_ttl_hours: Self::default_session_ttl_hours(),
            recent_limit: Self::default_recent_limit(),
            seed_default_categories: true,
            ui_color_enabled: true,
            data_root: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 8] = [
        "locale",
        "currency",
        "currency_precision",
        "session_ttl_hours",
        "recent_limit",
        "seed_default_categories",
        "ui_color_enabled",
        "data_root",
    ];

    pub fn default_currency_precision() -> u8 {
        2
    }

    pub fn default_session_ttl_hours() -> u32 {
        24
    }

    /// Ten years.
    pub const MAX_SESSION_TTL_HOURS: u32 = 8760 * 10;

    /// Clamps values that may have been hand-edited into the stored file.
    pub fn normalized(mut self) -> Self {
        self.session_ttl_hours = self
            .session_ttl_hours
            .clamp(1, Self::MAX_SESSION_TTL_HOURS);
        if self.recent_limit == 0 {
            self.recent_limit = Self::default_recent_limit();
        }
        self
    }

    pub fn default_recent_limit() -> usize {
        5
    }

    fn default_true() -> bool {
        true
    }

    pub fn resolve_data_root(&self, base: &std::path::Path) -> PathBuf {
        match &self.data_root {
            Some(path) => path.clone(),
            None => base.join("data"),
        }
    }

    /// Key/value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        Self::KEYS
            .iter()
            .map(|key| (*key, self.get(key).unwrap_or_default()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "locale" => self.locale.clone(),
            "currency" => self.currency.clone(),
            "currency_precision" => self.currency_precision.to_string(),
            "session_ttl_hours" => self.session_ttl_hours.to_string(),
            "recent_limit" => self.recent_limit.to_string(),
            "seed_default_categories" => self.seed_default_categories.to_string(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "data_root" => self
                .data_root
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "(default)".into()),
            _ => return None,
        };
        Some(value)
    }

    /// Parses `value` into the field named by `key`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "locale" => self.locale = non_empty(key, value)?,
            "currency" => self.currency = non_empty(key, value)?.to_ascii_uppercase(),
            "currency_precision" => {
                let precision: u8 = parse(key, value)?;
                if precision > 6 {
                    return Err(invalid(key, value, "must be between 0 and 6"));
                }
                self.currency_precision = precision;
            }
            "session_ttl_hours" => {
                let hours: u32 = parse(key, value)?;
                if hours == 0 || hours > Self::MAX_SESSION_TTL_HOURS {
                    return Err(invalid(
                        key,
                        value,
                        &format!("must be between 1 and {}", Self::MAX_SESSION_TTL_HOURS),
                    ));
                }
                self.session_ttl_hours = hours;
            }
            "recent_limit" => {
                let limit: usize = parse(key, value)?;
                if limit == 0 {
                    return Err(invalid(key, value, "must be at least 1"));
                }
                self.recent_limit = limit;
            }
            "seed_default_categories" => self.seed_default_categories = parse_bool(key, value)?,
            "ui_color_enabled" => self.ui_color_enabled = parse_bool(key, value)?,
            "data_root" => {
                self.data_root = match value {
                    "" | "default" | "none" => None,
                    path => Some(PathBuf::from(path)),
                }
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        Err(invalid(key, value, "must not be empty"))
    } else {
        Ok(value.to_string())
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(key, value, "expected a whole number"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}
