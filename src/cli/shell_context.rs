use std::{path::PathBuf, sync::Arc};

use budgetwise_config::{Config, ConfigManager};
use budgetwise_core::{ApiSettings, Clock, FinanceApi, SystemClock};
use budgetwise_storage_json::JsonFinanceStorage;
use chrono::Duration;
use dialoguer::theme::ColorfulTheme;
use tracing::debug;

use crate::core::{
    errors::{BudgetError, CliError},
    utils::{ensure_dir, PathResolver},
};

use super::{
    commands,
    formatters::CliFormatters,
    output::{self, OutputPreferences},
    registry::CommandRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub api: FinanceApi,
    pub theme: ColorfulTheme,
    pub base_dir: PathBuf,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub formatters: CliFormatters,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, PathResolver::base_dir())
    }

    /// Builds a context whose config and data live under `base`.
    pub fn with_base_dir(mode: CliMode, base: PathBuf) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        ensure_dir(&base).map_err(BudgetError::from)?;
        let config_manager =
            ConfigManager::with_base_dir(base.clone()).map_err(BudgetError::from)?;
        let config = config_manager.load().map_err(BudgetError::from)?;
        let api = build_api(&base, &config)?;
        apply_output_preferences(&config, mode);
        debug!(base = %base.display(), "shell context ready");

        Ok(ShellContext {
            mode,
            registry,
            api,
            theme: ColorfulTheme::default(),
            formatters: CliFormatters::new(&config),
            base_dir: base,
            config_manager,
            config,
            running: true,
        })
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn can_prompt(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    /// Re-applies the in-memory config to formatters, output and the API.
    pub fn apply_config(&mut self) -> Result<(), CliError> {
        self.formatters = CliFormatters::new(&self.config);
        apply_output_preferences(&self.config, self.mode);
        self.api = build_api(&self.base_dir, &self.config)?;
        Ok(())
    }

    pub fn prompt(&self) -> String {
        match self.api.session().ok().flatten() {
            Some(session) => format!("budgetwise({})> ", session.email),
            None => "budgetwise> ".to_string(),
        }
    }
}

pub(crate) fn api_settings(config: &Config) -> ApiSettings {
    ApiSettings {
        session_ttl: Duration::hours(i64::from(config.session_ttl_hours)),
        seed_default_categories: config.seed_default_categories,
        recent_limit: config.recent_limit,
    }
}

fn build_api(base: &std::path::Path, config: &Config) -> Result<FinanceApi, CliError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let storage = JsonFinanceStorage::new(config.resolve_data_root(base))
        .map_err(BudgetError::from)?
        .with_clock(Arc::clone(&clock));
    Ok(FinanceApi::new(Arc::new(storage), clock, api_settings(config)))
}

/// Script mode always prints plain text.
fn apply_output_preferences(config: &Config, mode: CliMode) {
    output::set_preferences(OutputPreferences {
        color_enabled: config.ui_color_enabled && mode == CliMode::Interactive,
    });
}
