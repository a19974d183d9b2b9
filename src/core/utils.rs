use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".expense_ledger";
const DATA_DIR: &str = "data";
const CONFIG_FILE: &str = "config.json";

pub const HOME_ENV: &str = "EXPENSE_LEDGER_HOME";
pub const APP_ID_ENV: &str = "EXPENSE_LEDGER_APP_ID";

/// Returns the application-specific directory, defaulting to `~/.expense_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding snapshot slots under `base`.
pub fn data_dir_in(base: &std::path::Path) -> PathBuf {
    base.join(DATA_DIR)
}

pub fn config_file_in(base: &std::path::Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// Rate service credential from the environment, if set and non-blank.
pub fn app_id_from_env() -> Option<String> {
    env::var(APP_ID_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
