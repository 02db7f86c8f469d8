use std::path::PathBuf;

pub const DEFAULT_STORE_PATH: &str = "tasks.json";
pub const DEFAULT_LOG_PATH: &str = "daytrack.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: PathBuf,
    pub log_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self { store_path: DEFAULT_STORE_PATH.into(), log_path: DEFAULT_LOG_PATH.into() }
    }
}

impl Config {
    /// Reads `DAYTRACK_STORE` and `DAYTRACK_LOG`, after loading a `.env` file if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| -> PathBuf {
            lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string()).into()
        };
        Self { store_path: get("DAYTRACK_STORE", DEFAULT_STORE_PATH), log_path: get("DAYTRACK_LOG", DEFAULT_LOG_PATH) }
    }
}
