use std::env;
use std::path::PathBuf;

use crate::formation::Formation;

const DATA_DIR: &str = "squad_planner";
const DB_FILE: &str = "squad.sqlite";
const LOG_FILE: &str = "squad_planner.log";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_file: PathBuf,
    pub export_dir: PathBuf,
    pub formation: Formation,
}

impl AppConfig {
    /// Read `SQUAD_*` variables. Call `load_dotenv` first so `.env` files
    /// are taken into account.
    pub fn from_env() -> Self {
        let db_path = env_path("SQUAD_DB_PATH")
            .or_else(default_db_path)
            .unwrap_or_else(|| PathBuf::from(DB_FILE));
        let log_file = env_path("SQUAD_LOG_FILE").unwrap_or_else(|| {
            db_path
                .parent()
                .map(|dir| dir.join(LOG_FILE))
                .unwrap_or_else(|| PathBuf::from(LOG_FILE))
        });
        let export_dir = env_path("SQUAD_EXPORT_DIR").unwrap_or_else(|| PathBuf::from("."));
        let formation = env::var("SQUAD_FORMATION")
            .map(|raw| Formation::parse(&raw))
            .unwrap_or_default();
        Self {
            db_path,
            log_file,
            export_dir,
            formation,
        }
    }

    pub fn with_db_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.db_path = path;
        }
        self
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn default_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(DB_FILE))
}

fn data_dir() -> Option<PathBuf> {
    // Prefer XDG data.
    if let Some(base) = env_path("XDG_DATA_HOME") {
        return Some(base.join(DATA_DIR));
    }
    let home = env_path("HOME")?;
    Some(home.join(".local").join("share").join(DATA_DIR))
}

fn env_path(key: &str) -> Option<PathBuf> {
    let raw = env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

/// `--db <path>` or `--db=<path>`.
pub fn parse_db_path_arg(args: &[String]) -> Option<PathBuf> {
    parse_value_arg(args, "--db").map(PathBuf::from)
}

/// Value of `--name value` or `--name=value`, ignoring blank values.
pub fn parse_value_arg(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}
