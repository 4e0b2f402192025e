use std::{env, path::PathBuf};

/// Same-origin deployments sit behind `/api`; the standalone default matches
/// the local backend port.
pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub session_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let api_base = env::var("VOTE_API_URL")
            .map(|value| normalize_base(&value))
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        Self {
            api_base,
            session_path: resolve_session_path(),
        }
    }
}

fn resolve_session_path() -> PathBuf {
    if let Ok(path) = env::var("VOTE_SESSION_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/session.json")
}

fn normalize_base(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}
