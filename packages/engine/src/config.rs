use recap_algo::{DEFAULT_CHOICE_CAP, DEFAULT_OPEN_ENDED_CAP};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub db_path: String,
    pub choice_cap: usize,
    pub open_ended_cap: usize,
    pub log_level: String,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let db_path =
            std::env::var("RECAP_DB_PATH").unwrap_or_else(|_| "./data/recap.db".to_string());

        let choice_cap = std::env::var("RECAP_CHOICE_CAP")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CHOICE_CAP);

        let open_ended_cap = std::env::var("RECAP_OPEN_ENDED_CAP")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(DEFAULT_OPEN_ENDED_CAP);

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            db_path,
            choice_cap,
            open_ended_cap,
            log_level,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: "./data/recap.db".to_string(),
            choice_cap: DEFAULT_CHOICE_CAP,
            open_ended_cap: DEFAULT_OPEN_ENDED_CAP,
            log_level: "info".to_string(),
        }
    }
}
