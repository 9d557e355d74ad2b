use gm_api::client::DEFAULT_SERVER;
use log::LevelFilter;
use std::path::PathBuf;

pub const SERVER_ENV: &str = "GMTUI_SERVER";
pub const API_KEY_ENV: &str = "GMTUI_API_KEY";
pub const LOG_ENV: &str = "GMTUI_LOG";
pub const MAIN_PROMPT_ENV: &str = "GMTUI_MAIN_PROMPT";
pub const SUB_PROMPT_ENV: &str = "GMTUI_SUB_PROMPT";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub server_url: String,
    /// Pre-fills the key screen; still validated against the server.
    pub api_key: Option<String>,
    pub main_prompt: String,
    pub sub_prompt: String,
    /// Overrides the XDG lookup for the tactics file.
    pub config_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            server_url: DEFAULT_SERVER.to_string(),
            api_key: None,
            main_prompt: String::new(),
            sub_prompt: String::new(),
            config_dir: None,
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            log_level: non_empty(LOG_ENV).and_then(|v| parse_level(&v)),
            server_url: non_empty(SERVER_ENV).unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            api_key: non_empty(API_KEY_ENV),
            main_prompt: non_empty(MAIN_PROMPT_ENV).unwrap_or_default(),
            sub_prompt: non_empty(SUB_PROMPT_ENV).unwrap_or_default(),
            ..Self::default()
        }
    }
}

pub fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn environment_overrides_defaults() {
        let env: HashMap<&str, &str> = HashMap::from([
            (SERVER_ENV, " http://gm.local:9000 "),
            (API_KEY_ENV, "AIzaPrefilledKey1234"),
            (LOG_ENV, "Debug"),
            (SUB_PROMPT_ENV, "   "),
        ]);
        let settings = AppSettings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.server_url, "http://gm.local:9000");
        assert_eq!(settings.api_key.as_deref(), Some("AIzaPrefilledKey1234"));
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
        assert!(settings.sub_prompt.is_empty());
        assert!(!settings.full_screen);
    }

    #[test]
    fn missing_environment_uses_local_server() {
        let settings = AppSettings::from_lookup(|_| None);
        assert_eq!(settings.server_url, DEFAULT_SERVER);
        assert_eq!(settings.log_level, None);
        assert_eq!(parse_level("verbose"), None);
    }
}
