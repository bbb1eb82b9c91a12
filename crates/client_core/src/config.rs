use std::{collections::HashMap, fs, path::Path, time::Duration};

use crate::state::DEFAULT_ITEMS_PER_PAGE;

pub const DEFAULT_SETTINGS_FILE: &str = "shop.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSettings {
    pub store_url: String,
    pub items_per_page: usize,
    pub request_timeout_secs: u64,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            store_url: "http://localhost:3000".into(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            request_timeout_secs: 10,
        }
    }
}

impl ShopSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn load_settings() -> ShopSettings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE))
}

/// Defaults, then the flat TOML table at `path` if it exists, then the
/// process environment. Unparseable or zero numbers are ignored.
pub fn load_settings_from(path: &Path) -> ShopSettings {
    let mut settings = ShopSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut ShopSettings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        return;
    };

    if let Some(v) = file_cfg.get("store_url").and_then(toml::Value::as_str) {
        settings.store_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("items_per_page").and_then(positive_number) {
        settings.items_per_page = usize::try_from(v).unwrap_or(usize::MAX);
    }
    if let Some(v) = file_cfg.get("request_timeout_secs").and_then(positive_number) {
        settings.request_timeout_secs = v;
    }
}

fn positive_number(value: &toml::Value) -> Option<u64> {
    let parsed = match value {
        toml::Value::Integer(n) => u64::try_from(*n).ok(),
        toml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|n| *n > 0)
}

fn apply_env(settings: &mut ShopSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("STORE_URL") {
        settings.store_url = v;
    }
    if let Some(v) = var("APP__STORE_URL") {
        settings.store_url = v;
    }

    if let Some(v) = var("APP__ITEMS_PER_PAGE") {
        if let Some(parsed) = v.trim().parse::<usize>().ok().filter(|n| *n > 0) {
            settings.items_per_page = parsed;
        }
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Some(parsed) = v.trim().parse::<u64>().ok().filter(|n| *n > 0) {
            settings.request_timeout_secs = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
