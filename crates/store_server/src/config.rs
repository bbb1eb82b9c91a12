use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub seed_inventory_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3000".into(),
            database_url: "sqlite://./data/store.db".into(),
            seed_inventory_path: None,
        }
    }
}

/// One entry of the JSON seed file: the store assigns ids itself.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedItem {
    pub content: String,
    #[serde(default)]
    pub price: f64,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("store.toml") {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("database_url") {
        settings.database_url = v.clone();
    }
    if let Some(v) = file_cfg.get("seed_inventory") {
        settings.seed_inventory_path = Some(PathBuf::from(v));
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = var("APP__SEED_INVENTORY") {
        settings.seed_inventory_path = Some(PathBuf::from(v));
    }
}

pub fn default_seed() -> Vec<SeedItem> {
    [
        ("apple", 0.5),
        ("banana", 0.25),
        ("cherry", 3.0),
        ("dragonfruit", 4.5),
        ("elderberry", 2.75),
        ("fig", 1.5),
        ("grape", 2.0),
        ("honeydew", 3.25),
        ("kiwi", 0.75),
        ("lemon", 0.4),
    ]
    .into_iter()
    .map(|(content, price)| SeedItem {
        content: content.to_string(),
        price,
    })
    .collect()
}

pub fn read_seed_file(path: &Path) -> anyhow::Result<Vec<SeedItem>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read seed inventory '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("seed inventory '{}' is not a JSON item list", path.display()))
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = database_url
        .strip_prefix("sqlite://")
        .map(|rest| rest.split('?').next().unwrap_or_default())
        .filter(|rest| !rest.is_empty())
        .map(Path::new)
    else {
        return Ok(());
    };

    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
