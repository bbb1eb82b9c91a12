use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_root(label: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    env::temp_dir().join(format!("shop_store_{label}_{suffix}"))
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite:data/test.db"),
        "sqlite://data/test.db"
    );
}

#[test]
fn keeps_memory_and_explicit_urls() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        normalize_database_url("sqlite://./store.db?mode=rwc"),
        "sqlite://./store.db?mode=rwc"
    );
    assert_eq!(
        normalize_database_url("   "),
        Settings::default().database_url
    );
}

#[test]
fn creates_parent_dir_for_sqlite_url() {
    let root = temp_root("config");
    let db_path = root.join("data").join("test.db");

    prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare db url");
    assert!(root.join("data").exists());

    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn file_then_env_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
        bind_addr = "0.0.0.0:4000"
        seed_inventory = "seed.json"
        "#,
    );
    apply_env(&mut settings, |key| match key {
        "SERVER_BIND" => Some("127.0.0.1:5000".into()),
        "APP__DATABASE_URL" => Some("sqlite::memory:".into()),
        _ => None,
    });

    assert_eq!(settings.server_bind, "127.0.0.1:5000");
    assert_eq!(settings.database_url, "sqlite::memory:");
    assert_eq!(
        settings.seed_inventory_path,
        Some(PathBuf::from("seed.json"))
    );
}

#[test]
fn reads_seed_file_with_optional_prices() {
    let root = temp_root("seed");
    fs::create_dir_all(&root).expect("root");
    let path = root.join("seed.json");
    fs::write(
        &path,
        r#"[{ "content": "apple", "price": 0.5 }, { "content": "plum" }]"#,
    )
    .expect("write seed");

    let seed = read_seed_file(&path).expect("seed");
    assert_eq!(
        seed,
        vec![
            SeedItem {
                content: "apple".into(),
                price: 0.5
            },
            SeedItem {
                content: "plum".into(),
                price: 0.0
            },
        ]
    );

    fs::write(&path, "{ not json").expect("write broken seed");
    let err = read_seed_file(&path).expect_err("broken seed");
    assert!(err.to_string().contains("not a JSON item list"));

    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn default_seed_is_not_empty() {
    assert!(default_seed().len() >= 10);
}
