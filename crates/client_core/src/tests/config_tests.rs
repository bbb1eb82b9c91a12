use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_point_at_local_store() {
    let settings = ShopSettings::default();
    assert_eq!(settings.store_url, "http://localhost:3000");
    assert_eq!(settings.items_per_page, DEFAULT_ITEMS_PER_PAGE);
    assert_eq!(settings.request_timeout(), Duration::from_secs(10));
}

#[test]
fn file_values_override_defaults() {
    let mut settings = ShopSettings::default();
    apply_file(
        &mut settings,
        r#"
        store_url = "http://store.internal:8080"
        items_per_page = 3
        request_timeout_secs = "30"
        "#,
    );
    apply_env(&mut settings, no_env);

    assert_eq!(settings.store_url, "http://store.internal:8080");
    assert_eq!(settings.items_per_page, 3);
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn zero_and_malformed_numbers_are_ignored() {
    let mut settings = ShopSettings::default();
    apply_file(&mut settings, "items_per_page = 0\nrequest_timeout_secs = \"soon\"");
    assert_eq!(settings, ShopSettings::default());

    apply_env(&mut settings, |key| match key {
        "APP__ITEMS_PER_PAGE" => Some("0".into()),
        "APP__REQUEST_TIMEOUT_SECS" => Some("-4".into()),
        _ => None,
    });
    assert_eq!(settings, ShopSettings::default());
}

#[test]
fn unparseable_file_is_ignored() {
    let mut settings = ShopSettings::default();
    apply_file(&mut settings, "store_url = ");
    assert_eq!(settings, ShopSettings::default());
}

#[test]
fn prefixed_env_wins_over_plain_env() {
    let mut settings = ShopSettings::default();
    apply_env(&mut settings, |key| match key {
        "STORE_URL" => Some("http://plain:1".into()),
        "APP__STORE_URL" => Some("http://prefixed:2".into()),
        "APP__ITEMS_PER_PAGE" => Some(" 7 ".into()),
        _ => None,
    });

    assert_eq!(settings.store_url, "http://prefixed:2");
    assert_eq!(settings.items_per_page, 7);
}

#[test]
fn missing_settings_file_yields_defaults_plus_env() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("shop_settings_missing_{suffix}.toml"));

    let settings = load_settings_from(&path);
    assert!(settings.items_per_page > 0);
    assert!(settings.request_timeout_secs > 0);
}
