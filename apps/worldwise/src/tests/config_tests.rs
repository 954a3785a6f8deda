use super::*;

#[test]
fn defaults_match_local_server() {
    let settings = Settings::default();
    assert_eq!(settings.store_url, "http://127.0.0.1:9000");
    assert_eq!(settings.request_timeout, Duration::from_secs(10));
    assert_eq!(settings.delete_policy, DeletePolicy::AlwaysClear);
}

#[test]
fn file_settings_override_defaults() {
    let mut settings = Settings::default();
    apply_file_settings(
        &mut settings,
        r#"
store_url = "http://trips.local:8000"
request_timeout_secs = 3
delete_policy = "clear_if_selected"
"#,
    );
    assert_eq!(settings.store_url, "http://trips.local:8000");
    assert_eq!(settings.request_timeout, Duration::from_secs(3));
    assert_eq!(settings.delete_policy, DeletePolicy::ClearIfSelected);
}

#[test]
fn partial_or_broken_files_keep_remaining_defaults() {
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, "request_timeout_secs = 30\n");
    assert_eq!(settings.store_url, Settings::default().store_url);
    assert_eq!(settings.request_timeout, Duration::from_secs(30));

    let mut settings = Settings::default();
    apply_file_settings(&mut settings, "delete_policy = \"sometimes\"\n");
    assert_eq!(settings, Settings::default());
}

#[test]
fn env_delete_policy_uses_file_spelling() {
    assert_eq!(
        parse_delete_policy("clear_if_selected"),
        Some(DeletePolicy::ClearIfSelected)
    );
    assert_eq!(parse_delete_policy(" always_clear "), Some(DeletePolicy::AlwaysClear));
    assert_eq!(parse_delete_policy("ClearIfSelected"), None);
    assert_eq!(parse_delete_policy("never"), None);
}
