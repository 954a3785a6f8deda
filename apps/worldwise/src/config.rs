use std::{fs, time::Duration};

use client_core::{store::DEFAULT_REQUEST_TIMEOUT, DeletePolicy};
use serde::{
    de::{
        value::{self, StrDeserializer},
        IntoDeserializer,
    },
    Deserialize,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_url: String,
    pub request_timeout: Duration,
    pub delete_policy: DeletePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_url: "http://127.0.0.1:9000".into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            delete_policy: DeletePolicy::default(),
        }
    }
}

/// Keys accepted in `worldwise.toml`.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    store_url: Option<String>,
    request_timeout_secs: Option<u64>,
    delete_policy: Option<DeletePolicy>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("worldwise.toml") {
        apply_file_settings(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("WORLDWISE_STORE_URL") {
        settings.store_url = v;
    }
    if let Ok(v) = std::env::var("APP__STORE_URL") {
        settings.store_url = v;
    }

    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(secs) = v.parse::<u64>() {
            settings.request_timeout = Duration::from_secs(secs);
        }
    }

    if let Ok(v) = std::env::var("APP__DELETE_POLICY") {
        if let Some(policy) = parse_delete_policy(&v) {
            settings.delete_policy = policy;
        }
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<FileSettings>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.store_url {
        settings.store_url = v;
    }
    if let Some(secs) = file_cfg.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(secs);
    }
    if let Some(policy) = file_cfg.delete_policy {
        settings.delete_policy = policy;
    }
}

// Same spelling as the `delete_policy` key in `worldwise.toml`.
fn parse_delete_policy(raw: &str) -> Option<DeletePolicy> {
    let deserializer: StrDeserializer<'_, value::Error> = raw.trim().into_deserializer();
    DeletePolicy::deserialize(deserializer).ok()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
