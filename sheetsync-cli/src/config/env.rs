//! Environment variable overrides

use anyhow::{Context, Result};
use std::path::PathBuf;

use super::Config;

pub const CONFIG_PATH: &str = "SHEETSYNC_CONFIG";
pub const STORE_URL: &str = "SHEETSYNC_STORE_URL";
pub const API_KEY: &str = "SHEETSYNC_API_KEY";
pub const API_VERSION: &str = "SHEETSYNC_API_VERSION";
pub const REQUEST_TIMEOUT: &str = "SHEETSYNC_REQUEST_TIMEOUT_SECS";
pub const SOURCE: &str = "SHEETSYNC_SOURCE";
pub const SHEET_PATH: &str = "SHEETSYNC_SHEET_PATH";
pub const SHEET_NAME: &str = "SHEETSYNC_SHEET_NAME";
pub const SPREADSHEET_ID: &str = "SHEETSYNC_SPREADSHEET_ID";
pub const GOOGLE_TOKEN: &str = "SHEETSYNC_GOOGLE_TOKEN";
pub const DATE_FORMAT: &str = "SHEETSYNC_DATE_FORMAT";
pub const HEADER_ROWS: &str = "SHEETSYNC_HEADER_ROWS";

/// Overlay every variable that `lookup` returns a non-empty value for
pub fn apply<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(STORE_URL) {
        config.store.url = v;
    }
    if let Some(v) = get(API_KEY) {
        config.store.api_key = v;
    }
    if let Some(v) = get(API_VERSION) {
        config.store.api_version = v;
    }
    if let Some(v) = get(REQUEST_TIMEOUT) {
        let secs = v
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{} must be a whole number of seconds, got '{}'", REQUEST_TIMEOUT, v))?;
        config.store.request_timeout_secs = Some(secs);
    }
    if let Some(v) = get(SOURCE) {
        config.source.kind = v.parse()?;
    }
    if let Some(v) = get(SHEET_PATH) {
        config.source.path = Some(PathBuf::from(v));
    }
    if let Some(v) = get(SHEET_NAME) {
        config.source.sheet_name = Some(v);
    }
    if let Some(v) = get(SPREADSHEET_ID) {
        config.source.spreadsheet_id = Some(v);
    }
    if let Some(v) = get(GOOGLE_TOKEN) {
        config.source.access_token = Some(v);
    }
    if let Some(v) = get(DATE_FORMAT) {
        config.sync.date_format = v;
    }
    if let Some(v) = get(HEADER_ROWS) {
        config.sync.header_rows = v
            .trim()
            .parse()
            .with_context(|| format!("{} must be a whole number, got '{}'", HEADER_ROWS, v))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::builder()
            .store("https://old.example.com", "old-key")
            .csv("old.csv")
            .build();

        apply(
            &mut config,
            lookup(&[
                (STORE_URL, "https://new.example.com"),
                (API_KEY, "new-key"),
                (SOURCE, "google"),
                (SPREADSHEET_ID, "abc123"),
                (SHEET_NAME, "Sign ups"),
                (GOOGLE_TOKEN, "ya29.x"),
                (HEADER_ROWS, "1"),
            ]),
        )
        .unwrap();

        assert_eq!(config.store.url, "https://new.example.com");
        assert_eq!(config.store.api_key, "new-key");
        assert_eq!(config.source.kind, SourceKind::Google);
        assert_eq!(config.source.spreadsheet_id.as_deref(), Some("abc123"));
        assert_eq!(config.sync.header_rows, 1);
        // untouched values survive
        assert_eq!(config.source.path, Some(PathBuf::from("old.csv")));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let mut config = Config::builder().store("https://shop.example.com", "key").build();
        apply(&mut config, lookup(&[(API_KEY, "  ")])).unwrap();
        assert_eq!(config.store.api_key, "key");
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let mut config = Config::default();
        assert!(apply(&mut config, lookup(&[(REQUEST_TIMEOUT, "soon")])).is_err());
        assert!(apply(&mut config, lookup(&[(HEADER_ROWS, "-1")])).is_err());
        assert!(apply(&mut config, lookup(&[(SOURCE, "ftp")])).is_err());
    }
}
