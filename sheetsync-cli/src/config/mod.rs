//! Runtime configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `SHEETSYNC_*` environment variables (a `.env` file is loaded first by `main`).
//! Nothing secret is compiled in; `validate` refuses to run without a store URL,
//! an API key and a sheet location.

pub mod env;

use anyhow::{Context, Result, bail};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sheet::ColumnRef;
use crate::sheet::google::DEFAULT_API_BASE;

pub const DEFAULT_API_VERSION: &str = "2020-07";
/// US short date, e.g. `10/19/2026`
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub source: SourceConfig,
    pub columns: ColumnLayout,
    pub sync: SyncSettings,
}

/// Shopify store connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store root, e.g. `https://my-store.myshopify.com`
    pub url: String,
    /// Sent base64-encoded as a Basic credential
    pub api_key: String,
    pub api_version: String,
    /// No timeout unless set
    pub request_timeout_secs: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Csv,
    Xlsx,
    Google,
}

impl std::str::FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(SourceKind::Csv),
            "xlsx" | "excel" => Ok(SourceKind::Xlsx),
            "google" | "gsheets" => Ok(SourceKind::Google),
            other => bail!("Unknown source kind '{}' (expected csv, xlsx or google)", other),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Csv => write!(f, "csv"),
            SourceKind::Xlsx => write!(f, "xlsx"),
            SourceKind::Google => write!(f, "google"),
        }
    }
}

/// Where the customer list lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// File path for `csv` and `xlsx`
    pub path: Option<PathBuf>,
    /// Worksheet / tab name for `xlsx` (first sheet if unset) and `google`
    pub sheet_name: Option<String>,
    pub spreadsheet_id: Option<String>,
    /// OAuth access token with the spreadsheets scope
    pub access_token: Option<String>,
    pub api_base: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Csv,
            path: None,
            sheet_name: None,
            spreadsheet_id: None,
            access_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Which columns hold the identity fields and the sync marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub first_name: ColumnRef,
    pub last_name: ColumnRef,
    pub email: ColumnRef,
    pub marker: ColumnRef,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            first_name: ColumnRef::A,
            last_name: ColumnRef::B,
            email: ColumnRef::C,
            marker: ColumnRef::D,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// chrono format string for the marker date
    pub date_format: String,
    /// Leading rows never treated as customers
    pub header_rows: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            header_rows: 0,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Load from `path` (or the default location if it exists) and apply the
    /// process environment; callers validate what they need
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_path(path) {
            Some(file) => Self::from_file(&file)?,
            None => {
                log::debug!("No config file found, using defaults and environment");
                Self::default()
            }
        };

        env::apply(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Explicit path, then `SHEETSYNC_CONFIG`, then `<config dir>/sheetsync/config.toml`
    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(env::CONFIG_PATH) {
            return Some(PathBuf::from(path));
        }
        let default = default_config_path()?;
        default.exists().then_some(default)
    }

    /// Full check before a sync run
    pub fn validate(&self) -> Result<()> {
        self.validate_store()?;
        self.validate_source()
    }

    pub fn validate_store(&self) -> Result<()> {
        if self.store.url.trim().is_empty() {
            bail!("Store URL is not set (store.url or {})", env::STORE_URL);
        }
        if !self.store.url.starts_with("http://") && !self.store.url.starts_with("https://") {
            bail!("Store URL must start with http:// or https://: {}", self.store.url);
        }
        if self.store.api_key.is_empty() {
            bail!("Store API key is not set (store.api_key or {})", env::API_KEY);
        }
        if self.store.api_version.trim().is_empty() {
            bail!("Store API version must not be empty");
        }
        Ok(())
    }

    /// Sheet location, column layout and marker format
    pub fn validate_source(&self) -> Result<()> {
        match self.source.kind {
            SourceKind::Csv | SourceKind::Xlsx => {
                if self.source.path.is_none() {
                    bail!(
                        "Source path is not set for a {} source (source.path or {})",
                        self.source.kind,
                        env::SHEET_PATH
                    );
                }
            }
            SourceKind::Google => {
                if self.source.spreadsheet_id.as_deref().unwrap_or("").is_empty() {
                    bail!(
                        "Spreadsheet ID is not set (source.spreadsheet_id or {})",
                        env::SPREADSHEET_ID
                    );
                }
                if self.source.sheet_name.as_deref().unwrap_or("").is_empty() {
                    bail!("Sheet name is not set (source.sheet_name or {})", env::SHEET_NAME);
                }
                if self.source.access_token.as_deref().unwrap_or("").is_empty() {
                    bail!(
                        "Google access token is not set (source.access_token or {})",
                        env::GOOGLE_TOKEN
                    );
                }
            }
        }

        let cols = [
            self.columns.first_name,
            self.columns.last_name,
            self.columns.email,
            self.columns.marker,
        ];
        if let Some(col) = cols.iter().find(|c| **c > ColumnRef::MAX) {
            bail!("Column {} is past the last sheet column {}", col, ColumnRef::MAX);
        }
        let unique: HashSet<_> = cols.iter().collect();
        if unique.len() != cols.len() {
            bail!("Column layout uses the same column twice: {:?}", self.columns);
        }

        if self.sync.date_format.trim().is_empty() {
            bail!("Date format must not be empty");
        }
        if StrftimeItems::new(&self.sync.date_format).any(|item| matches!(item, Item::Error)) {
            bail!("Invalid date format: {}", self.sync.date_format);
        }
        Ok(())
    }

    /// Copy with credentials masked, for display
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        copy.store.api_key = mask_secret(&copy.store.api_key);
        copy.source.access_token = copy.source.access_token.as_deref().map(mask_secret);
        copy
    }
}

/// `<config dir>/sheetsync/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sheetsync").join("config.toml"))
}

/// Keep the last four characters of longer secrets
fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Builder for Config
#[derive(Debug)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set store URL and API key
    pub fn store(mut self, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.config.store.url = url.into();
        self.config.store.api_key = api_key.into();
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.store.api_version = version.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.store.request_timeout_secs = Some(secs);
        self
    }

    /// Use a CSV file as the source
    pub fn csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.source.kind = SourceKind::Csv;
        self.config.source.path = Some(path.into());
        self
    }

    /// Use a workbook as the source, optionally a named sheet
    pub fn xlsx(mut self, path: impl Into<PathBuf>, sheet_name: Option<&str>) -> Self {
        self.config.source.kind = SourceKind::Xlsx;
        self.config.source.path = Some(path.into());
        self.config.source.sheet_name = sheet_name.map(str::to_string);
        self
    }

    /// Use a Google spreadsheet tab as the source
    pub fn google(
        mut self,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        self.config.source.kind = SourceKind::Google;
        self.config.source.spreadsheet_id = Some(spreadsheet_id.into());
        self.config.source.sheet_name = Some(sheet_name.into());
        self.config.source.access_token = Some(access_token.into());
        self
    }

    pub fn columns(mut self, columns: ColumnLayout) -> Self {
        self.config.columns = columns;
        self
    }

    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.config.sync.date_format = format.into();
        self
    }

    pub fn header_rows(mut self, rows: usize) -> Self {
        self.config.sync.header_rows = rows;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
