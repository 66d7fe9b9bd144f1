use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub bills_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub source: CatalogSource,
    pub file_path: PathBuf,
    pub sheet: SheetConfig,
}

#[derive(Clone, Debug)]
pub struct SheetConfig {
    pub base_url: String,
    pub spreadsheet_id: Option<String>,
    pub range: String,
    pub api_key: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    File,
    Sheet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bills_path: Option<PathBuf>,
    pub catalog_source: Option<CatalogSource>,
    pub catalog_file_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig { bills_path: PathBuf::from("data/bills.json") },
            catalog: CatalogConfig {
                source: CatalogSource::File,
                file_path: PathBuf::from("data/catalog.csv"),
                sheet: SheetConfig {
                    base_url: "https://sheets.googleapis.com".to_string(),
                    spreadsheet_id: None,
                    range: "Sheet1!A:B".to_string(),
                    api_key: None,
                },
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

impl std::str::FromStr for CatalogSource {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "sheet" => Ok(Self::Sheet),
            other => Err(ConfigError::Validation(format!(
                "unsupported catalog source `{other}` (expected file|sheet)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    catalog: Option<CatalogPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    bills_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    source: Option<CatalogSource>,
    file_path: Option<PathBuf>,
    sheet: Option<SheetPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SheetPatch {
    base_url: Option<String>,
    spreadsheet_id: Option<String>,
    range: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("agrobill.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(bills_path) = store.bills_path {
                self.store.bills_path = bills_path;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(source) = catalog.source {
                self.catalog.source = source;
            }
            if let Some(file_path) = catalog.file_path {
                self.catalog.file_path = file_path;
            }
            if let Some(sheet) = catalog.sheet {
                if let Some(base_url) = sheet.base_url {
                    self.catalog.sheet.base_url = base_url;
                }
                if let Some(spreadsheet_id) = sheet.spreadsheet_id {
                    self.catalog.sheet.spreadsheet_id = Some(spreadsheet_id);
                }
                if let Some(range) = sheet.range {
                    self.catalog.sheet.range = range;
                }
                if let Some(api_key) = sheet.api_key {
                    self.catalog.sheet.api_key = Some(api_key.into());
                }
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("AGROBILL_STORE_BILLS_PATH") {
            self.store.bills_path = PathBuf::from(value);
        }

        if let Some(value) = read_env("AGROBILL_CATALOG_SOURCE") {
            self.catalog.source = value.parse()?;
        }
        if let Some(value) = read_env("AGROBILL_CATALOG_FILE_PATH") {
            self.catalog.file_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("AGROBILL_CATALOG_SHEET_BASE_URL") {
            self.catalog.sheet.base_url = value;
        }
        if let Some(value) = read_env("AGROBILL_CATALOG_SHEET_SPREADSHEET_ID") {
            self.catalog.sheet.spreadsheet_id = Some(value);
        }
        if let Some(value) = read_env("AGROBILL_CATALOG_SHEET_RANGE") {
            self.catalog.sheet.range = value;
        }
        if let Some(value) = read_env("AGROBILL_CATALOG_SHEET_API_KEY") {
            self.catalog.sheet.api_key = Some(value.into());
        }

        let log_level =
            read_env("AGROBILL_LOGGING_LEVEL").or_else(|| read_env("AGROBILL_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("AGROBILL_LOGGING_FORMAT").or_else(|| read_env("AGROBILL_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bills_path) = overrides.bills_path {
            self.store.bills_path = bills_path;
        }
        if let Some(source) = overrides.catalog_source {
            self.catalog.source = source;
        }
        if let Some(file_path) = overrides.catalog_file_path {
            self.catalog.file_path = file_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        validate_catalog(&self.catalog)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("agrobill.toml"), PathBuf::from("config/agrobill.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.bills_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("store.bills_path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    match catalog.source {
        CatalogSource::File => {
            if catalog.file_path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "catalog.file_path must not be empty for the file source".to_string(),
                ));
            }
        }
        CatalogSource::Sheet => {
            let sheet = &catalog.sheet;
            if sheet.base_url.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "catalog.sheet.base_url must not be empty for the sheet source".to_string(),
                ));
            }
            if sheet.range.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "catalog.sheet.range must not be empty for the sheet source".to_string(),
                ));
            }
            let id_missing =
                sheet.spreadsheet_id.as_ref().map(|id| id.trim().is_empty()).unwrap_or(true);
            if id_missing {
                return Err(ConfigError::Validation(
                    "catalog.sheet.spreadsheet_id is required for the sheet source".to_string(),
                ));
            }
            let key_missing = sheet
                .api_key
                .as_ref()
                .map(|key| key.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if key_missing {
                return Err(ConfigError::Validation(
                    "catalog.sheet.api_key is required for the sheet source".to_string(),
                ));
            }
        }
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}
