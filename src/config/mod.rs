//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "lorekeeper";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_SOURCE_BASE_URL: &str = "https://api.dofusdu.de";
const DEFAULT_SOURCE_GAME: &str = "dofus3";
const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SOURCE_SEARCH_LIMIT: u32 = 25;
const DEFAULT_SOURCE_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const DEFAULT_REQUESTS_QUEUE: &str = "encyclopedia-requests";
const DEFAULT_ANSWERS_QUEUE: &str = "encyclopedia-answers";
const DEFAULT_BROKER_CAPACITY: u32 = 64;

/// Command-line arguments for the Lorekeeper binary.
#[derive(Debug, Parser)]
#[command(name = "lorekeeper", version, about = "Lorekeeper encyclopedia worker")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "LOREKEEPER_CONFIG_FILE",
        value_name = "PATH"
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the catalogue API base URL.
    #[arg(long = "source-base-url", value_name = "URL")]
    pub source_base_url: Option<String>,

    /// Override the catalogue game namespace.
    #[arg(long = "source-game", value_name = "GAME")]
    pub source_game: Option<String>,

    /// Override the per-call budget for catalogue requests.
    #[arg(long = "source-timeout-seconds", value_name = "SECONDS")]
    pub source_timeout_seconds: Option<u64>,

    /// Override the maximum number of search hits requested per call.
    #[arg(long = "source-search-limit", value_name = "COUNT")]
    pub source_search_limit: Option<u32>,

    /// Override the queue consumed for inbound requests.
    #[arg(long = "broker-requests-queue", value_name = "NAME")]
    pub broker_requests_queue: Option<String>,

    /// Override the queue answers are published to.
    #[arg(long = "broker-answers-queue", value_name = "NAME")]
    pub broker_answers_queue: Option<String>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub source: SourceSettings,
    pub broker: BrokerSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub base_url: Url,
    pub game: String,
    pub timeout: Duration,
    pub search_limit: NonZeroU32,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub requests_queue: String,
    pub answers_queue: String,
    pub capacity: NonZeroU32,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("LOREKEEPER").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    source: RawSourceSettings,
    broker: RawBrokerSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(url) = overrides.source_base_url.as_ref() {
            self.source.base_url = Some(url.clone());
        }
        if let Some(game) = overrides.source_game.as_ref() {
            self.source.game = Some(game.clone());
        }
        if let Some(seconds) = overrides.source_timeout_seconds {
            self.source.timeout_seconds = Some(seconds);
        }
        if let Some(limit) = overrides.source_search_limit {
            self.source.search_limit = Some(limit);
        }
        if let Some(queue) = overrides.broker_requests_queue.as_ref() {
            self.broker.requests_queue = Some(queue.clone());
        }
        if let Some(queue) = overrides.broker_answers_queue.as_ref() {
            self.broker.answers_queue = Some(queue.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            database,
            source,
            broker,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let database = build_database_settings(database)?;
        let source = build_source_settings(source)?;
        let broker = build_broker_settings(broker)?;

        Ok(Self {
            logging,
            database,
            source,
            broker,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = database
        .url
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| LoadError::invalid("database.url", "connection URL is required"))?;

    let max_connections = database
        .max_connections
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
    let max_connections = non_zero_u32(max_connections, "database.max_connections")?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_source_settings(source: RawSourceSettings) -> Result<SourceSettings, LoadError> {
    let base_url = source
        .base_url
        .unwrap_or_else(|| DEFAULT_SOURCE_BASE_URL.to_string());
    let base_url = Url::parse(&base_url)
        .map_err(|err| LoadError::invalid("source.base_url", format!("failed to parse: {err}")))?;
    if base_url.cannot_be_a_base() {
        return Err(LoadError::invalid(
            "source.base_url",
            "must be a hierarchical URL",
        ));
    }

    let game = source.game.unwrap_or_else(|| DEFAULT_SOURCE_GAME.to_string());
    if game.is_empty() {
        return Err(LoadError::invalid("source.game", "must not be empty"));
    }

    let timeout_seconds = source.timeout_seconds.unwrap_or(DEFAULT_SOURCE_TIMEOUT_SECS);
    if timeout_seconds == 0 {
        return Err(LoadError::invalid(
            "source.timeout_seconds",
            "must be greater than zero",
        ));
    }

    let search_limit = source.search_limit.unwrap_or(DEFAULT_SOURCE_SEARCH_LIMIT);
    let search_limit = non_zero_u32(search_limit, "source.search_limit")?;

    let user_agent = source
        .user_agent
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE_USER_AGENT.to_string());

    Ok(SourceSettings {
        base_url,
        game,
        timeout: Duration::from_secs(timeout_seconds),
        search_limit,
        user_agent,
    })
}

fn build_broker_settings(broker: RawBrokerSettings) -> Result<BrokerSettings, LoadError> {
    let requests_queue = broker
        .requests_queue
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_REQUESTS_QUEUE.to_string());
    let answers_queue = broker
        .answers_queue
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_ANSWERS_QUEUE.to_string());
    if requests_queue == answers_queue {
        return Err(LoadError::invalid(
            "broker.answers_queue",
            "must differ from broker.requests_queue",
        ));
    }

    let capacity = broker.capacity.unwrap_or(DEFAULT_BROKER_CAPACITY);
    let capacity = non_zero_u32(capacity, "broker.capacity")?;

    Ok(BrokerSettings {
        requests_queue,
        answers_queue,
        capacity,
    })
}

fn non_zero_u32(value: u32, key: &'static str) -> Result<NonZeroU32, LoadError> {
    NonZeroU32::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSourceSettings {
    base_url: Option<String>,
    game: Option<String>,
    timeout_seconds: Option<u64>,
    search_limit: Option<u32>,
    user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBrokerSettings {
    requests_queue: Option<String>,
    answers_queue: Option<String>,
    capacity: Option<u32>,
}
