use crate::datasources::SeriesSelector;
use crate::error::{Result, RobovacError};
use crate::models::FluxDuration;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub vacuum: VacuumConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default, rename = "influxDB", alias = "influxdb")]
    pub influxdb: InfluxDbConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VacuumConfig {
    #[serde(alias = "webhookstart")]
    pub webhook_start: String,
    #[serde(alias = "webhookstop")]
    pub webhook_stop: String,
    #[serde(alias = "skipverifyssl")]
    pub skip_verify_ssl: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryConfig {
    #[serde(alias = "lookbackduration")]
    pub lookback_duration: String,
    #[serde(alias = "lookforwardduration")]
    pub lookforward_duration: String,
}

impl QueryConfig {
    pub fn lookback(&self) -> Result<FluxDuration> {
        self.lookback_duration
            .parse()
            .map_err(|e| RobovacError::ConfigValidation(format!("query.lookbackDuration: {}", e)))
    }

    pub fn lookforward(&self) -> Result<FluxDuration> {
        self.lookforward_duration.parse().map_err(|e| {
            RobovacError::ConfigValidation(format!("query.lookforwardDuration: {}", e))
        })
    }
}

#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InfluxDbConfig {
    pub address: String,
    pub username: String,
    pub password: String,
    pub measurement: String,
    pub field: String,
    pub database: String,
    #[serde(alias = "retentionpolicy")]
    pub retention_policy: String,
    pub token: String,
    pub organization: String,
    pub bucket: String,
    #[serde(alias = "skipverifyssl")]
    pub skip_verify_ssl: bool,
}

impl std::fmt::Debug for InfluxDbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxDbConfig")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("measurement", &self.measurement)
            .field("field", &self.field)
            .field("database", &self.database)
            .field("retention_policy", &self.retention_policy)
            .field("token", &"[REDACTED]")
            .field("organization", &self.organization)
            .field("bucket", &self.bucket)
            .field("skip_verify_ssl", &self.skip_verify_ssl)
            .finish()
    }
}

/// Credential sent to InfluxDB.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    Basic { username: String, password: String },
    Anonymous,
}

impl Credentials {
    /// Value of the `Authorization: Token ...` header, if any.
    ///
    /// InfluxDB 1.8 accepts `username:password` in place of a v2 token.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Credentials::Token(token) => Some(format!("Token {}", token)),
            Credentials::Basic { username, password } => {
                Some(format!("Token {}:{}", username, password))
            }
            Credentials::Anonymous => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::Token(_) => "token",
            Credentials::Basic { .. } => "username/password",
            Credentials::Anonymous => "anonymous",
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credentials({})", self.kind())
    }
}

impl InfluxDbConfig {
    /// Token wins, then username/password when both are set, else anonymous.
    pub fn credentials(&self) -> Credentials {
        if !self.token.is_empty() {
            Credentials::Token(self.token.clone())
        } else if !self.username.is_empty() && !self.password.is_empty() {
            Credentials::Basic {
                username: self.username.clone(),
                password: self.password.clone(),
            }
        } else {
            Credentials::Anonymous
        }
    }

    /// Explicit bucket, else `database/retentionPolicy` for 1.x servers.
    pub fn resolve_bucket(&self) -> Result<String> {
        if !self.bucket.is_empty() {
            Ok(self.bucket.clone())
        } else if !self.database.is_empty() && !self.retention_policy.is_empty() {
            Ok(format!("{}/{}", self.database, self.retention_policy))
        } else {
            Err(RobovacError::ConfigValidation(
                "must configure at least one of bucket or database/retention policy".into(),
            ))
        }
    }

    pub fn series(&self) -> Result<SeriesSelector> {
        Ok(SeriesSelector {
            bucket: self.resolve_bucket()?,
            measurement: self.measurement.clone(),
            field: self.field.clone(),
        })
    }
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Err(RobovacError::Config(format!(
                "Config file not found at {:?}",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(config_path)
            .map_err(|e| RobovacError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_yaml_str(&config_str)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| RobovacError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }
}
