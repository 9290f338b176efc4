use thiserror::Error;

#[derive(Error, Debug)]
pub enum RobovacError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    ConfigValidation(String),

    #[error("InfluxDB connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(QueryError),

    #[error("Webhook error: {0}")]
    Webhook(String),
}

impl RobovacError {
    /// Name of the step that failed, used as the `op` log field.
    pub fn op(&self) -> &'static str {
        match self {
            Self::Config(_) => "LoadConfiguration",
            Self::ConfigValidation(_) => "main",
            Self::Connection(_) => "influxdb.Connect",
            Self::Query(_) => "influxdb.Query",
            Self::Webhook(_) => "webhook.Trigger",
        }
    }
}

impl From<QueryError> for RobovacError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Unauthorized(msg) => Self::Connection(msg),
            other => Self::Query(other),
        }
    }
}

/// Failures of a single max-precipitation query.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("authentication rejected: {0}")]
    Unauthorized(String),

    #[error("InfluxDB returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("InfluxDB reported: {0}")]
    Provider(String),

    #[error("query returned no records")]
    EmptyResult,

    #[error("result has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("expected a numeric value, got column type '{0}'")]
    UnexpectedType(String),

    #[error("cannot parse '{0}' as a number")]
    InvalidNumber(String),
}

pub type Result<T> = std::result::Result<T, RobovacError>;
