use super::flux::{max_query, SeriesSelector, TimeRange};
use super::PrecipitationSource;
use crate::config::{Credentials, InfluxDbConfig};
use crate::error::{QueryError, Result, RobovacError};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

/// Client for the InfluxDB `/api/v2/query` endpoint (2.x, and 1.8+ compat).
pub struct InfluxClient {
    client: reqwest::Client,
    query_url: Url,
    credentials: Credentials,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    dialect: Dialect,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Dialect {
    header: bool,
    delimiter: &'static str,
    annotations: [&'static str; 3],
    comment_prefix: &'static str,
    date_time_format: &'static str,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            header: true,
            delimiter: ",",
            annotations: ["datatype", "group", "default"],
            comment_prefix: "#",
            date_time_format: "RFC3339",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl InfluxClient {
    pub fn connect(config: &InfluxDbConfig) -> Result<Self> {
        // Trailing slash so `join` appends to any path prefix
        let base = Url::parse(&format!("{}/", config.address.trim_end_matches('/'))).map_err(|e| {
            RobovacError::Connection(format!("invalid address '{}': {}", config.address, e))
        })?;
        let mut query_url = base
            .join("api/v2/query")
            .map_err(|e| RobovacError::Connection(format!("invalid address: {}", e)))?;
        if !config.organization.is_empty() {
            query_url
                .query_pairs_mut()
                .append_pair("org", &config.organization);
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.skip_verify_ssl)
            .build()
            .map_err(|e| RobovacError::Connection(format!("failed to build client: {}", e)))?;

        let credentials = config.credentials();
        tracing::debug!(
            url = %query_url,
            auth = credentials.kind(),
            skip_verify_ssl = config.skip_verify_ssl,
            "InfluxDB client configured"
        );

        Ok(Self {
            client,
            query_url,
            credentials,
        })
    }

    async fn query_csv(&self, flux: &str) -> std::result::Result<String, QueryError> {
        let body = QueryRequest {
            query: flux,
            kind: "flux",
            dialect: Dialect::default(),
        };

        let mut request = self
            .client
            .post(self.query_url.clone())
            .header(ACCEPT, "application/csv")
            .json(&body);
        if let Some(auth) = self.credentials.header_value() {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| QueryError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or(text);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    QueryError::Unauthorized(format!("InfluxDB returned {}: {}", status, message))
                }
                _ => QueryError::Status {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        response
            .text()
            .await
            .map_err(|e| QueryError::Request(e.to_string()))
    }
}

impl PrecipitationSource for InfluxClient {
    async fn query_max(
        &self,
        series: &SeriesSelector,
        range: &TimeRange,
    ) -> std::result::Result<f64, QueryError> {
        let flux = max_query(series, range);
        tracing::debug!(window = range.label(), query = %flux, "querying InfluxDB");

        let csv = self.query_csv(&flux).await?;
        let value = first_value(&csv)?;

        tracing::debug!(window = range.label(), duration = %range.duration(), value, "query result");
        Ok(value)
    }
}

/// Decode the `_value` of the first record in an annotated CSV response.
pub fn first_value(csv: &str) -> std::result::Result<f64, QueryError> {
    let mut datatypes: Option<Vec<String>> = None;
    let mut header: Option<Vec<String>> = None;

    for line in csv.lines() {
        let line = line.trim_end_matches('\r');

        // A blank line ends the current table
        if line.is_empty() {
            datatypes = None;
            header = None;
            continue;
        }

        if line.starts_with('#') {
            let cells = split_record(line);
            if cells.first().map(String::as_str) == Some("#datatype") {
                datatypes = Some(cells);
            }
            continue;
        }

        let cells = split_record(line);
        if header.is_none() {
            header = Some(cells);
            continue;
        }
        let columns = header.as_deref().unwrap_or_default();

        if let Some(idx) = column_index(columns, "error") {
            let message = cells.get(idx).cloned().unwrap_or_default();
            return Err(QueryError::Provider(message));
        }

        let idx = column_index(columns, "_value").ok_or(QueryError::MissingColumn("_value"))?;

        if let Some(kind) = datatypes.as_ref().and_then(|d| d.get(idx)) {
            if !matches!(kind.as_str(), "double" | "long" | "unsignedLong") {
                return Err(QueryError::UnexpectedType(kind.clone()));
            }
        }

        let raw = cells.get(idx).map(String::as_str).unwrap_or_default();
        return raw
            .trim()
            .parse::<f64>()
            .map_err(|_| QueryError::InvalidNumber(raw.to_string()));
    }

    Err(QueryError::EmptyResult)
}

fn column_index(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c == name)
}

/// Split one CSV record, honouring double-quoted cells.
fn split_record(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOUBLE_RESULT: &str = "#datatype,string,long,dateTime:RFC3339,dateTime:RFC3339,dateTime:RFC3339,double,string,string\r\n\
#group,false,false,true,true,false,false,true,true\r\n\
#default,_result,,,,,,,\r\n\
,result,table,_start,_stop,_time,_value,_field,_measurement\r\n\
,,0,2026-10-18T00:00:00Z,2026-10-19T00:00:00Z,2026-10-18T06:00:00Z,2.5,precipitation,weather\r\n\
\r\n";

    const ERROR_RESULT: &str = "#datatype,string,string\r\n\
#group,true,true\r\n\
#default,,\r\n\
,error,reference\r\n\
,\"failed to initialize execute state: could not find bucket \"\"x\"\"\",897\r\n\
\r\n";

    fn series() -> SeriesSelector {
        SeriesSelector {
            bucket: "forecast/autogen".into(),
            measurement: "weather".into(),
            field: "precipitation".into(),
        }
    }

    fn lookback() -> TimeRange {
        TimeRange::Lookback("24h".parse().unwrap())
    }

    fn config_for(server: &MockServer) -> InfluxDbConfig {
        InfluxDbConfig {
            address: server.uri(),
            organization: "home".into(),
            token: "secret".into(),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_double_value() {
        assert_eq!(first_value(DOUBLE_RESULT).unwrap(), 2.5);
    }

    #[test]
    fn decodes_long_value() {
        let csv = "#datatype,string,long,long\n,result,table,_value\n,_result,0,3\n";
        assert_eq!(first_value(csv).unwrap(), 3.0);
    }

    #[test]
    fn decodes_without_annotations() {
        let csv = ",result,table,_value\n,_result,0,0\n";
        assert_eq!(first_value(csv).unwrap(), 0.0);
    }

    #[test]
    fn first_table_wins() {
        let csv = ",result,table,_value\n,_result,0,1.5\n\n,result,table,_value\n,_result,1,9\n";
        assert_eq!(first_value(csv).unwrap(), 1.5);
    }

    #[test]
    fn empty_response_is_an_error() {
        assert!(matches!(first_value(""), Err(QueryError::EmptyResult)));
        assert!(matches!(first_value("\r\n"), Err(QueryError::EmptyResult)));
        let header_only = "#datatype,string,long,double\n,result,table,_value\n";
        assert!(matches!(
            first_value(header_only),
            Err(QueryError::EmptyResult)
        ));
    }

    #[test]
    fn in_band_error_is_reported() {
        match first_value(ERROR_RESULT) {
            Err(QueryError::Provider(msg)) => {
                assert!(msg.contains("could not find bucket \"x\""));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn string_value_is_a_type_mismatch() {
        let csv = "#datatype,string,long,string\n,result,table,_value\n,_result,0,wet\n";
        assert!(matches!(
            first_value(csv),
            Err(QueryError::UnexpectedType(t)) if t == "string"
        ));
    }

    #[test]
    fn unparseable_value_is_rejected() {
        let csv = ",result,table,_value\n,_result,0,lots\n";
        assert!(matches!(
            first_value(csv),
            Err(QueryError::InvalidNumber(v)) if v == "lots"
        ));
    }

    #[test]
    fn missing_value_column() {
        let csv = ",result,table,_field\n,_result,0,precipitation\n";
        assert!(matches!(
            first_value(csv),
            Err(QueryError::MissingColumn("_value"))
        ));
    }

    #[test]
    fn split_record_handles_quotes() {
        assert_eq!(
            split_record(r#",a,"b,c","say ""hi""""#),
            vec!["", "a", "b,c", r#"say "hi""#]
        );
    }

    #[test]
    fn invalid_address_is_a_connection_error() {
        let config = InfluxDbConfig {
            address: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(
            InfluxClient::connect(&config),
            Err(RobovacError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn posts_flux_query_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/query"))
            .and(query_param("org", "home"))
            .and(header("authorization", "Token secret"))
            .and(header("accept", "application/csv"))
            .and(body_partial_json(serde_json::json!({
                "type": "flux",
                "dialect": { "header": true, "annotations": ["datatype", "group", "default"] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(DOUBLE_RESULT))
            .expect(1)
            .mount(&server)
            .await;

        let client = InfluxClient::connect(&config_for(&server)).unwrap();
        let value = client.query_max(&series(), &lookback()).await.unwrap();
        assert_eq!(value, 2.5);
    }

    #[tokio::test]
    async fn query_body_carries_the_flux_script() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DOUBLE_RESULT))
            .mount(&server)
            .await;

        let client = InfluxClient::connect(&config_for(&server)).unwrap();
        client.query_max(&series(), &lookback()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["query"], max_query(&series(), &lookback()));
    }

    #[tokio::test]
    async fn anonymous_requests_have_no_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DOUBLE_RESULT))
            .mount(&server)
            .await;

        let config = InfluxDbConfig {
            address: server.uri(),
            ..Default::default()
        };
        let client = InfluxClient::connect(&config).unwrap();
        client.query_max(&series(), &lookback()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("authorization"));
        assert!(requests[0].url.query().is_none());
    }

    #[tokio::test]
    async fn rejected_credentials_are_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"code":"unauthorized","message":"unauthorized access"}"#),
            )
            .mount(&server)
            .await;

        let client = InfluxClient::connect(&config_for(&server)).unwrap();
        match client.query_max(&series(), &lookback()).await {
            Err(QueryError::Unauthorized(msg)) => assert!(msg.contains("unauthorized access")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn server_errors_keep_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"code":"invalid","message":"bad flux"}"#),
            )
            .mount(&server)
            .await;

        let client = InfluxClient::connect(&config_for(&server)).unwrap();
        match client.query_max(&series(), &lookback()).await {
            Err(QueryError::Status { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad flux");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
