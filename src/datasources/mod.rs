pub mod flux;
pub mod influxdb;
pub mod webhook;

pub use flux::{SeriesSelector, TimeRange};
pub use influxdb::InfluxClient;
pub use webhook::WebhookClient;

use crate::error::{QueryError, Result};
use std::future::Future;

/// Source of precipitation maxima for a time window.
pub trait PrecipitationSource: Send + Sync {
    /// Maximum value of the selected series over `range`.
    fn query_max(
        &self,
        series: &SeriesSelector,
        range: &TimeRange,
    ) -> impl Future<Output = std::result::Result<f64, QueryError>> + Send;
}

/// Something that can fire a webhook URL.
pub trait WebhookInvoker: Send + Sync {
    fn trigger(&self, url: &str) -> impl Future<Output = Result<()>> + Send;
}
