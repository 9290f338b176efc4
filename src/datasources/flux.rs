use crate::models::FluxDuration;

/// Which series to read: a bucket plus the measurement/field filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSelector {
    pub bucket: String,
    pub measurement: String,
    pub field: String,
}

/// Query window relative to the server's `now()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRange {
    /// From `now() - d` up to now.
    Lookback(FluxDuration),
    /// From now up to `now() + d`.
    Lookforward(FluxDuration),
}

impl TimeRange {
    pub fn duration(&self) -> &FluxDuration {
        match self {
            TimeRange::Lookback(d) | TimeRange::Lookforward(d) => d,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Lookback(_) => "lookback",
            TimeRange::Lookforward(_) => "lookforward",
        }
    }

    fn imports(&self) -> &'static str {
        match self {
            TimeRange::Lookback(_) => "",
            TimeRange::Lookforward(_) => "import \"experimental\"\n",
        }
    }

    fn range_call(&self) -> String {
        match self {
            TimeRange::Lookback(d) => format!("range(start: -{})", d),
            TimeRange::Lookforward(d) => format!(
                "range(start: now(), stop: experimental.addDuration(d: {}, to: now()))",
                d
            ),
        }
    }
}

/// Build the Flux script returning the max `_value` of `series` over `range`.
pub fn max_query(series: &SeriesSelector, range: &TimeRange) -> String {
    format!(
        "{imports}from(bucket: \"{bucket}\")\n  |> {range}\n  |> filter(fn: (r) => r[\"_measurement\"] == \"{measurement}\" and r[\"_field\"] == \"{field}\")\n  |> max(column: \"_value\")",
        imports = range.imports(),
        bucket = escape_string(&series.bucket),
        range = range.range_call(),
        measurement = escape_string(&series.measurement),
        field = escape_string(&series.field),
    )
}

/// Escape a value for use inside a Flux double-quoted string literal.
fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
