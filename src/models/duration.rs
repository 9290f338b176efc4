use std::str::FromStr;
use std::sync::OnceLock;

/// A Flux duration literal such as `24h`, `1d12h` or `90m`.
///
/// The literal is spliced into query text verbatim, so only the exact Flux
/// grammar is accepted: one or more `<integer><unit>` groups, no sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluxDuration(String);

fn duration_pattern() -> &'static regex_lite::Regex {
    static PATTERN: OnceLock<regex_lite::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex_lite::Regex::new(r"^(?:[0-9]+(?:ns|us|µs|ms|mo|s|m|h|d|w|y))+$")
            .expect("duration pattern is valid")
    })
}

impl FluxDuration {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for FluxDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("duration is empty".into());
        }
        if !duration_pattern().is_match(s) {
            return Err(format!(
                "'{}' is not a valid duration (expected e.g. 24h, 1d12h, 30m)",
                s
            ));
        }
        Ok(FluxDuration(s.to_string()))
    }
}

impl std::fmt::Display for FluxDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
