use super::decision::decide;
use crate::config::Config;
use crate::datasources::{PrecipitationSource, SeriesSelector, TimeRange, WebhookInvoker};
use crate::error::{Result, RobovacError};
use crate::models::{Action, Decision, DecisionInput, FluxDuration};

/// Everything a run needs beyond its collaborators, resolved from config.
#[derive(Debug, Clone)]
pub struct TriggerSettings {
    pub series: SeriesSelector,
    /// Only required for start runs.
    pub lookback: Option<FluxDuration>,
    pub lookforward: FluxDuration,
    pub webhook_start: String,
    pub webhook_stop: String,
}

impl TriggerSettings {
    /// Resolve bucket and durations; the lookback is only validated for start runs.
    pub fn from_config(config: &Config, action: Action) -> Result<Self> {
        let series = config.influxdb.series()?;
        let lookback = match action {
            Action::Start => Some(config.query.lookback()?),
            Action::Stop => None,
        };
        let lookforward = config.query.lookforward()?;

        Ok(Self {
            series,
            lookback,
            lookforward,
            webhook_start: config.vacuum.webhook_start.clone(),
            webhook_stop: config.vacuum.webhook_stop.clone(),
        })
    }
}

/// Queries precipitation, decides, and fires the matching webhook.
pub struct TriggerService<S, W> {
    source: S,
    webhook: W,
    settings: TriggerSettings,
}

impl<S: PrecipitationSource, W: WebhookInvoker> TriggerService<S, W> {
    pub fn new(source: S, webhook: W, settings: TriggerSettings) -> Self {
        Self {
            source,
            webhook,
            settings,
        }
    }

    pub async fn run(&self, action: Action) -> Result<Decision> {
        let input = self.gather(action).await?;
        tracing::debug!(
            mode = %input.mode(),
            past = ?input.past_precipitation(),
            future = input.future_precipitation(),
            "precipitation maxima"
        );
        let decision = decide(&input);
        self.dispatch(action, &decision).await?;
        Ok(decision)
    }

    async fn gather(&self, action: Action) -> Result<DecisionInput> {
        let series = &self.settings.series;

        let past = match (action, &self.settings.lookback) {
            (Action::Start, Some(lookback)) => Some(
                self.source
                    .query_max(series, &TimeRange::Lookback(lookback.clone()))
                    .await?,
            ),
            (Action::Start, None) => {
                return Err(RobovacError::ConfigValidation(
                    "query.lookbackDuration is required for start".into(),
                ))
            }
            (Action::Stop, _) => None,
        };

        let future = self
            .source
            .query_max(
                series,
                &TimeRange::Lookforward(self.settings.lookforward.clone()),
            )
            .await?;

        Ok(match past {
            Some(past) => DecisionInput::start(past, future),
            None => DecisionInput::stop(future),
        })
    }

    async fn dispatch(&self, action: Action, decision: &Decision) -> Result<()> {
        let lookback = self
            .settings
            .lookback
            .as_ref()
            .map(FluxDuration::as_str)
            .unwrap_or_default();
        let lookforward = self.settings.lookforward.as_str();

        match decision {
            Decision::StartVacuum(reason) => {
                self.webhook.trigger(&self.settings.webhook_start).await?;
                tracing::info!(
                    op = "main",
                    lookbackDuration = lookback,
                    lookforwardDuration = lookforward,
                    reason = reason.as_str(),
                    "started robot vacuum"
                );
            }
            Decision::StopVacuum(reason) => {
                self.webhook.trigger(&self.settings.webhook_stop).await?;
                tracing::info!(
                    op = "main",
                    lookforwardDuration = lookforward,
                    reason = reason.as_str(),
                    "stopped robot vacuum"
                );
            }
            Decision::NoOp(reason) if action == Action::Start => {
                tracing::info!(
                    op = "main",
                    lookbackDuration = lookback,
                    lookforwardDuration = lookforward,
                    reason = reason.as_str(),
                    "not starting vacuum"
                );
            }
            Decision::NoOp(reason) => {
                tracing::info!(
                    op = "main",
                    lookforwardDuration = lookforward,
                    reason = reason.as_str(),
                    "not stopping vacuum"
                );
            }
        }

        Ok(())
    }
}
