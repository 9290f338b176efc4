use clap::ValueEnum;

/// What the run was asked to consider: starting or stopping the vacuum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Action {
    #[default]
    Start,
    Stop,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Precipitation maxima gathered for one run.
///
/// The lookback reading only exists for [`Action::Start`]; stop runs never
/// query the past.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecisionInput {
    Start {
        past_precipitation: f64,
        future_precipitation: f64,
    },
    Stop {
        future_precipitation: f64,
    },
}

impl DecisionInput {
    pub fn start(past_precipitation: f64, future_precipitation: f64) -> Self {
        DecisionInput::Start {
            past_precipitation,
            future_precipitation,
        }
    }

    pub fn stop(future_precipitation: f64) -> Self {
        DecisionInput::Stop {
            future_precipitation,
        }
    }

    pub fn mode(&self) -> Action {
        match self {
            DecisionInput::Start { .. } => Action::Start,
            DecisionInput::Stop { .. } => Action::Stop,
        }
    }

    pub fn past_precipitation(&self) -> Option<f64> {
        match self {
            DecisionInput::Start {
                past_precipitation, ..
            } => Some(*past_precipitation),
            DecisionInput::Stop { .. } => None,
        }
    }

    pub fn future_precipitation(&self) -> f64 {
        match self {
            DecisionInput::Start {
                future_precipitation,
                ..
            }
            | DecisionInput::Stop {
                future_precipitation,
            } => *future_precipitation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    NoPrecipitation,
    PrecipitationPastAndFuture,
    PrecipitationInPast,
    PrecipitationInForecast,
    ForecastDry,
    InvalidReading,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::NoPrecipitation => "no precipitation in past or forecast",
            DecisionReason::PrecipitationPastAndFuture => {
                "precipitation found both in past and future"
            }
            DecisionReason::PrecipitationInPast => "precipitation found in past weather",
            DecisionReason::PrecipitationInForecast => "precipitation found in future forecast",
            DecisionReason::ForecastDry => "forecast is dry",
            DecisionReason::InvalidReading => "precipitation reading is negative or not a number",
        }
    }
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    StartVacuum(DecisionReason),
    StopVacuum(DecisionReason),
    NoOp(DecisionReason),
}

impl Decision {
    pub fn reason(&self) -> DecisionReason {
        match self {
            Decision::StartVacuum(reason)
            | Decision::StopVacuum(reason)
            | Decision::NoOp(reason) => *reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_mode_and_readings() {
        let start = DecisionInput::start(1.5, 0.0);
        assert_eq!(start.mode(), Action::Start);
        assert_eq!(start.past_precipitation(), Some(1.5));
        assert_eq!(start.future_precipitation(), 0.0);

        let stop = DecisionInput::stop(2.0);
        assert_eq!(stop.mode(), Action::Stop);
        assert!(stop.past_precipitation().is_none());
        assert_eq!(stop.future_precipitation(), 2.0);
    }

    #[test]
    fn reason_text() {
        assert_eq!(DecisionReason::ForecastDry.as_str(), "forecast is dry");
        assert_eq!(
            Decision::NoOp(DecisionReason::PrecipitationInPast)
                .reason()
                .to_string(),
            "precipitation found in past weather"
        );
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::Start.to_string(), "start");
        assert_eq!(Action::Stop.to_string(), "stop");
        assert_eq!(Action::default(), Action::Start);
    }
}
