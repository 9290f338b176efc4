use crate::models::{Decision, DecisionInput, DecisionReason};

/// Choose what to do with the vacuum given the precipitation maxima.
///
/// Start runs only start the vacuum when both windows read exactly zero.
/// Stop runs stop it as soon as any precipitation is forecast.
pub fn decide(input: &DecisionInput) -> Decision {
    match *input {
        DecisionInput::Start {
            past_precipitation: past,
            future_precipitation: future,
        } => {
            if past == 0.0 && future == 0.0 {
                Decision::StartVacuum(DecisionReason::NoPrecipitation)
            } else if past > 0.0 && future > 0.0 {
                Decision::NoOp(DecisionReason::PrecipitationPastAndFuture)
            } else if past > 0.0 && future == 0.0 {
                Decision::NoOp(DecisionReason::PrecipitationInPast)
            } else if past == 0.0 && future > 0.0 {
                Decision::NoOp(DecisionReason::PrecipitationInForecast)
            } else {
                // Negative or NaN on at least one side.
                Decision::NoOp(DecisionReason::InvalidReading)
            }
        }
        DecisionInput::Stop {
            future_precipitation: future,
        } => {
            if future > 0.0 {
                Decision::StopVacuum(DecisionReason::PrecipitationInForecast)
            } else {
                Decision::NoOp(DecisionReason::ForecastDry)
            }
        }
    }
}
