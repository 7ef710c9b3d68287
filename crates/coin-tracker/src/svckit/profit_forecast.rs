//! Forecast Command
//!
//! Projected 7-day profit per coin for a given investment.

use std::sync::Arc;

use async_trait::async_trait;

use chat_core::{
    ChatError, Command, CommandCall, CommandReply, CommandSchema, ParameterSchema,
    Result as ChatResult,
};

use crate::error::TrackerError;
use crate::report;
use crate::service::Tracker;

pub struct ForecastCommand {
    tracker: Arc<Tracker>,
}

impl ForecastCommand {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl Command for ForecastCommand {
    fn schema(&self) -> CommandSchema {
        CommandSchema {
            name: "forecast".into(),
            description: "Coins expected to return at least $10 within 7 days".into(),
            parameters: vec![
                ParameterSchema::required("investment", "number", "Amount to invest in USD")
                    .with_example(serde_json::json!(100)),
            ],
            mutates_state: false,
        }
    }

    async fn execute(&self, call: &CommandCall) -> ChatResult<CommandReply> {
        let investment = call
            .number_arg("investment")?
            .ok_or_else(|| ChatError::Validation("Invalid amount. Example: 100".into()))?;

        match self.tracker.forecast(investment).await {
            Ok(recommendations) => {
                let horizon = self.tracker.engine().config().horizon_days;
                let text = report::forecast_report(&recommendations, horizon);
                Ok(CommandReply::success("forecast", text)
                    .with_data(serde_json::to_value(&recommendations)?))
            }
            Err(TrackerError::PriceUnavailable(_)) => {
                Ok(CommandReply::failure("forecast", report::PRICES_UNAVAILABLE))
            }
            Err(err) => Err(err.into()),
        }
    }
}
