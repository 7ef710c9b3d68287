//! Price Lookup Command
//!
//! Shows the current cached price of every supported coin.

use std::sync::Arc;

use async_trait::async_trait;

use chat_core::{Command, CommandCall, CommandReply, CommandSchema, Result as ChatResult};

use crate::report;
use crate::service::Tracker;

pub struct PriceLookupCommand {
    tracker: Arc<Tracker>,
}

impl PriceLookupCommand {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl Command for PriceLookupCommand {
    fn schema(&self) -> CommandSchema {
        CommandSchema {
            name: "prices".into(),
            description: "Current prices of the supported coins".into(),
            parameters: vec![],
            mutates_state: false,
        }
    }

    async fn execute(&self, _call: &CommandCall) -> ChatResult<CommandReply> {
        let prices = self.tracker.get_current_prices().await;
        if prices.is_empty() {
            return Ok(CommandReply::failure("prices", report::PRICES_UNAVAILABLE));
        }

        let text = report::prices_report(&prices);
        Ok(CommandReply::success("prices", text).with_data(serde_json::to_value(&prices)?))
    }
}
