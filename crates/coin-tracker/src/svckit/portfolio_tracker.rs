//! Portfolio Command
//!
//! Values recorded purchases at current prices.

use std::sync::Arc;

use async_trait::async_trait;

use chat_core::{Command, CommandCall, CommandReply, CommandSchema, Result as ChatResult};

use crate::report;
use crate::service::Tracker;

pub struct PortfolioCommand {
    tracker: Arc<Tracker>,
}

impl PortfolioCommand {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl Command for PortfolioCommand {
    fn schema(&self) -> CommandSchema {
        CommandSchema {
            name: "portfolio".into(),
            description: "Holdings per coin with current value and profit".into(),
            parameters: vec![],
            mutates_state: false,
        }
    }

    async fn execute(&self, _call: &CommandCall) -> ChatResult<CommandReply> {
        let portfolio = self.tracker.portfolio().await;
        let text = report::portfolio_report(&portfolio);
        Ok(CommandReply::success("portfolio", text).with_data(serde_json::to_value(&portfolio)?))
    }
}
