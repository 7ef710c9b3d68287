//! History Command

use std::sync::Arc;

use async_trait::async_trait;

use chat_core::{Command, CommandCall, CommandReply, CommandSchema, Result as ChatResult};

use crate::report;
use crate::service::Tracker;

pub struct HistoryCommand {
    tracker: Arc<Tracker>,
}

impl HistoryCommand {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl Command for HistoryCommand {
    fn schema(&self) -> CommandSchema {
        CommandSchema {
            name: "history".into(),
            description: "Every recorded purchase, oldest first".into(),
            parameters: vec![],
            mutates_state: false,
        }
    }

    async fn execute(&self, _call: &CommandCall) -> ChatResult<CommandReply> {
        let purchases = self.tracker.list_purchases().await;
        let text = report::history_report(&purchases);
        Ok(CommandReply::success("history", text).with_data(serde_json::to_value(&purchases)?))
    }
}
