//! Add Purchase Command
//!
//! Records a purchase for today. Amount and cost come either as separate
//! arguments or as a single `entry` in the chat form `AMOUNT COST`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;

use chat_core::{
    ChatError, Command, CommandCall, CommandReply, CommandSchema, ParameterSchema,
    Result as ChatResult,
};

use crate::coins::find_coin;
use crate::service::{Tracker, decimal_from_f64, parse_purchase_entry};

pub struct AddPurchaseCommand {
    tracker: Arc<Tracker>,
}

impl AddPurchaseCommand {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl Command for AddPurchaseCommand {
    fn schema(&self) -> CommandSchema {
        CommandSchema {
            name: "add_purchase".into(),
            description: "Record a purchase (today's date)".into(),
            parameters: vec![
                ParameterSchema::required("coin", "string", "Coin: ton, ada, btc, eth, sol or doge")
                    .with_example(serde_json::json!("btc")),
                ParameterSchema::optional("amount", "number", "Quantity bought")
                    .with_example(serde_json::json!(100)),
                ParameterSchema::optional("cost", "number", "Total paid in USD")
                    .with_example(serde_json::json!(500)),
                ParameterSchema::optional("entry", "string", "AMOUNT COST in one line")
                    .with_example(serde_json::json!("100 500")),
            ],
            mutates_state: true,
        }
    }

    async fn execute(&self, call: &CommandCall) -> ChatResult<CommandReply> {
        let coin = call
            .str_arg("coin")
            .ok_or_else(|| ChatError::Validation("Missing required parameter: coin".into()))?;

        let (amount, cost) = match call.str_arg("entry") {
            Some(entry) => parse_purchase_entry(entry)?,
            None => {
                let missing = || ChatError::Validation("Provide amount and cost, e.g. 100 500".into());
                let amount = call.number_arg("amount")?.ok_or_else(missing)?;
                let cost = call.number_arg("cost")?.ok_or_else(missing)?;
                (decimal_from_f64(amount)?, decimal_from_f64(cost)?)
            }
        };

        let today = Local::now().date_naive();
        let record = self.tracker.record_purchase(coin, amount, cost, today).await?;

        let emoji = find_coin(&record.coin).map_or("•", |c| c.emoji);
        let text = format!(
            "{} ✅ Added {} {} for ${:.2}",
            emoji,
            record.amount.normalize(),
            record.coin,
            record.cost.round_dp(2),
        );

        Ok(CommandReply::success("add_purchase", text).with_data(serde_json::to_value(&record)?))
    }
}
