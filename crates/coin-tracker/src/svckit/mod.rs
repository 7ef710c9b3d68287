//! Service Kit - Chat Commands
//!
//! Tracker operations exposed as `chat_core::Command`s.

mod portfolio_tracker;
mod price_lookup;
mod profit_forecast;
mod purchase_history;
mod purchase_recorder;

pub use portfolio_tracker::PortfolioCommand;
pub use price_lookup::PriceLookupCommand;
pub use profit_forecast::ForecastCommand;
pub use purchase_history::HistoryCommand;
pub use purchase_recorder::AddPurchaseCommand;

use std::sync::Arc;

use chat_core::CommandRegistry;

use crate::service::Tracker;

/// Register every tracker command
pub fn register_all(registry: &mut CommandRegistry, tracker: &Arc<Tracker>) {
    registry.register(PriceLookupCommand::new(Arc::clone(tracker)));
    registry.register(PortfolioCommand::new(Arc::clone(tracker)));
    registry.register(HistoryCommand::new(Arc::clone(tracker)));
    registry.register(AddPurchaseCommand::new(Arc::clone(tracker)));
    registry.register(ForecastCommand::new(Arc::clone(tracker)));
}
