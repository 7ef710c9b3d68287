//! Application State

use std::sync::Arc;

use chat_core::CommandRegistry;
use coin_tracker::{Tracker, commands};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Prices, ledger and forecasts
    pub tracker: Arc<Tracker>,

    /// Chat commands backed by the tracker
    pub commands: Arc<CommandRegistry>,
}

impl AppState {
    /// Build state with every tracker command registered
    pub fn new(tracker: Arc<Tracker>) -> Self {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry, &tracker);

        Self {
            tracker,
            commands: Arc::new(registry),
        }
    }
}
