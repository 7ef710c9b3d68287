//! Supported coins
//!
//! The coin set is fixed. Adding a coin means adding a row here.

use serde::Serialize;

/// Static description of one supported coin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CoinSpec {
    /// Key used in price maps and commands (e.g. "btc")
    pub symbol_key: &'static str,

    /// Identifier on the historical-data provider (e.g. "bitcoin")
    pub external_id: &'static str,

    /// Human-readable name
    pub display_name: &'static str,

    /// Spot ticker symbol on the exchange (e.g. "BTCUSDT")
    pub ticker_symbol: &'static str,

    /// Emoji used when rendering replies
    pub emoji: &'static str,
}

impl CoinSpec {
    /// Upper-cased symbol, as stored in the ledger
    pub fn symbol(&self) -> String {
        self.symbol_key.to_uppercase()
    }
}

pub const SUPPORTED_COINS: [CoinSpec; 6] = [
    CoinSpec {
        symbol_key: "ton",
        external_id: "the-open-network",
        display_name: "TON",
        ticker_symbol: "TONUSDT",
        emoji: "💎",
    },
    CoinSpec {
        symbol_key: "ada",
        external_id: "cardano",
        display_name: "Cardano",
        ticker_symbol: "ADAUSDT",
        emoji: "🐳",
    },
    CoinSpec {
        symbol_key: "btc",
        external_id: "bitcoin",
        display_name: "Bitcoin",
        ticker_symbol: "BTCUSDT",
        emoji: "₿",
    },
    CoinSpec {
        symbol_key: "eth",
        external_id: "ethereum",
        display_name: "Ethereum",
        ticker_symbol: "ETHUSDT",
        emoji: "⧫",
    },
    CoinSpec {
        symbol_key: "sol",
        external_id: "solana",
        display_name: "Solana",
        ticker_symbol: "SOLUSDT",
        emoji: "🔥",
    },
    CoinSpec {
        symbol_key: "doge",
        external_id: "dogecoin",
        display_name: "Dogecoin",
        ticker_symbol: "DOGEUSDT",
        emoji: "🐶",
    },
];

/// Look up a coin by key, case-insensitively ("BTC" and "btc" both match)
pub fn find_coin(key: &str) -> Option<&'static CoinSpec> {
    let key = key.trim();
    SUPPORTED_COINS
        .iter()
        .find(|c| c.symbol_key.eq_ignore_ascii_case(key))
}
