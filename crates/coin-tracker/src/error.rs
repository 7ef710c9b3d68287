//! Error Types for Coin Tracker

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Unexpected HTTP status {status} for {coin}")]
    HttpStatus {
        coin: String,
        status: u16,
    },

    #[error("Exchange rejected request for {coin}: code {code} ({message})")]
    ApiRejected {
        coin: String,
        code: i64,
        message: String,
    },

    #[error("No ticker result for {0}")]
    NoResult(String),

    #[error("Malformed response for {coin}: {reason}")]
    MalformedResponse {
        coin: String,
        reason: String,
    },

    #[error("Price unavailable for {0}")]
    PriceUnavailable(String),

    #[error("Not enough history: need {needed} points, have {available}")]
    InsufficientHistory {
        needed: usize,
        available: usize,
    },

    #[error("Series length mismatch: {prices} prices vs {volumes} volumes")]
    SeriesMismatch {
        prices: usize,
        volumes: usize,
    },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Coin not supported: {0}")]
    UnsupportedCoin(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    /// Whether a ticker fetch that failed this way is worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TrackerError::HttpStatus { .. }
                | TrackerError::ApiRejected { .. }
                | TrackerError::NoResult(_)
                | TrackerError::MalformedResponse { .. }
                | TrackerError::Network(_)
                | TrackerError::Serialization(_)
        )
    }

    /// Message suitable for a chat reply
    pub fn user_message(&self) -> String {
        match self {
            TrackerError::InvalidInput(msg) => format!("❌ {}", msg),
            TrackerError::UnsupportedCoin(coin) => format!("❌ Coin '{}' is not supported", coin),
            TrackerError::PriceUnavailable(_) => "❌ Unable to fetch prices. Please try again later.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<TrackerError> for chat_core::ChatError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::InvalidInput(msg) => chat_core::ChatError::Validation(msg),
            TrackerError::UnsupportedCoin(coin) => {
                chat_core::ChatError::Validation(format!("Coin '{}' is not supported", coin))
            }
            TrackerError::PriceUnavailable(coin) => chat_core::ChatError::Unavailable(coin),
            other => chat_core::ChatError::Execution(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failures_are_retryable() {
        assert!(TrackerError::NoResult("btc".into()).is_retryable());
        assert!(TrackerError::HttpStatus { coin: "btc".into(), status: 502 }.is_retryable());
        assert!(!TrackerError::InvalidInput("amount".into()).is_retryable());
        assert!(!TrackerError::UnsupportedCoin("xrp".into()).is_retryable());
    }

    #[test]
    fn test_input_errors_map_to_validation() {
        let chat: chat_core::ChatError = TrackerError::InvalidInput("bad amount".into()).into();
        assert!(matches!(chat, chat_core::ChatError::Validation(_)));
    }
}
