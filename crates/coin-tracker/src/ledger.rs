//! Purchase Ledger
//!
//! Append-only list of purchases, mirrored to a JSON file:
//!
//! ```json
//! {
//!     "purchases": [
//!         { "coin": "BTC", "amount": 0.5, "cost": 20000.0, "date": "2024-05-01" }
//!     ]
//! }
//! ```
//!
//! A missing or unreadable file loads as an empty ledger. Failed saves are
//! logged and leave the in-memory ledger intact.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::model::PurchaseRecord;

#[derive(Debug, Default, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    purchases: Vec<PurchaseRecord>,
}

/// Purchase records backed by a JSON file
pub struct Ledger {
    path: PathBuf,
    records: RwLock<Vec<PurchaseRecord>>,
}

impl Ledger {
    /// Open the ledger at `path`, starting empty if it cannot be read
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let records = match read_file(&path).await {
            Ok(records) => {
                tracing::info!(path = %path.display(), purchases = records.len(), "Ledger loaded");
                records
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Starting with an empty ledger");
                Vec::new()
            }
        };

        Self {
            path,
            records: RwLock::new(records),
        }
    }

    /// Append a purchase and persist the whole ledger.
    /// Returns the number of recorded purchases.
    pub async fn record_purchase(&self, record: PurchaseRecord) -> usize {
        let mut records = self.records.write().await;
        tracing::info!(
            coin = %record.coin,
            amount = %record.amount,
            cost = %record.cost,
            "Purchase recorded"
        );
        records.push(record);

        // Written under the lock so the file always reflects the latest append
        if let Err(err) = write_file(&self.path, &records).await {
            tracing::error!(path = %self.path.display(), error = %err, "Failed to save ledger");
        }

        records.len()
    }

    /// All purchases in the order they were recorded
    pub async fn list_purchases(&self) -> Vec<PurchaseRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

async fn read_file(path: &Path) -> Result<Vec<PurchaseRecord>> {
    let bytes = tokio::fs::read(path).await?;
    let file: LedgerFile = serde_json::from_slice(&bytes)?;
    Ok(file.purchases)
}

async fn write_file(path: &Path, records: &[PurchaseRecord]) -> Result<()> {
    let bytes = encode(records)?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Pretty JSON with a 4-space indent
fn encode(records: &[PurchaseRecord]) -> Result<Vec<u8>> {
    #[derive(Serialize)]
    struct LedgerFileRef<'a> {
        purchases: &'a [PurchaseRecord],
    }

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    LedgerFileRef { purchases: records }.serialize(&mut serializer)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::load(dir.path().join("portfolio.json")).await;
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        std::fs::write(&path, "{ not json").unwrap();

        let ledger = Ledger::load(&path).await;
        assert!(ledger.list_purchases().await.is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        let purchases = vec![
            PurchaseRecord::new("btc", dec!(0.5), dec!(20000), day(1)),
            PurchaseRecord::new("ETH", dec!(2), dec!(6000.5), day(2)),
            PurchaseRecord::new("doge", dec!(1000), dec!(0), day(3)),
        ];

        let ledger = Ledger::load(&path).await;
        for record in &purchases {
            ledger.record_purchase(record.clone()).await;
        }

        let reloaded = Ledger::load(&path).await;
        assert_eq!(reloaded.list_purchases().await, purchases);
        assert_eq!(reloaded.list_purchases().await[2].coin, "DOGE");
    }

    #[tokio::test]
    async fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.json");

        let ledger = Ledger::load(&path).await;
        ledger
            .record_purchase(PurchaseRecord::new("ton", dec!(100), dec!(500), day(7)))
            .await;

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"purchases\": [\n        {"));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let entry = &value["purchases"][0];
        assert_eq!(entry["coin"], "TON");
        assert_eq!(entry["amount"], 100.0);
        assert_eq!(entry["cost"], 500.0);
        assert_eq!(entry["date"], "2024-05-07");
    }

    #[tokio::test]
    async fn test_reads_plain_float_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        std::fs::write(
            &path,
            r#"{"purchases": [{"coin": "ADA", "amount": 250.0, "cost": 99.99, "date": "2024-01-15"}]}"#,
        )
        .unwrap();

        let ledger = Ledger::load(&path).await;
        let purchases = ledger.list_purchases().await;
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].amount, dec!(250));
        assert_eq!(purchases[0].cost, dec!(99.99));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("portfolio.json");

        let ledger = Ledger::load(&path).await;
        let count = ledger
            .record_purchase(PurchaseRecord::new("sol", dec!(1), dec!(150), day(4)))
            .await;

        assert_eq!(count, 1);
        assert!(!path.exists());
    }
}
