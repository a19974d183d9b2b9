pub mod json_backend;
pub mod memory;

use serde::{Deserialize, Serialize};

use crate::{errors::PersistenceError, ledger::Expense};

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Well-known slot the expense snapshot lives under.
pub const DEFAULT_STORAGE_KEY: &str = "expenses";

/// Abstraction over durable key-value slots holding serialized snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Returns the stored payload, or `None` when the slot has never been written.
    fn read(&self, key: &str) -> Result<Option<String>>;
    /// Overwrites the slot with `payload`.
    fn write(&self, key: &str, payload: &str) -> Result<()>;
}

/// Serializes expenses as a JSON array of flat records.
pub fn encode_expenses(expenses: &[Expense]) -> Result<String> {
    Ok(serde_json::to_string_pretty(expenses)?)
}

pub fn decode_expenses(payload: &str) -> Result<Vec<Expense>> {
    if payload.trim().is_empty() {
        return Err(PersistenceError::Corrupt("snapshot is empty".into()));
    }
    Ok(serde_json::from_str(payload)?)
}

/// Sibling slot recording the highest expense id ever issued under `key`.
pub fn id_watermark_key(key: &str) -> String {
    format!("{}-ids", key)
}

#[derive(Debug, Serialize, Deserialize)]
struct IdWatermark {
    last_issued: u64,
}

pub fn encode_id_watermark(last_issued: u64) -> Result<String> {
    Ok(serde_json::to_string(&IdWatermark { last_issued })?)
}

pub fn decode_id_watermark(payload: &str) -> Result<u64> {
    let watermark: IdWatermark = serde_json::from_str(payload)?;
    Ok(watermark.last_issued)
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
