pub mod json_store;
pub mod memory;
pub mod schema;

use anyhow::Result;

pub use json_store::JsonStore;
pub use memory::MemoryStore;
pub use schema::{AttemptHistoryData, LedgerData};

/// Persistence used by the exam machine. Loads never fail: missing or corrupt
/// data reads as empty history. Saves report errors, which callers log and
/// otherwise ignore.
pub trait StoragePort {
    fn load_ledger(&self) -> LedgerData;
    fn save_ledger(&self, data: &LedgerData) -> Result<()>;
    fn load_attempts(&self) -> AttemptHistoryData;
    fn save_attempts(&self, data: &AttemptHistoryData) -> Result<()>;
}
