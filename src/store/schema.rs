use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::ledger::HistoryLedger;
use crate::session::result::AttemptSummary;

const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerData {
    pub schema_version: u32,
    #[serde(default)]
    pub ledger: HistoryLedger,
}

impl Default for LedgerData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ledger: HistoryLedger::default(),
        }
    }
}

impl LedgerData {
    pub fn new(ledger: HistoryLedger) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ledger,
        }
    }

    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptHistoryData {
    pub schema_version: u32,
    #[serde(default)]
    pub attempts: Vec<AttemptSummary>,
}

impl Default for AttemptHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            attempts: Vec::new(),
        }
    }
}

impl AttemptHistoryData {
    pub fn new(attempts: Vec<AttemptSummary>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            attempts,
        }
    }

    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub examsim_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub ledger: LedgerData,
    pub attempts: AttemptHistoryData,
}
