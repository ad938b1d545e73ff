pub mod feedback;
pub mod ledger;
pub mod percentages;
pub mod scoring;
pub mod selection;
pub mod shuffle;

pub use ledger::{Category, HistoryLedger, HistoryRecord, LedgerBreakdown};
pub use percentages::PercentageConfig;
pub use scoring::{Outcome, ScoreSheet, Verdict};
pub use selection::select_questions;
pub use shuffle::{OptionOrder, OptionShuffler};
