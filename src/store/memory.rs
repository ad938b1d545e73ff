use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::store::StoragePort;
use crate::store::schema::{AttemptHistoryData, LedgerData};

#[derive(Debug, Default)]
struct Inner {
    ledger: LedgerData,
    attempts: AttemptHistoryData,
    fail_saves: bool,
    saves: usize,
}

/// In-process store. Clones share the same state, so a test can keep a handle
/// while the machine owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose saves always fail.
    pub fn failing() -> Self {
        let store = Self::default();
        store.inner.borrow_mut().fail_saves = true;
        store
    }

    pub fn ledger(&self) -> LedgerData {
        self.inner.borrow().ledger.clone()
    }

    pub fn attempts(&self) -> AttemptHistoryData {
        self.inner.borrow().attempts.clone()
    }

    /// Number of successful saves across both documents.
    pub fn save_count(&self) -> usize {
        self.inner.borrow().saves
    }
}

impl StoragePort for MemoryStore {
    fn load_ledger(&self) -> LedgerData {
        self.ledger()
    }

    fn save_ledger(&self, data: &LedgerData) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_saves {
            bail!("memory store is read-only");
        }
        inner.ledger = data.clone();
        inner.saves += 1;
        Ok(())
    }

    fn load_attempts(&self) -> AttemptHistoryData {
        self.attempts()
    }

    fn save_attempts(&self, data: &AttemptHistoryData) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_saves {
            bail!("memory store is read-only");
        }
        inner.attempts = data.clone();
        inner.saves += 1;
        Ok(())
    }
}
