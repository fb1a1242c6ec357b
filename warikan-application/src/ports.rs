use crate::{error::LedgerSourceError, model::Ledger};

/// Supplies the expense and settlement ledgers of a group.
pub trait LedgerSource: Send + Sync {
    fn load(&self, group: &str) -> Result<Ledger, LedgerSourceError>;
}
