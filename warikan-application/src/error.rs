use thiserror::Error;
use warikan_domain::{Currency, MemberId, Money, Residual, SettlementError};

/// Data-integrity problems found in a ledger before any balance is computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Member {0} is declared more than once")]
    DuplicateMember(MemberId),
    #[error("Expense #{index} references unknown member {member}")]
    UnknownMemberInExpense { index: usize, member: MemberId },
    #[error("Settlement #{index} references unknown member {member}")]
    UnknownMemberInSettlement { index: usize, member: MemberId },
    #[error("Expense #{index} splits add up to {split_total}, expected {amount}")]
    SplitMismatch {
        index: usize,
        amount: Money,
        split_total: Money,
    },
    #[error("Settlement #{index} has a non-positive amount {amount}")]
    NonPositiveSettlement { index: usize, amount: Money },
}

#[derive(Debug, Error)]
pub enum LedgerSourceError {
    #[error("No ledger found for group {0}")]
    NotFound(String),
    #[error("Failed to read ledger for group {group}")]
    Unreadable {
        group: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Source(#[from] LedgerSourceError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    #[error("Unified settlement requires a conversion-rate table")]
    RatesUnavailable,
    #[error("Suggested {currency} payments leave {} member(s) unsettled", .residuals.len())]
    ValidationFailed {
        currency: Currency,
        residuals: Vec<Residual>,
    },
}
