use crate::model::{Currency, MemberId, Money};
use thiserror::Error;

/// Rejections raised while constructing model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Invalid currency code {0:?}")]
    InvalidCurrency(String),
    #[error("Invalid amount {0:?}")]
    InvalidAmount(String),
    #[error("Amount must be positive (found {0})")]
    NonPositiveAmount(Money),
    #[error("Amount {0} cannot be represented in cents")]
    AmountOutOfRange(Money),
    #[error("Member {0} cannot pay themselves")]
    SelfPayment(MemberId),
    #[error("Split needs at least one participant with a non-zero weight")]
    EmptySplit,
}

/// Failures of the settlement engine itself.
///
/// Unconserved balances are not an error: they surface as residuals on the
/// returned simplification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("Balances span multiple currencies ({expected} and {found})")]
    MixedCurrencies { expected: Currency, found: Currency },
    #[error("No conversion rate from {from} to {to}")]
    MissingRate { from: Currency, to: Currency },
    #[error("Converting {amount} {from} to {to} overflowed")]
    ConversionOverflow {
        amount: Money,
        from: Currency,
        to: Currency,
    },
}
