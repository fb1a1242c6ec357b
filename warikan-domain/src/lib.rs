#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod services;

pub use error::{ModelError, SettlementError};
pub use model::{
    Balance, CENT_SCALE, Currency, EPSILON, Expense, Member, MemberId, Money, Payment, Residual,
    SettlementRecord, SettlementStatus, Simplification, Split,
};
pub use services::{
    BalanceCalculator, CentQuantizer, ConversionRates, CurrencyOrchestrator, DebtSimplifier,
    SettlementValidator, SplitAllocator, compute_balances, group_by_currency, minimize_payments,
    minimize_payments_by_currency, minimize_payments_unified, unify_balances,
    validate_settlement,
};
