pub mod balance_calculator;
pub mod cent_quantizer;
pub mod conversion;
pub mod currency_orchestrator;
pub mod debt_simplifier;
pub mod settlement_validator;
pub mod split_allocator;

pub use balance_calculator::{BalanceCalculator, compute_balances};
pub use cent_quantizer::CentQuantizer;
pub use conversion::ConversionRates;
pub use currency_orchestrator::{
    CurrencyOrchestrator, group_by_currency, minimize_payments_by_currency,
    minimize_payments_unified, unify_balances,
};
pub use debt_simplifier::{DebtSimplifier, minimize_payments};
pub use settlement_validator::{SettlementValidator, validate_settlement};
pub use split_allocator::SplitAllocator;
