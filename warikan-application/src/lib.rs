#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod settlement_service;

pub use error::{ApplicationError, LedgerError, LedgerSourceError};
pub use model::{Ledger, SettlementMode, SettlementPlan};
pub use ports::LedgerSource;
pub use settlement_service::SettlementService;
