#![warn(clippy::uninlined_format_args)]

pub mod ledger_source;
pub mod rate_table;

pub use ledger_source::JsonLedgerSource;
pub use rate_table::{RateTable, RateTableError};
