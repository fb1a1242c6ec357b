use crate::error::LedgerError;
use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use warikan_domain::{
    Balance, Currency, Expense, Member, MemberId, Payment, Residual, SettlementRecord,
};

/// Everything recorded for one group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub settlements: Vec<SettlementRecord>,
    #[serde(default)]
    pub base_currency: Option<Currency>,
}

impl Ledger {
    /// Rejects ledgers whose balances could not be conserved: unknown members,
    /// duplicate roster entries, splits that do not add up to the expense.
    pub fn check_integrity(&self) -> Result<(), LedgerError> {
        let mut roster: FxHashSet<&MemberId> = FxHashSet::default();
        for member in &self.members {
            if !roster.insert(&member.id) {
                return Err(LedgerError::DuplicateMember(member.id.clone()));
            }
        }

        for (index, expense) in self.expenses.iter().enumerate() {
            let referenced = std::iter::once(&expense.paid_by)
                .chain(expense.splits.iter().map(|split| &split.member));
            for member in referenced {
                if !roster.contains(member) {
                    return Err(LedgerError::UnknownMemberInExpense {
                        index,
                        member: member.clone(),
                    });
                }
            }

            let split_total = expense.split_total();
            if !(split_total - expense.amount).is_settled() {
                return Err(LedgerError::SplitMismatch {
                    index,
                    amount: expense.amount,
                    split_total,
                });
            }
        }

        for (index, settlement) in self.settlements.iter().enumerate() {
            for member in [&settlement.from, &settlement.to] {
                if !roster.contains(member) {
                    return Err(LedgerError::UnknownMemberInSettlement {
                        index,
                        member: member.clone(),
                    });
                }
            }
            if !settlement.amount.is_positive() {
                return Err(LedgerError::NonPositiveSettlement {
                    index,
                    amount: settlement.amount,
                });
            }
        }

        Ok(())
    }
}

/// How suggestions are computed across currencies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SettlementMode {
    /// Settle each currency on its own. Never converts.
    #[default]
    PerCurrency,
    /// Convert everything into `target` and settle once. Opt-in only.
    Unified { target: Currency },
}

/// Suggested payments together with the balances they settle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SettlementPlan {
    pub balances: Vec<Balance>,
    pub payments: BTreeMap<Currency, Vec<Payment>>,
    pub residuals: Vec<Residual>,
}

impl SettlementPlan {
    pub fn is_complete(&self) -> bool {
        self.residuals.is_empty()
    }

    pub fn payment_count(&self) -> usize {
        self.payments.values().map(Vec::len).sum()
    }

    pub fn all_payments(&self) -> impl Iterator<Item = &Payment> {
        self.payments.values().flatten()
    }
}
