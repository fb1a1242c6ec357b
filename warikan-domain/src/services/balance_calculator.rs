use crate::model::{Balance, Currency, Expense, Member, MemberId, Money, SettlementRecord};
use fxhash::FxHashMap;
use indexmap::IndexMap;
use std::collections::BTreeMap;

type MemberBalances = IndexMap<MemberId, Money>;

/// Folds the expense and settlement ledgers into per-member net balances.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// One balance per member for every currency that appears in the ledger.
    ///
    /// Balances come out ordered by currency, then by roster order. Members
    /// referenced by the ledger but missing from the roster are appended after
    /// the roster with their id as display name.
    pub fn compute(
        &self,
        members: &[Member],
        expenses: &[Expense],
        settlements: &[SettlementRecord],
    ) -> Vec<Balance> {
        let mut ledgers: BTreeMap<Currency, MemberBalances> = BTreeMap::new();

        for expense in expenses {
            let balances = ledgers
                .entry(expense.currency.clone())
                .or_insert_with(|| roster(members));
            apply(balances, &expense.paid_by, expense.amount);
            for split in &expense.splits {
                apply(balances, &split.member, -split.amount);
            }
        }

        for settlement in settlements.iter().filter(|s| s.status.is_completed()) {
            let balances = ledgers
                .entry(settlement.currency.clone())
                .or_insert_with(|| roster(members));
            apply(balances, &settlement.from, settlement.amount);
            apply(balances, &settlement.to, -settlement.amount);
        }

        let names: FxHashMap<&MemberId, &str> = members
            .iter()
            .map(|member| (&member.id, member.display_name.as_str()))
            .collect();

        let mut result = Vec::with_capacity(ledgers.len() * members.len());
        for (currency, balances) in ledgers {
            for (member, net) in balances {
                let display_name = names
                    .get(&member)
                    .map_or_else(|| member.to_string(), |name| (*name).to_string());
                result.push(Balance {
                    member,
                    display_name,
                    net,
                    currency: currency.clone(),
                });
            }
        }

        tracing::debug!(
            member_count = members.len(),
            expense_count = expenses.len(),
            settlement_count = settlements.len(),
            balance_count = result.len(),
            "Balances computed"
        );

        result
    }
}

pub fn compute_balances(
    members: &[Member],
    expenses: &[Expense],
    settlements: &[SettlementRecord],
) -> Vec<Balance> {
    BalanceCalculator.compute(members, expenses, settlements)
}

fn roster(members: &[Member]) -> MemberBalances {
    members
        .iter()
        .map(|member| (member.id.clone(), Money::ZERO))
        .collect()
}

fn apply(balances: &mut MemberBalances, member: &MemberId, delta: Money) {
    if let Some(balance) = balances.get_mut(member) {
        *balance += delta;
        return;
    }
    tracing::warn!(member = %member, "Ledger references a member outside the roster");
    balances.insert(member.clone(), delta);
}
