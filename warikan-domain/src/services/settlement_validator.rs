use crate::model::{Balance, Currency, MemberId, Money, Payment, Residual};
use indexmap::IndexMap;

/// Checks that a payment list brings every balance back to zero.
pub struct SettlementValidator;

impl SettlementValidator {
    /// Returns every member whose balance is not settled once the payments
    /// are applied. Balances are tracked per member and currency.
    pub fn check(&self, balances: &[Balance], payments: &[Payment]) -> Vec<Residual> {
        let mut remaining: IndexMap<(&MemberId, &Currency), Money> =
            IndexMap::with_capacity(balances.len());

        for balance in balances {
            *remaining
                .entry((&balance.member, &balance.currency))
                .or_insert(Money::ZERO) += balance.net;
        }

        for payment in payments {
            *remaining
                .entry((payment.from(), payment.currency()))
                .or_insert(Money::ZERO) += payment.amount();
            *remaining
                .entry((payment.to(), payment.currency()))
                .or_insert(Money::ZERO) -= payment.amount();
        }

        remaining
            .into_iter()
            .filter(|(_, amount)| !amount.is_settled())
            .map(|((member, currency), amount)| Residual {
                member: member.clone(),
                currency: currency.clone(),
                amount,
            })
            .collect()
    }

    pub fn validate(&self, balances: &[Balance], payments: &[Payment]) -> bool {
        self.check(balances, payments).is_empty()
    }
}

pub fn validate_settlement(balances: &[Balance], payments: &[Payment]) -> bool {
    SettlementValidator.validate(balances, payments)
}
