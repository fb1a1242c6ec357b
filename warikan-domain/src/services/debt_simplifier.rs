use crate::{
    error::SettlementError,
    model::{Balance, Currency, MemberId, Money, Payment, Residual, Simplification},
    services::CentQuantizer,
};
use indexmap::IndexMap;

struct Position<'a> {
    member: &'a MemberId,
    remaining: Money,
}

/// Greedy largest-first matching of creditors against debtors.
pub struct DebtSimplifier;

impl DebtSimplifier {
    /// Computes the payments that settle a single-currency balance list.
    ///
    /// Balances for the same member are merged first, then rounded to cents
    /// with the zero-sum repair of [`CentQuantizer`], so matching runs on exact
    /// cents and every member ends within a cent of settled. Creditors and
    /// debtors are each sorted by descending magnitude with a stable sort, so
    /// equal amounts keep their input order.
    pub fn minimize(&self, balances: &[Balance]) -> Result<Simplification, SettlementError> {
        let Some(first) = balances.first() else {
            return Ok(Simplification::default());
        };
        if let Some(other) = balances.iter().find(|b| b.currency != first.currency) {
            return Err(SettlementError::MixedCurrencies {
                expected: first.currency.clone(),
                found: other.currency.clone(),
            });
        }
        Ok(self.settle_currency(&first.currency, balances))
    }

    /// Caller guarantees every balance is denominated in `currency`.
    pub(crate) fn settle_currency(
        &self,
        currency: &Currency,
        balances: &[Balance],
    ) -> Simplification {
        let mut net: IndexMap<&MemberId, Money> = IndexMap::with_capacity(balances.len());
        for balance in balances {
            *net.entry(&balance.member).or_insert(Money::ZERO) += balance.net;
        }
        let amounts: Vec<Money> = net.values().copied().collect();
        let quantized = CentQuantizer.quantize_amounts(&amounts);

        let mut creditors = Vec::new();
        let mut debtors = Vec::new();
        for (member, amount) in net.into_keys().zip(quantized) {
            if amount.is_settled() {
                continue;
            }
            if amount.is_positive() {
                creditors.push(Position {
                    member,
                    remaining: amount,
                });
            } else {
                debtors.push(Position {
                    member,
                    remaining: -amount,
                });
            }
        }

        creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
        debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

        let mut payments = Vec::with_capacity((creditors.len() + debtors.len()).saturating_sub(1));
        let mut creditor_idx = 0;
        let mut debtor_idx = 0;

        while creditor_idx < creditors.len() && debtor_idx < debtors.len() {
            let creditor = &mut creditors[creditor_idx];
            let debtor = &mut debtors[debtor_idx];

            let amount = creditor.remaining.min(debtor.remaining);
            if !amount.is_settled() {
                payments.push(Payment::suggested(
                    debtor.member.clone(),
                    creditor.member.clone(),
                    amount,
                    currency.clone(),
                ));
            }

            creditor.remaining -= amount;
            debtor.remaining -= amount;

            if creditor.remaining.is_settled() {
                creditor_idx += 1;
            }
            if debtor.remaining.is_settled() {
                debtor_idx += 1;
            }
        }

        let residuals: Vec<Residual> = creditors[creditor_idx..]
            .iter()
            .map(|position| (position, position.remaining))
            .chain(
                debtors[debtor_idx..]
                    .iter()
                    .map(|position| (position, -position.remaining)),
            )
            .map(|(position, amount)| Residual {
                member: position.member.clone(),
                currency: currency.clone(),
                amount,
            })
            .collect();

        let simplification = Simplification {
            payments,
            residuals,
        };

        if simplification.is_complete() {
            tracing::debug!(
                currency = %currency,
                creditor_count = creditors.len(),
                debtor_count = debtors.len(),
                payment_count = simplification.payments.len(),
                "Debt simplification finished"
            );
        } else {
            tracing::warn!(
                currency = %currency,
                creditor_count = creditors.len(),
                debtor_count = debtors.len(),
                payment_count = simplification.payments.len(),
                residual_count = simplification.residuals.len(),
                unmatched = %simplification.unmatched_total(),
                "Balances do not sum to zero; unmatched amounts remain"
            );
        }

        simplification
    }
}

pub fn minimize_payments(balances: &[Balance]) -> Result<Simplification, SettlementError> {
    DebtSimplifier.minimize(balances)
}
