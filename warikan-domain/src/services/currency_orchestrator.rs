use crate::{
    error::SettlementError,
    model::{Balance, Currency, MemberId, Money, Simplification},
    services::{ConversionRates, DebtSimplifier},
};
use fxhash::FxHashMap;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Runs the simplifier across currencies.
///
/// Per-currency mode is the default and never converts. Unified mode converts
/// everything into one target currency first; it can introduce payments that
/// would not exist otherwise and must only run when the user opts in.
pub struct CurrencyOrchestrator;

impl CurrencyOrchestrator {
    pub fn by_currency(&self, balances: &[Balance]) -> BTreeMap<Currency, Simplification> {
        group_by_currency(balances)
            .into_iter()
            .map(|(currency, group)| {
                let simplification = DebtSimplifier.settle_currency(&currency, &group);
                (currency, simplification)
            })
            .collect()
    }

    /// Converts every balance into `target` and merges them per member,
    /// dropping members whose combined balance is settled.
    ///
    /// Fails as a whole when any source currency has no rate to `target`.
    pub fn unify(
        &self,
        balances_by_currency: &BTreeMap<Currency, Vec<Balance>>,
        target: &Currency,
        rates: &dyn ConversionRates,
    ) -> Result<Vec<Balance>, SettlementError> {
        let mut rate_cache: FxHashMap<&Currency, Decimal> = FxHashMap::default();
        let mut combined: IndexMap<&MemberId, Balance> = IndexMap::new();

        for balance in balances_by_currency.values().flatten() {
            let rate = match rate_cache.get(&balance.currency) {
                Some(rate) => *rate,
                None => {
                    let rate = rates.rate(&balance.currency, target).ok_or_else(|| {
                        tracing::error!(
                            from = %balance.currency,
                            to = %target,
                            "No conversion rate for unified settlement"
                        );
                        SettlementError::MissingRate {
                            from: balance.currency.clone(),
                            to: target.clone(),
                        }
                    })?;
                    rate_cache.insert(&balance.currency, rate);
                    rate
                }
            };

            let converted =
                balance
                    .net
                    .convert(rate)
                    .ok_or_else(|| SettlementError::ConversionOverflow {
                        amount: balance.net,
                        from: balance.currency.clone(),
                        to: target.clone(),
                    })?;

            combined
                .entry(&balance.member)
                .or_insert_with(|| Balance {
                    member: balance.member.clone(),
                    display_name: balance.display_name.clone(),
                    net: Money::ZERO,
                    currency: target.clone(),
                })
                .net += converted;
        }

        tracing::debug!(
            target_currency = %target,
            source_currency_count = balances_by_currency.len(),
            member_count = combined.len(),
            "Balances unified"
        );

        Ok(combined
            .into_values()
            .filter(|balance| !balance.is_settled())
            .collect())
    }

    pub fn unified(
        &self,
        balances_by_currency: &BTreeMap<Currency, Vec<Balance>>,
        target: &Currency,
        rates: &dyn ConversionRates,
    ) -> Result<Simplification, SettlementError> {
        let combined = self.unify(balances_by_currency, target, rates)?;
        Ok(DebtSimplifier.settle_currency(target, &combined))
    }
}

/// Groups balances by currency, keeping input order within each group.
pub fn group_by_currency(balances: &[Balance]) -> BTreeMap<Currency, Vec<Balance>> {
    let mut groups: BTreeMap<Currency, Vec<Balance>> = BTreeMap::new();
    for balance in balances {
        groups
            .entry(balance.currency.clone())
            .or_default()
            .push(balance.clone());
    }
    groups
}

pub fn minimize_payments_by_currency(balances: &[Balance]) -> BTreeMap<Currency, Simplification> {
    CurrencyOrchestrator.by_currency(balances)
}

pub fn unify_balances(
    balances_by_currency: &BTreeMap<Currency, Vec<Balance>>,
    target: &Currency,
    rates: &dyn ConversionRates,
) -> Result<Vec<Balance>, SettlementError> {
    CurrencyOrchestrator.unify(balances_by_currency, target, rates)
}

pub fn minimize_payments_unified(
    balances_by_currency: &BTreeMap<Currency, Vec<Balance>>,
    target: &Currency,
    rates: &dyn ConversionRates,
) -> Result<Simplification, SettlementError> {
    CurrencyOrchestrator.unified(balances_by_currency, target, rates)
}
