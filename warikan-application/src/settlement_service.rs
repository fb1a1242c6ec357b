use crate::{
    error::ApplicationError,
    model::{Ledger, SettlementMode, SettlementPlan},
    ports::LedgerSource,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use warikan_domain::{
    Balance, BalanceCalculator, ConversionRates, Currency, CurrencyOrchestrator, DebtSimplifier,
    Payment, SettlementRecord, SettlementStatus, SettlementValidator, Simplification,
    group_by_currency,
};

/// Turns a group's ledger into suggested payments.
///
/// Collaborators are injected; the service holds no other state.
#[derive(Clone, Copy)]
pub struct SettlementService<'a> {
    source: &'a dyn LedgerSource,
    rates: Option<&'a dyn ConversionRates>,
}

impl<'a> SettlementService<'a> {
    pub fn new(source: &'a dyn LedgerSource) -> Self {
        Self {
            source,
            rates: None,
        }
    }

    pub fn with_rates(self, rates: &'a dyn ConversionRates) -> Self {
        Self {
            rates: Some(rates),
            ..self
        }
    }

    pub fn load(&self, group: &str) -> Result<Ledger, ApplicationError> {
        let ledger = self.source.load(group)?;
        ledger.check_integrity()?;
        Ok(ledger)
    }

    pub fn balances(&self, group: &str) -> Result<Vec<Balance>, ApplicationError> {
        let ledger = self.load(group)?;
        Ok(Self::ledger_balances(&ledger))
    }

    pub fn plan(
        &self,
        group: &str,
        mode: &SettlementMode,
    ) -> Result<SettlementPlan, ApplicationError> {
        let ledger = self.source.load(group)?;
        self.plan_ledger(&ledger, mode)
    }

    /// Computes suggestions for an already loaded ledger.
    ///
    /// A complete plan that still fails validation is rejected instead of
    /// being handed out.
    pub fn plan_ledger(
        &self,
        ledger: &Ledger,
        mode: &SettlementMode,
    ) -> Result<SettlementPlan, ApplicationError> {
        ledger.check_integrity()?;
        let balances = Self::ledger_balances(ledger);

        let settled: BTreeMap<Currency, (Vec<Balance>, Simplification)> = match mode {
            SettlementMode::PerCurrency => group_by_currency(&balances)
                .into_iter()
                .map(|(currency, group)| {
                    let simplification = DebtSimplifier.minimize(&group)?;
                    Ok((currency, (group, simplification)))
                })
                .collect::<Result<_, ApplicationError>>()?,
            SettlementMode::Unified { target } => {
                let rates = self.rates.ok_or(ApplicationError::RatesUnavailable)?;
                let rates = LedgerRates {
                    rates,
                    base: ledger.base_currency.as_ref(),
                };
                let unified =
                    CurrencyOrchestrator.unify(&group_by_currency(&balances), target, &rates)?;
                let simplification = DebtSimplifier.minimize(&unified)?;
                BTreeMap::from([(target.clone(), (unified, simplification))])
            }
        };

        let mut plan = SettlementPlan::default();
        for (currency, (group, simplification)) in settled {
            Self::guard(&currency, &group, &simplification)?;
            plan.balances.extend(group);
            plan.residuals.extend(simplification.residuals);
            if !simplification.payments.is_empty() {
                plan.payments.insert(currency, simplification.payments);
            }
        }

        tracing::info!(
            mode = ?mode,
            member_count = ledger.members.len(),
            currency_count = plan.payments.len(),
            payment_count = plan.payment_count(),
            residual_count = plan.residuals.len(),
            "Settlement plan ready"
        );

        Ok(plan)
    }

    /// Marks suggested payments as paid so they can be appended to the ledger.
    pub fn mark_paid(payments: impl IntoIterator<Item = Payment>) -> Vec<SettlementRecord> {
        payments
            .into_iter()
            .map(|payment| payment.into_record(SettlementStatus::Completed))
            .collect()
    }

    fn ledger_balances(ledger: &Ledger) -> Vec<Balance> {
        BalanceCalculator.compute(&ledger.members, &ledger.expenses, &ledger.settlements)
    }

    fn guard(
        currency: &Currency,
        balances: &[Balance],
        simplification: &Simplification,
    ) -> Result<(), ApplicationError> {
        if !simplification.is_complete() {
            return Ok(());
        }
        let residuals = SettlementValidator.check(balances, &simplification.payments);
        if residuals.is_empty() {
            return Ok(());
        }
        tracing::error!(
            currency = %currency,
            residual_count = residuals.len(),
            "Suggested payments failed validation"
        );
        Err(ApplicationError::ValidationFailed {
            currency: currency.clone(),
            residuals,
        })
    }
}

/// Injected quotes, falling back to the ledger's base currency for two-hop
/// paths when the quotes name none.
struct LedgerRates<'a> {
    rates: &'a dyn ConversionRates,
    base: Option<&'a Currency>,
}

impl ConversionRates for LedgerRates<'_> {
    fn base_currency(&self) -> Option<&Currency> {
        self.rates.base_currency().or(self.base)
    }

    fn direct_rate(&self, from: &Currency, to: &Currency) -> Option<Decimal> {
        self.rates.direct_rate(from, to)
    }
}
