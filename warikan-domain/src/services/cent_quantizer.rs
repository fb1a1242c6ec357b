//! Zero-sum rounding of balances to whole cents.
//!
//! Each balance is rounded half away from zero, then the group total is
//! restored to the rounded original total by moving single cents:
//! - rounded total too high: take a cent back from those who gained most
//! - rounded total too low: give a cent to those who lost most
//!
//! Ties keep input order.

use crate::model::{Balance, Currency, EPSILON, Money};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::collections::BTreeMap;

pub struct CentQuantizer;

impl CentQuantizer {
    pub fn quantize(&self, balances: &[Balance]) -> Vec<Balance> {
        let mut quantized = balances.to_vec();

        let mut groups: BTreeMap<&Currency, Vec<usize>> = BTreeMap::new();
        for (idx, balance) in balances.iter().enumerate() {
            groups.entry(&balance.currency).or_default().push(idx);
        }

        for (currency, indices) in groups {
            let nets: Vec<Money> = indices.iter().map(|&idx| balances[idx].net).collect();
            let repaired = self.quantize_amounts(&nets);
            for (&idx, net) in indices.iter().zip(repaired) {
                quantized[idx].net = net;
            }
            tracing::trace!(
                currency = %currency,
                member_count = indices.len(),
                "Balances quantized to cents"
            );
        }

        quantized
    }

    /// Rounds one currency's amounts to cents, keeping their total equal to
    /// the rounded original total.
    pub fn quantize_amounts(&self, amounts: &[Money]) -> Vec<Money> {
        let mut quantized: Vec<Money> = amounts.iter().copied().map(Money::round_cents).collect();

        let original_total: Money = amounts.iter().copied().sum();
        let rounded_total: Money = quantized.iter().copied().sum();
        let excess = rounded_total - original_total.round_cents();
        if excess.is_zero() {
            return quantized;
        }

        let steps = (excess.as_decimal().abs() * Decimal::ONE_HUNDRED)
            .to_usize()
            .unwrap_or(0);
        let mut candidates: Vec<(usize, Money)> = quantized
            .iter()
            .zip(amounts)
            .map(|(rounded, original)| *rounded - *original)
            .enumerate()
            .collect();
        let adjustment = if excess.is_positive() {
            candidates.sort_by(|a, b| b.1.cmp(&a.1));
            -EPSILON
        } else {
            candidates.sort_by(|a, b| a.1.cmp(&b.1));
            EPSILON
        };

        if steps > candidates.len() {
            tracing::warn!(
                steps,
                member_count = candidates.len(),
                "Rounding excess exceeds member count"
            );
        }
        for (idx, _) in candidates.iter().take(steps) {
            quantized[*idx] += adjustment;
        }

        tracing::debug!(
            excess = %excess,
            steps,
            member_count = amounts.len(),
            "Rounding excess redistributed"
        );

        quantized
    }
}
