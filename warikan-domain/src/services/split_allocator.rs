use crate::{
    error::ModelError,
    model::{CENT_SCALE, MemberId, Money, Split},
};
use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Turns an expense amount into per-member splits that sum exactly to it.
pub struct SplitAllocator;

impl SplitAllocator {
    pub fn even(&self, amount: Money, members: &[MemberId]) -> Result<Vec<Split>, ModelError> {
        let weights: Vec<(MemberId, u32)> =
            members.iter().map(|member| (member.clone(), 1)).collect();
        self.by_weights(amount, &weights)
    }

    /// Each member receives the floor of their proportional cent share; the
    /// leftover cents go one each to weighted members in input order.
    pub fn by_weights(
        &self,
        amount: Money,
        weights: &[(MemberId, u32)],
    ) -> Result<Vec<Split>, ModelError> {
        let total_weight: i128 = weights.iter().map(|(_, weight)| i128::from(*weight)).sum();
        if total_weight == 0 {
            return Err(ModelError::EmptySplit);
        }

        let cents = to_cents(amount)?;
        let sign = cents.signum();
        let magnitude = cents.abs();

        let mut shares: Vec<i128> = weights
            .iter()
            .map(|(_, weight)| magnitude * i128::from(*weight) / total_weight)
            .collect();

        let allocated: i128 = shares.iter().sum();
        let mut remainder = magnitude - allocated;
        for (share, (_, weight)) in shares.iter_mut().zip(weights) {
            if remainder == 0 {
                break;
            }
            if *weight > 0 {
                *share += 1;
                remainder -= 1;
            }
        }
        debug_assert_eq!(remainder, 0);

        weights
            .iter()
            .zip(shares)
            .map(|((member, _), share)| {
                let units = i64::try_from(share * sign)
                    .map_err(|_| ModelError::AmountOutOfRange(amount))?;
                Ok(Split {
                    member: member.clone(),
                    amount: Money::new(units, CENT_SCALE),
                })
            })
            .collect()
    }
}

fn to_cents(amount: Money) -> Result<i128, ModelError> {
    amount
        .round_cents()
        .as_decimal()
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i128())
        .ok_or(ModelError::AmountOutOfRange(amount))
}
