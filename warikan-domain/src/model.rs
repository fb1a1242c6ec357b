use crate::{error::ModelError, services::SplitAllocator};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

/// Decimal places every emitted payment is rounded to.
pub const CENT_SCALE: u32 = 2;

/// Tolerance below which an amount counts as zero (one cent).
pub const EPSILON: Money = Money(Decimal::from_parts(1, 0, 0, false, CENT_SCALE));

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(units: i64, scale: u32) -> Self {
        Self(Decimal::new(units, scale))
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// True when the amount is within one cent of zero.
    pub fn is_settled(self) -> bool {
        self.abs() < EPSILON
    }

    /// Rounds to cents, half away from zero.
    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(CENT_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Multiplies by an exchange rate, `None` on overflow.
    pub fn convert(self, rate: Decimal) -> Option<Self> {
        self.0.checked_mul(rate).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Money {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self)
            .map_err(|_| ModelError::InvalidAmount(s.to_string()))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(SmolStr);

impl MemberId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISO-like currency code, upper-cased at construction.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(SmolStr);

impl Currency {
    const MAX_LEN: usize = 8;

    pub fn new(code: &str) -> Result<Self, ModelError> {
        let code = code.trim();
        if code.is_empty()
            || code.len() > Self::MAX_LEN
            || !code.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(ModelError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(SmolStr::new(code.to_ascii_uppercase())))
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl FromStr for Currency {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// One member's net position in one currency.
///
/// Positive means the member is owed money, negative means they owe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub member: MemberId,
    pub display_name: String,
    pub net: Money,
    pub currency: Currency,
}

impl Balance {
    pub fn new(
        member: impl Into<MemberId>,
        display_name: impl Into<String>,
        net: Money,
        currency: Currency,
    ) -> Self {
        Self {
            member: member.into(),
            display_name: display_name.into(),
            net,
            currency,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.net.is_settled()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub member: MemberId,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default)]
    pub description: String,
    pub amount: Money,
    pub currency: Currency,
    pub paid_by: MemberId,
    pub splits: Vec<Split>,
}

impl Expense {
    /// Builds an expense shared evenly by `participants`, cent remainders
    /// going to the earliest participants.
    pub fn split_evenly(
        description: impl Into<String>,
        amount: Money,
        currency: Currency,
        paid_by: MemberId,
        participants: &[MemberId],
    ) -> Result<Self, ModelError> {
        let splits = SplitAllocator.even(amount, participants)?;
        Ok(Self {
            description: description.into(),
            amount: amount.round_cents(),
            currency,
            paid_by,
            splits,
        })
    }

    pub fn split_total(&self) -> Money {
        self.splits.iter().map(|split| split.amount).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Completed,
    Cancelled,
}

impl SettlementStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A recorded transfer between two members.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    pub currency: Currency,
    pub status: SettlementStatus,
}

/// A suggested single-currency transfer from a debtor to a creditor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Payment {
    from: MemberId,
    to: MemberId,
    amount: Money,
    currency: Currency,
}

impl Payment {
    pub fn new(
        from: MemberId,
        to: MemberId,
        amount: Money,
        currency: Currency,
    ) -> Result<Self, ModelError> {
        if from == to {
            return Err(ModelError::SelfPayment(from));
        }
        let amount = amount.round_cents();
        if !amount.is_positive() {
            return Err(ModelError::NonPositiveAmount(amount));
        }
        Ok(Self {
            from,
            to,
            amount,
            currency,
        })
    }

    /// Caller guarantees distinct members and an amount of at least one cent.
    pub(crate) fn suggested(
        from: MemberId,
        to: MemberId,
        amount: Money,
        currency: Currency,
    ) -> Self {
        debug_assert!(from != to);
        debug_assert!(amount.is_positive());
        Self {
            from,
            to,
            amount: amount.round_cents(),
            currency,
        }
    }

    pub fn from(&self) -> &MemberId {
        &self.from
    }

    pub fn to(&self) -> &MemberId {
        &self.to
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn into_record(self, status: SettlementStatus) -> SettlementRecord {
        SettlementRecord {
            from: self.from,
            to: self.to,
            amount: self.amount,
            currency: self.currency,
            status,
        }
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {:.2} {}",
            self.from, self.to, self.amount, self.currency
        )
    }
}

/// Amount the simplifier could not match, signed like the balance it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Residual {
    pub member: MemberId,
    pub currency: Currency,
    pub amount: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Simplification {
    pub payments: Vec<Payment>,
    pub residuals: Vec<Residual>,
}

impl Simplification {
    pub fn is_complete(&self) -> bool {
        self.residuals.is_empty()
    }

    pub fn unmatched_total(&self) -> Money {
        self.residuals.iter().map(|residual| residual.amount.abs()).sum()
    }
}
