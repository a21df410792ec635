use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Currency symbols bank exports put in front of amounts.
const CURRENCY_SYMBOLS: &[char] = &['$', '₱', '€', '£', '¥'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// `None` on overflow.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Sums `amounts`, or `None` if the total leaves the representable range.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |total, amount| total.checked_add(amount))
    }

    /// `self` as a percentage of `base`, or `None` when `base` is zero.
    pub fn percent_of(self, base: Money) -> Option<Decimal> {
        if base.is_zero() {
            return None;
        }
        self.0
            .checked_div(base.0)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| pct.round_dp(4))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a monetary amount: {0:?}")]
pub struct MoneyParseError(pub String);

impl FromStr for Money {
    type Err = MoneyParseError;

    /// Parses a locale-formatted amount such as `"₱1,234.56"`, `"PHP 500"`
    /// or `"(75.25)"`. Blank input is an error; see [`parse_credit`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, body) = match trimmed
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
        {
            Some(inner) => (true, inner.trim()),
            None => (false, trimmed),
        };
        let body = strip_currency_code(body);
        let cleaned: String = body
            .chars()
            .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}') && !CURRENCY_SYMBOLS.contains(c))
            .collect();
        if !cleaned.chars().any(|c| c.is_ascii_digit()) {
            return Err(MoneyParseError(s.to_string()));
        }
        let value = Decimal::from_str(&cleaned).map_err(|_| MoneyParseError(s.to_string()))?;
        let money = Money::from_decimal(value);
        Ok(if negative { -money } else { money })
    }
}

fn strip_currency_code(s: &str) -> &str {
    match s.get(..3) {
        Some(code) if code.eq_ignore_ascii_case("php") => s[3..].trim_start(),
        _ => s,
    }
}

/// Parses a bank statement credit cell. Blank cells are non-credit rows
/// (debits, fees) and count as zero; anything else must be an amount.
pub fn parse_credit(cell: &str) -> Result<Money, MoneyParseError> {
    if cell.trim().is_empty() {
        return Ok(Money::zero());
    }
    cell.parse()
}
