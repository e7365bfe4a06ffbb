use std::fmt;
use std::str::FromStr;

/// Possible errors to occur while reading a currency value
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Expected a value with exactly two fractional digits, found `{0}`")]
    InvalidFormat(String),
    #[error("The value `{0}` is too large")]
    Overflow(String),
}

/// A currency value, stored as an integer amount of cents
///
/// Every value read from a ledger has exactly two fractional digits, so
/// storing cents keeps all sums and products exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a value from an amount of cents
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// The value in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Multiplies a unit price by a quantity
    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Self(self.0.saturating_add(other.0))
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    /// Parses `<digits>.<two digits>`, e.g. `12.50`
    ///
    /// Signs, exponents, thousands separators and any other number of
    /// fractional digits are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MoneyError::InvalidFormat(s.to_owned());

        let (major, minor) = s.split_once('.').ok_or_else(invalid)?;
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(major) || !all_digits(minor) || minor.len() != 2 {
            return Err(invalid());
        }

        let overflow = || MoneyError::Overflow(s.to_owned());
        let major: i64 = major.parse().map_err(|_| overflow())?;
        let minor: i64 = minor.parse().map_err(|_| invalid())?;

        major
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(minor))
            .map(Self)
            .ok_or_else(overflow)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl serde::Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        serializer.collect_str(self)
    }
}
