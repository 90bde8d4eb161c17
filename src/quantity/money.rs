use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Currency {
    /// Pound sterling, reported by the API in pence.
    Gbp,

    /// Japanese yen, reported by the API in whole yen.
    Jpy,
}

impl Currency {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Gbp => "£",
            Self::Jpy => "¥",
        }
    }

    /// Number of minor units in one major unit.
    pub const fn minor_units(self) -> f64 {
        match self {
            Self::Gbp => 100.0,
            Self::Jpy => 1.0,
        }
    }

    const fn precision(self) -> usize {
        match self {
            Self::Gbp => 2,
            Self::Jpy => 0,
        }
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Money {
    /// Amount in major units.
    pub amount: f64,

    pub currency: Currency,
}

impl Money {
    pub const fn new(amount: f64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn from_minor_units(minor: f64, currency: Currency) -> Self {
        Self { amount: minor / currency.minor_units(), currency }
    }

    pub const fn abs(self) -> Self {
        Self { amount: self.amount.abs(), currency: self.currency }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.amount < 0.0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}{:.precision$}",
            self.currency.symbol(),
            self.amount.abs(),
            precision = self.currency.precision(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_gbp() {
        assert_eq!(Money::from_minor_units(1234.0, Currency::Gbp).to_string(), "£12.34");
        assert_eq!(Money::new(-5.5, Currency::Gbp).to_string(), "-£5.50");
    }

    #[test]
    fn test_display_jpy() {
        assert_eq!(Money::from_minor_units(4321.0, Currency::Jpy).to_string(), "¥4321");
    }
}
