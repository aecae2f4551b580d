use serde::{Deserialize, Serialize};

/// A price in minor currency units (cents, centimes, millimes-as-cents).
/// Integer arithmetic only; no floats anywhere near money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount_minor: i64,
    pub currency: String,
}

impl Money {
    pub fn new(amount_minor: i64, currency: &str) -> Self {
        Self {
            amount_minor,
            currency: currency.to_string(),
        }
    }

    pub fn zero(currency: &str) -> Self {
        Self::new(0, currency)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount_minor, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        let price = Money::new(5500, "EUR");
        assert_eq!(price.to_string(), "5500 EUR");
        assert_eq!(Money::zero("EUR").amount_minor, 0);
    }
}
