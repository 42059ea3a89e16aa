//! Monetary amounts
//!
//! Amounts are plain `f64` values, matching the JSON numbers the service
//! accepts. Integral values are emitted as JSON integers so a balance of one
//! thousand reads `1000`, not `1000.0`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest integer an `f64` holds exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Magnitudes printed without an exponent, as JavaScript numbers print
const PLAIN_NOTATION: std::ops::Range<f64> = 1e-6..1e21;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Amount(pub f64);

impl Amount {
    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Positive and finite: the only shape accepted for a deposit or withdrawal
    pub fn is_valid_operand(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }

    /// Sum, or `None` if the result is not finite
    pub fn checked_add(self, other: Self) -> Option<Self> {
        let sum = self.0 + other.0;
        sum.is_finite().then_some(Self(sum))
    }

    /// Difference, or `None` if it would go negative
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        if other.0 > self.0 {
            None
        } else {
            Some(Self(self.0 - other.0))
        }
    }

    fn as_exact_integer(self) -> Option<i64> {
        (self.0.fract() == 0.0 && self.0.abs() <= MAX_SAFE_INTEGER).then_some(self.0 as i64)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let magnitude = self.0.abs();
        if self.0.is_finite() && magnitude != 0.0 && !PLAIN_NOTATION.contains(&magnitude) {
            // `1e21` -> `1e+21`; negative exponents already carry their sign
            let scientific = format!("{:e}", self.0);
            return match scientific.split_once('e') {
                Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                    write!(f, "{}e+{}", mantissa, exponent)
                }
                _ => f.write_str(&scientific),
            };
        }

        match self.as_exact_integer() {
            Some(integer) => write!(f, "{}", integer),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_exact_integer() {
            Some(integer) => serializer.serialize_i64(integer),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(Self)
    }
}
