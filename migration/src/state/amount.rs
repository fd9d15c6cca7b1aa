//! Token amounts as arbitrary-width unsigned integers.
//!
//! The exported state writes every amount as a decimal string. Some of them
//! (the total supply, the faucet) sit well past 2^53, so they are never
//! parsed into floats. [`Amount`] wraps a `U256` and keeps the JSON form a
//! decimal string on the way out.

use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

use primitive_types::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MigrationError, MigrationResult};

/// A non-negative token amount in base units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(U256);

impl Amount {
    /// Zero base units.
    pub const ZERO: Amount = Amount(U256([0; 4]));

    /// Returns `true` for zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Addition that reports overflow as an invariant violation.
    pub fn checked_add(self, other: Amount) -> MigrationResult<Amount> {
        self.0.checked_add(other.0).map(Amount).ok_or_else(|| {
            MigrationError::InvariantViolation(format!("amount overflow: {} + {}", self, other))
        })
    }

    /// Subtraction that reports underflow as an invariant violation.
    pub fn checked_sub(self, other: Amount) -> MigrationResult<Amount> {
        self.0.checked_sub(other.0).map(Amount).ok_or_else(|| {
            MigrationError::InvariantViolation(format!("amount underflow: {} - {}", self, other))
        })
    }

    /// Addition that clamps at the 256-bit ceiling.
    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// Multiplication that reports overflow as an invariant violation.
    pub fn checked_mul(self, factor: u64) -> MigrationResult<Amount> {
        self.0
            .checked_mul(U256::from(factor))
            .map(Amount)
            .ok_or_else(|| {
                MigrationError::InvariantViolation(format!(
                    "amount overflow: {} * {}",
                    self, factor
                ))
            })
    }

    /// Renders the amount as a cosmos-sdk `sdk.Dec` string (18 decimals).
    pub fn to_dec_string(&self) -> String {
        format!("{}.000000000000000000", self.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(U256::from(value))
    }
}

impl FromStr for Amount {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // from_dec_str happily takes "" as zero; the ledger never does.
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MigrationError::InvalidAmount(s.to_string()));
        }
        U256::from_dec_str(s)
            .map(Amount)
            .map_err(|_| MigrationError::InvalidAmount(s.to_string()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Sum for Amount {
    /// Saturates instead of overflowing; a 256-bit token total is not a
    /// thing that happens, and the audit catches it if it ever does.
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Amount::saturating_add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl<'de> Visitor<'de> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative decimal integer string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount::from(v))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}
