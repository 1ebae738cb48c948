//! Unsigned 64-bit fixed-point numbers with 8 decimal places.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{LifecycleError, LifecycleResult};

/// Number of fractional digits in the network's native fixed-point type.
pub const UFIX64_DECIMALS: usize = 8;

const SCALE: u64 = 100_000_000;

/// Fixed-point amount stored as integer units of 10^-8.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UFix64(u64);

impl UFix64 {
    pub const ZERO: UFix64 = UFix64(0);

    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    pub const fn units(self) -> u64 {
        self.0
    }

    /// Parse an amount that must carry exactly 8 fractional digits,
    /// e.g. `10.00000001`. Any other scale is rejected.
    pub fn parse_exact(s: &str) -> LifecycleResult<Self> {
        let (_, fraction) = s.split_once('.').ok_or_else(|| scale_error(s))?;
        if fraction.len() != UFIX64_DECIMALS {
            return Err(scale_error(s));
        }
        Self::parse_lenient(s)
    }

    /// Parse with 0 to 8 fractional digits.
    fn parse_lenient(s: &str) -> LifecycleResult<Self> {
        let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(LifecycleError::Validation(format!(
                "Invalid UFix64 value '{}'",
                s
            )));
        }
        if fraction.len() > UFIX64_DECIMALS {
            return Err(scale_error(s));
        }

        let whole: u64 = whole
            .parse()
            .map_err(|_| LifecycleError::Validation(format!("UFix64 value '{}' overflows", s)))?;
        let padded = format!("{:0<width$}", fraction, width = UFIX64_DECIMALS);
        let fraction: u64 = padded
            .parse()
            .map_err(|_| LifecycleError::Validation(format!("Invalid UFix64 value '{}'", s)))?;

        whole
            .checked_mul(SCALE)
            .and_then(|units| units.checked_add(fraction))
            .map(Self)
            .ok_or_else(|| LifecycleError::Validation(format!("UFix64 value '{}' overflows", s)))
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn scale_error(s: &str) -> LifecycleError {
    LifecycleError::Validation(format!(
        "UFix64 amount '{}' must have exactly {} decimal places (e.g. 10.00000000)",
        s, UFIX64_DECIMALS
    ))
}

impl FromStr for UFix64 {
    type Err = LifecycleError;

    /// Lenient parse used for values reported by the network.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s)
    }
}

impl fmt::Display for UFix64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.0 / SCALE,
            self.0 % SCALE,
            width = UFIX64_DECIMALS
        )
    }
}

impl fmt::Debug for UFix64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UFix64({})", self)
    }
}

impl Serialize for UFix64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UFix64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_scale() {
        let amount = UFix64::parse_exact("10.00000001").unwrap();
        assert_eq!(amount.units(), 1_000_000_001);
        assert_eq!(amount.to_string(), "10.00000001");
    }

    #[test]
    fn test_wrong_scale_is_rejected() {
        for input in ["10", "10.0", "10.0000001", "10.000000010", "0.1"] {
            let err = UFix64::parse_exact(input).unwrap_err();
            assert!(
                matches!(err, LifecycleError::Validation(_)),
                "{} should be a validation error",
                input
            );
        }
    }

    #[test]
    fn test_malformed_values() {
        assert!(UFix64::parse_exact("-1.00000000").is_err());
        assert!(UFix64::parse_exact(".00000000").is_err());
        assert!(UFix64::parse_exact("1.0000000a").is_err());
        assert!(UFix64::parse_exact("184467440737.09551616").is_err());
    }

    #[test]
    fn test_lenient_parse_for_network_values() {
        let value: UFix64 = "0.5".parse().unwrap();
        assert_eq!(value.units(), 50_000_000);
        let value: UFix64 = "1000".parse().unwrap();
        assert_eq!(value.to_string(), "1000.00000000");
    }

    #[test]
    fn test_exact_addition() {
        let before = UFix64::parse_exact("0.00100000").unwrap();
        let amount = UFix64::parse_exact("10.00000001").unwrap();
        let after = before.checked_add(amount).unwrap();
        assert_eq!(after.to_string(), "10.00100001");
        assert_eq!(after.checked_sub(amount), Some(before));
        assert!(UFix64::from_units(u64::MAX).checked_add(amount).is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let amount = UFix64::parse_exact("1.50000000").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"1.50000000\"");
        let decoded: UFix64 = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, amount);
    }
}
