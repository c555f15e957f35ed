//! Arbitrary-precision decimal numbers.
//!
//! A [`Decimal`] is a `BigInt` mantissa plus a decimal scale: the value is
//! `mantissa / 10^scale`. The scale is preserved through copies and shows up
//! in the canonical rendering (`5.00` at scale 2), which is what the tabular
//! layer relies on for typed columns.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid decimal literal: {0}")]
pub struct ParseDecimalError(pub String);

#[derive(Debug, Clone)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

fn pow10(scale: u32) -> BigInt {
    num_traits::pow(BigInt::from(10), scale as usize)
}

impl Decimal {
    pub fn new(mantissa: BigInt, scale: u32) -> Self {
        Decimal { mantissa, scale }
    }

    pub fn zero() -> Self {
        Decimal::new(BigInt::from(0), 0)
    }

    pub fn from_i64(n: i64) -> Self {
        Decimal::new(BigInt::from(n), 0)
    }

    /// Converts a finite float through its shortest decimal rendering.
    /// Returns `None` for NaN and infinities.
    pub fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        format!("{}", f).parse().ok()
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    pub fn abs(&self) -> Self {
        Decimal::new(self.mantissa.abs(), self.scale)
    }

    pub fn neg(&self) -> Self {
        Decimal::new(-self.mantissa.clone(), self.scale)
    }

    /// Returns the same numeric value at a different scale. Scaling down
    /// truncates toward zero.
    pub fn rescale(&self, scale: u32) -> Self {
        match scale.cmp(&self.scale) {
            Ordering::Equal => self.clone(),
            Ordering::Greater => {
                let factor = pow10(scale - self.scale);
                Decimal::new(&self.mantissa * factor, scale)
            }
            Ordering::Less => {
                let factor = pow10(self.scale - scale);
                Decimal::new(&self.mantissa / factor, scale)
            }
        }
    }

    /// Integer part, truncated toward zero. `None` on i64 overflow.
    pub fn to_i64(&self) -> Option<i64> {
        (&self.mantissa / pow10(self.scale)).to_i64()
    }

    pub fn to_f64(&self) -> f64 {
        let m = self.mantissa.to_f64().unwrap_or(f64::NAN);
        m / 10f64.powi(self.scale as i32)
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    /// Accepts `[+-]digits[.digits][eE[+-]digits]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseDecimalError(s.to_string());
        let text = s.trim();
        if text.is_empty() {
            return Err(bad());
        }
        let (body, exponent) = match text.find(['e', 'E']) {
            Some(pos) => {
                let exp: i64 = text[pos + 1..].parse().map_err(|_| bad())?;
                (&text[..pos], exp)
            }
            None => (text, 0),
        };
        let (digits, scale) = match body.find('.') {
            Some(pos) => {
                let fraction = &body[pos + 1..];
                if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(bad());
                }
                (format!("{}{}", &body[..pos], fraction), fraction.len() as i64)
            }
            None => (body.to_string(), 0),
        };
        let mantissa: BigInt = digits.parse().map_err(|_| bad())?;
        let net_scale = scale - exponent;
        if net_scale >= 0 {
            Ok(Decimal::new(mantissa, net_scale as u32))
        } else {
            Ok(Decimal::new(mantissa * pow10((-net_scale) as u32), 0))
        }
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        // Align mantissas at the larger scale before comparing.
        let scale = self.scale.max(other.scale);
        let a = &self.mantissa * pow10(scale - self.scale);
        let b = &other.mantissa * pow10(scale - other.scale);
        a.cmp(&b)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-")?;
        }
        let magnitude = self.mantissa.abs();
        if self.scale == 0 {
            return write!(f, "{}", magnitude);
        }
        let factor = pow10(self.scale);
        let int_part = &magnitude / &factor;
        let frac_part = &magnitude % &factor;
        write!(
            f,
            "{}.{:0>width$}",
            int_part,
            frac_part.to_string(),
            width = self.scale as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let d: Decimal = "12.50".parse().unwrap();
        assert_eq!(d.scale(), 2);
        assert_eq!(d.to_string(), "12.50");
        assert_eq!("-0.07".parse::<Decimal>().unwrap().to_string(), "-0.07");
        assert_eq!("300".parse::<Decimal>().unwrap().to_string(), "300");
    }

    #[test]
    fn test_parse_exponent() {
        assert_eq!("1.5e3".parse::<Decimal>().unwrap().to_string(), "1500");
        assert_eq!("15e-1".parse::<Decimal>().unwrap().to_string(), "1.5");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Decimal>().is_err());
        assert!("1.".parse::<Decimal>().is_err());
        assert!("12a".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_rescale_round_trip() {
        let five = Decimal::from_i64(5);
        let scaled = five.rescale(2);
        assert_eq!(scaled.to_string(), "5.00");
        assert_eq!(scaled.to_i64(), Some(5));
        assert_eq!(scaled, five);
    }

    #[test]
    fn test_rescale_truncates_toward_zero() {
        let d: Decimal = "-1.99".parse().unwrap();
        assert_eq!(d.rescale(0).to_string(), "-1");
    }

    #[test]
    fn test_ordering_across_scales() {
        let a: Decimal = "1.5".parse().unwrap();
        let b: Decimal = "1.50".parse().unwrap();
        let c: Decimal = "1.51".parse().unwrap();
        assert_eq!(a, b);
        assert!(b < c);
        assert!(c > a);
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Decimal::from_f64(2.5).unwrap().to_string(), "2.5");
        assert!(Decimal::from_f64(f64::NAN).is_none());
        assert!(Decimal::from_f64(f64::INFINITY).is_none());
    }
}
