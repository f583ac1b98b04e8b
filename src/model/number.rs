//! Numeric values and the EL numeric type lattice
//!
//! EL numbers keep the kind they were created with (a variable stored as a
//! `Short` stays a `Short`), and conversions between kinds are range checked.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::types::{ElType, PrimitiveKind};

/// The concrete kind of a [`Number`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumberKind {
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Arbitrary size integer (bounded to 128 bits)
    BigInteger,
    /// Arbitrary precision decimal
    BigDecimal,
}

impl NumberKind {
    /// Whether the kind holds integral values only
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            NumberKind::Byte
                | NumberKind::Short
                | NumberKind::Integer
                | NumberKind::Long
                | NumberKind::BigInteger
        )
    }

    /// Whether the kind is a binary floating point kind
    pub fn is_floating(self) -> bool {
        matches!(self, NumberKind::Float | NumberKind::Double)
    }

    /// The boxed EL type of this kind
    pub fn el_type(self) -> ElType {
        match self {
            NumberKind::Byte => ElType::Boxed(PrimitiveKind::Byte),
            NumberKind::Short => ElType::Boxed(PrimitiveKind::Short),
            NumberKind::Integer => ElType::Boxed(PrimitiveKind::Int),
            NumberKind::Long => ElType::Boxed(PrimitiveKind::Long),
            NumberKind::Float => ElType::Boxed(PrimitiveKind::Float),
            NumberKind::Double => ElType::Boxed(PrimitiveKind::Double),
            NumberKind::BigInteger => ElType::BigInteger,
            NumberKind::BigDecimal => ElType::BigDecimal,
        }
    }
}

/// A numeric EL value
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// 8-bit signed integer
    Byte(i8),
    /// 16-bit signed integer
    Short(i16),
    /// 32-bit signed integer
    Integer(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Large integer
    BigInteger(i128),
    /// Arbitrary precision decimal
    BigDecimal(Decimal),
}

impl Number {
    /// Kind of this number
    pub fn kind(&self) -> NumberKind {
        match self {
            Number::Byte(_) => NumberKind::Byte,
            Number::Short(_) => NumberKind::Short,
            Number::Integer(_) => NumberKind::Integer,
            Number::Long(_) => NumberKind::Long,
            Number::Float(_) => NumberKind::Float,
            Number::Double(_) => NumberKind::Double,
            Number::BigInteger(_) => NumberKind::BigInteger,
            Number::BigDecimal(_) => NumberKind::BigDecimal,
        }
    }

    /// Integral view of the number, truncating fractions like `longValue()`
    pub fn to_i64(&self) -> Option<i64> {
        match *self {
            Number::Byte(v) => Some(v as i64),
            Number::Short(v) => Some(v as i64),
            Number::Integer(v) => Some(v as i64),
            Number::Long(v) => Some(v),
            Number::Float(v) => float_to_i128(v as f64).and_then(|v| i64::try_from(v).ok()),
            Number::Double(v) => float_to_i128(v).and_then(|v| i64::try_from(v).ok()),
            Number::BigInteger(v) => i64::try_from(v).ok(),
            Number::BigDecimal(v) => v.trunc().to_i64(),
        }
    }

    /// Wide integral view of the number, truncating fractions
    pub fn to_i128(&self) -> Option<i128> {
        match *self {
            Number::Float(v) => float_to_i128(v as f64),
            Number::Double(v) => float_to_i128(v),
            Number::BigInteger(v) => Some(v),
            Number::BigDecimal(v) => v.trunc().to_i128(),
            other => other.to_i64().map(i128::from),
        }
    }

    /// Floating point view of the number
    pub fn to_f64(&self) -> f64 {
        match *self {
            Number::Byte(v) => v as f64,
            Number::Short(v) => v as f64,
            Number::Integer(v) => v as f64,
            Number::Long(v) => v as f64,
            Number::Float(v) => v as f64,
            Number::Double(v) => v,
            Number::BigInteger(v) => v as f64,
            Number::BigDecimal(v) => v.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// Decimal view of the number; `None` for NaN, infinities and values
    /// outside the decimal range
    pub fn to_decimal(&self) -> Option<Decimal> {
        match *self {
            Number::Float(v) => Decimal::from_f32(v),
            Number::Double(v) => Decimal::from_f64(v),
            Number::BigInteger(v) => Decimal::from_i128(v),
            Number::BigDecimal(v) => Some(v),
            other => other.to_i64().map(Decimal::from),
        }
    }

    /// Whether the value is zero
    pub fn is_zero(&self) -> bool {
        match *self {
            Number::Float(v) => v == 0.0,
            Number::Double(v) => v == 0.0,
            Number::BigDecimal(v) => v.is_zero(),
            other => other.to_i128() == Some(0),
        }
    }

    /// Convert to another kind, `None` when the value does not fit
    pub fn convert(&self, kind: NumberKind) -> Option<Number> {
        if self.kind() == kind {
            return Some(*self);
        }
        match kind {
            NumberKind::Byte => self.integral_in_range().and_then(|v| i8::try_from(v).ok()).map(Number::Byte),
            NumberKind::Short => self
                .integral_in_range()
                .and_then(|v| i16::try_from(v).ok())
                .map(Number::Short),
            NumberKind::Integer => self
                .integral_in_range()
                .and_then(|v| i32::try_from(v).ok())
                .map(Number::Integer),
            NumberKind::Long => self
                .integral_in_range()
                .and_then(|v| i64::try_from(v).ok())
                .map(Number::Long),
            NumberKind::BigInteger => self.integral_in_range().map(Number::BigInteger),
            NumberKind::Float => {
                let v = self.to_f64();
                if v.is_finite() && v.abs() > f32::MAX as f64 {
                    None
                } else {
                    Some(Number::Float(v as f32))
                }
            }
            NumberKind::Double => Some(Number::Double(self.to_f64())),
            NumberKind::BigDecimal => self.to_decimal().map(Number::BigDecimal),
        }
    }

    fn integral_in_range(&self) -> Option<i128> {
        match *self {
            Number::Float(v) if !v.is_finite() => None,
            Number::Double(v) if !v.is_finite() => None,
            _ => self.to_i128(),
        }
    }

    /// Parse text as the given kind
    pub fn parse(text: &str, kind: NumberKind) -> Option<Number> {
        let text = text.trim();
        match kind {
            NumberKind::Byte => text.parse().ok().map(Number::Byte),
            NumberKind::Short => text.parse().ok().map(Number::Short),
            NumberKind::Integer => text.parse().ok().map(Number::Integer),
            NumberKind::Long => text.parse().ok().map(Number::Long),
            NumberKind::BigInteger => text.parse().ok().map(Number::BigInteger),
            NumberKind::Float => text.parse().ok().map(Number::Float),
            NumberKind::Double => text.parse().ok().map(Number::Double),
            NumberKind::BigDecimal => Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .ok()
                .map(Number::BigDecimal),
        }
    }

    /// Numeric comparison across kinds
    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        let (a, b) = (self.kind(), other.kind());
        if a == NumberKind::BigDecimal || b == NumberKind::BigDecimal {
            return match (self.to_decimal(), other.to_decimal()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => self.to_f64().partial_cmp(&other.to_f64()),
            };
        }
        if a.is_floating() || b.is_floating() {
            return self.to_f64().partial_cmp(&other.to_f64());
        }
        match (self.to_i128(), other.to_i128()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => None,
        }
    }
}

fn float_to_i128(v: f64) -> Option<i128> {
    if v.is_finite() {
        Some(v.trunc() as i128)
    } else {
        None
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.compare(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Byte(v) => write!(f, "{v}"),
            Number::Short(v) => write!(f, "{v}"),
            Number::Integer(v) => write!(f, "{v}"),
            Number::Long(v) => write!(f, "{v}"),
            Number::Float(v) => f.write_str(&format_floating(*v as f64, true)),
            Number::Double(v) => f.write_str(&format_floating(*v, false)),
            Number::BigInteger(v) => write!(f, "{v}"),
            Number::BigDecimal(v) => write!(f, "{v}"),
        }
    }
}

/// Render a floating value the way `Double.toString` does: always a
/// fractional part, scientific notation outside `[1e-3, 1e7)`.
fn format_floating(value: f64, single: bool) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let text = if single {
            format!("{}", value as f32)
        } else {
            format!("{value}")
        };
        if text.contains('.') {
            text
        } else {
            format!("{text}.0")
        }
    } else {
        let text = if single {
            format!("{:e}", value as f32)
        } else {
            format!("{value:e}")
        };
        let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
        if mantissa.contains('.') {
            format!("{mantissa}E{exponent}")
        } else {
            format!("{mantissa}.0E{exponent}")
        }
    }
}

impl From<i8> for Number {
    fn from(value: i8) -> Self {
        Number::Byte(value)
    }
}

impl From<i16> for Number {
    fn from(value: i16) -> Self {
        Number::Short(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Long(value)
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Double(value)
    }
}

impl From<Decimal> for Number {
    fn from(value: Decimal) -> Self {
        Number::BigDecimal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_conversions() {
        let short_min = Number::Short(i16::MIN);
        assert_eq!(
            short_min.convert(NumberKind::Integer),
            Some(Number::Integer(i16::MIN as i32))
        );
        assert_eq!(Number::Integer(i32::MIN).convert(NumberKind::Short), None);
        assert_eq!(
            Number::Long(i32::MIN as i64).convert(NumberKind::Integer),
            Some(Number::Integer(i32::MIN))
        );
        assert_eq!(Number::Double(f64::NAN).convert(NumberKind::Long), None);
    }

    #[test]
    fn test_cross_kind_compare() {
        assert_eq!(
            Number::Integer(3).compare(&Number::Long(3)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Number::Double(-1.5).compare(&Number::Long(-1)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::BigDecimal(Decimal::new(15, 1)).compare(&Number::Double(1.5)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_equality_respects_kind() {
        assert_eq!(Number::Integer(1), Number::Integer(1));
        assert_ne!(Number::Integer(1), Number::Long(1));
    }

    #[test]
    fn test_display_matches_double_to_string() {
        assert_eq!(Number::Double(1.0).to_string(), "1.0");
        assert_eq!(Number::Double(-1.5).to_string(), "-1.5");
        assert_eq!(Number::Double(1e10).to_string(), "1.0E10");
        assert_eq!(Number::Double(0.0001).to_string(), "1.0E-4");
        assert_eq!(Number::Long(-9).to_string(), "-9");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Number::parse(" 42 ", NumberKind::Long), Some(Number::Long(42)));
        assert_eq!(Number::parse("4.5", NumberKind::Long), None);
        assert_eq!(
            Number::parse("1e2", NumberKind::Double),
            Some(Number::Double(100.0))
        );
    }
}
