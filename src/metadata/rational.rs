use std::fmt;

use serde::Serialize;

/// Simplification is skipped when it would take more than this many trial
/// divisions.
const MAX_SIMPLIFICATION_STEPS: u64 = 1000;

/// A signed fraction as stored in RATIONAL and SRATIONAL fields.
///
/// Equality compares the numeric value, so `1/2 == 2/4`. The denominator may
/// be zero; such values convert to an infinity (or `0.0` for `0/0`).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

impl Rational {
    pub const fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub const fn numerator(&self) -> i64 {
        self.numerator
    }

    pub const fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn to_f64(&self) -> f64 {
        if self.numerator == 0 {
            0.0
        } else {
            self.numerator as f64 / self.denominator as f64
        }
    }

    pub fn to_f32(&self) -> f32 {
        self.to_f64() as f32
    }

    /// Truncating conversion.
    pub fn to_i64(&self) -> i64 {
        self.to_f64() as i64
    }

    /// Truncating conversion.
    pub fn to_i32(&self) -> i32 {
        self.to_f64() as i32
    }

    /// Low byte of the truncated value.
    pub fn to_u8(&self) -> u8 {
        self.to_i64() as u8
    }

    pub const fn reciprocal(&self) -> Rational {
        Rational::new(self.denominator, self.numerator)
    }

    /// True when the value is a whole number, including `0/0`.
    pub const fn is_integer(&self) -> bool {
        self.denominator == 1
            || (self.denominator != 0 && self.numerator.wrapping_rem(self.denominator) == 0)
            || (self.denominator == 0 && self.numerator == 0)
    }

    pub const fn is_zero(&self) -> bool {
        self.numerator == 0 || self.denominator == 0
    }

    fn is_too_complex_to_simplify(&self) -> bool {
        let smaller = self
            .numerator
            .unsigned_abs()
            .min(self.denominator.unsigned_abs());
        smaller.saturating_sub(1) / 5 + 2 > MAX_SIMPLIFICATION_STEPS
    }

    /// Divide out common factors.
    ///
    /// Values whose smaller term would need too many trial divisions are
    /// returned unchanged.
    pub fn simplified(&self) -> Rational {
        if self.is_too_complex_to_simplify() {
            return *self;
        }

        let mut numerator = self.numerator;
        let mut denominator = self.denominator;
        let mut factor: i64 = 2;
        while factor.unsigned_abs() <= numerator.unsigned_abs().min(denominator.unsigned_abs()) {
            // Once 2 and 5 are fully divided out their multiples cannot divide
            if (factor % 2 == 0 && factor > 2) || (factor % 5 == 0 && factor > 5) {
                factor += 1;
                continue;
            }
            if numerator % factor == 0 && denominator % factor == 0 {
                numerator /= factor;
                denominator /= factor;
            } else {
                factor += 1;
            }
        }
        Rational::new(numerator, denominator)
    }

    /// Compact human-readable form.
    ///
    /// Whole numbers print as integers and unit fractions are recognised
    /// before simplifying. With `allow_decimal`, a decimal is used instead of
    /// the fraction when it is under five characters long.
    pub fn to_simple_string(&self, allow_decimal: bool) -> String {
        if self.denominator == 0 && self.numerator != 0 {
            return self.to_string();
        }
        if self.is_integer() {
            return self.to_i32().to_string();
        }
        if self.numerator != 1 && self.denominator.wrapping_rem(self.numerator) == 0 {
            let reduced = Rational::new(1, self.denominator.wrapping_div(self.numerator));
            return reduced.to_simple_string(allow_decimal);
        }
        let simplified = self.simplified();
        if allow_decimal {
            let decimal = simplified.to_f64().to_string();
            if decimal.len() < 5 {
                return decimal;
            }
        }
        simplified.to_string()
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        self.to_f64() == other.to_f64()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
