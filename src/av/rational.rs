use std::fmt;
use std::str::FromStr;

/// A rational number, used for time bases, frame rates and aspect ratios.
///
/// A zero denominator is representable (it means "unset" for aspect ratios)
/// but is rejected wherever a usable time base is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rational {
    /// Numerator
    pub num: i32,
    /// Denominator
    pub den: i32,
}

impl Rational {
    /// Creates a rational without reducing it.
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Returns true when both terms are strictly positive.
    pub fn is_positive(&self) -> bool {
        self.num > 0 && self.den > 0
    }

    /// Returns true when the numerator is zero.
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Returns the reciprocal, `den/num`.
    pub fn invert(self) -> Self {
        Self::new(self.den, self.num)
    }

    /// Reduces the fraction by the greatest common divisor and normalizes
    /// the sign onto the numerator.
    pub fn reduce(self) -> Self {
        let g = gcd(self.num.unsigned_abs(), self.den.unsigned_abs());
        if g == 0 {
            return self;
        }
        let (mut num, mut den) = (self.num / g as i32, self.den / g as i32);
        if den < 0 {
            num = -num;
            den = -den;
        }
        Self::new(num, den)
    }

    /// Returns the value as a float, or `None` for a zero denominator.
    pub fn to_f64(&self) -> Option<f64> {
        if self.den == 0 {
            None
        } else {
            Some(self.num as f64 / self.den as f64)
        }
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Error returned when a string cannot be parsed as a [`Rational`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rational '{0}'")]
pub struct ParseRationalError(pub String);

impl FromStr for Rational {
    type Err = ParseRationalError;

    /// Accepts `num/den`, `num:den`, a plain integer or a decimal such as
    /// `29.97`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseRationalError(s.to_string());

        if let Some((num, den)) = s.split_once(['/', ':']) {
            let num = num.trim().parse::<i32>().map_err(|_| err())?;
            let den = den.trim().parse::<i32>().map_err(|_| err())?;
            return Ok(Rational::new(num, den));
        }

        if let Ok(num) = s.parse::<i32>() {
            return Ok(Rational::new(num, 1));
        }

        // Decimal: scale by a power of ten matching the fractional digits.
        let (int_part, frac_part) = s.split_once('.').ok_or_else(err)?;
        if frac_part.is_empty() || frac_part.len() > 6 || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let den = 10i64.pow(frac_part.len() as u32);
        let negative = int_part.starts_with('-');
        let int_val = if int_part.is_empty() || int_part == "-" {
            0
        } else {
            int_part.parse::<i64>().map_err(|_| err())?
        };
        let frac_val = frac_part.parse::<i64>().map_err(|_| err())?;
        let magnitude = int_val
            .checked_abs()
            .and_then(|v| v.checked_mul(den))
            .and_then(|v| v.checked_add(frac_val))
            .ok_or_else(err)?;
        let num = if negative { -magnitude } else { magnitude };
        let num = i32::try_from(num).map_err(|_| err())?;
        Ok(Rational::new(num, den as i32).reduce())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_forms() {
        assert_eq!("1/25".parse::<Rational>().unwrap(), Rational::new(1, 25));
        assert_eq!("30000:1001".parse::<Rational>().unwrap(), Rational::new(30000, 1001));
        assert_eq!("25".parse::<Rational>().unwrap(), Rational::new(25, 1));
        assert_eq!("29.97".parse::<Rational>().unwrap(), Rational::new(2997, 100));
        assert_eq!("0.5".parse::<Rational>().unwrap(), Rational::new(1, 2));
        assert_eq!("-1.5".parse::<Rational>().unwrap(), Rational::new(-3, 2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Rational>().is_err());
        assert!("abc".parse::<Rational>().is_err());
        assert!("1/x".parse::<Rational>().is_err());
        assert!("1.".parse::<Rational>().is_err());
    }

    #[test]
    fn test_parse_rejects_overflowing_decimals() {
        assert!("9223372036854775807.5".parse::<Rational>().is_err());
        assert!("-9223372036854775808.5".parse::<Rational>().is_err());
        assert!("2147483648.0".parse::<Rational>().is_err());
        assert_eq!("2147483.647".parse::<Rational>().unwrap(), Rational::new(2147483647, 1000));
    }

    #[test]
    fn test_reduce_normalizes_sign() {
        assert_eq!(Rational::new(4, -8).reduce(), Rational::new(-1, 2));
        assert_eq!(Rational::new(0, 0).reduce(), Rational::new(0, 0));
    }

    #[test]
    fn test_helpers() {
        assert!(Rational::new(1, 25).is_positive());
        assert!(!Rational::new(0, 1).is_positive());
        assert_eq!(Rational::new(1, 0).to_f64(), None);
        assert_eq!(Rational::new(1, 48000).invert(), Rational::new(48000, 1));
        assert_eq!(Rational::new(1, 25).to_string(), "1/25");
    }
}
