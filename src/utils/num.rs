use num_traits::Zero;
use std::fmt::{Debug, Display, Error, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Fixed-point decimal with five fractional digits over an `i64`.
///
/// Edge weights carry at most five decimal places, so all weight arithmetic
/// (path sums, symmetry and metric checks) stays exact in this representation.
#[derive(Default, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct NumI64P5 {
    v: i64,
}

impl NumI64P5 {
    pub const PRECISION: usize = 5;
    const PREC_POW_10: i64 = 100_000;
    pub const EPSILON: Self = Self { v: 1 };
    pub const MAX: Self = Self { v: i64::MAX };
    pub const MIN: Self = Self { v: i64::MIN };
    pub const ZERO: Self = Self { v: 0 };
    pub const ONE: Self = Self { v: Self::PREC_POW_10 };

    pub const fn from_i64(o: i64) -> Self {
        Self {
            v: o * Self::PREC_POW_10,
        }
    }

    /// Raw value in units of `10^-5`.
    pub fn value(&self) -> i64 {
        self.v
    }
}

macro_rules! add_from_impl_int {
    ($($t:ty)*) => ($(
        impl From<$t> for NumI64P5 {
            fn from(o: $t) -> Self {
                Self { v: o as i64 * Self::PREC_POW_10 }
            }
        }
    )*)
}

add_from_impl_int!(i8 i16 i32 i64 u8 u16 u32 usize);

impl From<f64> for NumI64P5 {
    fn from(o: f64) -> Self {
        Self {
            v: (o * Self::PREC_POW_10 as f64).round() as i64,
        }
    }
}

impl From<NumI64P5> for f64 {
    fn from(o: NumI64P5) -> Self {
        o.v as f64 / NumI64P5::PREC_POW_10 as f64
    }
}

impl Add for NumI64P5 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { v: self.v + rhs.v }
    }
}

impl AddAssign for NumI64P5 {
    fn add_assign(&mut self, rhs: Self) {
        self.v += rhs.v
    }
}

impl Sub for NumI64P5 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { v: self.v - rhs.v }
    }
}

impl Sum for NumI64P5 {
    fn sum<I: Iterator<Item = NumI64P5>>(iter: I) -> NumI64P5 {
        NumI64P5 {
            v: iter.fold(0, |sum, rhs| sum + rhs.v),
        }
    }
}

impl Zero for NumI64P5 {
    fn zero() -> Self {
        Self::ZERO
    }
    fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Display for NumI64P5 {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        // integer math so large values print digit-exact
        let sign = if self.v < 0 { "-" } else { "" };
        let abs = self.v.unsigned_abs();
        write!(
            f,
            "{}{}.{:05}",
            sign,
            abs / Self::PREC_POW_10 as u64,
            abs % Self::PREC_POW_10 as u64
        )
    }
}

impl Debug for NumI64P5 {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNumError {
    input: String,
    reason: &'static str,
}

impl Display for ParseNumError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "invalid decimal '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for ParseNumError {}

impl FromStr for NumI64P5 {
    type Err = ParseNumError;

    /// Digit-exact parse of `[-]digits[.digits]` with at most five fractional
    /// digits. Exponents, `inf`/`nan` and everything else a float parser would
    /// accept beyond plain decimals are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason: &'static str| ParseNumError {
            input: s.to_string(),
            reason,
        };
        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_part, frac_part) = match rest.split_once('.') {
            Some((i, f)) => (i, f),
            None => (rest, ""),
        };
        if int_part.is_empty() {
            return Err(err("missing integer digits"));
        }
        if rest.contains('.') && frac_part.is_empty() {
            return Err(err("missing fractional digits"));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err("non-digit character"));
        }
        if frac_part.len() > Self::PRECISION {
            return Err(err("more than five fractional digits"));
        }
        let int: i64 = int_part.parse().map_err(|_| err("integer part overflows"))?;
        let frac: i64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse::<i64>().map_err(|_| err("bad fractional part"))?
                * (Self::PREC_POW_10 / 10i64.pow(frac_part.len() as u32))
        };
        let v = int
            .checked_mul(Self::PREC_POW_10)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(|| err("value out of range"))?;
        Ok(Self {
            v: if negative { -v } else { v },
        })
    }
}
