// pang -- algorithmic notation through queue simulation
// Copyright (C) 2026  The pang developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Exact rational numbers, used for every point in time and every duration.
//!
//! Sound points are specified in seconds, and values like `2.1` or `0.4` have
//! to add up without drift for a server's clock to match the durations it
//! recorded. Decimal literals are therefore parsed into exact fractions.

use std::convert::TryFrom;
use std::error::Error;
use std::fmt;
use std::iter;
use std::{cmp::Ordering, ops};

/// Underlying integral type for the rational numbers.
type Int = i64;

/// Intermediate results are computed at twice the width and only narrowed
/// after reducing.
type Wide = i128;

/// Most decimal places accepted when parsing. Decimal values share
/// denominators dividing `10^12`, so sums and differences of parsed decimals
/// always fit.
pub const MAX_DECIMAL_PLACES: usize = 12;

/// Largest denominator accepted when parsing a fraction. Combined with any
/// parsed decimal the common denominator stays below `10^18`.
pub const MAX_FRACTION_DENOMINATOR: Int = 1_000_000;

/// A rational number, always fully normalized.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Rational {
    /// The numerator of the fraction.
    /// If the fraction is negative, the numerator will be made negative.
    num: Int,
    /// The denominator of the fraction, always positive.
    denom: Int,
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, denom: 1 };
    pub const ONE: Rational = Rational { num: 1, denom: 1 };

    // ==================== Constructors ====================

    /// Create a new rational from a potentially unnormalized fraction.
    ///
    /// # Panic
    ///
    /// Panics if the denominator is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pang_core::rational::*;
    ///
    /// assert_eq!(Rational::new(10, 5), Rational::new(2, 1));
    /// assert_eq!(Rational::new(-10, -5), Rational::new(6, 3));
    /// assert_eq!(Rational::new(-6, 8), Rational::new(3, -4));
    /// ```
    pub fn new(num: Int, denom: Int) -> Rational {
        Rational::from_wide(num as Wide, denom as Wide)
    }

    /// Normalize a wide fraction and narrow it.
    ///
    /// # Panic
    ///
    /// Panics if the denominator is zero or the reduced fraction does not fit
    /// into `Int`.
    fn from_wide(num: Wide, denom: Wide) -> Rational {
        assert_ne!(denom, 0, "Denominator must not be zero");

        let div = gcd_wide(num, denom) * denom.signum();
        let (num, denom) = (num / div, denom / div);
        match (Int::try_from(num), Int::try_from(denom)) {
            (Ok(num), Ok(denom)) => Rational { num, denom },
            _ => panic!("rational {}/{} does not fit into 64 bits", num, denom),
        }
    }

    pub const fn int(int: Int) -> Rational {
        Rational { num: int, denom: 1 }
    }

    pub const fn zero() -> Rational {
        Rational::ZERO
    }

    pub const fn one() -> Rational {
        Rational::ONE
    }

    /// Interpret a number of milliseconds as seconds.
    pub fn from_millis(millis: Int) -> Rational {
        Rational::new(millis, 1000)
    }

    // ==================== Transformations ====================

    /// The reciprocal.
    ///
    /// # Panic
    ///
    /// Panics if the rational is zero.
    pub fn recip(self) -> Rational {
        Rational::new(self.denom, self.num)
    }

    pub fn abs(self) -> Rational {
        Rational {
            num: self.num.abs(),
            denom: self.denom,
        }
    }

    /// Round towards negative infinity.
    ///
    /// ```
    /// # use pang_core::rational::*;
    ///
    /// assert_eq!(Rational::new(10, 5).floor(), 2);
    /// assert_eq!(Rational::new(13, 7).floor(), 1);
    /// assert_eq!(Rational::new(-10, 6).floor(), -2);
    /// ```
    pub fn floor(self) -> Int {
        self.num.div_euclid(self.denom)
    }

    /// Round to closest integer, half up.
    ///
    /// ```
    /// # use pang_core::rational::*;
    ///
    /// assert_eq!(Rational::new(10, 4).round(), 3);
    /// assert_eq!(Rational::new(3, 7).round(), 0);
    /// assert_eq!(Rational::new(4, 7).round(), 1);
    /// assert_eq!(Rational::new(-5, 2).round(), -2);
    /// ```
    pub fn round(self) -> Int {
        (self + Rational::new(1, 2)).floor()
    }

    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.denom as f64
    }

    // ==================== Predicates ====================

    pub const fn is_zero(self) -> bool {
        self.num == 0
    }

    pub const fn is_positive(self) -> bool {
        self.num > 0
    }

    pub const fn is_negative(self) -> bool {
        self.num < 0
    }

    // ==================== Destructors ====================

    pub const fn numerator(self) -> Int {
        self.num
    }

    pub const fn denominator(self) -> Int {
        self.denom
    }
}

/// # Examples
///
/// ```
/// # use pang_core::rational::*;
///
/// assert_eq!(Rational::new(1, 2) + Rational::new(3, 4), Rational::new(5, 4));
/// assert_eq!(Rational::new(3, 4) + Rational::new(-5, 8), Rational::new(1, 8));
/// ```
impl ops::Add for Rational {
    type Output = Rational;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Rational) -> Self::Output {
        // over the least common multiple of both denominators
        let common = gcd(self.denom, rhs.denom);
        let left = rhs.denom / common;
        let right = self.denom / common;
        Rational::from_wide(
            self.num as Wide * left as Wide + rhs.num as Wide * right as Wide,
            self.denom as Wide * left as Wide,
        )
    }
}

impl ops::Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Self::Output {
        self + (-rhs)
    }
}

impl ops::Mul for Rational {
    type Output = Rational;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn mul(self, rhs: Rational) -> Self::Output {
        // cancel crosswise first, both operands are already reduced
        let a = gcd(self.num, rhs.denom);
        let b = gcd(rhs.num, self.denom);
        Rational::from_wide(
            (self.num / a) as Wide * (rhs.num / b) as Wide,
            (self.denom / b) as Wide * (rhs.denom / a) as Wide,
        )
    }
}

impl ops::Div for Rational {
    type Output = Rational;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, rhs: Rational) -> Self::Output {
        self * rhs.recip()
    }
}

/// The remainder has the sign of the dividend.
///
/// ```
/// # use pang_core::rational::*;
///
/// assert_eq!(Rational::new(7, 3) % Rational::new(1, 4), Rational::new(1, 12));
/// assert_eq!(Rational::new(-7, 3) % Rational::new(1, 4), Rational::new(-1, 12));
/// ```
impl ops::Rem for Rational {
    type Output = Rational;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn rem(self, rhs: Rational) -> Self::Output {
        Rational::from_wide(
            (self.num as Wide * rhs.denom as Wide) % (rhs.num as Wide * self.denom as Wide),
            self.denom as Wide * rhs.denom as Wide,
        )
    }
}

impl ops::Mul<Int> for Rational {
    type Output = Rational;

    fn mul(self, rhs: Int) -> Self::Output {
        self * Rational::int(rhs)
    }
}

impl ops::Mul<Rational> for Int {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Self::Output {
        rhs * self
    }
}

/// ```
/// # use pang_core::rational::*;
/// assert_eq!(Rational::new(1, 4) / 2, Rational::new(1, 8));
/// assert_eq!(Rational::new(9, 13) / 3, Rational::new(3, 13));
/// ```
impl ops::Div<Int> for Rational {
    type Output = Rational;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, rhs: Int) -> Self::Output {
        self * Rational::new(1, rhs)
    }
}

impl ops::Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        Rational {
            num: -self.num,
            denom: self.denom,
        }
    }
}

impl ops::AddAssign for Rational {
    fn add_assign(&mut self, rhs: Rational) {
        *self = *self + rhs;
    }
}

impl ops::SubAssign for Rational {
    fn sub_assign(&mut self, rhs: Rational) {
        *self = *self - rhs;
    }
}

impl ops::MulAssign for Rational {
    fn mul_assign(&mut self, rhs: Rational) {
        *self = *self * rhs;
    }
}

impl iter::Sum for Rational {
    fn sum<I: Iterator<Item = Rational>>(iter: I) -> Rational {
        iter.fold(Rational::ZERO, |acc, x| acc + x)
    }
}

impl<'a> iter::Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Rational>>(iter: I) -> Rational {
        iter.copied().sum()
    }
}

impl Default for Rational {
    fn default() -> Rational {
        Rational::ZERO
    }
}

impl From<Int> for Rational {
    fn from(int: Int) -> Rational {
        Rational::int(int)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Rational) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// ```
/// # use pang_core::rational::*;
///
/// assert!(Rational::new(3,4) < Rational::new(3,2));
/// ```
impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // a / b < c / d  <=>  a * d < c * b, since b and d are positive
        let l = self.num as Wide * other.denom as Wide;
        let r = other.num as Wide * self.denom as Wide;
        l.cmp(&r)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.num)?;
        if self.denom != 1 {
            write!(f, "/{}", self.denom)?;
        }
        Ok(())
    }
}

/// An error which can be returned when parsing a rational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRationalError(RationalErrorKind);

impl ParseRationalError {
    pub fn kind(&self) -> RationalErrorKind {
        self.0
    }
}

impl Error for ParseRationalError {}

impl fmt::Display for ParseRationalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            RationalErrorKind::InvalidInt => write!(f, "invalid integer literal"),
            RationalErrorKind::Zero => write!(f, "denominator is zero"),
            RationalErrorKind::Malformed => write!(f, "malformed number"),
            RationalErrorKind::TooPrecise => write!(
                f,
                "more than {} decimal places or a denominator above {}",
                MAX_DECIMAL_PLACES, MAX_FRACTION_DENOMINATOR
            ),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RationalErrorKind {
    /// The numerator, denominator or a decimal part could not be parsed as integer.
    InvalidInt,
    /// The denominator was zero
    Zero,
    /// Not of the form `<int>`, `<int>/<int>` or `<int>.<digits>`,
    /// or out of range.
    Malformed,
    /// More than `MAX_DECIMAL_PLACES` decimal places, or a fraction with a
    /// reduced denominator above `MAX_FRACTION_DENOMINATOR`.
    TooPrecise,
}

/// Accepts integers, fractions and decimals.
///
/// ```
/// # use pang_core::rational::*;
///
/// assert_eq!("3".parse(), Ok(Rational::int(3)));
/// assert_eq!("-3/6".parse(), Ok(Rational::new(-1, 2)));
/// assert_eq!("2.1".parse(), Ok(Rational::new(21, 10)));
/// assert_eq!("-0.25".parse(), Ok(Rational::new(-1, 4)));
/// assert_eq!(".5".parse(), Ok(Rational::new(1, 2)));
/// ```
impl std::str::FromStr for Rational {
    type Err = ParseRationalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') {
            parse_fraction(s)
        } else if s.contains('.') {
            parse_decimal(s)
        } else {
            s.parse()
                .map(Rational::int)
                .map_err(|_| ParseRationalError(RationalErrorKind::InvalidInt))
        }
    }
}

fn parse_fraction(s: &str) -> Result<Rational, ParseRationalError> {
    let mut parts = s.split('/');
    let numerator = parts
        .next()
        .unwrap_or("")
        .parse()
        .map_err(|_| ParseRationalError(RationalErrorKind::InvalidInt))?;
    let denominator = parts
        .next()
        .unwrap_or("")
        .parse()
        .map_err(|_| ParseRationalError(RationalErrorKind::InvalidInt))?;
    if denominator == 0 {
        Err(ParseRationalError(RationalErrorKind::Zero))
    } else if parts.next().is_some() {
        Err(ParseRationalError(RationalErrorKind::Malformed))
    } else {
        let value = Rational::new(numerator, denominator);
        if value.denom > MAX_FRACTION_DENOMINATOR {
            Err(ParseRationalError(RationalErrorKind::TooPrecise))
        } else {
            Ok(value)
        }
    }
}

fn parse_decimal(s: &str) -> Result<Rational, ParseRationalError> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let mut parts = digits.splitn(2, '.');
    let whole_str = parts.next().unwrap_or("");
    let frac_str = parts.next().unwrap_or("");

    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole_str.is_empty() && frac_str.is_empty())
        || !is_digits(whole_str)
        || !is_digits(frac_str)
    {
        return Err(ParseRationalError(RationalErrorKind::InvalidInt));
    }
    if frac_str.len() > MAX_DECIMAL_PLACES {
        return Err(ParseRationalError(RationalErrorKind::TooPrecise));
    }

    let parse_part = |part: &str| -> Result<Int, ParseRationalError> {
        if part.is_empty() {
            Ok(0)
        } else {
            part.parse()
                .map_err(|_| ParseRationalError(RationalErrorKind::InvalidInt))
        }
    };
    let whole = parse_part(whole_str)?;
    let frac = parse_part(frac_str)?;
    let denom = (10 as Int).pow(frac_str.len() as u32);
    let num = whole
        .checked_mul(denom)
        .and_then(|scaled| scaled.checked_add(frac))
        .ok_or(ParseRationalError(RationalErrorKind::Malformed))?;

    let value = Rational::new(num, denom);
    Ok(if negative { -value } else { value })
}

/// Computes the greatest common divisor of two numbers using euclids algorithm.
///
/// # Example
///
/// ```
/// # use pang_core::rational::*;
///
/// assert_eq!(gcd(20, 15), 5);
/// assert_eq!(gcd(10, 0), 10);
/// assert_eq!(gcd(0, 0), 0);
/// assert_eq!(gcd(10, -10), 10);
/// ```
pub fn gcd(a: Int, b: Int) -> Int {
    gcd_wide(a as Wide, b as Wide) as Int
}

/// Computes the least common multiple of two numbers.
///
/// # Example
///
/// ```
/// # use pang_core::rational::*;
///
/// assert_eq!(lcm(4, 6), 12);
/// assert_eq!(lcm(-3, 5), 15);
/// assert_eq!(lcm(0, 5), 0);
/// ```
pub fn lcm(a: Int, b: Int) -> Int {
    if a == 0 || b == 0 {
        0
    } else {
        (a / gcd(a, b) * b).abs()
    }
}

fn gcd_wide(mut a: Wide, mut b: Wide) -> Wide {
    // normalized inputs to be positive to guarantee that it terminates
    a = a.abs();
    b = b.abs();

    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_seconds_add_up_exactly() {
        let total: Rational = ["2.1", "0.5", "0.5", "0.5", "0.4"]
            .iter()
            .map(|s| s.parse::<Rational>().unwrap())
            .sum();
        assert_eq!(total, Rational::int(4));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            "1/0".parse::<Rational>().unwrap_err().kind(),
            RationalErrorKind::Zero
        );
        assert_eq!(
            "1/2/3".parse::<Rational>().unwrap_err().kind(),
            RationalErrorKind::Malformed
        );
        assert_eq!(
            "1.2.3".parse::<Rational>().unwrap_err().kind(),
            RationalErrorKind::InvalidInt
        );
        assert_eq!(
            "abc".parse::<Rational>().unwrap_err().kind(),
            RationalErrorKind::InvalidInt
        );
        assert_eq!(
            ".".parse::<Rational>().unwrap_err().kind(),
            RationalErrorKind::InvalidInt
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for value in &[Rational::new(-7, 3), Rational::int(4), Rational::ZERO] {
            assert_eq!(value.to_string().parse::<Rational>(), Ok(*value));
        }
    }

    fn r(s: &str) -> Rational {
        s.parse().unwrap()
    }

    #[test]
    fn ten_decimal_places_compare_and_add() {
        let a = r("0.1234567891");
        let b = r("0.2345678912");
        assert!(a < b);
        assert_eq!(a + b, r("0.3580246803"));
        assert_eq!(b - a, r("0.1111111021"));
        assert_eq!(a.max(b) + r("0.5"), r("0.7345678912"));
    }

    #[test]
    fn large_prime_denominators() {
        let a = Rational::new(1, 999_983);
        let b = Rational::new(1, 999_979);
        assert!(b > a);
        assert_eq!(a + b, Rational::new(999_979 + 999_983, 999_983 * 999_979));
        assert_eq!((a + b) - b, a);
        assert_eq!(a * b / b, a);

        // cross products above i64 still compare correctly
        let big = Rational::new(Int::max_value() / 2, 999_999_937);
        let bigger = Rational::new(Int::max_value() / 2 + 1, 999_999_937);
        assert!(big < bigger);
        assert!(Rational::new(Int::max_value(), 3) > Rational::new(Int::max_value(), 5));
    }

    #[test]
    fn parsing_bounds_precision() {
        assert_eq!(
            "0.1234567890123".parse::<Rational>().unwrap_err().kind(),
            RationalErrorKind::TooPrecise
        );
        assert!("0.123456789012".parse::<Rational>().is_ok());
        assert_eq!(
            "1/1000003".parse::<Rational>().unwrap_err().kind(),
            RationalErrorKind::TooPrecise
        );
        // reduced before checking
        assert_eq!("2/2000000".parse(), Ok(Rational::new(1, 1_000_000)));
    }

    #[test]
    #[should_panic(expected = "does not fit into 64 bits")]
    fn overflow_is_reported() {
        let _ = Rational::new(1, 999_999_937)
            + Rational::new(1, 999_999_929)
            + Rational::new(1, 999_999_893);
    }

    #[test]
    fn millis() {
        assert_eq!(Rational::from_millis(2100), Rational::new(21, 10));
        assert_eq!(Rational::new(21, 10) * 1000, Rational::int(2100));
        assert!((Rational::new(1, 3).to_f64() - 1.0 / 3.0).abs() < 1e-12);
    }
}
