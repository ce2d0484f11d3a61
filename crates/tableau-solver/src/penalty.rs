use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Tolerance used for every "is this zero / is this smaller" decision.
pub const EPSILON: f64 = 1e-9;

/// A number of the form `value + penalty·M` for a symbolic, arbitrarily large `M`.
///
/// Ordering looks at the penalty part first, so any nonzero multiple of `M` dominates
/// ordinary magnitudes. This is what lets the Big-M method run without picking a concrete M.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PenaltyScalar {
    /// Finite part
    pub value: f64,
    /// Coefficient of `M`
    pub penalty: f64,
}

impl PenaltyScalar {
    pub const ZERO: Self = Self { value: 0.0, penalty: 0.0 };

    /// `M` itself
    pub const M: Self = Self { value: 0.0, penalty: 1.0 };

    pub const fn new(value: f64, penalty: f64) -> Self {
        Self { value, penalty }
    }

    pub const fn real(value: f64) -> Self {
        Self { value, penalty: 0.0 }
    }

    pub fn is_real(&self) -> bool {
        self.penalty.abs() <= EPSILON
    }

    pub fn is_zero(&self) -> bool {
        self.is_zero_within(EPSILON)
    }

    pub fn is_zero_within(&self, tol: f64) -> bool {
        self.penalty.abs() <= tol && self.value.abs() <= tol
    }

    pub fn is_negative(&self) -> bool {
        self.is_negative_within(EPSILON)
    }

    /// Negative by more than `tol`, judged on the penalty part whenever it is nonzero.
    pub fn is_negative_within(&self, tol: f64) -> bool {
        if self.penalty.abs() <= tol {
            self.value < -tol
        } else {
            self.penalty < -tol
        }
    }

    pub fn less_than(&self, other: &Self) -> bool {
        self.less_than_within(other, EPSILON)
    }

    pub fn less_than_within(&self, other: &Self, tol: f64) -> bool {
        if (self.penalty - other.penalty).abs() > tol {
            self.penalty < other.penalty
        } else {
            self.value < other.value - tol
        }
    }

    /// Tolerant total order: penalty part first, then the finite part.
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.less_than(other) {
            Ordering::Less
        } else if other.less_than(self) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.value * factor, self.penalty * factor)
    }
}

impl From<f64> for PenaltyScalar {
    fn from(value: f64) -> Self {
        Self::real(value)
    }
}

impl Add for PenaltyScalar {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.value + rhs.value, self.penalty + rhs.penalty)
    }
}

impl AddAssign for PenaltyScalar {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for PenaltyScalar {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.value - rhs.value, self.penalty - rhs.penalty)
    }
}

impl SubAssign for PenaltyScalar {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for PenaltyScalar {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl Div<f64> for PenaltyScalar {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.value / rhs, self.penalty / rhs)
    }
}

impl Neg for PenaltyScalar {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.value, -self.penalty)
    }
}

/// Shortest decimal form: integers without a fraction, everything else with up to 4 places.
pub(crate) fn format_number(x: f64) -> String {
    if x.is_infinite() {
        return if x > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }
    if x.abs() <= EPSILON {
        return "0".to_string();
    }
    if (x - x.round()).abs() <= EPSILON {
        return format!("{}", x.round());
    }
    let s = format!("{:.4}", x);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl fmt::Display for PenaltyScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_real() {
            return write!(f, "{}", format_number(self.value));
        }
        let magnitude = self.penalty.abs();
        let m_part = if (magnitude - 1.0).abs() <= EPSILON {
            "M".to_string()
        } else {
            format!("{}M", format_number(magnitude))
        };
        if self.value.abs() > EPSILON {
            let sign = if self.penalty > 0.0 { '+' } else { '-' };
            write!(f, "{} {} {}", format_number(self.value), sign, m_part)
        } else if self.penalty < 0.0 {
            write!(f, "-{}", m_part)
        } else {
            write!(f, "{}", m_part)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalty_dominates_value() {
        let big = PenaltyScalar::real(1e12);
        let m = PenaltyScalar::M;
        assert!(big.less_than(&m));
        assert!((-m).less_than(&PenaltyScalar::real(-1e12)));
        assert!((-m).is_negative());
        assert!(!m.is_negative());
    }

    #[test]
    fn test_value_compared_when_penalties_match() {
        let a = PenaltyScalar::new(-3.0, 2.0);
        let b = PenaltyScalar::new(1.0, 2.0);
        assert!(a.less_than(&b));
        assert!(!b.less_than(&a));
        assert_eq!(a.compare(&a), Ordering::Equal);
        assert_eq!(b.compare(&a), Ordering::Greater);
    }

    #[test]
    fn test_near_equal_is_not_less() {
        let a = PenaltyScalar::real(1.0);
        let b = PenaltyScalar::real(1.0 + 1e-12);
        assert!(!a.less_than(&b));
        assert!(!b.less_than(&a));
        assert!(PenaltyScalar::real(-1e-12).is_zero());
        assert!(!PenaltyScalar::real(-1e-12).is_negative());
    }

    #[test]
    fn test_comparisons_with_a_looser_tolerance() {
        let tiny = PenaltyScalar::new(-1e-7, 0.0);
        assert!(tiny.is_negative());
        assert!(!tiny.is_negative_within(1e-6));
        assert!(tiny.is_zero_within(1e-6));
        assert!(PenaltyScalar::new(0.0, -1e-7).is_zero_within(1e-6));

        let a = PenaltyScalar::new(1.0, 2.0);
        let b = PenaltyScalar::new(1.0 + 1e-7, 2.0);
        assert!(a.less_than(&b));
        assert!(!a.less_than_within(&b, 1e-6));
    }

    #[test]
    fn test_componentwise_arithmetic() {
        let a = PenaltyScalar::new(2.0, -1.0);
        let b = PenaltyScalar::new(0.5, 3.0);
        assert_eq!(a + b, PenaltyScalar::new(2.5, 2.0));
        assert_eq!(a - b, PenaltyScalar::new(1.5, -4.0));
        assert_eq!(a * 2.0, PenaltyScalar::new(4.0, -2.0));
        assert_eq!(a / 2.0, PenaltyScalar::new(1.0, -0.5));
        assert_eq!(-a, PenaltyScalar::new(-2.0, 1.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(PenaltyScalar::real(3.0).to_string(), "3");
        assert_eq!(PenaltyScalar::real(0.5).to_string(), "0.5");
        assert_eq!(PenaltyScalar::M.to_string(), "M");
        assert_eq!(PenaltyScalar::new(0.0, -2.0).to_string(), "-2M");
        assert_eq!(PenaltyScalar::new(4.0, 1.5).to_string(), "4 + 1.5M");
        assert_eq!(PenaltyScalar::new(-1.0, -1.0).to_string(), "-1 - M");
    }
}
