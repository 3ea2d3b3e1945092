use derive_more::Display;
use num_traits::Zero;
use num_traits::bounds::UpperBounded;
use ordered_float::OrderedFloat;

/// A search score (`g`, `h` or `f`).
///
/// Totally ordered so it can rank heap entries. `NaN` sorts above every other
/// value, including infinity.
#[derive(Copy, Clone, Default, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
#[display("{_0}")]
pub struct Score(pub OrderedFloat<f32>);

impl Score {
    #[inline(always)]
    pub fn new(f: f32) -> Self {
        Self(OrderedFloat(f))
    }

    /// The score of something not reached yet.
    #[inline(always)]
    pub fn infinity() -> Self {
        Self(OrderedFloat(f32::INFINITY))
    }

    #[inline(always)]
    pub fn get(&self) -> f32 {
        self.0.into_inner()
    }

    /// Whether this is a reachable (finite) score.
    #[inline(always)]
    pub fn valid(&self) -> bool {
        self.0.is_finite()
    }
}

impl From<f32> for Score {
    fn from(f: f32) -> Self {
        Self::new(f)
    }
}

impl std::ops::Add for Score {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl std::ops::Sub for Score {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl std::ops::AddAssign for Score {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Zero for Score {
    #[inline(always)]
    fn is_zero(&self) -> bool {
        self.0 == OrderedFloat(0.0f32)
    }
    #[inline(always)]
    fn zero() -> Self {
        Self::new(0.0f32)
    }
}
impl UpperBounded for Score {
    fn max_value() -> Self {
        Self::infinity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero() {
        assert!(Score::new(0.0f32).is_zero());
        assert!(Score::zero().valid());
        assert!(!Score::infinity().valid());
    }

    #[test]
    fn order() {
        assert!(Score::new(0.0f32) <= Score::new(0.0f32));
        assert!(Score::new(1.0f32) < Score::infinity());
        assert!(Score::infinity() < Score::new(f32::NAN));
    }

    #[test]
    fn sum() {
        let mut f = Score::zero();
        f += Score::new(1.0f32);
        f += Score::new(1.0f32);
        assert_eq!(f, Score::new(2.0f32));
        assert_eq!(f - Score::new(0.5f32), Score::new(1.5f32));
        f += Score::infinity();
        assert_eq!(f, Score::max_value());
    }

    #[test]
    fn display() {
        assert_eq!(Score::new(2.5f32).to_string(), "2.5");
    }
}
