//! Lexicographic fitness: served visits first, travel weight second.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Quality of a solution.
///
/// More served visits always wins; among equal counts the lower weight wins.
/// [`Fitness::INFINITE`] compares worse than any reachable value.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use u_tour::objective::Fitness;
///
/// let all_served = Fitness::new(5, 120.0);
/// let one_missing = Fitness::new(4, 80.0);
/// assert_eq!(all_served.compare(&one_missing), Ordering::Less);
/// assert!(all_served.is_better_than(&Fitness::INFINITE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    /// Number of served visits.
    pub customers: i32,
    /// Total travel weight (plus penalties).
    pub weight: f64,
}

impl Fitness {
    /// The neutral element.
    pub const ZERO: Fitness = Fitness {
        customers: 0,
        weight: 0.0,
    };

    /// Worse than anything.
    pub const INFINITE: Fitness = Fitness {
        customers: i32::MIN,
        weight: f64::MAX,
    };

    /// Creates a new fitness.
    pub fn new(customers: i32, weight: f64) -> Self {
        Self { customers, weight }
    }

    /// A pure weight change (no change in served visits).
    pub fn from_weight(weight: f64) -> Self {
        Self {
            customers: 0,
            weight,
        }
    }

    /// Orders by quality: `Less` means `self` is better.
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.customers == other.customers {
            self.weight.total_cmp(&other.weight)
        } else {
            other.customers.cmp(&self.customers)
        }
    }

    /// Returns `true` if `self` is strictly better than `other`.
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }
}

impl Add for Fitness {
    type Output = Fitness;

    fn add(self, rhs: Fitness) -> Fitness {
        Fitness {
            customers: self.customers.saturating_add(rhs.customers),
            weight: self.weight + rhs.weight,
        }
    }
}

impl Sub for Fitness {
    type Output = Fitness;

    fn sub(self, rhs: Fitness) -> Fitness {
        Fitness {
            customers: self.customers.saturating_sub(rhs.customers),
            weight: self.weight - rhs.weight,
        }
    }
}

impl fmt::Display for Fitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:.2}", self.customers, self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equal_customers_compare_weight() {
        let a = Fitness::new(3, 10.0);
        let b = Fitness::new(3, 12.0);
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);
        assert_eq!(a.compare(&a), Ordering::Equal);
    }

    #[test]
    fn test_more_customers_wins() {
        let a = Fitness::new(4, 1000.0);
        let b = Fitness::new(3, 1.0);
        assert!(a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
    }

    #[test]
    fn test_infinite_is_worst() {
        assert!(Fitness::ZERO.is_better_than(&Fitness::INFINITE));
        assert!(Fitness::new(1, 1e300).is_better_than(&Fitness::INFINITE));
    }

    #[test]
    fn test_display() {
        assert_eq!(Fitness::new(2, 1.5).to_string(), "2@1.50");
    }

    #[test]
    fn test_serde() {
        let f = Fitness::new(7, 12.25);
        let s = toml::to_string(&f).expect("serialize");
        let back: Fitness = toml::from_str(&s).expect("deserialize");
        assert_eq!(back, f);
    }

    fn arb_fitness() -> impl Strategy<Value = Fitness> {
        (-1000i32..1000, -1_000_000i64..1_000_000)
            .prop_map(|(c, w)| Fitness::new(c, w as f64 / 4.0))
    }

    proptest! {
        #[test]
        fn prop_zero_is_identity(f in arb_fitness()) {
            prop_assert_eq!(f + Fitness::ZERO, f);
        }

        #[test]
        fn prop_subtract_inverts_add(f in arb_fitness(), g in arb_fitness()) {
            prop_assert_eq!((f + g) - g, f);
        }

        #[test]
        fn prop_same_customers_follows_weight(c in -100i32..100, a in -1e6f64..1e6, b in -1e6f64..1e6) {
            let fa = Fitness::new(c, a);
            let fb = Fitness::new(c, b);
            prop_assert_eq!(fa.compare(&fb), a.total_cmp(&b));
        }

        #[test]
        fn prop_more_customers_always_wins(c in -100i32..100, extra in 1i32..100, a in -1e6f64..1e6, b in -1e6f64..1e6) {
            let more = Fitness::new(c + extra, a);
            let fewer = Fitness::new(c, b);
            prop_assert!(more.is_better_than(&fewer));
        }
    }
}
