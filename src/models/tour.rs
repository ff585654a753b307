//! Mutable tour over visit indices.
//!
//! A tour is stored as successor/predecessor arrays indexed by visit id, so
//! insertion after a known visit, removal, and neighbour queries are O(1).

use std::fmt;

use crate::error::{Result, TourError};

/// Sentinel for "no successor / no predecessor".
pub const NOT_SET: usize = usize::MAX;

/// A directed edge between two consecutive visits of a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    /// Visit the edge leaves from.
    pub from: usize,
    /// Visit the edge arrives at.
    pub to: usize,
}

/// An ordered sequence of unique visit indices.
///
/// A tour always contains its `first` visit. The optional `last` visit is
/// fixed: when `last == first` the tour is closed (cyclic), when it differs
/// the tour is open with a fixed end, and when it is `None` the tour is open
/// and may end anywhere.
///
/// # Examples
///
/// ```
/// use u_tour::models::Tour;
///
/// let mut tour = Tour::new([0, 1, 2], Some(0)).unwrap();
/// assert!(tour.is_closed());
/// tour.insert_after(1, 3).unwrap();
/// assert_eq!(tour.to_vec(), vec![0, 1, 3, 2]);
///
/// let pairs: Vec<(usize, usize)> = tour.pairs().map(|p| (p.from, p.to)).collect();
/// assert_eq!(pairs, vec![(0, 1), (1, 3), (3, 2), (2, 0)]);
/// ```
#[derive(Debug, Clone)]
pub struct Tour {
    first: usize,
    last: Option<usize>,
    tail: usize,
    next: Vec<usize>,
    prev: Vec<usize>,
    count: usize,
}

impl Tour {
    /// Creates a tour from an explicit visit sequence.
    ///
    /// The first element becomes the fixed start. When `last` is a visit
    /// other than the start it must either be the final element of
    /// `visits` or absent from it, in which case it is appended.
    pub fn new<I: IntoIterator<Item = usize>>(visits: I, last: Option<usize>) -> Result<Self> {
        let mut sequence: Vec<usize> = visits.into_iter().collect();
        let first = *sequence
            .first()
            .ok_or_else(|| TourError::Argument("a tour needs at least one visit".into()))?;

        if let Some(l) = last {
            if l != first {
                match sequence.iter().position(|&v| v == l) {
                    Some(pos) if pos + 1 != sequence.len() => {
                        return Err(TourError::Argument(format!(
                            "fixed last visit {l} must end the sequence"
                        )));
                    }
                    Some(_) => {}
                    None => sequence.push(l),
                }
            }
        }

        let size = sequence.iter().copied().max().map_or(0, |m| m + 1);
        let mut tour = Self {
            first,
            last,
            tail: first,
            next: vec![NOT_SET; size],
            prev: vec![NOT_SET; size],
            count: 1,
        };

        for &visit in &sequence[1..] {
            let tail = tour.tail;
            tour.link_after(tail, visit)?;
        }
        Ok(tour)
    }

    /// Creates a tour containing only `first` (plus a fixed `last` if it
    /// differs from `first`).
    pub fn singleton(first: usize, last: Option<usize>) -> Self {
        let size = first.max(last.unwrap_or(0)) + 1;
        let mut next = vec![NOT_SET; size];
        let mut prev = vec![NOT_SET; size];
        let mut tail = first;
        let mut count = 1;
        if let Some(l) = last {
            if l != first {
                next[first] = l;
                prev[l] = first;
                tail = l;
                count = 2;
            }
        }
        Self {
            first,
            last,
            tail,
            next,
            prev,
            count,
        }
    }

    /// The fixed start of this tour.
    pub fn first(&self) -> usize {
        self.first
    }

    /// The fixed end of this tour, if any. Equals [`first`](Self::first)
    /// for closed tours.
    pub fn last(&self) -> Option<usize> {
        self.last
    }

    /// The final visit in enumeration order.
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Returns `true` if the tour returns to its start.
    pub fn is_closed(&self) -> bool {
        self.last == Some(self.first)
    }

    /// Number of visits in this tour.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns `true` if `visit` is part of this tour.
    pub fn contains(&self, visit: usize) -> bool {
        visit == self.first || (visit < self.prev.len() && self.prev[visit] != NOT_SET)
    }

    /// Successor of `visit`. For closed tours the tail wraps to the start.
    pub fn next(&self, visit: usize) -> Option<usize> {
        if !self.contains(visit) {
            return None;
        }
        match self.next[visit] {
            NOT_SET if self.is_closed() => Some(self.first),
            NOT_SET => None,
            n => Some(n),
        }
    }

    /// Predecessor of `visit`. For closed tours the start wraps to the tail.
    pub fn prev(&self, visit: usize) -> Option<usize> {
        if visit == self.first {
            return if self.is_closed() {
                Some(self.tail)
            } else {
                None
            };
        }
        if !self.contains(visit) {
            return None;
        }
        Some(self.prev[visit])
    }

    fn is_fixed_end(&self, visit: usize) -> bool {
        matches!(self.last, Some(l) if l != self.first && l == visit)
    }

    /// Inserts `visit` directly after `pred`.
    ///
    /// Fails if `pred` is not in the tour, `visit` already is, or `pred` is
    /// the fixed end of an open tour.
    pub fn insert_after(&mut self, pred: usize, visit: usize) -> Result<()> {
        if !self.contains(pred) {
            return Err(TourError::InvalidOperation(format!(
                "predecessor {pred} is not part of the tour"
            )));
        }
        if self.is_fixed_end(pred) {
            return Err(TourError::InvalidOperation(format!(
                "cannot insert after fixed last visit {pred}"
            )));
        }
        self.link_after(pred, visit)
    }

    fn link_after(&mut self, pred: usize, visit: usize) -> Result<()> {
        if self.contains(visit) {
            return Err(TourError::InvalidOperation(format!(
                "visit {visit} is already part of the tour"
            )));
        }
        if visit >= self.next.len() {
            self.next.resize(visit + 1, NOT_SET);
            self.prev.resize(visit + 1, NOT_SET);
        }

        let succ = self.next[pred];
        self.next[pred] = visit;
        self.prev[visit] = pred;
        self.next[visit] = succ;
        if succ == NOT_SET {
            self.tail = visit;
        } else {
            self.prev[succ] = visit;
        }
        self.count += 1;
        Ok(())
    }

    /// Removes `visit` from the tour.
    ///
    /// Fails for the start, the fixed end of an open tour, or a visit that
    /// is not part of the tour.
    pub fn remove(&mut self, visit: usize) -> Result<()> {
        if visit == self.first {
            return Err(TourError::InvalidOperation(format!(
                "cannot remove first visit {visit}"
            )));
        }
        if self.is_fixed_end(visit) {
            return Err(TourError::InvalidOperation(format!(
                "cannot remove fixed last visit {visit}"
            )));
        }
        if !self.contains(visit) {
            return Err(TourError::InvalidOperation(format!(
                "visit {visit} is not part of the tour"
            )));
        }

        let p = self.prev[visit];
        let s = self.next[visit];
        self.next[p] = s;
        if s == NOT_SET {
            self.tail = p;
        } else {
            self.prev[s] = p;
        }
        self.next[visit] = NOT_SET;
        self.prev[visit] = NOT_SET;
        self.count -= 1;
        Ok(())
    }

    /// Moves `visit` to directly after `pred`.
    pub fn shift_after(&mut self, visit: usize, pred: usize) -> Result<()> {
        if visit == pred {
            return Err(TourError::InvalidOperation(format!(
                "cannot shift visit {visit} after itself"
            )));
        }
        self.remove(visit)?;
        self.insert_after(pred, visit)
    }

    /// Enumerates the visits in tour order, starting at `first`.
    pub fn iter(&self) -> TourIter<'_> {
        TourIter {
            tour: self,
            current: Some(self.first),
        }
    }

    /// Enumerates consecutive edges, including the closing edge
    /// `(tail, first)` for closed tours with more than one visit.
    pub fn pairs(&self) -> Pairs<'_> {
        Pairs {
            tour: self,
            current: Some(self.first),
        }
    }

    /// Collects the visits in tour order.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

impl PartialEq for Tour {
    fn eq(&self, other: &Self) -> bool {
        self.first == other.first
            && self.last == other.last
            && self.count == other.count
            && self.iter().eq(other.iter())
    }
}

impl Eq for Tour {}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")?;
        if self.is_closed() {
            write!(f, "->{}", self.first)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Tour {
    type Item = usize;
    type IntoIter = TourIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the visits of a [`Tour`].
pub struct TourIter<'a> {
    tour: &'a Tour,
    current: Option<usize>,
}

impl Iterator for TourIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let visit = self.current?;
        let n = self.tour.next[visit];
        self.current = (n != NOT_SET).then_some(n);
        Some(visit)
    }
}

/// Iterator over the edges of a [`Tour`].
pub struct Pairs<'a> {
    tour: &'a Tour,
    current: Option<usize>,
}

impl Iterator for Pairs<'_> {
    type Item = Pair;

    fn next(&mut self) -> Option<Pair> {
        let from = self.current?;
        let n = self.tour.next[from];
        if n != NOT_SET {
            self.current = Some(n);
            return Some(Pair { from, to: n });
        }
        self.current = None;
        if self.tour.is_closed() && self.tour.count > 1 {
            Some(Pair {
                from,
                to: self.tour.first,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pairs_of(tour: &Tour) -> Vec<(usize, usize)> {
        tour.pairs().map(|p| (p.from, p.to)).collect()
    }

    #[test]
    fn test_new_closed() {
        let tour = Tour::new([0, 1, 2, 3], Some(0)).expect("valid");
        assert!(tour.is_closed());
        assert_eq!(tour.count(), 4);
        assert_eq!(tour.to_vec(), vec![0, 1, 2, 3]);
        assert_eq!(pairs_of(&tour), vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(tour.next(3), Some(0));
        assert_eq!(tour.prev(0), Some(3));
    }

    #[test]
    fn test_new_open() {
        let tour = Tour::new([2, 0, 1], None).expect("valid");
        assert!(!tour.is_closed());
        assert_eq!(tour.first(), 2);
        assert_eq!(tour.next(1), None);
        assert_eq!(tour.prev(2), None);
        assert_eq!(pairs_of(&tour), vec![(2, 0), (0, 1)]);
    }

    #[test]
    fn test_new_fixed_last_appended() {
        let tour = Tour::new([0, 1], Some(3)).expect("valid");
        assert_eq!(tour.to_vec(), vec![0, 1, 3]);
        assert_eq!(tour.last(), Some(3));
        assert_eq!(tour.tail(), 3);
    }

    #[test]
    fn test_new_fixed_last_must_end_sequence() {
        assert!(matches!(
            Tour::new([0, 3, 1], Some(3)),
            Err(TourError::Argument(_))
        ));
    }

    #[test]
    fn test_new_rejects_duplicates_and_empty() {
        assert!(Tour::new([0, 1, 1], None).is_err());
        assert!(Tour::new(Vec::<usize>::new(), None).is_err());
    }

    #[test]
    fn test_singleton() {
        let closed = Tour::singleton(4, Some(4));
        assert_eq!(closed.to_vec(), vec![4]);
        assert_eq!(closed.count(), 1);
        assert!(pairs_of(&closed).is_empty());
        assert_eq!(closed.next(4), Some(4));

        let fixed = Tour::singleton(0, Some(5));
        assert_eq!(fixed.to_vec(), vec![0, 5]);
    }

    #[test]
    fn test_insert_after() {
        let mut tour = Tour::new([0, 1, 2], Some(0)).expect("valid");
        tour.insert_after(2, 7).expect("valid insert");
        assert_eq!(tour.to_vec(), vec![0, 1, 2, 7]);
        assert_eq!(tour.tail(), 7);
        assert_eq!(tour.next(7), Some(0));
        assert_eq!(tour.count(), 4);
    }

    #[test]
    fn test_insert_after_invalid() {
        let mut tour = Tour::new([0, 1, 2], Some(0)).expect("valid");
        assert!(matches!(
            tour.insert_after(9, 3),
            Err(TourError::InvalidOperation(_))
        ));
        assert!(matches!(
            tour.insert_after(0, 2),
            Err(TourError::InvalidOperation(_))
        ));
        assert_eq!(tour.to_vec(), vec![0, 1, 2]);
    }

    #[test]
    fn test_insert_after_fixed_last_fails() {
        let mut tour = Tour::new([0, 1, 3], Some(3)).expect("valid");
        assert!(tour.insert_after(3, 2).is_err());
        tour.insert_after(1, 2).expect("valid insert");
        assert_eq!(tour.to_vec(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_remove() {
        let mut tour = Tour::new([0, 1, 2, 3], Some(0)).expect("valid");
        tour.remove(3).expect("valid remove");
        assert_eq!(tour.to_vec(), vec![0, 1, 2]);
        assert_eq!(tour.tail(), 2);
        tour.remove(1).expect("valid remove");
        assert_eq!(tour.to_vec(), vec![0, 2]);
        assert!(!tour.contains(1));
        assert_eq!(tour.count(), 2);
    }

    #[test]
    fn test_remove_endpoints_fails() {
        let mut tour = Tour::new([0, 1, 2], Some(2)).expect("valid");
        assert!(tour.remove(0).is_err());
        assert!(tour.remove(2).is_err());
        assert!(tour.remove(5).is_err());
        assert_eq!(tour.to_vec(), vec![0, 1, 2]);
    }

    #[test]
    fn test_shift_after() {
        let mut tour = Tour::new([0, 1, 2, 3], Some(0)).expect("valid");
        tour.shift_after(1, 3).expect("valid shift");
        assert_eq!(tour.to_vec(), vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_clone_is_independent() {
        let tour = Tour::new([0, 1, 2], Some(0)).expect("valid");
        let mut copy = tour.clone();
        copy.insert_after(0, 5).expect("valid insert");
        assert_eq!(tour.to_vec(), vec![0, 1, 2]);
        assert_eq!(copy.to_vec(), vec![0, 5, 1, 2]);
        assert_ne!(tour, copy);
    }

    #[test]
    fn test_iter_restartable() {
        let tour = Tour::new([3, 1, 2], None).expect("valid");
        let a: Vec<usize> = tour.iter().collect();
        let b: Vec<usize> = (&tour).into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_display() {
        let tour = Tour::new([0, 1, 2], Some(0)).expect("valid");
        assert_eq!(tour.to_string(), "[0, 1, 2]->0");
        let open = Tour::new([0, 1], None).expect("valid");
        assert_eq!(open.to_string(), "[0, 1]");
    }

    fn arb_tour() -> impl Strategy<Value = (Vec<usize>, bool)> {
        (2usize..30).prop_flat_map(|n| {
            (
                Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
                any::<bool>(),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_insert_places_visit_after_pred(
            (visits, closed) in arb_tour(),
            pick in any::<prop::sample::Index>(),
        ) {
            let last = if closed { Some(visits[0]) } else { None };
            let mut tour = Tour::new(visits.clone(), last).expect("valid");
            let pred = visits[pick.index(visits.len())];
            let visit = visits.len() + 3;
            let before = tour.count();

            tour.insert_after(pred, visit).expect("valid insert");

            prop_assert_eq!(tour.count(), before + 1);
            let order = tour.to_vec();
            let at = order.iter().position(|&v| v == pred).expect("pred present");
            prop_assert_eq!(order[at + 1], visit);
        }

        #[test]
        fn prop_remove_inverts_insert(
            (visits, closed) in arb_tour(),
            pick in any::<prop::sample::Index>(),
        ) {
            let last = if closed { Some(visits[0]) } else { None };
            let mut tour = Tour::new(visits.clone(), last).expect("valid");
            let order = tour.to_vec();
            let pairs = pairs_of(&tour);
            let pred = visits[pick.index(visits.len())];

            tour.insert_after(pred, 1000).expect("valid insert");
            tour.remove(1000).expect("valid remove");

            prop_assert_eq!(tour.to_vec(), order);
            prop_assert_eq!(pairs_of(&tour), pairs);
        }

        #[test]
        fn prop_successors_cover_tour(
            (visits, closed) in arb_tour(),
        ) {
            let last = if closed { Some(visits[0]) } else { None };
            let tour = Tour::new(visits.clone(), last).expect("valid");
            let mut current = tour.first();
            let mut seen = 1;
            while let Some(n) = tour.next(current) {
                if n == tour.first() {
                    break;
                }
                current = n;
                seen += 1;
                prop_assert!(seen <= visits.len());
            }
            prop_assert_eq!(seen, tour.count());
            let expected_pairs = if closed { visits.len() } else { visits.len() - 1 };
            prop_assert_eq!(tour.pairs().count(), expected_pairs);
        }
    }
}
