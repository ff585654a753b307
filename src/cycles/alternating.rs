//! Alternating cycles between two parent tours.

use std::collections::BTreeMap;

use super::{find_cycles, NOT_SET};

/// Alternating (AB) cycles between two tours.
///
/// An entry `from -> (via, to)` records the parent-A edge `from → via`
/// followed backwards along the parent-B edge `to → via`. Following `to`
/// repeatedly walks one AB-cycle.
#[derive(Debug, Clone)]
pub struct AsymmetricAlternatingCycles {
    next: Vec<(usize, usize)>,
    cycles: BTreeMap<usize, usize>,
    dirty: bool,
}

impl AsymmetricAlternatingCycles {
    /// Creates an empty structure for `len` visits.
    pub fn new(len: usize) -> Self {
        Self {
            next: vec![(NOT_SET, NOT_SET); len],
            cycles: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Number of visits covered.
    pub fn len(&self) -> usize {
        self.next.len()
    }

    /// Returns `true` if this structure covers no visits.
    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Records the alternating step `from → via ← to`.
    pub fn add_edge(&mut self, from: usize, via: usize, to: usize) {
        self.next[from] = (via, to);
        self.dirty = true;
    }

    /// The alternating step leaving `from`, as `(via, to)`.
    pub fn next(&self, from: usize) -> Option<(usize, usize)> {
        match self.next.get(from) {
            Some(&(via, to)) if to != NOT_SET => Some((via, to)),
            _ => None,
        }
    }

    /// Cycle id → number of steps in that cycle.
    pub fn cycles(&mut self) -> &BTreeMap<usize, usize> {
        if self.dirty {
            let next = &self.next;
            let (cycles, _) = find_cycles(next.len(), |i| next[i].1);
            self.cycles = cycles;
            self.dirty = false;
        }
        &self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_alternating_cycle() {
        let mut ab = AsymmetricAlternatingCycles::new(4);
        ab.add_edge(0, 1, 2);
        ab.add_edge(2, 3, 0);
        let cycles = ab.cycles().clone();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[&0], 2);
        assert_eq!(ab.next(0), Some((1, 2)));
        assert_eq!(ab.next(1), None);
    }

    #[test]
    fn test_empty() {
        let mut ab = AsymmetricAlternatingCycles::new(3);
        assert!(ab.cycles().is_empty());
        assert_eq!(ab.len(), 3);
    }
}
