//! Successor array with cycle membership tracking.

use std::collections::BTreeMap;

use super::{find_cycles, NOT_SET};
use crate::models::Pair;

/// A successor array `next[visit]` whose cycle decomposition is tracked.
///
/// [`add_edge`](Self::add_edge) overwrites one successor and leaves the
/// decomposition to be rebuilt on the next query.
/// [`swap_successors`](Self::swap_successors) keeps it up to date
/// incrementally: on a permutation, exchanging two successors either splits
/// one cycle or joins two, and only the smaller side is relabelled.
///
/// Cycle ids are unique among the live cycles; [`head`](Self::head) gives a
/// member of each. Cloning produces an independent copy.
///
/// # Examples
///
/// ```
/// use u_tour::cycles::AsymmetricCycles;
///
/// let mut cycles = AsymmetricCycles::new(4);
/// cycles.add_edge(0, 1);
/// cycles.add_edge(1, 0);
/// cycles.add_edge(2, 3);
/// cycles.add_edge(3, 2);
/// assert_eq!(cycles.cycle_count(), 2);
///
/// // reconnect into a single cycle 0 -> 1 -> 2 -> 3 -> 0
/// cycles.swap_successors(1, 3);
/// assert_eq!(cycles.cycle_count(), 1);
/// assert_eq!(cycles.next(1), Some(2));
/// assert_eq!(cycles.next(3), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct AsymmetricCycles {
    next: Vec<usize>,
    cycles: BTreeMap<usize, usize>,
    heads: BTreeMap<usize, usize>,
    cycle_of: Vec<usize>,
    next_id: usize,
    dirty: bool,
}

impl AsymmetricCycles {
    /// Creates a structure for `len` visits without any edges.
    pub fn new(len: usize) -> Self {
        Self {
            next: vec![NOT_SET; len],
            cycles: BTreeMap::new(),
            heads: BTreeMap::new(),
            cycle_of: vec![NOT_SET; len],
            next_id: len,
            dirty: false,
        }
    }

    /// Creates a structure from a sequence of edges.
    pub fn from_pairs<I: IntoIterator<Item = Pair>>(len: usize, pairs: I) -> Self {
        let mut cycles = Self::new(len);
        for pair in pairs {
            cycles.add_edge(pair.from, pair.to);
        }
        cycles
    }

    /// Number of visits covered.
    pub fn len(&self) -> usize {
        self.next.len()
    }

    /// Returns `true` if this structure covers no visits.
    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Sets the successor of `from` to `to`.
    ///
    /// The decomposition is rebuilt in O(n) on the next query.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        self.next[from] = to;
        self.dirty = true;
    }

    /// Exchanges the successors of `u` and `v`.
    ///
    /// When both lie on cycles the decomposition is updated in
    /// O(size of the smaller resulting or merged cycle): a shared cycle is
    /// split and the shorter part gets a fresh id, two distinct cycles are
    /// joined under the id of the larger one.
    pub fn swap_successors(&mut self, u: usize, v: usize) {
        if u == v {
            return;
        }
        self.refresh();
        let (cu, cv) = (self.cycle_of[u], self.cycle_of[v]);
        if cu == NOT_SET || cv == NOT_SET {
            self.next.swap(u, v);
            self.dirty = true;
        } else if cu == cv {
            self.next.swap(u, v);
            self.split(u, v, cu);
        } else {
            self.join(cu, cv);
            self.next.swap(u, v);
        }
    }

    /// Relabels the cycle through `start` with `id`, returning its length.
    fn relabel(&mut self, start: usize, id: usize) -> usize {
        let mut count = 0;
        let mut v = start;
        loop {
            self.cycle_of[v] = id;
            count += 1;
            v = self.next[v];
            if v == start || v == NOT_SET {
                break;
            }
        }
        count
    }

    /// `u` and `v` were on cycle `id` before their successors were swapped.
    fn split(&mut self, u: usize, v: usize, id: usize) {
        // walk both new cycles in lockstep until the shorter one closes
        let (mut a, mut b) = (self.next[u], self.next[v]);
        let mut len = 1;
        let shorter = loop {
            if a == u {
                break u;
            }
            if b == v {
                break v;
            }
            a = self.next[a];
            b = self.next[b];
            len += 1;
        };
        let longer = if shorter == u { v } else { u };

        let fresh = self.next_id;
        self.next_id += 1;
        self.relabel(shorter, fresh);
        self.cycles.insert(fresh, len);
        self.heads.insert(fresh, shorter);
        if let Some(total) = self.cycles.get_mut(&id) {
            *total -= len;
        }
        self.heads.insert(id, longer);
    }

    /// Relabels the smaller of cycles `a` and `b` into the larger; called
    /// before the successors are swapped.
    fn join(&mut self, a: usize, b: usize) {
        let (Some(&len_a), Some(&len_b)) = (self.cycles.get(&a), self.cycles.get(&b)) else {
            self.dirty = true;
            return;
        };
        let (small, large, small_len) = if len_a <= len_b {
            (a, b, len_a)
        } else {
            (b, a, len_b)
        };
        if let Some(head) = self.heads.remove(&small) {
            self.relabel(head, large);
        }
        self.cycles.remove(&small);
        if let Some(total) = self.cycles.get_mut(&large) {
            *total += small_len;
        }
    }

    /// Successor of `visit`, if set.
    pub fn next(&self, visit: usize) -> Option<usize> {
        match self.next.get(visit) {
            Some(&n) if n != NOT_SET => Some(n),
            _ => None,
        }
    }

    /// The raw successor array (`NOT_SET` for visits without successor).
    pub fn next_array(&self) -> &[usize] {
        &self.next
    }

    fn refresh(&mut self) {
        if self.dirty {
            let next = &self.next;
            let (cycles, cycle_of) = find_cycles(next.len(), |i| next[i]);
            self.heads = cycles.keys().map(|&id| (id, id)).collect();
            self.cycles = cycles;
            self.cycle_of = cycle_of;
            self.next_id = self.next_id.max(self.next.len());
            self.dirty = false;
        }
    }

    /// Cycle id → number of visits in that cycle.
    pub fn cycles(&mut self) -> &BTreeMap<usize, usize> {
        self.refresh();
        &self.cycles
    }

    /// Number of distinct cycles.
    pub fn cycle_count(&mut self) -> usize {
        self.cycles().len()
    }

    /// Id of the cycle `visit` belongs to, if it lies on a cycle.
    pub fn cycle_of(&mut self, visit: usize) -> Option<usize> {
        self.refresh();
        match self.cycle_of.get(visit) {
            Some(&c) if c != NOT_SET => Some(c),
            _ => None,
        }
    }

    /// A visit on cycle `id`.
    pub fn head(&mut self, id: usize) -> Option<usize> {
        self.refresh();
        self.heads.get(&id).copied()
    }

    /// The cycle with the fewest members; the lowest id wins ties.
    pub fn smallest_cycle(&mut self) -> Option<(usize, usize)> {
        let mut smallest: Option<(usize, usize)> = None;
        for (&id, &count) in self.cycles() {
            if smallest.map_or(true, |(_, c)| count < c) {
                smallest = Some((id, count));
            }
        }
        smallest
    }
}
