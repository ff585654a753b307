//! Directed visits: a visit entered and left through one of two sides.
//!
//! Every visit `id` owns two matrix indices, `2 * id` and `2 * id + 1`. A
//! tour element packs the visit together with a turn `0..4` that selects the
//! arrival and departure side.

use super::TspProblem;
use crate::distance::WeightMatrix;
use crate::error::{Result, TourError};

/// Number of turns per visit.
pub const TURNS: usize = 4;

/// A decoded directed tour element.
///
/// # Examples
///
/// ```
/// use u_tour::models::DirectedId;
///
/// let packed = DirectedId::pack(5, 2);
/// assert_eq!(packed, 22);
/// let d = DirectedId::unpack(packed);
/// assert_eq!((d.arrival, d.departure, d.id, d.turn), (11, 10, 5, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectedId {
    /// Matrix index the visit is entered through.
    pub arrival: usize,
    /// Matrix index the visit is left through.
    pub departure: usize,
    /// The undirected visit id.
    pub id: usize,
    /// Turn index `0..4`.
    pub turn: usize,
}

impl DirectedId {
    /// Packs a visit and a turn into a single tour element.
    pub fn pack(id: usize, turn: usize) -> usize {
        id * TURNS + turn
    }

    /// Decodes a packed element into arrival, departure, id and turn.
    pub fn unpack(directed: usize) -> Self {
        let turn = directed % TURNS;
        let id = directed / TURNS;
        Self {
            arrival: id * 2 + turn / 2,
            departure: id * 2 + turn % 2,
            id,
            turn,
        }
    }
}

/// Extra weight charged per turn index.
pub type TurnPenalties = [f64; TURNS];

/// A directed single-tour problem.
///
/// `weights` is indexed by arrival/departure side, so it is `2n x 2n` for
/// `n` visits. `first` and `last` are undirected visit ids.
#[derive(Debug, Clone)]
pub struct DirectedTspProblem {
    weights: WeightMatrix,
    turn_penalties: TurnPenalties,
    first: usize,
    last: Option<usize>,
}

impl DirectedTspProblem {
    /// Creates a directed problem.
    pub fn new(
        weights: WeightMatrix,
        turn_penalties: TurnPenalties,
        first: usize,
        last: Option<usize>,
    ) -> Result<Self> {
        if weights.size() % 2 != 0 {
            return Err(TourError::Argument(format!(
                "directed weights need an even size, got {}",
                weights.size()
            )));
        }
        let count = weights.size() / 2;
        if first >= count || last.is_some_and(|l| l >= count) {
            return Err(TourError::Argument(format!(
                "first/last must be below the visit count {count}"
            )));
        }
        Ok(Self {
            weights,
            turn_penalties,
            first,
            last,
        })
    }

    /// Side-to-side travel weights.
    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    /// Penalty per turn index.
    pub fn turn_penalties(&self) -> &TurnPenalties {
        &self.turn_penalties
    }

    /// Number of undirected visits.
    pub fn count(&self) -> usize {
        self.weights.size() / 2
    }

    /// The fixed start visit.
    pub fn first(&self) -> usize {
        self.first
    }

    /// The fixed end visit, if any.
    pub fn last(&self) -> Option<usize> {
        self.last
    }

    /// Returns `true` if tours return to `first`.
    pub fn is_closed(&self) -> bool {
        self.last == Some(self.first)
    }

    /// Cost of `visit` entered with `turn`, given the previous departure.
    pub fn step_weight(&self, previous_departure: usize, directed: usize) -> f64 {
        let d = DirectedId::unpack(directed);
        self.weights.get(previous_departure, d.arrival) + self.turn_penalties[d.turn]
    }

    /// Picks the cheapest turn per visit for a fixed visit order.
    ///
    /// Dynamic programming over the four turns of each element; returns the
    /// packed directed ids in the same order.
    pub fn best_turns(&self, order: &[usize]) -> Vec<usize> {
        if order.is_empty() {
            return Vec::new();
        }
        let closed = self.is_closed();
        let mut best: Option<(f64, Vec<usize>)> = None;
        // For closed tours the closing edge depends on the first turn, so
        // each first turn is solved separately.
        let first_turns: Vec<usize> = if closed { (0..TURNS).collect() } else { vec![TURNS] };
        for first_turn in first_turns {
            let mut cost = [f64::INFINITY; TURNS];
            let mut back: Vec<[usize; TURNS]> = vec![[0; TURNS]; order.len()];
            for turn in 0..TURNS {
                if first_turn == TURNS || first_turn == turn {
                    cost[turn] = self.turn_penalties[turn];
                }
            }
            for (i, &visit) in order.iter().enumerate().skip(1) {
                let mut next = [f64::INFINITY; TURNS];
                for turn in 0..TURNS {
                    let directed = DirectedId::pack(visit, turn);
                    for (prev_turn, &prev_cost) in cost.iter().enumerate() {
                        let departure = DirectedId::unpack(DirectedId::pack(order[i - 1], prev_turn)).departure;
                        let c = prev_cost + self.step_weight(departure, directed);
                        if c < next[turn] {
                            next[turn] = c;
                            back[i][turn] = prev_turn;
                        }
                    }
                }
                cost = next;
            }
            for (turn, &c) in cost.iter().enumerate() {
                let mut total = c;
                if closed && order.len() > 1 {
                    let departure =
                        DirectedId::unpack(DirectedId::pack(order[order.len() - 1], turn)).departure;
                    let arrival = DirectedId::unpack(DirectedId::pack(order[0], first_turn)).arrival;
                    total += self.weights.get(departure, arrival);
                }
                if best.as_ref().map_or(true, |(b, _)| total < *b) {
                    let mut turns = vec![0; order.len()];
                    turns[order.len() - 1] = turn;
                    for i in (1..order.len()).rev() {
                        turns[i - 1] = back[i][turns[i]];
                    }
                    let packed = order
                        .iter()
                        .zip(turns)
                        .map(|(&v, t)| DirectedId::pack(v, t))
                        .collect();
                    best = Some((total, packed));
                }
            }
        }
        best.map(|(_, packed)| packed).unwrap_or_default()
    }

    /// The undirected problem over visit ids: travel from `a` to `b` costs
    /// the cheapest side-to-side weight plus the cheapest turn penalty.
    pub fn undirected(&self) -> Result<TspProblem> {
        let n = self.count();
        let turn = self
            .turn_penalties
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let mut weights = WeightMatrix::new(n);
        for a in 0..n {
            for b in 0..n {
                if a == b {
                    continue;
                }
                let mut cheapest = f64::INFINITY;
                for side_a in [a * 2, a * 2 + 1] {
                    for side_b in [b * 2, b * 2 + 1] {
                        cheapest = cheapest.min(self.weights.get(side_a, side_b));
                    }
                }
                weights.set(a, b, cheapest + turn);
            }
        }
        TspProblem::new(weights, self.first, self.last)
    }
}
