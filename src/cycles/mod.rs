//! Successor-array cycle structures used by edge assembly crossover.
//!
//! Both structures are plain integer arrays indexed by visit id. Plain edge
//! overwrites are O(1) and leave the cycle decomposition to be recomputed on
//! the next query. [`AsymmetricCycles::swap_successors`] instead updates
//! cycle ids in place, relabelling only the smaller side of a split or join.

mod alternating;
mod asymmetric;

use std::collections::BTreeMap;

pub use alternating::AsymmetricAlternatingCycles;
pub use asymmetric::AsymmetricCycles;

pub use crate::models::NOT_SET;

/// Decomposes the functional graph `succ` over `0..len` into its cycles.
///
/// Returns the cycle-id → member-count map and the cycle id of every node
/// (`NOT_SET` for nodes on a path that does not close). A cycle's id is the
/// first of its nodes reached when scanning nodes in ascending order.
fn find_cycles<F>(len: usize, succ: F) -> (BTreeMap<usize, usize>, Vec<usize>)
where
    F: Fn(usize) -> usize,
{
    let mut cycles = BTreeMap::new();
    let mut cycle_of = vec![NOT_SET; len];
    let mut walk = vec![NOT_SET; len];
    let mut order = vec![0usize; len];

    for start in 0..len {
        if walk[start] != NOT_SET || succ(start) == NOT_SET {
            continue;
        }

        let mut node = start;
        let mut steps = 0;
        while node != NOT_SET {
            if walk[node] != NOT_SET {
                if walk[node] == start {
                    let id = node;
                    cycles.insert(id, steps - order[node]);
                    let mut member = node;
                    loop {
                        cycle_of[member] = id;
                        member = succ(member);
                        if member == id {
                            break;
                        }
                    }
                }
                break;
            }
            walk[node] = start;
            order[node] = steps;
            steps += 1;
            node = succ(node);
        }
    }

    (cycles, cycle_of)
}
