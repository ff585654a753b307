//! Nearest-neighbour candidate lists.

use super::WeightMatrix;

/// Per-visit list of the `k` closest other visits, ascending by travel
/// weight from the visit (ties broken by index).
///
/// Built once from a [`WeightMatrix`] and read-only afterwards.
///
/// # Examples
///
/// ```
/// use u_tour::distance::{NearestNeighbourCache, WeightMatrix};
///
/// let wm = WeightMatrix::from_points(&[(0.0, 0.0), (5.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
/// let nn = NearestNeighbourCache::build(&wm, 2, |_| true);
/// assert_eq!(nn.get(0), &[2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct NearestNeighbourCache {
    k: usize,
    neighbours: Vec<Vec<usize>>,
}

impl NearestNeighbourCache {
    /// Builds the cache for all matrix indices, keeping only neighbours
    /// accepted by `eligible`.
    pub fn build<F>(weights: &WeightMatrix, k: usize, eligible: F) -> Self
    where
        F: Fn(usize) -> bool,
    {
        let n = weights.size();
        let candidates: Vec<usize> = (0..n).filter(|&v| eligible(v)).collect();
        let neighbours = (0..n)
            .map(|visit| {
                let mut list: Vec<usize> =
                    candidates.iter().copied().filter(|&c| c != visit).collect();
                list.sort_by(|&a, &b| {
                    weights
                        .get(visit, a)
                        .total_cmp(&weights.get(visit, b))
                        .then(a.cmp(&b))
                });
                list.truncate(k);
                list
            })
            .collect();
        Self { k, neighbours }
    }

    /// The configured neighbour count.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Nearest neighbours of `visit`, closest first.
    pub fn get(&self, visit: usize) -> &[usize] {
        self.neighbours
            .get(visit)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The first `n` nearest neighbours of `visit`.
    pub fn nearest(&self, visit: usize, n: usize) -> &[usize] {
        let all = self.get(visit);
        &all[..n.min(all.len())]
    }

    /// Number of visits covered by this cache.
    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    /// Returns `true` if the cache covers no visits.
    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> WeightMatrix {
        WeightMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (4.0, 0.0), (8.0, 0.0)])
    }

    #[test]
    fn test_sorted_ascending() {
        let nn = NearestNeighbourCache::build(&line(), 3, |_| true);
        assert_eq!(nn.get(0), &[1, 2, 3]);
        assert_eq!(nn.get(4), &[3, 2, 1]);
        assert_eq!(nn.k(), 3);
        assert_eq!(nn.len(), 5);
    }

    #[test]
    fn test_excludes_self_and_ineligible() {
        let nn = NearestNeighbourCache::build(&line(), 10, |v| v != 1);
        assert_eq!(nn.get(0), &[2, 3, 4]);
        assert!(!nn.get(2).contains(&2));
    }

    #[test]
    fn test_ties_broken_by_index() {
        let wm = WeightMatrix::uniform(4, 1.0);
        let nn = NearestNeighbourCache::build(&wm, 2, |_| true);
        assert_eq!(nn.get(3), &[0, 1]);
    }

    #[test]
    fn test_asymmetric_uses_outgoing_weight() {
        let wm = WeightMatrix::from_rows(vec![
            vec![0.0, 9.0, 1.0],
            vec![1.0, 0.0, 9.0],
            vec![9.0, 1.0, 0.0],
        ])
        .expect("valid");
        let nn = NearestNeighbourCache::build(&wm, 1, |_| true);
        assert_eq!(nn.get(0), &[2]);
        assert_eq!(nn.get(1), &[0]);
        assert_eq!(nn.get(2), &[1]);
    }

    #[test]
    fn test_nearest_prefix_and_out_of_range() {
        let nn = NearestNeighbourCache::build(&line(), 3, |_| true);
        assert_eq!(nn.nearest(0, 1), &[1]);
        assert_eq!(nn.nearest(0, 10), &[1, 2, 3]);
        assert!(nn.get(99).is_empty());
    }
}
