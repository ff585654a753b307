//! Dense travel-weight matrix.

use crate::error::{Result, TourError};

/// A dense n×n travel-weight matrix stored in row-major order.
///
/// Weights may be asymmetric; the weight of a visit to itself is zero by
/// convention.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
///
/// let wm = WeightMatrix::from_rows(vec![
///     vec![0.0, 5.0, 8.0],
///     vec![4.0, 0.0, 3.0],
///     vec![8.0, 3.0, 0.0],
/// ]).unwrap();
/// assert_eq!(wm.get(0, 1), 5.0);
/// assert_eq!(wm.get(1, 0), 4.0);
/// assert_eq!(wm.size(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    data: Vec<f64>,
    size: usize,
}

impl WeightMatrix {
    /// Creates a weight matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Creates a matrix where every off-diagonal weight equals `weight`.
    pub fn uniform(size: usize, weight: f64) -> Self {
        let mut wm = Self::new(size);
        for i in 0..size {
            for j in 0..size {
                if i != j {
                    wm.set(i, j, weight);
                }
            }
        }
        wm
    }

    /// Computes a Euclidean weight matrix from planar points.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let n = points.len();
        let mut wm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = points[i].0 - points[j].0;
                let dy = points[i].1 - points[j].1;
                let d = (dx * dx + dy * dy).sqrt();
                wm.set(i, j, d);
                wm.set(j, i, d);
            }
        }
        wm
    }

    /// Creates a weight matrix from square rows (`weights[from][to]`).
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(TourError::Argument(format!(
                    "row {i} has {} weights, expected {size}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self { data, size })
    }

    /// Creates a weight matrix from an explicit row-major grid.
    pub fn from_data(size: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != size * size {
            return Err(TourError::Argument(format!(
                "expected {} weights for a {size}x{size} matrix, got {}",
                size * size,
                data.len()
            )));
        }
        Ok(Self { data, size })
    }

    /// Returns the travel weight from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the travel weight from `from` to `to`.
    pub fn set(&mut self, from: usize, to: usize, weight: f64) {
        self.data[from * self.size + to] = weight;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Returns the candidate closest to `from`, ties broken by order.
    ///
    /// Returns `None` if `candidates` is empty.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.get(from, a).total_cmp(&self.get(from, b)))
    }

    /// Restricts the matrix to the given indices, in order.
    pub fn sub_matrix(&self, indices: &[usize]) -> Self {
        let n = indices.len();
        let mut wm = Self::new(n);
        for (i, &from) in indices.iter().enumerate() {
            for (j, &to) in indices.iter().enumerate() {
                wm.set(i, j, self.get(from, to));
            }
        }
        wm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeightMatrix {
        WeightMatrix::from_points(&[(0.0, 0.0), (3.0, 4.0), (0.0, 8.0)])
    }

    #[test]
    fn test_from_points() {
        let wm = sample();
        assert_eq!(wm.size(), 3);
        assert!((wm.get(0, 1) - 5.0).abs() < 1e-10);
        assert!((wm.get(0, 2) - 8.0).abs() < 1e-10);
        assert!(wm.get(0, 0).abs() < 1e-10);
        assert!(wm.is_symmetric(1e-10));
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let result = WeightMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]);
        assert!(matches!(result, Err(TourError::Argument(_))));
    }

    #[test]
    fn test_from_data() {
        let wm = WeightMatrix::from_data(2, vec![0.0, 5.0, 7.0, 0.0]).expect("valid");
        assert_eq!(wm.get(0, 1), 5.0);
        assert_eq!(wm.get(1, 0), 7.0);
        assert!(!wm.is_symmetric(1e-10));
        assert!(WeightMatrix::from_data(2, vec![0.0, 1.0, 2.0]).is_err());
    }

    #[test]
    fn test_uniform() {
        let wm = WeightMatrix::uniform(3, 1.0);
        assert_eq!(wm.get(0, 0), 0.0);
        assert_eq!(wm.get(0, 2), 1.0);
        assert_eq!(wm.get(2, 1), 1.0);
    }

    #[test]
    fn test_nearest_neighbor() {
        let wm = sample();
        assert_eq!(wm.nearest_neighbor(0, &[1, 2]), Some(1));
        assert_eq!(wm.nearest_neighbor(0, &[2]), Some(2));
        assert_eq!(wm.nearest_neighbor(0, &[]), None);
    }

    #[test]
    fn test_sub_matrix() {
        let wm = sample();
        let sub = wm.sub_matrix(&[2, 0]);
        assert_eq!(sub.size(), 2);
        assert!((sub.get(0, 1) - 8.0).abs() < 1e-10);
    }
}
