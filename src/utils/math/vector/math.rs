use std::cmp::Ordering;

use num::Num;

use super::SparseVec;

impl<N> SparseVec<N>
where
    N: Num + Copy + Into<f64>,
{
    /// ドット積を計算するメソッド
    /// Dot product of two sparse vectors.
    ///
    /// # Arguments
    /// * `other` - 他のベクトル
    ///
    /// # Returns
    /// * `f64` - ドット積の結果
    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        debug_assert_eq!(
            self.len(),
            other.len(),
            "Vectors must be of the same length to compute dot product."
        );
        let mut result = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < self.inds.len() && j < other.inds.len() {
            match self.inds[i].cmp(&other.inds[j]) {
                Ordering::Equal => {
                    let a: f64 = self.vals[i].into();
                    let b: f64 = other.vals[j].into();
                    result += a * b;
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        result
    }

    /// Dot product with a dense vector of the same dimension.
    #[inline]
    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        debug_assert_eq!(self.len(), dense.len());
        self.raw_iter()
            .map(|(idx, val)| {
                let v: f64 = (*val).into();
                v * dense[idx]
            })
            .sum()
    }

    #[inline]
    pub fn norm_sq(&self) -> f64 {
        self.vals
            .iter()
            .map(|v| {
                let v: f64 = (*v).into();
                v * v
            })
            .sum()
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// Squared Euclidean distance to a dense point.
    /// Walks every dense coordinate, so equal vectors give exactly zero.
    pub fn squared_distance_dense(&self, dense: &[f64]) -> f64 {
        debug_assert_eq!(self.len(), dense.len());
        let mut result = 0.0;
        let mut stored = self.raw_iter().peekable();
        for (idx, c) in dense.iter().enumerate() {
            let x = match stored.peek() {
                Some((i, v)) if *i == idx => {
                    let x: f64 = (**v).into();
                    stored.next();
                    x
                }
                _ => 0.0,
            };
            let d = x - c;
            result += d * d;
        }
        result
    }

    #[inline]
    pub fn distance_dense(&self, dense: &[f64]) -> f64 {
        self.squared_distance_dense(dense).sqrt()
    }

    /// Squared Euclidean distance between two sparse vectors.
    pub fn squared_distance(&self, other: &Self) -> f64 {
        debug_assert_eq!(self.len(), other.len());
        let mut result = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < self.inds.len() || j < other.inds.len() {
            let a = self.inds.get(i).copied().unwrap_or(usize::MAX);
            let b = other.inds.get(j).copied().unwrap_or(usize::MAX);
            let d = match a.cmp(&b) {
                Ordering::Equal => {
                    let a: f64 = self.vals[i].into();
                    let b: f64 = other.vals[j].into();
                    let d = a - b;
                    i += 1;
                    j += 1;
                    d
                }
                Ordering::Less => {
                    let d: f64 = self.vals[i].into();
                    i += 1;
                    d
                }
                Ordering::Greater => {
                    let d: f64 = other.vals[j].into();
                    j += 1;
                    d
                }
            };
            result += d * d;
        }
        result
    }

    /// Add `self * weight` into a dense accumulator.
    #[inline]
    pub fn add_into_dense(&self, acc: &mut [f64], weight: f64) {
        for (idx, val) in self.raw_iter() {
            let v: f64 = (*val).into();
            acc[idx] += v * weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_products_agree_with_dense_math() {
        let a = SparseVec::from_dense(&[1.0, 0.0, 2.0, 0.0]);
        let b = SparseVec::from_dense(&[0.0, 3.0, 4.0, 1.0]);
        assert_eq!(a.dot(&b), 8.0);
        assert_eq!(a.dot_dense(&[1.0, 1.0, 1.0, 1.0]), 3.0);
        assert_eq!(a.norm_sq(), 5.0);
    }

    #[test]
    fn distance_to_identical_dense_point_is_exactly_zero() {
        let dense = vec![0.1, 0.0, 0.7071, 0.3];
        let v = SparseVec::from_dense(&dense);
        assert_eq!(v.squared_distance_dense(&dense), 0.0);
    }

    #[test]
    fn sparse_and_dense_distances_match() {
        let a = SparseVec::from_dense(&[1.0, 0.0, 2.0, 0.0, 5.0]);
        let b = SparseVec::from_dense(&[0.0, 3.0, 4.0, 1.0, 0.0]);
        let expected = 1.0 + 9.0 + 4.0 + 1.0 + 25.0;
        assert_eq!(a.squared_distance(&b), expected);
        assert_eq!(a.squared_distance_dense(&b.to_dense()), expected);
    }

    #[test]
    fn zero_vector_distance_is_point_norm() {
        let z = SparseVec::<f64>::zeros(2);
        assert_eq!(z.distance_dense(&[3.0, 4.0]), 5.0);
    }
}
