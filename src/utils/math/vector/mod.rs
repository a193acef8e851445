pub mod math;
pub mod serde;

use std::fmt;

use num::Num;

/// SparseVec は 0 要素を疎とした過疎ベクトルです
/// A sparse vector that only stores non-zero elements.
///
/// `inds` holds the element positions and `vals` the values; positions are
/// kept in strictly ascending order, which the merge-style math in
/// [`math`] relies on.
#[derive(Clone, PartialEq)]
pub struct SparseVec<N>
where
    N: Num,
{
    inds: Vec<usize>,
    vals: Vec<N>,
    len: usize,
}

impl<N> SparseVec<N>
where
    N: Num + Copy,
{
    /// Zero vector of dimension `len`.
    #[inline]
    pub fn zeros(len: usize) -> Self {
        SparseVec {
            inds: Vec::new(),
            vals: Vec::new(),
            len,
        }
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        SparseVec {
            inds: Vec::with_capacity(cap),
            vals: Vec::with_capacity(cap),
            len: 0,
        }
    }

    /// Build from `(index, value)` pairs.
    /// Pairs are sorted by index; zero values are skipped and duplicate
    /// indices are summed.
    ///
    /// # Arguments
    /// * `len` - dimension of the vector
    /// * `pairs` - non-zero entries, any order
    ///
    /// # Returns
    /// * `Option<Self>` - `None` if an index is out of range
    pub fn from_pairs(len: usize, mut pairs: Vec<(usize, N)>) -> Option<Self> {
        if pairs.iter().any(|(i, _)| *i >= len) {
            return None;
        }
        pairs.sort_by_key(|(i, _)| *i);
        let mut vec = Self::with_capacity(pairs.len());
        vec.len = len;
        for (idx, val) in pairs {
            match vec.inds.last() {
                Some(&last) if last == idx => {
                    if let Some(slot) = vec.vals.last_mut() {
                        *slot = *slot + val;
                    }
                }
                _ => {
                    vec.inds.push(idx);
                    vec.vals.push(val);
                }
            }
        }
        vec.drop_zeros();
        Some(vec)
    }

    /// Build from a dense slice, skipping zeros.
    pub fn from_dense(dense: &[N]) -> Self {
        let mut vec = Self::with_capacity(dense.len());
        for &v in dense {
            vec.push(v);
        }
        vec
    }

    /// Append one element at the end, growing the dimension by one.
    #[inline]
    pub fn push(&mut self, elem: N) {
        if elem != N::zero() {
            self.inds.push(self.len);
            self.vals.push(elem);
        }
        self.len += 1;
    }

    /// Concatenate `other` after `self`, growing the dimension.
    pub fn extend_with(&mut self, other: &SparseVec<N>) {
        let offset = self.len;
        for (idx, val) in other.raw_iter() {
            self.inds.push(offset + idx);
            self.vals.push(*val);
        }
        self.len += other.len;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of stored (non-zero) elements.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.inds.len()
    }

    /// True when no element is stored, i.e. the zero vector.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.inds.is_empty()
    }

    /// Element at `index`; zero for positions that are not stored.
    #[inline]
    pub fn get(&self, index: usize) -> Option<N> {
        if index >= self.len {
            return None;
        }
        match self.inds.binary_search(&index) {
            Ok(pos) => Some(self.vals[pos]),
            Err(_) => Some(N::zero()),
        }
    }

    /// Iterate over stored `(index, value)` pairs in ascending index order.
    #[inline]
    pub fn raw_iter(&self) -> impl Iterator<Item = (usize, &N)> + '_ {
        self.inds.iter().copied().zip(self.vals.iter())
    }

    pub fn to_dense(&self) -> Vec<N> {
        let mut dense = vec![N::zero(); self.len];
        for (idx, val) in self.raw_iter() {
            dense[idx] = *val;
        }
        dense
    }

    /// Multiply every element by `factor`.
    pub fn scale(&mut self, factor: N) {
        for v in self.vals.iter_mut() {
            *v = *v * factor;
        }
        self.drop_zeros();
    }

    pub fn shrink_to_fit(&mut self) {
        self.inds.shrink_to_fit();
        self.vals.shrink_to_fit();
    }

    fn drop_zeros(&mut self) {
        if self.vals.iter().all(|v| *v != N::zero()) {
            return;
        }
        let (inds, vals): (Vec<usize>, Vec<N>) = self
            .inds
            .iter()
            .copied()
            .zip(self.vals.iter().copied())
            .filter(|(_, v)| *v != N::zero())
            .unzip();
        self.inds = inds;
        self.vals = vals;
    }
}

impl<N> Default for SparseVec<N>
where
    N: Num + Copy,
{
    fn default() -> Self {
        Self::zeros(0)
    }
}

impl<N> fmt::Debug for SparseVec<N>
where
    N: Num + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseVec")
            .field("len", &self.len)
            .field("entries", &self.inds.iter().zip(self.vals.iter()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_skips_zeros_but_grows_dimension() {
        let mut v = SparseVec::<f64>::with_capacity(4);
        v.push(0.0);
        v.push(1.5);
        v.push(0.0);
        v.push(-2.0);
        assert_eq!(v.len(), 4);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.to_dense(), vec![0.0, 1.5, 0.0, -2.0]);
        assert_eq!(v.get(1), Some(1.5));
        assert_eq!(v.get(2), Some(0.0));
        assert_eq!(v.get(4), None);
    }

    #[test]
    fn from_pairs_sorts_and_merges() {
        let v = SparseVec::from_pairs(5, vec![(3, 1.0), (0, 2.0), (3, 0.5), (1, 0.0)]).unwrap();
        assert_eq!(v.to_dense(), vec![2.0, 0.0, 0.0, 1.5, 0.0]);
        assert_eq!(v.nnz(), 2);
        assert!(SparseVec::from_pairs(2, vec![(2, 1.0)]).is_none());
    }

    #[test]
    fn extend_with_offsets_indices() {
        let mut head = SparseVec::from_dense(&[1.0, 0.0]);
        let tail = SparseVec::from_dense(&[0.0, 3.0, 4.0]);
        head.extend_with(&tail);
        assert_eq!(head.len(), 5);
        assert_eq!(head.to_dense(), vec![1.0, 0.0, 0.0, 3.0, 4.0]);
    }

    #[test]
    fn zero_vector_has_no_entries() {
        let v = SparseVec::<f64>::zeros(3);
        assert!(v.is_zero());
        assert_eq!(v.to_dense(), vec![0.0; 3]);
    }
}
