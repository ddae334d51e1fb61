//! Shape of multi-dimensional dataset contents.

use smallvec::SmallVec;

/// Shape of a dataset, outermost dimension first.
///
/// Rank 0 is a scalar. Values are laid out row-major, so the last
/// dimension varies fastest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dimensions {
    dims: SmallVec<[usize; 4]>,
}

impl Dimensions {
    /// Create scalar dimensions (rank 0).
    pub fn scalar() -> Self {
        Self { dims: SmallVec::new() }
    }

    pub fn d1(size: usize) -> Self {
        Self { dims: smallvec::smallvec![size] }
    }

    pub fn d2(rows: usize, cols: usize) -> Self {
        Self { dims: smallvec::smallvec![rows, cols] }
    }

    pub fn d3(outer: usize, rows: usize, cols: usize) -> Self {
        Self { dims: smallvec::smallvec![outer, rows, cols] }
    }

    /// Create from a slice of sizes.
    pub fn from_slice(sizes: &[usize]) -> Self {
        Self { dims: SmallVec::from_slice(sizes) }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Size of a specific dimension, `None` past the rank.
    pub fn size(&self, dim: usize) -> Option<usize> {
        self.dims.get(dim).copied()
    }

    pub fn sizes(&self) -> &[usize] {
        &self.dims
    }

    /// Outer length, the size of dimension 0. Scalars report 1.
    pub fn outer(&self) -> usize {
        self.dims.first().copied().unwrap_or(1)
    }

    /// Total number of elements (product of all dimensions), saturating at
    /// `usize::MAX`.
    pub fn num_points(&self) -> usize {
        self.checked_num_points().unwrap_or(usize::MAX)
    }

    /// Total number of elements, `None` on overflow.
    pub fn checked_num_points(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Number of elements in one slice along the outer dimension.
    pub fn stride(&self) -> usize {
        self.dims
            .iter()
            .skip(1)
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .unwrap_or(usize::MAX)
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Row-major flat offset of a multi-index, `None` if out of range.
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.dims.len() {
            return None;
        }
        let mut flat = 0;
        for (&i, &n) in index.iter().zip(self.dims.iter()) {
            if i >= n {
                return None;
            }
            flat = flat * n + i;
        }
        Some(flat)
    }

    /// Add a new dimension at the end.
    pub fn push(&mut self, size: usize) {
        self.dims.push(size);
    }
}

impl From<usize> for Dimensions {
    fn from(size: usize) -> Self {
        Self::d1(size)
    }
}

impl From<(usize, usize)> for Dimensions {
    fn from((r, c): (usize, usize)) -> Self {
        Self::d2(r, c)
    }
}

impl From<(usize, usize, usize)> for Dimensions {
    fn from((o, r, c): (usize, usize, usize)) -> Self {
        Self::d3(o, r, c)
    }
}

impl From<&[usize]> for Dimensions {
    fn from(v: &[usize]) -> Self {
        Self::from_slice(v)
    }
}

impl From<Vec<usize>> for Dimensions {
    fn from(v: Vec<usize>) -> Self {
        Self { dims: SmallVec::from_vec(v) }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.dims.is_empty() {
            return write!(f, "scalar");
        }
        write!(f, "[")?;
        for (i, s) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "]")
    }
}
