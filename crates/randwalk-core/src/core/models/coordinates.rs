/// Fixed-precision particle positions stored column-wise.
///
/// The two columns always have the same length, fixed at construction. Particles are never
/// inserted or removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoordinateStore {
    x: Vec<i64>,
    y: Vec<i64>,
}

impl CoordinateStore {
    /// `count` particles at the fixed-point origin.
    pub fn zeroed(count: usize) -> Self {
        Self {
            x: vec![0; count],
            y: vec![0; count],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<(i64, i64)> {
        Some((*self.x.get(index)?, *self.y.get(index)?))
    }

    #[inline]
    pub fn x(&self) -> &[i64] {
        &self.x
    }

    #[inline]
    pub fn y(&self) -> &[i64] {
        &self.y
    }

    /// Both columns, mutably and at once.
    #[inline]
    pub fn columns_mut(&mut self) -> (&mut [i64], &mut [i64]) {
        (self.x.as_mut_slice(), self.y.as_mut_slice())
    }

    /// Largest absolute value held on either axis.
    pub fn max_magnitude(&self) -> u64 {
        self.x
            .iter()
            .chain(self.y.iter())
            .map(|v| v.unsigned_abs())
            .max()
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}
