//! Input vectors and their initialization.

use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use tracing::debug;

use super::functor::DotProductFunctor;
use crate::error::Result;
use crate::view::{Layout, MemorySpace, View1D, View2D};

/// The `A` and `B` inputs: `num_vectors` pairs of vectors of length `len`,
/// both stored under layout `L`.
pub struct VectorBatch<L: Layout, S: MemorySpace> {
    pub a: View2D<f64, L, S>,
    pub b: View2D<f64, L, S>,
}

impl<L: Layout, S: MemorySpace> VectorBatch<L, S> {
    /// Allocate both inputs (zeroed).
    pub fn new(num_vectors: usize, len: usize) -> Result<Self> {
        Ok(Self {
            a: View2D::new("A", num_vectors, len)?,
            b: View2D::new("B", num_vectors, len)?,
        })
    }

    pub fn num_vectors(&self) -> usize {
        self.a.rows()
    }

    pub fn len(&self) -> usize {
        self.a.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `a(i, j) = i + 1`, `b(i, j) = j + 1` and zero `c`.
    ///
    /// Parallel over `i`; the `j` loop runs in order inside each task.
    /// Returns after every task has finished.
    pub fn initialize(&mut self, c: &mut View1D<f64, S>) {
        assert_eq!(c.len(), self.num_vectors(), "Result view must hold one value per vector");
        debug!(
            num_vectors = self.num_vectors(),
            len = self.len(),
            layout = L::NAME,
            "initializing vectors"
        );

        self.a
            .par_rows_mut()
            .zip(self.b.par_rows_mut())
            .zip(c.par_iter_mut())
            .enumerate()
            .for_each(|(i, ((mut a_row, mut b_row), c_i))| {
                let ai = (i + 1) as f64;
                a_row.fill_with(|_| ai);
                b_row.fill_with(|j| (j + 1) as f64);
                *c_i = 0.0;
            });
    }

    /// Kernel over this batch.
    pub fn functor(&self) -> DotProductFunctor<'_, L, S> {
        DotProductFunctor::new(&self.a, &self.b)
    }
}
