//! The dot-product reduction functor.

use crate::view::{Layout, MemorySpace, View1D, View2D};

/// Computes `c(i) = Σ_j a(i, j) * b(i, j)` for one vector index `i`.
///
/// Holds shared borrows of the inputs only, so any number of parallel tasks
/// may apply it at once.
pub struct DotProductFunctor<'a, L: Layout, S: MemorySpace> {
    a: &'a View2D<f64, L, S>,
    b: &'a View2D<f64, L, S>,
    len: usize,
}

impl<'a, L: Layout, S: MemorySpace> DotProductFunctor<'a, L, S> {
    /// # Panics
    /// Panics if `a` and `b` have different extents.
    pub fn new(a: &'a View2D<f64, L, S>, b: &'a View2D<f64, L, S>) -> Self {
        assert_eq!(
            (a.rows(), a.cols()),
            (b.rows(), b.cols()),
            "Vector batches must have the same shape"
        );
        Self { a, b, len: a.cols() }
    }

    pub fn num_vectors(&self) -> usize {
        self.a.rows()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dot product of vector pair `i`, accumulated in index order.
    #[inline(always)]
    pub fn apply(&self, i: usize) -> f64 {
        let a = self.a.row(i);
        let b = self.b.row(i);

        let mut ctmp = 0.0;
        for (x, y) in a.iter().zip(b.iter()) {
            ctmp += x * y;
        }
        ctmp
    }

    /// One data-parallel pass over every vector, overwriting `c`.
    ///
    /// Runs on the current rayon pool; wrap in
    /// [`Runtime::install`](crate::runtime::Runtime::install) to pick the
    /// runtime.
    pub fn run(&self, c: &mut View1D<f64, S>) {
        assert_eq!(
            c.len(),
            self.num_vectors(),
            "Result view must hold one value per vector"
        );
        c.par_fill(|i| self.apply(i));
    }
}
