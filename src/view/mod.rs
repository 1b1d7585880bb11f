//! Typed, layout-parameterized views with explicit host/device residency.
//!
//! A view is a labelled, fixed-size allocation. 1D views index by `i`; 2D
//! views index by `(i, j)` through a [`Layout`] policy. Every view also
//! carries a [`MemorySpace`]; moving data between spaces only happens through
//! [`create_mirror_view`](View1D::create_mirror_view) and [`deep_copy`].
//!
//! Mirrors of host-accessible views share the source storage. Storage is
//! copy-on-write, so a later write through either handle detaches it and the
//! two views only agree again after the next `deep_copy`.

pub mod layout;
pub mod space;

use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{BenchError, Result};

pub use layout::{DefaultLayout, Layout, LayoutKind, LayoutLeft, LayoutRight};
pub use space::{DeviceSpace, HostSpace, MemorySpace};

/// Element types a view can hold.
pub trait Scalar: Copy + Default + Send + Sync + 'static {}

impl<T: Copy + Default + Send + Sync + 'static> Scalar for T {}

/// Allocate `len` default-initialized elements, reporting failure instead of
/// aborting.
fn allocate<T: Scalar>(label: &str, len: usize) -> Result<Vec<T>> {
    let bytes = len
        .checked_mul(std::mem::size_of::<T>())
        .ok_or_else(|| BenchError::Allocation {
            label: label.to_string(),
            bytes: usize::MAX,
        })?;

    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| BenchError::Allocation {
            label: label.to_string(),
            bytes,
        })?;
    data.resize(len, T::default());
    Ok(data)
}

/// Labelled shared storage backing both view kinds.
struct Buffer<T> {
    label: Arc<str>,
    data: Arc<Vec<T>>,
}

impl<T: Scalar> Buffer<T> {
    fn allocate(label: &str, len: usize) -> Result<Self> {
        Ok(Self {
            label: Arc::from(label),
            data: Arc::new(allocate(label, len)?),
        })
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_slice(&self) -> &[T] {
        &self.data
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        if Arc::get_mut(&mut self.data).is_none() {
            debug!(view = %self.label, "detaching shared storage before write");
        }
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    fn shares_storage_with(&self, other: &Buffer<T>) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    fn mirror(&self, share: bool) -> Result<Self> {
        let label = format!("{}_mirror", self.label);
        if share {
            Ok(Self {
                label: Arc::from(label.as_str()),
                data: Arc::clone(&self.data),
            })
        } else {
            Self::allocate(&label, self.len())
        }
    }

    fn copy_from(&mut self, src: &Buffer<T>) -> Result<()> {
        if self.shares_storage_with(src) {
            return Ok(());
        }
        if self.len() != src.len() {
            return Err(BenchError::ShapeMismatch {
                dst: self.label.to_string(),
                dst_len: self.len(),
                src: src.label.to_string(),
                src_len: src.len(),
            });
        }
        match Arc::get_mut(&mut self.data) {
            Some(dst) => dst.copy_from_slice(src.as_slice()),
            None => {
                // Another handle still reads the old contents; give this one
                // its own buffer.
                let mut fresh = allocate(&self.label, src.len())?;
                fresh.copy_from_slice(src.as_slice());
                self.data = Arc::new(fresh);
            }
        }
        Ok(())
    }
}

// ============================================================================
// 1D views
// ============================================================================

/// A one-dimensional view of `len` elements.
pub struct View1D<T = f64, S = DeviceSpace> {
    buf: Buffer<T>,
    _space: PhantomData<S>,
}

impl<T: Scalar, S: MemorySpace> View1D<T, S> {
    /// Allocate a zero-initialized view.
    pub fn new(label: &str, len: usize) -> Result<Self> {
        let buf = Buffer::allocate(label, len)?;
        debug!(
            view = label,
            space = S::NAME,
            len,
            bytes = len * std::mem::size_of::<T>(),
            "allocated 1D view"
        );
        Ok(Self {
            buf,
            _space: PhantomData,
        })
    }

    pub fn label(&self) -> &str {
        &self.buf.label
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub fn get(&self, i: usize) -> T {
        self.buf.as_slice()[i]
    }

    #[inline(always)]
    pub fn set(&mut self, i: usize, value: T) {
        self.buf.as_mut_slice()[i] = value;
    }

    /// Parallel iterator over mutable elements; each element is yielded to
    /// exactly one task.
    pub fn par_iter_mut(&mut self) -> rayon::slice::IterMut<'_, T> {
        self.buf.as_mut_slice().par_iter_mut()
    }

    /// Set every element to `f(i)` in a data-parallel map over `i`.
    pub fn par_fill<F>(&mut self, f: F)
    where
        F: Fn(usize) -> T + Sync + Send,
    {
        self.par_iter_mut()
            .enumerate()
            .for_each(|(i, slot)| *slot = f(i));
    }

    /// Host-resident twin of this view.
    ///
    /// Allocates only when `S` is not host-accessible; the contents are not
    /// synchronized until [`deep_copy`] is called.
    pub fn create_mirror_view(&self) -> Result<View1D<T, HostSpace>> {
        Ok(View1D {
            buf: self.buf.mirror(S::HOST_ACCESSIBLE)?,
            _space: PhantomData,
        })
    }

    /// Whether both views currently read the same storage.
    pub fn shares_storage_with<S2: MemorySpace>(&self, other: &View1D<T, S2>) -> bool {
        self.buf.shares_storage_with(&other.buf)
    }
}

impl<T: Scalar> View1D<T, HostSpace> {
    pub fn as_slice(&self) -> &[T] {
        self.buf.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.buf.as_mut_slice()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T: Scalar> Index<usize> for View1D<T, HostSpace> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.as_slice()[i]
    }
}

impl<T, S: MemorySpace> fmt::Debug for View1D<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View1D")
            .field("label", &self.buf.label)
            .field("len", &self.buf.data.len())
            .field("space", &S::NAME)
            .finish()
    }
}

// ============================================================================
// 2D views
// ============================================================================

/// A two-dimensional `rows x cols` view stored under layout `L`.
pub struct View2D<T = f64, L = DefaultLayout, S = DeviceSpace> {
    buf: Buffer<T>,
    rows: usize,
    cols: usize,
    _marker: PhantomData<(L, S)>,
}

impl<T: Scalar, L: Layout, S: MemorySpace> View2D<T, L, S> {
    /// Allocate a zero-initialized view.
    pub fn new(label: &str, rows: usize, cols: usize) -> Result<Self> {
        let len = rows.checked_mul(cols).ok_or_else(|| BenchError::Allocation {
            label: label.to_string(),
            bytes: usize::MAX,
        })?;
        let buf = Buffer::allocate(label, len)?;
        debug!(
            view = label,
            space = S::NAME,
            layout = L::NAME,
            rows,
            cols,
            bytes = len * std::mem::size_of::<T>(),
            "allocated 2D view"
        );
        Ok(Self {
            buf,
            rows,
            cols,
            _marker: PhantomData,
        })
    }

    pub fn label(&self) -> &str {
        &self.buf.label
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.rows && j < self.cols, "index ({}, {}) out of bounds", i, j);
        self.buf.as_slice()[L::offset(i, j, self.rows, self.cols)]
    }

    #[inline(always)]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        assert!(i < self.rows && j < self.cols, "index ({}, {}) out of bounds", i, j);
        let offset = L::offset(i, j, self.rows, self.cols);
        self.buf.as_mut_slice()[offset] = value;
    }

    /// Read-only handle on row `i`.
    #[inline(always)]
    pub fn row(&self, i: usize) -> Row<'_, T> {
        assert!(i < self.rows, "row {} out of bounds ({} rows)", i, self.rows);
        let (rs, cs) = L::strides(self.rows, self.cols);
        let data = self.buf.as_slice().get(i * rs..).unwrap_or(&[]);
        Row {
            data,
            stride: cs,
            len: self.cols,
        }
    }

    /// Parallel iterator yielding a mutable handle on every row, in row order.
    ///
    /// Rows are disjoint under any layout, so tasks may write them
    /// concurrently.
    pub fn par_rows_mut(&mut self) -> impl IndexedParallelIterator<Item = RowMut<'_, T>> + '_ {
        let (rows, cols) = (self.rows, self.cols);
        let (rs, cs) = L::strides(rows, cols);
        let base = SendPtr(self.buf.as_mut_slice().as_mut_ptr());

        (0..rows).into_par_iter().map(move |i| {
            // SAFETY: `base` points to a live `rows * cols` allocation that is
            // mutably borrowed for the iterator's lifetime. Row `i` touches
            // offsets `i * rs + j * cs` for `j < cols`, which are in bounds and
            // distinct from every other row's offsets because the layout
            // mapping is a bijection. Each `i` is yielded once.
            unsafe { RowMut::from_raw(base.get().wrapping_add(i * rs), cs, cols) }
        })
    }

    /// Host-resident twin of this view, with the same layout.
    pub fn create_mirror_view(&self) -> Result<View2D<T, L, HostSpace>> {
        Ok(View2D {
            buf: self.buf.mirror(S::HOST_ACCESSIBLE)?,
            rows: self.rows,
            cols: self.cols,
            _marker: PhantomData,
        })
    }

    pub fn shares_storage_with<S2: MemorySpace>(&self, other: &View2D<T, L, S2>) -> bool {
        self.buf.shares_storage_with(&other.buf)
    }
}

impl<T: Scalar, L: Layout> View2D<T, L, HostSpace> {
    /// Underlying storage in layout order.
    pub fn as_slice(&self) -> &[T] {
        self.buf.as_slice()
    }
}

impl<T, L: Layout, S: MemorySpace> fmt::Debug for View2D<T, L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View2D")
            .field("label", &self.buf.label)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("layout", &L::NAME)
            .field("space", &S::NAME)
            .finish()
    }
}

/// Read-only strided row of a [`View2D`].
#[derive(Clone, Copy)]
pub struct Row<'a, T> {
    data: &'a [T],
    stride: usize,
    len: usize,
}

impl<'a, T: Scalar> Row<'a, T> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Elements in column order `0..len`.
    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        let (data, len) = (self.data, self.len);
        data.iter()
            .step_by(self.stride.max(1))
            .take(len)
            .copied()
    }
}

/// Mutable strided row of a [`View2D`], handed out by
/// [`View2D::par_rows_mut`].
pub struct RowMut<'a, T> {
    ptr: *mut T,
    stride: usize,
    len: usize,
    _marker: PhantomData<&'a mut T>,
}

// SAFETY: a `RowMut` is the only handle on its elements.
unsafe impl<T: Send> Send for RowMut<'_, T> {}

impl<'a, T: Scalar> RowMut<'a, T> {
    /// # Safety
    ///
    /// For every `j < len`, `ptr + j * stride` must be valid for reads and
    /// writes for `'a`, and no other live reference may alias those elements.
    unsafe fn from_raw(ptr: *mut T, stride: usize, len: usize) -> Self {
        Self {
            ptr,
            stride,
            len,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set column `j` to `f(j)` for `j = 0..len`, in order.
    #[inline(always)]
    pub fn fill_with<F: FnMut(usize) -> T>(&mut self, mut f: F) {
        for j in 0..self.len {
            // SAFETY: `j < len`; see `from_raw`.
            unsafe { *self.ptr.add(j * self.stride) = f(j) }
        }
    }
}

#[derive(Clone, Copy)]
struct SendPtr<T>(*mut T);

// SAFETY: only used to hand out disjoint rows from `par_rows_mut`.
unsafe impl<T: Send> Send for SendPtr<T> {}
unsafe impl<T: Send> Sync for SendPtr<T> {}

impl<T> SendPtr<T> {
    #[inline(always)]
    fn get(self) -> *mut T {
        self.0
    }
}

// ============================================================================
// Explicit synchronization
// ============================================================================

/// Views that can be overwritten with the contents of a `Src` view.
pub trait DeepCopy<Src> {
    fn deep_copy_from(&mut self, src: &Src) -> Result<()>;
}

impl<T: Scalar, SD: MemorySpace, SS: MemorySpace> DeepCopy<View1D<T, SS>> for View1D<T, SD> {
    fn deep_copy_from(&mut self, src: &View1D<T, SS>) -> Result<()> {
        self.buf.copy_from(&src.buf)
    }
}

impl<T: Scalar, L: Layout, SD: MemorySpace, SS: MemorySpace> DeepCopy<View2D<T, L, SS>>
    for View2D<T, L, SD>
{
    fn deep_copy_from(&mut self, src: &View2D<T, L, SS>) -> Result<()> {
        if (self.rows, self.cols) != (src.rows, src.cols) {
            return Err(BenchError::ShapeMismatch {
                dst: self.label().to_string(),
                dst_len: self.rows * self.cols,
                src: src.label().to_string(),
                src_len: src.rows * src.cols,
            });
        }
        self.buf.copy_from(&src.buf)
    }
}

/// Copy the current contents of `src` into `dst`.
///
/// Synchronous. A no-op when both views already share storage.
pub fn deep_copy<D, S>(dst: &mut D, src: &S) -> Result<()>
where
    D: DeepCopy<S>,
{
    dst.deep_copy_from(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_start_zeroed() {
        let c: View1D = View1D::new("C", 4).unwrap();
        assert_eq!(c.len(), 4);
        assert!((0..4).all(|i| c.get(i) == 0.0));

        let a: View2D = View2D::new("A", 3, 2).unwrap();
        assert_eq!((a.rows(), a.cols()), (3, 2));
        assert!((0..3).all(|i| (0..2).all(|j| a.get(i, j) == 0.0)));
    }

    #[test]
    fn test_set_get_respects_layout() {
        let mut right: View2D<f64, LayoutRight, HostSpace> = View2D::new("R", 2, 3).unwrap();
        let mut left: View2D<f64, LayoutLeft, HostSpace> = View2D::new("L", 2, 3).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                let v = (10 * i + j) as f64;
                right.set(i, j, v);
                left.set(i, j, v);
            }
        }
        assert_eq!(right.as_slice(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(left.as_slice(), &[0.0, 10.0, 1.0, 11.0, 2.0, 12.0]);
        assert_eq!(right.row(1).iter().collect::<Vec<_>>(), vec![10.0, 11.0, 12.0]);
        assert_eq!(left.row(1).iter().collect::<Vec<_>>(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_par_rows_mut_writes_every_row() {
        let mut v: View2D<f64, LayoutLeft, HostSpace> = View2D::new("V", 5, 4).unwrap();
        v.par_rows_mut()
            .enumerate()
            .for_each(|(i, mut row)| row.fill_with(|j| (i * 4 + j) as f64));
        for i in 0..5 {
            for j in 0..4 {
                assert_eq!(v.get(i, j), (i * 4 + j) as f64);
            }
        }
    }

    #[test]
    fn test_zero_columns_rows_are_empty() {
        let mut v: View2D<f64, LayoutLeft, HostSpace> = View2D::new("V", 3, 0).unwrap();
        assert!(v.row(2).is_empty());
        assert_eq!(v.row(2).iter().count(), 0);
        assert_eq!(v.par_rows_mut().filter(|r| r.is_empty()).count(), 3);
    }

    #[test]
    fn test_device_mirror_allocates_and_needs_deep_copy() {
        let mut c: View1D = View1D::new("C", 3).unwrap();
        let mut h_c = c.create_mirror_view().unwrap();
        assert!(!c.shares_storage_with(&h_c));
        assert_eq!(h_c.label(), "C_mirror");

        c.par_fill(|i| i as f64 + 0.5);
        assert_eq!(h_c.as_slice(), &[0.0, 0.0, 0.0]);

        deep_copy(&mut h_c, &c).unwrap();
        assert_eq!(h_c.as_slice(), &[0.5, 1.5, 2.5]);
    }

    #[test]
    fn test_host_mirror_shares_storage() {
        let mut h: View1D<f64, HostSpace> = View1D::new("H", 2).unwrap();
        h.set(0, 7.0);
        let mut m = h.create_mirror_view().unwrap();
        assert!(h.shares_storage_with(&m));
        assert_eq!(m[0], 7.0);

        // Aliased copy is a no-op.
        deep_copy(&mut m, &h).unwrap();
        assert!(h.shares_storage_with(&m));

        // A write detaches; the mirror keeps the old contents until synced.
        h.set(1, 3.0);
        assert!(!h.shares_storage_with(&m));
        assert_eq!(m[1], 0.0);
        deep_copy(&mut m, &h).unwrap();
        assert_eq!(m.as_slice(), &[7.0, 3.0]);
    }

    #[test]
    fn test_deep_copy_2d_mirror() {
        let mut a: View2D<f64, LayoutLeft> = View2D::new("A", 2, 2).unwrap();
        a.set(1, 0, 4.0);
        let mut h_a = a.create_mirror_view().unwrap();
        deep_copy(&mut h_a, &a).unwrap();
        assert_eq!(h_a.get(1, 0), 4.0);
    }

    #[test]
    fn test_deep_copy_shape_mismatch() {
        let c: View1D = View1D::new("C", 3).unwrap();
        let mut h: View1D<f64, HostSpace> = View1D::new("H", 4).unwrap();
        match deep_copy(&mut h, &c) {
            Err(BenchError::ShapeMismatch { dst_len, src_len, .. }) => {
                assert_eq!((dst_len, src_len), (4, 3));
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }

        let a: View2D<f64, LayoutRight> = View2D::new("A", 2, 3).unwrap();
        let mut b: View2D<f64, LayoutRight, HostSpace> = View2D::new("B", 3, 2).unwrap();
        assert!(deep_copy(&mut b, &a).is_err());
    }

    #[test]
    fn test_allocation_failure_is_reported() {
        let err = View2D::<f64, LayoutRight>::new("huge", usize::MAX / 2, 4).unwrap_err();
        assert!(matches!(err, BenchError::Allocation { .. }), "{}", err);

        let err = View1D::<f64>::new("huge", usize::MAX / 4).unwrap_err();
        assert!(matches!(err, BenchError::Allocation { .. }), "{}", err);
    }
}
