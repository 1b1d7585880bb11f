//! Storage layout policies for 2D views.
//!
//! A layout maps a `(row, col)` index pair to a linear offset. The choice is
//! a type parameter of [`View2D`](super::View2D), so kernels are compiled once
//! per layout and never branch on it at runtime.
//!
//! - [`LayoutRight`]: right-most index is stride 1 ("row-major"). Each vector
//!   of a batch is contiguous, which suits CPU caches.
//! - [`LayoutLeft`]: left-most index is stride 1 ("column-major"). Neighbouring
//!   vectors sit next to each other, which suits coalesced device access.

use std::fmt;
use std::str::FromStr;

use crate::error::BenchError;

/// Mapping from a 2D index to a linear memory offset.
pub trait Layout: Copy + Default + Send + Sync + 'static {
    /// Name used in logs and reports.
    const NAME: &'static str;

    /// Runtime tag for this layout.
    const KIND: LayoutKind;

    /// Returns `(row_stride, col_stride)` for a `rows x cols` allocation.
    fn strides(rows: usize, cols: usize) -> (usize, usize);

    /// Linear offset of `(row, col)`.
    #[inline(always)]
    fn offset(row: usize, col: usize, rows: usize, cols: usize) -> usize {
        let (rs, cs) = Self::strides(rows, cols);
        row * rs + col * cs
    }
}

/// Row-major: `offset = row * cols + col`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutRight;

/// Column-major: `offset = row + col * rows`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutLeft;

impl Layout for LayoutRight {
    const NAME: &'static str = "LayoutRight";
    const KIND: LayoutKind = LayoutKind::Right;

    #[inline(always)]
    fn strides(_rows: usize, cols: usize) -> (usize, usize) {
        (cols, 1)
    }
}

impl Layout for LayoutLeft {
    const NAME: &'static str = "LayoutLeft";
    const KIND: LayoutKind = LayoutKind::Left;

    #[inline(always)]
    fn strides(rows: usize, _cols: usize) -> (usize, usize) {
        (1, rows)
    }
}

/// Layout used when none is requested explicitly.
#[cfg(not(feature = "layout-left"))]
pub type DefaultLayout = LayoutRight;

#[cfg(feature = "layout-left")]
pub type DefaultLayout = LayoutLeft;

/// Configuration-time layout selector.
///
/// Only used to pick a monomorphization at the top of the harness; views and
/// kernels are generic over [`Layout`] instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutKind {
    Right,
    Left,
}

impl Default for LayoutKind {
    fn default() -> Self {
        DefaultLayout::KIND
    }
}

impl LayoutKind {
    pub fn name(self) -> &'static str {
        match self {
            LayoutKind::Right => LayoutRight::NAME,
            LayoutKind::Left => LayoutLeft::NAME,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "right" | "layoutright" | "row" | "row-major" => Ok(LayoutKind::Right),
            "left" | "layoutleft" | "col" | "column-major" => Ok(LayoutKind::Left),
            other => Err(BenchError::Cli(format!(
                "unknown layout '{}' (expected 'right' or 'left')",
                other
            ))),
        }
    }
}
