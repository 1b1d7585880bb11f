//! Numerical kernels.

pub mod dot_product;
