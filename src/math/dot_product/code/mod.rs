//! Kernel and initializer for the array of dot products.

mod batch;
mod functor;

pub use batch::VectorBatch;
pub use functor::DotProductFunctor;
