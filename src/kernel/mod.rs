//! Kernel functions for SVM training

pub mod linear;
pub mod poly;
pub mod rbf;
pub mod traits;

pub use linear::LinearKernel;
pub use poly::PolyKernel;
pub use rbf::RbfKernel;
pub use traits::Kernel;
