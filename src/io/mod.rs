//! Boundary I/O: the binary model artifact and the optional JSON summary.

pub mod model_file;
pub mod summary;
