//! Material system
//!
//! Named uniform values resolved against shader reflection.

pub mod material;

pub use material::{Material, MaterialInstance};
