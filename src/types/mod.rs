//! This module provides the 3D vector type used for positions, separations
//! and forces in all other modules.

mod vectors;
pub use self::vectors::Vector3D;
