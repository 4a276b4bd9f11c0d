//! The `Boundary` type represents the enclosing box of a simulated system,
//! with periodic boundary conditions applied per axis.

use crate::{Error, Vector3D};

/// A rectangular simulation box, with an independent length and periodicity
/// flag along each axis.
///
/// Positions are logically wrapped into `[-L/2, L/2)` along every periodic
/// axis, and separation vectors follow the minimum-image convention: the
/// shortest vector between two points, accounting for wraparound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    /// Box edge lengths along x, y, z
    lengths: Vector3D,
    /// Periodicity flags along x, y, z
    periodic: [bool; 3],
}

impl Boundary {
    /// Create a new boundary with the given edge `lengths` and per-axis
    /// `periodic` flags.
    pub fn new(lengths: Vector3D, periodic: [bool; 3]) -> Result<Boundary, Error> {
        for axis in 0..3 {
            if !(lengths[axis] > 0.0) || !lengths[axis].is_finite() {
                return Err(Error::InvalidParameter(format!(
                    "box lengths must be positive and finite, got {} on axis {}",
                    lengths[axis], axis
                )));
            }
        }

        Ok(Boundary {
            lengths: lengths,
            periodic: periodic,
        })
    }

    /// Create a fully periodic boundary with edge lengths `a`, `b`, `c`
    pub fn periodic(a: f64, b: f64, c: f64) -> Result<Boundary, Error> {
        Boundary::new(Vector3D::new(a, b, c), [true; 3])
    }

    /// Create a cubic fully periodic boundary with edge length `length`
    pub fn cubic(length: f64) -> Result<Boundary, Error> {
        Boundary::periodic(length, length, length)
    }

    /// Create a non-periodic boundary with edge lengths `a`, `b`, `c`
    pub fn open(a: f64, b: f64, c: f64) -> Result<Boundary, Error> {
        Boundary::new(Vector3D::new(a, b, c), [false; 3])
    }

    /// Get the box edge lengths
    pub fn lengths(&self) -> Vector3D {
        self.lengths
    }

    /// Check whether the given axis (0, 1 or 2) is periodic
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.periodic[axis]
    }

    /// Get the box volume
    pub fn volume(&self) -> f64 {
        self.lengths[0] * self.lengths[1] * self.lengths[2]
    }

    /// Wrap a position inside the box, producing components in `[-L/2, L/2)`
    /// along every periodic axis. Non-periodic axes are left untouched.
    pub fn wrap(&self, position: &mut Vector3D) {
        // f64::floor resolves exactly +L/2 to -L/2 and leaves -L/2 alone,
        // keeping the interval half-open so the seam is never counted on
        // both sides
        for axis in 0..3 {
            if self.periodic[axis] {
                let length = self.lengths[axis];
                position[axis] -= f64::floor(position[axis] / length + 0.5) * length;
            }
        }
    }

    /// Apply the minimum-image convention to a separation `vector`
    pub fn nearest_image(&self, vector: &mut Vector3D) {
        self.wrap(vector);
    }

    /// Get the minimum-image separation vector from `a` to `b`
    pub fn displacement(&self, a: Vector3D, b: Vector3D) -> Vector3D {
        let mut d = b - a;
        self.nearest_image(&mut d);
        return d;
    }

    /// Get the squared minimum-image distance between points `a` and `b`
    pub fn distance2(&self, a: Vector3D, b: Vector3D) -> f64 {
        self.displacement(a, b).norm2()
    }

    /// Get the minimum-image distance between points `a` and `b`
    pub fn distance(&self, a: Vector3D, b: Vector3D) -> f64 {
        f64::sqrt(self.distance2(a, b))
    }
}
