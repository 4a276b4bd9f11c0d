use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};

/// A 3-dimensional vector type, implementing the usual arithmetic operations.
///
/// The product of two vectors (`u * v`) is their scalar product, and the
/// product of a vector and a scalar (`u * 2.0` or `2.0 * u`) scales every
/// component.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3D(pub [f64; 3]);

impl Vector3D {
    /// Create a new vector with the given `x`, `y`, `z` components
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Vector3D {
        Vector3D([x, y, z])
    }

    /// Create a vector with all components set to zero
    #[inline]
    pub fn zero() -> Vector3D {
        Vector3D([0.0; 3])
    }

    /// Get the squared euclidean norm of this vector
    #[inline]
    pub fn norm2(&self) -> f64 {
        self * self
    }

    /// Get the euclidean norm of this vector
    #[inline]
    pub fn norm(&self) -> f64 {
        f64::sqrt(self.norm2())
    }

    /// Get a normalized copy of this vector
    #[inline]
    pub fn normalized(&self) -> Vector3D {
        *self / self.norm()
    }
}

impl From<[f64; 3]> for Vector3D {
    fn from(values: [f64; 3]) -> Vector3D {
        Vector3D(values)
    }
}

impl Index<usize> for Vector3D {
    type Output = f64;
    #[inline]
    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl IndexMut<usize> for Vector3D {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

/// Implement an operator for all combinations of values and references
macro_rules! impl_binary_op {
    ($Op: ident, $op: ident, $lhs: ty, $rhs: ty, $Output: ty, $sel: ident, $other: ident, $res: expr) => {
        impl $Op<$rhs> for $lhs {
            type Output = $Output;
            #[inline]
            fn $op($sel, $other: $rhs) -> $Output {
                $res
            }
        }

        impl $Op<$rhs> for &$lhs {
            type Output = $Output;
            #[inline]
            fn $op($sel, $other: $rhs) -> $Output {
                $res
            }
        }

        impl $Op<&$rhs> for $lhs {
            type Output = $Output;
            #[inline]
            fn $op($sel, $other: &$rhs) -> $Output {
                $res
            }
        }

        impl $Op<&$rhs> for &$lhs {
            type Output = $Output;
            #[inline]
            fn $op($sel, $other: &$rhs) -> $Output {
                $res
            }
        }
    };
}

impl_binary_op!(Add, add, Vector3D, Vector3D, Vector3D, self, other, {
    Vector3D::new(self[0] + other[0], self[1] + other[1], self[2] + other[2])
});

impl_binary_op!(Sub, sub, Vector3D, Vector3D, Vector3D, self, other, {
    Vector3D::new(self[0] - other[0], self[1] - other[1], self[2] - other[2])
});

// scalar product of two vectors
impl_binary_op!(Mul, mul, Vector3D, Vector3D, f64, self, other, {
    self[0] * other[0] + self[1] * other[1] + self[2] * other[2]
});

impl_binary_op!(Mul, mul, Vector3D, f64, Vector3D, self, other, {
    Vector3D::new(self[0] * other, self[1] * other, self[2] * other)
});

impl_binary_op!(Mul, mul, f64, Vector3D, Vector3D, self, other, {
    Vector3D::new(self * other[0], self * other[1], self * other[2])
});

impl_binary_op!(Div, div, Vector3D, f64, Vector3D, self, other, {
    Vector3D::new(self[0] / other, self[1] / other, self[2] / other)
});

impl Neg for Vector3D {
    type Output = Vector3D;
    #[inline]
    fn neg(self) -> Vector3D {
        Vector3D::new(-self[0], -self[1], -self[2])
    }
}

impl Neg for &Vector3D {
    type Output = Vector3D;
    #[inline]
    fn neg(self) -> Vector3D {
        -*self
    }
}

impl AddAssign<Vector3D> for Vector3D {
    #[inline]
    fn add_assign(&mut self, other: Vector3D) {
        self[0] += other[0];
        self[1] += other[1];
        self[2] += other[2];
    }
}

impl SubAssign<Vector3D> for Vector3D {
    #[inline]
    fn sub_assign(&mut self, other: Vector3D) {
        self[0] -= other[0];
        self[1] -= other[1];
        self[2] -= other[2];
    }
}

impl approx::AbsDiffEq for Vector3D {
    type Epsilon = <f64 as approx::AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        f64::abs_diff_eq(&self[0], &other[0], epsilon)
            && f64::abs_diff_eq(&self[1], &other[1], epsilon)
            && f64::abs_diff_eq(&self[2], &other[2], epsilon)
    }
}

impl approx::RelativeEq for Vector3D {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        f64::relative_eq(&self[0], &other[0], epsilon, max_relative)
            && f64::relative_eq(&self[1], &other[1], epsilon, max_relative)
            && f64::relative_eq(&self[2], &other[2], epsilon, max_relative)
    }
}

impl approx::UlpsEq for Vector3D {
    fn default_max_ulps() -> u32 {
        f64::default_max_ulps()
    }

    fn ulps_eq(&self, other: &Self, epsilon: Self::Epsilon, max_ulps: u32) -> bool {
        f64::ulps_eq(&self[0], &other[0], epsilon, max_ulps)
            && f64::ulps_eq(&self[1], &other[1], epsilon, max_ulps)
            && f64::ulps_eq(&self[2], &other[2], epsilon, max_ulps)
    }
}
