use nalgebra as na;
use crate::math::Vector3;
use std::fmt;
use std::ops::{Add, Mul, Neg};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A row-major 3x3 matrix used for orientations, inertia tensors and
/// contact bases
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Matrix3 {
    pub data: [[f32; 3]; 3],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix3 {
    /// Creates a new 3x3 matrix from a 2D array of rows
    #[inline]
    pub fn new(data: [[f32; 3]; 3]) -> Self {
        Self { data }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::from_diagonal(Vector3::one())
    }

    #[inline]
    pub fn zero() -> Self {
        Self { data: [[0.0; 3]; 3] }
    }

    /// Creates a diagonal matrix
    #[inline]
    pub fn from_diagonal(diagonal: Vector3) -> Self {
        Self {
            data: [
                [diagonal.x, 0.0, 0.0],
                [0.0, diagonal.y, 0.0],
                [0.0, 0.0, diagonal.z],
            ],
        }
    }

    /// Creates a matrix whose columns are the three given vectors
    #[inline]
    pub fn from_columns(a: Vector3, b: Vector3, c: Vector3) -> Self {
        Self {
            data: [
                [a.x, b.x, c.x],
                [a.y, b.y, c.y],
                [a.z, b.z, c.z],
            ],
        }
    }

    /// Creates the skew-symmetric matrix of `v`, so that
    /// `skew_symmetric(v) * x == v.cross(&x)`
    #[inline]
    pub fn skew_symmetric(v: Vector3) -> Self {
        Self {
            data: [
                [0.0, -v.z, v.y],
                [v.z, 0.0, -v.x],
                [-v.y, v.x, 0.0],
            ],
        }
    }

    /// Returns one column of the matrix
    #[inline]
    pub fn column(&self, index: usize) -> Vector3 {
        Vector3::new(self.data[0][index], self.data[1][index], self.data[2][index])
    }

    /// Returns the diagonal of the matrix
    #[inline]
    pub fn diagonal(&self) -> Vector3 {
        Vector3::new(self.data[0][0], self.data[1][1], self.data[2][2])
    }

    pub fn determinant(&self) -> f32 {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        a * (e * i - f * h) -
        b * (d * i - f * g) +
        c * (d * h - e * g)
    }

    /// Returns the inverse of the matrix, or None if it is singular
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();

        if det.abs() < crate::math::EPSILON * crate::math::EPSILON {
            return None;
        }

        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;
        let inv_det = 1.0 / det;

        Some(Self {
            data: [
                [
                    (e * i - f * h) * inv_det,
                    (c * h - b * i) * inv_det,
                    (b * f - c * e) * inv_det,
                ],
                [
                    (f * g - d * i) * inv_det,
                    (a * i - c * g) * inv_det,
                    (c * d - a * f) * inv_det,
                ],
                [
                    (d * h - e * g) * inv_det,
                    (g * b - a * h) * inv_det,
                    (a * e - b * d) * inv_det,
                ],
            ],
        })
    }

    #[inline]
    pub fn transpose(&self) -> Self {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        Self {
            data: [
                [a, d, g],
                [b, e, h],
                [c, f, i],
            ],
        }
    }

    /// Multiplies the matrix by a vector
    #[inline]
    pub fn multiply_vector(&self, v: Vector3) -> Vector3 {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        Vector3::new(
            a * v.x + b * v.y + c * v.z,
            d * v.x + e * v.y + f * v.z,
            g * v.x + h * v.y + i * v.z,
        )
    }

    /// Multiplies the transpose of the matrix by a vector. For an
    /// orthonormal basis this maps world vectors into basis space.
    #[inline]
    pub fn transform_transpose(&self, v: Vector3) -> Vector3 {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        Vector3::new(
            a * v.x + d * v.y + g * v.z,
            b * v.x + e * v.y + h * v.z,
            c * v.x + f * v.y + i * v.z,
        )
    }

    pub fn multiply_matrix(&self, other: &Self) -> Self {
        let mut result = Self::zero();

        for i in 0..3 {
            for j in 0..3 {
                result.data[i][j] = (0..3).map(|k| self.data[i][k] * other.data[k][j]).sum();
            }
        }

        result
    }

    /// Computes `self * m * self^T`, the change of basis used to carry an
    /// inertia tensor between body and world space
    #[inline]
    pub fn transform_tensor(&self, tensor: &Self) -> Self {
        self.multiply_matrix(tensor).multiply_matrix(&self.transpose())
    }

    /// Convert to nalgebra Matrix3
    #[inline]
    pub fn to_nalgebra(&self) -> na::Matrix3<f32> {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        na::Matrix3::new(
            a, b, c,
            d, e, f,
            g, h, i,
        )
    }

    /// Convert from nalgebra Matrix3
    #[inline]
    pub fn from_nalgebra(m: &na::Matrix3<f32>) -> Self {
        Self {
            data: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
        }
    }
}

impl Add for Matrix3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut result = self;
        for i in 0..3 {
            for j in 0..3 {
                result.data[i][j] += rhs.data[i][j];
            }
        }
        result
    }
}

impl Mul<f32> for Matrix3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        let mut result = self;
        for row in result.data.iter_mut() {
            for value in row.iter_mut() {
                *value *= rhs;
            }
        }
        result
    }
}

impl Mul for Matrix3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply_matrix(&rhs)
    }
}

impl Mul<Vector3> for Matrix3 {
    type Output = Vector3;

    #[inline]
    fn mul(self, rhs: Vector3) -> Self::Output {
        self.multiply_vector(rhs)
    }
}

impl Neg for Matrix3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl fmt::Display for Matrix3 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[ {}, {}, {} ]", self.data[0][0], self.data[0][1], self.data[0][2])?;
        writeln!(f, "[ {}, {}, {} ]", self.data[1][0], self.data[1][1], self.data[1][2])?;
        write!(f, "[ {}, {}, {} ]", self.data[2][0], self.data[2][1], self.data[2][2])
    }
}
