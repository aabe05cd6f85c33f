//! 3D transformation matrix operations.

use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// A 3D transformation represented as a 4x4 matrix.
///
/// Supports the operations the pipeline needs: translation, axis rotations,
/// uniform scaling, and composition. The pipeline uses these to bake a source
/// object's world transform into its copy, to tilt the synthetic port cuboid,
/// and to rotate a loaded hanger into position.
///
/// # Example
///
/// ```
/// use holder_mesh::Transform3D;
///
/// let translate = Transform3D::translation(1.0, 2.0, 3.0);
/// let scale = Transform3D::uniform_scale(2.0);
/// let combined = translate.then(&scale);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Transform3D {
    /// The 4x4 transformation matrix in column-major order.
    matrix: Matrix4<f64>,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// Create a new transformation from a 4x4 matrix.
    #[must_use]
    pub const fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Create the identity transformation (no change).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation.
    #[must_use]
    pub fn translation(tx: f64, ty: f64, tz: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vector3::new(tx, ty, tz)),
        }
    }

    /// Create a translation from a vector.
    #[must_use]
    pub fn from_translation(v: Vector3<f64>) -> Self {
        Self::translation(v.x, v.y, v.z)
    }

    /// Create a uniform scaling transformation.
    #[must_use]
    pub fn uniform_scale(factor: f64) -> Self {
        Self {
            matrix: Matrix4::new_scaling(factor),
        }
    }

    /// Create a rotation around the X axis.
    ///
    /// # Arguments
    ///
    /// * `angle` - Rotation angle in radians
    #[must_use]
    pub fn rotation_x(angle: f64) -> Self {
        let cos_a = angle.cos();
        let sin_a = angle.sin();
        #[rustfmt::skip]
        let matrix = Matrix4::new(
            1.0,   0.0,    0.0, 0.0,
            0.0, cos_a, -sin_a, 0.0,
            0.0, sin_a,  cos_a, 0.0,
            0.0,   0.0,    0.0, 1.0,
        );
        Self { matrix }
    }

    /// Create a rotation around the Y axis.
    ///
    /// # Arguments
    ///
    /// * `angle` - Rotation angle in radians
    #[must_use]
    pub fn rotation_y(angle: f64) -> Self {
        let cos_a = angle.cos();
        let sin_a = angle.sin();
        #[rustfmt::skip]
        let matrix = Matrix4::new(
             cos_a, 0.0, sin_a, 0.0,
               0.0, 1.0,   0.0, 0.0,
            -sin_a, 0.0, cos_a, 0.0,
               0.0, 0.0,   0.0, 1.0,
        );
        Self { matrix }
    }

    /// Create a rotation around the Z axis.
    ///
    /// # Arguments
    ///
    /// * `angle` - Rotation angle in radians
    #[must_use]
    pub fn rotation_z(angle: f64) -> Self {
        let cos_a = angle.cos();
        let sin_a = angle.sin();
        #[rustfmt::skip]
        let matrix = Matrix4::new(
            cos_a, -sin_a, 0.0, 0.0,
            sin_a,  cos_a, 0.0, 0.0,
              0.0,    0.0, 1.0, 0.0,
              0.0,    0.0, 0.0, 1.0,
        );
        Self { matrix }
    }

    /// Create a rotation applied about an arbitrary pivot point.
    ///
    /// Translates the pivot to the origin, applies `rotation`, and
    /// translates back. Used to tilt the port cuboid about its own center.
    #[must_use]
    pub fn rotation_about_point(rotation: &Self, pivot: Point3<f64>) -> Self {
        Self::from_translation(-pivot.coords)
            .then(rotation)
            .then(&Self::from_translation(pivot.coords))
    }

    /// Get the underlying 4x4 matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Compose this transformation with another (self then other).
    ///
    /// The result applies `self` first, then `other`.
    #[must_use]
    pub fn then(&self, other: &Self) -> Self {
        Self {
            matrix: other.matrix * self.matrix,
        }
    }

    /// Transform a point (applies translation).
    #[must_use]
    pub fn transform_point(&self, point: Point3<f64>) -> Point3<f64> {
        let p = Vector4::new(point.x, point.y, point.z, 1.0);
        let result = self.matrix * p;
        Point3::new(result.x, result.y, result.z)
    }

    /// Transform a direction vector (ignores translation).
    #[must_use]
    pub fn transform_vector(&self, vector: Vector3<f64>) -> Vector3<f64> {
        let v = Vector4::new(vector.x, vector.y, vector.z, 0.0);
        let result = self.matrix * v;
        Vector3::new(result.x, result.y, result.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn identity_transformation() {
        let t = Transform3D::identity();
        let result = t.transform_point(Point3::new(1.0, 2.0, 3.0));

        assert_relative_eq!(result.x, 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.y, 2.0, epsilon = 1e-10);
        assert_relative_eq!(result.z, 3.0, epsilon = 1e-10);
    }

    #[test]
    fn translation() {
        let t = Transform3D::translation(10.0, 20.0, 30.0);
        let result = t.transform_point(Point3::new(1.0, 2.0, 3.0));

        assert_relative_eq!(result.x, 11.0, epsilon = 1e-10);
        assert_relative_eq!(result.y, 22.0, epsilon = 1e-10);
        assert_relative_eq!(result.z, 33.0, epsilon = 1e-10);
    }

    #[test]
    fn translation_does_not_affect_vectors() {
        let t = Transform3D::translation(10.0, 20.0, 30.0);
        let result = t.transform_vector(Vector3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(result.x, 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.y, 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.z, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn uniform_scale() {
        let t = Transform3D::uniform_scale(2.0);
        let result = t.transform_point(Point3::new(1.0, 2.0, 3.0));

        assert_relative_eq!(result.x, 2.0, epsilon = 1e-10);
        assert_relative_eq!(result.y, 4.0, epsilon = 1e-10);
        assert_relative_eq!(result.z, 6.0, epsilon = 1e-10);
    }

    #[test]
    fn rotation_x_90_degrees() {
        let t = Transform3D::rotation_x(PI / 2.0);
        let result = t.transform_point(Point3::new(0.0, 1.0, 0.0));

        // Y axis rotates to Z axis
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.y, 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.z, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn rotation_y_90_degrees() {
        let t = Transform3D::rotation_y(PI / 2.0);
        let result = t.transform_point(Point3::new(1.0, 0.0, 0.0));

        // X axis rotates to -Z axis
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.y, 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.z, -1.0, epsilon = 1e-10);
    }

    #[test]
    fn rotation_z_90_degrees() {
        let t = Transform3D::rotation_z(PI / 2.0);
        let result = t.transform_point(Point3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(result.x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.z, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn composition() {
        let translate = Transform3D::translation(1.0, 0.0, 0.0);
        let scale = Transform3D::uniform_scale(2.0);

        // Translate then scale
        let combined = translate.then(&scale);
        let result = combined.transform_point(Point3::new(0.0, 0.0, 0.0));

        // (0,0,0) + (1,0,0) = (1,0,0), then * 2 = (2,0,0)
        assert_relative_eq!(result.x, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn rotation_about_point_fixes_pivot() {
        let rot = Transform3D::rotation_y(PI / 3.0);
        let pivot = Point3::new(5.0, -2.0, 7.0);
        let t = Transform3D::rotation_about_point(&rot, pivot);

        // The pivot itself must not move
        let result = t.transform_point(pivot);
        assert_relative_eq!(result.x, pivot.x, epsilon = 1e-10);
        assert_relative_eq!(result.y, pivot.y, epsilon = 1e-10);
        assert_relative_eq!(result.z, pivot.z, epsilon = 1e-10);
    }

    #[test]
    fn rotation_about_point_moves_others() {
        let rot = Transform3D::rotation_z(PI);
        let pivot = Point3::new(1.0, 0.0, 0.0);
        let t = Transform3D::rotation_about_point(&rot, pivot);

        // (2,0,0) rotated 180 degrees about (1,0,0) lands on (0,0,0)
        let result = t.transform_point(Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.y, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn default_is_identity() {
        let t = Transform3D::default();
        let result = t.transform_point(Point3::new(5.0, 10.0, 15.0));

        assert_relative_eq!(result.x, 5.0, epsilon = 1e-10);
        assert_relative_eq!(result.y, 10.0, epsilon = 1e-10);
        assert_relative_eq!(result.z, 15.0, epsilon = 1e-10);
    }

    #[test]
    fn matrix_accessor() {
        let t = Transform3D::identity();
        let m = t.matrix();
        assert_relative_eq!(m[(0, 0)], 1.0, epsilon = 1e-10);
        assert_relative_eq!(m[(1, 1)], 1.0, epsilon = 1e-10);
        assert_relative_eq!(m[(0, 1)], 0.0, epsilon = 1e-10);
    }
}
