use nalgebra::{Matrix3, Point3, Rotation3, Unit, Vector3};

const DEGENERACY_EPSILON: f64 = 1e-8;

/// A proper rigid transform: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl RigidTransform {
    pub fn new(rotation: Rotation3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Rotation3::identity(), Vector3::zeros())
    }

    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::new(Rotation3::identity(), translation)
    }

    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.rotation * point + self.translation
    }

    /// Checks orthonormality and a determinant of +1 within `tolerance`.
    pub fn is_proper(&self, tolerance: f64) -> bool {
        let m = self.rotation.matrix();
        let orthonormal = (m.transpose() * m - Matrix3::identity()).norm() < tolerance;
        orthonormal && (m.determinant() - 1.0).abs() < tolerance
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

fn any_perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let helper = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    (helper - v * v.dot(&helper)).normalize()
}

/// Rotation carrying the direction of `from` onto the direction of `to`.
///
/// Opposite directions are handled with a half turn about an arbitrary perpendicular axis.
pub fn rotation_to_align(from: &Vector3<f64>, to: &Vector3<f64>) -> Option<Rotation3<f64>> {
    let a = from.try_normalize(DEGENERACY_EPSILON)?;
    let b = to.try_normalize(DEGENERACY_EPSILON)?;
    if a.dot(&b) < -1.0 + DEGENERACY_EPSILON {
        let axis = Unit::new_normalize(any_perpendicular(&a));
        return Some(Rotation3::from_axis_angle(&axis, std::f64::consts::PI));
    }
    Rotation3::rotation_between(&a, &b)
}

// Right-handed orthonormal frame spanned by `primary` and the in-plane part of `secondary`.
fn local_frame(primary: &Vector3<f64>, secondary: &Vector3<f64>) -> Option<Matrix3<f64>> {
    let e1 = primary.try_normalize(DEGENERACY_EPSILON)?;
    let in_plane = secondary - e1 * e1.dot(secondary);
    let e2 = in_plane.try_normalize(DEGENERACY_EPSILON)?;
    let e3 = e1.cross(&e2);
    Some(Matrix3::from_columns(&[e1, e2, e3]))
}

/// Three-point match.
///
/// Computes the rigid transform that puts `from[0]` exactly onto `to[0]`, aligns the
/// direction `from[0] -> from[1]` with `to[0] -> to[1]`, and rotates about that axis so
/// that `from[2]` lies in the half-plane spanned by `to[0]`, `to[1]`, `to[2]`. When a
/// third point is collinear with the first two only the axis is aligned; when the second
/// points coincide with the first, the third pair takes over as the axis.
pub fn match_points(from: [&Point3<f64>; 3], to: [&Point3<f64>; 3]) -> RigidTransform {
    let a1 = from[1] - from[0];
    let a2 = from[2] - from[0];
    let b1 = to[1] - to[0];
    let b2 = to[2] - to[0];

    let rotation = match (local_frame(&a1, &a2), local_frame(&b1, &b2)) {
        (Some(frame_from), Some(frame_to)) => {
            Rotation3::from_matrix_unchecked(frame_to * frame_from.transpose())
        }
        _ => rotation_to_align(&a1, &b1)
            .or_else(|| rotation_to_align(&a2, &b2))
            .unwrap_or_else(Rotation3::identity),
    };

    let translation = to[0].coords - rotation * from[0].coords;
    RigidTransform::new(rotation, translation)
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn arbitrary_transform() -> RigidTransform {
        RigidTransform::new(
            Rotation3::from_euler_angles(0.3, -1.1, 2.4),
            Vector3::new(4.0, -2.5, 7.25),
        )
    }

    #[test]
    fn match_points_recovers_congruent_transform() {
        let from = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, 0.0, 0.0),
            Point3::new(-0.4, 1.1, 0.3),
        ];
        let truth = arbitrary_transform();
        let to: Vec<_> = from.iter().map(|p| truth.apply(p)).collect();

        let found = match_points([&from[0], &from[1], &from[2]], [&to[0], &to[1], &to[2]]);

        assert!(found.is_proper(1e-9));
        for (p, q) in from.iter().zip(&to) {
            assert!((found.apply(p) - q).norm() < TOLERANCE);
        }
    }

    #[test]
    fn match_points_is_exact_on_first_point_and_direction_for_non_congruent_sets() {
        let from = [
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 1.0, 1.0),
            Point3::new(1.0, 3.0, 1.0),
        ];
        let to = [
            Point3::new(-1.0, 0.0, 2.0),
            Point3::new(-1.0, 0.0, 5.0),
            Point3::new(0.0, 0.5, 2.0),
        ];
        let found = match_points([&from[0], &from[1], &from[2]], [&to[0], &to[1], &to[2]]);

        assert!((found.apply(&from[0]) - to[0]).norm() < TOLERANCE);
        let moved_dir = (found.apply(&from[1]) - to[0]).normalize();
        let target_dir = (to[1] - to[0]).normalize();
        assert!((moved_dir - target_dir).norm() < TOLERANCE);
        assert!(found.is_proper(1e-9));
    }

    #[test]
    fn match_points_handles_collinear_third_point() {
        let origin = Point3::origin();
        let from = [Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0), origin];
        let to = [Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 2.0, 0.0), origin];

        let found = match_points([&from[0], &from[1], &from[2]], [&to[0], &to[1], &to[2]]);

        assert!((found.apply(&from[0]) - to[0]).norm() < TOLERANCE);
        assert!((found.apply(&from[1]) - to[1]).norm() < TOLERANCE);
        assert!(found.is_proper(1e-9));
    }

    #[test]
    fn rotation_to_align_handles_opposite_vectors() {
        let from = Vector3::new(1.0, 0.0, 0.0);
        let to = Vector3::new(-2.0, 0.0, 0.0);
        let rotation = rotation_to_align(&from, &to).unwrap();
        assert!((rotation * from - Vector3::new(-1.0, 0.0, 0.0)).norm() < TOLERANCE);
        assert!(rotation_to_align(&Vector3::zeros(), &to).is_none());
    }

    #[test]
    fn calculate_rmsd_returns_none_for_mismatched_or_empty_inputs() {
        let a = [Point3::new(0.0, 0.0, 0.0)];
        let b = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert!(calculate_rmsd(&a, &b).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
        assert_eq!(calculate_rmsd(&b, &b), Some(0.0));
    }
}
