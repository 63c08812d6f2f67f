//! Triangle / axis-aligned box overlap via the separating axis theorem
//!
//! The box is centred at the origin with half-extents `h`; the triangle must
//! already be translated into box-centred coordinates. Two convex shapes are
//! disjoint iff some axis separates their projections. For a triangle and an
//! AABB, 13 candidate axes are sufficient:
//!
//! - 3 box face normals (x, y, z)
//! - 1 triangle face normal
//! - 9 cross products of each triangle edge with each box axis
//!
//! The face-normal tests are cheapest and reject most candidate voxels, so
//! they run first. Touching intervals count as overlap.
//!
//! # References
//!
//! - Akenine-Möller, T. (2001) "Fast 3D Triangle-Box Overlap Testing"

use crate::Vec3;

/// Project the triangle and box onto `axis`, `true` if the intervals are disjoint
#[inline(always)]
fn separated_on_axis(axis: &Vec3, v0: &Vec3, v1: &Vec3, v2: &Vec3, half: &Vec3) -> bool {
    let p0 = axis.dot(v0);
    let p1 = axis.dot(v1);
    let p2 = axis.dot(v2);
    let tri_min = p0.min(p1).min(p2);
    let tri_max = p0.max(p1).max(p2);

    // Box projection radius
    let r = half.x * axis.x.abs() + half.y * axis.y.abs() + half.z * axis.z.abs();

    tri_min > r || tri_max < -r
}

/// 13-axis SAT test: does triangle `(v0, v1, v2)` overlap the box `[-h, h]`?
///
/// Degenerate triangles (zero-length edges or zero area) produce zero axes,
/// which never separate; the remaining axes still decide correctly.
#[must_use]
pub fn triangle_intersects_box(v0: &Vec3, v1: &Vec3, v2: &Vec3, half: &Vec3) -> bool {
    // Box face normals: compare triangle AABB against box extents
    for axis in 0..3 {
        let tri_min = v0[axis].min(v1[axis]).min(v2[axis]);
        let tri_max = v0[axis].max(v1[axis]).max(v2[axis]);
        if tri_min > half[axis] || tri_max < -half[axis] {
            return false;
        }
    }

    let e0 = v1 - v0;
    let e1 = v2 - v1;
    let e2 = v0 - v2;

    // Triangle plane
    let normal = e0.cross(&e1);
    if separated_on_axis(&normal, v0, v1, v2, half) {
        return false;
    }

    // Edge x cardinal axes
    let cardinals = [Vec3::x(), Vec3::y(), Vec3::z()];
    for edge in [&e0, &e1, &e2] {
        for cardinal in &cardinals {
            let axis = edge.cross(cardinal);
            if separated_on_axis(&axis, v0, v1, v2, half) {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half() -> Vec3 {
        Vec3::new(0.5, 0.5, 0.5)
    }

    #[test]
    fn test_triangle_through_center_intersects() {
        let hit = triangle_intersects_box(
            &Vec3::new(-2.0, -2.0, 0.0),
            &Vec3::new(2.0, -2.0, 0.0),
            &Vec3::new(0.0, 2.0, 0.0),
            &half(),
        );
        assert!(hit);
    }

    #[test]
    fn test_triangle_far_away_rejected_by_face_axes() {
        let hit = triangle_intersects_box(
            &Vec3::new(5.0, 5.0, 5.0),
            &Vec3::new(6.0, 5.0, 5.0),
            &Vec3::new(5.0, 6.0, 5.0),
            &half(),
        );
        assert!(!hit);
    }

    #[test]
    fn test_triangle_plane_misses_box() {
        // Triangle AABB overlaps the box but its plane passes beyond the corner
        let hit = triangle_intersects_box(
            &Vec3::new(2.0, 0.0, 0.0),
            &Vec3::new(0.0, 2.0, 0.0),
            &Vec3::new(0.0, 0.0, 2.0),
            &half(),
        );
        // Plane x + y + z = 2, box corner reaches x + y + z = 1.5
        assert!(!hit);
    }

    #[test]
    fn test_triangle_plane_cuts_corner() {
        let hit = triangle_intersects_box(
            &Vec3::new(1.2, 0.0, 0.0),
            &Vec3::new(0.0, 1.2, 0.0),
            &Vec3::new(0.0, 0.0, 1.2),
            &half(),
        );
        assert!(hit);
    }

    #[test]
    fn test_edge_axis_separates() {
        // Plane x = z passes through the box centre and the AABBs overlap;
        // only an edge-cross axis, (1, 1, 0), separates the shapes
        let hit = triangle_intersects_box(
            &Vec3::new(0.9, 0.4, 0.9),
            &Vec3::new(0.4, 0.9, 0.4),
            &Vec3::new(0.9, 0.9, 0.9),
            &half(),
        );
        // Every triangle point has x + y >= 1.3, the box reaches 1.0
        assert!(!hit);
    }

    #[test]
    fn test_touching_face_counts_as_overlap() {
        let hit = triangle_intersects_box(
            &Vec3::new(0.5, -0.5, -0.5),
            &Vec3::new(0.5, 0.5, -0.5),
            &Vec3::new(0.5, -0.5, 0.5),
            &half(),
        );
        assert!(hit);
    }

    #[test]
    fn test_degenerate_point_triangle() {
        let p = Vec3::new(0.1, 0.2, -0.3);
        assert!(triangle_intersects_box(&p, &p, &p, &half()));
        let q = Vec3::new(0.1, 0.9, -0.3);
        assert!(!triangle_intersects_box(&q, &q, &q, &half()));
    }
}
