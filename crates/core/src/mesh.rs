//! Triangle input for voxelization
//!
//! Mesh loading lives outside this crate; callers hand the voxelizer a flat
//! list of world-space triangles. A few procedural primitives are provided
//! for scenes and tests that don't need a file loader.

use crate::Vec3;
use serde::{Deserialize, Serialize};

/// Three world-space vertices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    #[must_use]
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Vertices as an array, handy for min/max folds
    #[must_use]
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    /// Component-wise minimum of the three vertices
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.a.inf(&self.b).inf(&self.c)
    }

    /// Component-wise maximum of the three vertices
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.a.sup(&self.b).sup(&self.c)
    }

    /// Translate every vertex by `-origin`
    #[must_use]
    pub fn relative_to(&self, origin: &Vec3) -> Self {
        Self::new(self.a - origin, self.b - origin, self.c - origin)
    }

    /// True if every coordinate is finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.vertices()
            .iter()
            .all(|v| v.iter().all(|c| c.is_finite()))
    }
}

/// Axis-aligned bounding box of a triangle list, `None` when empty
#[must_use]
pub fn bounds(triangles: &[Triangle]) -> Option<(Vec3, Vec3)> {
    let first = triangles.first()?;
    Some(
        triangles
            .iter()
            .fold((first.min(), first.max()), |(lo, hi), tri| {
                (lo.inf(&tri.min()), hi.sup(&tri.max()))
            }),
    )
}

/// Two triangles spanning the quad `a, b, c, d` (in winding order)
#[must_use]
pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> [Triangle; 2] {
    [Triangle::new(a, b, c), Triangle::new(a, c, d)]
}

/// Closed axis-aligned box surface, 12 triangles
#[must_use]
pub fn box_mesh(min: Vec3, max: Vec3) -> Vec<Triangle> {
    let corner = |x: bool, y: bool, z: bool| {
        Vec3::new(
            if x { max.x } else { min.x },
            if y { max.y } else { min.y },
            if z { max.z } else { min.z },
        )
    };

    let faces = [
        // -x / +x
        quad(
            corner(false, false, false),
            corner(false, false, true),
            corner(false, true, true),
            corner(false, true, false),
        ),
        quad(
            corner(true, false, false),
            corner(true, true, false),
            corner(true, true, true),
            corner(true, false, true),
        ),
        // -y / +y
        quad(
            corner(false, false, false),
            corner(true, false, false),
            corner(true, false, true),
            corner(false, false, true),
        ),
        quad(
            corner(false, true, false),
            corner(false, true, true),
            corner(true, true, true),
            corner(true, true, false),
        ),
        // -z / +z
        quad(
            corner(false, false, false),
            corner(false, true, false),
            corner(true, true, false),
            corner(true, false, false),
        ),
        quad(
            corner(false, false, true),
            corner(true, false, true),
            corner(true, true, true),
            corner(false, true, true),
        ),
    ];

    faces.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_min_max() {
        let tri = Triangle::new(
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-1.0, 4.0, 0.0),
            Vec3::new(0.5, 0.0, 5.0),
        );
        assert_eq!(tri.min(), Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(tri.max(), Vec3::new(1.0, 4.0, 5.0));
    }

    #[test]
    fn test_box_mesh_bounds() {
        let tris = box_mesh(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(1.0, 3.0, 4.0));
        assert_eq!(tris.len(), 12);
        let (lo, hi) = bounds(&tris).unwrap();
        assert_eq!(lo, Vec3::new(-1.0, 0.0, 2.0));
        assert_eq!(hi, Vec3::new(1.0, 3.0, 4.0));
    }

    #[test]
    fn test_bounds_empty() {
        assert!(bounds(&[]).is_none());
    }

    #[test]
    fn test_is_finite() {
        let mut tri = Triangle::new(Vec3::zeros(), Vec3::x(), Vec3::y());
        assert!(tri.is_finite());
        tri.c.z = f32::NAN;
        assert!(!tri.is_finite());
    }
}
