use super::ConvexShape;
use crate::mesh::HalfEdgeMesh;
use fyrox_math::aabb::AxisAlignedBoundingBox;
use fyrox_math::get_farthest_point;
use nalgebra::Vector3;

/// A convex polyhedron backed by a [`HalfEdgeMesh`] - boxes, the output of
/// QuickHull, and HACD sub-meshes all end up represented this way.
#[derive(Clone)]
pub struct ConvexPolyhedron {
    points: Vec<Vector3<f32>>,
    local_aabb: AxisAlignedBoundingBox,
}

impl ConvexPolyhedron {
    pub fn from_mesh(mesh: &HalfEdgeMesh) -> Self {
        let points: Vec<_> = mesh.vertices().map(|(_, v)| v.position).collect();
        Self::from_points(points)
    }

    pub fn from_points(points: Vec<Vector3<f32>>) -> Self {
        let local_aabb = AxisAlignedBoundingBox::from_points(&points);
        Self { points, local_aabb }
    }

    pub fn points(&self) -> &[Vector3<f32>] {
        &self.points
    }

    /// A unit-dimension box centered on the origin, the common case for
    /// rigid-body collider boxes.
    pub fn unit_cube() -> Self {
        let points = (0u8..8)
            .map(|mask| {
                Vector3::new(
                    if mask & 1 != 0 { 0.5 } else { -0.5 },
                    if mask & 2 != 0 { 0.5 } else { -0.5 },
                    if mask & 4 != 0 { 0.5 } else { -0.5 },
                )
            })
            .collect();
        Self::from_points(points)
    }
}

impl ConvexShape for ConvexPolyhedron {
    fn support_local(&self, direction: Vector3<f32>) -> Vector3<f32> {
        get_farthest_point(&self.points, direction)
    }

    fn local_aabb(&self) -> AxisAlignedBoundingBox {
        self.local_aabb
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unit_cube_support_point_is_a_corner() {
        let cube = ConvexPolyhedron::unit_cube();
        let p = cube.support_local(Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Vector3::new(0.5, 0.5, 0.5));
    }
}
