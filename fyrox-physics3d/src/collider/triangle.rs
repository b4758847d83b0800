use super::ConvexShape;
use fyrox_math::aabb::AxisAlignedBoundingBox;
use fyrox_math::get_farthest_point;
use nalgebra::Vector3;

/// A single triangle treated as a degenerate convex shape - used both as a
/// standalone collider and as the convex part enumerated by
/// [`super::TerrainCollider`]/[`super::CompositeCollider`].
#[derive(Clone, Copy, Debug)]
pub struct TriangleCollider {
    pub vertices: [Vector3<f32>; 3],
}

impl TriangleCollider {
    pub fn new(vertices: [Vector3<f32>; 3]) -> Self {
        Self { vertices }
    }
}

impl ConvexShape for TriangleCollider {
    fn support_local(&self, direction: Vector3<f32>) -> Vector3<f32> {
        get_farthest_point(&self.vertices, direction)
    }

    fn local_aabb(&self) -> AxisAlignedBoundingBox {
        AxisAlignedBoundingBox::from_points(&self.vertices)
    }
}
