use super::convex::ConvexPolyhedron;
use super::ConvexShape;
use fyrox_math::aabb::AxisAlignedBoundingBox;

/// A concave collider assembled from several convex parts in a shared local
/// frame - the Rust-idiom equivalent of the source engine's
/// `CompositeCollider` (there, a `vector<unique_ptr<ConvexCollider>>`; here,
/// a plain closed-shape vector since every part is the same
/// [`ConvexPolyhedron`] type).
pub struct CompositeCollider {
    parts: Vec<ConvexPolyhedron>,
    local_aabb: AxisAlignedBoundingBox,
}

impl CompositeCollider {
    pub fn new(parts: Vec<ConvexPolyhedron>) -> Self {
        let mut local_aabb = AxisAlignedBoundingBox::default();
        for part in &parts {
            local_aabb.add_box(part.local_aabb());
        }
        Self { parts, local_aabb }
    }

    pub fn parts(&self) -> &[ConvexPolyhedron] {
        &self.parts
    }

    pub fn local_aabb(&self) -> AxisAlignedBoundingBox {
        self.local_aabb
    }
}
