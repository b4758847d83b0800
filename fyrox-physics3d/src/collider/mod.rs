//! Collider shapes: convex primitives expose a support function, concave
//! shapes enumerate their convex parts for broad/narrow phase.

pub mod capsule;
pub mod composite;
pub mod convex;
pub mod sphere;
pub mod terrain;
pub mod triangle;

pub use capsule::Capsule;
pub use composite::CompositeCollider;
pub use convex::ConvexPolyhedron;
pub use sphere::Sphere;
pub use terrain::TerrainCollider;
pub use triangle::TriangleCollider;

use fyrox_math::aabb::AxisAlignedBoundingBox;
use nalgebra::{Matrix4, Vector3};

/// Support function contract every convex shape implements: the point of the
/// shape, in local space, furthest along `direction`.
pub trait ConvexShape {
    fn support_local(&self, direction: Vector3<f32>) -> Vector3<f32>;
    fn local_aabb(&self) -> AxisAlignedBoundingBox;
}

/// The closed set of shapes a [`Collider`] can wrap. Kept as a tagged union
/// rather than a trait object because the narrow phase dispatches on shape
/// kind anyway (convex-convex GJK/EPA vs. concave part enumeration).
pub enum ColliderShape {
    Sphere(Sphere),
    Capsule(Capsule),
    ConvexPolyhedron(ConvexPolyhedron),
    Triangle(TriangleCollider),
    Terrain(TerrainCollider),
    Composite(CompositeCollider),
}

impl ColliderShape {
    pub fn is_concave(&self) -> bool {
        matches!(self, ColliderShape::Terrain(_) | ColliderShape::Composite(_))
    }

    pub fn local_aabb(&self) -> AxisAlignedBoundingBox {
        match self {
            ColliderShape::Sphere(s) => s.local_aabb(),
            ColliderShape::Capsule(c) => c.local_aabb(),
            ColliderShape::ConvexPolyhedron(c) => c.local_aabb(),
            ColliderShape::Triangle(t) => t.local_aabb(),
            ColliderShape::Terrain(t) => t.local_aabb(),
            ColliderShape::Composite(c) => c.local_aabb(),
        }
    }

    /// Support function in local space. Panics if called on a concave shape
    /// - concave shapes are never GJK/EPA participants directly, only their
    /// enumerated convex parts are.
    pub fn support_local(&self, direction: Vector3<f32>) -> Vector3<f32> {
        match self {
            ColliderShape::Sphere(s) => s.support_local(direction),
            ColliderShape::Capsule(c) => c.support_local(direction),
            ColliderShape::ConvexPolyhedron(c) => c.support_local(direction),
            ColliderShape::Triangle(t) => t.support_local(direction),
            ColliderShape::Terrain(_) | ColliderShape::Composite(_) => {
                panic!("concave shapes have no single support function")
            }
        }
    }
}

/// A collider bound to a world transform. Owns its shape and a dirty flag
/// so the broad phase only recomputes the world AABB when the transform
/// actually changed since the last tick.
pub struct Collider {
    pub shape: ColliderShape,
    transform: Matrix4<f32>,
    updated: bool,
    world_aabb: AxisAlignedBoundingBox,
}

impl Collider {
    pub fn new(shape: ColliderShape, transform: Matrix4<f32>) -> Self {
        let world_aabb = shape.local_aabb().transform(&transform);
        Self {
            shape,
            transform,
            updated: true,
            world_aabb,
        }
    }

    pub fn transform(&self) -> &Matrix4<f32> {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.transform = transform;
        self.updated = true;
        self.world_aabb = self.shape.local_aabb().transform(&self.transform);
    }

    pub fn world_aabb(&self) -> AxisAlignedBoundingBox {
        self.world_aabb
    }

    pub fn take_updated(&mut self) -> bool {
        std::mem::replace(&mut self.updated, false)
    }

    pub fn to_world(&self, local: Vector3<f32>) -> Vector3<f32> {
        self.transform.transform_point(&local.into()).coords
    }

    pub fn to_local(&self, world: Vector3<f32>) -> Vector3<f32> {
        self.transform
            .try_inverse()
            .map(|inv| inv.transform_point(&world.into()).coords)
            .unwrap_or(world)
    }

    /// Support point in world space for convex shapes: transform `direction`
    /// into local space, evaluate the local support function, then map the
    /// result back to world space.
    pub fn support_world(&self, direction: Vector3<f32>) -> Vector3<f32> {
        let inv = self.transform.try_inverse().unwrap_or(Matrix4::identity());
        let local_dir = inv.fixed_view::<3, 3>(0, 0).transpose() * direction;
        let local_point = self.shape.support_local(local_dir);
        self.to_world(local_point)
    }

    /// Enumerates the convex parts of a concave collider overlapping
    /// `world_aabb`, expressed as local-space point clouds in the part's own
    /// frame (so the narrow phase can run GJK/EPA on each part as if it were
    /// its own convex collider).
    pub fn enumerate_parts(&self, world_aabb: AxisAlignedBoundingBox) -> Vec<ConvexPolyhedron> {
        match &self.shape {
            ColliderShape::Terrain(terrain) => {
                let local_aabb = world_aabb.transform(&self.transform.try_inverse().unwrap_or(Matrix4::identity()));
                terrain.overlapping_parts(local_aabb)
            }
            ColliderShape::Composite(composite) => composite.parts().to_vec(),
            _ => Vec::new(),
        }
    }
}
