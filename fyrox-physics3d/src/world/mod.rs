//! World-level orchestration: the collision world (colliders + manifolds +
//! ray casting) and the rigid-body world that drives bodies, the collision
//! pipeline and the constraint manager through one fixed tick order.

pub mod body_world;
pub mod collision_world;
pub mod rigid_body;

pub use body_world::RigidBodyWorld;
pub use collision_world::CollisionWorld;
pub use rigid_body::{BodyStatus, ForceGenerator, RigidBody, RigidBodyProperties, RigidBodyState};
