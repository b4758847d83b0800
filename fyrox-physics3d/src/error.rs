//! In-band error type for the handful of externally-facing operations that
//! can fail for reasons the caller must react to. Everything else either
//! can't fail (preconditions enforced at the type level) or fails by
//! returning a sentinel `Handle::NONE`, matching the source engine's own
//! plain, non-exception error style.

use crate::collider::Collider;
use crate::constraints::Constraint;
use crate::world::RigidBody;
use fyrox_core::pool::Handle;
use std::fmt;

#[derive(Debug)]
pub enum PhysicsError {
    UnknownBody(Handle<RigidBody>),
    UnknownCollider(Handle<Collider>),
    UnknownConstraint(Handle<Constraint>),
    DimensionMismatch { expected: usize, got: usize },
    ManifoldLimitReached,
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::UnknownBody(h) => write!(f, "no rigid body at handle {h}"),
            PhysicsError::UnknownCollider(h) => write!(f, "no collider at handle {h}"),
            PhysicsError::UnknownConstraint(h) => write!(f, "no constraint at handle {h}"),
            PhysicsError::DimensionMismatch { expected, got } => {
                write!(f, "expected {expected} elements, got {got}")
            }
            PhysicsError::ManifoldLimitReached => write!(f, "manifold limit reached"),
        }
    }
}

impl std::error::Error for PhysicsError {}
