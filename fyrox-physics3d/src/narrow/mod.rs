//! Narrow-phase convex intersection (GJK), penetration extraction (EPA),
//! and ray casting (GJK ray caster).

pub mod epa;
pub mod gjk;
pub mod raycast;

pub use epa::{epa, EpaResult};
pub use gjk::{gjk_intersect, GjkResult, SupportPoint};
pub use raycast::{gjk_raycast, RayCastHit};
