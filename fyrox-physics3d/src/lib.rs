//! 3D rigid-body collision and constraint engine: half-edge mesh topology,
//! QuickHull and HACD convex decomposition, GJK/EPA narrow phase, a
//! persistent contact manifold cache, and a PGS impulse solver driving a
//! semi-implicit Euler integrator. See [`RigidBodyWorld`] for the crate's
//! entry point.

pub mod broad;
pub mod collider;
pub mod config;
pub mod constraints;
pub mod error;
pub mod hacd;
pub mod manifold;
pub mod mesh;
pub mod narrow;
pub mod quickhull;
pub mod world;

pub use config::WorldConfig;
pub use error::PhysicsError;
pub use world::RigidBodyWorld;
