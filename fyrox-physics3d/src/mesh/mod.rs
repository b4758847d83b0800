//! Index-stable half-edge mesh, the common topology backbone for QuickHull and HACD.

pub mod half_edge;

pub use half_edge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
