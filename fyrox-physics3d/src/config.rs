//! World-wide tunables, grounded on the source engine's
//! `CollisionWorldData`/physics-world construction parameters.

/// Mirrors the source engine's `CollisionWorldData` plus the constraint
/// solver and integrator knobs the distillation folded into "properties".
#[derive(Clone, Copy, Debug)]
pub struct WorldConfig {
    /// Baumgarte stabilization factor applied to contact/constraint bias.
    pub baumgarte_bias: f32,
    /// Recency-weighted blend factor for the per-body sleep motion metric
    /// (`motion = motion_bias * old + (1 - motion_bias) * instant`); closer
    /// to 1 makes a body slower to fall asleep.
    pub motion_bias: f32,
    /// Motion metric below which a body is eligible to fall asleep.
    pub sleep_epsilon: f32,
    /// Isotropic Coulomb friction coefficient shared by every contact; each
    /// persisted contact gets two tangent constraints bounded by
    /// `[-friction_coefficient * lambda_n, friction_coefficient * lambda_n]`.
    pub friction_coefficient: f32,
    /// AABB inflation applied by the broad phase.
    pub coarse_epsilon: f32,
    /// Minimum separation between two manifold contacts.
    pub contact_separation: f32,
    /// Distance tolerance used when reprojecting stale manifold contacts.
    pub contact_precision: f32,
    /// Distance tolerance used by the GJK ray caster's termination test.
    pub raycast_precision: f32,
    /// EPA termination tolerance on the supporting-plane distance.
    pub min_f_difference: f32,
    pub max_epa_iterations: usize,
    pub max_ray_iterations: usize,
    pub max_solver_iterations: usize,
    pub max_manifolds: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            baumgarte_bias: 0.2,
            motion_bias: 0.9,
            sleep_epsilon: 0.01,
            friction_coefficient: 0.5,
            coarse_epsilon: 0.05,
            contact_separation: 1e-3,
            contact_precision: 1e-3,
            raycast_precision: 1e-3,
            min_f_difference: 1e-3,
            max_epa_iterations: 64,
            max_ray_iterations: 64,
            max_solver_iterations: 10,
            max_manifolds: 4096,
        }
    }
}
