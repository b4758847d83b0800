//! RigidBody properties, state, force generators and the per-body
//! semi-implicit Euler integrator. Grounded on the distilled spec's
//! RigidBody data model plus the source engine's `RigidBody`/
//! `RigidBodyDynamics`/force-generator split (`sombra-engine/src/se/physics`).

use nalgebra::{Matrix3, Matrix4, UnitQuaternion, Vector3};

bitflags::bitflags! {
    /// Mirrors the source engine's `RigidBodyState::Status` bitset.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BodyStatus: u8 {
        const SLEEPING = 1 << 0;
        const INTEGRATED = 1 << 1;
        const CONSTRAINTS_SOLVED = 1 << 2;
        const UPDATED_BY_USER = 1 << 3;
    }
}

/// Constant attributes of a body that don't change tick to tick.
#[derive(Clone, Copy, Debug)]
pub struct RigidBodyProperties {
    pub inv_mass: f32,
    pub inv_inertia_body: Matrix3<f32>,
    /// Per-second velocity retention (`v *= drag.powf(dt)`): `1.0` decays
    /// nothing, smaller values bleed off velocity exponentially.
    pub linear_drag: f32,
    pub angular_drag: f32,
    pub sleep_motion: f32,
}

impl RigidBodyProperties {
    /// `mass <= 0.0` produces an immovable, infinite-mass body (`inv_mass ==
    /// 0.0`), matching the source engine's convention for static geometry.
    pub fn new(mass: f32, inertia_body: Matrix3<f32>) -> Self {
        let inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        let inv_inertia_body = if mass > 0.0 {
            inertia_body.try_inverse().unwrap_or_else(Matrix3::zeros)
        } else {
            Matrix3::zeros()
        };
        Self {
            inv_mass,
            inv_inertia_body,
            // 1.0 == no decay (`drag.powf(dt) == 1`); smaller values decay
            // velocity exponentially per second.
            linear_drag: 1.0,
            angular_drag: 1.0,
            sleep_motion: 0.5,
        }
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }
}

/// Everything that changes as the body moves through a tick.
#[derive(Clone, Debug)]
pub struct RigidBodyState {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
    pub linear_velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub linear_acceleration: Vector3<f32>,
    pub angular_acceleration: Vector3<f32>,
    pub force_sum: Vector3<f32>,
    pub torque_sum: Vector3<f32>,
    pub world_inverse_inertia: Matrix3<f32>,
    pub transform: Matrix4<f32>,
    pub motion: f32,
    pub status: BodyStatus,
}

impl Default for RigidBodyState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            linear_acceleration: Vector3::zeros(),
            angular_acceleration: Vector3::zeros(),
            force_sum: Vector3::zeros(),
            torque_sum: Vector3::zeros(),
            world_inverse_inertia: Matrix3::identity(),
            transform: Matrix4::identity(),
            motion: 0.0,
            status: BodyStatus::UPDATED_BY_USER,
        }
    }
}

/// Closed set of force generators a body can carry, replacing the source
/// engine's small virtual-inheritance hierarchy (`Force`, `DirectionalForce`,
/// `PunctualForce`) with a tagged union.
#[derive(Clone, Copy, Debug)]
pub enum ForceGenerator {
    Gravity { acceleration: Vector3<f32> },
    Directional { force: Vector3<f32> },
    Punctual { force: Vector3<f32>, local_point: Vector3<f32> },
}

pub struct RigidBody {
    pub properties: RigidBodyProperties,
    pub state: RigidBodyState,
    pub forces: Vec<ForceGenerator>,
}

impl RigidBody {
    pub fn new(properties: RigidBodyProperties, state: RigidBodyState) -> Self {
        let mut body = Self {
            properties,
            state,
            forces: Vec::new(),
        };
        body.update_world_inverse_inertia();
        body.update_transform();
        body
    }

    pub fn add_force(&mut self, force: ForceGenerator) {
        self.forces.push(force);
    }

    /// Step (b): evaluate every generator into `forceSum`/`torqueSum`.
    pub fn apply_forces(&mut self) {
        self.state.force_sum = Vector3::zeros();
        self.state.torque_sum = Vector3::zeros();
        if self.properties.is_static() || self.state.status.contains(BodyStatus::SLEEPING) {
            return;
        }
        for force in &self.forces {
            match *force {
                ForceGenerator::Gravity { acceleration } => {
                    self.state.force_sum += acceleration * (1.0 / self.properties.inv_mass);
                }
                ForceGenerator::Directional { force } => {
                    self.state.force_sum += force;
                }
                ForceGenerator::Punctual { force, local_point } => {
                    self.state.force_sum += force;
                    let r = self.state.orientation * local_point;
                    self.state.torque_sum += r.cross(&force);
                }
            }
        }
    }

    /// Step (c): semi-implicit Euler velocity update with linear/angular drag.
    pub fn integrate_velocity(&mut self, dt: f32) {
        if self.properties.is_static() || self.state.status.contains(BodyStatus::SLEEPING) {
            return;
        }
        self.state.linear_acceleration = self.state.force_sum * self.properties.inv_mass;
        self.state.angular_acceleration = self.state.world_inverse_inertia * self.state.torque_sum;

        self.state.linear_velocity += self.state.linear_acceleration * dt;
        self.state.angular_velocity += self.state.angular_acceleration * dt;

        self.state.linear_velocity *= self.properties.linear_drag.powf(dt);
        self.state.angular_velocity *= self.properties.angular_drag.powf(dt);

        self.state.status.insert(BodyStatus::INTEGRATED);
    }

    /// Step (h): semi-implicit Euler position/orientation update, quaternion
    /// renormalized every step per the position-data invariant.
    pub fn integrate_position(&mut self, dt: f32) {
        if self.properties.is_static() || self.state.status.contains(BodyStatus::SLEEPING) {
            return;
        }
        self.state.position += self.state.linear_velocity * dt;

        let w = self.state.angular_velocity;
        let spin = nalgebra::Quaternion::new(0.0, w.x, w.y, w.z) * self.state.orientation.into_inner();
        let updated = self.state.orientation.into_inner() + spin * (0.5 * dt);
        self.state.orientation = UnitQuaternion::new_normalize(updated);

        self.update_world_inverse_inertia();
        self.update_transform();
    }

    fn update_world_inverse_inertia(&mut self) {
        let r = self.state.orientation.to_rotation_matrix().into_inner();
        self.state.world_inverse_inertia = r * self.properties.inv_inertia_body * r.transpose();
    }

    fn update_transform(&mut self) {
        let mut transform = self.state.orientation.to_homogeneous();
        transform.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.state.position);
        self.state.transform = transform;
    }

    /// Step (i): recency-weighted motion metric and sleep-state transition.
    /// `bias` close to 1 makes the metric slow to react (a body must stay
    /// quiet for longer before it's allowed to sleep).
    pub fn update_motion(&mut self, bias: f32, sleep_epsilon: f32) {
        if self.properties.is_static() {
            return;
        }
        let instant_motion =
            self.state.linear_velocity.norm_squared() + self.state.angular_velocity.norm_squared();
        self.state.motion = bias * self.state.motion + (1.0 - bias) * instant_motion;

        if self.state.motion < self.properties.sleep_motion.max(sleep_epsilon) {
            self.state.status.insert(BodyStatus::SLEEPING);
            self.state.linear_velocity = Vector3::zeros();
            self.state.angular_velocity = Vector3::zeros();
        } else {
            self.state.status.remove(BodyStatus::SLEEPING);
        }
        self.state.status.remove(BodyStatus::UPDATED_BY_USER);
    }

    pub fn world_anchor(&self, local_point: Vector3<f32>) -> Vector3<f32> {
        self.state.position + self.state.orientation * local_point
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn static_body_never_integrates() {
        let props = RigidBodyProperties::new(0.0, Matrix3::identity());
        let mut state = RigidBodyState::default();
        state.linear_velocity = Vector3::new(1.0, 0.0, 0.0);
        let mut body = RigidBody::new(props, state);
        body.integrate_velocity(1.0 / 60.0);
        body.integrate_position(1.0 / 60.0);
        assert_eq!(body.state.position, Vector3::zeros());
    }

    #[test]
    fn falling_body_picks_up_speed_from_gravity() {
        let props = RigidBodyProperties::new(1.0, Matrix3::identity());
        let mut body = RigidBody::new(props, RigidBodyState::default());
        body.add_force(ForceGenerator::Gravity {
            acceleration: Vector3::new(0.0, -9.81, 0.0),
        });
        body.apply_forces();
        body.integrate_velocity(1.0 / 60.0);
        assert!(body.state.linear_velocity.y < 0.0);
    }

    #[test]
    fn resting_body_falls_asleep() {
        let props = RigidBodyProperties::new(1.0, Matrix3::identity());
        let mut body = RigidBody::new(props, RigidBodyState::default());
        body.update_motion(0.2, 0.01);
        assert!(body.state.status.contains(BodyStatus::SLEEPING));
    }
}
