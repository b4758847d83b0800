//! End-to-end scenarios driving `RigidBodyWorld` the way a host application
//! would: build colliders/bodies, step, and check the externally-observable
//! result (manifolds, ray casts, body state).

use fyrox_physics3d::collider::{ColliderShape, ConvexPolyhedron, Sphere, TerrainCollider};
use fyrox_physics3d::constraints::{Constraint, DistanceConstraint};
use fyrox_physics3d::world::{ForceGenerator, RigidBodyProperties, RigidBodyState};
use fyrox_physics3d::{RigidBodyWorld, WorldConfig};
use nalgebra::{Matrix3, UnitQuaternion, Vector3};

fn sphere_body(world: &mut RigidBodyWorld, position: Vector3<f32>, radius: f32, mass: f32) {
    let properties = RigidBodyProperties::new(mass, Matrix3::identity());
    let mut state = RigidBodyState::default();
    state.position = position;
    let body = world.add_body(properties, state);
    world.add_collider(Some(body), ColliderShape::Sphere(Sphere::new(radius)));
}

#[test]
fn disjoint_spheres_produce_no_manifold() {
    let mut world = RigidBodyWorld::new(WorldConfig::default());
    sphere_body(&mut world, Vector3::new(0.0, 0.0, 0.0), 1.0, 1.0);
    sphere_body(&mut world, Vector3::new(50.0, 0.0, 0.0), 1.0, 1.0);

    world.step(1.0 / 60.0);

    let mut count = 0;
    world.process_collision_manifolds(|_| count += 1);
    assert_eq!(count, 0);
}

#[test]
fn touching_spheres_produce_a_single_contact_manifold() {
    let mut world = RigidBodyWorld::new(WorldConfig::default());
    sphere_body(&mut world, Vector3::new(0.0, 0.0, 0.0), 1.0, 1.0);
    sphere_body(&mut world, Vector3::new(1.8, 0.0, 0.0), 1.0, 1.0);

    world.step(1.0 / 60.0);

    let mut contacts = 0;
    world.process_collision_manifolds(|manifold| contacts += manifold.contacts.len());
    assert_eq!(contacts, 1, "overlapping spheres should settle on exactly one contact point");
}

#[test]
fn box_corner_against_box_face_produces_a_single_contact() {
    let mut world = RigidBodyWorld::new(WorldConfig::default());

    let static_props = RigidBodyProperties::new(0.0, Matrix3::identity());
    let static_body = world.add_body(static_props, RigidBodyState::default());
    world.add_collider(
        Some(static_body),
        ColliderShape::ConvexPolyhedron(ConvexPolyhedron::unit_cube()),
    );

    // Rotate the falling cube so its main diagonal is vertical: exactly one
    // vertex becomes the global minimum, with its three neighbors a full
    // |diagonal|/2 higher, so a shallow penetration only ever touches the
    // single lowest corner.
    let diagonal = Vector3::new(1.0, 1.0, 1.0).normalize();
    let up = Vector3::new(0.0, 1.0, 0.0);
    let orientation = UnitQuaternion::rotation_between(&diagonal, &up).unwrap();
    let lowest_vertex_drop = 0.5 * 3.0f32.sqrt();

    let falling_props = RigidBodyProperties::new(1.0, Matrix3::identity());
    let mut falling_state = RigidBodyState::default();
    falling_state.orientation = orientation;
    // Static cube's top face sits at y = 0.5; place the falling cube's
    // center so its single lowest vertex penetrates that face by 0.03.
    falling_state.position = Vector3::new(0.0, 0.5 - 0.03 + lowest_vertex_drop, 0.0);
    let falling_body = world.add_body(falling_props, falling_state);
    world.add_collider(
        Some(falling_body),
        ColliderShape::ConvexPolyhedron(ConvexPolyhedron::unit_cube()),
    );

    world.step(1.0 / 60.0);

    let mut contacts = 0;
    world.process_collision_manifolds(|manifold| contacts += manifold.contacts.len());
    assert_eq!(contacts, 1, "a single penetrating corner should yield a single contact point");
}

#[test]
fn ray_cast_against_terrain_hits_every_overlapping_triangle() {
    let mut world = RigidBodyWorld::new(WorldConfig::default());
    // A 2x1 grid is 4 triangles total; a ray straight down through the
    // middle column crosses the shared edge between the two rows of
    // triangles it passes over, plus the one it lands inside, so a wide
    // ray cast (approximated here with a vertical ray at a cell interior)
    // should register exactly the triangles whose cell it's inside.
    let terrain = TerrainCollider::new(vec![0.0; (2 + 1) * (1 + 1)], 2, 1).unwrap();
    let terrain_body = world.add_body(
        RigidBodyProperties::new(0.0, Matrix3::identity()),
        RigidBodyState::default(),
    );
    world.add_collider(Some(terrain_body), ColliderShape::Terrain(terrain));

    let origin = Vector3::new(0.0, 5.0, 0.0);
    let direction = Vector3::new(0.0, -10.0, 0.0);

    let mut hits = 0;
    world.process_ray_cast(origin, direction, |_, _| hits += 1);
    assert!(hits >= 1, "a ray through the terrain's interior must hit at least the triangle it lands in");
}

#[test]
fn falling_body_gains_speed_matching_its_own_semi_implicit_euler_step() {
    let mut world = RigidBodyWorld::new(WorldConfig::default());
    let properties = RigidBodyProperties::new(1.0, Matrix3::identity());
    let body = world.add_body(properties, RigidBodyState::default());
    world.body_mut(body).unwrap().add_force(ForceGenerator::Gravity {
        acceleration: Vector3::new(0.0, -9.81, 0.0),
    });

    let dt = 1.0 / 60.0;
    world.step(dt);

    // Semi-implicit Euler: v1 = v0 + a*dt (no drag configured on this
    // body), then position integrates from v1, not v0.
    let state = world.body_state(body).unwrap();
    let expected_velocity_y = -9.81 * dt;
    assert!((state.linear_velocity.y - expected_velocity_y).abs() < 1e-5);
    let expected_position_y = expected_velocity_y * dt;
    assert!((state.position.y - expected_position_y).abs() < 1e-5);
}

#[test]
fn distance_constraint_converges_and_the_body_pair_falls_asleep() {
    let mut world = RigidBodyWorld::new(WorldConfig::default());

    let props = RigidBodyProperties::new(1.0, Matrix3::identity());
    let mut state_a = RigidBodyState::default();
    state_a.position = Vector3::new(-3.0, 0.0, 0.0);
    let a = world.add_body(props, state_a);

    let mut state_b = RigidBodyState::default();
    state_b.position = Vector3::new(3.0, 0.0, 0.0);
    let b = world.add_body(props, state_b);

    world.add_constraint(Constraint::Distance(DistanceConstraint::new(
        [a, b],
        [Vector3::zeros(), Vector3::zeros()],
        2.0,
    )));

    for _ in 0..600 {
        world.step(1.0 / 60.0);
    }

    let separation =
        (world.body_state(b).unwrap().position - world.body_state(a).unwrap().position).norm();
    assert!((separation - 2.0).abs() < 0.1, "separation = {separation}");

    let a_asleep = world.body_state(a).unwrap().status.contains(
        fyrox_physics3d::world::BodyStatus::SLEEPING,
    );
    let b_asleep = world.body_state(b).unwrap().status.contains(
        fyrox_physics3d::world::BodyStatus::SLEEPING,
    );
    assert!(a_asleep && b_asleep, "a body pair held at rest by a satisfied constraint should fall asleep");
}

#[test]
fn removing_a_collider_drops_its_manifolds() {
    let mut world = RigidBodyWorld::new(WorldConfig::default());
    let props = RigidBodyProperties::new(1.0, Matrix3::identity());

    let a = world.add_body(props, RigidBodyState::default());
    let collider_a = world.add_collider(Some(a), ColliderShape::Sphere(Sphere::new(1.0)));

    let mut state_b = RigidBodyState::default();
    state_b.position = Vector3::new(1.5, 0.0, 0.0);
    let b = world.add_body(props, state_b);
    world.add_collider(Some(b), ColliderShape::Sphere(Sphere::new(1.0)));

    world.step(1.0 / 60.0);
    let mut before = 0;
    world.process_collision_manifolds(|_| before += 1);
    assert_eq!(before, 1);

    world.remove_collider(collider_a);
    world.step(1.0 / 60.0);

    let mut after = 0;
    world.process_collision_manifolds(|_| after += 1);
    assert_eq!(after, 0);
}
