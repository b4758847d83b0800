//! Owns colliders and contact manifolds, one layer below `RigidBodyWorld`,
//! grounded on `sombra-engine/include/se/collision/CollisionWorld.h` - the
//! original keeps this responsibility separate from body/constraint
//! bookkeeping, which this workspace mirrors.

use crate::broad;
use crate::collider::Collider;
use crate::config::WorldConfig;
use crate::manifold::{self, Manifold};
use crate::narrow::raycast::{gjk_raycast, RayCastHit};
use fyrox_core::log::Log;
use fyrox_core::pool::{Handle, Pool};
use nalgebra::Vector3;

fn pair_key(a: Handle<Collider>, b: Handle<Collider>) -> (Handle<Collider>, Handle<Collider>) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

pub struct CollisionWorld {
    colliders: Pool<Collider>,
    manifolds: fxhash::FxHashMap<(Handle<Collider>, Handle<Collider>), Manifold>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self {
            colliders: Pool::new(),
            manifolds: fxhash::FxHashMap::default(),
        }
    }

    pub fn add_collider(&mut self, collider: Collider) -> Handle<Collider> {
        self.colliders.spawn(collider)
    }

    pub fn remove_collider(&mut self, handle: Handle<Collider>) {
        if self.colliders.try_borrow(handle).is_none() {
            return;
        }
        self.colliders.free(handle);
        self.manifolds.retain(|pair, _| pair.0 != handle && pair.1 != handle);
    }

    pub fn collider(&self, handle: Handle<Collider>) -> Option<&Collider> {
        self.colliders.try_borrow(handle)
    }

    pub fn collider_mut(&mut self, handle: Handle<Collider>) -> Option<&mut Collider> {
        self.colliders.try_borrow_mut(handle)
    }

    pub fn colliders(&self) -> &Pool<Collider> {
        &self.colliders
    }

    /// Step (e) of the world tick: broad phase, fine detection and manifold
    /// bookkeeping. Manifolds that stopped intersecting are dropped at the
    /// tick boundary; resource exhaustion (`max_manifolds`) drops the new
    /// pair and logs rather than failing the tick.
    pub fn update(&mut self, config: &WorldConfig) {
        // Step 5: clear Intersecting/Updated at tick start so a manifold
        // whose pair drops out of the broad phase this tick is revisited by
        // the retain below instead of being kept forever.
        for manifold in self.manifolds.values_mut() {
            manifold.intersecting = false;
            manifold.updated = false;
        }

        let pairs = broad::candidate_pairs(&self.colliders, config.coarse_epsilon);

        for (a, b) in pairs {
            let key = pair_key(a, b);
            let collider_a = self.colliders.borrow(key.0);
            let collider_b = self.colliders.borrow(key.1);
            let contacts = manifold::detect_contacts(collider_a, collider_b, config);

            if !self.manifolds.contains_key(&key) {
                if contacts.is_empty() {
                    continue;
                }
                if self.manifolds.len() >= config.max_manifolds {
                    Log::warn("manifold limit reached, dropping new contact pair");
                    continue;
                }
            }

            let transform_a = *collider_a.transform();
            let transform_b = *collider_b.transform();
            let manifold = self
                .manifolds
                .entry(key)
                .or_insert_with(|| Manifold::new_pair(key));
            manifold::update_manifold(manifold, &transform_a, &transform_b, contacts, config);
        }

        self.manifolds.retain(|_, m| {
            let keep = m.intersecting;
            if !keep {
                Log::info("contact manifold destroyed at tick boundary");
            }
            keep
        });
    }

    /// Step (j): publish manifolds updated this tick and currently
    /// intersecting.
    pub fn process_collision_manifolds(&self, mut callback: impl FnMut(&Manifold)) {
        for manifold in self.manifolds.values() {
            if manifold.updated && manifold.intersecting {
                callback(manifold);
            }
        }
    }

    pub fn manifolds(&self) -> impl Iterator<Item = &Manifold> {
        self.manifolds.values()
    }

    pub fn manifold_mut(
        &mut self,
        pair: (Handle<Collider>, Handle<Collider>),
    ) -> Option<&mut Manifold> {
        self.manifolds.get_mut(&pair_key(pair.0, pair.1))
    }

    pub fn process_ray_cast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        config: &WorldConfig,
        mut callback: impl FnMut(&Collider, &RayCastHit),
    ) {
        for (_, collider) in self.colliders.pair_iter() {
            let local_origin = collider.to_local(origin);
            let local_dir = collider.to_local(origin + direction) - local_origin;

            if collider.shape.is_concave() {
                for part in collider.enumerate_parts(collider.world_aabb()) {
                    if let Some(hit) = gjk_raycast(
                        local_origin,
                        local_dir,
                        |dir| crate::collider::ConvexShape::support_local(&part, dir),
                        config.raycast_precision,
                        config.max_ray_iterations,
                    ) {
                        callback(collider, &hit);
                    }
                }
            } else if let Some(hit) = gjk_raycast(
                local_origin,
                local_dir,
                |dir| collider.shape.support_local(dir),
                config.raycast_precision,
                config.max_ray_iterations,
            ) {
                callback(collider, &hit);
            }
        }
    }
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}
