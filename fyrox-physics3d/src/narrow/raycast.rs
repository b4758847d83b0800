//! Ray-vs-convex hit test via iterative support-function advance (the
//! conservative-advancement GJK variant van den Bergen describes), grounded
//! on the source engine's `GJKRayCaster`.

use nalgebra::Vector3;

pub struct RayCastHit {
    pub distance: f32,
    pub point_local: Vector3<f32>,
    pub normal_local: Vector3<f32>,
}

/// Casts a ray (`origin`, `direction`, `direction` need not be unit length -
/// the hit `distance` is in multiples of `direction`, capped at 1.0) against
/// a convex shape given by its local-space support function.
pub fn gjk_raycast(
    origin: Vector3<f32>,
    direction: Vector3<f32>,
    support: impl Fn(Vector3<f32>) -> Vector3<f32>,
    epsilon: f32,
    max_iterations: usize,
) -> Option<RayCastHit> {
    let mut lambda = 0.0f32;
    let mut x = origin;
    let mut normal = Vector3::zeros();

    let mut v = x - support(-x);
    if v.norm_squared() < epsilon * epsilon {
        return Some(RayCastHit {
            distance: 0.0,
            point_local: x,
            normal_local: direction.try_normalize(f32::EPSILON).unwrap_or(Vector3::y()),
        });
    }

    for _ in 0..max_iterations {
        let p = support(-v);
        let w = x - p;
        let vw = v.dot(&w);

        if vw > epsilon * epsilon {
            let v_dot_dir = v.dot(&direction);
            if v_dot_dir >= 0.0 {
                return None;
            }
            lambda -= vw / v_dot_dir;
            if lambda > 1.0 {
                return None;
            }
            x = origin + direction * lambda;
            normal = v;
        }

        v = x - p;
        if v.norm_squared() < epsilon * epsilon {
            return Some(RayCastHit {
                distance: lambda,
                point_local: x,
                normal_local: normal.try_normalize(f32::EPSILON).unwrap_or(Vector3::y()),
            });
        }
    }

    None
}

#[cfg(test)]
mod test {
    use super::*;

    fn sphere_support(radius: f32) -> impl Fn(Vector3<f32>) -> Vector3<f32> {
        move |dir: Vector3<f32>| {
            dir.try_normalize(f32::EPSILON)
                .map(|n| n * radius)
                .unwrap_or_else(Vector3::zeros)
        }
    }

    #[test]
    fn ray_through_sphere_center_hits() {
        let origin = Vector3::new(-10.0, 0.0, 0.0);
        let direction = Vector3::new(1.0, 0.0, 0.0);
        let hit = gjk_raycast(origin, direction, sphere_support(2.0), 1e-3, 64);
        assert!(hit.is_some());
    }

    #[test]
    fn ray_missing_sphere_reports_no_hit() {
        let origin = Vector3::new(-10.0, 10.0, 0.0);
        let direction = Vector3::new(1.0, 0.0, 0.0);
        let hit = gjk_raycast(origin, direction, sphere_support(2.0), 1e-3, 64);
        assert!(hit.is_none());
    }
}
