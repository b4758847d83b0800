//! Expanding Polytope Algorithm: grows a GJK terminal simplex into a convex
//! polytope around the origin to extract penetration depth, normal, and
//! witness points.

use super::gjk::SupportPoint;
use arrayvec::ArrayVec;
use fyrox_math::{barycentric_is_inside, barycentric_to_world, get_barycentric_coords};
use nalgebra::Vector3;

pub struct EpaResult {
    pub penetration: f32,
    /// Points from shape A toward shape B.
    pub normal: Vector3<f32>,
    pub point_on_a: Vector3<f32>,
    pub point_on_b: Vector3<f32>,
    pub converged: bool,
}

#[derive(Clone, Copy)]
struct PolytopeFace {
    indices: [usize; 3],
    normal: Vector3<f32>,
    distance: f32,
}

fn face_from(points: &[SupportPoint], indices: [usize; 3]) -> Option<PolytopeFace> {
    let a = points[indices[0]].minkowski;
    let b = points[indices[1]].minkowski;
    let c = points[indices[2]].minkowski;
    let normal = (b - a).cross(&(c - a)).try_normalize(f32::EPSILON)?;
    let distance = normal.dot(&a);
    let (normal, distance) = if distance < 0.0 {
        (-normal, -distance)
    } else {
        (normal, distance)
    };
    Some(PolytopeFace {
        indices,
        normal,
        distance,
    })
}

/// Expands `simplex` (a GJK terminal tetrahedron) until the closest polytope
/// face to the origin stops changing within `min_f_difference`, or
/// `max_iterations` is hit.
pub fn epa(
    support_a: impl Fn(Vector3<f32>) -> Vector3<f32>,
    support_b: impl Fn(Vector3<f32>) -> Vector3<f32>,
    simplex: ArrayVec<SupportPoint, 4>,
    min_f_difference: f32,
    max_iterations: usize,
) -> Option<EpaResult> {
    if simplex.len() < 4 {
        return None;
    }

    let mut points: Vec<SupportPoint> = simplex.into_iter().collect();
    let mut faces: Vec<PolytopeFace> = [[0, 1, 2], [0, 3, 1], [1, 3, 2], [2, 3, 0]]
        .into_iter()
        .filter_map(|idx| face_from(&points, idx))
        .collect();

    let mut last_distance = f32::MAX;
    let mut converged = false;

    for _ in 0..max_iterations {
        let Some(closest) = faces
            .iter()
            .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap())
            .copied()
        else {
            break;
        };

        let new_point = {
            let on_a = support_a(closest.normal);
            let on_b = support_b(-closest.normal);
            SupportPoint {
                minkowski: on_a - on_b,
                on_a,
                on_b,
            }
        };
        let new_distance = closest.normal.dot(&new_point.minkowski);

        if (new_distance - closest.distance).abs() < min_f_difference
            || (last_distance - new_distance).abs() < min_f_difference
        {
            converged = true;
            break;
        }
        last_distance = new_distance;

        // Expand: remove every face the new point can see, then re-triangulate
        // the resulting hole with the new point as apex.
        let eye = new_point.minkowski;
        let mut visible = Vec::new();
        let mut kept = Vec::new();
        for face in &faces {
            if face.normal.dot(&(eye - points[face.indices[0]].minkowski)) > 1e-6 {
                visible.push(*face);
            } else {
                kept.push(*face);
            }
        }
        if visible.is_empty() {
            converged = true;
            break;
        }

        let mut edge_count: fxhash::FxHashMap<(usize, usize), i32> = fxhash::FxHashMap::default();
        for face in &visible {
            for (i, j) in [
                (face.indices[0], face.indices[1]),
                (face.indices[1], face.indices[2]),
                (face.indices[2], face.indices[0]),
            ] {
                *edge_count.entry((i, j)).or_insert(0) += 1;
                *edge_count.entry((j, i)).or_insert(0) -= 1;
            }
        }

        points.push(new_point);
        let new_index = points.len() - 1;

        let mut new_faces = kept;
        for (&(i, j), &count) in edge_count.iter() {
            if count > 0 {
                if let Some(face) = face_from(&points, [i, j, new_index]) {
                    new_faces.push(face);
                }
            }
        }
        faces = new_faces;
    }

    let best = faces
        .iter()
        .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap())?;

    let pa = points[best.indices[0]].on_a;
    let pb = points[best.indices[1]].on_a;
    let pc = points[best.indices[2]].on_a;
    let qa = points[best.indices[0]].on_b;
    let qb = points[best.indices[1]].on_b;
    let qc = points[best.indices[2]].on_b;

    let origin_on_face = best.normal * best.distance;
    let bary = get_barycentric_coords(&origin_on_face, &points[best.indices[0]].minkowski, &points[best.indices[1]].minkowski, &points[best.indices[2]].minkowski);
    let bary = if barycentric_is_inside(bary) {
        bary
    } else {
        (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)
    };

    Some(EpaResult {
        penetration: best.distance,
        normal: best.normal,
        point_on_a: barycentric_to_world(bary, pa, pb, pc),
        point_on_b: barycentric_to_world(bary, qa, qb, qc),
        converged,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::narrow::gjk::{gjk_intersect, GjkResult};

    fn sphere_support(center: Vector3<f32>, radius: f32) -> impl Fn(Vector3<f32>) -> Vector3<f32> {
        move |dir: Vector3<f32>| {
            center
                + dir
                    .try_normalize(f32::EPSILON)
                    .map(|n| n * radius)
                    .unwrap_or_else(Vector3::zeros)
        }
    }

    #[test]
    fn penetration_is_non_negative_for_overlapping_spheres() {
        let a = sphere_support(Vector3::new(0.0, 0.0, 0.0), 5.2);
        let b = sphere_support(Vector3::new(2.0, 0.0, 0.0), 5.2);
        let GjkResult::Intersecting(simplex) = gjk_intersect(&a, &b, 32) else {
            panic!("expected intersection");
        };
        let result = epa(&a, &b, simplex, 1e-3, 64).expect("epa should converge");
        assert!(result.penetration >= 0.0);
    }
}
