//! 3D convex hull construction (QuickHull) producing a [`HalfEdgeMesh`].

use crate::mesh::{Face, HalfEdgeMesh, Vertex};
use fyrox_core::pool::Handle;
use fyrox_math::aabb::AxisAlignedBoundingBox;
use nalgebra::Vector3;

/// Builds the convex hull of `points`. Returns `None` if the points are
/// degenerate (coincident, collinear, or coplanar with fewer than 3
/// non-collinear points - the planar case is handled by triangulating the
/// 2D hull directly rather than failing outright).
pub fn quickhull(points: &[Vector3<f32>]) -> Option<HalfEdgeMesh> {
    if points.len() < 3 {
        return None;
    }

    let aabb = AxisAlignedBoundingBox::from_points(points);
    let diagonal = (aabb.max - aabb.min).norm();
    if diagonal <= f32::EPSILON {
        return None;
    }
    let epsilon = diagonal * 1e-4;

    let mut mesh = HalfEdgeMesh::new();

    let (simplex_idx, degenerate_to_2d) = initial_simplex(points, epsilon)?;
    if degenerate_to_2d {
        return planar_hull(points, epsilon);
    }

    let handles: Vec<_> = simplex_idx
        .iter()
        .map(|&i| mesh.add_vertex(points[i]))
        .collect();

    // Orient the four faces of the tetrahedron outward.
    let centroid = (points[simplex_idx[0]]
        + points[simplex_idx[1]]
        + points[simplex_idx[2]]
        + points[simplex_idx[3]])
        / 4.0;
    let face_loops = [
        [handles[0], handles[1], handles[2]],
        [handles[0], handles[3], handles[1]],
        [handles[1], handles[3], handles[2]],
        [handles[2], handles[3], handles[0]],
    ];
    let mut faces = Vec::new();
    for loop_ in face_loops {
        let oriented = orient_outward(&mesh, &loop_, centroid);
        let face = mesh.add_face(&oriented);
        faces.push(face);
    }

    // Outside-point sets per face.
    let mut outside: Vec<Vec<usize>> = vec![Vec::new(); faces.len()];
    for (i, point) in points.iter().enumerate() {
        if simplex_idx.contains(&i) {
            continue;
        }
        if let Some((face_slot, _dist)) = furthest_outside_face(&mesh, &faces, *point, epsilon, None) {
            outside[face_slot].push(i);
        }
    }

    let mut frontier: Vec<usize> = (0..faces.len())
        .filter(|&i| !outside[i].is_empty())
        .collect();

    while let Some(face_slot) = frontier.pop() {
        if faces[face_slot].is_none() || outside[face_slot].is_empty() {
            continue;
        }
        let face = faces[face_slot];
        let candidates = std::mem::take(&mut outside[face_slot]);
        let normal = match mesh.face_normal(face) {
            Some(n) => n,
            None => continue,
        };
        let anchor = mesh.position(mesh.face_loop(face)[0]);
        let apex_point_idx = candidates
            .iter()
            .copied()
            .max_by(|&a, &b| {
                let da = normal.dot(&(points[a] - anchor));
                let db = normal.dot(&(points[b] - anchor));
                da.partial_cmp(&db).unwrap()
            })
            .unwrap();
        let apex = points[apex_point_idx];

        let horizon = mesh.horizon(apex, face, epsilon);
        if horizon.is_empty() {
            continue;
        }

        // Every face visible from `apex` owns one or more horizon edges on
        // its inside; recover them that way rather than re-flooding.
        let mut inside_faces = std::collections::HashSet::new();
        for &edge_handle in &horizon {
            inside_faces.insert(mesh.edge(edge_handle).face);
        }

        let mut pooled_points = candidates;
        for (slot, f) in faces.iter().enumerate() {
            if inside_faces.contains(f) {
                pooled_points.append(&mut outside[slot]);
            }
        }

        for f in &inside_faces {
            mesh.remove_face(*f);
        }
        for slot in faces.iter_mut() {
            if inside_faces.contains(slot) {
                *slot = Handle::NONE;
            }
        }

        let apex_vertex = mesh.add_vertex(apex);
        let mut new_faces = Vec::new();
        for &edge_handle in &horizon {
            let origin = mesh.edge(mesh.edge(edge_handle).opposite).destination;
            let dest = mesh.edge(edge_handle).destination;
            let new_face = mesh.add_face(&[origin, dest, apex_vertex]);
            if new_face.is_some() {
                new_faces.push(new_face);
                faces.push(new_face);
                outside.push(Vec::new());
            }
        }

        for point_idx in pooled_points {
            if let Some((slot, _)) =
                furthest_outside_face(&mesh, &faces, points[point_idx], epsilon, Some(&new_faces))
            {
                outside[slot].push(point_idx);
                frontier.push(slot);
            }
        }

        merge_coplanar_neighbors(&mut mesh, &new_faces, epsilon);
    }

    Some(mesh)
}

fn initial_simplex(points: &[Vector3<f32>], epsilon: f32) -> Option<([usize; 4], bool)> {
    let (mut min_x, mut max_x) = (0usize, 0usize);
    for (i, p) in points.iter().enumerate() {
        if p.x < points[min_x].x {
            min_x = i;
        }
        if p.x > points[max_x].x {
            max_x = i;
        }
    }
    if min_x == max_x {
        return None;
    }

    let third = (0..points.len())
        .filter(|&i| i != min_x && i != max_x)
        .max_by(|&a, &b| {
            let da = point_line_distance(points[a], points[min_x], points[max_x]);
            let db = point_line_distance(points[b], points[min_x], points[max_x]);
            da.partial_cmp(&db).unwrap()
        })?;
    if point_line_distance(points[third], points[min_x], points[max_x]) <= epsilon {
        return None;
    }

    let fourth = (0..points.len())
        .filter(|&i| i != min_x && i != max_x && i != third)
        .max_by(|&a, &b| {
            let da = point_plane_distance(points[a], points[min_x], points[max_x], points[third]);
            let db = point_plane_distance(points[b], points[min_x], points[max_x], points[third]);
            da.abs().partial_cmp(&db.abs()).unwrap()
        });
    let fourth = match fourth {
        Some(f) if point_plane_distance(points[f], points[min_x], points[max_x], points[third]).abs() > epsilon => f,
        _ => return Some(([min_x, max_x, third, usize::MAX], true)),
    };

    Some(([min_x, max_x, third, fourth], false))
}

fn point_line_distance(p: Vector3<f32>, a: Vector3<f32>, b: Vector3<f32>) -> f32 {
    let dir = b - a;
    let len = dir.norm();
    if len <= f32::EPSILON {
        return (p - a).norm();
    }
    (p - a).cross(&dir).norm() / len
}

fn point_plane_distance(p: Vector3<f32>, a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> f32 {
    let normal = (b - a).cross(&(c - a));
    let normal = match normal.try_normalize(f32::EPSILON) {
        Some(n) => n,
        None => return 0.0,
    };
    normal.dot(&(p - a))
}

fn orient_outward(
    mesh: &HalfEdgeMesh,
    loop_: &[Handle<Vertex>; 3],
    centroid: Vector3<f32>,
) -> Vec<Handle<Vertex>> {
    let a = mesh.position(loop_[0]);
    let b = mesh.position(loop_[1]);
    let c = mesh.position(loop_[2]);
    let normal = (b - a).cross(&(c - a));
    if normal.dot(&(a - centroid)) < 0.0 {
        vec![loop_[0], loop_[2], loop_[1]]
    } else {
        vec![loop_[0], loop_[1], loop_[2]]
    }
}

fn furthest_outside_face(
    mesh: &HalfEdgeMesh,
    faces: &[Handle<Face>],
    point: Vector3<f32>,
    epsilon: f32,
    restrict_to: Option<&[Handle<Face>]>,
) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (slot, &face) in faces.iter().enumerate() {
        if face.is_none() {
            continue;
        }
        if let Some(allowed) = restrict_to {
            if !allowed.contains(&face) {
                continue;
            }
        }
        let Some(normal) = mesh.face_normal(face) else {
            continue;
        };
        let anchor = mesh.position(mesh.face_loop(face)[0]);
        let dist = normal.dot(&(point - anchor));
        if dist > epsilon && best.map_or(true, |(_, b)| dist > b) {
            best = Some((slot, dist));
        }
    }
    best
}

fn merge_coplanar_neighbors(mesh: &mut HalfEdgeMesh, new_faces: &[Handle<Face>], epsilon: f32) {
    for &face in new_faces {
        if face.is_none() {
            continue;
        }
        let Some(normal) = mesh.face_normal(face) else {
            continue;
        };
        // Find a coplanar neighbor across any edge of `face`.
        let edges = mesh
            .half_edges()
            .filter(|(_, e)| e.face == face)
            .map(|(h, _)| h)
            .collect::<Vec<_>>();
        for edge in edges {
            let opposite = mesh.edge(edge).opposite;
            let neighbor_face = mesh.edge(opposite).face;
            if neighbor_face.is_none() || neighbor_face == face {
                continue;
            }
            if let Some(neighbor_normal) = mesh.face_normal(neighbor_face) {
                if (neighbor_normal - normal).norm() <= epsilon {
                    mesh.merge_faces(face, neighbor_face);
                }
            }
        }
    }
}

fn planar_hull(points: &[Vector3<f32>], epsilon: f32) -> Option<HalfEdgeMesh> {
    // Degenerate (coplanar or lower-dimensional) input: project to the
    // dominant plane and wind a 2D hull, then lift back to 3D.
    let aabb = AxisAlignedBoundingBox::from_points(points);
    let extents = aabb.max - aabb.min;
    let (u, v) = if extents.x.abs() >= extents.y.abs() && extents.x.abs() >= extents.z.abs() {
        (Vector3::y(), Vector3::z())
    } else if extents.y.abs() >= extents.z.abs() {
        (Vector3::x(), Vector3::z())
    } else {
        (Vector3::x(), Vector3::y())
    };
    let mut projected: Vec<(f32, f32, usize)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (p.dot(&u), p.dot(&v), i))
        .collect();
    projected.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then(a.1.partial_cmp(&b.1).unwrap()));
    projected.dedup_by(|a, b| (a.0 - b.0).abs() <= epsilon && (a.1 - b.1).abs() <= epsilon);
    if projected.len() < 3 {
        return None;
    }

    let cross = |o: (f32, f32), a: (f32, f32), b: (f32, f32)| {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };
    let mut hull: Vec<(f32, f32, usize)> = Vec::new();
    for &p in &projected {
        while hull.len() >= 2
            && cross(
                (hull[hull.len() - 2].0, hull[hull.len() - 2].1),
                (hull[hull.len() - 1].0, hull[hull.len() - 1].1),
                (p.0, p.1),
            ) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in projected.iter().rev() {
        while hull.len() >= lower_len
            && cross(
                (hull[hull.len() - 2].0, hull[hull.len() - 2].1),
                (hull[hull.len() - 1].0, hull[hull.len() - 1].1),
                (p.0, p.1),
            ) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();

    if hull.len() < 3 {
        return None;
    }

    let mut mesh = HalfEdgeMesh::new();
    let hull_vertices: Vec<_> = hull.iter().map(|&(_, _, i)| mesh.add_vertex(points[i])).collect();
    mesh.add_face(&hull_vertices);
    let reversed: Vec<_> = hull_vertices.iter().rev().copied().collect();
    mesh.add_face(&reversed);
    Some(mesh)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hull_of_cube_corners_has_eight_vertices_and_twelve_faces() {
        let points: Vec<Vector3<f32>> = (0u8..8)
            .map(|mask| {
                Vector3::new(
                    if mask & 1 != 0 { 1.0 } else { 0.0 },
                    if mask & 2 != 0 { 1.0 } else { 0.0 },
                    if mask & 4 != 0 { 1.0 } else { 0.0 },
                )
            })
            .collect();
        let hull = quickhull(&points).expect("cube corners form a valid hull");
        assert_eq!(hull.vertex_count(), 8);
        // Cube hull, triangulated, has 12 faces.
        assert_eq!(hull.face_count(), 12);
    }

    #[test]
    fn degenerate_collinear_points_yield_no_hull() {
        let points = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
        ];
        assert!(quickhull(&points).is_none());
    }
}
