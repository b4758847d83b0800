//! Hierarchical Approximate Convex Decomposition: greedy dual-graph edge
//! collapse that breaks a concave triangle mesh into convex sub-meshes.

use crate::mesh::HalfEdgeMesh;
use fyrox_math::aabb::AxisAlignedBoundingBox;
use fyrox_math::{get_polygon_normal, triangle_area};
use nalgebra::Vector3;
use std::collections::{BinaryHeap, HashSet};

/// One triangle of the input mesh, referenced by its three world positions.
#[derive(Clone, Copy, Debug)]
struct Triangle {
    vertices: [Vector3<f32>; 3],
}

impl Triangle {
    fn normal(&self) -> Vector3<f32> {
        get_polygon_normal(&self.vertices).unwrap_or_else(|_| Vector3::z())
    }

    fn centroid(&self) -> Vector3<f32> {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }
}

/// A node of the dual graph: a group of original triangles currently
/// considered as one candidate convex patch.
struct DualNode {
    triangles: Vec<usize>,
    neighbors: HashSet<usize>,
    alive: bool,
}

#[derive(Clone, Copy, PartialEq)]
struct QueueEntry {
    cost: f32,
    a: usize,
    b: usize,
    version: u32,
}

impl Eq for QueueEntry {}
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Min-heap by cost: reverse the natural float ordering.
        other.cost.partial_cmp(&self.cost).unwrap_or(std::cmp::Ordering::Equal)
    }
}
impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Decomposes a (possibly concave, already-triangulated) mesh into convex
/// sub-meshes. `max_concavity` is scaled by the input AABB diagonal per the
/// source algorithm's `normFactor`.
pub fn decompose(mesh: &HalfEdgeMesh, max_concavity: f32) -> Vec<HalfEdgeMesh> {
    let triangles: Vec<Triangle> = mesh
        .faces()
        .map(|(f, _)| Triangle {
            vertices: mesh
                .face_loop(f)
                .iter()
                .map(|&v| mesh.position(v))
                .collect::<Vec<_>>()
                .try_into()
                .unwrap_or([Vector3::zeros(); 3]),
        })
        .collect();

    if triangles.is_empty() {
        return Vec::new();
    }

    let all_points: Vec<_> = triangles.iter().flat_map(|t| t.vertices).collect();
    let aabb = AxisAlignedBoundingBox::from_points(&all_points);
    let norm_factor = (aabb.max - aabb.min).norm().max(f32::EPSILON);
    let alpha = max_concavity / (10.0 * norm_factor);
    let concavity_threshold = max_concavity * norm_factor;

    let mut nodes: Vec<DualNode> = (0..triangles.len())
        .map(|i| DualNode {
            triangles: vec![i],
            neighbors: HashSet::new(),
            alive: true,
        })
        .collect();

    // Build adjacency by shared (direction-agnostic) edge.
    type Quantized = (i64, i64, i64);
    let mut edge_owner: fxhash::FxHashMap<(Quantized, Quantized), usize> = fxhash::FxHashMap::default();
    let quantize = |v: Vector3<f32>| -> Quantized {
        let scale = 1.0 / (norm_factor * 1e-5).max(1e-8);
        (
            (v.x * scale).round() as i64,
            (v.y * scale).round() as i64,
            (v.z * scale).round() as i64,
        )
    };
    let key_of = |a: Quantized, b: Quantized| -> (Quantized, Quantized) {
        if a < b { (a, b) } else { (b, a) }
    };
    for (tri_idx, tri) in triangles.iter().enumerate() {
        let qa = quantize(tri.vertices[0]);
        let qb = quantize(tri.vertices[1]);
        let qc = quantize(tri.vertices[2]);
        for (x, y) in [(qa, qb), (qb, qc), (qc, qa)] {
            let key = key_of(x, y);
            if let Some(&other) = edge_owner.get(&key) {
                if other != tri_idx {
                    nodes[tri_idx].neighbors.insert(other);
                    nodes[other].neighbors.insert(tri_idx);
                }
            } else {
                edge_owner.insert(key, tri_idx);
            }
        }
    }

    let mut versions = vec![0u32; nodes.len()];
    let mut heap = BinaryHeap::new();
    for i in 0..nodes.len() {
        for &j in &nodes[i].neighbors.clone() {
            if i < j {
                let cost = edge_cost(&nodes, &triangles, i, j, alpha, norm_factor);
                heap.push(QueueEntry { cost, a: i, b: j, version: versions[i].max(versions[j]) });
            }
        }
    }

    while let Some(entry) = heap.pop() {
        if !nodes[entry.a].alive || !nodes[entry.b].alive {
            continue;
        }
        if versions[entry.a] > entry.version || versions[entry.b] > entry.version {
            continue;
        }
        if entry.cost >= concavity_threshold {
            break;
        }

        // Merge b into a.
        let b_triangles = std::mem::take(&mut nodes[entry.b].triangles);
        let b_neighbors = std::mem::take(&mut nodes[entry.b].neighbors);
        nodes[entry.a].triangles.extend(b_triangles);
        nodes[entry.a].neighbors.remove(&entry.b);
        for n in b_neighbors {
            if n != entry.a {
                nodes[entry.a].neighbors.insert(n);
                nodes[n].neighbors.remove(&entry.b);
                nodes[n].neighbors.insert(entry.a);
            }
        }
        nodes[entry.b].alive = false;
        versions[entry.a] += 1;

        for &n in &nodes[entry.a].neighbors.clone() {
            if !nodes[n].alive {
                continue;
            }
            let cost = edge_cost(&nodes, &triangles, entry.a, n, alpha, norm_factor);
            let version = versions[entry.a].max(versions[n]);
            let (lo, hi) = if entry.a < n { (entry.a, n) } else { (n, entry.a) };
            heap.push(QueueEntry { cost, a: lo, b: hi, version });
        }
    }

    nodes
        .into_iter()
        .filter(|n| n.alive && !n.triangles.is_empty())
        .map(|node| build_submesh(&triangles, &node.triangles))
        .collect()
}

fn edge_cost(
    nodes: &[DualNode],
    triangles: &[Triangle],
    a: usize,
    b: usize,
    alpha: f32,
    norm_factor: f32,
) -> f32 {
    let mut combined: Vec<usize> = nodes[a].triangles.clone();
    combined.extend(nodes[b].triangles.iter().copied());

    let points: Vec<Vector3<f32>> = combined
        .iter()
        .flat_map(|&t| triangles[t].vertices)
        .collect();

    let concavity = region_concavity(&points);
    let perimeter_area = region_perimeter_and_area(triangles, &combined);
    let aspect_ratio = if perimeter_area.1 > f32::EPSILON {
        (perimeter_area.0 * perimeter_area.0) / (4.0 * std::f32::consts::PI * perimeter_area.1)
    } else {
        f32::MAX
    };

    concavity / norm_factor + alpha * aspect_ratio
}

/// Maximum distance from a surface point to its projection on the region's
/// convex hull along its own normal - the concavity metric driving HACD's
/// merge order.
fn region_concavity(points: &[Vector3<f32>]) -> f32 {
    let Some(hull) = crate::quickhull::quickhull(points) else {
        return 0.0;
    };
    let mut max_dev = 0.0f32;
    for &p in points {
        let mut closest = f32::MAX;
        for (face, _) in hull.faces() {
            let Some(normal) = hull.face_normal(face) else {
                continue;
            };
            let anchor = hull.position(hull.face_loop(face)[0]);
            let dist = normal.dot(&(p - anchor)).abs();
            if dist < closest {
                closest = dist;
            }
        }
        if closest.is_finite() {
            max_dev = max_dev.max(closest);
        }
    }
    max_dev
}

fn region_perimeter_and_area(triangles: &[Triangle], indices: &[usize]) -> (f32, f32) {
    type Quantized = (i64, i64, i64);
    let mut area = 0.0f32;
    let mut edge_count: fxhash::FxHashMap<(Quantized, Quantized), u32> = fxhash::FxHashMap::default();
    let mut edge_len: fxhash::FxHashMap<(Quantized, Quantized), f32> = fxhash::FxHashMap::default();
    let quantize = |v: Vector3<f32>| -> Quantized {
        ((v.x * 1e4) as i64, (v.y * 1e4) as i64, (v.z * 1e4) as i64)
    };
    for &idx in indices {
        let t = &triangles[idx];
        area += triangle_area(t.vertices[0], t.vertices[1], t.vertices[2]);
        let qs = [quantize(t.vertices[0]), quantize(t.vertices[1]), quantize(t.vertices[2])];
        for (i, j) in [(0, 1), (1, 2), (2, 0)] {
            let (a, b) = (qs[i], qs[j]);
            let key = if a < b { (a, b) } else { (b, a) };
            *edge_count.entry(key).or_insert(0) += 1;
            edge_len.insert(key, (t.vertices[j] - t.vertices[i]).norm());
        }
    }
    let perimeter: f32 = edge_count
        .iter()
        .filter(|(_, &c)| c == 1)
        .map(|(k, _)| edge_len.get(k).copied().unwrap_or(0.0))
        .sum();
    (perimeter, area)
}

fn build_submesh(triangles: &[Triangle], indices: &[usize]) -> HalfEdgeMesh {
    let points: Vec<Vector3<f32>> = indices.iter().flat_map(|&i| triangles[i].vertices).collect();
    crate::quickhull::quickhull(&points).unwrap_or_else(HalfEdgeMesh::new)
}

#[cfg(test)]
mod test {
    use super::*;

    fn cube_mesh() -> HalfEdgeMesh {
        let points: Vec<Vector3<f32>> = (0u8..8)
            .map(|mask| {
                Vector3::new(
                    if mask & 1 != 0 { 1.0 } else { 0.0 },
                    if mask & 2 != 0 { 1.0 } else { 0.0 },
                    if mask & 4 != 0 { 1.0 } else { 0.0 },
                )
            })
            .collect();
        let mut mesh = crate::quickhull::quickhull(&points).unwrap();
        mesh.triangulate();
        mesh
    }

    #[test]
    fn a_convex_mesh_decomposes_to_a_single_part() {
        let mesh = cube_mesh();
        let parts = decompose(&mesh, 0.05);
        assert_eq!(parts.len(), 1);
    }
}
