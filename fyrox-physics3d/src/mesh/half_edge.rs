//! A half-edge mesh with index-stable vertices, edges and faces.
//!
//! Three [`fyrox_core::pool::Pool`]s back the mesh instead of the raw Vec +
//! free-list bookkeeping a C-style half-edge mesh would need by hand -
//! removing a face or a vertex just frees its slots and any remaining
//! handle into the mesh stays valid for everything that wasn't removed.

use fxhash::FxHashMap;
use fyrox_core::pool::{Handle, Pool};
use fyrox_math::get_polygon_normal;
use nalgebra::Vector3;

#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub position: Vector3<f32>,
    /// One outgoing half-edge incident to this vertex.
    pub edge: Handle<HalfEdge>,
}

#[derive(Clone, Copy, Debug)]
pub struct HalfEdge {
    /// Vertex this half-edge points at.
    pub destination: Handle<Vertex>,
    pub face: Handle<Face>,
    pub prev: Handle<HalfEdge>,
    pub next: Handle<HalfEdge>,
    pub opposite: Handle<HalfEdge>,
}

#[derive(Clone, Copy, Debug)]
pub struct Face {
    pub edge: Handle<HalfEdge>,
}

#[derive(Default)]
pub struct HalfEdgeMesh {
    vertices: Pool<Vertex>,
    edges: Pool<HalfEdge>,
    faces: Pool<Face>,
    // Keyed by (origin, destination); both directions of a live edge pair
    // are present once either half of the pair has been created.
    side_map: FxHashMap<(Handle<Vertex>, Handle<Vertex>), Handle<HalfEdge>>,
}

impl HalfEdgeMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> impl Iterator<Item = (Handle<Vertex>, &Vertex)> {
        self.vertices.pair_iter()
    }

    pub fn faces(&self) -> impl Iterator<Item = (Handle<Face>, &Face)> {
        self.faces.pair_iter()
    }

    pub fn half_edges(&self) -> impl Iterator<Item = (Handle<HalfEdge>, &HalfEdge)> {
        self.edges.pair_iter()
    }

    pub fn vertex(&self, handle: Handle<Vertex>) -> &Vertex {
        self.vertices.borrow(handle)
    }

    pub fn face(&self, handle: Handle<Face>) -> &Face {
        self.faces.borrow(handle)
    }

    pub fn edge(&self, handle: Handle<HalfEdge>) -> &HalfEdge {
        self.edges.borrow(handle)
    }

    pub fn position(&self, v: Handle<Vertex>) -> Vector3<f32> {
        self.vertices.borrow(v).position
    }

    pub fn add_vertex(&mut self, position: Vector3<f32>) -> Handle<Vertex> {
        self.vertices.spawn(Vertex {
            position,
            edge: Handle::NONE,
        })
    }

    /// Creates a boundary half-edge `origin -> destination` together with its
    /// opposite, or returns the existing one if the pair is already present.
    /// Returns `Handle::NONE` if `origin == destination`.
    pub fn add_edge(
        &mut self,
        origin: Handle<Vertex>,
        destination: Handle<Vertex>,
    ) -> Handle<HalfEdge> {
        if origin == destination {
            return Handle::NONE;
        }
        if let Some(existing) = self.side_map.get(&(origin, destination)) {
            return *existing;
        }
        if let Some(&opposite) = self.side_map.get(&(destination, origin)) {
            let edge = self.edges.spawn(HalfEdge {
                destination,
                face: Handle::NONE,
                prev: Handle::NONE,
                next: Handle::NONE,
                opposite,
            });
            self.edges.borrow_mut(opposite).opposite = edge;
            self.side_map.insert((origin, destination), edge);
            return edge;
        }

        let forward = self.edges.spawn_with(|_| HalfEdge {
            destination,
            face: Handle::NONE,
            prev: Handle::NONE,
            next: Handle::NONE,
            opposite: Handle::NONE,
        });
        let backward = self.edges.spawn(HalfEdge {
            destination: origin,
            face: Handle::NONE,
            prev: Handle::NONE,
            next: Handle::NONE,
            opposite: forward,
        });
        self.edges.borrow_mut(forward).opposite = backward;
        self.side_map.insert((origin, destination), forward);
        self.side_map.insert((destination, origin), backward);

        if self.vertices.borrow(origin).edge.is_none() {
            self.vertices.borrow_mut(origin).edge = forward;
        }
        if self.vertices.borrow(destination).edge.is_none() {
            self.vertices.borrow_mut(destination).edge = backward;
        }

        forward
    }

    /// Builds a face from an ordered, counter-clockwise (as seen from
    /// outside) loop of at least three vertices. Returns `Handle::NONE` if
    /// the loop is too short or any of its edges is already bound to a face.
    pub fn add_face(&mut self, loop_: &[Handle<Vertex>]) -> Handle<Face> {
        if loop_.len() < 3 {
            return Handle::NONE;
        }

        let n = loop_.len();
        let mut loop_edges = Vec::with_capacity(n);
        for i in 0..n {
            let origin = loop_[i];
            let destination = loop_[(i + 1) % n];
            let edge = self.add_edge(origin, destination);
            if edge.is_none() || self.edges.borrow(edge).face.is_some() {
                return Handle::NONE;
            }
            loop_edges.push(edge);
        }

        let face = self.faces.spawn(Face {
            edge: loop_edges[0],
        });

        for i in 0..n {
            let edge = loop_edges[i];
            let next = loop_edges[(i + 1) % n];
            let prev = loop_edges[(i + n - 1) % n];
            let record = self.edges.borrow_mut(edge);
            record.face = face;
            record.next = next;
            record.prev = prev;
        }

        face
    }

    /// Vertex indices in loop order for `face`.
    pub fn face_loop(&self, face: Handle<Face>) -> Vec<Handle<Vertex>> {
        let start = self.faces.borrow(face).edge;
        let mut out = Vec::new();
        let mut cur = start;
        loop {
            out.push(self.edges.borrow(cur).destination);
            cur = self.edges.borrow(cur).next;
            if cur == start {
                break;
            }
        }
        // `destination` of the edge ending a loop step is the *next* vertex;
        // rotate so the loop starts at the edge's own origin vertex.
        out.rotate_right(1);
        out
    }

    fn face_edge_loop(&self, face: Handle<Face>) -> Vec<Handle<HalfEdge>> {
        let start = self.faces.borrow(face).edge;
        let mut out = Vec::new();
        let mut cur = start;
        loop {
            out.push(cur);
            cur = self.edges.borrow(cur).next;
            if cur == start {
                break;
            }
        }
        out
    }

    pub fn face_normal(&self, face: Handle<Face>) -> Option<Vector3<f32>> {
        let positions: Vec<_> = self
            .face_loop(face)
            .into_iter()
            .map(|v| self.position(v))
            .collect();
        get_polygon_normal(&positions).ok()
    }

    pub fn vertex_normal(&self, vertex: Handle<Vertex>) -> Option<Vector3<f32>> {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for face in self.faces_around_vertex(vertex) {
            if let Some(normal) = self.face_normal(face) {
                sum += normal;
                count += 1;
            }
        }
        if count == 0 {
            return None;
        }
        sum.try_normalize(f32::EPSILON)
    }

    /// All faces touching `vertex`, walking both directions so boundary
    /// vertices (no face on one side) are handled correctly.
    pub fn faces_around_vertex(&self, vertex: Handle<Vertex>) -> Vec<Handle<Face>> {
        let mut faces = Vec::new();
        let start = self.vertices.borrow(vertex).edge;
        if start.is_none() {
            return faces;
        }
        let mut cur = start;
        loop {
            let edge = self.edges.borrow(cur);
            if edge.face.is_some() && !faces.contains(&edge.face) {
                faces.push(edge.face);
            }
            let opposite = self.edges.borrow(cur).opposite;
            let next = self.edges.borrow(opposite).next;
            cur = next;
            if cur == start || cur.is_none() {
                break;
            }
        }
        faces
    }

    /// Hill-climbs the 1-ring structure toward the farthest vertex along
    /// `direction`. The mesh is assumed convex; on a non-convex mesh this may
    /// settle on a local maximum.
    pub fn furthest_vertex(&self, direction: Vector3<f32>) -> Handle<Vertex> {
        let mut current = match self.vertices.pair_iter().next() {
            Some((h, _)) => h,
            None => return Handle::NONE,
        };
        let mut best = direction.dot(&self.position(current));
        loop {
            let start = self.vertices.borrow(current).edge;
            if start.is_none() {
                break;
            }
            let mut improved = None;
            let mut cur = start;
            loop {
                let neighbor = self.edges.borrow(cur).destination;
                let value = direction.dot(&self.position(neighbor));
                if value > best {
                    best = value;
                    improved = Some(neighbor);
                }
                let opposite = self.edges.borrow(cur).opposite;
                cur = self.edges.borrow(opposite).next;
                if cur == start {
                    break;
                }
            }
            match improved {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Faces visible from `eye`, flood-filled from `start` across shared
    /// edges while the neighbor's supporting plane still faces `eye`.
    fn visible_faces(&self, eye: Vector3<f32>, start: Handle<Face>, epsilon: f32) -> Vec<Handle<Face>> {
        let mut visible = vec![start];
        let mut stack = vec![start];
        while let Some(face) = stack.pop() {
            for edge in self.face_edge_loop(face) {
                let opposite = self.edges.borrow(edge).opposite;
                let neighbor = self.edges.borrow(opposite).face;
                if neighbor.is_none() || visible.contains(&neighbor) {
                    continue;
                }
                let Some(normal) = self.face_normal(neighbor) else {
                    continue;
                };
                let point_on_face = self.position(self.edges.borrow(opposite).destination);
                if normal.dot(&(eye - point_on_face)) > epsilon {
                    visible.push(neighbor);
                    stack.push(neighbor);
                }
            }
        }
        visible
    }

    /// Boundary half-edges between the region of faces visible from `eye`
    /// (flood-filled starting at `start`) and the rest of the mesh, chained
    /// into a single loop in winding order.
    pub fn horizon(&self, eye: Vector3<f32>, start: Handle<Face>, epsilon: f32) -> Vec<Handle<HalfEdge>> {
        let visible = self.visible_faces(eye, start, epsilon);

        let mut boundary_by_origin: FxHashMap<Handle<Vertex>, Handle<HalfEdge>> =
            FxHashMap::default();
        for &face in &visible {
            for edge in self.face_edge_loop(face) {
                let opposite = self.edges.borrow(edge).opposite;
                let neighbor_face = self.edges.borrow(opposite).face;
                if !visible.contains(&neighbor_face) {
                    let origin = self.edges.borrow(opposite).destination;
                    boundary_by_origin.insert(origin, edge);
                }
            }
        }

        let mut ordered = Vec::with_capacity(boundary_by_origin.len());
        if let Some((&first_origin, _)) = boundary_by_origin.iter().next() {
            let mut origin = first_origin;
            for _ in 0..boundary_by_origin.len() {
                let Some(&edge) = boundary_by_origin.get(&origin) else {
                    break;
                };
                ordered.push(edge);
                origin = self.edges.borrow(edge).destination;
            }
        }
        ordered
    }

    /// Removes `face`, dropping half-edges whose opposite has no face of its
    /// own (pure boundary edges) and clearing the face pointer on the rest.
    pub fn remove_face(&mut self, face: Handle<Face>) {
        if !self.faces.is_valid_handle(face) {
            return;
        }
        let loop_edges = self.face_edge_loop(face);
        for edge in loop_edges {
            let opposite = self.edges.borrow(edge).opposite;
            if self.edges.borrow(opposite).face.is_none() {
                self.remove_edge_pair(edge, opposite);
            } else {
                self.edges.borrow_mut(edge).face = Handle::NONE;
            }
        }
        self.faces.free(face);
    }

    fn remove_edge_pair(&mut self, a: Handle<HalfEdge>, b: Handle<HalfEdge>) {
        let (origin_a, origin_b) = (
            self.edges.borrow(b).destination,
            self.edges.borrow(a).destination,
        );
        self.side_map.remove(&(origin_a, origin_b));
        self.side_map.remove(&(origin_b, origin_a));
        if self.vertices.borrow(origin_a).edge == a {
            self.vertices.borrow_mut(origin_a).edge = Handle::NONE;
        }
        if self.vertices.borrow(origin_b).edge == b {
            self.vertices.borrow_mut(origin_b).edge = Handle::NONE;
        }
        self.edges.free(a);
        self.edges.free(b);
    }

    /// Removes every face incident to `vertex`, then the vertex itself.
    pub fn remove_vertex(&mut self, vertex: Handle<Vertex>) {
        for face in self.faces_around_vertex(vertex) {
            self.remove_face(face);
        }
        // Any surviving boundary edges incident to the vertex have no face
        // left to belong to; drop them too.
        while let Some(edge) = self.any_incident_edge(vertex) {
            let opposite = self.edges.borrow(edge).opposite;
            self.remove_edge_pair(edge, opposite);
        }
        self.vertices.free(vertex);
    }

    fn any_incident_edge(&self, vertex: Handle<Vertex>) -> Option<Handle<HalfEdge>> {
        let start = self.vertices.borrow(vertex).edge;
        if start.is_some() {
            return Some(start);
        }
        self.edges
            .pair_iter()
            .find(|(_, e)| e.destination == vertex)
            .map(|(h, _)| h)
    }

    /// Merges `f2` into `f1` across every edge the two faces share, removing
    /// the shared edges and `f2`. Returns `f1`, or `Handle::NONE` if the
    /// faces share no edge.
    pub fn merge_faces(&mut self, f1: Handle<Face>, f2: Handle<Face>) -> Handle<Face> {
        if f1 == f2 {
            return Handle::NONE;
        }
        let mut merged_any = false;
        loop {
            let shared = self
                .face_edge_loop(f1)
                .into_iter()
                .find(|&e| self.edges.borrow(self.edges.borrow(e).opposite).face == f2);
            let Some(e) = shared else { break };
            merged_any = true;
            let o = self.edges.borrow(e).opposite;
            let (e_prev, e_next) = (self.edges.borrow(e).prev, self.edges.borrow(e).next);
            let (o_prev, o_next) = (self.edges.borrow(o).prev, self.edges.borrow(o).next);

            self.edges.borrow_mut(e_prev).next = o_next;
            self.edges.borrow_mut(o_next).prev = e_prev;
            self.edges.borrow_mut(o_prev).next = e_next;
            self.edges.borrow_mut(e_next).prev = o_prev;

            let origin_e = self.edges.borrow(o).destination;
            let origin_o = self.edges.borrow(e).destination;
            self.side_map.remove(&(origin_e, origin_o));
            self.side_map.remove(&(origin_o, origin_e));
            self.edges.free(e);
            self.edges.free(o);

            self.faces.borrow_mut(f1).edge = e_prev;
        }
        if !merged_any {
            return Handle::NONE;
        }
        // Re-stamp every edge of the merged loop with f1 and fold f2's loop in.
        let loop_edges = self.face_edge_loop(f1);
        for edge in loop_edges {
            self.edges.borrow_mut(edge).face = f1;
        }
        self.faces.free(f2);
        f1
    }

    /// Fans every face with more than 3 vertices into triangles.
    pub fn triangulate(&mut self) {
        let faces: Vec<_> = self.faces.pair_iter().map(|(h, _)| h).collect();
        for face in faces {
            let loop_ = self.face_loop(face);
            if loop_.len() <= 3 {
                continue;
            }
            self.remove_face_keep_vertices(face);
            let root = loop_[0];
            for window in loop_[1..].windows(2) {
                self.add_face(&[root, window[0], window[1]]);
            }
        }
    }

    fn remove_face_keep_vertices(&mut self, face: Handle<Face>) {
        let loop_edges = self.face_edge_loop(face);
        for edge in loop_edges {
            let opposite = self.edges.borrow(edge).opposite;
            if self.edges.borrow(opposite).face.is_none() {
                self.remove_edge_pair(edge, opposite);
            } else {
                self.edges.borrow_mut(edge).face = Handle::NONE;
            }
        }
        self.faces.free(face);
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.alive_count()
    }

    pub fn face_count(&self) -> u32 {
        self.faces.alive_count()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tetrahedron() -> (HalfEdgeMesh, [Handle<Vertex>; 4]) {
        let mut mesh = HalfEdgeMesh::new();
        let a = mesh.add_vertex(Vector3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Vector3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Vector3::new(0.0, 1.0, 0.0));
        let d = mesh.add_vertex(Vector3::new(0.0, 0.0, 1.0));
        mesh.add_face(&[a, c, b]);
        mesh.add_face(&[a, b, d]);
        mesh.add_face(&[b, c, d]);
        mesh.add_face(&[c, a, d]);
        (mesh, [a, b, c, d])
    }

    #[test]
    fn face_loop_visits_each_vertex_once_in_order() {
        let (mesh, [a, b, c, _d]) = tetrahedron();
        let face = mesh.faces.pair_iter().next().unwrap().0;
        let loop_ = mesh.face_loop(face);
        assert_eq!(loop_.len(), 3);
        assert!(loop_.contains(&a) && loop_.contains(&b) && loop_.contains(&c));
    }

    #[test]
    fn every_half_edge_has_a_reciprocal_opposite() {
        let (mesh, _) = tetrahedron();
        for (handle, edge) in mesh.half_edges() {
            let opposite = mesh.edge(edge.opposite);
            assert_eq!(opposite.opposite, handle);
        }
    }

    #[test]
    fn add_edge_rejects_self_loop() {
        let mut mesh = HalfEdgeMesh::new();
        let a = mesh.add_vertex(Vector3::zeros());
        assert!(mesh.add_edge(a, a).is_none());
    }

    #[test]
    fn remove_face_drops_pure_boundary_edges() {
        let (mut mesh, _) = tetrahedron();
        let face_count_before = mesh.face_count();
        let face = mesh.faces.pair_iter().next().unwrap().0;
        mesh.remove_face(face);
        assert_eq!(mesh.face_count(), face_count_before - 1);
    }

    #[test]
    fn furthest_vertex_finds_extremum() {
        let (mesh, [_a, b, _c, _d]) = tetrahedron();
        let found = mesh.furthest_vertex(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(found, b);
    }
}
