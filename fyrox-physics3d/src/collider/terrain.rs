use super::convex::ConvexPolyhedron;
use crate::error::PhysicsError;
use fyrox_math::aabb::AxisAlignedBoundingBox;
use nalgebra::Vector3;

/// A concave heightfield collider over the local unit square in XZ, heights
/// in `[-0.5, 0.5]`, `x_size * z_size` cells each split into two triangles
/// wound clockwise (grounded on the source engine's terrain collider, whose
/// diagram walks each cell `(x,z) -> (x+1,z) -> (x,z+1)` /
/// `(x+1,z) -> (x+1,z+1) -> (x,z+1)`).
pub struct TerrainCollider {
    heights: Vec<f32>,
    x_size: usize,
    z_size: usize,
    local_aabb: AxisAlignedBoundingBox,
}

impl TerrainCollider {
    pub fn new(heights: Vec<f32>, x_size: usize, z_size: usize) -> Result<Self, PhysicsError> {
        if heights.len() != (x_size + 1) * (z_size + 1) {
            return Err(PhysicsError::DimensionMismatch {
                expected: (x_size + 1) * (z_size + 1),
                got: heights.len(),
            });
        }
        let mut terrain = Self {
            heights,
            x_size,
            z_size,
            local_aabb: AxisAlignedBoundingBox::collapsed(),
        };
        terrain.recompute_aabb();
        Ok(terrain)
    }

    fn recompute_aabb(&mut self) {
        let (min_h, max_h) = self
            .heights
            .iter()
            .fold((f32::MAX, -f32::MAX), |(lo, hi), &h| (lo.min(h), hi.max(h)));
        self.local_aabb = AxisAlignedBoundingBox::from_min_max(
            Vector3::new(-0.5, min_h, -0.5),
            Vector3::new(0.5, max_h, 0.5),
        );
    }

    pub fn set_heights(&mut self, heights: Vec<f32>) -> Result<(), PhysicsError> {
        if heights.len() != (self.x_size + 1) * (self.z_size + 1) {
            return Err(PhysicsError::DimensionMismatch {
                expected: (self.x_size + 1) * (self.z_size + 1),
                got: heights.len(),
            });
        }
        self.heights = heights;
        self.recompute_aabb();
        Ok(())
    }

    pub fn local_aabb(&self) -> AxisAlignedBoundingBox {
        self.local_aabb
    }

    fn height_at(&self, x: usize, z: usize) -> f32 {
        self.heights[z * (self.x_size + 1) + x]
    }

    fn cell_position(&self, x: usize, z: usize) -> Vector3<f32> {
        Vector3::new(
            -0.5 + x as f32 / self.x_size as f32,
            self.height_at(x, z),
            -0.5 + z as f32 / self.z_size as f32,
        )
    }

    fn cell_aabb(&self, x: usize, z: usize) -> AxisAlignedBoundingBox {
        let mut aabb = AxisAlignedBoundingBox::from_point(self.cell_position(x, z));
        aabb.add_point(self.cell_position(x + 1, z));
        aabb.add_point(self.cell_position(x, z + 1));
        aabb.add_point(self.cell_position(x + 1, z + 1));
        aabb
    }

    /// Rejects a cell whose Y range cannot overlap `query`'s Y range before
    /// doing any other work - named after the source engine's `checkYAxis`.
    fn check_y_axis(&self, query: &AxisAlignedBoundingBox, cell: &AxisAlignedBoundingBox) -> bool {
        cell.max.y >= query.min.y && cell.min.y <= query.max.y
    }

    /// Convex triangle parts (two per grid cell, clockwise wound) whose cell
    /// AABB overlaps `query`, given in local space.
    pub fn overlapping_parts(&self, query: AxisAlignedBoundingBox) -> Vec<ConvexPolyhedron> {
        let mut parts = Vec::new();
        if self.x_size == 0 || self.z_size == 0 {
            return parts;
        }

        let x_lo = (((query.min.x + 0.5) * self.x_size as f32).floor().max(0.0)) as usize;
        let x_hi = ((((query.max.x + 0.5) * self.x_size as f32).ceil()) as usize).min(self.x_size - 1);
        let z_lo = (((query.min.z + 0.5) * self.z_size as f32).floor().max(0.0)) as usize;
        let z_hi = ((((query.max.z + 0.5) * self.z_size as f32).ceil()) as usize).min(self.z_size - 1);

        for z in z_lo..=z_hi.max(z_lo) {
            for x in x_lo..=x_hi.max(x_lo) {
                if x >= self.x_size || z >= self.z_size {
                    continue;
                }
                let cell_aabb = self.cell_aabb(x, z);
                if !self.check_y_axis(&query, &cell_aabb) {
                    continue;
                }
                if !cell_aabb.is_intersects_aabb(&query) {
                    continue;
                }
                let p00 = self.cell_position(x, z);
                let p10 = self.cell_position(x + 1, z);
                let p01 = self.cell_position(x, z + 1);
                let p11 = self.cell_position(x + 1, z + 1);
                // Clockwise winding, matching the source grid diagram.
                parts.push(ConvexPolyhedron::from_points(vec![p00, p10, p01]));
                parts.push(ConvexPolyhedron::from_points(vec![p10, p11, p01]));
            }
        }
        parts
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn flat_terrain(x: usize, z: usize) -> TerrainCollider {
        TerrainCollider::new(vec![0.0; (x + 1) * (z + 1)], x, z).unwrap()
    }

    #[test]
    fn rejects_mismatched_height_count() {
        let err = TerrainCollider::new(vec![0.0; 3], 2, 2);
        assert!(err.is_err());
    }

    #[test]
    fn overlapping_parts_covers_the_queried_cell() {
        let terrain = flat_terrain(6, 8);
        let query = AxisAlignedBoundingBox::from_min_max(
            Vector3::new(-0.5, -1.0, -0.5),
            Vector3::new(-0.3, 1.0, -0.3),
        );
        let parts = terrain.overlapping_parts(query);
        assert!(!parts.is_empty());
    }
}
