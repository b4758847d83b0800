use super::ConvexShape;
use fyrox_math::aabb::AxisAlignedBoundingBox;
use nalgebra::Vector3;

/// A capsule aligned with the local Y axis: two sphere caps of `radius`
/// joined by a cylinder of `half_height`.
#[derive(Clone, Copy, Debug)]
pub struct Capsule {
    pub radius: f32,
    pub half_height: f32,
}

impl Capsule {
    pub fn new(radius: f32, half_height: f32) -> Self {
        Self {
            radius,
            half_height,
        }
    }

    pub fn segment(&self) -> (Vector3<f32>, Vector3<f32>) {
        (
            Vector3::new(0.0, -self.half_height, 0.0),
            Vector3::new(0.0, self.half_height, 0.0),
        )
    }
}

impl ConvexShape for Capsule {
    fn support_local(&self, direction: Vector3<f32>) -> Vector3<f32> {
        let (a, b) = self.segment();
        let anchor = if direction.y >= 0.0 { b } else { a };
        direction
            .try_normalize(f32::EPSILON)
            .map(|n| anchor + n * self.radius)
            .unwrap_or(anchor)
    }

    fn local_aabb(&self) -> AxisAlignedBoundingBox {
        AxisAlignedBoundingBox::from_min_max(
            Vector3::new(-self.radius, -self.half_height - self.radius, -self.radius),
            Vector3::new(self.radius, self.half_height + self.radius, self.radius),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn support_point_picks_the_correct_cap() {
        let capsule = Capsule::new(0.5, 1.0);
        let top = capsule.support_local(Vector3::new(0.0, 1.0, 0.0));
        assert!((top.y - 1.5).abs() < 1e-5);
        let bottom = capsule.support_local(Vector3::new(0.0, -1.0, 0.0));
        assert!((bottom.y + 1.5).abs() < 1e-5);
    }
}
