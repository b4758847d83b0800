use super::ConvexShape;
use fyrox_math::aabb::AxisAlignedBoundingBox;
use nalgebra::Vector3;

#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub radius: f32,
}

impl Sphere {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl ConvexShape for Sphere {
    fn support_local(&self, direction: Vector3<f32>) -> Vector3<f32> {
        direction
            .try_normalize(f32::EPSILON)
            .map(|n| n * self.radius)
            .unwrap_or_else(Vector3::zeros)
    }

    fn local_aabb(&self) -> AxisAlignedBoundingBox {
        AxisAlignedBoundingBox::from_radius(self.radius)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn support_point_lies_on_the_sphere() {
        let s = Sphere::new(2.5);
        let p = s.support_local(Vector3::new(1.0, 0.0, 0.0));
        assert!((p.norm() - 2.5).abs() < 1e-5);
    }
}
