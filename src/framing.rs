use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::math::AABB;

/// Camera distance per unit of the model's largest dimension
pub const DISTANCE_RATIO: f32 = 1.5;

/// Camera offset from the model center, in units of the framing distance
pub const VIEW_OFFSET: Vec3 = Vec3::new(0.5, 0.4, 1.0);

/// Headroom kept between the framed radius and the dolly limit
const MAX_DISTANCE_HEADROOM: f32 = 2.0;

/// Camera placement that keeps a whole model in view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub center: Vec3,
    pub distance: f32,
    pub position: Vec3,
}

impl Framing {
    pub fn for_bounds(bounds: &AABB) -> Self {
        let center = bounds.center();
        let distance = bounds.max_dimension() * DISTANCE_RATIO;

        Self {
            center,
            distance,
            position: center + VIEW_OFFSET * distance,
        }
    }

    /// Orbit radius of the framed camera
    pub fn radius(&self) -> f32 {
        self.position.distance(self.center)
    }

    /// Move the camera here (eased by the controls) and make it the reset point
    pub fn apply(&self, camera: &mut PerspectiveCamera, controls: &mut OrbitControls) {
        camera.position = self.position;
        controls.ensure_max_distance(self.radius() * MAX_DISTANCE_HEADROOM);
        controls.set_look_at(self.position, self.center, true);
        controls.save_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_cube_at_origin() {
        let framing = Framing::for_bounds(&AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5)));

        assert_eq!(framing.center, Vec3::ZERO);
        assert_eq!(framing.distance, 1.5);
        assert!(framing.position.abs_diff_eq(Vec3::new(0.75, 0.6, 1.5), 1e-6));
    }

    #[test]
    fn offset_is_relative_to_center() {
        let framing = Framing::for_bounds(&AABB::new(
            Vec3::new(9.0, 0.0, -1.0),
            Vec3::new(11.0, 1.0, 1.0),
        ));

        assert_eq!(framing.center, Vec3::new(10.0, 0.5, 0.0));
        assert_eq!(framing.distance, 3.0);
        assert!(framing.position.abs_diff_eq(Vec3::new(11.5, 1.7, 3.0), 1e-5));
    }

    #[test]
    fn apply_saves_framed_state() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new();
        let framing = Framing::for_bounds(&AABB::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 1.0)));

        framing.apply(&mut camera, &mut controls);
        assert_eq!(camera.position, framing.position);
        assert_eq!(controls.goal_target(), framing.center);

        controls.rotate(1.0, 0.0);
        controls.reset(false);
        assert!(controls.position().distance(framing.position) < 1e-4);
    }

    #[test]
    fn large_models_widen_the_dolly_range() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new();
        let framing = Framing::for_bounds(&AABB::new(Vec3::ZERO, Vec3::splat(40.0)));

        framing.apply(&mut camera, &mut controls);
        assert!((controls.goal_distance() - framing.radius()).abs() < 1e-3);
    }
}
