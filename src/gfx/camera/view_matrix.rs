//! View matrices derived from raw camera inputs
//!
//! Each matrix is rebuilt from scratch from a position and a look direction;
//! nothing is accumulated between updates.

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix3, Matrix4, Point3, Vector3};

/// World up axis used by every view matrix
pub const UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

/// Left-handed view matrix looking from `eye` along `direction`
///
/// A zero `direction` looks down +Z. A direction parallel to `up` keeps +X
/// as the right axis.
pub fn look_to_lh(eye: Point3<f32>, direction: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    let forward = if direction.magnitude2() > f32::EPSILON {
        direction.normalize()
    } else {
        Vector3::unit_z()
    };

    let mut side = up.cross(forward);
    if side.magnitude2() <= f32::EPSILON {
        // looking straight up or down
        side = Vector3::unit_x();
    }
    let right = side.normalize();
    let camera_up = forward.cross(right);
    let eye = Vector3::new(eye.x, eye.y, eye.z);

    #[rustfmt::skip]
    let matrix = Matrix4::new(
        right.x,           camera_up.x,           forward.x,           0.0,
        right.y,           camera_up.y,           forward.y,           0.0,
        right.z,           camera_up.z,           forward.z,           0.0,
        -right.dot(eye),   -camera_up.dot(eye),   -forward.dot(eye),   1.0,
    );
    matrix
}

/// Forward vector for Euler angles in degrees (pitch about X, yaw about Y, roll about Z)
///
/// Roll is applied first, then pitch, then yaw, starting from +Z.
pub fn look_direction_from_euler(rotation: Vector3<f32>) -> Vector3<f32> {
    let rotation = Matrix3::from_angle_y(Deg(rotation.y))
        * Matrix3::from_angle_x(Deg(rotation.x))
        * Matrix3::from_angle_z(Deg(rotation.z));
    rotation * Vector3::unit_z()
}

/// Scene view, mirror reflection view and the fixed UI-space base view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewMatrices {
    view: Matrix4<f32>,
    reflection: Matrix4<f32>,
    base_view: Matrix4<f32>,
}

impl Default for ViewMatrices {
    fn default() -> Self {
        let base_view = look_to_lh(Point3::new(0.0, 0.0, -1.0), Vector3::unit_z(), UP);
        Self {
            view: base_view,
            reflection: base_view,
            base_view,
        }
    }
}

impl ViewMatrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_view(&mut self, position: Vector3<f32>, look_direction: Vector3<f32>) {
        self.view = look_to_lh(Point3::from_vec(position), look_direction, UP);
    }

    /// Rebuilds the reflection view for a mirror plane at `height`
    pub fn update_reflection(
        &mut self,
        position: Vector3<f32>,
        look_direction: Vector3<f32>,
        height: f32,
    ) {
        let mirrored = Vector3::new(position.x, position.y + height * 2.0, position.z);
        self.reflection = look_to_lh(Point3::from_vec(mirrored), look_direction, UP);
    }

    pub fn update_base_view(&mut self, position: Vector3<f32>, look_direction: Vector3<f32>) {
        self.base_view = look_to_lh(Point3::from_vec(position), look_direction, UP);
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn reflection(&self) -> Matrix4<f32> {
        self.reflection
    }

    pub fn base_view(&self) -> Matrix4<f32> {
        self.base_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    const EPS: f32 = 1e-5;

    fn close(a: Vector4<f32>, b: Vector4<f32>) -> bool {
        (a - b).magnitude() < EPS
    }

    #[test]
    fn eye_maps_to_origin_and_target_to_positive_z() {
        let mut views = ViewMatrices::new();
        views.update_view(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 1.0));

        let eye = views.view() * Vector4::new(1.0, 2.0, 3.0, 1.0);
        assert!(close(eye, Vector4::new(0.0, 0.0, 0.0, 1.0)));

        let ahead = views.view() * Vector4::new(1.0, 2.0, 8.0, 1.0);
        assert!(close(ahead, Vector4::new(0.0, 0.0, 5.0, 1.0)));
    }

    #[test]
    fn left_handed_basis_puts_positive_x_to_the_right() {
        let view = look_to_lh(Point3::new(0.0, 0.0, 0.0), Vector3::unit_z(), UP);
        let right = view * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(right.x > 0.0);
    }

    #[test]
    fn reflection_raises_eye_by_twice_the_height() {
        let mut views = ViewMatrices::new();
        views.update_reflection(Vector3::new(0.0, 1.0, 0.0), Vector3::unit_z(), 1.5);
        let eye = views.reflection() * Vector4::new(0.0, 4.0, 0.0, 1.0);
        assert!(close(eye, Vector4::new(0.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn base_view_is_independent_of_view_updates() {
        let mut views = ViewMatrices::new();
        let base = views.base_view();
        views.update_view(Vector3::new(5.0, 5.0, 5.0), Vector3::unit_x());
        assert_eq!(views.base_view(), base);
    }

    #[test]
    fn euler_yaw_turns_forward_towards_x() {
        let forward = look_direction_from_euler(Vector3::new(0.0, 90.0, 0.0));
        assert!((forward - Vector3::unit_x()).magnitude() < EPS);

        let straight = look_direction_from_euler(Vector3::new(0.0, 0.0, 45.0));
        assert!((straight - Vector3::unit_z()).magnitude() < EPS);
    }

    #[test]
    fn degenerate_direction_still_produces_a_view() {
        let view = look_to_lh(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0), UP);
        let straight_up = look_to_lh(Point3::new(0.0, 0.0, 0.0), UP, UP);
        assert!(view.x.x.is_finite());
        assert!(straight_up.x.x.is_finite());
    }
}
