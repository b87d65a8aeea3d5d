//! Projection matrices
//!
//! The engine works in a left-handed space (+Z into the screen) and targets
//! wgpu's zero-to-one clip depth. cgmath only ships right-handed OpenGL-style
//! projections, so the two used here are spelled out.

use cgmath::{Matrix4, Rad, SquareMatrix};

use super::settings::GraphicSettings;

/// Vertical field of view used for the scene projection
pub const FIELD_OF_VIEW: Rad<f32> = Rad(std::f32::consts::FRAC_PI_4);

/// Left-handed perspective projection mapping `near..far` to depth `0..1`
pub fn perspective_lh(fovy: Rad<f32>, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let h = 1.0 / (fovy.0 * 0.5).tan();
    let w = h / aspect;
    let range = far / (far - near);

    #[rustfmt::skip]
    let matrix = Matrix4::new(
        w,   0.0, 0.0,            0.0,
        0.0, h,   0.0,            0.0,
        0.0, 0.0, range,          1.0,
        0.0, 0.0, -range * near,  0.0,
    );
    matrix
}

/// Left-handed orthographic projection centred on the origin
pub fn orthographic_lh(width: f32, height: f32, near: f32, far: f32) -> Matrix4<f32> {
    let range = 1.0 / (far - near);

    #[rustfmt::skip]
    let matrix = Matrix4::new(
        2.0 / width, 0.0,          0.0,            0.0,
        0.0,         2.0 / height, 0.0,            0.0,
        0.0,         0.0,          range,          0.0,
        0.0,         0.0,          -range * near,  1.0,
    );
    matrix
}

/// World, projection and orthographic matrices derived from the settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projections {
    pub world: Matrix4<f32>,
    pub perspective: Matrix4<f32>,
    pub ortho: Matrix4<f32>,
    aspect: f32,
}

impl Projections {
    pub fn new(settings: &GraphicSettings) -> Self {
        let aspect = settings.aspect_ratio();
        let width = settings.window_width.max(1) as f32;
        let height = settings.window_height.max(1) as f32;

        Self {
            world: Matrix4::identity(),
            perspective: perspective_lh(
                FIELD_OF_VIEW,
                aspect,
                settings.screen_near,
                settings.screen_depth,
            ),
            ortho: orthographic_lh(width, height, settings.screen_near, settings.screen_depth),
            aspect,
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    const EPS: f32 = 1e-5;

    fn ndc(m: Matrix4<f32>, x: f32, y: f32, z: f32) -> Vector4<f32> {
        let clip = m * Vector4::new(x, y, z, 1.0);
        clip / clip.w
    }

    #[test]
    fn perspective_maps_clip_planes_to_unit_depth() {
        let m = perspective_lh(FIELD_OF_VIEW, 16.0 / 9.0, 0.1, 100.0);
        assert!(ndc(m, 0.0, 0.0, 0.1).z.abs() < EPS);
        assert!((ndc(m, 0.0, 0.0, 100.0).z - 1.0).abs() < EPS);
    }

    #[test]
    fn perspective_encodes_aspect_ratio() {
        let m = perspective_lh(FIELD_OF_VIEW, 2.0, 1.0, 10.0);
        assert!((m[1][1] / m[0][0] - 2.0).abs() < EPS);
    }

    #[test]
    fn ortho_maps_screen_edges_to_ndc_edges() {
        let m = orthographic_lh(1280.0, 720.0, 0.1, 100.0);
        let corner = ndc(m, 640.0, 360.0, 100.0);
        assert!((corner.x - 1.0).abs() < EPS);
        assert!((corner.y - 1.0).abs() < EPS);
        assert!((corner.z - 1.0).abs() < EPS);
    }

    #[test]
    fn projections_follow_settings() {
        let settings = GraphicSettings::default().with_size(1280, 720);
        let projections = Projections::new(&settings);
        assert!((projections.aspect_ratio() - 1280.0 / 720.0).abs() < EPS);
        assert_eq!(projections.world, Matrix4::identity());
    }
}
