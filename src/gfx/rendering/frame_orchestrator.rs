//! Per-frame traversal: scene to draw calls
//!
//! Each frame runs `view update -> clear -> traverse and draw -> present`
//! in order. The next frame cannot begin before the previous one presented
//! because [`Frame`](crate::gfx::device::Frame) borrows the device context.

use cgmath::{Matrix4, Vector3};

use crate::{
    error::{EngineError, EngineResult},
    gfx::{
        assets::AssetCache,
        camera::ViewMatrices,
        device::DeviceContext,
        scene::{SceneObject, SceneView},
    },
};

use super::pipeline_manager::{BuiltinProgram, PipelineManager};

/// Scene user whose camera drives the view
pub const ACTIVE_USER: usize = 0;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 0.0,
    b: 1.0,
    a: 1.0,
};

/// One object ready to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub world: Matrix4<f32>,
    pub mesh_index: usize,
}

impl From<SceneObject> for DrawCall {
    fn from(object: SceneObject) -> Self {
        Self {
            world: world_transform(object.position),
            mesh_index: object.mesh_index,
        }
    }
}

/// Object placement; scale and rotation stay identity
pub fn world_transform(position: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(position)
}

/// Walks every tile, then every object in it, in the scene's order
pub fn collect_draws<S: SceneView>(scene: &S) -> Vec<DrawCall> {
    scene
        .tiles()
        .flat_map(|tile| scene.objects(&tile).map(DrawCall::from).collect::<Vec<_>>())
        .collect()
}

/// Turns a scene into one presented frame
#[derive(Debug, Clone, Copy)]
pub struct FrameOrchestrator {
    clear_color: wgpu::Color,
    program: usize,
}

impl Default for FrameOrchestrator {
    fn default() -> Self {
        Self {
            clear_color: CLEAR_COLOR,
            program: BuiltinProgram::Simple.index(),
        }
    }
}

impl FrameOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program(&self) -> usize {
        self.program
    }

    pub fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }

    /// Renders and presents one frame of `scene`
    ///
    /// A failed draw skips the rest of the traversal. The draws recorded
    /// before it are still submitted and presented, the depth test is
    /// switched off, and the error is returned.
    ///
    /// # Returns
    /// Number of objects drawn
    pub fn render_scene<S: SceneView>(
        &self,
        scene: &S,
        context: &DeviceContext,
        assets: &AssetCache,
        pipelines: &mut PipelineManager,
        camera: &mut ViewMatrices,
    ) -> EngineResult<usize> {
        let user = scene
            .user(ACTIVE_USER)
            .ok_or(EngineError::NoActiveUser(ACTIVE_USER))?;
        camera.update_view(user.camera_position, user.camera_look_direction);

        let draws = collect_draws(scene);
        pipelines.begin_frame(draws.len());

        let mut frame = context.begin_scene(self.clear_color)?;

        context.turn_z_buffer_on();
        let view = camera.view();
        let projection = context.projection_matrix();
        let drawn = draws.iter().try_for_each(|draw| {
            let mesh = assets.model(draw.mesh_index);
            frame.bind_mesh(mesh);
            pipelines.render(
                self.program,
                &mut frame,
                draw.world,
                view,
                projection,
                mesh.index_count(),
            )
        });
        context.turn_z_buffer_off();

        present_after(drawn.map(|()| draws.len()), || context.end_scene(frame))
    }
}

/// Presents the frame whether or not its draws succeeded
///
/// Draws recorded before a failure stay in the submitted frame; the failure
/// is still handed back to the caller.
fn present_after<T>(drawn: EngineResult<T>, present: impl FnOnce()) -> EngineResult<T> {
    present();
    if let Err(err) = &drawn {
        log::error!("frame presented after a failed draw: {err}");
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::TiledScene;
    use cgmath::Vector4;

    #[test]
    fn draws_follow_tile_then_object_order() {
        let mut scene = TiledScene::new();
        scene.add_object((2, 0), Vector3::new(5.0, 0.0, 0.0), 3);
        scene.add_object((0, 1), Vector3::new(1.0, 0.0, 0.0), 1);
        scene.add_object((0, 1), Vector3::new(2.0, 0.0, 0.0), 2);

        let meshes: Vec<_> = collect_draws(&scene).iter().map(|d| d.mesh_index).collect();
        assert_eq!(meshes, vec![1, 2, 3]);
    }

    #[test]
    fn world_transform_only_translates() {
        let world = world_transform(Vector3::new(1.0, 2.0, 3.0));
        let corner = world * Vector4::new(0.5, -0.5, 0.0, 1.0);
        assert_eq!(corner, Vector4::new(1.5, 1.5, 3.0, 1.0));

        let direction = world * Vector4::new(0.0, 1.0, 0.0, 0.0);
        assert_eq!(direction, Vector4::new(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn failed_draws_still_present() {
        let mut presented = 0;
        let result = present_after(
            Err::<usize, _>(EngineError::UniformSlotsExhausted { capacity: 2 }),
            || presented += 1,
        );
        assert_eq!(presented, 1);
        assert!(matches!(
            result,
            Err(EngineError::UniformSlotsExhausted { capacity: 2 })
        ));

        let result = present_after(Ok(3), || presented += 1);
        assert_eq!(presented, 2);
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn empty_scene_has_no_draws() {
        assert!(collect_draws(&TiledScene::new()).is_empty());
    }

    #[test]
    fn defaults_use_first_builtin_and_magenta() {
        let orchestrator = FrameOrchestrator::new();
        assert_eq!(orchestrator.program(), 0);
        assert_eq!(orchestrator.clear_color(), CLEAR_COLOR);
    }
}
