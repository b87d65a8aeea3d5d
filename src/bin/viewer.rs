//! Opens a window and draws a plane and a triangle, or the OBJ files given
//! on the command line, in a row in front of the camera.

use cgmath::Vector3;
use ubrot::{
    app::ViewerApp,
    gfx::{device::GraphicSettings, geometry::ProceduralKind},
    logging::{init_logging, LoggingConfig},
};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let models: Vec<String> = std::env::args().skip(1).collect();
    let settings = GraphicSettings::default()
        .with_fullscreen(false)
        .with_vsync(true)
        .with_size(1280, 720);

    ViewerApp::new(settings)
        .with_setup(move |engine, scene| {
            scene.add_user(Vector3::new(0.0, 0.0, -5.0), Vector3::unit_z());

            let mut meshes = vec![
                engine.register_procedural_model(ProceduralKind::Plane)?,
                engine.register_procedural_model(ProceduralKind::Triangle)?,
            ];
            for path in &models {
                meshes.push(engine.register_model(path)?);
            }

            for (column, mesh) in meshes.into_iter().enumerate() {
                let x = column as f32 * 2.5 - 1.25;
                scene.add_object((column as i32, 0), Vector3::new(x, 0.0, 0.0), mesh);
            }
            Ok(())
        })
        .run()
}
