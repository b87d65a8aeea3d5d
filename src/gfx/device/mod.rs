//! Device context and its supporting types
//!
//! - [`DeviceContext`] owns the wgpu device, surface and depth buffer
//! - [`GraphicSettings`] is the host-supplied configuration
//! - [`RenderState`] is the fixed-function state selected by the toggles
//! - [`Projections`] and [`DisplayModes`] hold what survives or is rebuilt on refresh

pub mod context;
pub mod display;
pub mod projection;
pub mod render_state;
pub mod settings;

pub use context::{DeviceContext, Frame, FrameEncoder};
pub use display::{DisplayModes, Presentation, Resolution};
pub use projection::Projections;
pub use render_state::{BlendMode, DepthTest, RasterMode, RenderState};
pub use settings::GraphicSettings;
