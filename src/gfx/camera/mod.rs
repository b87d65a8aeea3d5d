//! Camera view matrices and the per-draw transform uniform

pub mod camera_utils;
pub mod view_matrix;

// Re-export main types
pub use camera_utils::MatrixUniform;
pub use view_matrix::{look_direction_from_euler, look_to_lh, ViewMatrices};
