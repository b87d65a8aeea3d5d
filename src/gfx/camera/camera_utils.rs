use cgmath::{Matrix4, SquareMatrix};

/// Per-draw transform block read by the vertex stage
///
/// Mirrors `struct Matrices` in `color.vert.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct MatrixUniform {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl Default for MatrixUniform {
    fn default() -> Self {
        let identity = convert_matrix4_to_array(Matrix4::identity());
        Self {
            world: identity,
            view: identity,
            projection: identity,
        }
    }
}

impl MatrixUniform {
    pub fn new(world: Matrix4<f32>, view: Matrix4<f32>, projection: Matrix4<f32>) -> Self {
        Self {
            world: convert_matrix4_to_array(world),
            view: convert_matrix4_to_array(view),
            projection: convert_matrix4_to_array(projection),
        }
    }
}

/// Lays a matrix out column by column, the order WGSL reads `mat4x4<f32>` in
pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_lands_in_last_column() {
        let m = Matrix4::from_translation(cgmath::Vector3::new(1.0, 2.0, 3.0));
        let columns = convert_matrix4_to_array(m);
        assert_eq!(columns[3], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn uniform_is_three_packed_matrices() {
        assert_eq!(std::mem::size_of::<MatrixUniform>(), 192);
    }
}
