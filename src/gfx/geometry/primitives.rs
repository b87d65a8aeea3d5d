//! # Procedural Meshes
//!
//! Small fixed meshes synthesized without file I/O. Kinds that have no
//! generator yet report [`EngineError::ProceduralNotImplemented`].

use super::MeshData;
use crate::{
    error::{EngineError, EngineResult},
    gfx::scene::vertex::ColorVertex,
};

const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];

/// Procedural mesh kinds, numbered as hosts pass them in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProceduralKind {
    Plane = 0,
    Triangle = 1,
    Cube = 2,
    Sphere = 3,
    Torus = 4,
}

impl TryFrom<u8> for ProceduralKind {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Plane),
            1 => Ok(Self::Triangle),
            2 => Ok(Self::Cube),
            3 => Ok(Self::Sphere),
            4 => Ok(Self::Torus),
            other => Err(EngineError::UnknownProceduralKind(other)),
        }
    }
}

/// Builds the mesh for `kind`
pub fn generate_procedural(kind: ProceduralKind) -> EngineResult<MeshData> {
    match kind {
        ProceduralKind::Plane => Ok(generate_plane()),
        ProceduralKind::Triangle => Ok(generate_triangle()),
        ProceduralKind::Cube | ProceduralKind::Sphere | ProceduralKind::Torus => {
            Err(EngineError::ProceduralNotImplemented(kind))
        }
    }
}

/// Unit quad in the XY plane: 4 vertices, 2 triangles sharing the 1-2 edge
pub fn generate_plane() -> MeshData {
    const HALF: f32 = 0.5;

    MeshData {
        vertices: vec![
            ColorVertex::new([-HALF, -HALF, 0.0], GREEN), // bottom left
            ColorVertex::new([-HALF, HALF, 0.0], GREEN),  // top left
            ColorVertex::new([HALF, -HALF, 0.0], GREEN),  // bottom right
            ColorVertex::new([HALF, HALF, 0.0], GREEN),   // top right
        ],
        indices: vec![0, 1, 2, 3, 2, 1],
        ..MeshData::default()
    }
}

/// Single triangle: bottom left, top middle, bottom right
pub fn generate_triangle() -> MeshData {
    MeshData {
        vertices: vec![
            ColorVertex::new([-1.0, -1.0, 0.0], GREEN),
            ColorVertex::new([0.0, 1.0, 0.0], GREEN),
            ColorVertex::new([1.0, -1.0, 0.0], GREEN),
        ],
        indices: vec![0, 1, 2],
        ..MeshData::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_generation() {
        let plane = generate_procedural(ProceduralKind::Plane).unwrap();
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.index_count(), 6);
        assert_eq!(plane.triangle_count(), 2);

        // the two triangles share exactly one edge
        let first: Vec<u32> = plane.indices[..3].to_vec();
        let shared = plane.indices[3..].iter().filter(|i| first.contains(i)).count();
        assert_eq!(shared, 2);
    }

    #[test]
    fn test_triangle_generation() {
        let triangle = generate_procedural(ProceduralKind::Triangle).unwrap();
        assert_eq!(triangle.vertex_count(), 3);
        assert_eq!(triangle.indices, vec![0, 1, 2]);
        assert_eq!(triangle.vertices[1].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_missing_generators_are_reported() {
        for kind in [ProceduralKind::Cube, ProceduralKind::Sphere, ProceduralKind::Torus] {
            let err = generate_procedural(kind).unwrap_err();
            assert!(matches!(err, EngineError::ProceduralNotImplemented(k) if k == kind));
        }
    }

    #[test]
    fn test_kind_from_u8() {
        assert_eq!(ProceduralKind::try_from(0).unwrap(), ProceduralKind::Plane);
        assert_eq!(ProceduralKind::try_from(4).unwrap(), ProceduralKind::Torus);
        assert!(matches!(
            ProceduralKind::try_from(9),
            Err(EngineError::UnknownProceduralKind(9))
        ));
    }
}
