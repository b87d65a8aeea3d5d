//! Wavefront OBJ importer
//!
//! Reads a file twice: the first pass counts positions, texture coordinates,
//! normals and faces so the second pass can fill containers allocated to the
//! exact size. The second pass converts from the file's right-handed space to
//! the engine's left-handed one:
//!
//! - Z of every position and normal is negated
//! - texture V becomes `1 - v`
//! - the three corners of each face are taken in reverse order
//!
//! Every face yields three fresh vertices and the indices `3f, 3f+1, 3f+2`;
//! vertices are never shared between faces.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    error::{EngineError, EngineResult},
    gfx::{geometry::MeshData, scene::vertex::ColorVertex},
};

/// Element counts gathered by the first pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ObjCounts {
    pub positions: usize,
    pub tex_coords: usize,
    pub normals: usize,
    pub faces: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Position,
    TexCoord,
    Normal,
    Face,
    Other,
}

fn classify(line: &str) -> (LineKind, std::str::SplitWhitespace<'_>) {
    let mut tokens = line.split_whitespace();
    let kind = match tokens.next() {
        Some("v") => LineKind::Position,
        Some("vt") => LineKind::TexCoord,
        Some("vn") => LineKind::Normal,
        Some("f") => LineKind::Face,
        _ => LineKind::Other,
    };
    (kind, tokens)
}

impl ObjCounts {
    /// First pass: counts the element lines of an OBJ stream
    pub fn scan<R: BufRead>(reader: R, path: &Path) -> EngineResult<Self> {
        let mut counts = Self::default();

        for (number, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| malformed(path, number + 1, err.to_string()))?;
            match classify(&line).0 {
                LineKind::Position => counts.positions += 1,
                LineKind::TexCoord => counts.tex_coords += 1,
                LineKind::Normal => counts.normals += 1,
                LineKind::Face => counts.faces += 1,
                LineKind::Other => {}
            }
        }

        Ok(counts)
    }
}

/// One face corner as one-based indices from the file
#[derive(Debug, Clone, Copy)]
struct Corner {
    position: i64,
    tex_coord: Option<i64>,
    normal: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
struct Face {
    line: usize,
    /// Corners already in engine (reversed) order
    corners: [Corner; 3],
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> EngineError {
    EngineError::MalformedMesh {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

fn parse_floats<const N: usize>(
    mut tokens: std::str::SplitWhitespace<'_>,
    path: &Path,
    line: usize,
) -> EngineResult<[f32; N]> {
    let mut values = [0.0; N];
    for value in values.iter_mut() {
        let token = tokens
            .next()
            .ok_or_else(|| malformed(path, line, format!("expected {N} numbers")))?;
        *value = token
            .parse()
            .map_err(|_| malformed(path, line, format!("'{token}' is not a number")))?;
    }
    Ok(values)
}

fn parse_index(token: &str, path: &Path, line: usize) -> EngineResult<Option<i64>> {
    if token.is_empty() {
        return Ok(None);
    }
    token
        .parse::<i64>()
        .map(Some)
        .map_err(|_| malformed(path, line, format!("'{token}' is not an index")))
}

fn parse_corner(group: &str, path: &Path, line: usize) -> EngineResult<Corner> {
    let mut parts = group.split('/');
    let position = parse_index(parts.next().unwrap_or_default(), path, line)?
        .ok_or_else(|| malformed(path, line, format!("'{group}' has no position index")))?;
    let tex_coord = parse_index(parts.next().unwrap_or_default(), path, line)?;
    let normal = parse_index(parts.next().unwrap_or_default(), path, line)?;

    Ok(Corner {
        position,
        tex_coord,
        normal,
    })
}

fn parse_face(
    mut tokens: std::str::SplitWhitespace<'_>,
    path: &Path,
    line: usize,
) -> EngineResult<Face> {
    let mut groups = [""; 3];
    for group in groups.iter_mut() {
        *group = tokens
            .next()
            .ok_or_else(|| malformed(path, line, "faces need three corners"))?;
    }
    if tokens.next().is_some() {
        return Err(malformed(path, line, "only triangular faces are supported"));
    }

    let [first, second, third] = groups;
    Ok(Face {
        line,
        corners: [
            parse_corner(third, path, line)?,
            parse_corner(second, path, line)?,
            parse_corner(first, path, line)?,
        ],
    })
}

/// Resolves a one-based index against `items`
fn lookup<T: Copy>(items: &[T], index: i64, path: &Path, line: usize) -> EngineResult<T> {
    usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| items.get(i).copied())
        .ok_or_else(|| EngineError::FaceIndexOutOfRange {
            path: path.to_path_buf(),
            line,
            index,
            len: items.len(),
        })
}

fn push_counted<T>(
    items: &mut Vec<T>,
    counted: usize,
    item: T,
    path: &Path,
    line: usize,
) -> EngineResult<()> {
    if items.len() == counted {
        return Err(malformed(path, line, "file changed between import passes"));
    }
    items.push(item);
    Ok(())
}

/// Second pass: parses an OBJ stream into converted, face-expanded mesh data
///
/// # Arguments
/// * `reader` - The same content that produced `counts`
/// * `counts` - Result of [`ObjCounts::scan`]
/// * `path` - Source name used in errors
pub fn parse<R: BufRead>(reader: R, counts: ObjCounts, path: &Path) -> EngineResult<MeshData> {
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(counts.positions);
    let mut tex_coords: Vec<[f32; 2]> = Vec::with_capacity(counts.tex_coords);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(counts.normals);
    let mut faces: Vec<Face> = Vec::with_capacity(counts.faces);

    for (number, line) in reader.lines().enumerate() {
        let number = number + 1;
        let line = line.map_err(|err| malformed(path, number, err.to_string()))?;
        let (kind, tokens) = classify(&line);

        match kind {
            LineKind::Position => {
                let [x, y, z] = parse_floats::<3>(tokens, path, number)?;
                push_counted(&mut positions, counts.positions, [x, y, -z], path, number)?;
            }
            LineKind::TexCoord => {
                let [u, v] = parse_floats::<2>(tokens, path, number)?;
                push_counted(&mut tex_coords, counts.tex_coords, [u, 1.0 - v], path, number)?;
            }
            LineKind::Normal => {
                let [x, y, z] = parse_floats::<3>(tokens, path, number)?;
                push_counted(&mut normals, counts.normals, [x, y, -z], path, number)?;
            }
            LineKind::Face => {
                let face = parse_face(tokens, path, number)?;
                push_counted(&mut faces, counts.faces, face, path, number)?;
            }
            LineKind::Other => {}
        }
    }

    if positions.is_empty() || faces.is_empty() {
        return Err(EngineError::EmptyMesh {
            path: path.to_path_buf(),
            positions: positions.len(),
            faces: faces.len(),
        });
    }

    let mut mesh = MeshData::with_capacity(faces.len() * 3);
    for face in &faces {
        let corner_positions = face
            .corners
            .map(|corner| lookup(&positions, corner.position, path, face.line));
        let [a, b, c] = corner_positions;
        let corner_positions = [a?, b?, c?];

        // colour follows the face's first converted corner
        let [x, y, z] = corner_positions[0];
        let color = [x, y, z, 1.0];

        for (corner, position) in face.corners.iter().zip(corner_positions) {
            let tex_coord = match corner.tex_coord {
                Some(index) => lookup(&tex_coords, index, path, face.line)?,
                None => [0.0, 0.0],
            };
            let normal = match corner.normal {
                Some(index) => lookup(&normals, index, path, face.line)?,
                None => [0.0, 0.0, 0.0],
            };

            mesh.indices.push(mesh.vertices.len() as u32);
            mesh.vertices.push(ColorVertex::new(position, color));
            mesh.tex_coords.push(tex_coord);
            mesh.normals.push(normal);
        }
    }

    Ok(mesh)
}

fn open(path: &Path) -> EngineResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| EngineError::AssetNotFound {
            path: path.to_path_buf(),
            source,
        })
}

/// Imports an OBJ file from disk
///
/// Fails if the file cannot be opened, if it holds no positions or no
/// faces, or if a face refers to an element that does not exist.
pub fn import_obj(path: &Path) -> EngineResult<MeshData> {
    let counts = ObjCounts::scan(open(path)?, path)?;
    log::debug!(
        "'{}': {} positions, {} uvs, {} normals, {} faces",
        path.display(),
        counts.positions,
        counts.tex_coords,
        counts.normals,
        counts.faces
    );

    if counts.positions == 0 || counts.faces == 0 {
        return Err(EngineError::EmptyMesh {
            path: path.to_path_buf(),
            positions: counts.positions,
            faces: counts.faces,
        });
    }

    parse(open(path)?, counts, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const TRIANGLE: &str = "\
# one triangle
v 0.0 0.0 1.0
v 1.0 0.0 2.0
v 0.0 1.0 3.0
vt 0.0 0.25
vt 1.0 0.5
vt 0.0 1.0
vn 0.0 0.0 1.0
vn 0.0 1.0 0.5
vn 1.0 0.0 -1.0
f 1/1/1 2/2/2 3/3/3
";

    fn import_str(source: &str) -> EngineResult<MeshData> {
        let path = Path::new("memory.obj");
        let counts = ObjCounts::scan(source.as_bytes(), path)?;
        parse(source.as_bytes(), counts, path)
    }

    fn temp_obj(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "ubrot-importer-{}-{}.obj",
            std::process::id(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn counts_every_element_kind() {
        let counts = ObjCounts::scan(TRIANGLE.as_bytes(), Path::new("memory.obj")).unwrap();
        assert_eq!(
            counts,
            ObjCounts {
                positions: 3,
                tex_coords: 3,
                normals: 3,
                faces: 1,
            }
        );
    }

    #[test]
    fn face_corners_are_reversed_and_z_negated() {
        let mesh = import_str(TRIANGLE).unwrap();

        let positions: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![[0.0, 1.0, -3.0], [1.0, 0.0, -2.0], [0.0, 0.0, -1.0]]
        );
        assert_eq!(
            mesh.normals,
            vec![[1.0, 0.0, 1.0], [0.0, 1.0, -0.5], [0.0, 0.0, -1.0]]
        );
    }

    #[test]
    fn texture_v_is_flipped() {
        let mesh = import_str(TRIANGLE).unwrap();
        assert_eq!(mesh.tex_coords, vec![[0.0, 0.0], [1.0, 0.5], [0.0, 0.75]]);
    }

    #[test]
    fn colour_comes_from_first_converted_corner() {
        let mesh = import_str(TRIANGLE).unwrap();
        for vertex in &mesh.vertices {
            assert_eq!(vertex.color, [0.0, 1.0, -3.0, 1.0]);
        }
    }

    #[test]
    fn every_face_expands_to_three_fresh_vertices() {
        // 4 shared positions, 5 faces, few uvs and normals
        let source = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
f 1/1/1 3/1/1 4/1/1
f 4/1/1 3/1/1 2/1/1
f 2/1/1 1/1/1 4/1/1
f 1/1/1 1/1/1 1/1/1
";
        let mesh = import_str(source).unwrap();
        assert_eq!(mesh.vertex_count(), 15);
        assert_eq!(mesh.indices, (0..15).collect::<Vec<u32>>());
    }

    #[test]
    fn missing_texcoord_and_normal_default_to_zero() {
        let mesh = import_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2 3\nvn 0 0 1\n").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.tex_coords[0], [0.0, 0.0]);
        assert_eq!(mesh.normals[2], [0.0, 0.0, -1.0]);
        assert_eq!(mesh.normals[0], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn file_without_faces_is_empty() {
        let path = temp_obj("no-faces", "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\n");
        let err = import_obj(&path).unwrap_err();
        assert!(matches!(err, EngineError::EmptyMesh { positions: 3, faces: 0, .. }));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = import_obj(Path::new("definitely/not/here.obj")).unwrap_err();
        assert!(matches!(err, EngineError::AssetNotFound { .. }));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = import_str("v 0 0 0\nv 1 0 0\nf 1/1/1 2/1/1 3/1/1\n").unwrap_err();
        assert!(matches!(
            err,
            EngineError::FaceIndexOutOfRange { index: 3, len: 2, line: 3, .. }
        ));
    }

    #[test]
    fn malformed_numbers_report_their_line() {
        let err = import_str("v 0 0 0\nv 1 zero 0\n").unwrap_err();
        assert!(matches!(err, EngineError::MalformedMesh { line: 2, .. }));
    }

    #[test]
    fn stale_counts_are_detected() {
        let counts = ObjCounts {
            positions: 1,
            tex_coords: 0,
            normals: 0,
            faces: 1,
        };
        let err = parse(TRIANGLE.as_bytes(), counts, Path::new("memory.obj")).unwrap_err();
        assert!(matches!(err, EngineError::MalformedMesh { line: 3, .. }));
    }

    #[test]
    fn imports_from_disk() {
        let path = temp_obj("triangle", TRIANGLE);
        let mesh = import_obj(&path).unwrap();
        assert_eq!(mesh.index_count(), 3);
        std::fs::remove_file(path).ok();
    }
}
