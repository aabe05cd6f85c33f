//! STL (Stereolithography) load and save.
//!
//! The loader autodetects ASCII vs binary:
//! - ASCII files start with "solid" (after optional whitespace) and
//!   contain no null bytes in the first 80 bytes
//! - Binary files have an 80-byte header followed by a face count and
//!   50-byte triangle records
//!
//! Loaded faces keep their file winding; vertices are not welded, so a
//! freshly loaded mesh has three vertices per face (STL stores no
//! connectivity). Export recomputes face normals from the geometry
//! rather than trusting stored ones.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use holder_mesh::{Point3, TriMesh};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle record in binary STL (normal + 3 vertices +
/// attribute count).
const TRIANGLE_SIZE: usize = 50;

/// Load a mesh from an STL file, autodetecting ASCII vs binary.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its content is not
/// valid STL.
///
/// # Example
///
/// ```no_run
/// use holder_io::read_stl;
///
/// let hanger = read_stl("hangers/wall_mount.stl")?;
/// assert!(hanger.face_count() > 0);
/// # Ok::<(), holder_io::IoError>(())
/// ```
pub fn read_stl<P: AsRef<Path>>(path: P) -> IoResult<TriMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;

    let mut reader = BufReader::new(file);

    // Read enough to determine the format
    let mut header = [0u8; HEADER_SIZE + 4];
    let bytes_read = reader.read(&mut header)?;
    if bytes_read < 6 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }

    let header_text = String::from_utf8_lossy(&header[..bytes_read.min(HEADER_SIZE)]);
    let is_ascii = header_text.trim_start().starts_with("solid")
        && !header[..bytes_read.min(HEADER_SIZE)].contains(&0);

    let mesh = if is_ascii {
        // ASCII needs line-oriented parsing from the start
        drop(reader);
        let reopened = File::open(path)?;
        read_stl_ascii(BufReader::new(reopened))?
    } else {
        read_stl_binary(&header[..bytes_read], reader)?
    };

    debug!(
        path = %path.display(),
        faces = mesh.face_count(),
        ascii = is_ascii,
        "STL loaded"
    );
    Ok(mesh)
}

/// Read a binary STL given the already-consumed header bytes.
fn read_stl_binary<R: Read>(header: &[u8], mut reader: R) -> IoResult<TriMesh> {
    if header.len() < HEADER_SIZE + 4 {
        return Err(IoError::InvalidHeader {
            expected: HEADER_SIZE + 4,
            got: header.len(),
        });
    }

    let face_count = u32::from_le_bytes([
        header[HEADER_SIZE],
        header[HEADER_SIZE + 1],
        header[HEADER_SIZE + 2],
        header[HEADER_SIZE + 3],
    ]);

    let mut mesh = TriMesh::with_capacity((face_count as usize) * 3, face_count as usize);
    let mut record = [0u8; TRIANGLE_SIZE];

    for i in 0..face_count {
        let bytes_read = reader.read(&mut record)?;
        if bytes_read < TRIANGLE_SIZE {
            return Err(IoError::InvalidFaceCount {
                expected: face_count,
                got: i,
            });
        }

        // Skip the stored normal (12 bytes); it is often wrong anyway
        push_face(
            &mut mesh,
            read_point(&record[12..24]),
            read_point(&record[24..36]),
            read_point(&record[36..48]),
        );
    }

    Ok(mesh)
}

/// Read a point from 12 bytes (3 little-endian f32s).
fn read_point(buf: &[u8]) -> Point3<f64> {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Point3::new(f64::from(x), f64::from(y), f64::from(z))
}

fn read_stl_ascii<R: BufRead>(reader: R) -> IoResult<TriMesh> {
    let mut mesh = TriMesh::new();
    let mut in_loop = false;
    let mut corners: Vec<Point3<f64>> = Vec::with_capacity(3);

    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "outer" => {
                in_loop = true;
                corners.clear();
            }
            "vertex" if in_loop => {
                let mut coord = [0.0f64; 3];
                for value in &mut coord {
                    let text = parts.next().ok_or_else(|| {
                        IoError::invalid_content("vertex line with fewer than 3 coordinates")
                    })?;
                    *value = text.parse()?;
                }
                corners.push(Point3::new(coord[0], coord[1], coord[2]));
            }
            "endloop" => {
                in_loop = false;
            }
            "endfacet" => {
                if corners.len() == 3 {
                    push_face(&mut mesh, corners[0], corners[1], corners[2]);
                }
                corners.clear();
            }
            "endsolid" => break,
            // "solid", "facet", and unknown lines are skipped
            _ => {}
        }
    }

    Ok(mesh)
}

#[allow(clippy::cast_possible_truncation)]
fn push_face(mesh: &mut TriMesh, v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) {
    let base = mesh.vertices.len() as u32;
    mesh.vertices.push(v0);
    mesh.vertices.push(v1);
    mesh.vertices.push(v2);
    mesh.faces.push([base, base + 1, base + 2]);
}

/// Save a mesh as binary STL.
///
/// Face normals are recomputed from the vertex positions; degenerate
/// faces get a zero normal, which slicers tolerate.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use holder_io::{read_stl, write_stl_binary};
///
/// let mesh = read_stl("holder.stl")?;
/// write_stl_binary(&mesh, "holder_copy.stl")?;
/// # Ok::<(), holder_io::IoError>(())
/// ```
pub fn write_stl_binary<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    let mut header = [b' '; HEADER_SIZE];
    let label = b"Binary STL generated by holder-io";
    header[..label.len()].copy_from_slice(label);
    writer.write_all(&header)?;

    #[allow(clippy::cast_possible_truncation)]
    let face_count = mesh.faces.len() as u32;
    writer.write_all(&face_count.to_le_bytes())?;

    for tri in mesh.triangles() {
        let normal = tri.normal().unwrap_or_else(holder_mesh::Vector3::zeros);
        write_f32_triple(&mut writer, normal.x, normal.y, normal.z)?;
        write_f32_triple(&mut writer, tri.v0.x, tri.v0.y, tri.v0.z)?;
        write_f32_triple(&mut writer, tri.v1.x, tri.v1.y, tri.v1.z)?;
        write_f32_triple(&mut writer, tri.v2.x, tri.v2.y, tri.v2.z)?;
        writer.write_all(&0u16.to_le_bytes())?;
    }

    writer.flush()?;
    debug!(path = %path.as_ref().display(), faces = face_count, "STL written");
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn write_f32_triple<W: Write>(writer: &mut W, x: f64, y: f64, z: f64) -> IoResult<()> {
    writer.write_all(&(x as f32).to_le_bytes())?;
    writer.write_all(&(y as f32).to_le_bytes())?;
    writer.write_all(&(z as f32).to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use holder_mesh::{cuboid, Vector3};

    #[test]
    fn binary_roundtrip() {
        let original = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.stl");
        write_stl_binary(&original, &path).unwrap();

        let loaded = read_stl(&path).unwrap();
        assert_eq!(loaded.face_count(), original.face_count());
        // STL stores no connectivity: three vertices per face
        assert_eq!(loaded.vertex_count(), original.face_count() * 3);

        let b = loaded.bounds();
        assert!((b.min.x - (-1.0)).abs() < 1e-6);
        assert!((b.max.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ascii_parsing() {
        let ascii = b"solid test\n\
              facet normal 0 0 1\n\
                outer loop\n\
                  vertex 0 0 0\n\
                  vertex 1 0 0\n\
                  vertex 0 1 0\n\
                endloop\n\
              endfacet\n\
            endsolid test\n";

        let mesh = read_stl_ascii(BufReader::new(&ascii[..])).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert!((mesh.vertices[1].x - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ascii_file_autodetected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.stl");
        std::fs::write(
            &path,
            "solid tri\n facet normal 0 0 1\n  outer loop\n   vertex 0 0 0\n   vertex 2 0 0\n   vertex 0 2 0\n  endloop\n endfacet\nendsolid tri\n",
        )
        .unwrap();

        let mesh = read_stl(&path).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn missing_file_reported() {
        let result = read_stl("no_such_hanger_asset.stl");
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn truncated_binary_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.stl");

        // Header claims 5 faces but provides none
        let mut data = vec![0u8; HEADER_SIZE];
        data.extend_from_slice(&5u32.to_le_bytes());
        std::fs::write(&path, &data).unwrap();

        let result = read_stl(&path);
        assert!(matches!(
            result,
            Err(IoError::InvalidFaceCount { expected: 5, got: 0 })
        ));
    }

    #[test]
    fn tiny_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.stl");
        std::fs::write(&path, b"sol").unwrap();

        let result = read_stl(&path);
        assert!(matches!(result, Err(IoError::InvalidContent { .. })));
    }

    #[test]
    fn malformed_ascii_vertex_rejected() {
        let ascii = b"solid bad\n facet normal 0 0 1\n  outer loop\n   vertex 0 zero 0\n   vertex 1 0 0\n   vertex 0 1 0\n  endloop\n endfacet\nendsolid bad\n";

        let result = read_stl_ascii(BufReader::new(&ascii[..]));
        assert!(matches!(result, Err(IoError::ParseFloat(_))));
    }
}
