//! Indexed triangle mesh.

use crate::{Aabb, Transform3D, Triangle};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh.
///
/// This is the primary mesh type for the holder pipeline. It stores vertex
/// positions and faces separately, with faces referencing vertices by index.
///
/// # Memory Layout
///
/// - `vertices`: `Vec<Point3<f64>>` - Vertex positions
/// - `faces`: `Vec<[u32; 3]>` - Triangle faces as vertex indices
///
/// # Winding Order
///
/// Faces use **counter-clockwise (CCW) winding** when viewed from outside.
/// This means normals point outward by the right-hand rule.
///
/// # Example
///
/// ```
/// use holder_mesh::{TriMesh, Point3};
///
/// // Create a single triangle
/// let mut mesh = TriMesh::new();
/// mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is `[v0, v1, v2]` with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    ///
    /// # Example
    ///
    /// ```
    /// use holder_mesh::{TriMesh, Point3};
    ///
    /// let vertices = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let mesh = TriMesh::from_parts(vertices, vec![[0, 1, 2]]);
    /// assert_eq!(mesh.face_count(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Get the number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces (triangles).
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no vertices or no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Get a triangle by face index with resolved vertex positions.
    ///
    /// Returns `None` if the face index is out of bounds.
    #[must_use]
    pub fn triangle(&self, face_index: usize) -> Option<Triangle> {
        self.faces.get(face_index).map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize],
            v1: self.vertices[i1 as usize],
            v2: self.vertices[i2 as usize],
        })
    }

    /// Iterate over all triangles with resolved vertex positions.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize],
            v1: self.vertices[i1 as usize],
            v2: self.vertices[i2 as usize],
        })
    }

    /// Compute the axis-aligned bounding box of all vertices.
    ///
    /// Returns an empty AABB if the mesh has no vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter())
    }

    /// Check that every face index references a valid vertex.
    #[must_use]
    pub fn indices_valid(&self) -> bool {
        let n = self.vertices.len();
        self.faces
            .iter()
            .all(|f| f.iter().all(|&i| (i as usize) < n))
    }

    /// Translate the mesh by the given vector.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Scale the mesh uniformly around the origin.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.vertices {
            v.coords *= factor;
        }
    }

    /// Apply a transformation to all vertices in place.
    pub fn transform(&mut self, transform: &Transform3D) {
        for v in &mut self.vertices {
            *v = transform.transform_point(*v);
        }
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Uses the divergence theorem: the signed volume is the sum of signed
    /// tetrahedra volumes formed by each face and the origin.
    ///
    /// # Returns
    ///
    /// - Positive value: normals point outward (correct orientation)
    /// - Negative value: normals point inward (inside-out mesh)
    /// - Near-zero: mesh is not closed or has inconsistent winding
    ///
    /// # Note
    ///
    /// This assumes the mesh is closed (watertight). For open meshes the
    /// result is not meaningful as a volume measurement.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let v0 = &self.vertices[i0 as usize];
            let v1 = &self.vertices[i1 as usize];
            let v2 = &self.vertices[i2 as usize];

            // Signed volume of tetrahedron with origin = (v0 · (v1 × v2)) / 6
            let cross = Vector3::new(
                v1.y.mul_add(v2.z, -(v1.z * v2.y)),
                v1.z.mul_add(v2.x, -(v1.x * v2.z)),
                v1.x.mul_add(v2.y, -(v1.y * v2.x)),
            );
            volume += v0.z.mul_add(cross.z, v0.x.mul_add(cross.x, v0.y * cross.y));
        }

        volume / 6.0
    }

    /// Compute the absolute volume of the mesh.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Check if the mesh appears to be inside-out.
    ///
    /// A closed mesh is considered inside-out if its signed volume is negative.
    #[inline]
    #[must_use]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume() < 0.0
    }

    /// Compute the total surface area of the mesh.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }

    /// Flip all face normals by reversing winding order.
    pub fn flip_normals(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
    }

    /// Merge another mesh into this one.
    ///
    /// The other mesh's vertices and faces are appended, with face indices
    /// offset appropriately. No vertex welding is performed.
    ///
    /// # Note
    ///
    /// Vertex indices are u32, so meshes beyond ~4 billion vertices are
    /// unsupported by design.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &Self) {
        let vertex_offset = self.vertices.len() as u32;

        self.vertices.extend(other.vertices.iter().copied());

        for face in &other.faces {
            self.faces.push([
                face[0] + vertex_offset,
                face[1] + vertex_offset,
                face[2] + vertex_offset,
            ]);
        }
    }
}

/// Create an axis-aligned cuboid mesh from its center and full extents.
///
/// The cuboid has 8 vertices and 12 triangles with outward-facing normals
/// (CCW winding viewed from outside). The clip and port stages of the
/// pipeline build their synthetic cutting/union solids with this.
///
/// # Example
///
/// ```
/// use holder_mesh::{cuboid, Point3, Vector3};
///
/// let c = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));
/// assert_eq!(c.vertex_count(), 8);
/// assert_eq!(c.face_count(), 12);
/// assert!((c.volume() - 8.0).abs() < 1e-10);
/// ```
#[must_use]
pub fn cuboid(center: Point3<f64>, extents: Vector3<f64>) -> TriMesh {
    let h = extents / 2.0;
    let mut mesh = TriMesh::with_capacity(8, 12);

    mesh.vertices
        .push(Point3::new(center.x - h.x, center.y - h.y, center.z - h.z)); // 0
    mesh.vertices
        .push(Point3::new(center.x + h.x, center.y - h.y, center.z - h.z)); // 1
    mesh.vertices
        .push(Point3::new(center.x + h.x, center.y + h.y, center.z - h.z)); // 2
    mesh.vertices
        .push(Point3::new(center.x - h.x, center.y + h.y, center.z - h.z)); // 3
    mesh.vertices
        .push(Point3::new(center.x - h.x, center.y - h.y, center.z + h.z)); // 4
    mesh.vertices
        .push(Point3::new(center.x + h.x, center.y - h.y, center.z + h.z)); // 5
    mesh.vertices
        .push(Point3::new(center.x + h.x, center.y + h.y, center.z + h.z)); // 6
    mesh.vertices
        .push(Point3::new(center.x - h.x, center.y + h.y, center.z + h.z)); // 7

    // Bottom face (z = -h) - normal points -Z
    mesh.faces.push([0, 2, 1]);
    mesh.faces.push([0, 3, 2]);

    // Top face (z = +h) - normal points +Z
    mesh.faces.push([4, 5, 6]);
    mesh.faces.push([4, 6, 7]);

    // Front face (y = -h) - normal points -Y
    mesh.faces.push([0, 1, 5]);
    mesh.faces.push([0, 5, 4]);

    // Back face (y = +h) - normal points +Y
    mesh.faces.push([3, 7, 6]);
    mesh.faces.push([3, 6, 2]);

    // Left face (x = -h) - normal points -X
    mesh.faces.push([0, 4, 7]);
    mesh.faces.push([0, 7, 3]);

    // Right face (x = +h) - normal points +X
    mesh.faces.push([1, 2, 6]);
    mesh.faces.push([1, 6, 5]);

    mesh
}

/// Create an icosphere mesh centered at the origin.
///
/// Starts from a regular icosahedron and subdivides each face `subdivisions`
/// times, projecting every new vertex back onto the sphere surface. Each
/// subdivision quadruples the face count (20, 80, 320, 1280, ...).
///
/// The result is closed, manifold, and wound outward, which makes it a
/// convenient well-behaved source solid for tests and benchmarks.
///
/// # Example
///
/// ```
/// use holder_mesh::icosphere;
///
/// let sphere = icosphere(5.0, 2);
/// assert_eq!(sphere.face_count(), 320);
/// assert!((sphere.bounds().max.z - 5.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn icosphere(radius: f64, subdivisions: u32) -> TriMesh {
    let phi = f64::midpoint(1.0, 5.0_f64.sqrt());
    let a = 1.0;
    let b = 1.0 / phi;

    let raw = [
        [0.0, b, -a],
        [b, a, 0.0],
        [-b, a, 0.0],
        [0.0, b, a],
        [0.0, -b, a],
        [-a, 0.0, b],
        [0.0, -b, -a],
        [a, 0.0, -b],
        [a, 0.0, b],
        [-a, 0.0, -b],
        [b, -a, 0.0],
        [-b, -a, 0.0],
    ];

    let mut mesh = TriMesh::with_capacity(12, 20);
    for [x, y, z] in raw {
        let scale = radius / z.mul_add(z, x.mul_add(x, y * y)).sqrt();
        mesh.vertices
            .push(Point3::new(x * scale, y * scale, z * scale));
    }

    mesh.faces.extend_from_slice(&[
        [0, 1, 2],
        [3, 2, 1],
        [3, 4, 5],
        [3, 8, 4],
        [0, 6, 7],
        [0, 9, 6],
        [4, 10, 11],
        [6, 11, 10],
        [2, 5, 9],
        [11, 9, 5],
        [1, 7, 8],
        [10, 8, 7],
        [3, 5, 2],
        [3, 1, 8],
        [0, 2, 9],
        [0, 7, 1],
        [6, 9, 11],
        [6, 10, 7],
        [4, 11, 5],
        [4, 8, 10],
    ]);

    for _ in 0..subdivisions {
        mesh = subdivide_on_sphere(&mesh, radius);
    }

    mesh
}

/// Split every face into four, projecting new edge midpoints onto the sphere.
fn subdivide_on_sphere(mesh: &TriMesh, radius: f64) -> TriMesh {
    let mut vertices = mesh.vertices.clone();
    let mut faces = Vec::with_capacity(mesh.face_count() * 4);
    let mut midpoint_cache: HashMap<(u32, u32), u32> = HashMap::new();

    for &[v0, v1, v2] in &mesh.faces {
        let m01 = sphere_midpoint(v0, v1, radius, &mut vertices, &mut midpoint_cache);
        let m12 = sphere_midpoint(v1, v2, radius, &mut vertices, &mut midpoint_cache);
        let m20 = sphere_midpoint(v2, v0, radius, &mut vertices, &mut midpoint_cache);

        faces.push([v0, m01, m20]);
        faces.push([v1, m12, m01]);
        faces.push([v2, m20, m12]);
        faces.push([m01, m12, m20]);
    }

    TriMesh::from_parts(vertices, faces)
}

/// Midpoint of an edge pushed out to the sphere, deduplicated across the
/// two faces sharing the edge.
#[allow(clippy::cast_possible_truncation)]
fn sphere_midpoint(
    v0: u32,
    v1: u32,
    radius: f64,
    vertices: &mut Vec<Point3<f64>>,
    cache: &mut HashMap<(u32, u32), u32>,
) -> u32 {
    let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
    if let Some(&index) = cache.get(&key) {
        return index;
    }

    let mid = nalgebra::center(&vertices[v0 as usize], &vertices[v1 as usize]);
    let on_sphere = mid.coords * (radius / mid.coords.norm());

    let index = vertices.len() as u32;
    vertices.push(Point3::from(on_sphere));
    cache.insert(key, index);
    index
}
