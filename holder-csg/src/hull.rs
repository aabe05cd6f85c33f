//! 3D convex hull computation using the quickhull algorithm.
//!
//! Builds an initial tetrahedron from extreme points, then repeatedly
//! expands the hull toward the farthest remaining point until every input
//! point lies inside. Conflict lists (points outside each face) keep the
//! iteration near O(n log n) for well-distributed inputs.

use crate::error::{CsgError, CsgResult};
use hashbrown::{HashMap, HashSet};
use holder_mesh::{Point3, TriMesh, Vector3};
use tracing::debug;

/// Points closer than this to a face plane count as on the hull surface.
const HULL_EPSILON: f64 = 1e-9;

/// Compute the convex hull of a mesh's vertices.
///
/// The mesh's faces are ignored; only vertex positions feed the hull. The
/// result is a closed mesh with outward-facing normals.
///
/// # Errors
///
/// Returns [`CsgError::DegenerateGeometry`] if the vertices do not span a
/// volume (fewer than 4 distinct points, or all collinear/coplanar).
///
/// # Example
///
/// ```
/// use holder_csg::convex_hull;
/// use holder_mesh::{cuboid, Point3, Vector3};
///
/// let c = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));
/// let hull = convex_hull(&c)?;
/// assert_eq!(hull.vertex_count(), 8);
/// assert_eq!(hull.face_count(), 12);
/// # Ok::<(), holder_csg::CsgError>(())
/// ```
pub fn convex_hull(mesh: &holder_mesh::TriMesh) -> CsgResult<TriMesh> {
    convex_hull_of_points(&mesh.vertices)
}

/// Compute the convex hull of a point set.
///
/// # Errors
///
/// Returns [`CsgError::DegenerateGeometry`] if the points do not span a
/// volume.
pub fn convex_hull_of_points(points: &[Point3<f64>]) -> CsgResult<TriMesh> {
    if points.len() < 4 {
        return Err(CsgError::DegenerateGeometry {
            details: format!("convex hull needs at least 4 points, got {}", points.len()),
        });
    }

    let unique = dedup_points(points);
    if unique.len() < 4 {
        return Err(CsgError::DegenerateGeometry {
            details: format!(
                "convex hull needs at least 4 distinct points, got {}",
                unique.len()
            ),
        });
    }

    let mut faces = initial_simplex(&unique)?;
    grow_hull(&mut faces, &unique)?;

    let hull = faces_to_mesh(&faces, &unique);
    if hull.face_count() < 4 {
        return Err(CsgError::DegenerateGeometry {
            details: format!("hull collapsed to {} faces", hull.face_count()),
        });
    }

    debug!(
        input_points = points.len(),
        hull_vertices = hull.vertex_count(),
        hull_faces = hull.face_count(),
        "convex hull built"
    );

    Ok(hull)
}

/// A face of the growing hull.
#[derive(Debug, Clone)]
struct HullFace {
    /// Vertex indices into the deduplicated point array.
    vertices: [usize; 3],
    /// Outward unit normal.
    normal: Vector3<f64>,
    /// Plane offset: `normal . p = offset` for points p on the face plane.
    offset: f64,
    /// Conflict list: input points strictly outside this face.
    outside: Vec<usize>,
}

impl HullFace {
    fn new(v0: usize, v1: usize, v2: usize, points: &[Point3<f64>]) -> CsgResult<Self> {
        let p0 = points[v0];
        let cross = (points[v1] - p0).cross(&(points[v2] - p0));
        let length = cross.norm();

        if length < 1e-12 {
            return Err(CsgError::DegenerateGeometry {
                details: "hull face has near-zero area".to_string(),
            });
        }

        let normal = cross / length;
        Ok(Self {
            vertices: [v0, v1, v2],
            normal,
            offset: normal.dot(&p0.coords),
            outside: Vec::new(),
        })
    }

    fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    fn is_outside(&self, point: &Point3<f64>) -> bool {
        self.signed_distance(point) > HULL_EPSILON
    }

    /// Farthest point in this face's conflict list.
    fn farthest_conflict(&self, points: &[Point3<f64>]) -> Option<usize> {
        self.outside
            .iter()
            .max_by(|&&a, &&b| {
                let da = self.signed_distance(&points[a]);
                let db = self.signed_distance(&points[b]);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .copied()
    }
}

/// Remove duplicate points within [`HULL_EPSILON`] using a spatial grid.
fn dedup_points(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    let cell_size = HULL_EPSILON * 2.0;
    let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    let mut unique: Vec<Point3<f64>> = Vec::with_capacity(points.len());

    for point in points {
        let cell = grid_cell(point, cell_size);
        let mut duplicate = false;

        'scan: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (cell.0 + dx, cell.1 + dy, cell.2 + dz);
                    if let Some(candidates) = grid.get(&neighbor) {
                        for &idx in candidates {
                            if (unique[idx] - point).norm() < HULL_EPSILON {
                                duplicate = true;
                                break 'scan;
                            }
                        }
                    }
                }
            }
        }

        if !duplicate {
            grid.entry(cell).or_default().push(unique.len());
            unique.push(*point);
        }
    }

    unique
}

#[allow(clippy::cast_possible_truncation)]
fn grid_cell(point: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (point.x / cell_size).floor() as i64,
        (point.y / cell_size).floor() as i64,
        (point.z / cell_size).floor() as i64,
    )
}

/// Build the initial tetrahedron from extreme points and assign every
/// remaining point to the conflict list of the first face it is outside of.
fn initial_simplex(points: &[Point3<f64>]) -> CsgResult<Vec<HullFace>> {
    let mut min_idx = [0usize; 3];
    let mut max_idx = [0usize; 3];

    for (i, p) in points.iter().enumerate() {
        for axis in 0..3 {
            if p[axis] < points[min_idx[axis]][axis] {
                min_idx[axis] = i;
            }
            if p[axis] > points[max_idx[axis]][axis] {
                max_idx[axis] = i;
            }
        }
    }

    let extremes = [
        min_idx[0], max_idx[0], min_idx[1], max_idx[1], min_idx[2], max_idx[2],
    ];
    let (p0, p1) = farthest_pair(&extremes, points)?;
    let p2 = farthest_from_line(p0, p1, points)?;
    let p3 = farthest_from_plane(p0, p1, p2, points)?;

    let centroid = Point3::from(
        (points[p0].coords + points[p1].coords + points[p2].coords + points[p3].coords) / 4.0,
    );

    let mut faces = vec![
        oriented_face(p0, p1, p2, &centroid, points)?,
        oriented_face(p0, p2, p3, &centroid, points)?,
        oriented_face(p0, p3, p1, &centroid, points)?,
        oriented_face(p1, p3, p2, &centroid, points)?,
    ];

    let used: HashSet<usize> = [p0, p1, p2, p3].into_iter().collect();
    for idx in 0..points.len() {
        if used.contains(&idx) {
            continue;
        }
        for face in &mut faces {
            if face.is_outside(&points[idx]) {
                face.outside.push(idx);
                break;
            }
        }
    }

    Ok(faces)
}

/// The pair of candidate indices with maximum separation.
fn farthest_pair(indices: &[usize], points: &[Point3<f64>]) -> CsgResult<(usize, usize)> {
    let mut max_dist_sq = 0.0;
    let mut best = (indices[0], indices[1]);

    for (i, &a) in indices.iter().enumerate() {
        for &b in indices.iter().skip(i + 1) {
            let dist_sq = (points[a] - points[b]).norm_squared();
            if dist_sq > max_dist_sq {
                max_dist_sq = dist_sq;
                best = (a, b);
            }
        }
    }

    if max_dist_sq <= HULL_EPSILON * HULL_EPSILON {
        return Err(CsgError::DegenerateGeometry {
            details: "all input points are coincident".to_string(),
        });
    }
    Ok(best)
}

fn farthest_from_line(p0: usize, p1: usize, points: &[Point3<f64>]) -> CsgResult<usize> {
    let line_dir = (points[p1] - points[p0]).normalize();
    let mut max_dist = HULL_EPSILON;
    let mut best = None;

    for (i, p) in points.iter().enumerate() {
        if i == p0 || i == p1 {
            continue;
        }
        let v = p - points[p0];
        let off_line = v - v.dot(&line_dir) * line_dir;
        let dist = off_line.norm();
        if dist > max_dist {
            max_dist = dist;
            best = Some(i);
        }
    }

    best.ok_or_else(|| CsgError::DegenerateGeometry {
        details: "all input points are collinear".to_string(),
    })
}

fn farthest_from_plane(
    p0: usize,
    p1: usize,
    p2: usize,
    points: &[Point3<f64>],
) -> CsgResult<usize> {
    let normal = (points[p1] - points[p0])
        .cross(&(points[p2] - points[p0]))
        .normalize();
    let mut max_dist = HULL_EPSILON;
    let mut best = None;

    for (i, p) in points.iter().enumerate() {
        if i == p0 || i == p1 || i == p2 {
            continue;
        }
        let dist = normal.dot(&(p - points[p0])).abs();
        if dist > max_dist {
            max_dist = dist;
            best = Some(i);
        }
    }

    best.ok_or_else(|| CsgError::DegenerateGeometry {
        details: "all input points are coplanar".to_string(),
    })
}

/// Create a face wound so its normal points away from the interior point.
fn oriented_face(
    v0: usize,
    v1: usize,
    v2: usize,
    interior: &Point3<f64>,
    points: &[Point3<f64>],
) -> CsgResult<HullFace> {
    let face = HullFace::new(v0, v1, v2, points)?;
    let face_center =
        Point3::from((points[v0].coords + points[v1].coords + points[v2].coords) / 3.0);

    if face.normal.dot(&(interior - face_center)) > 0.0 {
        HullFace::new(v0, v2, v1, points)
    } else {
        Ok(face)
    }
}

/// Expand the hull until no conflict list has points left.
fn grow_hull(faces: &mut Vec<HullFace>, points: &[Point3<f64>]) -> CsgResult<()> {
    // Each round retires one point onto the hull, so this bound is generous.
    let max_rounds = points.len() * 2 + 8;

    for _ in 0..max_rounds {
        let face_idx = match faces.iter().position(|f| !f.outside.is_empty()) {
            Some(idx) => idx,
            None => return Ok(()),
        };

        let far = match faces[face_idx].farthest_conflict(points) {
            Some(idx) => idx,
            None => continue,
        };

        let visible: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_outside(&points[far]))
            .map(|(i, _)| i)
            .collect();

        let horizon = horizon_edges(faces, &visible);

        // Conflict points of visible faces must be redistributed
        let mut orphaned: Vec<usize> = Vec::new();
        for &vi in &visible {
            orphaned.extend_from_slice(&faces[vi].outside);
        }
        orphaned.retain(|&p| p != far);

        // Remove visible faces in reverse order to keep indices valid
        let mut doomed = visible;
        doomed.sort_unstable_by(|a, b| b.cmp(a));
        for idx in doomed {
            faces.swap_remove(idx);
        }

        if faces.is_empty() {
            return Err(CsgError::DegenerateGeometry {
                details: "hull iteration removed every face".to_string(),
            });
        }

        let interior = interior_reference(faces, points);
        for (a, b) in horizon {
            let new_face = oriented_face(a, b, far, &interior, points)?;
            faces.push(new_face);
        }

        for &idx in &orphaned {
            for face in faces.iter_mut() {
                if face.is_outside(&points[idx]) {
                    face.outside.push(idx);
                    break;
                }
            }
        }
    }

    Err(CsgError::DegenerateGeometry {
        details: "hull construction did not converge".to_string(),
    })
}

/// Edges of visible faces not shared with another visible face, in the
/// winding order of the visible face that owns them.
fn horizon_edges(faces: &[HullFace], visible: &[usize]) -> Vec<(usize, usize)> {
    let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();

    for &vi in visible {
        let [a, b, c] = faces[vi].vertices;
        for (s, t) in [(a, b), (b, c), (c, a)] {
            let key = if s < t { (s, t) } else { (t, s) };
            *edge_count.entry(key).or_insert(0) += 1;
        }
    }

    let mut horizon = Vec::new();
    for &vi in visible {
        let [a, b, c] = faces[vi].vertices;
        for (s, t) in [(a, b), (b, c), (c, a)] {
            let key = if s < t { (s, t) } else { (t, s) };
            if edge_count.get(&key).copied() == Some(1) {
                horizon.push((s, t));
            }
        }
    }

    horizon
}

/// A point inside the current hull, used to orient newly created faces.
fn interior_reference(faces: &[HullFace], points: &[Point3<f64>]) -> Point3<f64> {
    let mut sum = Vector3::zeros();
    let mut seen: HashSet<usize> = HashSet::new();

    for face in faces {
        for &v in &face.vertices {
            if seen.insert(v) {
                sum += points[v].coords;
            }
        }
    }

    Point3::from(sum / seen.len().max(1) as f64)
}

/// Compact the final faces into a mesh, dropping unreferenced points.
#[allow(clippy::cast_possible_truncation)]
fn faces_to_mesh(faces: &[HullFace], points: &[Point3<f64>]) -> TriMesh {
    let mut vertex_map: HashMap<usize, u32> = HashMap::new();
    let mut hull = TriMesh::with_capacity(faces.len(), faces.len());

    for face in faces {
        let mapped = face.vertices.map(|v| {
            *vertex_map.entry(v).or_insert_with(|| {
                let idx = hull.vertices.len() as u32;
                hull.vertices.push(points[v]);
                idx
            })
        });
        hull.faces.push(mapped);
    }

    hull
}
