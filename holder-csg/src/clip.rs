//! Plane clipping with cap reconstruction.
//!
//! [`clip_above`] realizes a boolean difference against a half-space: the
//! subtracted volume is an oversized cuboid whose bottom face sits at the
//! clip height, so everything above the plane is removed. Straddling
//! triangles are split at the plane and the resulting cross-section is
//! closed with a flat cap, keeping a closed input solid closed.

use crate::error::{CsgError, CsgResult};
use hashbrown::{HashMap, HashSet};
use holder_mesh::TriMesh;
use smallvec::SmallVec;
use tracing::debug;

/// Tolerance for classifying vertices against the clip plane.
const PLANE_EPSILON: f64 = 1e-9;

/// Vertex position relative to the clip plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Above,
    On,
    Below,
}

fn side_of(z: f64, plane_z: f64) -> Side {
    let d = z - plane_z;
    if d > PLANE_EPSILON {
        Side::Above
    } else if d < -PLANE_EPSILON {
        Side::Below
    } else {
        Side::On
    }
}

/// Identity of a point on the clip plane.
///
/// Cut points are keyed by the mesh edge that produced them, so the two
/// triangles sharing a cut edge agree exactly on the cap boundary and no
/// positional welding is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum PlanePoint {
    /// An original mesh vertex lying on the plane.
    Vertex(u32),
    /// Intersection of the mesh edge `(lo, hi)` with the plane.
    EdgeCut(u32, u32),
}

const fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Remove all geometry above the horizontal plane `z = plane_z` and close
/// the opening with a flat cap.
///
/// Faces lying exactly in the clip plane are dropped and rebuilt as part
/// of the cap, so a plane coincident with a flat top face leaves the solid
/// unchanged up to retriangulation.
///
/// # Errors
///
/// - [`CsgError::EmptyMesh`] if the input has no geometry
/// - [`CsgError::EmptyResult`] if the entire mesh lies above the plane
/// - [`CsgError::OpenCrossSection`] if the cross-section does not close
///   into loops, which indicates an open or non-manifold input
/// - [`CsgError::DegenerateGeometry`] if a cap loop cannot be
///   triangulated (collinear or self-intersecting cross-section)
///
/// # Example
///
/// ```
/// use holder_csg::clip_above;
/// use holder_mesh::{cuboid, Point3, Vector3};
///
/// let solid = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));
/// let clipped = clip_above(&solid, 0.5)?;
///
/// assert!(clipped.vertices.iter().all(|v| v.z <= 0.5 + 1e-9));
/// assert!((clipped.volume() - 6.0).abs() < 1e-9);
/// # Ok::<(), holder_csg::CsgError>(())
/// ```
pub fn clip_above(mesh: &TriMesh, plane_z: f64) -> CsgResult<TriMesh> {
    if mesh.is_empty() {
        return Err(CsgError::EmptyMesh {
            details: "clip input has no geometry".to_string(),
        });
    }

    let sides: Vec<Side> = mesh
        .vertices
        .iter()
        .map(|v| side_of(v.z, plane_z))
        .collect();

    let mut builder = ClipBuilder::new(mesh, plane_z);
    let mut segments: Vec<(PlanePoint, PlanePoint)> = Vec::new();
    let mut kept = 0usize;
    let mut split = 0usize;
    let mut dropped = 0usize;

    for face in &mesh.faces {
        let face_sides = [
            sides[face[0] as usize],
            sides[face[1] as usize],
            sides[face[2] as usize],
        ];
        let above = face_sides.iter().filter(|s| **s == Side::Above).count();
        let below = face_sides.iter().filter(|s| **s == Side::Below).count();

        if above == 0 && below > 0 {
            builder.push_original_face(face);
            kept += 1;

            if below == 1 {
                // A kept face resting an edge on the plane contributes
                // that edge to the cap boundary
                let mut on_pair: SmallVec<[u32; 2]> = SmallVec::new();
                for (i, side) in face_sides.iter().enumerate() {
                    if *side == Side::On {
                        on_pair.push(face[i]);
                    }
                }
                if on_pair.len() == 2 {
                    segments.push((
                        PlanePoint::Vertex(on_pair[0]),
                        PlanePoint::Vertex(on_pair[1]),
                    ));
                }
            }
        } else if below == 0 {
            // Entirely above the plane, or flat in it; the cap re-covers
            // flat faces
            dropped += 1;
        } else {
            split += 1;
            let chord = builder.push_split_face(face, &face_sides);
            segments.push(chord);
        }
    }

    let cap_faces = build_cap(&segments, &mut builder)?;

    let result = builder.finish();
    if result.is_empty() {
        return Err(CsgError::EmptyResult {
            details: format!("entire mesh lies above the clip plane z = {plane_z}"),
        });
    }

    debug!(kept, split, dropped, cap_faces, plane_z, "mesh clipped");
    Ok(result)
}

/// Accumulates the clipped mesh, deduplicating vertices across faces.
struct ClipBuilder<'a> {
    source: &'a TriMesh,
    plane_z: f64,
    result: TriMesh,
    /// Original vertex index to result index.
    vertex_map: HashMap<u32, u32>,
    /// Cut edge `(lo, hi)` to result index of its plane intersection.
    cut_map: HashMap<(u32, u32), u32>,
}

impl<'a> ClipBuilder<'a> {
    fn new(source: &'a TriMesh, plane_z: f64) -> Self {
        Self {
            source,
            plane_z,
            result: TriMesh::new(),
            vertex_map: HashMap::new(),
            cut_map: HashMap::new(),
        }
    }

    fn map_vertex(&mut self, index: u32) -> u32 {
        let result = &mut self.result;
        let source = self.source;
        *self.vertex_map.entry(index).or_insert_with(|| {
            let new_index = result.vertices.len() as u32;
            result.vertices.push(source.vertices[index as usize]);
            new_index
        })
    }

    fn map_cut(&mut self, a: u32, b: u32) -> u32 {
        let key = ordered(a, b);
        let result = &mut self.result;
        let source = self.source;
        let plane_z = self.plane_z;
        *self.cut_map.entry(key).or_insert_with(|| {
            let pa = source.vertices[key.0 as usize];
            let pb = source.vertices[key.1 as usize];
            // Both endpoints are strictly off the plane, so the divisor is
            // bounded away from zero
            let t = (plane_z - pa.z) / (pb.z - pa.z);
            let mut position = pa + (pb - pa) * t;
            position.z = plane_z;

            let new_index = result.vertices.len() as u32;
            result.vertices.push(position);
            new_index
        })
    }

    fn map_plane_point(&mut self, point: PlanePoint) -> u32 {
        match point {
            PlanePoint::Vertex(v) => self.map_vertex(v),
            PlanePoint::EdgeCut(a, b) => self.map_cut(a, b),
        }
    }

    fn push_original_face(&mut self, face: &[u32; 3]) {
        let mapped = [
            self.map_vertex(face[0]),
            self.map_vertex(face[1]),
            self.map_vertex(face[2]),
        ];
        self.result.faces.push(mapped);
    }

    /// Clip one straddling triangle, emit the kept part, and return the
    /// chord it leaves on the plane.
    fn push_split_face(
        &mut self,
        face: &[u32; 3],
        face_sides: &[Side; 3],
    ) -> (PlanePoint, PlanePoint) {
        let mut indices: SmallVec<[u32; 4]> = SmallVec::new();
        let mut chord: SmallVec<[PlanePoint; 2]> = SmallVec::new();

        for k in 0..3 {
            let curr = face[k];
            let next = face[(k + 1) % 3];
            let s_curr = face_sides[k];
            let s_next = face_sides[(k + 1) % 3];

            if s_curr != Side::Above {
                indices.push(self.map_vertex(curr));
                if s_curr == Side::On {
                    chord.push(PlanePoint::Vertex(curr));
                }
            }

            let crosses = matches!(
                (s_curr, s_next),
                (Side::Above, Side::Below) | (Side::Below, Side::Above)
            );
            if crosses {
                indices.push(self.map_cut(curr, next));
                let (lo, hi) = ordered(curr, next);
                chord.push(PlanePoint::EdgeCut(lo, hi));
            }
        }

        // The kept region of a straddling triangle is a 3- or 4-gon that
        // preserves the original winding
        for k in 1..indices.len() - 1 {
            self.result
                .faces
                .push([indices[0], indices[k], indices[k + 1]]);
        }

        (chord[0], chord[1])
    }

    fn finish(self) -> TriMesh {
        self.result
    }
}

/// Chain cap segments into closed loops and triangulate each loop with the
/// cap facing +Z (the kept solid lies below the plane).
fn build_cap(
    segments: &[(PlanePoint, PlanePoint)],
    builder: &mut ClipBuilder<'_>,
) -> CsgResult<usize> {
    if segments.is_empty() {
        return Ok(0);
    }

    // A ridge edge resting on the plane is reported by the kept face on
    // each side of it; those pairs cancel, and only odd-count segments
    // bound the cap.
    let mut segment_count: HashMap<(PlanePoint, PlanePoint), usize> = HashMap::new();
    for &(a, b) in segments {
        if a == b {
            continue; // zero-length chord from a grazing cut
        }
        let key = if a <= b { (a, b) } else { (b, a) };
        *segment_count.entry(key).or_insert(0) += 1;
    }

    let boundary: Vec<(PlanePoint, PlanePoint)> = segment_count
        .iter()
        .filter(|(_, &count)| count % 2 == 1)
        .map(|(&pair, _)| pair)
        .collect();

    if boundary.is_empty() {
        return Ok(0);
    }

    let mut neighbors: HashMap<PlanePoint, SmallVec<[PlanePoint; 2]>> = HashMap::new();
    for &(a, b) in &boundary {
        neighbors.entry(a).or_default().push(b);
        neighbors.entry(b).or_default().push(a);
    }

    for (point, adjacent) in &neighbors {
        if adjacent.len() != 2 {
            return Err(CsgError::OpenCrossSection {
                details: format!(
                    "cap point {point:?} touches {} boundary segments, expected 2",
                    adjacent.len()
                ),
            });
        }
    }

    let mut visited: HashSet<(PlanePoint, PlanePoint)> = HashSet::new();
    let mut cap_faces = 0usize;
    let mut loops = 0usize;

    for &(start, second) in &boundary {
        let start_key = if start <= second {
            (start, second)
        } else {
            (second, start)
        };
        if !visited.insert(start_key) {
            continue;
        }

        let mut ring: Vec<PlanePoint> = vec![start];
        let mut prev = start;
        let mut curr = second;

        while curr != start {
            ring.push(curr);
            let adjacent = &neighbors[&curr];
            let next = if adjacent[0] == prev {
                adjacent[1]
            } else {
                adjacent[0]
            };
            let key = if curr <= next { (curr, next) } else { (next, curr) };
            if !visited.insert(key) {
                return Err(CsgError::OpenCrossSection {
                    details: "cap boundary does not close into simple loops".to_string(),
                });
            }
            prev = curr;
            curr = next;
        }

        if ring.len() < 3 {
            continue;
        }

        loops += 1;
        cap_faces += triangulate_cap_loop(&ring, builder)?;
    }

    debug!(loops, cap_faces, "cap built");
    Ok(cap_faces)
}

/// Ear-clip one closed cap loop in the XY plane. Returns the number of
/// faces emitted, or an error when the loop has no ear (a collinear or
/// self-intersecting cross-section that cannot be capped).
fn triangulate_cap_loop(
    ring: &[PlanePoint],
    builder: &mut ClipBuilder<'_>,
) -> CsgResult<usize> {
    let indices: Vec<u32> = ring
        .iter()
        .map(|&point| builder.map_plane_point(point))
        .collect();
    let positions: Vec<(f64, f64)> = indices
        .iter()
        .map(|&i| {
            let v = builder.result.vertices[i as usize];
            (v.x, v.y)
        })
        .collect();

    // Wind the loop counter-clockwise so emitted cap faces point +Z
    let mut order: Vec<usize> = (0..indices.len()).collect();
    if signed_area(&order, &positions) < 0.0 {
        order.reverse();
    }

    let mut emitted = 0usize;
    while order.len() > 3 {
        let Some(ear) = find_ear(&order, &positions) else {
            return Err(CsgError::DegenerateGeometry {
                details: format!(
                    "cap loop cannot be triangulated: no ear among {} remaining points",
                    order.len()
                ),
            });
        };

        let n = order.len();
        let prev = order[(ear + n - 1) % n];
        let curr = order[ear];
        let next = order[(ear + 1) % n];
        builder
            .result
            .faces
            .push([indices[prev], indices[curr], indices[next]]);
        emitted += 1;
        order.remove(ear);
    }

    for k in 1..order.len() - 1 {
        builder
            .result
            .faces
            .push([indices[order[0]], indices[order[k]], indices[order[k + 1]]]);
        emitted += 1;
    }

    Ok(emitted)
}

fn signed_area(order: &[usize], positions: &[(f64, f64)]) -> f64 {
    let mut area = 0.0;
    for k in 0..order.len() {
        let (x0, y0) = positions[order[k]];
        let (x1, y1) = positions[order[(k + 1) % order.len()]];
        area += x0.mul_add(y1, -(x1 * y0));
    }
    area * 0.5
}

/// First convex corner whose triangle contains no other loop vertex.
fn find_ear(order: &[usize], positions: &[(f64, f64)]) -> Option<usize> {
    let n = order.len();

    for i in 0..n {
        let p_prev = positions[order[(i + n - 1) % n]];
        let p_curr = positions[order[i]];
        let p_next = positions[order[(i + 1) % n]];

        let cross = (p_curr.0 - p_prev.0) * (p_next.1 - p_curr.1)
            - (p_curr.1 - p_prev.1) * (p_next.0 - p_curr.0);
        if cross <= 1e-12 {
            continue; // reflex or collinear corner
        }

        let blocked = order.iter().enumerate().any(|(j, &vj)| {
            if j == i || j == (i + n - 1) % n || j == (i + 1) % n {
                return false;
            }
            point_in_triangle(positions[vj], p_prev, p_curr, p_next)
        });

        if !blocked {
            return Some(i);
        }
    }

    None
}

/// Strict interior test for a CCW triangle.
fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    edge_sign(p, a, b) > 0.0 && edge_sign(p, b, c) > 0.0 && edge_sign(p, c, a) > 0.0
}

fn edge_sign(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}
