// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Convex polytope construction from half-spaces, and brush-vs-brush
//! clipping.

use quake_lite_core::math::{self, Vec3};
use quake_lite_core::surface::{SurfaceType, Vertex};
use rustc_hash::FxHashMap;

use crate::face::{Face, FaceClassification, CMP_EPSILON, LEGAL_EPSILON};

/// A convex 3D volume defined by a set of planes (faces), in authored
/// order. The authored order is preserved: it is the tie-breaker during
/// CSG.
#[derive(Debug, Clone, Default)]
pub struct Brush {
    pub(crate) faces: Vec<Face>,
    pub(crate) min: Vec3,
    pub(crate) max: Vec3,
    pub(crate) is_block_volume: bool,
    pub(crate) is_nonsolid: bool,
}

impl Brush {
    /// Wraps a finished face list (the BSP adapter's path; `.map` brushes
    /// are assembled face by face and built later).
    pub fn from_faces(faces: Vec<Face>) -> Self {
        let mut brush = Self {
            faces,
            ..Self::default()
        };
        brush.calculate_aabb();
        brush
    }

    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    #[inline]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.min, self.max)
    }

    /// Whether the brush is a blocking volume (contains a CLIP face).
    #[inline]
    pub fn is_block_volume(&self) -> bool {
        self.is_block_volume
    }

    /// Whether every face is CLIP/SKIP/NODRAW.
    #[inline]
    pub fn is_nonsolid(&self) -> bool {
        self.is_nonsolid
    }

    /// Constructs the polygonal boundary from the plane definitions:
    /// triple-plane intersection, winding, fan triangulation, bounds.
    pub fn build_geometry(
        &mut self,
        face_types: &FxHashMap<usize, SurfaceType>,
        tex_bounds: &FxHashMap<usize, (f32, f32)>,
    ) {
        self.apply_face_types(face_types);
        self.generate_polygons(tex_bounds);
        self.wind_face_vertices();
        self.index_face_vertices();
        self.calculate_aabb();
    }

    fn apply_face_types(&mut self, face_types: &FxHashMap<usize, SurfaceType>) {
        for face in &mut self.faces {
            if let Some(&kind) = face_types.get(&face.texture_id) {
                face.kind = kind;
                if kind == SurfaceType::Clip {
                    self.is_block_volume = true;
                }
            }
        }
        self.is_nonsolid =
            !self.faces.is_empty() && self.faces.iter().all(|f| f.kind != SurfaceType::Solid);
    }

    /// Phase 1: candidate vertices from plane triples.
    ///
    /// Every ordered triple `(i, j, k)` is visited so that each corner is
    /// appended to each of its incident faces (through a different `k`);
    /// parallel pairs die on the determinant test. Attributes: normal
    /// from face `i`, tangent/UV/lightmap UV from face `k`.
    fn generate_polygons(&mut self, tex_bounds: &FxHashMap<usize, (f32, f32)>) {
        for face in &mut self.faces {
            face.vertices.clear();
            face.indices.clear();
        }

        let count = self.faces.len();
        for i in 0..count {
            for j in 0..count {
                for k in 0..count {
                    if i == j && j == k {
                        continue;
                    }

                    let Some(point) =
                        intersect_planes(&self.faces[i], &self.faces[j], &self.faces[k])
                    else {
                        continue;
                    };
                    if !is_legal_vertex(&point, &self.faces) {
                        continue;
                    }
                    let point = self.merge_duplicate(i, point);

                    let source = &self.faces[k];
                    let (tex_w, tex_h) = match tex_bounds.get(&source.texture_id) {
                        Some(&(w, h)) if w > 0.0 && h > 0.0 => (w, h),
                        // missing bounds: world-scale UVs
                        _ => (1.0, 1.0),
                    };
                    let vertex = Vertex {
                        point,
                        normal: self.faces[i].plane_normal.normalize(),
                        uv: source.calc_uv(&point, tex_w, tex_h),
                        lightmap_uv: source.calc_lightmap_uv(&point),
                        tangent: source.calc_tangent(),
                    };

                    if !vertex.position_in_list(&self.faces[k].vertices) {
                        self.faces[k].vertices.push(vertex);
                    }
                }
            }
            self.faces[i].update_bounds();
        }
    }

    /// Reuses an already-accepted vertex position from faces `0..=from`
    /// when one lies within the merge tolerance. Keeps shared corners
    /// identical across adjacent faces, which the weld passes rely on.
    fn merge_duplicate(&self, from: usize, point: Vec3) -> Vec3 {
        for face in &self.faces[..=from] {
            for v in &face.vertices {
                if math::dist3(&v.point, &point) < CMP_EPSILON {
                    return v.point;
                }
            }
        }
        point
    }

    /// Phase 2: sort each face's vertex bag CCW around the outward
    /// normal (stable sort, descending angle key; equal keys keep input
    /// order).
    pub(crate) fn wind_face_vertices(&mut self) {
        for face in &mut self.faces {
            if face.vertices.len() < 3 {
                continue;
            }

            let u = (face.vertices[1].point - face.vertices[0].point).normalize();
            let normal = face.plane_normal.normalize();
            let v = u.cross(&normal).normalize();

            let mut center = Vec3::zeros();
            for vert in &face.vertices {
                center += vert.point;
            }
            center /= face.vertices.len() as f32;

            let key = |vert: &Vertex| -> f32 {
                let loc = vert.point - center;
                loc.dot(&v).atan2(loc.dot(&u))
            };
            face.vertices.sort_by(|a, b| {
                key(b)
                    .partial_cmp(&key(a))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }

    /// Phase 3: fan triangulation of each (convex) polygon, then
    /// per-vertex normals from the triangles.
    pub(crate) fn index_face_vertices(&mut self) {
        for face in &mut self.faces {
            if face.vertices.len() < 3 {
                continue;
            }
            face.indices.clear();
            face.indices.reserve((face.vertices.len() - 2) * 3);
            for i in 0..face.vertices.len() as u32 - 2 {
                face.indices.push(0);
                face.indices.push(i + 1);
                face.indices.push(i + 2);
            }
            face.update_normals();
        }
    }

    /// Phase 4: axial bounds over every face's vertices.
    pub(crate) fn calculate_aabb(&mut self) {
        let Some(first) = self
            .faces
            .iter()
            .flat_map(|f| f.vertices.first())
            .next()
        else {
            return;
        };
        let mut min = first.point;
        let mut max = first.point;
        for face in &self.faces {
            for v in &face.vertices {
                min = min.inf(&v.point);
                max = max.sup(&v.point);
            }
        }
        self.min = min;
        self.max = max;
    }

    /// AABB overlap test used to short-circuit CSG.
    pub fn intersects(&self, other: &Brush) -> bool {
        if self.min.x > other.max.x || other.min.x > self.max.x {
            return false;
        }
        if self.min.y > other.max.y || other.min.y > self.max.y {
            return false;
        }
        if self.min.z > other.max.z || other.min.z > self.max.z {
            return false;
        }
        true
    }

    /// Expands `min`/`max` to cover this brush.
    pub(crate) fn grow_bbox(&self, min: &mut Vec3, max: &mut Vec3) {
        *min = min.inf(&self.min);
        *max = max.sup(&self.max);
    }

    /// Clips every face of `self` by the planes of `other`, discarding
    /// the portions inside `other`.
    ///
    /// `keep_on_plane` resolves coplanar walls: exactly one of two
    /// touching brushes keeps the shared face (no hole, no double face).
    pub fn clip_to_brush(&self, other: &Brush, keep_on_plane: bool) -> Vec<Face> {
        let mut out = Vec::with_capacity(self.faces.len());
        for face in &self.faces {
            clip_face(face.clone(), &other.faces, keep_on_plane, &mut out);
        }
        out
    }
}

/// Walks one face through `other`'s plane list.
fn clip_face(face: Face, planes: &[Face], keep_on_plane: bool, out: &mut Vec<Face>) {
    // CLIP/SKIP/NODRAW faces do not participate in clipping; they pass
    // through unchanged.
    if face.kind() != SurfaceType::Solid {
        out.push(face);
        return;
    }

    let mut face = face;
    let mut is_coplanar = false;

    for plane in planes {
        if plane.kind() != SurfaceType::Solid {
            continue;
        }

        match plane.classify(&face) {
            // entirely outside `other`: the face escapes
            FaceClassification::Front => {
                out.push(face);
                return;
            }
            // this plane does not exclude it yet
            FaceClassification::Back => {}
            FaceClassification::OnPlane => {
                // Both alignments count as coplanar: touching brushes
                // present the shared wall with opposed normals, and the
                // tie-break must see it from both sides or neither brush
                // would keep the wall.
                let alignment = face.plane_normal().dot(&plane.plane_normal());
                if (alignment.abs() - 1.0).abs() < CMP_EPSILON {
                    is_coplanar = true;
                }
            }
            FaceClassification::Spanning => {
                let (front, back) = face.split(plane);
                if let Some(front) = front {
                    out.push(front);
                }
                match back {
                    Some(back) => face = back,
                    None => return,
                }
            }
        }
    }

    // plane list exhausted: the face is inside `other` unless it rode a
    // coplanar wall and this brush wins the tie-break
    if is_coplanar && keep_on_plane {
        out.push(face);
    }
}

/// Intersection point of three planes, or `None` when the determinant is
/// below the tolerance. The test is deliberately one-sided: negative
/// determinants are rejected too, matching the winding convention of the
/// vertex generator.
fn intersect_planes(a: &Face, b: &Face, c: &Face) -> Option<Vec3> {
    let n0 = a.plane_normal();
    let n1 = b.plane_normal();
    let n2 = c.plane_normal();

    let denom = n0.cross(&n1).dot(&n2);
    if denom < CMP_EPSILON {
        return None;
    }

    Some(
        (n1.cross(&n2) * a.plane_dist()
            + n2.cross(&n0) * b.plane_dist()
            + n0.cross(&n1) * c.plane_dist())
            / denom,
    )
}

/// A candidate vertex is legal when it is inside every face's half-space
/// within the legality slack.
fn is_legal_vertex(point: &Vec3, faces: &[Face]) -> bool {
    for face in faces {
        let proj = face.plane_normal().dot(point);
        if proj > face.plane_dist() && (face.plane_dist() - proj).abs() > LEGAL_EPSILON {
            return false;
        }
    }
    true
}
