// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A bounded convex polygon lying on a plane, with texture projection.

use nalgebra::{Rotation3, Unit};
use quake_lite_core::math::{self, Vec2, Vec3, Vec4};
use quake_lite_core::surface::{SurfaceType, Vertex};

/// Determinant / parallelism tolerance used by plane intersection, the
/// coplanarity test and collinear removal.
pub const CMP_EPSILON: f32 = 0.008;
/// Half-space slack for the brush legality test.
pub const LEGAL_EPSILON: f32 = 8.0e-4;
/// Tolerance for classifying a polygon against a plane.
pub const CLASSIFY_EPSILON: f32 = 1.0e-3;
/// Tolerance for classifying a single point; also the split epsilon.
pub const POINT_EPSILON: f32 = 1.0e-5;

/// Position of a polygon (or point) relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceClassification {
    Front,
    Back,
    OnPlane,
    Spanning,
}

/// Texture projection as authored in the map source.
#[derive(Debug, Clone, PartialEq)]
pub enum UvProjection {
    /// Axis-snapped projection (map version 100). `offset` is the texel
    /// shift.
    Standard { offset: Vec2 },
    /// Valve 220 projection: arbitrary texture axes, xyz is the axis and
    /// w the shift.
    Valve { u: Vec4, v: Vec4 },
}

/// A face of a brush: the defining plane, the texture projection, and
/// (after [`Brush::build_geometry`](crate::Brush::build_geometry)) the
/// polygon itself.
#[derive(Debug, Clone)]
pub struct Face {
    pub(crate) plane_points: [Vec3; 3],
    pub(crate) plane_normal: Vec3,
    pub(crate) plane_dist: f32,
    pub(crate) uv: UvProjection,
    pub(crate) rotation: f32,
    pub(crate) scale_x: f32,
    pub(crate) scale_y: f32,
    pub(crate) texture_id: usize,
    pub(crate) kind: SurfaceType,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) indices: Vec<u32>,
    pub(crate) min: Vec3,
    pub(crate) max: Vec3,
}

impl Face {
    /// Builds a face from three ordered plane points. The winding
    /// `A -> B -> C` defines the outward normal.
    pub fn new(
        points: [Vec3; 3],
        texture_id: usize,
        uv: UvProjection,
        rotation: f32,
        scale_x: f32,
        scale_y: f32,
    ) -> Self {
        let v0v1 = points[1] - points[0];
        let v1v2 = points[2] - points[1];
        let plane_normal = v1v2.cross(&v0v1).normalize();
        let plane_dist = plane_normal.dot(&points[0]);
        Self {
            plane_points: points,
            plane_normal,
            plane_dist,
            uv,
            rotation,
            scale_x,
            scale_y,
            texture_id,
            kind: SurfaceType::Solid,
            vertices: Vec::new(),
            indices: Vec::new(),
            min: Vec3::zeros(),
            max: Vec3::zeros(),
        }
    }

    /// Builds a face directly from a plane equation and finished polygon
    /// data. Used by the BSP adapter, whose faces arrive pre-partitioned
    /// with baked UVs; such faces have no authored plane points.
    pub fn from_parts(
        plane_normal: Vec3,
        plane_dist: f32,
        texture_id: usize,
        uv: UvProjection,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    ) -> Self {
        let mut face = Self {
            plane_points: [Vec3::zeros(); 3],
            plane_normal,
            plane_dist,
            uv,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            texture_id,
            kind: SurfaceType::Solid,
            vertices,
            indices,
            min: Vec3::zeros(),
            max: Vec3::zeros(),
        };
        face.update_bounds();
        face
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertices_mut(&mut self) -> &mut Vec<Vertex> {
        &mut self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn texture_id(&self) -> usize {
        self.texture_id
    }

    #[inline]
    pub fn kind(&self) -> SurfaceType {
        self.kind
    }

    #[inline]
    pub fn plane_normal(&self) -> Vec3 {
        self.plane_normal
    }

    #[inline]
    pub fn plane_dist(&self) -> f32 {
        self.plane_dist
    }

    #[inline]
    pub fn plane_points(&self) -> &[Vec3; 3] {
        &self.plane_points
    }

    #[inline]
    pub fn uv_projection(&self) -> &UvProjection {
        &self.uv
    }

    #[inline]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.min, self.max)
    }

    /// Classifies `other`'s polygon against this face's plane.
    pub fn classify(&self, other: &Face) -> FaceClassification {
        let mut front = false;
        let mut back = false;
        for v in &other.vertices {
            let dist = self.plane_normal.dot(&v.point) - self.plane_dist;
            if dist > CLASSIFY_EPSILON {
                if back {
                    return FaceClassification::Spanning;
                }
                front = true;
            } else if dist < -CLASSIFY_EPSILON {
                if front {
                    return FaceClassification::Spanning;
                }
                back = true;
            }
        }
        if front {
            FaceClassification::Front
        } else if back {
            FaceClassification::Back
        } else {
            FaceClassification::OnPlane
        }
    }

    /// Classifies a single point against this face's plane, with the
    /// tighter point epsilon.
    pub fn classify_point(&self, point: &Vec3) -> FaceClassification {
        let dist = self.plane_normal.dot(point) - self.plane_dist;
        if dist > POINT_EPSILON {
            FaceClassification::Front
        } else if dist < -POINT_EPSILON {
            FaceClassification::Back
        } else {
            FaceClassification::OnPlane
        }
    }

    /// Splits this face's polygon by `plane`'s plane.
    ///
    /// The polygon is walked as a closed loop; vertices within the split
    /// epsilon of the plane are emitted to both sides, strictly
    /// straddling edges get a linearly interpolated vertex. A side with
    /// fewer than three vertices is `None`.
    pub fn split(&self, plane: &Face) -> (Option<Face>, Option<Face>) {
        if self.vertices.is_empty() {
            return (None, None);
        }

        let dists: Vec<f32> = self
            .vertices
            .iter()
            .map(|v| plane.plane_normal.dot(&v.point) - plane.plane_dist)
            .collect();

        let count = self.vertices.len();
        let mut front_verts = Vec::with_capacity(count + 1);
        let mut back_verts = Vec::with_capacity(count + 1);

        for i in 0..count {
            let v1 = &self.vertices[i];
            let d1 = dists[i];
            let next = (i + 1) % count;
            let v2 = &self.vertices[next];
            let d2 = dists[next];

            if d1 >= -POINT_EPSILON {
                front_verts.push(v1.clone());
            }
            if d1 <= POINT_EPSILON {
                back_verts.push(v1.clone());
            }

            if (d1 > POINT_EPSILON && d2 < -POINT_EPSILON)
                || (d1 < -POINT_EPSILON && d2 > POINT_EPSILON)
            {
                let t = d1 / (d1 - d2);
                let mid = interpolate(v1, v2, t);
                front_verts.push(mid.clone());
                back_verts.push(mid);
            }
        }

        let side = |verts: Vec<Vertex>| {
            (verts.len() >= 3).then(|| {
                let mut face = self.clone();
                face.vertices = verts;
                face.indices.clear();
                face
            })
        };
        (side(front_verts), side(back_verts))
    }

    /// Recomputes the cached axial bounding box from the polygon.
    pub fn update_bounds(&mut self) {
        let Some(first) = self.vertices.first() else {
            return;
        };
        let mut min = first.point;
        let mut max = first.point;
        for v in &self.vertices {
            min = min.inf(&v.point);
            max = max.sup(&v.point);
        }
        self.min = min;
        self.max = max;
    }

    /// Re-derives per-vertex normals from the triangle list. Last write
    /// wins when vertices are shared, which is acceptable for flat faces.
    pub fn update_normals(&mut self) {
        for tri in self.indices.chunks_exact(3) {
            let p1 = self.vertices[tri[0] as usize].point;
            let p2 = self.vertices[tri[1] as usize].point;
            let p3 = self.vertices[tri[2] as usize].point;
            let normal = (p2 - p1).cross(&(p3 - p1)).normalize();
            for &i in tri {
                self.vertices[i as usize].normal = normal;
            }
        }
    }

    /// Texture UV for a point on this face, in texels normalized by the
    /// texture size.
    pub fn calc_uv(&self, point: &Vec3, tex_w: f32, tex_h: f32) -> Vec2 {
        match &self.uv {
            UvProjection::Standard { offset } => {
                self.calc_standard_uv(point, tex_w, tex_h, offset)
            }
            UvProjection::Valve { u, v } => self.calc_valve_uv(point, tex_w, tex_h, u, v),
        }
    }

    fn calc_standard_uv(&self, point: &Vec3, tex_w: f32, tex_h: f32, offset: &Vec2) -> Vec2 {
        let mut uv = self.standard_axis_projection(point);

        let angle = self.rotation.to_radians();
        let (sin, cos) = angle.sin_cos();
        uv = Vec2::new(uv.x * cos - uv.y * sin, uv.x * sin + uv.y * cos);

        uv.x /= tex_w;
        uv.y /= tex_h;

        uv.x /= self.scale_x;
        uv.y /= self.scale_y;

        uv.x += offset.x / tex_w;
        uv.y += offset.y / tex_h;
        uv
    }

    fn calc_valve_uv(&self, point: &Vec3, tex_w: f32, tex_h: f32, u: &Vec4, v: &Vec4) -> Vec2 {
        let u_axis = u.xyz();
        let v_axis = v.xyz();

        let mut uv = Vec2::new(u_axis.dot(point), v_axis.dot(point));

        uv.x /= tex_w;
        uv.y /= tex_h;

        uv.x /= self.scale_x;
        uv.y /= self.scale_y;

        uv.x += u.w / tex_w;
        uv.y += v.w / tex_h;
        uv
    }

    /// Lightmap-space UV: the same axis projection as the texture UV,
    /// without scale, rotation or shift. Extents in this space define the
    /// face's chart size in the lightmap atlas.
    pub fn calc_lightmap_uv(&self, point: &Vec3) -> Vec2 {
        match &self.uv {
            UvProjection::Standard { .. } => self.standard_axis_projection(point),
            UvProjection::Valve { u, v } => {
                Vec2::new(u.xyz().dot(point), v.xyz().dot(point))
            }
        }
    }

    /// Picks the dominant world axis for the standard projection and maps
    /// the point into that plane.
    fn standard_axis_projection(&self, point: &Vec3) -> Vec2 {
        let du = self.plane_normal.dot(&math::up_vec()).abs();
        let dr = self.plane_normal.dot(&math::right_vec()).abs();
        let df = self.plane_normal.dot(&math::forward_vec()).abs();

        if du >= dr && du >= df {
            Vec2::new(point.x, -point.y)
        } else if dr >= du && dr >= df {
            Vec2::new(point.x, -point.z)
        } else {
            Vec2::new(point.y, -point.z)
        }
    }

    /// Tangent (xyz) and bitangent sign (w) for this face's projection.
    pub fn calc_tangent(&self) -> Vec4 {
        match &self.uv {
            UvProjection::Standard { .. } => self.calc_standard_tangent(),
            UvProjection::Valve { u, v } => self.calc_valve_tangent(u, v),
        }
    }

    // The axis selection below (FORWARD twice, RIGHT once) and the
    // rotation angle fed through in degree units are kept bit-for-bit
    // with reference renderers; lightmap and normal-map sign orientation
    // depend on them.
    fn calc_standard_tangent(&self) -> Vec4 {
        let du = self.plane_normal.dot(&math::up_vec());
        let dr = self.plane_normal.dot(&math::right_vec());
        let df = self.plane_normal.dot(&math::forward_vec());
        let dua = du.abs();
        let dra = dr.abs();
        let dfa = df.abs();

        let mut u_axis;
        let mut v_sign;
        if dua >= dra && dua >= dfa {
            u_axis = math::forward_vec();
            v_sign = du.signum();
        } else if dra >= dua && dra >= dfa {
            u_axis = math::forward_vec();
            v_sign = -dr.signum();
        } else {
            u_axis = math::right_vec();
            v_sign = df.signum();
        }
        v_sign *= self.scale_y.signum();

        let angle = -self.rotation * v_sign;
        let axis = Unit::new_normalize(self.plane_normal);
        u_axis = Rotation3::from_axis_angle(&axis, angle) * u_axis;

        Vec4::new(u_axis.x, u_axis.y, u_axis.z, v_sign)
    }

    fn calc_valve_tangent(&self, u: &Vec4, v: &Vec4) -> Vec4 {
        let u_axis = u.xyz().normalize();
        let v_axis = v.xyz().normalize();
        let v_sign = self.plane_normal.cross(&u_axis).dot(&v_axis).signum();
        Vec4::new(u_axis.x, u_axis.y, u_axis.z, v_sign)
    }
}

/// Linear interpolation of position and UVs; normal and tangent carry
/// over from `v1`.
pub(crate) fn interpolate(v1: &Vertex, v2: &Vertex, t: f32) -> Vertex {
    Vertex {
        point: v1.point + (v2.point - v1.point) * t,
        uv: v1.uv + (v2.uv - v1.uv) * t,
        lightmap_uv: v1.lightmap_uv + (v2.lightmap_uv - v1.lightmap_uv) * t,
        normal: v1.normal,
        tangent: v1.tangent,
    }
}
