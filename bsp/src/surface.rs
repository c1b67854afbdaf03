// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface building from the vertex / edge / surfedge / texinfo lumps.

use quake_lite_core::math::{Vec2, Vec3, Vec4};
use quake_lite_core::surface::Vertex;
use quake_lite_geometry::{Face, UvProjection};

use crate::file::BspFile;
use crate::lump::BspFace;

/// One BSP face with its lightmap bookkeeping, wrapping the shared
/// [`Face`] type the provider hands out.
#[derive(Debug, Clone)]
pub struct BspSurface {
    pub face: Face,
    /// Texture-space extent of the face, in 16-luxel blocks.
    pub(crate) extents: [i32; 2],
    pub(crate) texture_mins: [i32; 2],
    /// Sample offset into the lighting data, or -1 when unlit.
    pub(crate) lightmap_offset: i32,
    pub(crate) styles: [u8; 4],
}

impl BspSurface {
    /// Builds a surface from one face record: walks the surfedge list
    /// into a vertex loop, projects texture UVs through the texinfo
    /// axes, and derives the 16-luxel lightmap extents.
    pub fn build(file: &BspFile, record: &BspFace) -> Option<Self> {
        let info = file.tex_info.get(record.texinfo_id as usize)?;
        let plane = file.planes.get(record.plane_id as usize)?;

        let mut normal = Vec3::from(plane.normal);
        if record.side == 1 {
            normal = -normal;
        }

        let (tex_w, tex_h) = file
            .textures
            .get(info.texture_id as usize)
            .and_then(|t| t.as_ref())
            .map(|t| (t.width.max(1) as f32, t.height.max(1) as f32))
            .unwrap_or((1.0, 1.0));

        let u_axis = Vec3::from(info.u_axis);
        let v_axis = Vec3::from(info.v_axis);

        let mut mins = [f32::MAX, f32::MAX];
        let mut maxs = [f32::MIN, f32::MIN];

        let count = record.ledge_num as usize;
        let mut vertices = Vec::with_capacity(count);
        for i in 0..count {
            let surf_edge = *file.surf_edges.get(record.ledge_id as usize + i)?;
            let point = if surf_edge >= 0 {
                let edge = file.edges.get(surf_edge as usize)?;
                Vec3::from(*file.vertices.get(edge.vertex0 as usize)?)
            } else {
                let edge = file.edges.get((-surf_edge) as usize)?;
                Vec3::from(*file.vertices.get(edge.vertex1 as usize)?)
            };

            let u_raw = u_axis.dot(&point) + info.u_offset;
            let v_raw = v_axis.dot(&point) + info.v_offset;
            mins[0] = mins[0].min(u_raw);
            mins[1] = mins[1].min(v_raw);
            maxs[0] = maxs[0].max(u_raw);
            maxs[1] = maxs[1].max(v_raw);

            vertices.push(Vertex {
                point,
                normal,
                uv: Vec2::new(u_raw / tex_w, v_raw / tex_h),
                lightmap_uv: Vec2::zeros(),
                tangent: Vec4::zeros(),
            });
        }
        if vertices.len() < 3 {
            return None;
        }

        let mut extents = [0i32; 2];
        let mut texture_mins = [0i32; 2];
        for i in 0..2 {
            let bmin = (mins[i] / 16.0).floor() as i32;
            let bmax = (maxs[i] / 16.0).ceil() as i32;
            texture_mins[i] = bmin * 16;
            extents[i] = (bmax - bmin) * 16;
        }

        let mut indices = Vec::with_capacity((vertices.len() - 2) * 3);
        for i in 1..vertices.len() as u32 - 1 {
            indices.extend_from_slice(&[0, i, i + 1]);
        }

        let face = Face::from_parts(
            normal,
            normal.dot(&vertices[0].point),
            info.texture_id as usize,
            UvProjection::Valve {
                u: Vec4::new(u_axis.x, u_axis.y, u_axis.z, info.u_offset),
                v: Vec4::new(v_axis.x, v_axis.y, v_axis.z, info.v_offset),
            },
            vertices,
            indices,
        );

        Some(Self {
            face,
            extents,
            texture_mins,
            lightmap_offset: record.lightmap,
            styles: record.styles,
        })
    }

    /// Placeholder for a face that failed to build. Keeps the surface
    /// list index-aligned with the face lump, which model face ranges
    /// index into.
    pub fn empty(record: &BspFace) -> Self {
        Self {
            face: Face::from_parts(
                Vec3::zeros(),
                0.0,
                0,
                UvProjection::Standard { offset: Vec2::zeros() },
                Vec::new(),
                Vec::new(),
            ),
            extents: [0, 0],
            texture_mins: [0, 0],
            lightmap_offset: -1,
            styles: record.styles,
        }
    }

    /// Luxel grid size of this surface's lightmap samples.
    #[inline]
    pub(crate) fn sample_size(&self) -> (u32, u32) {
        (
            ((self.extents[0] >> 4) + 1).max(1) as u32,
            ((self.extents[1] >> 4) + 1).max(1) as u32,
        )
    }

    #[inline]
    pub(crate) fn is_lit(&self, lighting: &[u8]) -> bool {
        self.lightmap_offset >= 0 && !lighting.is_empty() && self.styles[0] != 255
    }
}
