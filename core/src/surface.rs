// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The renderer-ready surface model shared by both adapters.

use crate::math::{Vec2, Vec3, Vec4};

/// Classification of a surface for rendering and collision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceType {
    /// Drawn, collides, participates in CSG clipping.
    #[default]
    Solid,
    /// Not drawn, collides, excluded from CSG.
    Clip,
    /// Not drawn, not collided, excluded from CSG.
    Skip,
    /// Not drawn, collides, excluded from CSG.
    Nodraw,
}

/// A vertex with the full attribute set the pipeline interpolates.
///
/// The tangent's `w` component carries the bitangent sign.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub point: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub lightmap_uv: Vec2,
    pub tangent: Vec4,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            point: Vec3::zeros(),
            normal: Vec3::zeros(),
            uv: Vec2::zeros(),
            lightmap_uv: Vec2::zeros(),
            tangent: Vec4::zeros(),
        }
    }
}

impl Vertex {
    /// Whether a vertex with the same position already exists in `list`.
    #[inline]
    pub fn position_in_list(&self, list: &[Vertex]) -> bool {
        list.iter().any(|v| v.point == self.point)
    }
}

/// A per-texture render batch. Indices reference the mesh's own vertex
/// array.
#[derive(Debug, Clone, Default)]
pub struct RenderMesh {
    pub texture_name: String,
    pub width: u32,
    pub height: u32,
    pub surface_type: SurfaceType,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// RGBA pixel data handed out by the texture and lightmap accessors.
#[derive(Debug, Clone, Default)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl TextureData {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
