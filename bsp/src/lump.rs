// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On-disk BSP lump records, little-endian, per the published Quake BSP
//! layout.

use bytemuck::{Pod, Zeroable};

pub const MAGIC_V29: u32 = 29;
pub const MAGIC_V30: u32 = 30;
pub const HEADER_LUMPS: usize = 15;
pub const TEXTURE_NAME_LENGTH: usize = 16;
pub const MIP_LEVELS: usize = 4;

/// Lump directory indices.
pub const LUMP_ENTITIES: usize = 0;
pub const LUMP_PLANES: usize = 1;
pub const LUMP_TEXTURES: usize = 2;
pub const LUMP_VERTICES: usize = 3;
pub const LUMP_VISIBILITY: usize = 4;
pub const LUMP_NODES: usize = 5;
pub const LUMP_TEXINFO: usize = 6;
pub const LUMP_FACES: usize = 7;
pub const LUMP_LIGHTING: usize = 8;
pub const LUMP_CLIPNODES: usize = 9;
pub const LUMP_LEAFS: usize = 10;
pub const LUMP_MARKSURFACES: usize = 11;
pub const LUMP_EDGES: usize = 12;
pub const LUMP_SURFEDGES: usize = 13;
pub const LUMP_MODELS: usize = 14;

/// One lump directory entry: byte offset and length from the start of
/// the file.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct LumpEntry {
    pub offset: u32,
    pub length: u32,
}

/// File header: version then the lump directory.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct BspHeader {
    pub version: u32,
    pub lumps: [LumpEntry; HEADER_LUMPS],
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct BspPlane {
    /// Unit normal.
    pub normal: [f32; 3],
    /// Distance from the origin along the normal.
    pub dist: f32,
    /// Axis classification (unused by this loader).
    pub kind: i32,
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct BspEdge {
    pub vertex0: u16,
    pub vertex1: u16,
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct BspFace {
    pub plane_id: u16,
    /// 0 in front of the plane, 1 behind it.
    pub side: u16,
    /// First entry in the surfedge list.
    pub ledge_id: u32,
    pub ledge_num: u16,
    pub texinfo_id: u16,
    /// Light styles; 255 in the first slot means no lightmap.
    pub styles: [u8; 4],
    /// Sample offset into the lighting lump, or -1.
    pub lightmap: i32,
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct BspTexInfo {
    pub u_axis: [f32; 3],
    pub u_offset: f32,
    pub v_axis: [f32; 3],
    pub v_offset: f32,
    /// Index into the miptexture list.
    pub texture_id: u32,
    /// 0 for ordinary textures, 1 for animated water.
    pub animated: u32,
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct BspModel {
    pub bound: [f32; 6],
    pub origin: [f32; 3],
    pub node_ids: [i32; 4],
    pub num_leafs: i32,
    pub face_id: i32,
    pub face_num: i32,
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct BspNode {
    pub plane_id: i32,
    pub front: i16,
    pub back: i16,
    pub bound: [i16; 6],
    pub face_id: u16,
    pub face_num: u16,
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct BspLeaf {
    pub kind: i32,
    pub vislist: i32,
    pub bound: [i16; 6],
    pub lface_id: u16,
    pub lface_num: u16,
    pub ambient_sounds: [u8; 4],
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct BspClipNode {
    pub plane_id: i32,
    pub front: i16,
    pub back: i16,
}

/// Miptexture header inside the texture lump.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct MipTexHeader {
    pub name: [u8; TEXTURE_NAME_LENGTH],
    pub width: u32,
    pub height: u32,
    pub mip_offsets: [u32; MIP_LEVELS],
}
