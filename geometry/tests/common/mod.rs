// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared fixtures: axis-aligned block brushes with outward normals,
//! plane points ordered as a Quake editor would emit them.

// not every test binary uses every helper
#![allow(dead_code)]

use quake_lite_core::math::{Vec2, Vec3};
use quake_lite_core::surface::SurfaceType;
use quake_lite_geometry::{Brush, Face, SolidEntity, UvProjection};
use rustc_hash::FxHashMap;

pub fn create_block(min: Vec3, max: Vec3) -> Brush {
    create_textured_block(min, max, 0)
}

pub fn create_textured_block(min: Vec3, max: Vec3, texture_id: usize) -> Brush {
    let p000 = Vec3::new(min.x, min.y, min.z);
    let p100 = Vec3::new(max.x, min.y, min.z);
    let p110 = Vec3::new(max.x, max.y, min.z);
    let p010 = Vec3::new(min.x, max.y, min.z);
    let p001 = Vec3::new(min.x, min.y, max.z);
    let p101 = Vec3::new(max.x, min.y, max.z);
    let p111 = Vec3::new(max.x, max.y, max.z);
    let p011 = Vec3::new(min.x, max.y, max.z);

    let uv = || UvProjection::Standard { offset: Vec2::zeros() };
    let mut brush = Brush::default();
    brush.add_face(Face::new([p011, p111, p101], texture_id, uv(), 0.0, 1.0, 1.0)); // +Z
    brush.add_face(Face::new([p000, p100, p110], texture_id, uv(), 0.0, 1.0, 1.0)); // -Z
    brush.add_face(Face::new([p100, p101, p111], texture_id, uv(), 0.0, 1.0, 1.0)); // +X
    brush.add_face(Face::new([p000, p010, p011], texture_id, uv(), 0.0, 1.0, 1.0)); // -X
    brush.add_face(Face::new([p110, p111, p011], texture_id, uv(), 0.0, 1.0, 1.0)); // +Y
    brush.add_face(Face::new([p000, p001, p101], texture_id, uv(), 0.0, 1.0, 1.0)); // -Y
    brush
}

/// One entity holding the given blocks, geometry built with 64x64
/// texture bounds for texture id 0.
pub fn entity_with_blocks(blocks: Vec<Brush>) -> SolidEntity {
    let mut ent = SolidEntity::new(Default::default(), "worldspawn".into());
    for b in blocks {
        ent.add_brush(b);
    }
    let mut bounds = FxHashMap::default();
    bounds.insert(0usize, (64.0f32, 64.0f32));
    ent.generate_mesh(&FxHashMap::<usize, SurfaceType>::default(), &bounds);
    ent
}

/// Total area of every triangle of every face of the entity's working
/// brush list.
pub fn total_area(entity: &SolidEntity) -> f32 {
    let mut area = 0.0;
    for brush in entity.brushes() {
        for face in brush.faces() {
            for tri in face.indices().chunks_exact(3) {
                let p0 = face.vertices()[tri[0] as usize].point;
                let p1 = face.vertices()[tri[1] as usize].point;
                let p2 = face.vertices()[tri[2] as usize].point;
                area += (p1 - p0).cross(&(p2 - p0)).norm() * 0.5;
            }
        }
    }
    area
}

/// Faces of the working brush list lying on the `x = at` plane.
pub fn faces_at_x(entity: &SolidEntity, brush: usize, at: f32) -> usize {
    entity.brushes()[brush]
        .faces()
        .iter()
        .filter(|f| f.vertices().iter().all(|v| (v.point.x - at).abs() < 1e-3))
        .count()
}
