// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-texture render batches with welded vertices.

use std::collections::BTreeMap;

use quake_lite_core::surface::{RenderMesh, Vertex};
use rustc_hash::FxHashMap;

use crate::entity::SolidEntity;
use crate::face::Face;

/// Weld tolerance for the render-batch pass.
pub const BATCH_WELD_EPSILON: f32 = 1.0e-3;

/// Batches an entity's faces by texture id (ascending id order, which is
/// parse order) into render meshes with welded vertices.
///
/// The weld compares position, texture UV, lightmap UV and normal
/// together: lightmap UV discrimination preserves atlas boundaries and
/// normal discrimination preserves creases. Vertices differing in any of
/// the four stay distinct.
pub fn batch_entity_meshes(
    entity: &SolidEntity,
    texture_names: &[String],
    tex_bounds: &FxHashMap<usize, (f32, f32)>,
) -> Vec<RenderMesh> {
    let mut batches: BTreeMap<usize, Vec<&Face>> = BTreeMap::new();
    for brush in entity.brushes() {
        for face in brush.faces() {
            batches.entry(face.texture_id()).or_default().push(face);
        }
    }

    batches
        .into_iter()
        .map(|(texture_id, faces)| {
            let (width, height) = tex_bounds
                .get(&texture_id)
                .map(|&(w, h)| (w as u32, h as u32))
                .unwrap_or((0, 0));
            let mut mesh = RenderMesh {
                texture_name: texture_names.get(texture_id).cloned().unwrap_or_default(),
                width,
                height,
                surface_type: faces[0].kind(),
                vertices: Vec::new(),
                indices: Vec::new(),
            };
            for face in faces {
                weld_face_into(&mut mesh, face);
            }
            mesh
        })
        .collect()
}

/// Appends one face to a batch, welding against the vertices already in
/// the mesh and remapping the face's indices.
fn weld_face_into(mesh: &mut RenderMesh, face: &Face) {
    const EPS_SQ: f32 = BATCH_WELD_EPSILON * BATCH_WELD_EPSILON;

    let mut remap: Vec<u32> = Vec::with_capacity(face.vertices().len());
    for vert in face.vertices() {
        let found = mesh.vertices.iter().position(|existing| {
            (existing.point - vert.point).norm_squared() < EPS_SQ
                && (existing.uv - vert.uv).norm_squared() < EPS_SQ
                && (existing.lightmap_uv - vert.lightmap_uv).norm_squared() < EPS_SQ
                && (existing.normal - vert.normal).norm_squared() < EPS_SQ
        });
        match found {
            Some(index) => remap.push(index as u32),
            None => {
                remap.push(mesh.vertices.len() as u32);
                mesh.vertices.push(vert.clone());
            }
        }
    }

    for &index in face.indices() {
        mesh.indices.push(remap[index as usize]);
    }
}
