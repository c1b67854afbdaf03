// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brush-based entities.

use quake_lite_core::entity::AttributeMap;
use quake_lite_core::math::{self, Vec3};
use quake_lite_core::surface::SurfaceType;
use rustc_hash::FxHashMap;

use crate::brush::Brush;

/// A solid (brush-based) entity: worldspawn, doors, triggers, ...
///
/// Both the original and the clipped brush lists stay alive so the
/// caller may request either; [`brushes`](Self::brushes) returns the
/// clipped list once CSG has run.
#[derive(Debug, Clone, Default)]
pub struct SolidEntity {
    pub attributes: AttributeMap,
    pub classname: String,
    /// TrenchBroom group name, when authored with TrenchBroom.
    pub tb_name: String,
    /// TrenchBroom group type, when authored with TrenchBroom.
    pub tb_type: String,
    pub(crate) brushes: Vec<Brush>,
    pub(crate) clipped_brushes: Vec<Brush>,
    pub(crate) was_clipped: bool,
    /// Net face count removed by clipping (can be negative: splits add
    /// faces).
    pub(crate) clipped_face_count: i64,
    pub(crate) min: Vec3,
    pub(crate) max: Vec3,
    pub(crate) center: Vec3,
}

impl SolidEntity {
    pub fn new(attributes: AttributeMap, classname: String) -> Self {
        Self {
            attributes,
            classname,
            ..Self::default()
        }
    }

    /// Builds an entity from finished brushes (the BSP adapter's path).
    pub fn from_brushes(
        attributes: AttributeMap,
        classname: String,
        brushes: Vec<Brush>,
    ) -> Self {
        let mut ent = Self::new(attributes, classname);
        ent.brushes = brushes;
        ent.recompute_bounds();
        ent
    }

    #[inline]
    pub fn add_brush(&mut self, brush: Brush) {
        self.brushes.push(brush);
    }

    /// The brush list a renderer should consume: clipped brushes once
    /// CSG has run, the originals otherwise.
    #[inline]
    pub fn brushes(&self) -> &[Brush] {
        if self.was_clipped {
            &self.clipped_brushes
        } else {
            &self.brushes
        }
    }

    /// The brush list as authored, regardless of CSG.
    #[inline]
    pub fn original_brushes(&self) -> &[Brush] {
        &self.brushes
    }

    #[inline]
    pub fn clipped_brushes(&self) -> &[Brush] {
        &self.clipped_brushes
    }

    #[inline]
    pub fn was_clipped(&self) -> bool {
        self.was_clipped
    }

    /// Net number of faces removed by CSG clipping.
    #[inline]
    pub fn stats_clipped_faces(&self) -> i64 {
        self.clipped_face_count
    }

    #[inline]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.min, self.max)
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Whether the classname contains `substr`.
    #[inline]
    pub fn class_contains(&self, substr: &str) -> bool {
        self.classname.contains(substr)
    }

    /// String attribute lookup; missing keys yield an empty string.
    #[inline]
    pub fn attribute_str(&self, key: &str) -> String {
        quake_lite_core::entity::attribute_str(&self.attributes, key)
    }

    /// Float attribute lookup; missing or unparsable values yield 0.
    #[inline]
    pub fn attribute_f32(&self, key: &str) -> f32 {
        quake_lite_core::entity::attribute_f32(&self.attributes, key)
    }

    /// Vec3 attribute lookup (three whitespace-separated floats).
    #[inline]
    pub fn attribute_vec3(&self, key: &str) -> Vec3 {
        quake_lite_core::entity::attribute_vec3(&self.attributes, key)
    }

    pub(crate) fn working_brushes_mut(&mut self) -> &mut Vec<Brush> {
        if self.clipped_brushes.is_empty() {
            &mut self.brushes
        } else {
            &mut self.clipped_brushes
        }
    }

    /// Builds every brush's polygonal boundary and refreshes the entity
    /// bounds.
    pub fn generate_mesh(
        &mut self,
        face_types: &FxHashMap<usize, SurfaceType>,
        tex_bounds: &FxHashMap<usize, (f32, f32)>,
    ) {
        for brush in &mut self.brushes {
            brush.build_geometry(face_types, tex_bounds);
        }
        self.recompute_bounds();
    }

    pub(crate) fn recompute_bounds(&mut self) {
        let brushes: &[Brush] = if self.was_clipped {
            &self.clipped_brushes
        } else {
            &self.brushes
        };
        let Some(first) = brushes.first() else {
            return;
        };
        self.min = first.min;
        self.max = first.max;
        for brush in brushes {
            self.min = self.min.inf(&brush.min);
            self.max = self.max.sup(&brush.max);
        }
        self.center = math::center_from_bbox(&self.min, &self.max);
    }

    /// Applies the Quake-to-OpenGL coordinate conversion to every vertex
    /// position, normal and tangent in both brush lists, then refreshes
    /// the cached bounds.
    pub fn convert_to_opengl(&mut self) {
        for brushes in [&mut self.brushes, &mut self.clipped_brushes] {
            for brush in brushes.iter_mut() {
                for face in &mut brush.faces {
                    for v in face.vertices_mut() {
                        v.point = math::to_opengl(&v.point);
                        v.normal = math::to_opengl(&v.normal);
                        let t = math::to_opengl(&v.tangent.xyz());
                        v.tangent.x = t.x;
                        v.tangent.y = t.y;
                        v.tangent.z = t.z;
                    }
                    face.update_bounds();
                }
                brush.calculate_aabb();
            }
        }
        self.recompute_bounds();
    }
}
