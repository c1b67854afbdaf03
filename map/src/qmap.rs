// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level map façade: texture tables, geometry generation, entity
//! access.

use std::path::Path;

use quake_lite_core::config::Config;
use quake_lite_core::entity::PointEntity;
use quake_lite_core::error::Result;
use quake_lite_core::math;
use quake_lite_core::surface::{RenderMesh, SurfaceType};
use quake_lite_geometry::{mesh, SolidEntity, TextureBounds};
use rustc_hash::FxHashMap;

use crate::map_file::MapFile;

/// A loaded `.map` with its texture tables and configuration.
///
/// Drives the pipeline: brush build, optional CSG, optional coordinate
/// conversion, per-texture render batches.
#[derive(Debug, Default)]
pub struct QuakeMap {
    config: Config,
    map_file: MapFile,
    texture_types: FxHashMap<usize, SurfaceType>,
    texture_bounds: FxHashMap<usize, (f32, f32)>,
}

impl QuakeMap {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Loads a map from disk.
    pub fn load_file(path: &Path, config: Config) -> Result<Self> {
        Ok(Self {
            config,
            map_file: MapFile::parse_file(path)?,
            ..Self::default()
        })
    }

    /// Loads a map from text. `path` is used for error reporting only.
    pub fn load_str(input: &str, path: &Path, config: Config) -> Result<Self> {
        Ok(Self {
            config,
            map_file: MapFile::parse_str(input, path)?,
            ..Self::default()
        })
    }

    #[inline]
    pub fn map_file(&self) -> &MapFile {
        &self.map_file
    }

    #[inline]
    pub fn config(&self) -> Config {
        self.config
    }

    #[inline]
    pub fn texture_names(&self) -> &[String] {
        self.map_file.textures()
    }

    /// Texture name for an id, or an empty string for out-of-range ids.
    pub fn texture_name(&self, texture_id: usize) -> &str {
        self.map_file
            .textures()
            .get(texture_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    #[inline]
    pub fn wads(&self) -> &[String] {
        self.map_file.wads()
    }

    #[inline]
    pub fn has_wads(&self) -> bool {
        !self.map_file.wads().is_empty()
    }

    #[inline]
    pub fn solid_entities(&self) -> &[SolidEntity] {
        &self.map_file.solid_entities
    }

    #[inline]
    pub fn point_entities(&self) -> &[PointEntity] {
        &self.map_file.point_entities
    }

    pub(crate) fn solid_entities_mut(&mut self) -> &mut [SolidEntity] {
        &mut self.map_file.solid_entities
    }

    /// The worldspawn entity, present on any valid map.
    pub fn worldspawn(&self) -> Option<&SolidEntity> {
        self.map_file
            .worldspawn
            .and_then(|index| self.map_file.solid_entities.get(index))
    }

    /// Point entities whose classname contains `class_name`.
    pub fn point_entities_by_class(&self, class_name: &str) -> Vec<&PointEntity> {
        self.map_file
            .point_entities
            .iter()
            .filter(|pe| pe.class_contains(class_name))
            .collect()
    }

    /// Solid entities whose classname contains `class_name`.
    pub fn solid_entities_by_class(&self, class_name: &str) -> Vec<&SolidEntity> {
        self.map_file
            .solid_entities
            .iter()
            .filter(|se| se.class_contains(class_name))
            .collect()
    }

    /// An entity's faces using the named texture, from the working brush
    /// list. Empty when the texture is unknown.
    pub fn polygons_by_texture<'a>(
        &self,
        entity: &'a SolidEntity,
        texture: &str,
    ) -> Vec<&'a quake_lite_geometry::Face> {
        let Some(texture_id) = self
            .map_file
            .textures()
            .iter()
            .position(|name| name == texture)
        else {
            return Vec::new();
        };
        entity
            .brushes()
            .iter()
            .flat_map(|b| b.faces())
            .filter(|f| f.texture_id() == texture_id)
            .collect()
    }

    /// Fills the texture bounds table by querying `provider` for every
    /// texture in the table. Call after load, before geometry
    /// generation.
    pub fn register_texture_bounds(&mut self, provider: &dyn TextureBounds) {
        for (index, name) in self.map_file.textures().iter().enumerate() {
            if let Some((w, h)) = provider.texture_bounds(name) {
                self.texture_bounds.insert(index, (w as f32, h as f32));
            }
        }
    }

    /// Overrides the face type for a texture name: exact match first,
    /// case-insensitive fallback. Applied when brushes are built.
    pub fn set_face_type_by_texture(&mut self, texture: &str, kind: SurfaceType) {
        let textures = self.map_file.textures();
        let found = textures
            .iter()
            .position(|name| name == texture)
            .or_else(|| {
                textures
                    .iter()
                    .position(|name| name.eq_ignore_ascii_case(texture))
            });
        if let Some(index) = found {
            self.texture_types.insert(index, kind);
        }
    }

    /// Builds every solid entity's geometry; with `csg` the brushes are
    /// clipped against each other first. With coordinate conversion
    /// enabled, vertices and point entity origins are moved to OpenGL
    /// space afterwards.
    pub fn generate_geometry(&mut self, csg: bool) {
        let texture_types = &self.texture_types;
        let texture_bounds = &self.texture_bounds;
        let convert = self.config.convert_to_opengl;

        let generate = |entity: &mut SolidEntity| {
            entity.generate_mesh(texture_types, texture_bounds);
            if csg {
                entity.csg_union();
            }
            if convert {
                entity.convert_to_opengl();
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.map_file.solid_entities.par_iter_mut().for_each(generate);
        }
        #[cfg(not(feature = "parallel"))]
        self.map_file.solid_entities.iter_mut().for_each(generate);

        if convert {
            for pe in &mut self.map_file.point_entities {
                pe.origin = math::to_opengl(&pe.origin);
                pe.angle += 180.0;
            }
        }

        log::debug!(
            "generated geometry for {} solid entities (csg: {csg})",
            self.map_file.solid_entities.len()
        );
    }

    /// Per-texture render batches for one entity, with the four-way
    /// batch weld applied.
    pub fn entity_meshes(&self, entity: &SolidEntity) -> Vec<RenderMesh> {
        mesh::batch_entity_meshes(entity, self.map_file.textures(), &self.texture_bounds)
    }
}
