// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`MapProvider`] implementation for `.map` source files.

use std::path::Path;

use quake_lite_core::config::Config;
use quake_lite_core::entity::PointEntity;
use quake_lite_core::error::Result;
use quake_lite_core::surface::{RenderMesh, SurfaceType, TextureData};
use quake_lite_geometry::{LightmapPacker, MapProvider, SolidEntity, TextureBounds};

use crate::qmap::QuakeMap;

/// Loads Quake source map files and exposes them through the shared
/// provider interface, interchangeably with the BSP provider.
///
/// On load the conventional texture overrides are applied: `clip` and
/// `trigger` become [`SurfaceType::Clip`], `skip` becomes
/// [`SurfaceType::Skip`].
#[derive(Default)]
pub struct QuakeMapProvider {
    config: Config,
    map: Option<QuakeMap>,
    bounds_provider: Option<Box<dyn TextureBounds>>,
    packer: Option<LightmapPacker>,
}

impl QuakeMapProvider {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The loaded map, if any.
    #[inline]
    pub fn map(&self) -> Option<&QuakeMap> {
        self.map.as_ref()
    }

    /// Packs the lightmap atlas for all solid entities, rewriting vertex
    /// lightmap UVs to normalized atlas coordinates. Run after
    /// [`generate_geometry`](MapProvider::generate_geometry); the
    /// placeholder atlas becomes available through
    /// [`lightmap_data`](MapProvider::lightmap_data).
    pub fn pack_lightmap(&mut self, width: u32, height: u32, luxel_size: f32) -> Result<()> {
        let Some(map) = self.map.as_mut() else {
            return Ok(());
        };
        let mut packer = LightmapPacker::new(width, height, luxel_size);
        packer.pack(map.solid_entities_mut())?;
        self.packer = Some(packer);
        Ok(())
    }
}

impl MapProvider for QuakeMapProvider {
    fn load(&mut self, path: &Path) -> Result<()> {
        let mut map = QuakeMap::load_file(path, self.config)?;

        // conventional special textures
        map.set_face_type_by_texture("clip", SurfaceType::Clip);
        map.set_face_type_by_texture("trigger", SurfaceType::Clip);
        map.set_face_type_by_texture("skip", SurfaceType::Skip);

        if let Some(provider) = self.bounds_provider.as_deref() {
            map.register_texture_bounds(provider);
        }
        self.map = Some(map);
        Ok(())
    }

    fn set_texture_bounds_provider(&mut self, provider: Box<dyn TextureBounds>) {
        if let Some(map) = self.map.as_mut() {
            map.register_texture_bounds(provider.as_ref());
        }
        self.bounds_provider = Some(provider);
    }

    fn set_face_type(&mut self, texture_name: &str, kind: SurfaceType) {
        if let Some(map) = self.map.as_mut() {
            map.set_face_type_by_texture(texture_name, kind);
        }
    }

    fn generate_geometry(&mut self, csg: bool) {
        if let Some(map) = self.map.as_mut() {
            map.generate_geometry(csg);
        }
    }

    fn solid_entities(&self) -> &[SolidEntity] {
        self.map.as_ref().map(QuakeMap::solid_entities).unwrap_or(&[])
    }

    fn point_entities(&self) -> &[PointEntity] {
        self.map.as_ref().map(QuakeMap::point_entities).unwrap_or(&[])
    }

    fn texture_names(&self) -> &[String] {
        self.map.as_ref().map(QuakeMap::texture_names).unwrap_or(&[])
    }

    fn required_wads(&self) -> Vec<String> {
        self.map
            .as_ref()
            .map(|m| m.wads().to_vec())
            .unwrap_or_default()
    }

    fn entity_meshes(&self, entity: &SolidEntity) -> Vec<RenderMesh> {
        self.map
            .as_ref()
            .map(|m| m.entity_meshes(entity))
            .unwrap_or_default()
    }

    fn lightmap_data(&self) -> Option<TextureData> {
        let packer = self.packer.as_ref()?;
        if packer.atlas_data().is_empty() {
            return None;
        }
        Some(TextureData::new(
            packer.width(),
            packer.height(),
            packer.atlas_data().to_vec(),
        ))
    }
}
