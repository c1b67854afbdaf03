// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`MapProvider`] implementation for compiled BSP files.

use std::path::Path;

use quake_lite_core::config::Config;
use quake_lite_core::entity::PointEntity;
use quake_lite_core::error::Result;
use quake_lite_core::math;
use quake_lite_core::surface::{RenderMesh, SurfaceType, TextureData};
use quake_lite_geometry::{mesh, MapProvider, SolidEntity, TextureBounds};
use quake_lite_wad::Palette;
use rustc_hash::FxHashMap;

use crate::entity::build_entities;
use crate::file::BspFile;
use crate::lightmap::{pack_lightmaps, LightmapAtlas};
use crate::surface::BspSurface;

/// Loads compiled BSPs and exposes them through the shared provider
/// interface, interchangeably with the `.map` provider. Geometry
/// arrives pre-partitioned and lit, so [`generate_geometry`]
/// (MapProvider::generate_geometry) is a no-op and CSG is bypassed.
pub struct BspProvider {
    config: Config,
    file: Option<BspFile>,
    surfaces: Vec<BspSurface>,
    solid_entities: Vec<SolidEntity>,
    point_entities: Vec<PointEntity>,
    texture_names: Vec<String>,
    texture_bounds: FxHashMap<usize, (f32, f32)>,
    face_types: FxHashMap<String, SurfaceType>,
    atlas: LightmapAtlas,
    palette: Palette,
}

impl Default for BspProvider {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl BspProvider {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            file: None,
            surfaces: Vec::new(),
            solid_entities: Vec::new(),
            point_entities: Vec::new(),
            texture_names: Vec::new(),
            texture_bounds: FxHashMap::default(),
            face_types: FxHashMap::default(),
            atlas: LightmapAtlas::default(),
            palette: Palette::grayscale(),
        }
    }

    /// Installs the palette used for texture decoding. The default is
    /// the grayscale ramp; install a real palette (e.g. from a WAD's
    /// palette lump) for faithful colors.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// The decoded file, when loaded.
    #[inline]
    pub fn file(&self) -> Option<&BspFile> {
        self.file.as_ref()
    }

    /// The worldspawn entity, present in any valid BSP.
    pub fn worldspawn(&self) -> Option<&SolidEntity> {
        self.solid_entities
            .iter()
            .find(|e| e.classname == "worldspawn")
    }

    fn surface_type_for(&self, texture_name: &str) -> Option<SurfaceType> {
        self.face_types.get(texture_name).copied().or_else(|| {
            self.face_types
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(texture_name))
                .map(|(_, &kind)| kind)
        })
    }
}

impl MapProvider for BspProvider {
    fn load(&mut self, path: &Path) -> Result<()> {
        let file = BspFile::load(path)?;

        // surface list stays index-aligned with the face lump; model
        // face ranges index into it
        let mut surfaces: Vec<BspSurface> = Vec::with_capacity(file.faces.len());
        for (index, record) in file.faces.iter().enumerate() {
            match BspSurface::build(&file, record) {
                Some(surface) => surfaces.push(surface),
                None => {
                    log::warn!("face {index} is degenerate or out of range, keeping placeholder");
                    surfaces.push(BspSurface::empty(record));
                }
            }
        }

        self.atlas = pack_lightmaps(&mut surfaces, &file.lighting);

        let entities = build_entities(&file, &surfaces)?;
        self.solid_entities = entities.solid_entities;
        self.point_entities = entities.point_entities;

        self.texture_names = file
            .textures
            .iter()
            .map(|t| t.as_ref().map(|t| t.name.clone()).unwrap_or_default())
            .collect();
        self.texture_bounds = file
            .textures
            .iter()
            .enumerate()
            .filter_map(|(i, t)| {
                t.as_ref().map(|t| (i, (t.width as f32, t.height as f32)))
            })
            .collect();

        if self.config.convert_to_opengl {
            for entity in &mut self.solid_entities {
                entity.convert_to_opengl();
            }
            for entity in &mut self.point_entities {
                entity.origin = math::to_opengl(&entity.origin);
                entity.angle += 180.0;
            }
        }

        self.file = Some(file);
        Ok(())
    }

    fn set_texture_bounds_provider(&mut self, _provider: Box<dyn TextureBounds>) {
        // BSPs embed their texture dimensions
    }

    fn set_face_type(&mut self, texture_name: &str, kind: SurfaceType) {
        self.face_types.insert(texture_name.to_string(), kind);
    }

    fn generate_geometry(&mut self, _csg: bool) {
        // BSP geometry is already generated
    }

    fn solid_entities(&self) -> &[SolidEntity] {
        &self.solid_entities
    }

    fn point_entities(&self) -> &[PointEntity] {
        &self.point_entities
    }

    fn texture_names(&self) -> &[String] {
        &self.texture_names
    }

    fn entity_meshes(&self, entity: &SolidEntity) -> Vec<RenderMesh> {
        let mut meshes =
            mesh::batch_entity_meshes(entity, &self.texture_names, &self.texture_bounds);
        for batch in &mut meshes {
            if let Some(kind) = self.surface_type_for(&batch.texture_name) {
                batch.surface_type = kind;
            }
        }
        meshes
    }

    fn texture_data(&self, name: &str) -> Option<TextureData> {
        let file = self.file.as_ref()?;
        let texture = file
            .textures
            .iter()
            .flatten()
            .find(|t| t.name.eq_ignore_ascii_case(name))?;
        Some(TextureData::new(
            texture.width,
            texture.height,
            self.palette.decode(&texture.texels),
        ))
    }

    fn lightmap_data(&self) -> Option<TextureData> {
        if self.atlas.data.is_empty() {
            return None;
        }
        Some(TextureData::new(
            self.atlas.width,
            self.atlas.height,
            self.atlas.data.clone(),
        ))
    }
}
