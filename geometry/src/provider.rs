// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The consumer-facing provider interface.
//!
//! Both adapters (editor source maps and compiled BSPs) expose their
//! entities, meshes and texture data through [`MapProvider`], making them
//! interchangeable to renderers.

use std::path::Path;

use quake_lite_core::entity::PointEntity;
use quake_lite_core::error::Result;
use quake_lite_core::surface::{RenderMesh, SurfaceType, TextureData};

use crate::entity::SolidEntity;

/// Texture dimension lookup, installed by the consumer that owns the
/// texture archives.
pub trait TextureBounds {
    /// `(width, height)` for a texture name, or `None` when unknown.
    /// Unknown bounds are not an error: affected faces get world-scale
    /// UVs.
    fn texture_bounds(&self, name: &str) -> Option<(u32, u32)>;
}

impl<F> TextureBounds for F
where
    F: Fn(&str) -> Option<(u32, u32)>,
{
    fn texture_bounds(&self, name: &str) -> Option<(u32, u32)> {
        self(name)
    }
}

/// Uniform access to a loaded Quake level, whatever its source format.
pub trait MapProvider {
    /// Loads and parses the level. Parse errors abort the load; no
    /// partial entity list is exposed.
    fn load(&mut self, path: &Path) -> Result<()>;

    /// Installs the texture dimension lookup used for UV calculation.
    fn set_texture_bounds_provider(&mut self, provider: Box<dyn TextureBounds>);

    /// Overrides the surface type of every face using `texture_name`
    /// (exact match, case-insensitive fallback).
    fn set_face_type(&mut self, texture_name: &str, kind: SurfaceType);

    /// Runs the geometry pipeline. `csg` controls whether overlapping
    /// brushes are clipped against each other; pre-partitioned sources
    /// ignore it.
    fn generate_geometry(&mut self, csg: bool);

    /// Solid entities in parse order.
    fn solid_entities(&self) -> &[SolidEntity];

    /// Point entities in parse order.
    fn point_entities(&self) -> &[PointEntity];

    /// Distinct texture names in first-use order; a face's texture id is
    /// its index here.
    fn texture_names(&self) -> &[String];

    /// WAD archives the level requires. Only meaningful for `.map`
    /// sources; BSPs return an empty list.
    fn required_wads(&self) -> Vec<String> {
        Vec::new()
    }

    /// Per-texture render batches for one entity.
    fn entity_meshes(&self, entity: &SolidEntity) -> Vec<RenderMesh>;

    /// Decoded RGBA pixels for a texture, when the source embeds them
    /// (BSPs do; `.map` sources rely on external WADs).
    fn texture_data(&self, _name: &str) -> Option<TextureData> {
        None
    }

    /// The packed lightmap atlas, when one exists.
    fn lightmap_data(&self) -> Option<TextureData> {
        None
    }
}
