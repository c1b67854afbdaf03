// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lightmap atlas packing for `.map`-sourced geometry.
//!
//! The packer only assigns chart rectangles and writes normalized
//! per-vertex lightmap UVs; filling the atlas with actual illumination is
//! a consumer's job. The placeholder image it produces (mid-gray charts
//! with dark borders) exists for debugging.

use quake_lite_core::error::{Error, Result};
use quake_lite_core::math::Vec2;
use quake_lite_core::surface::SurfaceType;

use crate::entity::SolidEntity;

#[derive(Debug, Clone, Copy)]
struct ChartEntry {
    entity: usize,
    brush: usize,
    face: usize,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

/// Shelf-packs one chart per SOLID face into a fixed-size atlas.
#[derive(Debug)]
pub struct LightmapPacker {
    width: u32,
    height: u32,
    luxel_size: f32,
    entries: Vec<ChartEntry>,
    data: Vec<u8>,
}

impl LightmapPacker {
    pub fn new(width: u32, height: u32, luxel_size: f32) -> Self {
        Self {
            width,
            height,
            luxel_size,
            entries: Vec::new(),
            data: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The placeholder atlas image (RGBA). Empty until [`pack`](Self::pack)
    /// succeeds.
    #[inline]
    pub fn atlas_data(&self) -> &[u8] {
        &self.data
    }

    /// Chart rectangles `(x, y, w, h)` assigned by the last pack, for
    /// consumers that bake their own illumination.
    pub fn charts(&self) -> impl Iterator<Item = (u32, u32, u32, u32)> + '_ {
        self.entries.iter().map(|e| (e.x, e.y, e.w, e.h))
    }

    /// Packs every SOLID face of every entity and rewrites the faces'
    /// vertex lightmap UVs as normalized atlas coordinates.
    ///
    /// Fails with [`Error::AtlasOverflow`] when the charts do not fit;
    /// the caller should retry with a bigger atlas.
    pub fn pack(&mut self, entities: &mut [SolidEntity]) -> Result<()> {
        self.entries.clear();

        for (ei, entity) in entities.iter().enumerate() {
            for (bi, brush) in entity.brushes().iter().enumerate() {
                for (fi, face) in brush.faces().iter().enumerate() {
                    if face.kind() != SurfaceType::Solid {
                        continue;
                    }
                    let Some((min_uv, max_uv)) = face_chart_extents(face) else {
                        continue;
                    };
                    let w = (((max_uv.x - min_uv.x) / self.luxel_size).ceil() as i64 + 1).max(1);
                    let h = (((max_uv.y - min_uv.y) / self.luxel_size).ceil() as i64 + 1).max(1);
                    self.entries.push(ChartEntry {
                        entity: ei,
                        brush: bi,
                        face: fi,
                        x: 0,
                        y: 0,
                        w: w as u32,
                        h: h as u32,
                    });
                }
            }
        }

        // tallest charts first keeps shelf waste low
        self.entries.sort_by(|a, b| b.h.cmp(&a.h));

        let mut cursor_x = 0u32;
        let mut cursor_y = 0u32;
        let mut row_h = 0u32;
        for entry in &mut self.entries {
            if cursor_x + entry.w > self.width {
                cursor_y += row_h;
                cursor_x = 0;
                row_h = 0;
            }
            if cursor_y + entry.h > self.height {
                log::warn!(
                    "lightmap atlas {}x{} full while packing a {}x{} chart",
                    self.width,
                    self.height,
                    entry.w,
                    entry.h
                );
                return Err(Error::AtlasOverflow {
                    width: self.width,
                    height: self.height,
                });
            }
            entry.x = cursor_x;
            entry.y = cursor_y;
            row_h = row_h.max(entry.h);
            cursor_x += entry.w;
        }

        for entry in &self.entries {
            let entity = &mut entities[entry.entity];
            let brushes = if entity.was_clipped() {
                &mut entity.clipped_brushes
            } else {
                &mut entity.brushes
            };
            let face = &mut brushes[entry.brush].faces[entry.face];

            let Some((min_uv, _)) = face_chart_extents(face) else {
                continue;
            };
            let luxel = self.luxel_size;
            let (width, height) = (self.width as f32, self.height as f32);
            let locals: Vec<Vec2> = face
                .vertices()
                .iter()
                .map(|v| face.calc_lightmap_uv(&v.point))
                .collect();
            for (v, local) in face.vertices_mut().iter_mut().zip(locals) {
                let u = (local.x - min_uv.x) / luxel + entry.x as f32;
                let vv = (local.y - min_uv.y) / luxel + entry.y as f32;
                v.lightmap_uv = Vec2::new(u / width, vv / height);
            }
        }

        self.generate_atlas_image();
        Ok(())
    }

    fn generate_atlas_image(&mut self) {
        let (w, h) = (self.width as usize, self.height as usize);
        self.data = vec![127u8; w * h * 4];
        for px in self.data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        for entry in &self.entries {
            for y in entry.y..entry.y + entry.h {
                for x in entry.x..entry.x + entry.w {
                    if x >= self.width || y >= self.height {
                        continue;
                    }
                    let border = x == entry.x
                        || x == entry.x + entry.w - 1
                        || y == entry.y
                        || y == entry.y + entry.h - 1;
                    let value = if border { 32 } else { 192 };
                    let index = (y as usize * w + x as usize) * 4;
                    self.data[index] = value;
                    self.data[index + 1] = value;
                    self.data[index + 2] = value;
                    self.data[index + 3] = 255;
                }
            }
        }
    }
}

fn face_chart_extents(face: &crate::face::Face) -> Option<(Vec2, Vec2)> {
    let mut iter = face.vertices().iter();
    let first = iter.next()?;
    let mut min_uv = face.calc_lightmap_uv(&first.point);
    let mut max_uv = min_uv;
    for v in iter {
        let uv = face.calc_lightmap_uv(&v.point);
        min_uv = min_uv.inf(&uv);
        max_uv = max_uv.sup(&uv);
    }
    Some((min_uv, max_uv))
}
