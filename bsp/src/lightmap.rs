// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Monolithic lightmap atlas for BSP surfaces.
//!
//! Every lit surface's pre-computed sample grid (smax x tmax luxels)
//! becomes one chart; charts are shelf-packed into a fixed-width atlas
//! and the vertices' lightmap UVs are rewritten to normalized atlas
//! coordinates with the half-luxel center offset. All unlit surfaces
//! share one minimal black chart, so unlit geometry costs constant
//! atlas space.

use quake_lite_core::math::Vec2;

use crate::surface::BspSurface;

/// Atlas width in luxels.
const ATLAS_WIDTH: u32 = 1024;

/// The packed RGBA lightmap atlas.
#[derive(Debug, Clone, Default)]
pub struct LightmapAtlas {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA.
    pub data: Vec<u8>,
}

struct Chart {
    /// Index of the lit surface this chart belongs to; `None` for the
    /// shared black chart.
    surface: Option<usize>,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

/// Packs every lit surface's sample grid and rewrites vertex lightmap
/// UVs. Unlit surfaces all map onto a single black chart.
///
/// `lighting` holds RGB triples (the `.lit` payload or the promoted
/// monochrome lump); an empty slice routes every surface to the black
/// chart.
pub fn pack_lightmaps(surfaces: &mut [BspSurface], lighting: &[u8]) -> LightmapAtlas {
    if surfaces.is_empty() {
        return LightmapAtlas::default();
    }

    // the shared black chart comes first; lit surfaces get their own
    let mut charts: Vec<Chart> = vec![Chart {
        surface: None,
        x: 0,
        y: 0,
        w: 1,
        h: 1,
    }];
    for (index, surface) in surfaces.iter().enumerate() {
        if surface.is_lit(lighting) {
            let (w, h) = surface.sample_size();
            charts.push(Chart {
                surface: Some(index),
                x: 0,
                y: 0,
                w,
                h,
            });
        }
    }
    // tallest charts first keeps shelf waste low
    charts.sort_by(|a, b| b.h.cmp(&a.h));

    let mut cursor_x = 0u32;
    let mut cursor_y = 0u32;
    let mut row_h = 0u32;
    for chart in &mut charts {
        if cursor_x + chart.w > ATLAS_WIDTH {
            cursor_y += row_h;
            cursor_x = 0;
            row_h = 0;
        }
        chart.x = cursor_x;
        chart.y = cursor_y;
        row_h = row_h.max(chart.h);
        cursor_x += chart.w;
    }
    let height = (cursor_y + row_h).max(1);

    let mut atlas = LightmapAtlas {
        width: ATLAS_WIDTH,
        height,
        data: vec![0u8; (ATLAS_WIDTH * height * 4) as usize],
    };
    // alpha is opaque everywhere; black charts need no further fill
    for px in atlas.data.chunks_exact_mut(4) {
        px[3] = 255;
    }

    let mut black = (0u32, 0u32);
    for chart in &charts {
        match chart.surface {
            Some(index) => {
                let surface = &mut surfaces[index];
                fill_chart(&mut atlas, chart, surface, lighting);
                write_vertex_uvs(&atlas, chart.x, chart.y, surface);
            }
            None => black = (chart.x, chart.y),
        }
    }

    // every unlit surface shares the black chart's origin
    for surface in surfaces.iter_mut() {
        if !surface.is_lit(lighting) {
            write_vertex_uvs(&atlas, black.0, black.1, surface);
        }
    }

    atlas
}

/// Copies a lit surface's RGB sample grid into its chart.
fn fill_chart(atlas: &mut LightmapAtlas, chart: &Chart, surface: &BspSurface, lighting: &[u8]) {
    let (smax, tmax) = surface.sample_size();
    let base = surface.lightmap_offset as usize * 3;

    for t in 0..tmax {
        for s in 0..smax {
            let src = base + ((t * smax + s) as usize) * 3;
            let Some(rgb) = lighting.get(src..src + 3) else {
                log::warn!("lightmap samples truncated at offset {src}");
                return;
            };
            let dst = (((chart.y + t) * atlas.width + chart.x + s) * 4) as usize;
            atlas.data[dst..dst + 3].copy_from_slice(rgb);
        }
    }
}

/// Normalized atlas UV per vertex: texture-space position relative to
/// the surface's 16-luxel grid origin, half-luxel centered, offset by
/// the chart origin.
fn write_vertex_uvs(atlas: &LightmapAtlas, chart_x: u32, chart_y: u32, surface: &mut BspSurface) {
    let (width, height) = (atlas.width as f32, atlas.height as f32);
    let mins = surface.texture_mins;

    let uv_axes = match surface.face.uv_projection() {
        quake_lite_geometry::UvProjection::Valve { u, v } => (*u, *v),
        _ => return,
    };
    let (u_axis, v_axis) = uv_axes;

    for vertex in surface.face.vertices_mut() {
        let s = u_axis.xyz().dot(&vertex.point) + u_axis.w;
        let t = v_axis.xyz().dot(&vertex.point) + v_axis.w;

        let u = (s - mins[0] as f32) / 16.0 + 0.5 + chart_x as f32;
        let v = (t - mins[1] as f32) / 16.0 + 0.5 + chart_y as f32;
        vertex.lightmap_uv = Vec2::new(u / width, v / height);
    }
}
