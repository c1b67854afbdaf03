// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lightmap atlas packing over built cube geometry.

mod common;

use common::{create_block, entity_with_blocks};
use quake_lite_core::error::Error;
use quake_lite_core::math::Vec3;
use quake_lite_geometry::LightmapPacker;

#[test]
fn charts_do_not_overlap_and_stay_in_bounds() {
    let mut entities = vec![entity_with_blocks(vec![
        create_block(Vec3::zeros(), Vec3::new(64.0, 64.0, 64.0)),
        create_block(Vec3::new(200.0, 0.0, 0.0), Vec3::new(264.0, 64.0, 64.0)),
    ])];

    let mut packer = LightmapPacker::new(128, 128, 16.0);
    packer.pack(&mut entities).expect("atlas should fit");

    let charts: Vec<(u32, u32, u32, u32)> = packer.charts().collect();
    assert!(!charts.is_empty());

    for (i, a) in charts.iter().enumerate() {
        assert!(a.0 + a.2 <= 128 && a.1 + a.3 <= 128, "chart out of bounds");
        for b in charts.iter().skip(i + 1) {
            let disjoint =
                a.0 + a.2 <= b.0 || b.0 + b.2 <= a.0 || a.1 + a.3 <= b.1 || b.1 + b.3 <= a.1;
            assert!(disjoint, "charts overlap: {a:?} vs {b:?}");
        }
    }
}

#[test]
fn vertex_lightmap_uvs_are_normalized() {
    let mut entities = vec![entity_with_blocks(vec![create_block(
        Vec3::zeros(),
        Vec3::new(64.0, 64.0, 64.0),
    )])];

    let mut packer = LightmapPacker::new(64, 64, 16.0);
    packer.pack(&mut entities).expect("atlas should fit");

    for brush in entities[0].brushes() {
        for face in brush.faces() {
            for v in face.vertices() {
                assert!(
                    (0.0..=1.0).contains(&v.lightmap_uv.x)
                        && (0.0..=1.0).contains(&v.lightmap_uv.y),
                    "lightmap uv out of range: {:?}",
                    v.lightmap_uv
                );
            }
        }
    }

    assert_eq!(packer.atlas_data().len(), 64 * 64 * 4);
}

#[test]
fn tiny_atlas_overflows() {
    let mut entities = vec![entity_with_blocks(vec![create_block(
        Vec3::zeros(),
        Vec3::new(512.0, 512.0, 512.0),
    )])];

    let mut packer = LightmapPacker::new(8, 8, 16.0);
    let err = packer.pack(&mut entities).unwrap_err();
    assert!(matches!(err, Error::AtlasOverflow { width: 8, height: 8 }));
}

#[test]
fn chart_size_follows_lightmap_extents() {
    // a 64-unit face at 16 units per luxel spans 4 luxels, chart is 5
    let mut entities = vec![entity_with_blocks(vec![create_block(
        Vec3::zeros(),
        Vec3::new(64.0, 64.0, 64.0),
    )])];

    let mut packer = LightmapPacker::new(64, 64, 16.0);
    packer.pack(&mut entities).expect("atlas should fit");

    for (_, _, w, h) in packer.charts() {
        assert_eq!((w, h), (5, 5));
    }
}
