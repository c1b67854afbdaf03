// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end `.map` parsing and geometry tests over inline fixtures.

use std::path::Path;

use quake_lite_core::config::Config;
use quake_lite_core::error::Error;
use quake_lite_core::math::Vec3;
use quake_lite_core::surface::SurfaceType;
use quake_lite_geometry::{MapProvider, UvProjection};
use quake_lite_map::{QuakeMap, QuakeMapProvider, MapFile, VALVE_VERSION};

/// Worldspawn cube [0,64]^3, three point entities, one solid door.
fn create_standard_map() -> &'static str {
    r#"
// Game: Quake
{
"classname" "worldspawn"
"wad" "/gfx/base.wad;/gfx/water.wad"
"mapversion" "100"
{
( 0 64 64 ) ( 64 64 64 ) ( 64 0 64 ) ground1_1 0 0 0 1 1
( 0 0 0 ) ( 64 0 0 ) ( 64 64 0 ) ground1_1 0 0 0 1 1
( 64 0 0 ) ( 64 0 64 ) ( 64 64 64 ) city2_3 0 0 0 1 1
( 0 0 0 ) ( 0 64 0 ) ( 0 64 64 ) city2_3 0 0 0 1 1
( 64 64 0 ) ( 64 64 64 ) ( 0 64 64 ) city2_3 0 0 0 1 1
( 0 0 0 ) ( 0 0 64 ) ( 64 0 64 ) city2_3 0 0 0 1 1
}
}
{
"classname" "light"
"origin" "32 32 48"
"light" "150"
}
{
"classname" "info_player_start"
"origin" "32 32 24"
"angle" "90"
}
{
"classname" "monster_army"
"origin" "48 16 24"
}
{
"classname" "func_door"
"angle" "-1"
"speed" "100"
"wait" "3"
{
( 0 64 192 ) ( 64 64 192 ) ( 64 0 192 ) door02_1 0 0 0 1 1
( 0 0 128 ) ( 64 0 128 ) ( 64 64 128 ) door02_1 0 0 0 1 1
( 64 0 128 ) ( 64 0 192 ) ( 64 64 192 ) door02_1 0 0 0 1 1
( 0 0 128 ) ( 0 64 128 ) ( 0 64 192 ) door02_1 0 0 0 1 1
( 64 64 128 ) ( 64 64 192 ) ( 0 64 192 ) door02_1 0 0 0 1 1
( 0 0 128 ) ( 0 0 192 ) ( 64 0 192 ) door02_1 0 0 0 1 1
}
}
"#
}

fn create_valve_map() -> &'static str {
    r#"
// Format: Valve
{
"classname" "worldspawn"
"mapversion" "220"
{
( 0 64 64 ) ( 64 64 64 ) ( 64 0 64 ) ground1_1 [ 1 0 0 0 ] [ 0 -1 0 0 ] 0 1 1
( 0 0 0 ) ( 64 0 0 ) ( 64 64 0 ) ground1_1 [ 1 0 0 0 ] [ 0 -1 0 0 ] 0 1 1
( 64 0 0 ) ( 64 0 64 ) ( 64 64 64 ) ground1_1 [ 0 1 0 0 ] [ 0 0 -1 0 ] 0 1 1
( 0 0 0 ) ( 0 64 0 ) ( 0 64 64 ) ground1_1 [ 0 1 0 0 ] [ 0 0 -1 0 ] 0 1 1
( 64 64 0 ) ( 64 64 64 ) ( 0 64 64 ) ground1_1 [ 1 0 0 0 ] [ 0 0 -1 0 ] 0 1 1
( 0 0 0 ) ( 0 0 64 ) ( 64 0 64 ) ground1_1 [ 1 0 0 0 ] [ 0 0 -1 0 ] 0 1 1
}
}
"#
}

#[test]
fn parse_entity_population() {
    let map = QuakeMap::load_str(create_standard_map(), Path::new("<test>"), Config::default())
        .unwrap();

    assert_eq!(map.point_entities().len(), 3);
    assert_eq!(map.solid_entities().len(), 2);

    let ws = map.worldspawn().expect("worldspawn present");
    assert_eq!(ws.classname, "worldspawn");

    let door = &map.solid_entities()[1];
    assert_eq!(door.classname, "func_door");
    assert_eq!(door.attributes.get("speed").map(String::as_str), Some("100"));
    assert_eq!(door.attributes.get("wait").map(String::as_str), Some("3"));

    let lights = map.point_entities_by_class("light");
    assert_eq!(lights.len(), 1);
    assert_eq!(lights[0].origin, Vec3::new(32.0, 32.0, 48.0));
}

#[test]
fn wads_and_version() {
    let map = QuakeMap::load_str(create_standard_map(), Path::new("<test>"), Config::default())
        .unwrap();
    assert!(map.has_wads());
    assert_eq!(map.wads(), ["base.wad", "water.wad"]);
    assert_eq!(map.map_file().map_version(), 100);
}

#[test]
fn texture_table_is_first_use_ordered() {
    let map = QuakeMap::load_str(create_standard_map(), Path::new("<test>"), Config::default())
        .unwrap();
    assert_eq!(map.texture_names(), ["ground1_1", "city2_3", "door02_1"]);
    assert_eq!(map.texture_name(1), "city2_3");
    assert_eq!(map.texture_name(99), "");
}

#[test]
fn generate_and_batch_cube() {
    let mut map =
        QuakeMap::load_str(create_standard_map(), Path::new("<test>"), Config::default())
            .unwrap();
    map.generate_geometry(true);

    let ws = map.worldspawn().unwrap();
    assert!(ws.was_clipped());

    let meshes = map.entity_meshes(ws);
    // cube faces use two textures -> two batches, ascending id order
    assert_eq!(meshes.len(), 2);
    assert_eq!(meshes[0].texture_name, "ground1_1");
    assert_eq!(meshes[1].texture_name, "city2_3");

    // top + bottom quads: 8 welded vertices, 4 triangles
    assert_eq!(meshes[0].vertices.len(), 8);
    assert_eq!(meshes[0].indices.len(), 12);
    // four side quads
    assert_eq!(meshes[1].vertices.len(), 16);
    assert_eq!(meshes[1].indices.len(), 24);

    for mesh in &meshes {
        assert_eq!(mesh.surface_type, SurfaceType::Solid);
        for &index in &mesh.indices {
            assert!((index as usize) < mesh.vertices.len());
        }
    }
}

#[test]
fn entity_queries_and_attribute_accessors() {
    let mut map =
        QuakeMap::load_str(create_standard_map(), Path::new("<test>"), Config::default())
            .unwrap();
    map.generate_geometry(true);

    let doors = map.solid_entities_by_class("func_door");
    assert_eq!(doors.len(), 1);
    assert_eq!(doors[0].attribute_f32("speed"), 100.0);
    assert_eq!(doors[0].attribute_str("wait"), "3");
    assert!(doors[0].class_contains("door"));

    // the worldspawn's side walls use city2_3
    let ws = map.worldspawn().unwrap();
    let walls = map.polygons_by_texture(ws, "city2_3");
    assert!(!walls.is_empty());
    assert!(walls
        .iter()
        .all(|f| map.texture_name(f.texture_id()) == "city2_3"));
    assert!(map.polygons_by_texture(ws, "no_such_texture").is_empty());
}

#[test]
fn valve_format_projection() {
    let map = QuakeMap::load_str(create_valve_map(), Path::new("<test>"), Config::default())
        .unwrap();
    assert_eq!(map.map_file().map_version(), VALVE_VERSION);

    let ws = map.worldspawn().unwrap();
    let face = &ws.original_brushes()[0].faces()[0];
    assert!(matches!(face.uv_projection(), UvProjection::Valve { .. }));
}

#[test]
fn coordinate_conversion_moves_origins_and_angles() {
    let config = Config { convert_to_opengl: true };
    let mut map = QuakeMap::load_str(create_standard_map(), Path::new("<test>"), config).unwrap();
    map.generate_geometry(false);

    let starts = map.point_entities_by_class("info_player_start");
    let start = starts[0];
    // (32, 32, 24) -> (32, 24, -32)
    assert_eq!(start.origin, Vec3::new(32.0, 24.0, -32.0));
    assert_eq!(start.angle, 270.0);

    // vertex positions follow the same mapping: everything from the
    // [0,64]^3 cube lands in y up / -z left space
    let ws = map.worldspawn().unwrap();
    for brush in ws.brushes() {
        for face in brush.faces() {
            for v in face.vertices() {
                assert!(v.point.y >= 0.0 && v.point.y <= 64.0);
                assert!(v.point.z >= -64.0 && v.point.z <= 0.0);
            }
        }
    }
}

#[test]
fn malformed_plane_line_reports_line_number() {
    let broken = "{\n\"classname\" \"worldspawn\"\n{\n( 0 0 0 ) ( 0 1 0 ) ( 1 0 0 ) tex 0 0\n}\n}\n";
    let err = MapFile::parse_str(broken, Path::new("broken.map")).unwrap_err();
    match err {
        Error::Malformed { path, reason } => {
            assert_eq!(path, Path::new("broken.map"));
            assert!(reason.contains("line 4"), "unexpected reason: {reason}");
        }
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[test]
fn provider_roundtrip_with_overrides() {
    let dir = std::env::temp_dir();
    let path = dir.join("quake_lite_provider_test.map");
    std::fs::write(&path, create_standard_map()).unwrap();

    let mut provider = QuakeMapProvider::default();
    provider.set_texture_bounds_provider(Box::new(|name: &str| {
        if name == "ground1_1" {
            Some((64u32, 64u32))
        } else {
            Some((128u32, 128u32))
        }
    }));
    provider.load(&path).unwrap();
    provider.set_face_type("DOOR02_1", SurfaceType::Nodraw);
    provider.generate_geometry(true);

    assert_eq!(provider.required_wads(), ["base.wad", "water.wad"]);
    assert_eq!(provider.solid_entities().len(), 2);
    assert_eq!(provider.point_entities().len(), 3);

    // case-insensitive face type override applies to the door's faces
    let door = &provider.solid_entities()[1];
    let meshes = provider.entity_meshes(door);
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].surface_type, SurfaceType::Nodraw);
    assert_eq!(meshes[0].texture_name, "door02_1");
    assert_eq!((meshes[0].width, meshes[0].height), (128, 128));

    let ws = provider.solid_entities()[0].clone();
    let ws_meshes = provider.entity_meshes(&ws);
    assert_eq!((ws_meshes[0].width, ws_meshes[0].height), (64, 64));

    std::fs::remove_file(&path).ok();
}

#[test]
fn lightmap_packing_through_the_provider() {
    let dir = std::env::temp_dir();
    let path = dir.join("quake_lite_lightmap_test.map");
    std::fs::write(&path, create_standard_map()).unwrap();

    let mut provider = QuakeMapProvider::default();
    provider.load(&path).unwrap();
    provider.generate_geometry(true);
    provider.pack_lightmap(128, 128, 16.0).unwrap();

    let atlas = provider.lightmap_data().expect("atlas after packing");
    assert_eq!((atlas.width, atlas.height), (128, 128));
    assert_eq!(atlas.data.len(), 128 * 128 * 4);

    std::fs::remove_file(&path).ok();
}
