// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end CSG scenarios over cube arrangements.

mod common;

use approx::assert_relative_eq;
use common::{create_block, entity_with_blocks, faces_at_x, total_area};
use quake_lite_core::math::Vec3;

#[test]
fn touching_cubes_share_exactly_one_wall() {
    // two cubes sharing the x = 64 wall
    let mut ent = entity_with_blocks(vec![
        create_block(Vec3::zeros(), Vec3::new(64.0, 64.0, 64.0)),
        create_block(Vec3::new(64.0, 0.0, 0.0), Vec3::new(128.0, 64.0, 64.0)),
    ]);
    ent.csg_union();

    assert!(ent.was_clipped());
    assert_eq!(ent.clipped_brushes().len(), 2);

    // the lower-index brush keeps its x = 64 wall, the other loses it;
    // quads arrive as two triangles after ear clipping
    assert_eq!(faces_at_x(&ent, 0, 64.0), 2);
    assert_eq!(faces_at_x(&ent, 1, 64.0), 0);

    // 6 + 5 quads in total
    let total: usize = ent
        .brushes()
        .iter()
        .map(|b| b.faces().len())
        .sum();
    assert_eq!(total, 22, "11 quads, two triangles each");

    // exactly one 64x64 quad of drawn wall at x = 64
    let wall_area: f32 = ent.brushes()[0]
        .faces()
        .iter()
        .filter(|f| f.vertices().iter().all(|v| (v.point.x - 64.0).abs() < 1e-3))
        .map(|f| {
            f.indices()
                .chunks_exact(3)
                .map(|tri| {
                    let p0 = f.vertices()[tri[0] as usize].point;
                    let p1 = f.vertices()[tri[1] as usize].point;
                    let p2 = f.vertices()[tri[2] as usize].point;
                    (p1 - p0).cross(&(p2 - p0)).norm() * 0.5
                })
                .sum::<f32>()
        })
        .sum();
    assert_relative_eq!(wall_area, 64.0 * 64.0, epsilon = 0.5);

    assert_eq!(ent.stats_clipped_faces(), 1);
}

#[test]
fn fully_hidden_brush_is_removed() {
    // a brush wholly inside another has its entire boundary hidden
    let mut ent = entity_with_blocks(vec![
        create_block(Vec3::zeros(), Vec3::new(100.0, 100.0, 100.0)),
        create_block(Vec3::new(25.0, 25.0, 25.0), Vec3::new(75.0, 75.0, 75.0)),
    ]);
    ent.csg_union();

    assert_eq!(ent.clipped_brushes().len(), 1);
    // the outer brush is untouched: 6 quads, 12 triangles after ear
    // clipping, full surface area
    assert_eq!(ent.brushes()[0].faces().len(), 12);
    assert_relative_eq!(total_area(&ent), 6.0 * 100.0 * 100.0, epsilon = 1.0);
}

#[test]
fn protruding_brush_is_trimmed_to_the_outside() {
    // a pillar poking out of the top of a room: the buried part of the
    // pillar's sides is clipped away
    let mut ent = entity_with_blocks(vec![
        create_block(Vec3::zeros(), Vec3::new(100.0, 100.0, 100.0)),
        create_block(Vec3::new(25.0, 25.0, 50.0), Vec3::new(75.0, 75.0, 150.0)),
    ]);
    ent.csg_union();

    assert_eq!(ent.clipped_brushes().len(), 2);

    // every surviving pillar side-wall vertex is at or above the roof
    let pillar = &ent.brushes()[1];
    for face in pillar.faces() {
        let n = face.plane_normal();
        if n.z.abs() < 0.5 {
            for v in face.vertices() {
                assert!(
                    v.point.z >= 100.0 - 1e-2,
                    "side wall extends into the room: z = {}",
                    v.point.z
                );
            }
        }
    }
    // something was actually clipped away
    assert!(ent.stats_clipped_faces() != 0 || pillar.faces().len() > 0);
    let (min, max) = pillar.faces()[0].bounds();
    assert!(min.z >= 0.0 && max.z <= 150.0);
}

#[test]
fn disjoint_cubes_are_untouched() {
    let mut ent = entity_with_blocks(vec![
        create_block(Vec3::zeros(), Vec3::new(64.0, 64.0, 64.0)),
        create_block(Vec3::new(200.0, 200.0, 200.0), Vec3::new(264.0, 264.0, 264.0)),
    ]);
    ent.csg_union();

    assert_eq!(ent.clipped_brushes().len(), 2);
    assert_eq!(ent.stats_clipped_faces(), 0);
    // 12 quads in total, each fanned into two triangles
    let total: usize = ent.brushes().iter().map(|b| b.faces().len()).sum();
    assert_eq!(total, 24);
}

#[test]
fn csg_is_idempotent() {
    let mut ent = entity_with_blocks(vec![
        create_block(Vec3::zeros(), Vec3::new(64.0, 64.0, 64.0)),
        create_block(Vec3::new(64.0, 0.0, 0.0), Vec3::new(128.0, 64.0, 64.0)),
    ]);
    ent.csg_union();
    let first_faces: usize = ent.brushes().iter().map(|b| b.faces().len()).sum();
    let first_area = total_area(&ent);
    let first_stats = ent.stats_clipped_faces();

    ent.csg_union();
    let second_faces: usize = ent.brushes().iter().map(|b| b.faces().len()).sum();
    assert_eq!(first_faces, second_faces);
    assert_relative_eq!(first_area, total_area(&ent), epsilon = 1e-2);
    assert_eq!(first_stats, ent.stats_clipped_faces());
}

#[test]
fn brush_order_flips_the_tie_break_but_preserves_area() {
    let a = create_block(Vec3::zeros(), Vec3::new(64.0, 64.0, 64.0));
    let b = create_block(Vec3::new(64.0, 0.0, 0.0), Vec3::new(128.0, 64.0, 64.0));

    let mut forward = entity_with_blocks(vec![a.clone(), b.clone()]);
    forward.csg_union();
    let mut reversed = entity_with_blocks(vec![b, a]);
    reversed.csg_union();

    // the coplanar wall swaps sides...
    assert_eq!(faces_at_x(&forward, 0, 64.0), 2);
    assert_eq!(faces_at_x(&forward, 1, 64.0), 0);
    assert_eq!(faces_at_x(&reversed, 0, 64.0), 2);
    assert_eq!(faces_at_x(&reversed, 1, 64.0), 0);

    // ...but the total drawn surface is identical
    assert_relative_eq!(total_area(&forward), total_area(&reversed), epsilon = 1e-2);
}

#[test]
fn weld_is_idempotent() {
    let mut ent = entity_with_blocks(vec![
        create_block(Vec3::zeros(), Vec3::new(64.0, 64.0, 64.0)),
        create_block(Vec3::new(64.0, 0.0, 0.0), Vec3::new(128.0, 64.0, 64.0)),
    ]);
    ent.csg_union();

    let snapshot: Vec<Vec3> = ent
        .brushes()
        .iter()
        .flat_map(|b| b.faces())
        .flat_map(|f| f.vertices())
        .map(|v| v.point)
        .collect();

    ent.weld_vertices();

    let after: Vec<Vec3> = ent
        .brushes()
        .iter()
        .flat_map(|b| b.faces())
        .flat_map(|f| f.vertices())
        .map(|v| v.point)
        .collect();
    assert_eq!(snapshot, after);
}

#[test]
fn nonsolid_brushes_bypass_csg() {
    use quake_lite_core::surface::SurfaceType;
    use rustc_hash::FxHashMap;

    let mut ent = quake_lite_geometry::SolidEntity::new(Default::default(), "worldspawn".into());
    ent.add_brush(create_block(Vec3::zeros(), Vec3::new(64.0, 64.0, 64.0)));
    ent.add_brush(common::create_textured_block(
        Vec3::new(32.0, 0.0, 0.0),
        Vec3::new(96.0, 64.0, 64.0),
        1,
    ));

    let mut types = FxHashMap::default();
    types.insert(1usize, SurfaceType::Clip);
    let mut bounds = FxHashMap::default();
    bounds.insert(0usize, (64.0f32, 64.0f32));
    ent.generate_mesh(&types, &bounds);
    ent.csg_union();

    // the clip brush is exported as-is and excludes itself from CSG, so
    // the solid cube is untouched as well
    assert_eq!(ent.clipped_brushes().len(), 2);
    assert_eq!(ent.stats_clipped_faces(), 0);
    assert!(ent.clipped_brushes()[1].is_block_volume());
    assert!(ent.clipped_brushes()[1].is_nonsolid());
}

#[test]
fn t_junction_pass_inserts_foreign_vertices_into_edges() {
    // the small cube's corner (64, 32, 0) lies mid-edge on the big
    // cube's x = 64 wall
    let mut ent = entity_with_blocks(vec![
        create_block(Vec3::zeros(), Vec3::new(64.0, 64.0, 64.0)),
        create_block(Vec3::new(64.0, 0.0, 0.0), Vec3::new(128.0, 32.0, 32.0)),
    ]);

    let wall_verts_before: usize = ent.brushes()[0]
        .faces()
        .iter()
        .filter(|f| f.plane_normal().x > 0.9)
        .map(|f| f.vertices().len())
        .sum();
    assert_eq!(wall_verts_before, 4);

    ent.weld_vertices();
    ent.fix_t_junctions();

    let wall = ent.brushes()[0]
        .faces()
        .iter()
        .find(|f| f.plane_normal().x > 0.9)
        .unwrap();
    assert!(
        wall.vertices().len() > 4,
        "edge points of the touching cube were not inserted"
    );
    assert!(wall
        .vertices()
        .iter()
        .any(|v| v.point == Vec3::new(64.0, 32.0, 0.0)));

    // inserted vertices take the exact foreign position and indices are
    // refreshed
    for &i in wall.indices() {
        assert!((i as usize) < wall.vertices().len());
    }
}

#[test]
fn collinear_pass_strips_straight_edge_vertices() {
    let mut ent = entity_with_blocks(vec![
        create_block(Vec3::zeros(), Vec3::new(64.0, 64.0, 64.0)),
        create_block(Vec3::new(64.0, 0.0, 0.0), Vec3::new(128.0, 32.0, 32.0)),
    ]);
    ent.weld_vertices();
    ent.fix_t_junctions();
    ent.remove_collinear_vertices();

    // the vertices the T-junction pass added sit exactly on straight
    // edges, so this pass takes them back out
    let wall = ent.brushes()[0]
        .faces()
        .iter()
        .find(|f| f.plane_normal().x > 0.9)
        .unwrap();
    assert_eq!(wall.vertices().len(), 4);
}

#[test]
fn triangles_wind_with_their_plane_normals() {
    let mut ent = entity_with_blocks(vec![
        create_block(Vec3::zeros(), Vec3::new(64.0, 64.0, 64.0)),
        create_block(Vec3::new(64.0, 0.0, 0.0), Vec3::new(128.0, 64.0, 64.0)),
    ]);
    ent.csg_union();

    for brush in ent.brushes() {
        for face in brush.faces() {
            for tri in face.indices().chunks_exact(3) {
                let p0 = face.vertices()[tri[0] as usize].point;
                let p1 = face.vertices()[tri[1] as usize].point;
                let p2 = face.vertices()[tri[2] as usize].point;
                let n = (p1 - p0).cross(&(p2 - p0));
                assert!(
                    n.dot(&face.plane_normal()) > 0.0,
                    "triangle winding disagrees with face plane"
                );
            }
        }
    }
}
