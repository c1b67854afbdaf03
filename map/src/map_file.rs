// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Low-level `.map` file parsing: entities, brush plane lines, the
//! texture name table and the WAD list.

use std::path::Path;

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    number::complete::float,
    sequence::preceded,
    IResult,
};

use quake_lite_core::entity::{
    attribute_str, collect_attributes, EntityKind, PointEntity, SourceLine,
};
use quake_lite_core::error::{Error, Result};
use quake_lite_core::math::{Vec2, Vec3, Vec4};
use quake_lite_core::parser::parse_entities;
use quake_lite_geometry::{Face, SolidEntity, UvProjection};

/// Standard axis-snapped texture projection.
pub const STANDARD_VERSION: i32 = 100;
/// Valve 220 free-axis texture projection.
pub const VALVE_VERSION: i32 = 220;

/// The parsed contents of one `.map` file.
#[derive(Debug, Default)]
pub struct MapFile {
    pub(crate) solid_entities: Vec<SolidEntity>,
    pub(crate) point_entities: Vec<PointEntity>,
    /// Index of the worldspawn entity in `solid_entities`.
    pub(crate) worldspawn: Option<usize>,
    /// Insertion-ordered distinct texture names; a face's texture id is
    /// its index here.
    pub(crate) textures: Vec<String>,
    pub(crate) wads: Vec<String>,
    pub(crate) map_version: i32,
}

impl MapFile {
    /// Reads and parses a `.map` file from disk.
    pub fn parse_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse_str(&text, path)
    }

    /// Parses `.map` text. `path` is used for error reporting only.
    pub fn parse_str(input: &str, path: &Path) -> Result<Self> {
        let parsed = parse_entities(input, path)?;
        let mut file = Self {
            map_version: STANDARD_VERSION,
            ..Self::default()
        };

        for entity in &parsed {
            match entity.kind {
                EntityKind::Point => {
                    file.point_entities.push(PointEntity::from_parsed(entity));
                }
                EntityKind::Solid | EntityKind::Worldspawn => {
                    let mut attributes = collect_attributes(&entity.lines);
                    let classname = attributes.remove("classname").unwrap_or_default();
                    let tb_name = attributes.remove("_tb_name").unwrap_or_default();
                    let tb_type = attributes.remove("_tb_type").unwrap_or_default();

                    if entity.kind == EntityKind::Worldspawn {
                        file.parse_wad_string(&attribute_str(&attributes, "wad"));
                        attributes.remove("wad");
                        if let Some(version) = attributes.get("mapversion") {
                            file.map_version =
                                version.trim().parse().unwrap_or(STANDARD_VERSION);
                        }
                    }

                    let mut solid = SolidEntity::new(attributes, classname);
                    solid.tb_name = tb_name;
                    solid.tb_type = tb_type;
                    for child in &entity.children {
                        let brush = file.parse_brush(child, path)?;
                        solid.add_brush(brush);
                    }

                    if entity.kind == EntityKind::Worldspawn {
                        file.worldspawn = Some(file.solid_entities.len());
                    }
                    file.solid_entities.push(solid);
                }
            }
        }

        Ok(file)
    }

    #[inline]
    pub fn map_version(&self) -> i32 {
        self.map_version
    }

    #[inline]
    pub fn textures(&self) -> &[String] {
        &self.textures
    }

    #[inline]
    pub fn wads(&self) -> &[String] {
        &self.wads
    }

    /// Returns the id of `texture`, appending it to the table when new.
    /// Ids are dense and first-use ordered.
    pub fn get_or_add_texture(&mut self, texture: &str) -> usize {
        if let Some(index) = self.textures.iter().position(|t| t == texture) {
            return index;
        }
        self.textures.push(texture.to_string());
        self.textures.len() - 1
    }

    fn parse_brush(
        &mut self,
        lines: &[SourceLine],
        path: &Path,
    ) -> Result<quake_lite_geometry::Brush> {
        let mut brush = quake_lite_geometry::Brush::default();
        for line in lines {
            let plane = parse_plane_line(&line.text, self.map_version).ok_or_else(|| {
                Error::malformed(
                    path,
                    format!("line {}: invalid plane definition", line.number),
                )
            })?;
            let texture_id = self.get_or_add_texture(&plane.texture);
            brush.add_face(Face::new(
                plane.points,
                texture_id,
                plane.uv,
                plane.rotation,
                plane.scale_x,
                plane.scale_y,
            ));
        }
        Ok(brush)
    }

    /// `"wad"` is a `;`-separated list of paths; only the final filename
    /// segment of each is kept.
    fn parse_wad_string(&mut self, wads: &str) {
        for item in wads.split(';') {
            if item.is_empty() {
                continue;
            }
            let name = item
                .rsplit(|c| c == '/' || c == '\\')
                .next()
                .unwrap_or(item);
            if !name.is_empty() {
                self.wads.push(name.to_string());
            }
        }
    }
}

struct PlaneLine {
    points: [Vec3; 3],
    texture: String,
    uv: UvProjection,
    rotation: f32,
    scale_x: f32,
    scale_y: f32,
}

fn ws_float(input: &str) -> IResult<&str, f32> {
    preceded(multispace0, float)(input)
}

fn delimited_triple(input: &str, open: char, close: char) -> IResult<&str, Vec3> {
    let (input, _) = preceded(multispace0, char(open))(input)?;
    let (input, x) = ws_float(input)?;
    let (input, y) = ws_float(input)?;
    let (input, z) = ws_float(input)?;
    let (input, _) = preceded(multispace0, char(close))(input)?;
    Ok((input, Vec3::new(x, y, z)))
}

fn point3(input: &str) -> IResult<&str, Vec3> {
    delimited_triple(input, '(', ')')
}

/// `[ ax ay az shift ]` of the Valve 220 format.
fn valve_axis(input: &str) -> IResult<&str, Vec4> {
    let (input, _) = preceded(multispace0, char('['))(input)?;
    let (input, x) = ws_float(input)?;
    let (input, y) = ws_float(input)?;
    let (input, z) = ws_float(input)?;
    let (input, w) = ws_float(input)?;
    let (input, _) = preceded(multispace0, char(']'))(input)?;
    Ok((input, Vec4::new(x, y, z, w)))
}

fn texture_token(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_while1(|c: char| !c.is_whitespace()))(input)
}

/// One brush plane line:
/// `( x y z ) ( x y z ) ( x y z ) <texture> <uv> <rot> <sx> <sy>`
/// where `<uv>` is two floats (version 100) or two bracketed axes
/// (version 220).
fn parse_plane_line(line: &str, map_version: i32) -> Option<PlaneLine> {
    let input = line;
    let (input, p0) = point3(input).ok()?;
    let (input, p1) = point3(input).ok()?;
    let (input, p2) = point3(input).ok()?;
    let (input, texture) = texture_token(input).ok()?;

    let (input, uv) = if map_version == VALVE_VERSION {
        let (input, u) = valve_axis(input).ok()?;
        let (input, v) = valve_axis(input).ok()?;
        (input, UvProjection::Valve { u, v })
    } else {
        let (input, u) = ws_float(input).ok()?;
        let (input, v) = ws_float(input).ok()?;
        (input, UvProjection::Standard { offset: Vec2::new(u, v) })
    };

    let (input, rotation) = ws_float(input).ok()?;
    let (input, scale_x) = ws_float(input).ok()?;
    let (_, scale_y) = ws_float(input).ok()?;

    Some(PlaneLine {
        points: [p0, p1, p2],
        texture: texture.to_string(),
        uv,
        rotation,
        scale_x,
        scale_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_plane_line() {
        let plane = parse_plane_line(
            "( -64 -64 -16 ) ( -64 -63 -16 ) ( -63 -64 -16 ) ground1_1 4 -8 0 1 1",
            STANDARD_VERSION,
        )
        .unwrap();
        assert_eq!(plane.points[0], Vec3::new(-64.0, -64.0, -16.0));
        assert_eq!(plane.texture, "ground1_1");
        assert!(matches!(
            plane.uv,
            UvProjection::Standard { offset } if offset == Vec2::new(4.0, -8.0)
        ));
        assert_eq!((plane.rotation, plane.scale_x, plane.scale_y), (0.0, 1.0, 1.0));
    }

    #[test]
    fn test_valve_plane_line() {
        let plane = parse_plane_line(
            "( 0 0 0 ) ( 0 1 0 ) ( 1 0 0 ) city2_3 [ 1 0 0 16 ] [ 0 -1 0 -32 ] 45 0.5 2",
            VALVE_VERSION,
        )
        .unwrap();
        match plane.uv {
            UvProjection::Valve { u, v } => {
                assert_eq!(u, Vec4::new(1.0, 0.0, 0.0, 16.0));
                assert_eq!(v, Vec4::new(0.0, -1.0, 0.0, -32.0));
            }
            _ => panic!("expected valve projection"),
        }
        assert_eq!(plane.rotation, 45.0);
        assert_eq!(plane.scale_x, 0.5);
        assert_eq!(plane.scale_y, 2.0);
    }

    #[test]
    fn test_truncated_plane_line_is_rejected() {
        assert!(parse_plane_line(
            "( 0 0 0 ) ( 0 1 0 ) ( 1 0 0 ) city2_3 0 0 0",
            STANDARD_VERSION,
        )
        .is_none());
    }

    #[test]
    fn test_texture_id_stability() {
        let mut file = MapFile::default();
        let a = file.get_or_add_texture("ground1_1");
        let b = file.get_or_add_texture("city2_3");
        let a2 = file.get_or_add_texture("ground1_1");
        assert_eq!(a, a2);
        assert_eq!((a, b), (0, 1));
        assert_eq!(file.textures().len(), 2);
    }

    #[test]
    fn test_wad_string_extraction() {
        let mut file = MapFile::default();
        file.parse_wad_string("/gfx/base.wad;C:\\quake\\water.wad;plain.wad;");
        assert_eq!(file.wads(), ["base.wad", "water.wad", "plain.wad"]);
    }
}
