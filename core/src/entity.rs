// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsed entity records and the shared point entity type.

use rustc_hash::FxHashMap;

use crate::math::Vec3;
use crate::parser::parse_attribute_line;

/// Key/value attribute storage for one entity.
pub type AttributeMap = FxHashMap<String, String>;

/// Entity classification inferred while scanning the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntityKind {
    /// No geometry; defined by an origin (lights, spawn points, ...).
    #[default]
    Point,
    /// Carries brush geometry, or references an inlined BSP model.
    Solid,
    /// The distinguished solid entity holding the static world.
    Worldspawn,
}

/// One line of entity text with its 1-based position in the source.
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

/// A raw brace-delimited entity block.
///
/// The outer block's attribute lines land in `lines`; each inner block
/// (a brush) contributes one entry to `children`.
#[derive(Debug, Clone, Default)]
pub struct ParsedEntity {
    pub lines: Vec<SourceLine>,
    pub children: Vec<Vec<SourceLine>>,
    pub kind: EntityKind,
}

/// Extracts every `"key" "value"` pair from an entity's attribute lines.
pub fn collect_attributes(lines: &[SourceLine]) -> AttributeMap {
    let mut map = AttributeMap::default();
    for line in lines {
        if let Some((key, value)) = parse_attribute_line(&line.text) {
            map.entry(key).or_insert(value);
        }
    }
    map
}

/// String attribute lookup; missing keys yield an empty string.
pub fn attribute_str(attributes: &AttributeMap, key: &str) -> String {
    attributes.get(key).cloned().unwrap_or_default()
}

/// Float attribute lookup; missing or unparsable values yield 0.
pub fn attribute_f32(attributes: &AttributeMap, key: &str) -> f32 {
    attributes
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0.0)
}

/// Vec3 attribute lookup (three whitespace-separated floats); missing
/// components yield 0.
pub fn attribute_vec3(attributes: &AttributeMap, key: &str) -> Vec3 {
    let mut out = Vec3::zeros();
    if let Some(value) = attributes.get(key) {
        for (slot, token) in out.iter_mut().zip(value.split_whitespace()) {
            *slot = token.parse().unwrap_or(0.0);
        }
    }
    out
}

/// An entity with no geometry, defined by its origin and facing angle.
#[derive(Debug, Clone, Default)]
pub struct PointEntity {
    pub attributes: AttributeMap,
    pub classname: String,
    /// TrenchBroom group name, when authored with TrenchBroom.
    pub tb_name: String,
    /// TrenchBroom group type, when authored with TrenchBroom.
    pub tb_type: String,
    pub origin: Vec3,
    pub angle: f32,
}

impl PointEntity {
    /// Builds a point entity from a parsed block, lifting `classname`,
    /// `origin` and `angle` out of the attribute map.
    pub fn from_parsed(parsed: &ParsedEntity) -> Self {
        let mut attributes = collect_attributes(&parsed.lines);
        let classname = attributes.remove("classname").unwrap_or_default();
        let tb_name = attributes.remove("_tb_name").unwrap_or_default();
        let tb_type = attributes.remove("_tb_type").unwrap_or_default();
        let origin = attribute_vec3(&attributes, "origin");
        attributes.remove("origin");
        let angle = attribute_f32(&attributes, "angle");
        attributes.remove("angle");
        Self {
            attributes,
            classname,
            tb_name,
            tb_type,
            origin,
            angle,
        }
    }

    /// Whether the classname contains `substr`.
    #[inline]
    pub fn class_contains(&self, substr: &str) -> bool {
        self.classname.contains(substr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<SourceLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| SourceLine {
                number: i + 1,
                text: (*t).to_string(),
            })
            .collect()
    }

    #[test]
    fn test_point_entity_from_parsed() {
        let parsed = ParsedEntity {
            lines: lines(&[
                "\"classname\" \"light\"",
                "\"origin\" \"8 16 -24\"",
                "\"angle\" \"90\"",
                "\"light\" \"150\"",
            ]),
            children: Vec::new(),
            kind: EntityKind::Point,
        };
        let ent = PointEntity::from_parsed(&parsed);
        assert_eq!(ent.classname, "light");
        assert_eq!(ent.origin, Vec3::new(8.0, 16.0, -24.0));
        assert_eq!(ent.angle, 90.0);
        assert_eq!(attribute_f32(&ent.attributes, "light"), 150.0);
        assert!(!ent.attributes.contains_key("origin"));
        assert!(!ent.attributes.contains_key("angle"));
    }

    #[test]
    fn test_attribute_vec3_tolerates_short_values() {
        let mut map = AttributeMap::default();
        map.insert("origin".into(), "1 2".into());
        assert_eq!(attribute_vec3(&map, "origin"), Vec3::new(1.0, 2.0, 0.0));
    }
}
