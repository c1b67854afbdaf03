// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity population from the BSP entity lump.
//!
//! The lump holds the same brace-block text as a `.map` file, without
//! brush blocks. Entities referencing an inlined model (`"model" "*N"`,
//! and worldspawn as model 0) become solid entities inheriting that
//! model's faces wrapped in a single brush, so BSP and `.map` sources
//! yield the same entity population.

use quake_lite_core::entity::{
    attribute_str, collect_attributes, EntityKind, PointEntity,
};
use quake_lite_core::error::{Error, Result};
use quake_lite_core::parser::parse_entities;
use quake_lite_geometry::{Brush, SolidEntity};

use crate::file::BspFile;
use crate::surface::BspSurface;

/// Solid and point entities decoded from the entity lump.
#[derive(Debug, Default)]
pub struct BspEntities {
    pub solid_entities: Vec<SolidEntity>,
    pub point_entities: Vec<PointEntity>,
    /// Index of worldspawn in `solid_entities`.
    pub worldspawn: Option<usize>,
}

/// Parses the entity lump and attaches model faces to solid entities.
///
/// A `"model" "*N"` reference outside the model table is
/// [`Error::InvalidReference`].
pub fn build_entities(file: &BspFile, surfaces: &[BspSurface]) -> Result<BspEntities> {
    let parsed = parse_entities(&file.entities_text, &file.path)?;
    let mut out = BspEntities::default();

    for entity in &parsed {
        match entity.kind {
            EntityKind::Point => {
                out.point_entities.push(PointEntity::from_parsed(entity));
            }
            EntityKind::Solid | EntityKind::Worldspawn => {
                let mut attributes = collect_attributes(&entity.lines);
                let classname = attributes.remove("classname").unwrap_or_default();

                let model_id = parse_model_id(&attribute_str(&attributes, "model"));
                if model_id >= file.models.len() {
                    return Err(Error::InvalidReference {
                        model: model_id,
                        count: file.models.len(),
                    });
                }
                let model = &file.models[model_id];

                let first = model.face_id.max(0) as usize;
                let count = model.face_num.max(0) as usize;
                let faces = surfaces
                    .get(first..first + count)
                    .ok_or_else(|| {
                        Error::malformed(
                            &file.path,
                            format!(
                                "model {model_id} faces {first}..{} exceed the face table",
                                first + count
                            ),
                        )
                    })?
                    .iter()
                    .map(|s| s.face.clone())
                    .collect();

                if entity.kind == EntityKind::Worldspawn {
                    out.worldspawn = Some(out.solid_entities.len());
                }
                out.solid_entities.push(SolidEntity::from_brushes(
                    attributes,
                    classname,
                    vec![Brush::from_faces(faces)],
                ));
            }
        }
    }

    Ok(out)
}

/// `*N` -> N; worldspawn and malformed references resolve to model 0.
fn parse_model_id(model: &str) -> usize {
    model
        .strip_prefix('*')
        .and_then(|n| n.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_parsing() {
        assert_eq!(parse_model_id("*3"), 3);
        assert_eq!(parse_model_id("*0"), 0);
        assert_eq!(parse_model_id(""), 0);
        assert_eq!(parse_model_id("maps/ammo.bsp"), 0);
    }
}
