// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity text parser.
//!
//! Both `.map` sources and the BSP entity lump use the same grammar:
//! brace-delimited blocks of `"key" "value"` attribute lines, with inner
//! blocks holding brush plane lines in `.map` files. Brace nesting
//! determines topology; a line starting with `//` is a comment
//! (`// Format: Valve` is a version hint but not authoritative).
//!
//! The block scanner is a hand-rolled line walk; attribute tokens are
//! parsed with nom.

use std::path::Path;

use nom::{
    bytes::complete::take_while,
    character::complete::{char, multispace0, multispace1},
    sequence::{delimited, preceded, separated_pair},
    IResult,
};

use crate::entity::{EntityKind, ParsedEntity, SourceLine};
use crate::error::{Error, Result};

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c| c != '"'), char('"'))(input)
}

fn attribute_pair(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(multispace0, separated_pair(quoted, multispace1, quoted))(input)
}

/// Parses one `"key" "value"` line. Returns `None` for anything that is
/// not an attribute line (plane lines, stray text).
pub fn parse_attribute_line(line: &str) -> Option<(String, String)> {
    attribute_pair(line)
        .ok()
        .map(|(_, (k, v))| (k.to_string(), v.to_string()))
}

/// Scans entity text into [`ParsedEntity`] blocks.
///
/// Entity kind is inferred while scanning: a block gains `Solid` when an
/// inner block opens or an outer-level `"model" "*N"` line appears, and
/// `Worldspawn` when the first `"classname" "worldspawn"` line is seen.
/// Unbalanced braces abort the parse with [`Error::Malformed`].
pub fn parse_entities(input: &str, path: &Path) -> Result<Vec<ParsedEntity>> {
    let mut entities: Vec<ParsedEntity> = Vec::new();
    let mut current: Option<ParsedEntity> = None;
    // 0 = outside, 1 = entity, >= 2 = brush block
    let mut depth = 0usize;
    let mut found_worldspawn = false;

    for (index, raw) in input.lines().enumerate() {
        let number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if line == "{" {
            depth += 1;
            match depth {
                1 => current = Some(ParsedEntity::default()),
                2 => {
                    let ent = current.as_mut().expect("depth 2 implies an open entity");
                    if ent.kind != EntityKind::Worldspawn {
                        ent.kind = EntityKind::Solid;
                    }
                    ent.children.push(Vec::new());
                }
                _ => {}
            }
            continue;
        }

        if line == "}" {
            if depth == 0 {
                return Err(Error::malformed(
                    path,
                    format!("line {number}: unmatched closing brace"),
                ));
            }
            depth -= 1;
            if depth == 0 {
                entities.push(current.take().expect("closing an open entity"));
            }
            continue;
        }

        let Some(ent) = current.as_mut() else {
            return Err(Error::malformed(
                path,
                format!("line {number}: content outside of an entity block"),
            ));
        };

        let source = SourceLine {
            number,
            text: line.to_string(),
        };

        if depth == 1 {
            if ent.kind == EntityKind::Point && line.starts_with("\"model\" \"*") {
                ent.kind = EntityKind::Solid;
            }
            if !found_worldspawn && line == "\"classname\" \"worldspawn\"" {
                ent.kind = EntityKind::Worldspawn;
                found_worldspawn = true;
            }
            ent.lines.push(source);
        } else {
            ent.children
                .last_mut()
                .expect("depth >= 2 implies an open brush block")
                .push(source);
        }
    }

    if depth != 0 {
        return Err(Error::malformed(path, "unbalanced braces at end of input"));
    }

    Ok(entities)
}
