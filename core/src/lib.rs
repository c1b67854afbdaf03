// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # quake-lite core
//!
//! Shared foundation for the quake-lite workspace: the vertex/surface data
//! model that both the `.map` and `.bsp` adapters populate, the brace-block
//! entity text parser used by both formats, and the error taxonomy every
//! crate reports through.
//!
//! ## Overview
//!
//! - **Data model**: [`Vertex`], [`SurfaceType`], [`RenderMesh`] and
//!   [`TextureData`] make up the renderer-ready representation.
//! - **Entity text**: [`parse_entities`] turns `{ "key" "value" ... }`
//!   blocks into [`ParsedEntity`] records; [`PointEntity`] is the typed
//!   form shared by both adapters.
//! - **Errors**: [`Error`] is the exhaustive load-error sum type; all
//!   fallible operations in the workspace return [`Result`].
//!
//! ## Coordinate systems
//!
//! Quake data is authored with X forward, Y left, Z up. With
//! [`Config::convert_to_opengl`] enabled the adapters convert positions,
//! normals and tangents to X right, Y up, Z forward via
//! [`math::to_opengl`], and point entity angles gain 180 degrees.
//!
//! ## Feature flags
//!
//! - `serde`: derive `Serialize`/`Deserialize` on the plain-data public
//!   types.

pub mod config;
pub mod entity;
pub mod error;
pub mod math;
pub mod parser;
pub mod surface;

pub use config::Config;
pub use entity::{AttributeMap, EntityKind, ParsedEntity, PointEntity, SourceLine};
pub use error::{Error, Result};
pub use parser::parse_entities;
pub use surface::{RenderMesh, SurfaceType, TextureData, Vertex};
