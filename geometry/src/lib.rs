// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # quake-lite geometry
//!
//! The MAP-source geometry pipeline: plane-equation brushes are turned
//! into watertight, textured, triangulated polygon sets, overlapping
//! brushes are resolved with constructive solid geometry, and the result
//! is stitched into per-texture render batches.
//!
//! ## Pipeline
//!
//! 1. [`Brush::build_geometry`]: triple-plane intersection, vertex
//!    legality filtering, winding, fan triangulation ([`brush`]).
//! 2. [`SolidEntity::csg_union`]: pairwise brush clipping with the
//!    keep-on-plane tie-break, then vertex welding, T-junction repair,
//!    collinear removal and ear-clip triangulation ([`csg`]).
//! 3. [`mesh::batch_entity_meshes`]: per-texture batches with the
//!    four-way attribute weld ([`mesh`]).
//! 4. [`LightmapPacker`]: shelf-packed lightmap atlas with normalized
//!    per-vertex UVs ([`lightmap`]).
//!
//! The [`MapProvider`] trait is the consumer-facing surface; the `.map`
//! and `.bsp` adapters implement it interchangeably.
//!
//! ## Epsilon policy
//!
//! The tolerances in [`face`] and [`csg`] are calibrated against each
//! other; tightening any one of them breaks water-tightness at shared
//! walls. They are compile-time constants on purpose.

pub mod brush;
pub mod csg;
pub mod entity;
pub mod face;
pub mod lightmap;
pub mod mesh;
pub mod provider;

pub use brush::Brush;
pub use entity::SolidEntity;
pub use csg::{EDGE_EPSILON, TJUNCTION_MERGE_EPSILON, WELD_EPSILON};
pub use face::{Face, FaceClassification, UvProjection};
pub use face::{CLASSIFY_EPSILON, CMP_EPSILON, LEGAL_EPSILON, POINT_EPSILON};
pub use mesh::BATCH_WELD_EPSILON;
pub use lightmap::LightmapPacker;
pub use provider::{MapProvider, TextureBounds};
