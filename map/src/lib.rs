// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # quake-lite map
//!
//! The `.map` source adapter: parses editor map text (standard-100 and
//! Valve-220 plane formats), drives the geometry pipeline from
//! `quake-lite-geometry`, and exposes the result through the shared
//! [`MapProvider`](quake_lite_geometry::MapProvider) interface.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use quake_lite_geometry::MapProvider;
//! use quake_lite_map::QuakeMapProvider;
//!
//! let mut provider = QuakeMapProvider::default();
//! provider.load("e1m1.map".as_ref())?;
//! provider.generate_geometry(true);
//! for entity in provider.solid_entities() {
//!     let meshes = provider.entity_meshes(entity);
//! }
//! ```
//!
//! ## Feature flags
//!
//! - `parallel`: generate per-entity geometry on the rayon thread pool.
//!   Entity, brush and texture-id ordering stay parse-order stable.

pub mod map_file;
pub mod provider;
pub mod qmap;

pub use map_file::{MapFile, STANDARD_VERSION, VALVE_VERSION};
pub use provider::QuakeMapProvider;
pub use qmap::QuakeMap;
