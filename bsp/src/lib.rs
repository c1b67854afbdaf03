// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # quake-lite bsp
//!
//! Compiled BSP adapter (versions 29 and 30, 15 lumps, little-endian).
//! The loader decodes the lump directory into the same
//! `SolidEntity`/`PointEntity`/`Face` population the `.map` adapter
//! produces, bypassing CSG entirely: BSP faces arrive pre-partitioned.
//! Lightmap samples are packed into one monolithic atlas, with an
//! external `.lit` file superseding the monochrome lighting lump when
//! present.

pub mod entity;
pub mod file;
pub mod lightmap;
pub mod lump;
pub mod provider;
pub mod surface;

pub use file::BspFile;
pub use provider::BspProvider;
pub use surface::BspSurface;
