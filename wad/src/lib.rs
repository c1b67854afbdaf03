// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # quake-lite wad
//!
//! WAD2 texture archive reading: directory parsing, lazy miptex decode
//! through a palette, RGBA output. Textures are decoded on first request
//! and cached.

pub mod palette;
pub mod wad;

pub use palette::Palette;
pub use wad::{WadArchive, WadEntryType, WadOptions};
