// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loader configuration shared by the format adapters.

/// Common options that apply across the Quake file formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Convert from Quake's coordinate system (X forward, Y left, Z up)
    /// to OpenGL's (X right, Y up, Z forward).
    ///
    /// Affects vertex positions, normals, tangents and point entity
    /// origins; point entity angles are offset by 180 degrees.
    pub convert_to_opengl: bool,
}
