// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Quake palette decoding.
//!
//! A palette lump is a run of RGB triples, normally 256 of them. Index
//! 255 is the transparent slot and decodes with alpha 0; indices 240..255
//! are the fullbright range.

use std::path::Path;

use quake_lite_core::error::{Error, Result};

/// Index of the transparent palette slot.
pub const TRANSPARENT_INDEX: usize = 255;
/// First fullbright palette index.
pub const BRIGHT_RANGE_START: usize = 240;

/// An RGBA color lookup table decoded from a palette lump.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<[u8; 4]>,
}

impl Palette {
    /// Decodes a palette from raw bytes. The buffer length must be a
    /// multiple of 3.
    pub fn from_buffer(buffer: &[u8]) -> Result<Self> {
        if buffer.len() % 3 != 0 {
            return Err(Error::malformed(
                "<palette>",
                format!("palette length {} is not a multiple of 3", buffer.len()),
            ));
        }
        let mut colors = Vec::with_capacity(buffer.len() / 3);
        for (index, rgb) in buffer.chunks_exact(3).enumerate() {
            let alpha = if index == TRANSPARENT_INDEX { 0 } else { 255 };
            colors.push([rgb[0], rgb[1], rgb[2], alpha]);
        }
        Ok(Self { colors })
    }

    /// Reads a palette lump (`palette.lmp`) from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let buffer = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::from_buffer(&buffer)
    }

    /// A 256-entry identity gray ramp. The stand-in when no real palette
    /// has been installed; id Software's palette is not distributable
    /// with this crate.
    pub fn grayscale() -> Self {
        let colors = (0..=255u8)
            .map(|v| {
                let alpha = if v as usize == TRANSPARENT_INDEX { 0 } else { 255 };
                [v, v, v, alpha]
            })
            .collect();
        Self { colors }
    }

    /// Color for a palette index; out-of-range indices decode to opaque
    /// black.
    #[inline]
    pub fn color(&self, index: u8) -> [u8; 4] {
        self.colors
            .get(index as usize)
            .copied()
            .unwrap_or([0, 0, 0, 255])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The fullbright colors (indices 240..255).
    pub fn bright_colors(&self) -> &[[u8; 4]] {
        let end = TRANSPARENT_INDEX.min(self.colors.len());
        let start = BRIGHT_RANGE_START.min(end);
        &self.colors[start..end]
    }

    /// Whether `color` matches one of the fullbright entries.
    pub fn is_bright_color(&self, color: [u8; 3]) -> bool {
        self.bright_colors()
            .iter()
            .any(|c| c[0] == color[0] && c[1] == color[1] && c[2] == color[2])
    }

    /// Expands palettized pixels to RGBA.
    pub fn decode(&self, pixels: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(pixels.len() * 4);
        for &index in pixels {
            out.extend_from_slice(&self.color(index));
        }
        out
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale()
    }
}
