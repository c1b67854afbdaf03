// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error taxonomy for the whole workspace.
//!
//! Parse errors abort the parse call that produced them; no partial entity
//! list is exposed. Geometry-level anomalies (degenerate faces, empty
//! clipped brushes, missing texture bounds) are not errors.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type used across the quake-lite crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading and converting level data.
///
/// This enum is deliberately closed so consumers can match exhaustively.
#[derive(Error, Debug)]
pub enum Error {
    /// BSP header magic is neither 29 nor 30.
    #[error("unsupported BSP version {found}, expected 29 or 30")]
    WrongVersion { found: u32 },

    /// Text structure or binary lump layout violates the format. The
    /// reason carries the line number or byte offset when one applies.
    #[error("malformed data in {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    /// File not found, unreadable or truncated.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lightmap packer could not fit every chart into the atlas. The
    /// caller should retry with a bigger atlas.
    #[error("lightmap atlas {width}x{height} cannot fit all charts")]
    AtlasOverflow { width: u32, height: u32 },

    /// An entity referenced an inlined brush model that does not exist.
    #[error("entity model reference *{model} is out of range ({count} models)")]
    InvalidReference { model: usize, count: usize },
}

impl Error {
    pub fn malformed(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
