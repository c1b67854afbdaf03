// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WAD2 archive reading.

use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use quake_lite_core::error::{Error, Result};
use quake_lite_core::surface::TextureData;
use rustc_hash::FxHashMap;

use crate::palette::Palette;

/// WAD2 file magic.
pub const MAGIC: [u8; 4] = *b"WAD2";
/// Length of a texture name field.
pub const TEXTURE_NAME_LENGTH: usize = 16;
/// Number of stored mip levels per texture.
pub const MIP_LEVELS: usize = 4;

/// Known WAD directory entry types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WadEntryType {
    Palette,
    StatusBarPicture,
    MipTexture,
    ConsolePicture,
    Unknown(u8),
}

impl From<u8> for WadEntryType {
    fn from(value: u8) -> Self {
        match value {
            0x40 => Self::Palette,
            0x42 => Self::StatusBarPicture,
            0x44 => Self::MipTexture,
            0x45 => Self::ConsolePicture,
            other => Self::Unknown(other),
        }
    }
}

/// Raw directory entry record.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct EntryHeader {
    offset: u32,
    in_wad_size: u32,
    size: u32,
    kind: u8,
    compression: u8,
    _unused: u16,
}

/// Miptex header preceding the texel data.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct MipTexHeader {
    name: [u8; TEXTURE_NAME_LENGTH],
    width: u32,
    height: u32,
    mip_offsets: [u32; MIP_LEVELS],
}

#[derive(Debug, Clone)]
struct WadEntry {
    header: EntryHeader,
    name: String,
}

/// Loading options.
#[derive(Debug, Clone, Copy, Default)]
pub struct WadOptions {
    /// Flip texture rows horizontally while decoding.
    pub flip_horizontal: bool,
}

/// A WAD2 texture archive. Texture pixels decode lazily on first
/// request and are cached.
#[derive(Debug)]
pub struct WadArchive {
    path: PathBuf,
    data: Vec<u8>,
    entries: FxHashMap<String, WadEntry>,
    /// Directory order, for callers that want to enumerate.
    names: Vec<String>,
    palette: Palette,
    options: WadOptions,
    decoded: FxHashMap<String, TextureData>,
}

impl WadArchive {
    /// Opens a WAD2 archive from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with_options(path, WadOptions::default())
    }

    pub fn from_file_with_options(path: &Path, options: WadOptions) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::from_bytes(data, path, options)
    }

    /// Parses a WAD2 archive from raw bytes. `path` is used for error
    /// reporting only.
    pub fn from_bytes(data: Vec<u8>, path: &Path, options: WadOptions) -> Result<Self> {
        let malformed = |reason: String| Error::malformed(path, reason);

        if data.len() < 12 || data[0..4] != MAGIC {
            return Err(malformed("missing WAD2 magic".into()));
        }
        let entry_count =
            u32::from_le_bytes(data[4..8].try_into().expect("sliced 4 bytes")) as usize;
        let dir_offset =
            u32::from_le_bytes(data[8..12].try_into().expect("sliced 4 bytes")) as usize;

        let entry_size = std::mem::size_of::<EntryHeader>() + TEXTURE_NAME_LENGTH;
        let dir_end = dir_offset
            .checked_add(entry_count * entry_size)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                malformed(format!(
                    "directory of {entry_count} entries at offset {dir_offset} exceeds file size {}",
                    data.len()
                ))
            })?;

        let mut entries = FxHashMap::default();
        let mut names = Vec::with_capacity(entry_count);
        for chunk in data[dir_offset..dir_end].chunks_exact(entry_size) {
            let header: EntryHeader =
                bytemuck::pod_read_unaligned(&chunk[..std::mem::size_of::<EntryHeader>()]);
            let name = read_fixed_name(&chunk[std::mem::size_of::<EntryHeader>()..]);
            names.push(name.clone());
            entries.insert(name.clone(), WadEntry { header, name });
        }

        Ok(Self {
            path: path.to_path_buf(),
            data,
            entries,
            names,
            palette: Palette::default(),
            options,
            decoded: FxHashMap::default(),
        })
    }

    /// Installs the palette used for texel decoding (the default is the
    /// grayscale ramp).
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.decoded.clear();
    }

    /// Entry names in directory order.
    #[inline]
    pub fn texture_names(&self) -> &[String] {
        &self.names
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entry_type(&self, name: &str) -> Option<WadEntryType> {
        self.entries.get(name).map(|e| e.header.kind.into())
    }

    /// `(width, height)` of a miptex entry without decoding its pixels.
    pub fn texture_bounds(&self, name: &str) -> Option<(u32, u32)> {
        let entry = self.entries.get(name)?;
        let header = self.miptex_header(entry).ok()?;
        Some((header.width, header.height))
    }

    /// Decoded RGBA pixels for a miptex entry (mip level 0). Cached
    /// after the first call.
    pub fn texture(&mut self, name: &str) -> Result<Option<&TextureData>> {
        if !self.entries.contains_key(name) {
            return Ok(None);
        }
        if !self.decoded.contains_key(name) {
            let entry = self.entries[name].clone();
            let texture = self.decode_entry(&entry)?;
            self.decoded.insert(name.to_string(), texture);
        }
        Ok(self.decoded.get(name))
    }

    fn miptex_header(&self, entry: &WadEntry) -> Result<MipTexHeader> {
        let start = entry.header.offset as usize;
        let end = start + std::mem::size_of::<MipTexHeader>();
        let bytes = self.data.get(start..end).ok_or_else(|| {
            Error::malformed(
                &self.path,
                format!("entry {} header at offset {start} is truncated", entry.name),
            )
        })?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    fn decode_entry(&self, entry: &WadEntry) -> Result<TextureData> {
        if entry.header.compression != 0 {
            log::warn!(
                "entry {} is marked compressed, which WAD2 never uses; decoding as raw",
                entry.name
            );
        }
        let header = self.miptex_header(entry)?;
        let (width, height) = (header.width as usize, header.height as usize);

        let start = entry.header.offset as usize + header.mip_offsets[0] as usize;
        let end = start + width * height;
        let texels = self.data.get(start..end).ok_or_else(|| {
            Error::malformed(
                &self.path,
                format!(
                    "entry {} texels at offset {start}..{end} exceed file size {}",
                    entry.name,
                    self.data.len()
                ),
            )
        })?;

        let mut rgba = Vec::with_capacity(width * height * 4);
        for row in texels.chunks_exact(width.max(1)) {
            if self.options.flip_horizontal {
                for &index in row.iter().rev() {
                    rgba.extend_from_slice(&self.palette.color(index));
                }
            } else {
                for &index in row {
                    rgba.extend_from_slice(&self.palette.color(index));
                }
            }
        }

        Ok(TextureData::new(header.width, header.height, rgba))
    }
}

/// NUL-terminated fixed-width name field.
fn read_fixed_name(bytes: &[u8]) -> String {
    let len = bytes
        .iter()
        .take(TEXTURE_NAME_LENGTH)
        .position(|&b| b == 0)
        .unwrap_or(TEXTURE_NAME_LENGTH.min(bytes.len()));
    String::from_utf8_lossy(&bytes[..len]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A WAD2 with one 4x2 miptex named "wall".
    fn create_test_wad() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&MAGIC);
        data.extend_from_slice(&1u32.to_le_bytes()); // entry count
        let dir_offset_pos = data.len();
        data.extend_from_slice(&0u32.to_le_bytes()); // patched below

        // miptex lump
        let lump_offset = data.len() as u32;
        let mut name = [0u8; TEXTURE_NAME_LENGTH];
        name[..4].copy_from_slice(b"wall");
        data.extend_from_slice(&name);
        data.extend_from_slice(&4u32.to_le_bytes()); // width
        data.extend_from_slice(&2u32.to_le_bytes()); // height
        let texel_offset = (TEXTURE_NAME_LENGTH + 4 + 4 + 16) as u32;
        data.extend_from_slice(&texel_offset.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3, 255, 5, 6, 7, 8]); // texels

        // directory
        let dir_offset = data.len() as u32;
        data[dir_offset_pos..dir_offset_pos + 4].copy_from_slice(&dir_offset.to_le_bytes());
        data.extend_from_slice(&lump_offset.to_le_bytes()); // offset
        data.extend_from_slice(&48u32.to_le_bytes()); // in-wad size
        data.extend_from_slice(&48u32.to_le_bytes()); // size
        data.push(0x44); // miptex
        data.push(0); // no compression
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&name);

        data
    }

    #[test]
    fn test_directory_parsing() {
        let wad = WadArchive::from_bytes(
            create_test_wad(),
            Path::new("<test>"),
            WadOptions::default(),
        )
        .unwrap();
        assert_eq!(wad.texture_names(), ["wall"]);
        assert!(wad.contains("wall"));
        assert_eq!(wad.entry_type("wall"), Some(WadEntryType::MipTexture));
        assert_eq!(wad.texture_bounds("wall"), Some((4, 2)));
    }

    #[test]
    fn test_texture_decode_with_transparency() {
        let mut wad = WadArchive::from_bytes(
            create_test_wad(),
            Path::new("<test>"),
            WadOptions::default(),
        )
        .unwrap();
        let tex = wad.texture("wall").unwrap().unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.data.len(), 4 * 2 * 4);
        // grayscale default palette: index 3 -> (3,3,3,255)
        assert_eq!(&tex.data[8..12], &[3, 3, 3, 255]);
        // index 255 is the transparent slot
        assert_eq!(tex.data[15], 0);
    }

    #[test]
    fn test_missing_texture_is_none() {
        let mut wad = WadArchive::from_bytes(
            create_test_wad(),
            Path::new("<test>"),
            WadOptions::default(),
        )
        .unwrap();
        assert!(wad.texture("no_such").unwrap().is_none());
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let err =
            WadArchive::from_bytes(vec![0u8; 32], Path::new("<test>"), WadOptions::default())
                .unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }
}
