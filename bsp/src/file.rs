// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BSP file decoding: header, lump directory, texture lump, entity
//! text, lighting (with `.lit` supersession).

use std::path::{Path, PathBuf};

use bytemuck::Pod;
use quake_lite_core::error::{Error, Result};

use crate::lump::*;

/// `.lit` file magic.
pub const LIT_MAGIC: [u8; 4] = *b"QLIT";

/// A decoded miptexture: name, dimensions and mip level 0 texels
/// (palettized).
#[derive(Debug, Clone)]
pub struct MipTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub texels: Vec<u8>,
}

/// The decoded content of one BSP file.
#[derive(Debug, Default)]
pub struct BspFile {
    pub path: PathBuf,
    pub version: u32,
    pub planes: Vec<BspPlane>,
    pub vertices: Vec<[f32; 3]>,
    pub edges: Vec<BspEdge>,
    pub faces: Vec<BspFace>,
    pub tex_info: Vec<BspTexInfo>,
    pub surf_edges: Vec<i32>,
    pub models: Vec<BspModel>,
    pub nodes: Vec<BspNode>,
    pub leafs: Vec<BspLeaf>,
    pub clip_nodes: Vec<BspClipNode>,
    pub mark_surfaces: Vec<u16>,
    /// Texture lump entries; `None` where the directory held -1.
    pub textures: Vec<Option<MipTexture>>,
    /// Raw entity lump text.
    pub entities_text: String,
    /// RGB lightmap samples, 3 bytes per sample. Either the `.lit` data
    /// or the monochrome lump promoted by channel duplication.
    pub lighting: Vec<u8>,
}

impl BspFile {
    /// Loads a BSP from disk, together with a sibling `.lit` file when
    /// one exists.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        let lit = std::fs::read(path.with_extension("lit")).ok();
        Self::parse(&data, lit.as_deref(), path)
    }

    /// Decodes a BSP from raw bytes. `path` is used for error reporting
    /// only.
    pub fn parse(data: &[u8], lit: Option<&[u8]>, path: &Path) -> Result<Self> {
        let header_size = std::mem::size_of::<BspHeader>();
        if data.len() < header_size {
            return Err(Error::malformed(
                path,
                format!("file of {} bytes is smaller than the header", data.len()),
            ));
        }
        let header: BspHeader = bytemuck::pod_read_unaligned(&data[..header_size]);
        if header.version != MAGIC_V29 && header.version != MAGIC_V30 {
            return Err(Error::WrongVersion {
                found: header.version,
            });
        }

        let mut file = Self {
            path: path.to_path_buf(),
            version: header.version,
            ..Self::default()
        };

        file.planes = read_lump(data, header.lumps[LUMP_PLANES], "planes", path)?;
        file.vertices = read_lump(data, header.lumps[LUMP_VERTICES], "vertices", path)?;
        file.edges = read_lump(data, header.lumps[LUMP_EDGES], "edges", path)?;
        file.faces = read_lump(data, header.lumps[LUMP_FACES], "faces", path)?;
        file.tex_info = read_lump(data, header.lumps[LUMP_TEXINFO], "texinfo", path)?;
        file.surf_edges = read_lump(data, header.lumps[LUMP_SURFEDGES], "surfedges", path)?;
        file.models = read_lump(data, header.lumps[LUMP_MODELS], "models", path)?;
        file.nodes = read_lump(data, header.lumps[LUMP_NODES], "nodes", path)?;
        file.leafs = read_lump(data, header.lumps[LUMP_LEAFS], "leafs", path)?;
        file.clip_nodes = read_lump(data, header.lumps[LUMP_CLIPNODES], "clipnodes", path)?;
        file.mark_surfaces =
            read_lump(data, header.lumps[LUMP_MARKSURFACES], "marksurfaces", path)?;

        file.textures = read_texture_lump(data, header.lumps[LUMP_TEXTURES], path)?;
        file.entities_text = read_entities_text(data, header.lumps[LUMP_ENTITIES], path)?;
        file.lighting = read_lighting(data, header.lumps[LUMP_LIGHTING], lit, path)?;

        Ok(file)
    }
}

fn lump_bytes<'a>(data: &'a [u8], entry: LumpEntry, name: &str, path: &Path) -> Result<&'a [u8]> {
    let start = entry.offset as usize;
    let end = start + entry.length as usize;
    data.get(start..end).ok_or_else(|| {
        Error::malformed(
            path,
            format!(
                "{name} lump at {start}..{end} exceeds file size {}",
                data.len()
            ),
        )
    })
}

/// Decodes a lump into its record type, verifying the length is a
/// multiple of the record size.
pub fn read_lump<T: Pod>(
    data: &[u8],
    entry: LumpEntry,
    name: &str,
    path: &Path,
) -> Result<Vec<T>> {
    if entry.length == 0 {
        return Ok(Vec::new());
    }
    let bytes = lump_bytes(data, entry, name, path)?;
    let record = std::mem::size_of::<T>();
    if bytes.len() % record != 0 {
        return Err(Error::malformed(
            path,
            format!(
                "{name} lump length {} is not a multiple of its record size {record}",
                bytes.len()
            ),
        ));
    }
    Ok(bytemuck::pod_collect_to_vec(bytes))
}

fn read_texture_lump(
    data: &[u8],
    entry: LumpEntry,
    path: &Path,
) -> Result<Vec<Option<MipTexture>>> {
    if entry.length == 0 {
        return Ok(Vec::new());
    }
    let bytes = lump_bytes(data, entry, "textures", path)?;
    let truncated = || Error::malformed(path, "texture lump directory is truncated".to_string());

    let count = i32::from_le_bytes(bytes.get(0..4).ok_or_else(truncated)?.try_into().unwrap());
    let count = usize::try_from(count).map_err(|_| truncated())?;

    let mut textures = Vec::with_capacity(count);
    for i in 0..count {
        let at = 4 + i * 4;
        let offset = i32::from_le_bytes(
            bytes
                .get(at..at + 4)
                .ok_or_else(truncated)?
                .try_into()
                .unwrap(),
        );
        if offset < 0 {
            textures.push(None);
            continue;
        }
        let start = offset as usize;
        let header_end = start + std::mem::size_of::<MipTexHeader>();
        let header_bytes = bytes.get(start..header_end).ok_or_else(truncated)?;
        let header: MipTexHeader = bytemuck::pod_read_unaligned(header_bytes);

        let texel_start = start + header.mip_offsets[0] as usize;
        let texel_end = texel_start + (header.width as usize) * (header.height as usize);
        let texels = bytes.get(texel_start..texel_end).ok_or_else(|| {
            Error::malformed(
                path,
                format!("texels of miptexture {i} exceed the texture lump"),
            )
        })?;

        textures.push(Some(MipTexture {
            name: read_fixed_name(&header.name),
            width: header.width,
            height: header.height,
            texels: texels.to_vec(),
        }));
    }
    Ok(textures)
}

fn read_entities_text(data: &[u8], entry: LumpEntry, path: &Path) -> Result<String> {
    if entry.length == 0 {
        return Ok(String::new());
    }
    let bytes = lump_bytes(data, entry, "entities", path)?;
    // the lump is NUL-terminated C text
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

/// Produces RGB triples: the `.lit` payload when valid, otherwise the
/// monochrome lighting lump promoted by channel duplication. A missing
/// or foreign `.lit` is not an error.
fn read_lighting(
    data: &[u8],
    entry: LumpEntry,
    lit: Option<&[u8]>,
    path: &Path,
) -> Result<Vec<u8>> {
    if let Some(lit) = lit {
        if lit.len() >= 8 && lit[0..4] == LIT_MAGIC {
            return Ok(lit[8..].to_vec());
        }
        log::warn!("ignoring .lit file without QLIT magic next to {path:?}");
    }

    let mono = lump_bytes(data, entry, "lighting", path)?;
    let mut rgb = Vec::with_capacity(mono.len() * 3);
    for &sample in mono {
        rgb.extend_from_slice(&[sample, sample, sample]);
    }
    Ok(rgb)
}

fn read_fixed_name(bytes: &[u8; TEXTURE_NAME_LENGTH]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len]).into_owned()
}
