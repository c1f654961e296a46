use glam::{Vec2, Vec3};
use std::fs;
use std::path::Path;

use crate::error::AssetError;
use crate::renderer::mesh::MeshData;

/// Decoded 8-bit RGB image.
pub struct RgbImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub fn load_rgb_image(path: &Path) -> Result<RgbImage, AssetError> {
    let image = image::open(path).map_err(|source| AssetError::Image {
        path: path.display().to_string(),
        source,
    })?;
    let rgb = image.to_rgb8();
    Ok(RgbImage {
        width: rgb.width(),
        height: rgb.height(),
        pixels: rgb.into_raw(),
    })
}

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// File names of the images directly inside `dir`, sorted.
pub fn list_diffuse_maps(dir: &Path) -> Result<Vec<String>, AssetError> {
    let io_error = |source| AssetError::Io {
        path: dir.display().to_string(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if !is_image || !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

pub fn load_obj(path: &Path) -> Result<MeshData, AssetError> {
    let name = path.display().to_string();
    let source = fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: name.clone(),
        source,
    })?;
    let mesh = parse_obj(&source, &name)?;
    log::info!("Loaded {name}: {} triangles", mesh.triangle_count());
    Ok(mesh)
}

/// Parses `v`, `vt`, `vn` and `f` records; everything else is ignored.
/// Faces with more than three corners are fan-triangulated. The result is
/// de-indexed: one vertex per face corner.
pub fn parse_obj(source: &str, name: &str) -> Result<MeshData, AssetError> {
    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    let mut normals = Vec::new();
    let mut mesh = MeshData::default();

    for (line_index, raw_line) in source.lines().enumerate() {
        let line_no = line_index + 1;
        let parse_error = |message: String| AssetError::Parse {
            path: name.to_string(),
            line: line_no,
            message,
        };

        let mut tokens = raw_line.split_whitespace();
        let Some(tag) = tokens.next() else {
            continue;
        };
        match tag {
            "v" => positions.push(Vec3::from(parse_floats::<3>(tokens).map_err(parse_error)?)),
            "vt" => uvs.push(Vec2::from(parse_floats::<2>(tokens).map_err(parse_error)?)),
            "vn" => normals.push(Vec3::from(parse_floats::<3>(tokens).map_err(parse_error)?)),
            "f" => {
                let corners = tokens
                    .map(|corner| parse_corner(corner, positions.len(), uvs.len(), normals.len()))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(parse_error)?;
                if corners.len() < 3 {
                    return Err(parse_error(format!("face has {} corners", corners.len())));
                }
                for i in 1..corners.len() - 1 {
                    for corner in [corners[0], corners[i], corners[i + 1]] {
                        mesh.positions.push(positions[corner.position]);
                        mesh.uvs.push(corner.uv.map_or(Vec2::ZERO, |i| uvs[i]));
                        mesh.normals.push(corner.normal.map_or(Vec3::Y, |i| normals[i]));
                    }
                }
            }
            _ => {}
        }
    }

    if mesh.positions.is_empty() {
        return Err(AssetError::Empty(name.to_string()));
    }
    Ok(mesh)
}

#[derive(Clone, Copy)]
struct Corner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

fn parse_floats<'a, const N: usize>(
    mut tokens: impl Iterator<Item = &'a str>,
) -> Result<[f32; N], String> {
    let mut values = [0.0; N];
    for value in values.iter_mut() {
        let token = tokens.next().ok_or_else(|| format!("expected {N} numbers"))?;
        *value = token
            .parse()
            .map_err(|_| format!("'{token}' is not a number"))?;
    }
    Ok(values)
}

/// `p`, `p/t`, `p//n` or `p/t/n`, 1-based or negative (relative).
fn parse_corner(
    corner: &str,
    positions: usize,
    uvs: usize,
    normals: usize,
) -> Result<Corner, String> {
    let mut parts = corner.split('/');
    let position = resolve_index(parts.next(), positions, corner)?
        .ok_or_else(|| format!("face corner '{corner}' has no position"))?;
    let uv = resolve_index(parts.next(), uvs, corner)?;
    let normal = resolve_index(parts.next(), normals, corner)?;
    Ok(Corner {
        position,
        uv,
        normal,
    })
}

fn resolve_index(part: Option<&str>, count: usize, corner: &str) -> Result<Option<usize>, String> {
    let Some(part) = part.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    let raw: i64 = part
        .parse()
        .map_err(|_| format!("bad index in face corner '{corner}'"))?;
    let index = if raw < 0 { count as i64 + raw } else { raw - 1 };
    if index < 0 || index >= count as i64 {
        return Err(format!("index {raw} out of range in face corner '{corner}'"));
    }
    Ok(Some(index as usize))
}
