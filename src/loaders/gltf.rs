use std::path::Path;
use std::thread::JoinHandle;

use anyhow::{bail, Context, Result};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use glam::{Mat3, Mat4, Vec3};
use reqwest::Url;
use thiserror::Error;

use crate::asset::{AssetLocation, AssetRequest, BUNDLED_SCHEME};
use crate::config::{BUNDLED_MODEL, BUNDLED_MODEL_NAME, DRACO_DECODER_PATH};
use crate::math::AABB;
use crate::scene::Dispose;

pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

const FALLBACK_MESSAGE: &str = "Failed to load GLB";
const DEFAULT_BASE_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// One triangle list in world space
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: Option<String>,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
    /// The material names a base-color texture; only the factor is drawn
    pub has_base_color_texture: bool,
}

/// A decoded model, flattened to world-space meshes
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub name: String,
    pub meshes: Vec<MeshData>,
    pub bounds: Option<AABB>,
}

impl LoadedModel {
    pub fn from_meshes(name: impl Into<String>, meshes: Vec<MeshData>) -> Self {
        let bounds = AABB::from_points(meshes.iter().flat_map(|m| m.positions.iter().copied()));
        Self {
            name: name.into(),
            meshes,
            bounds,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }
}

impl Dispose for LoadedModel {
    fn dispose(self) {
        log::debug!("Disposing model {} ({} meshes)", self.name, self.meshes.len());
    }
}

/// Human-readable load failure shown in the viewer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self {
                message: FALLBACK_MESSAGE.to_string(),
            }
        } else {
            Self { message }
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for LoadError {
    fn from(err: anyhow::Error) -> Self {
        LoadError::new(format!("{err:#}"))
    }
}

/// Fetch and decode a model, blocking the calling thread
pub fn load_model(request: &AssetRequest) -> Result<LoadedModel> {
    log::info!("Loading model: {}", request.reference);

    let reference = request
        .reference
        .strip_prefix(BUNDLED_SCHEME)
        .unwrap_or(&request.reference);
    let name = Path::new(reference)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| reference.to_string());

    match &request.location {
        AssetLocation::Local(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            decode(&name, &bytes, path.parent())
        }
        AssetLocation::Remote(url) => {
            let client = reqwest::blocking::Client::builder()
                .build()
                .context("Failed to build HTTP client")?;
            let bytes = fetch(&client, url)?;
            decode_remote(&name, &bytes, url, &client)
        }
        AssetLocation::Bundled(bundled) => {
            if bundled != BUNDLED_MODEL_NAME {
                bail!("No bundled model named {bundled}");
            }
            decode(&name, BUNDLED_MODEL, None)
        }
    }
}

/// Decode glTF or GLB bytes. `base` resolves relative buffer URIs; without it
/// only embedded buffers are available.
pub fn decode(name: &str, bytes: &[u8], base: Option<&Path>) -> Result<LoadedModel> {
    let gltf::Gltf { document, blob } = parse(bytes)?;
    let buffers =
        gltf::import_buffers(&document, base, blob).context("Failed to load glTF buffers")?;

    assemble(name, &document, &buffers)
}

/// Like `decode`, with relative buffer URIs joined onto `url` and fetched
/// through `client`
fn decode_remote(
    name: &str,
    bytes: &[u8],
    url: &Url,
    client: &reqwest::blocking::Client,
) -> Result<LoadedModel> {
    let gltf::Gltf { document, mut blob } = parse(bytes)?;

    let mut buffers = Vec::new();
    for buffer in document.buffers() {
        let mut data = match buffer.source() {
            gltf::buffer::Source::Bin => blob
                .take()
                .context("Failed to load glTF buffers: missing binary chunk")?,
            gltf::buffer::Source::Uri(uri) => remote_buffer(client, url, uri)?,
        };
        if data.len() < buffer.length() {
            bail!(
                "Failed to load glTF buffers: buffer {} has {} bytes, expected {}",
                buffer.index(),
                data.len(),
                buffer.length()
            );
        }
        while data.len() % 4 != 0 {
            data.push(0);
        }
        buffers.push(gltf::buffer::Data(data));
    }

    assemble(name, &document, &buffers)
}

fn remote_buffer(client: &reqwest::blocking::Client, base: &Url, uri: &str) -> Result<Vec<u8>> {
    if let Some(rest) = uri.strip_prefix("data:") {
        let (_, payload) = rest
            .split_once(";base64,")
            .context("Failed to load glTF buffers: unsupported data URI")?;
        return BASE64_STANDARD
            .decode(payload)
            .context("Failed to load glTF buffers: invalid base64");
    }

    let url = base
        .join(uri)
        .with_context(|| format!("Invalid buffer URI {uri}"))?;
    log::debug!("Fetching buffer {}", url);
    fetch(client, &url)
}

fn parse(bytes: &[u8]) -> Result<gltf::Gltf> {
    check_required_extensions(bytes)?;
    gltf::Gltf::from_slice(bytes).context("Failed to parse glTF")
}

fn assemble(
    name: &str,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<LoadedModel> {
    log::debug!(
        "glTF parsed: {} scenes, {} nodes, {} meshes",
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count()
    );

    let mut meshes = Vec::new();
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        for node in scene.nodes() {
            process_node(&node, buffers, &Mat4::IDENTITY, &mut meshes)?;
        }
    }

    let model = LoadedModel::from_meshes(name, meshes);
    if model.bounds.is_none() {
        log::warn!("Model {} has no geometry", model.name);
    }
    log::info!(
        "Loaded {}: {} meshes, {} triangles",
        model.name,
        model.meshes.len(),
        model.triangle_count()
    );
    Ok(model)
}

/// Run `load_model` on a worker thread and hand the outcome to `on_settled`
pub fn spawn_load<F>(request: AssetRequest, on_settled: F) -> JoinHandle<()>
where
    F: FnOnce(Result<LoadedModel, LoadError>) + Send + 'static,
{
    std::thread::spawn(move || {
        let outcome = load_model(&request).map_err(LoadError::from);
        if let Err(e) = &outcome {
            log::error!("Failed to load {}: {}", request.reference, e);
        }
        on_settled(outcome);
    })
}

fn fetch(client: &reqwest::blocking::Client, url: &Url) -> Result<Vec<u8>> {
    let response = client
        .get(url.clone())
        .send()
        .with_context(|| format!("Failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("Failed to fetch {url}"))?;
    let bytes = response
        .bytes()
        .with_context(|| format!("Failed to read response from {url}"))?;
    Ok(bytes.to_vec())
}

/// Geometry compression is decoded outside this crate; refuse early with a
/// message that names where the decoder lives
fn check_required_extensions(bytes: &[u8]) -> Result<()> {
    let gltf = gltf::Gltf::from_slice_without_validation(bytes).context("Failed to parse glTF")?;
    if gltf.document.extensions_required().any(|e| e == DRACO_EXTENSION) {
        bail!(
            "Model uses {DRACO_EXTENSION}, which needs the Draco decoder from {DRACO_DECODER_PATH}"
        );
    }
    Ok(())
}

/// Recursively processes glTF nodes
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    meshes: &mut Vec<MeshData>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, meshes)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, meshes)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    meshes: &mut Vec<MeshData>,
) -> Result<()> {
    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping {:?} primitive in mesh {:?}", primitive.mode(), mesh.name());
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(|p| transform.transform_point3(Vec3::from_array(p)))
            .collect();

        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            bail!("Mesh {:?} index {} out of range", mesh.name(), bad);
        }
        let indices = indices[..indices.len() - indices.len() % 3].to_vec();

        let normals = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
                .collect(),
            None => smooth_normals(&positions, &indices),
        };

        let material = primitive.material();
        let pbr = material.pbr_metallic_roughness();
        let has_base_color_texture = pbr.base_color_texture().is_some();
        if has_base_color_texture {
            log::warn!(
                "Material {:?} on mesh {:?} has a base color texture; drawing the base color factor only",
                material.name().unwrap_or("<unnamed>"),
                mesh.name().unwrap_or("<unnamed>")
            );
        }

        meshes.push(MeshData {
            name: mesh.name().map(str::to_string),
            positions,
            normals,
            indices,
            base_color: pbr.base_color_factor(),
            has_base_color_texture,
        });
    }

    Ok(())
}

/// Area-weighted vertex normals for meshes that ship without them
pub fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals.into_iter().map(Vec3::normalize_or_zero).collect()
}

impl Default for MeshData {
    fn default() -> Self {
        Self {
            name: None,
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            base_color: DEFAULT_BASE_COLOR,
            has_base_color_texture: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_bounds_cover_all_meshes() {
        let model = LoadedModel::from_meshes(
            "pair",
            vec![
                MeshData {
                    positions: vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
                    ..Default::default()
                },
                MeshData {
                    positions: vec![Vec3::new(3.0, -2.0, 0.5)],
                    ..Default::default()
                },
            ],
        );

        let bounds = model.bounds.unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 1.0, 0.5));
        assert_eq!(model.vertex_count(), 3);
    }

    #[test]
    fn test_empty_model_has_no_bounds() {
        let model = LoadedModel::from_meshes("empty", Vec::new());
        assert!(model.bounds.is_none());
        assert_eq!(model.triangle_count(), 0);
    }

    #[test]
    fn test_smooth_normals_single_triangle() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = smooth_normals(&positions, &[0, 1, 2]);
        assert!(normals.iter().all(|n| *n == Vec3::Z));
    }

    #[test]
    fn test_load_error_falls_back_when_blank() {
        assert_eq!(LoadError::new("  ").message(), FALLBACK_MESSAGE);
        assert_eq!(LoadError::new("404 Not Found").to_string(), "404 Not Found");
    }

    #[test]
    fn test_anyhow_chain_becomes_message() {
        let err = anyhow::anyhow!("root cause").context("Failed to fetch x");
        let load_error = LoadError::from(err);
        assert_eq!(load_error.message(), "Failed to fetch x: root cause");
    }
}
