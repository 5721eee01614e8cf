use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::loaders::MeshData;
use crate::scene::{Dispose, Light, Scene};

pub const MAX_DIRECTIONAL_LIGHTS: usize = 3;
pub const TONE_MAPPING_EXPOSURE: f32 = 1.2;

/// Interleaved mesh vertex uploaded to the GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Flatten a mesh into vertices; missing normals point up
    pub fn from_mesh(mesh: &MeshData) -> Vec<Vertex> {
        mesh.positions
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex {
                position: p.to_array(),
                normal: mesh.normals.get(i).copied().unwrap_or(Vec3::Y).to_array(),
                color: mesh.base_color,
            })
            .collect()
    }
}

/// Per-frame uniform: camera, exposure and the studio lights
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub exposure: f32,
    /// rgb premultiplied by intensity, w unused
    pub ambient: [f32; 4],
    /// Direction towards the light, w = 1 when the slot is in use
    pub light_directions: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    pub light_colors: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
}

impl SceneUniform {
    pub fn new<M: Dispose>(camera: &PerspectiveCamera, scene: &Scene<M>) -> Self {
        let mut uniform = Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_position: camera.position.to_array(),
            exposure: TONE_MAPPING_EXPOSURE,
            ambient: [0.0; 4],
            light_directions: [[0.0; 4]; MAX_DIRECTIONAL_LIGHTS],
            light_colors: [[0.0; 4]; MAX_DIRECTIONAL_LIGHTS],
        };

        let mut slot = 0;
        for light in &scene.lights {
            match *light {
                Light::Ambient { color, intensity } => {
                    for c in 0..3 {
                        uniform.ambient[c] += color[c] * intensity;
                    }
                }
                Light::Directional {
                    color,
                    intensity,
                    position,
                    ..
                } => {
                    if slot == MAX_DIRECTIONAL_LIGHTS {
                        log::warn!("Ignoring directional light beyond {}", MAX_DIRECTIONAL_LIGHTS);
                        continue;
                    }
                    let dir = position.normalize_or_zero();
                    uniform.light_directions[slot] = [dir.x, dir.y, dir.z, 1.0];
                    uniform.light_colors[slot] = [
                        color[0] * intensity,
                        color[1] * intensity,
                        color[2] * intensity,
                        0.0,
                    ];
                    slot += 1;
                }
            }
        }

        uniform
    }
}
