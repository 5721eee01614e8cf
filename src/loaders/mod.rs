pub mod gltf;

pub use self::gltf::{
    decode, load_model, smooth_normals, spawn_load, LoadError, LoadedModel, MeshData,
    DRACO_EXTENSION,
};
