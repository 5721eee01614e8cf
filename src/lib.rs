pub mod asset;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod core;
pub mod framing;
pub mod loaders;
pub mod math;
pub mod newsletter;
pub mod params;
pub mod renderer;
pub mod scene;
pub mod types;
pub mod ui;
pub mod viewer;

pub use config::ShowcaseConfig;
pub use viewer::{Viewer, ViewerStatus};
