//! Viewer state: camera, controls, the single-model scene and the
//! loading/error flags the overlay reflects. Nothing here touches the GPU;
//! the renderer mirrors `scene` each frame.

use crate::asset::AssetRequest;
use crate::camera::PerspectiveCamera;
use crate::controls::{ControlInput, OrbitControls};
use crate::core::clock::FrameClock;
use crate::framing::Framing;
use crate::loaders::{LoadError, LoadedModel};
use crate::scene::Scene;

/// Loading and error flags, the viewer's styling hooks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerStatus {
    loading: bool,
    error: Option<String>,
}

impl ViewerStatus {
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// An empty message clears the error
    pub fn set_error(&mut self, message: &str) {
        self.error = (!message.is_empty()).then(|| message.to_string());
    }

    pub fn data_loading(&self) -> &'static str {
        if self.loading {
            "true"
        } else {
            "false"
        }
    }

    pub fn data_error(&self) -> &'static str {
        if self.error.is_some() {
            "true"
        } else {
            "false"
        }
    }
}

pub struct Viewer {
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub scene: Scene<LoadedModel>,
    status: ViewerStatus,
    clock: FrameClock,
    viewport: (u32, u32),
}

impl Viewer {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new();
        controls.set_look_at(camera.position, camera.target, false);
        controls.save_state();
        controls.apply(&mut camera);

        let mut viewer = Self {
            camera,
            controls,
            scene: Scene::with_studio_lights(),
            status: ViewerStatus::default(),
            clock: FrameClock::new(),
            viewport: (1, 1),
        };
        viewer.resize(width, height);
        viewer
    }

    pub fn status(&self) -> &ViewerStatus {
        &self.status
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Validate `reference` and raise the loading flag. Returns the request to
    /// hand to the loader, or `None` when validation already failed and the
    /// error is showing.
    pub fn begin_load(&mut self, reference: &str) -> Option<AssetRequest> {
        self.status.set_error("");
        self.status.set_loading(true);

        match AssetRequest::parse(reference) {
            Ok(request) => Some(request),
            Err(e) => {
                log::warn!("Not loading {:?}: {}", reference, e);
                self.status.set_loading(false);
                self.status.set_error(&e.to_string());
                None
            }
        }
    }

    pub fn finish_load(&mut self, outcome: Result<LoadedModel, LoadError>) {
        self.status.set_loading(false);
        match outcome {
            Ok(model) => self.attach_model(model),
            Err(e) => self.status.set_error(e.message()),
        }
    }

    /// Swap in `model` and frame the camera on it
    pub fn attach_model(&mut self, model: LoadedModel) {
        let bounds = model.bounds;
        self.scene.model.attach(model);

        match bounds {
            Some(bounds) => Framing::for_bounds(&bounds).apply(&mut self.camera, &mut self.controls),
            None => log::warn!("Model has no bounds; keeping the current view"),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.camera.set_viewport(width, height) {
            self.controls.set_viewport(width, height);
            self.viewport = (width, height);
        }
    }

    pub fn handle_input(&mut self, input: ControlInput) {
        self.controls.handle_input(input);
    }

    /// Per-frame update driven by the wall clock; returns the step taken
    pub fn frame(&mut self) -> f32 {
        let delta = self.clock.tick();
        self.advance(delta);
        delta
    }

    /// Step the controls by `delta` seconds and move the camera
    pub fn advance(&mut self, delta: f32) -> bool {
        let moved = self.controls.update(delta);
        self.controls.apply(&mut self.camera);
        moved
    }
}
