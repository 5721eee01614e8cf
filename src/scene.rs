use glam::Vec3;

use crate::math::hex_to_linear;

/// Resources that must be released explicitly when a model leaves the scene
pub trait Dispose {
    fn dispose(self);
}

/// Single-slot owner of the model currently shown.
/// Attaching disposes the previous occupant before storing the new one.
#[derive(Debug)]
pub struct ModelSlot<M: Dispose> {
    current: Option<M>,
    generation: u64,
}

impl<M: Dispose> ModelSlot<M> {
    pub fn new() -> Self {
        Self {
            current: None,
            generation: 0,
        }
    }

    /// Replace the occupant; returns the new generation
    pub fn attach(&mut self, model: M) -> u64 {
        self.detach();
        self.current = Some(model);
        self.generation += 1;
        self.generation
    }

    /// Dispose the occupant, if any
    pub fn detach(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.dispose();
            self.generation += 1;
        }
    }

    pub fn current(&self) -> Option<&M> {
        self.current.as_ref()
    }

    /// Bumped on every attach or detach; lets mirrors detect a swap
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        usize::from(self.current.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

impl<M: Dispose> Default for ModelSlot<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    Directional {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
        cast_shadow: bool,
    },
}

impl Light {
    pub fn ambient(hex: u32, intensity: f32) -> Self {
        Light::Ambient {
            color: hex_to_linear(hex),
            intensity,
        }
    }

    pub fn directional(hex: u32, intensity: f32, position: Vec3) -> Self {
        Light::Directional {
            color: hex_to_linear(hex),
            intensity,
            position,
            cast_shadow: false,
        }
    }

    fn with_shadow(self) -> Self {
        match self {
            Light::Directional {
                color,
                intensity,
                position,
                ..
            } => Light::Directional {
                color,
                intensity,
                position,
                cast_shadow: true,
            },
            ambient => ambient,
        }
    }
}

pub const BACKGROUND_HEX: u32 = 0x18181c;
const WARM_WHITE: u32 = 0xfff8e1;

/// Scene graph root: background, lights and the single model slot
#[derive(Debug)]
pub struct Scene<M: Dispose> {
    pub background: [f32; 3],
    pub lights: Vec<Light>,
    pub model: ModelSlot<M>,
}

impl<M: Dispose> Scene<M> {
    pub fn new() -> Self {
        Self {
            background: hex_to_linear(BACKGROUND_HEX),
            lights: Vec::new(),
            model: ModelSlot::new(),
        }
    }

    /// Warm ambient plus key, fill and rim directional lights
    pub fn with_studio_lights() -> Self {
        let mut scene = Self::new();
        scene.lights = vec![
            Light::ambient(WARM_WHITE, 1.0),
            Light::directional(WARM_WHITE, 1.2, Vec3::new(4.0, 6.0, 5.0)).with_shadow(),
            Light::directional(WARM_WHITE, 0.6, Vec3::new(-3.0, 2.0, -2.0)),
            Light::directional(0xffffff, 0.5, Vec3::new(-4.0, 3.0, -5.0)),
        ];
        scene
    }

    pub fn directional_lights(&self) -> impl Iterator<Item = &Light> {
        self.lights
            .iter()
            .filter(|l| matches!(l, Light::Directional { .. }))
    }
}

impl<M: Dispose> Default for Scene<M> {
    fn default() -> Self {
        Self::new()
    }
}
