//! Damped orbit controls: drag to rotate around a target, wheel or pinch to
//! dolly. Input moves a *goal* state; [`OrbitControls::update`] eases the
//! current state toward it every frame.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::camera::PerspectiveCamera;

/// Keeps the polar angle off the poles where look-at degenerates
const POLAR_EPSILON: f32 = 1e-3;
/// Below this the transition snaps to its goal
const REST_THRESHOLD: f32 = 1e-4;
/// Radius multiplier per wheel notch at `dolly_speed == 1`
const DOLLY_STEP_SCALE: f32 = 0.9;
/// Vertical drag distance equivalent to one wheel notch
const DRAG_PIXELS_PER_DOLLY_STEP: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    None,
    Rotate,
    Dolly,
    Truck,
    TouchRotate,
    TouchDolly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Backend-neutral pointer input consumed by the controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlInput {
    ButtonPressed(PointerButton),
    ButtonReleased(PointerButton),
    CursorMoved(Vec2),
    CursorLeft,
    /// Wheel notches, positive when scrolling away from the user
    Wheel(f32),
    TouchStarted { id: u64, position: Vec2 },
    TouchMoved { id: u64, position: Vec2 },
    TouchEnded { id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseBindings {
    pub left: ControlAction,
    pub right: ControlAction,
    pub middle: ControlAction,
    pub wheel: ControlAction,
}

impl Default for MouseBindings {
    fn default() -> Self {
        Self {
            left: ControlAction::Rotate,
            right: ControlAction::None,
            middle: ControlAction::None,
            wheel: ControlAction::Dolly,
        }
    }
}

impl MouseBindings {
    fn action(&self, button: PointerButton) -> ControlAction {
        match button {
            PointerButton::Left => self.left,
            PointerButton::Right => self.right,
            PointerButton::Middle => self.middle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchBindings {
    pub one: ControlAction,
    pub two: ControlAction,
}

impl Default for TouchBindings {
    fn default() -> Self {
        Self {
            one: ControlAction::TouchRotate,
            two: ControlAction::TouchDolly,
        }
    }
}

/// Spherical coordinates around the orbit target.
/// `polar` is measured from +Y, `azimuth` around +Y starting at +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub polar: f32,
    pub azimuth: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self {
                radius: 0.0,
                polar: PI / 2.0,
                azimuth: 0.0,
            };
        }

        Self {
            radius,
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        Vec3::new(
            self.radius * sin_polar * sin_azimuth,
            self.radius * cos_polar,
            self.radius * sin_polar * cos_azimuth,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ControlState {
    target: Vec3,
    spherical: Spherical,
}

impl ControlState {
    fn lerp(&self, goal: &ControlState, t: f32) -> ControlState {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        ControlState {
            target: self.target.lerp(goal.target, t),
            spherical: Spherical {
                radius: mix(self.spherical.radius, goal.spherical.radius),
                polar: mix(self.spherical.polar, goal.spherical.polar),
                azimuth: mix(self.spherical.azimuth, goal.spherical.azimuth),
            },
        }
    }

    fn settled_at(&self, goal: &ControlState) -> bool {
        let scale = self.spherical.radius.max(1.0);
        self.target.distance(goal.target) < REST_THRESHOLD * scale
            && (self.spherical.radius - goal.spherical.radius).abs() < REST_THRESHOLD * scale
            && (self.spherical.polar - goal.spherical.polar).abs() < REST_THRESHOLD
            && (self.spherical.azimuth - goal.spherical.azimuth).abs() < REST_THRESHOLD
    }
}

/// Wrap an angle difference into `(-PI, PI]`
fn shortest_angle(delta: f32) -> f32 {
    let wrapped = (delta + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

pub struct OrbitControls {
    pub damping_factor: f32,
    pub dragging_damping_factor: f32,
    pub azimuth_rotate_speed: f32,
    pub polar_rotate_speed: f32,
    pub dolly_speed: f32,
    pub truck_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub mouse: MouseBindings,
    pub touches: TouchBindings,
    current: ControlState,
    goal: ControlState,
    saved: ControlState,
    viewport: Vec2,
    cursor: Option<Vec2>,
    buttons: Vec<PointerButton>,
    touch_points: Vec<(u64, Vec2)>,
}

impl OrbitControls {
    pub fn new() -> Self {
        let initial = ControlState {
            target: Vec3::ZERO,
            spherical: Spherical::from_offset(Vec3::new(0.0, 0.0, 4.0)),
        };

        Self {
            damping_factor: 0.1,
            dragging_damping_factor: 0.25,
            azimuth_rotate_speed: 0.5,
            polar_rotate_speed: 0.5,
            dolly_speed: 1.0,
            truck_speed: 1.0,
            min_distance: 0.5,
            max_distance: 20.0,
            min_polar: 0.0,
            max_polar: PI,
            mouse: MouseBindings::default(),
            touches: TouchBindings::default(),
            current: initial,
            goal: initial,
            saved: initial,
            viewport: Vec2::new(1.0, 1.0),
            cursor: None,
            buttons: Vec::new(),
            touch_points: Vec::new(),
        }
    }

    /// Drag distances are measured relative to the viewport height
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = Vec2::new(width as f32, height as f32);
        }
    }

    pub fn target(&self) -> Vec3 {
        self.current.target
    }

    pub fn distance(&self) -> f32 {
        self.current.spherical.radius
    }

    pub fn spherical(&self) -> Spherical {
        self.current.spherical
    }

    pub fn goal_distance(&self) -> f32 {
        self.goal.spherical.radius
    }

    pub fn goal_spherical(&self) -> Spherical {
        self.goal.spherical
    }

    pub fn goal_target(&self) -> Vec3 {
        self.goal.target
    }

    /// Camera position implied by the current state
    pub fn position(&self) -> Vec3 {
        self.current.target + self.current.spherical.to_offset()
    }

    /// True while a button bound to an action or any touch is held
    pub fn is_dragging(&self) -> bool {
        !self.touch_points.is_empty()
            || self
                .buttons
                .iter()
                .any(|&b| self.mouse.action(b) != ControlAction::None)
    }

    /// Make sure the dolly range can reach `distance`
    pub fn ensure_max_distance(&mut self, distance: f32) {
        if distance.is_finite() {
            self.max_distance = self.max_distance.max(distance);
        }
    }

    /// Look from `position` at `target`. Without `transition` the move is
    /// applied immediately instead of eased in by [`update`](Self::update).
    pub fn set_look_at(&mut self, position: Vec3, target: Vec3, transition: bool) {
        let mut spherical = Spherical::from_offset(position - target);
        spherical.azimuth = self.current.spherical.azimuth
            + shortest_angle(spherical.azimuth - self.current.spherical.azimuth);

        self.goal = ControlState { target, spherical };
        self.clamp_goal();
        if !transition {
            self.current = self.goal;
        }
    }

    /// Remember the goal state as the point [`reset`](Self::reset) returns to
    pub fn save_state(&mut self) {
        self.saved = self.goal;
    }

    pub fn reset(&mut self, transition: bool) {
        self.goal = self.saved;
        if !transition {
            self.current = self.goal;
        }
    }

    pub fn rotate(&mut self, azimuth: f32, polar: f32) {
        self.goal.spherical.azimuth += azimuth;
        self.goal.spherical.polar += polar;
        self.clamp_goal();
    }

    /// Move toward (positive) or away from (negative) the target
    pub fn dolly_steps(&mut self, steps: f32) {
        self.scale_distance(DOLLY_STEP_SCALE.powf(steps * self.dolly_speed));
    }

    pub fn scale_distance(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.goal.spherical.radius *= factor;
            self.clamp_goal();
        }
    }

    /// Pan the target across the view plane by a pixel delta
    pub fn truck(&mut self, delta: Vec2) {
        let offset = self.goal.spherical.to_offset();
        let forward = -offset.normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();

        let scale = self.goal.spherical.radius * self.truck_speed / self.viewport.y;
        self.goal.target += (-right * delta.x + up * delta.y) * scale;
    }

    pub fn handle_input(&mut self, input: ControlInput) {
        match input {
            ControlInput::ButtonPressed(button) => {
                if !self.buttons.contains(&button) {
                    self.buttons.push(button);
                }
            }
            ControlInput::ButtonReleased(button) => self.buttons.retain(|&b| b != button),
            ControlInput::CursorMoved(position) => {
                if let Some(previous) = self.cursor {
                    if let Some(action) = self.active_mouse_action() {
                        self.drag(action, position - previous);
                    }
                }
                self.cursor = Some(position);
            }
            ControlInput::CursorLeft => {
                self.cursor = None;
                self.buttons.clear();
            }
            ControlInput::Wheel(notches) => {
                if self.mouse.wheel == ControlAction::Dolly {
                    self.dolly_steps(notches);
                }
            }
            ControlInput::TouchStarted { id, position } => {
                self.touch_points.retain(|&(t, _)| t != id);
                self.touch_points.push((id, position));
            }
            ControlInput::TouchMoved { id, position } => self.touch_moved(id, position),
            ControlInput::TouchEnded { id } => self.touch_points.retain(|&(t, _)| t != id),
        }
    }

    /// Advance the damping simulation by `delta` seconds.
    /// Returns true when the camera moved.
    pub fn update(&mut self, delta: f32) -> bool {
        let damping = if self.is_dragging() {
            self.dragging_damping_factor
        } else {
            self.damping_factor
        };
        // Frame-rate independent: equivalent to `damping` per 60 Hz frame
        let t = 1.0 - (-damping * delta.max(0.0) * 60.0).exp();

        let before = self.current;
        let next = self.current.lerp(&self.goal, t);
        self.current = if next.settled_at(&self.goal) {
            self.goal
        } else {
            next
        };
        self.current != before
    }

    pub fn apply(&self, camera: &mut PerspectiveCamera) {
        camera.target = self.current.target;
        camera.position = self.position();
    }

    fn active_mouse_action(&self) -> Option<ControlAction> {
        self.buttons
            .iter()
            .map(|&b| self.mouse.action(b))
            .find(|&a| a != ControlAction::None)
    }

    fn drag(&mut self, action: ControlAction, delta: Vec2) {
        match action {
            ControlAction::Rotate | ControlAction::TouchRotate => {
                let azimuth = TAU * self.azimuth_rotate_speed * delta.x / self.viewport.y;
                let polar = TAU * self.polar_rotate_speed * delta.y / self.viewport.y;
                self.rotate(-azimuth, -polar);
            }
            ControlAction::Dolly => self.dolly_steps(-delta.y / DRAG_PIXELS_PER_DOLLY_STEP),
            ControlAction::Truck => self.truck(delta),
            ControlAction::TouchDolly | ControlAction::None => {}
        }
    }

    fn touch_moved(&mut self, id: u64, position: Vec2) {
        let Some(index) = self.touch_points.iter().position(|&(t, _)| t == id) else {
            return;
        };
        let previous = self.touch_points[index].1;

        match self.touch_points.len() {
            1 => {
                self.touch_points[index].1 = position;
                self.drag(self.touches.one, position - previous);
            }
            2 => {
                let other = self.touch_points[1 - index].1;
                self.touch_points[index].1 = position;

                match self.touches.two {
                    ControlAction::TouchDolly | ControlAction::Dolly => {
                        let before = previous.distance(other);
                        let after = position.distance(other);
                        if before > f32::EPSILON && after > f32::EPSILON {
                            self.scale_distance((before / after).powf(self.dolly_speed));
                        }
                    }
                    action => self.drag(action, (position - previous) * 0.5),
                }
            }
            _ => self.touch_points[index].1 = position,
        }
    }

    fn clamp_goal(&mut self) {
        let min_distance = self.min_distance.min(self.max_distance);
        let spherical = &mut self.goal.spherical;
        spherical.radius = spherical.radius.clamp(min_distance, self.max_distance);

        let min_polar = self.min_polar.max(POLAR_EPSILON);
        let max_polar = self.max_polar.min(PI - POLAR_EPSILON).max(min_polar);
        spherical.polar = spherical.polar.clamp(min_polar, max_polar);
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}
