use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent};

use crate::controls::{ControlInput, PointerButton};

/// Trackpads report pixels; this many count as one wheel notch
pub const PIXELS_PER_NOTCH: f32 = 100.0;

/// Bridge a winit window event to the orbit controls' input vocabulary.
/// Events the controls don't care about map to `None`.
pub fn control_input(event: &WindowEvent) -> Option<ControlInput> {
    match event {
        WindowEvent::MouseInput { state, button, .. } => {
            let button = pointer_button(*button)?;
            Some(match state {
                ElementState::Pressed => ControlInput::ButtonPressed(button),
                ElementState::Released => ControlInput::ButtonReleased(button),
            })
        }
        WindowEvent::CursorMoved { position, .. } => Some(ControlInput::CursorMoved(Vec2::new(
            position.x as f32,
            position.y as f32,
        ))),
        WindowEvent::CursorLeft { .. } => Some(ControlInput::CursorLeft),
        WindowEvent::MouseWheel { delta, .. } => {
            let notches = wheel_notches(*delta);
            (notches != 0.0).then_some(ControlInput::Wheel(notches))
        }
        WindowEvent::Touch(Touch {
            phase, location, id, ..
        }) => Some(touch_input(
            *phase,
            *id,
            Vec2::new(location.x as f32, location.y as f32),
        )),
        _ => None,
    }
}

pub fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Left),
        MouseButton::Right => Some(PointerButton::Right),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Positive when scrolling away from the user
pub fn wheel_notches(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_NOTCH,
    }
}

pub fn touch_input(phase: TouchPhase, id: u64, position: Vec2) -> ControlInput {
    match phase {
        TouchPhase::Started => ControlInput::TouchStarted { id, position },
        TouchPhase::Moved => ControlInput::TouchMoved { id, position },
        TouchPhase::Ended | TouchPhase::Cancelled => ControlInput::TouchEnded { id },
    }
}
