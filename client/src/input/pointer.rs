//! Bevy window events to host input events.
//!
//! Only events addressed to the window the effect is mounted in are
//! forwarded. Positions stay in logical window pixels, which is the space
//! the host's container bounds are measured in.

use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::{CursorMoved, WindowResized};
use wavefx::host::InputEvent;

pub fn cursor_event(event: &CursorMoved, window: Entity) -> Option<InputEvent> {
    (event.window == window).then_some(InputEvent::PointerMove {
        x: event.position.x,
        y: event.position.y,
    })
}

pub fn touch_event(event: &TouchInput, window: Entity) -> Option<InputEvent> {
    if event.window != window {
        return None;
    }
    match event.phase {
        TouchPhase::Started | TouchPhase::Moved => Some(InputEvent::TouchMove {
            x: event.position.x,
            y: event.position.y,
        }),
        TouchPhase::Ended | TouchPhase::Canceled => None,
    }
}

pub fn resize_event(event: &WindowResized, window: Entity) -> Option<InputEvent> {
    (event.window == window).then_some(InputEvent::Resize)
}
