use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Wheel delta reported for one line-mode scroll tick, in browser-style pixels.
pub const PIXELS_PER_LINE: f32 = 100.0;

/// A discrete orbit-control request consumed by [`Camera::apply`](crate::Camera::apply).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrbitEvent {
    /// Pointer movement while dragging, in pixels (y grows downward).
    Drag { dx: f32, dy: f32 },
    /// Wheel movement; positive zooms out.
    Zoom { delta: f32 },
}

/// Turns pointer and wheel input into queued [`OrbitEvent`]s.
///
/// Events accumulate between frames and are handed out by
/// [`drain`](Self::drain), so the camera only changes at frame boundaries.
#[derive(Debug, Default)]
pub struct OrbitInput {
    dragging: bool,
    last_pointer: Option<Vec2>,
    pending: Vec<OrbitEvent>,
}

impl OrbitInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_down(&mut self, position: Vec2) {
        self.dragging = true;
        self.last_pointer = Some(position);
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        if let (true, Some(last)) = (self.dragging, self.last_pointer) {
            let delta = position - last;
            if delta != Vec2::ZERO {
                self.pending.push(OrbitEvent::Drag {
                    dx: delta.x,
                    dy: delta.y,
                });
            }
        }
        self.last_pointer = Some(position);
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y != 0.0 {
            self.pending.push(OrbitEvent::Zoom { delta: delta_y });
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Takes all events queued since the previous call.
    pub fn drain(&mut self) -> std::vec::Drain<'_, OrbitEvent> {
        self.pending.drain(..)
    }

    /// Feeds a winit window event. The left button drives dragging.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    let at = self.last_pointer.unwrap_or(Vec2::ZERO);
                    self.pointer_down(at);
                }
                ElementState::Released => self.pointer_up(),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_move(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => self.pointer_up(),
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports "scroll up" as positive; wheel deltas here grow downward
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                self.wheel(delta_y);
            }
            _ => {}
        }
    }
}
