//! `minifb` window: input polling and buffer presentation.
//!
//! The window owns the [`Rasterizer`] the presenter draws into.  Mouse
//! buttons become [`PointerEvent`]s for the orbit camera; number keys are
//! forwarded to the simulated tracker as [`SimInput`].

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use nalgebra::Point2;

use crate::app::AppError;
use crate::camera::PointerEvent;
use crate::config::{WIN_H, WIN_W, WIN_X, WIN_Y};
use crate::render::Rasterizer;
use crate::tracking::SimInput;

/// Button state sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Buttons {
    left:   bool,
    middle: bool,
    right:  bool,
}

impl Buttons {
    fn any(self) -> bool { self.left || self.middle || self.right }
}

/// Turn one frame's mouse sample into a pointer event.
///
/// `pressed` is whether the current gesture has already emitted a press.
/// The first sample with a position while a button is held starts the
/// gesture, so a button that goes down outside the window still anchors it
/// once the pointer is back. Releasing every button ends it, wherever the
/// pointer is.
fn pointer_events(
    pressed:  bool,
    now:      Buttons,
    last_pos: Option<Point2<f32>>,
    pos:      Option<Point2<f32>>,
) -> Option<PointerEvent> {
    if !now.any() {
        return pressed.then_some(PointerEvent::Release);
    }
    let pos = pos?;
    if !pressed {
        Some(PointerEvent::Press { pos })
    } else if last_pos != Some(pos) {
        Some(PointerEvent::Drag { pos, left: now.left, middle: now.middle, right: now.right })
    } else {
        None
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:   Window,
    raster:   Rasterizer,
    sim_tx:   Sender<SimInput>,

    pressed:  bool,
    last_pos: Option<Point2<f32>>,
    pending:  Vec<PointerEvent>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Leap Fingers — index fingertip viewer",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        window.set_position(WIN_X, WIN_Y);
        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            raster:   Rasterizer::new(WIN_W, WIN_H),
            sim_tx,
            pressed:  false,
            last_pos: None,
            pending:  Vec::new(),
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    pub fn renderer(&mut self) -> &mut Rasterizer { &mut self.raster }

    /// Poll keyboard and mouse. Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Escape) || one_shot(Key::Q) {
            return false;
        }
        for (key, hands) in [(Key::Key0, 0), (Key::Key1, 1), (Key::Key2, 2)] {
            if one_shot(key) {
                let _ = self.sim_tx.send(SimInput::Hands(hands));
            }
        }
        if one_shot(Key::P) {
            let _ = self.sim_tx.send(SimInput::TogglePause);
        }

        let now = Buttons {
            left:   self.window.get_mouse_down(MouseButton::Left),
            middle: self.window.get_mouse_down(MouseButton::Middle),
            right:  self.window.get_mouse_down(MouseButton::Right),
        };
        let pos = self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Point2::new(x, y));
        if let Some(ev) = pointer_events(self.pressed, now, self.last_pos, pos) {
            match ev {
                PointerEvent::Press { .. } => self.pressed = true,
                PointerEvent::Release      => self.pressed = false,
                PointerEvent::Drag { .. }  => {}
            }
            self.pending.push(ev);
        }
        if pos.is_some() {
            self.last_pos = pos;
        }

        true
    }

    /// Pointer events gathered since the last call.
    pub fn drain_pointer_events(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Upload the rasterizer's buffer to the window.
    pub fn present(&mut self) {
        let (w, h) = (self.raster.width(), self.raster.height());
        if let Err(e) = self.window.update_with_buffer(self.raster.buffer(), w, h) {
            log::trace!("window update failed: {}", e);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const UP:   Buttons = Buttons { left: false, middle: false, right: false };
    const LEFT: Buttons = Buttons { left: true,  middle: false, right: false };

    #[test]
    fn button_down_is_press() {
        let p = Point2::new(10.0, 20.0);
        assert_eq!(pointer_events(false, LEFT, None, Some(p)), Some(PointerEvent::Press { pos: p }));
    }

    #[test]
    fn held_and_moved_is_drag() {
        let a = Point2::new(10.0, 20.0);
        let b = Point2::new(15.0, 22.0);
        assert_eq!(
            pointer_events(true, LEFT, Some(a), Some(b)),
            Some(PointerEvent::Drag { pos: b, left: true, middle: false, right: false }),
        );
    }

    #[test]
    fn held_still_is_nothing() {
        let a = Point2::new(10.0, 20.0);
        assert_eq!(pointer_events(true, LEFT, Some(a), Some(a)), None);
    }

    #[test]
    fn hover_is_nothing() {
        let a = Point2::new(10.0, 20.0);
        let b = Point2::new(30.0, 40.0);
        assert_eq!(pointer_events(false, UP, Some(a), Some(b)), None);
    }

    #[test]
    fn adding_a_button_mid_drag_stays_a_drag() {
        let a = Point2::new(10.0, 20.0);
        let b = Point2::new(11.0, 20.0);
        let both = Buttons { left: true, middle: true, right: false };
        assert_eq!(
            pointer_events(true, both, Some(a), Some(b)),
            Some(PointerEvent::Drag { pos: b, left: true, middle: true, right: false }),
        );
    }

    #[test]
    fn releasing_all_buttons_ends_the_gesture() {
        let a = Point2::new(10.0, 20.0);
        assert_eq!(pointer_events(true, UP, Some(a), Some(a)), Some(PointerEvent::Release));
        assert_eq!(pointer_events(true, UP, Some(a), None), Some(PointerEvent::Release));
    }

    #[test]
    fn press_outside_window_starts_when_pointer_returns() {
        let old = Point2::new(10.0, 20.0);
        let back = Point2::new(300.0, 200.0);
        // Held while off-window: nothing to anchor yet.
        assert_eq!(pointer_events(false, LEFT, Some(old), None), None);
        // First positioned sample while held becomes the press.
        assert_eq!(
            pointer_events(false, LEFT, Some(old), Some(back)),
            Some(PointerEvent::Press { pos: back }),
        );
    }
}
