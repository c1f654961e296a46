use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::{Mod, Scancode};
use sdl2::mouse::MouseButton;
use sdl2::EventPump;
use std::collections::HashSet;

/// One discrete input occurrence, in arrival order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    KeyPressed { key: Scancode, alt: bool },
    /// `alt` is set when the key went down as an Alt chord.
    KeyReleased { key: Scancode, alt: bool },
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    MouseMoved { x: i32, y: i32 },
    Wheel(i32),
    Resized { width: u32, height: u32 },
}

pub struct InputState {
    pub events: Vec<InputEvent>,
    pub quit: bool,
    chorded: HashSet<Scancode>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            quit: false,
            chorded: HashSet::new(),
        }
    }

    pub fn update(&mut self, event_pump: &mut EventPump) {
        self.events.clear();
        for event in event_pump.poll_iter() {
            if let Some(input) = self.translate(event) {
                self.events.push(input);
            }
        }
    }

    fn translate(&mut self, event: Event) -> Option<InputEvent> {
        match event {
            Event::Quit { .. } => {
                self.quit = true;
                None
            }
            Event::KeyDown {
                scancode: Some(Scancode::Escape),
                ..
            } => {
                self.quit = true;
                None
            }
            Event::KeyDown {
                scancode: Some(key),
                keymod,
                repeat,
                ..
            } => self.key_pressed(key, keymod.intersects(Mod::LALTMOD | Mod::RALTMOD), repeat),
            Event::KeyUp {
                scancode: Some(key), ..
            } => Some(self.key_released(key)),
            Event::MouseButtonDown { mouse_btn, .. } => Some(InputEvent::MouseDown(mouse_btn)),
            Event::MouseButtonUp { mouse_btn, .. } => Some(InputEvent::MouseUp(mouse_btn)),
            Event::MouseMotion { x, y, .. } => Some(InputEvent::MouseMoved { x, y }),
            Event::MouseWheel { y, .. } => Some(InputEvent::Wheel(y)),
            Event::Window {
                win_event: WindowEvent::SizeChanged(w, h),
                ..
            } => Some(InputEvent::Resized {
                width: w.max(1) as u32,
                height: h.max(1) as u32,
            }),
            _ => None,
        }
    }

    fn key_pressed(&mut self, key: Scancode, alt: bool, repeat: bool) -> Option<InputEvent> {
        if !repeat {
            if alt {
                self.chorded.insert(key);
            } else {
                self.chorded.remove(&key);
            }
        }
        // Held Alt+key keeps nudging a light; other bindings fire once.
        (alt || !repeat).then_some(InputEvent::KeyPressed { key, alt })
    }

    fn key_released(&mut self, key: Scancode) -> InputEvent {
        let alt = self.chorded.remove(&key);
        InputEvent::KeyReleased { key, alt }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_only_pass_with_alt() {
        let mut input = InputState::new();
        assert_eq!(
            input.key_pressed(Scancode::M, false, false),
            Some(InputEvent::KeyPressed { key: Scancode::M, alt: false })
        );
        assert_eq!(input.key_pressed(Scancode::M, false, true), None);
        assert_eq!(
            input.key_pressed(Scancode::A, true, true),
            Some(InputEvent::KeyPressed { key: Scancode::A, alt: true })
        );
    }

    #[test]
    fn chorded_release_is_tagged() {
        let mut input = InputState::new();
        input.key_pressed(Scancode::W, false, false);
        input.key_pressed(Scancode::S, true, false);

        assert_eq!(
            input.key_released(Scancode::S),
            InputEvent::KeyReleased { key: Scancode::S, alt: true }
        );
        assert_eq!(
            input.key_released(Scancode::W),
            InputEvent::KeyReleased { key: Scancode::W, alt: false }
        );
    }

    #[test]
    fn alt_repeat_keeps_a_plain_press_plain() {
        let mut input = InputState::new();
        input.key_pressed(Scancode::W, false, false);
        input.key_pressed(Scancode::W, true, true);
        assert_eq!(
            input.key_released(Scancode::W),
            InputEvent::KeyReleased { key: Scancode::W, alt: false }
        );
    }
}
