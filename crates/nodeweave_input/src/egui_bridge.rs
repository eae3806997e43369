// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion of raw egui events into canvas input events.

use egui::{Event, Modifiers, MouseWheelUnit, PointerButton, Pos2, Vec2};
use nodeweave_graph::InputEvent;

/// Points scrolled per wheel line
const LINE_HEIGHT: f32 = 24.0;
/// Points scrolled per wheel page
const PAGE_HEIGHT: f32 = 480.0;

/// Turns the egui event stream into [`InputEvent`]s relative to the canvas
/// origin, synthesising drags and pointer deltas egui does not report.
#[derive(Debug, Clone)]
pub struct EguiEventTranslator {
    origin: Pos2,
    last_pos: Option<Pos2>,
    held: Option<PointerButton>,
    modifiers: Modifiers,
}

impl EguiEventTranslator {
    /// Create a translator for a canvas whose top-left corner is at `origin`
    pub fn new(origin: Pos2) -> Self {
        Self {
            origin,
            last_pos: None,
            held: None,
            modifiers: Modifiers::NONE,
        }
    }

    /// Move the canvas origin, e.g. after a layout change
    pub fn set_origin(&mut self, origin: Pos2) {
        self.origin = origin;
    }

    /// Translate a batch of events, dropping the ones the canvas ignores
    pub fn translate_all<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a Event>,
    ) -> Vec<InputEvent> {
        events.into_iter().filter_map(|e| self.translate(e)).collect()
    }

    /// Translate one event
    pub fn translate(&mut self, event: &Event) -> Option<InputEvent> {
        match event {
            Event::PointerMoved(pos) => {
                let pos = self.local(*pos);
                let delta = self.last_pos.map_or(Vec2::ZERO, |last| pos - last);
                self.last_pos = Some(pos);
                let modifiers = self.modifiers;
                Some(match self.held {
                    Some(button) => InputEvent::PointerDrag {
                        pos,
                        delta,
                        button,
                        modifiers,
                    },
                    None => InputEvent::PointerMove {
                        pos,
                        delta,
                        modifiers,
                    },
                })
            }
            Event::PointerButton {
                pos,
                button,
                pressed,
                modifiers,
                ..
            } => {
                let pos = self.local(*pos);
                self.last_pos = Some(pos);
                self.modifiers = *modifiers;
                if *pressed {
                    self.held = Some(*button);
                    Some(InputEvent::PointerDown {
                        pos,
                        button: *button,
                        modifiers: *modifiers,
                    })
                } else {
                    if self.held == Some(*button) {
                        self.held = None;
                    }
                    Some(InputEvent::PointerUp {
                        pos,
                        button: *button,
                        modifiers: *modifiers,
                    })
                }
            }
            Event::PointerGone => {
                self.last_pos = None;
                self.held = None;
                Some(InputEvent::PointerLeft)
            }
            Event::MouseWheel {
                unit,
                delta,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;
                let scale = match unit {
                    MouseWheelUnit::Point => 1.0,
                    MouseWheelUnit::Line => LINE_HEIGHT,
                    MouseWheelUnit::Page => PAGE_HEIGHT,
                };
                Some(InputEvent::Scroll {
                    pos: self.last_pos.unwrap_or(Pos2::ZERO),
                    delta: *delta * scale,
                    modifiers: *modifiers,
                })
            }
            Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;
                Some(InputEvent::Key {
                    key: *key,
                    modifiers: *modifiers,
                })
            }
            Event::Key { modifiers, .. } => {
                self.modifiers = *modifiers;
                None
            }
            _ => None,
        }
    }

    fn local(&self, pos: Pos2) -> Pos2 {
        (pos - self.origin).to_pos2()
    }
}

impl Default for EguiEventTranslator {
    fn default() -> Self {
        Self::new(Pos2::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Key;

    fn button(x: f32, y: f32, pressed: bool) -> Event {
        Event::PointerButton {
            pos: Pos2::new(x, y),
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn test_held_button_turns_moves_into_drags() {
        let mut translator = EguiEventTranslator::new(Pos2::new(100.0, 50.0));
        let events = [
            Event::PointerMoved(Pos2::new(110.0, 60.0)),
            button(110.0, 60.0, true),
            Event::PointerMoved(Pos2::new(115.0, 58.0)),
            button(115.0, 58.0, false),
            Event::PointerMoved(Pos2::new(120.0, 58.0)),
        ];
        let out = translator.translate_all(&events);

        assert_eq!(out.len(), 5);
        assert_eq!(out[0].pos(), Some(Pos2::new(10.0, 10.0)));
        assert!(out[1].is_press(PointerButton::Primary));
        assert!(out[2].is_drag(PointerButton::Primary));
        assert_eq!(out[2].delta(), Some(Vec2::new(5.0, -2.0)));
        assert!(out[3].is_release(PointerButton::Primary));
        assert!(matches!(out[4], InputEvent::PointerMove { .. }));
    }

    #[test]
    fn test_pointer_gone_resets_state() {
        let mut translator = EguiEventTranslator::default();
        translator.translate(&button(5.0, 5.0, true));
        assert_eq!(translator.translate(&Event::PointerGone), Some(InputEvent::PointerLeft));

        let moved = translator.translate(&Event::PointerMoved(Pos2::new(8.0, 8.0)));
        assert!(matches!(moved, Some(InputEvent::PointerMove { delta, .. }) if delta == Vec2::ZERO));
    }

    #[test]
    fn test_wheel_units_and_keys() {
        let mut translator = EguiEventTranslator::default();
        let scroll = translator.translate(&Event::MouseWheel {
            unit: MouseWheelUnit::Line,
            delta: Vec2::new(0.0, 2.0),
            modifiers: Modifiers::NONE,
        });
        assert!(matches!(
            scroll,
            Some(InputEvent::Scroll { delta, .. }) if delta == Vec2::new(0.0, 2.0 * LINE_HEIGHT)
        ));

        let pressed = translator.translate(&Event::Key {
            key: Key::Escape,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: Modifiers::NONE,
        });
        assert!(matches!(pressed, Some(InputEvent::Key { key: Key::Escape, .. })));

        let released = translator.translate(&Event::Key {
            key: Key::Escape,
            physical_key: None,
            pressed: false,
            repeat: false,
            modifiers: Modifiers::NONE,
        });
        assert!(released.is_none());
    }
}
