//! Pointer input pipeline
//!
//! Raw pointer positions come in through `handle`; the game-space cursor moves
//! by the raw delta after it passes through the modifier set (sensitivity,
//! axis inversion, one-shot offset). Chaos effects only touch the modifiers
//! through the setters below.

use std::rc::Rc;

use glam::Vec2;

use super::events::{EventBus, GameEvent};
use crate::consts::{HEIGHT, WIDTH};

/// Raw input delivered by the platform layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Absolute pointer position in game coordinates
    PointerMove { x: f32, y: f32 },
    PointerDown { button: i16 },
    PointerUp,
    PointerLeave,
    Key(KeyInput),
}

/// Keyboard input relevant to the game (team name entry)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Enter,
}

/// Axis-aligned bounds the cursor is clamped to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(WIDTH, HEIGHT),
        }
    }
}

impl Bounds {
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Modifier set applied to every pointer delta
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modifiers {
    pub sensitivity: f32,
    pub invert_x: bool,
    pub invert_y: bool,
    /// Consumed by the next pointer move, then zeroed
    pub pending_offset: Vec2,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            invert_x: false,
            invert_y: false,
            pending_offset: Vec2::ZERO,
        }
    }
}

impl Modifiers {
    /// Transform a raw delta: scale, invert, then add the pending offset
    pub fn apply(&self, raw_delta: Vec2) -> Vec2 {
        let mut delta = raw_delta * self.sensitivity;
        if self.invert_x {
            delta.x = -delta.x;
        }
        if self.invert_y {
            delta.y = -delta.y;
        }
        delta + self.pending_offset
    }
}

/// Snapshot of the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputState {
    pub raw: Vec2,
    /// Game-space cursor (after modifiers)
    pub position: Vec2,
    pub is_down: bool,
    pub is_dragging: bool,
    pub drag_start: Vec2,
}

pub struct InputManager {
    state: InputState,
    modifiers: Modifiers,
    last_raw: Vec2,
    bounds: Bounds,
    bus: Rc<EventBus>,
}

impl InputManager {
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self::with_bounds(bus, Bounds::default())
    }

    pub fn with_bounds(bus: Rc<EventBus>, bounds: Bounds) -> Self {
        let center = bounds.center();
        Self {
            state: InputState {
                raw: center,
                position: center,
                is_down: false,
                is_dragging: false,
                drag_start: center,
            },
            modifiers: Modifiers::default(),
            last_raw: center,
            bounds,
            bus,
        }
    }

    /// Feed one pointer event. Key events are ignored here.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => self.pointer_move(Vec2::new(x, y)),
            InputEvent::PointerDown { button } => self.pointer_down(button),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::PointerLeave => self.pointer_leave(),
            InputEvent::Key(_) => {}
        }
    }

    fn pointer_move(&mut self, raw: Vec2) {
        let delta = raw - self.last_raw;
        self.last_raw = raw;
        self.state.raw = raw;

        let applied = self.modifiers.apply(delta);
        self.state.position = self.bounds.clamp(self.state.position + applied);
        self.modifiers.pending_offset = Vec2::ZERO;
    }

    fn pointer_down(&mut self, button: i16) {
        self.state.is_down = true;
        self.state.drag_start = self.state.position;
        let Vec2 { x, y } = self.state.position;
        self.bus.publish(GameEvent::Click { x, y, button });
    }

    fn pointer_up(&mut self) {
        if self.state.is_dragging {
            let Vec2 { x, y } = self.state.position;
            self.bus.publish(GameEvent::DragEnd { x, y });
        }
        self.state.is_down = false;
        self.state.is_dragging = false;
    }

    fn pointer_leave(&mut self) {
        self.state.is_down = false;
        self.state.is_dragging = false;
    }

    /// Promote a held button into a drag (called by level content on pick-up)
    pub fn start_drag(&mut self) {
        if self.state.is_down && !self.state.is_dragging {
            self.state.is_dragging = true;
            let Vec2 { x, y } = self.state.position;
            self.bus.publish(GameEvent::DragStart { x, y });
        }
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn position(&self) -> Vec2 {
        self.state.position
    }

    pub fn x(&self) -> f32 {
        self.state.position.x
    }

    pub fn y(&self) -> f32 {
        self.state.position.y
    }

    pub fn is_down(&self) -> bool {
        self.state.is_down
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    // === Chaos modifiers (last writer wins) ===

    pub fn set_sensitivity(&mut self, multiplier: f32) {
        self.modifiers.sensitivity = multiplier;
    }

    pub fn reset_sensitivity(&mut self) {
        self.modifiers.sensitivity = 1.0;
    }

    pub fn set_invert_x(&mut self, invert: bool) {
        self.modifiers.invert_x = invert;
    }

    pub fn set_invert_y(&mut self, invert: bool) {
        self.modifiers.invert_y = invert;
    }

    pub fn reset_invert(&mut self) {
        self.modifiers.invert_x = false;
        self.modifiers.invert_y = false;
    }

    /// Accumulate a one-shot offset; contributors within a frame add up
    pub fn add_offset(&mut self, dx: f32, dy: f32) {
        self.modifiers.pending_offset += Vec2::new(dx, dy);
    }

    /// Drop any offset not yet consumed by a pointer move
    pub fn clear_offset(&mut self) {
        self.modifiers.pending_offset = Vec2::ZERO;
    }

    /// Restore every modifier to its default
    pub fn reset_modifiers(&mut self) {
        self.modifiers = Modifiers::default();
    }

    /// Snap the cursor back under the raw pointer
    pub fn reset_position(&mut self) {
        self.state.position = self.bounds.clamp(self.state.raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::events::{EventLog, Topic};
    use proptest::prelude::*;

    fn manager() -> (InputManager, Rc<EventBus>) {
        let bus = Rc::new(EventBus::new());
        (InputManager::new(Rc::clone(&bus)), bus)
    }

    fn move_by(input: &mut InputManager, dx: f32, dy: f32) {
        let raw = input.state().raw;
        input.handle(InputEvent::PointerMove {
            x: raw.x + dx,
            y: raw.y + dy,
        });
    }

    #[test]
    fn test_sensitivity_and_invert_x() {
        let (mut input, _) = manager();
        input.set_sensitivity(2.0);
        input.set_invert_x(true);
        let before = input.position();
        move_by(&mut input, 10.0, 7.0);
        assert_eq!(input.position() - before, Vec2::new(-20.0, 14.0));
    }

    #[test]
    fn test_offsets_accumulate_and_are_consumed_once() {
        let (mut input, _) = manager();
        input.add_offset(5.0, 0.0);
        input.add_offset(3.0, -2.0);
        let before = input.position();
        move_by(&mut input, 1.0, 1.0);
        assert_eq!(input.position() - before, Vec2::new(9.0, -1.0));
        assert_eq!(input.modifiers().pending_offset, Vec2::ZERO);

        let before = input.position();
        move_by(&mut input, 1.0, 1.0);
        assert_eq!(input.position() - before, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_resets_restore_defaults() {
        let (mut input, _) = manager();
        input.set_sensitivity(0.3);
        input.set_invert_x(true);
        input.set_invert_y(true);
        input.reset_sensitivity();
        input.reset_invert();
        assert_eq!(input.modifiers(), Modifiers::default());

        input.add_offset(4.0, 4.0);
        input.clear_offset();
        assert_eq!(input.modifiers(), Modifiers::default());

        input.set_sensitivity(3.0);
        input.set_invert_y(true);
        input.add_offset(1.0, 1.0);
        input.reset_modifiers();
        assert_eq!(input.modifiers(), Modifiers::default());
    }

    #[test]
    fn test_reset_position_snaps_to_raw_pointer() {
        let (mut input, _) = manager();
        input.set_sensitivity(2.0);
        move_by(&mut input, 100.0, -50.0);
        assert_ne!(input.position(), input.state().raw);

        input.reset_position();
        assert_eq!(input.position(), input.state().raw);
    }

    #[test]
    fn test_click_and_drag_publish_modified_position() {
        let (mut input, bus) = manager();
        let log = EventLog::new();
        log.attach(&bus, &[Topic::Click, Topic::DragStart, Topic::DragEnd]);

        input.set_invert_x(true);
        move_by(&mut input, 100.0, 0.0);
        let Vec2 { x, y } = input.position();
        assert_eq!(x, 860.0);

        input.handle(InputEvent::PointerDown { button: 0 });
        input.start_drag();
        input.start_drag();
        input.handle(InputEvent::PointerUp);

        assert_eq!(
            log.events(),
            vec![
                GameEvent::Click { x, y, button: 0 },
                GameEvent::DragStart { x, y },
                GameEvent::DragEnd { x, y },
            ]
        );
    }

    #[test]
    fn test_leave_cancels_drag_without_event() {
        let (mut input, bus) = manager();
        let log = EventLog::new();
        log.attach(&bus, &[Topic::DragEnd]);
        input.handle(InputEvent::PointerDown { button: 0 });
        input.start_drag();
        input.handle(InputEvent::PointerLeave);
        assert!(!input.is_dragging());
        assert!(!input.is_down());
        assert_eq!(log.count(Topic::DragEnd), 0);
    }

    proptest! {
        #[test]
        fn position_stays_in_bounds(
            moves in prop::collection::vec((-5000.0f32..5000.0, -5000.0f32..5000.0), 1..30),
            sensitivity in 0.1f32..5.0,
            offset in (-500.0f32..500.0, -500.0f32..500.0),
        ) {
            let (mut input, _) = manager();
            input.set_sensitivity(sensitivity);
            for (dx, dy) in moves {
                input.add_offset(offset.0, offset.1);
                move_by(&mut input, dx, dy);
                prop_assert!(input.bounds().contains(input.position()));
            }
        }
    }
}
