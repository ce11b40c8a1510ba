use glam::Vec2;

/// Position used when there is no hover/touch: far outside any canvas
pub const OFF_CANVAS: Vec2 = Vec2::new(-9999.0, -9999.0);

/// Input delivered to a component, already in canvas-local coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// Mouse moved (or dragged) to a position
    Move(Vec2),
    /// Touch moved; only the first touch point is tracked
    Touch(Vec<Vec2>),
    /// Discrete click or tap
    Press(Vec2),
    /// Pointer left the surface
    Leave,
}

/// Convert client (screen) coordinates into canvas-local ones by
/// subtracting the canvas's offset
pub fn to_local(client: Vec2, canvas_offset: Vec2) -> Vec2 {
    client - canvas_offset
}

/// Last known pointer position for one component.
///
/// Single writer (the event handler) and single reader (the frame
/// callback), both on the event-loop thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
}

impl PointerState {
    pub fn new() -> Self {
        Self {
            position: OFF_CANVAS,
        }
    }

    pub fn is_present(&self) -> bool {
        self.position != OFF_CANVAS
    }

    /// Apply an event. Returns true when the event was a press.
    pub fn apply(&mut self, event: &PointerEvent) -> bool {
        match event {
            PointerEvent::Move(p) => self.position = *p,
            PointerEvent::Touch(points) => {
                if let Some(first) = points.first() {
                    self.position = *first;
                }
            }
            PointerEvent::Press(p) => {
                self.position = *p;
                return true;
            }
            PointerEvent::Leave => self.position = OFF_CANVAS,
        }
        false
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_off_canvas() {
        let state = PointerState::new();
        assert_eq!(state.position, OFF_CANVAS);
        assert!(!state.is_present());
    }

    #[test]
    fn test_only_first_touch_tracked() {
        let mut state = PointerState::new();
        state.apply(&PointerEvent::Touch(vec![
            Vec2::new(10.0, 20.0),
            Vec2::new(90.0, 90.0),
        ]));
        assert_eq!(state.position, Vec2::new(10.0, 20.0));

        // A touch list with no points leaves the last position alone
        state.apply(&PointerEvent::Touch(Vec::new()));
        assert_eq!(state.position, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_press_and_leave() {
        let mut state = PointerState::new();
        assert!(state.apply(&PointerEvent::Press(Vec2::new(3.0, 4.0))));
        assert!(state.is_present());
        assert!(!state.apply(&PointerEvent::Move(Vec2::new(5.0, 6.0))));
        state.apply(&PointerEvent::Leave);
        assert!(!state.is_present());
    }

    #[test]
    fn test_client_to_local() {
        let local = to_local(Vec2::new(130.0, 48.0), Vec2::new(30.0, 8.0));
        assert_eq!(local, Vec2::new(100.0, 40.0));
    }
}
