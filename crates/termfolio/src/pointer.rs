#![forbid(unsafe_code)]

//! Click vs drag detection for click-to-focus.
//!
//! A press followed by a release within `threshold` cells on both axes is a
//! click, unless the host reports an active text selection. Anything else is
//! a drag and must not steal focus from the selection.

/// Default movement, in cells, above which a press/release pair is a drag.
pub const DEFAULT_DRAG_THRESHOLD: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Click,
    Drag,
}

#[derive(Debug, Clone)]
pub struct PointerTracker {
    threshold: u16,
    pressed_at: Option<(u16, u16)>,
    selection_active: bool,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}

impl PointerTracker {
    #[must_use]
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold,
            pressed_at: None,
            selection_active: false,
        }
    }

    pub fn press(&mut self, x: u16, y: u16) {
        self.pressed_at = Some((x, y));
    }

    /// Classify the gesture ending at `(x, y)`.
    ///
    /// A release without a recorded press is measured from the origin.
    pub fn release(&mut self, x: u16, y: u16) -> Gesture {
        let (px, py) = self.pressed_at.take().unwrap_or((0, 0));
        let moved = x.abs_diff(px) > self.threshold || y.abs_diff(py) > self.threshold;
        if moved || self.selection_active {
            Gesture::Drag
        } else {
            Gesture::Click
        }
    }

    /// Hosts that track text selection report it here.
    pub fn set_selection_active(&mut self, active: bool) {
        self.selection_active = active;
    }

    #[must_use]
    pub fn selection_active(&self) -> bool {
        self.selection_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_moves_are_clicks() {
        let mut p = PointerTracker::default();
        p.press(10, 5);
        assert_eq!(p.release(13, 2), Gesture::Click);
    }

    #[test]
    fn moves_past_threshold_are_drags() {
        let mut p = PointerTracker::default();
        p.press(10, 5);
        assert_eq!(p.release(14, 5), Gesture::Drag);
        p.press(10, 5);
        assert_eq!(p.release(10, 9), Gesture::Drag);
    }

    #[test]
    fn active_selection_makes_any_release_a_drag() {
        let mut p = PointerTracker::default();
        p.set_selection_active(true);
        p.press(1, 1);
        assert_eq!(p.release(1, 1), Gesture::Drag);
        p.set_selection_active(false);
        p.press(1, 1);
        assert_eq!(p.release(1, 1), Gesture::Click);
    }

    #[test]
    fn trackers_do_not_share_state() {
        let mut a = PointerTracker::default();
        let mut b = PointerTracker::default();
        a.press(0, 0);
        b.press(50, 20);
        assert_eq!(a.release(1, 1), Gesture::Click);
        assert_eq!(b.release(50, 20), Gesture::Click);
    }

    #[test]
    fn release_without_press_measures_from_origin() {
        let mut p = PointerTracker::default();
        assert_eq!(p.release(2, 2), Gesture::Click);
        assert_eq!(p.release(30, 2), Gesture::Drag);
    }
}
