//! Auto-hide policy for the playback controls.
//!
//! Controls hide once `delay` passes without interaction. Any mouse movement
//! brings them back. Horizontal drift of the cursor over the video also
//! brings them back, but only after `cooldown` so that the pointer settling
//! right after a transition does not immediately undo it.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct AutoHide {
    hidden: bool,
    delay: Duration,
    cooldown: Duration,
    /// Cursor drift is ignored until this deadline
    cooldown_until: Instant,
    /// Controls hide once this deadline passes
    hide_at: Instant,
    last_cursor_x: Option<f32>,
}

impl AutoHide {
    pub fn new(delay: Duration, cooldown: Duration, now: Instant) -> Self {
        Self {
            hidden: false,
            delay,
            cooldown,
            cooldown_until: now + cooldown,
            hide_at: now + delay,
            last_cursor_x: None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Show the controls and restart both timers.
    ///
    /// Returns `true` when visibility changed.
    pub fn show(&mut self, now: Instant) -> bool {
        let changed = self.hidden;
        self.hidden = false;
        self.reset(now);
        changed
    }

    /// Hide the controls and restart both timers.
    ///
    /// Returns `true` when visibility changed.
    pub fn hide(&mut self, now: Instant) -> bool {
        let changed = !self.hidden;
        self.hidden = true;
        self.reset(now);
        changed
    }

    pub fn on_mouse_move(&mut self, now: Instant) -> bool {
        self.show(now)
    }

    /// Observe the horizontal cursor position over the video surface.
    ///
    /// Only `x` is compared; vertical stretching of the video moves `y`
    /// without any user input.
    pub fn on_cursor_x(&mut self, x: f32, now: Instant) -> bool {
        let moved = self.last_cursor_x.is_some_and(|last| last != x);
        self.last_cursor_x = Some(x);

        if moved && now > self.cooldown_until {
            self.show(now)
        } else {
            false
        }
    }

    /// Periodic check; hides the controls once the delay has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.hidden && now > self.hide_at {
            log::debug!("No interaction for {:?}, hiding controls", self.delay);
            self.hide(now)
        } else {
            false
        }
    }

    fn reset(&mut self, now: Instant) {
        self.cooldown_until = now + self.cooldown;
        self.hide_at = now + self.delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(5);
    const COOLDOWN: Duration = Duration::from_secs(1);

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_hides_after_delay() {
        let t0 = Instant::now();
        let mut ui = AutoHide::new(DELAY, COOLDOWN, t0);

        assert!(!ui.tick(t0 + secs(4.9)));
        assert!(!ui.is_hidden());

        assert!(ui.tick(t0 + secs(5.1)));
        assert!(ui.is_hidden());

        // Already hidden, nothing to do
        assert!(!ui.tick(t0 + secs(20.0)));
        assert!(ui.is_hidden());
    }

    #[test]
    fn test_mouse_move_shows_and_restarts_delay() {
        let t0 = Instant::now();
        let mut ui = AutoHide::new(DELAY, COOLDOWN, t0);
        ui.tick(t0 + secs(6.0));
        assert!(ui.is_hidden());

        assert!(ui.on_mouse_move(t0 + secs(6.0)));
        assert!(!ui.is_hidden());

        // Delay counts from the interaction, not from start-up
        assert!(!ui.tick(t0 + secs(10.0)));
        assert!(ui.tick(t0 + secs(11.1)));
    }

    #[test]
    fn test_mouse_move_while_visible_postpones_hide() {
        let t0 = Instant::now();
        let mut ui = AutoHide::new(DELAY, COOLDOWN, t0);

        assert!(!ui.on_mouse_move(t0 + secs(4.0)));
        assert!(!ui.tick(t0 + secs(6.0)));
        assert!(ui.tick(t0 + secs(9.5)));
    }

    #[test]
    fn test_cursor_drift_respects_cooldown() {
        let t0 = Instant::now();
        let mut ui = AutoHide::new(DELAY, COOLDOWN, t0);
        ui.on_cursor_x(100.0, t0);

        let hidden_at = t0 + secs(5.5);
        assert!(ui.tick(hidden_at));

        // Within the cooldown after hiding: ignored
        assert!(!ui.on_cursor_x(120.0, hidden_at + secs(0.5)));
        assert!(ui.is_hidden());

        // After the cooldown: shows again
        assert!(ui.on_cursor_x(140.0, hidden_at + secs(1.5)));
        assert!(!ui.is_hidden());
    }

    #[test]
    fn test_still_cursor_does_not_show() {
        let t0 = Instant::now();
        let mut ui = AutoHide::new(DELAY, COOLDOWN, t0);
        ui.on_cursor_x(50.0, t0);
        ui.tick(t0 + secs(6.0));

        assert!(!ui.on_cursor_x(50.0, t0 + secs(8.0)));
        assert!(ui.is_hidden());
    }

    #[test]
    fn test_first_cursor_sample_is_baseline() {
        let t0 = Instant::now();
        let mut ui = AutoHide::new(DELAY, COOLDOWN, t0);
        ui.tick(t0 + secs(6.0));

        assert!(!ui.on_cursor_x(10.0, t0 + secs(8.0)));
        assert!(ui.is_hidden());
    }

    #[test]
    fn test_explicit_show_and_hide() {
        let t0 = Instant::now();
        let mut ui = AutoHide::new(DELAY, COOLDOWN, t0);

        assert!(!ui.show(t0));
        assert!(ui.hide(t0));
        assert!(!ui.hide(t0));
        assert!(ui.show(t0));
    }
}
