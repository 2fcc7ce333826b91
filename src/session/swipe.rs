use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug)]
struct Exit {
    direction: SwipeDirection,
    started: Instant,
}

/// Pointer drag on the flash card. A release past the threshold commits a
/// swipe, which then plays an exit animation before it is reported.
#[derive(Clone, Debug)]
pub struct SwipeTracker {
    threshold_cols: u16,
    exit_duration: Duration,
    origin: Option<u16>,
    offset: i32,
    exit: Option<Exit>,
}

impl SwipeTracker {
    pub fn new(threshold_cols: u16, exit_ms: u64) -> Self {
        Self {
            threshold_cols: threshold_cols.max(1),
            exit_duration: Duration::from_millis(exit_ms),
            origin: None,
            offset: 0,
            exit: None,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.exit.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.origin.is_some()
    }

    pub fn begin(&mut self, col: u16) {
        if self.exit.is_none() {
            self.origin = Some(col);
            self.offset = 0;
        }
    }

    pub fn drag(&mut self, col: u16) {
        if let Some(origin) = self.origin {
            self.offset = i32::from(col) - i32::from(origin);
        }
    }

    /// End the drag. Past the threshold the swipe is committed and its exit
    /// animation starts; otherwise the card springs back.
    pub fn release(&mut self, now: Instant) -> Option<SwipeDirection> {
        self.origin.take()?;
        let offset = std::mem::take(&mut self.offset);
        if offset.unsigned_abs() <= u32::from(self.threshold_cols) {
            return None;
        }
        let direction = if offset > 0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        };
        self.commit(direction, now);
        Some(direction)
    }

    /// Start an exit animation without a drag (keyboard swipe).
    pub fn commit(&mut self, direction: SwipeDirection, now: Instant) {
        self.origin = None;
        self.offset = 0;
        self.exit = Some(Exit {
            direction,
            started: now,
        });
    }

    /// Returns the committed direction once the exit animation has run its course.
    pub fn tick(&mut self, now: Instant) -> Option<SwipeDirection> {
        let exit = self.exit?;
        if now.duration_since(exit.started) >= self.exit_duration {
            self.exit = None;
            Some(exit.direction)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.origin = None;
        self.offset = 0;
        self.exit = None;
    }

    /// Horizontal card offset in columns for rendering. During the exit
    /// animation the card slides out by up to `travel` columns.
    pub fn display_offset(&self, now: Instant, travel: u16) -> i32 {
        match self.exit {
            Some(exit) => {
                let total = self.exit_duration.as_millis().max(1) as f64;
                let elapsed = now.duration_since(exit.started).as_millis() as f64;
                let shift = (f64::from(travel) * (elapsed / total).min(1.0)) as i32;
                match exit.direction {
                    SwipeDirection::Right => shift,
                    SwipeDirection::Left => -shift,
                }
            }
            None => self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_drag_springs_back() {
        let mut tracker = SwipeTracker::new(8, 300);
        tracker.begin(40);
        tracker.drag(46);
        assert_eq!(tracker.display_offset(Instant::now(), 80), 6);
        assert_eq!(tracker.release(Instant::now()), None);
        assert!(!tracker.is_animating());
        assert_eq!(tracker.display_offset(Instant::now(), 80), 0);
    }

    #[test]
    fn test_drag_past_threshold_commits_after_animation() {
        let start = Instant::now();
        let mut tracker = SwipeTracker::new(8, 300);
        tracker.begin(40);
        tracker.drag(30);
        assert_eq!(tracker.release(start), Some(SwipeDirection::Left));
        assert!(tracker.is_animating());
        assert_eq!(tracker.tick(start + Duration::from_millis(100)), None);
        assert_eq!(
            tracker.tick(start + Duration::from_millis(300)),
            Some(SwipeDirection::Left)
        );
        assert!(!tracker.is_animating());
        assert_eq!(tracker.tick(start + Duration::from_millis(400)), None);
    }

    #[test]
    fn test_exit_offset_slides_toward_direction() {
        let start = Instant::now();
        let mut tracker = SwipeTracker::new(8, 300);
        tracker.commit(SwipeDirection::Right, start);
        let mid = tracker.display_offset(start + Duration::from_millis(150), 60);
        assert!(mid > 0 && mid <= 30);
        assert_eq!(tracker.display_offset(start + Duration::from_millis(900), 60), 60);
    }

    #[test]
    fn test_drag_ignored_while_animating() {
        let start = Instant::now();
        let mut tracker = SwipeTracker::new(8, 300);
        tracker.commit(SwipeDirection::Right, start);
        tracker.begin(10);
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn test_release_without_drag_is_noop() {
        let mut tracker = SwipeTracker::new(8, 300);
        assert_eq!(tracker.release(Instant::now()), None);
    }
}
