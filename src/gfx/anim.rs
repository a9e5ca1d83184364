pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// A fixed-length animation measured against the app clock (seconds).
#[derive(Debug, Clone)]
pub struct Timeline {
    pub start_time: f32,
    pub duration: f32,
    pub current_time: f32,
    running: bool,
}

impl Timeline {
    pub fn new(duration: f32) -> Self {
        Self {
            start_time: 0.0,
            duration,
            current_time: 0.0,
            running: false,
        }
    }

    pub fn start(&mut self, now: f32) {
        self.start_time = now;
        self.current_time = now;
        self.running = true;
    }

    pub fn update(&mut self, now: f32) {
        if !self.running {
            return;
        }
        self.current_time = now;
        if self.is_complete() {
            self.running = false;
        }
    }

    /// True between `start` and the first update that reaches the end.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let elapsed = self.current_time - self.start_time;
        (elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn eased_progress(&self) -> f32 {
        ease_in_out(self.progress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(1.0), 1.0);
    }

    #[test]
    fn timeline_runs_to_completion() {
        let mut tl = Timeline::new(0.3);
        assert!(!tl.is_running());

        tl.start(10.0);
        assert!(tl.is_running());
        assert_eq!(tl.progress(), 0.0);

        tl.update(10.15);
        assert!(tl.is_running());
        assert!((tl.progress() - 0.5).abs() < 1e-3);

        tl.update(11.0);
        assert!(!tl.is_running());
        assert_eq!(tl.progress(), 1.0);
        assert_eq!(tl.eased_progress(), 1.0);
    }

    #[test]
    fn zero_length_timeline_is_complete() {
        let mut tl = Timeline::new(0.0);
        tl.start(1.0);
        tl.update(1.0);
        assert!(tl.is_complete());
        assert!(!tl.is_running());
    }
}
