//! Per-frame progress state machine for the moving marker.
//!
//! The driver owns nothing but progress and the timestamp of the last frame.
//! Everything the host owns (run flag, speed) arrives as [`Controls`] with
//! each frame, and the trajectory is borrowed for the duration of the frame
//! so the index lookup and the length it is clamped to come from the same
//! snapshot.

use crate::color::{color_at, Rgb};
use crate::config::clamp_speed;
use crate::gfx::math::Point;
use crate::trajectory::Trajectory;
use log::{debug, info};

/// Host-owned switches, read fresh on every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub running: bool,
    /// Multiplier in `1..=10`.
    pub speed: u8,
    pub show_trajectory: bool,
    pub show_decision_boundary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
}

/// What the moving marker looks like this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayState {
    pub position: Point,
    pub color: Rgb,
    pub progress: f32,
}

#[derive(Debug, Clone)]
pub struct AnimationDriver {
    state: DriverState,
    progress: f32,
    last_timestamp_ms: Option<f64>,
    base_duration_ms: f32,
    laps: u64,
}

impl AnimationDriver {
    pub fn new(base_duration_ms: f32) -> Self {
        Self {
            state: DriverState::Idle,
            progress: 0.0,
            last_timestamp_ms: None,
            base_duration_ms,
            laps: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Completed traversals since creation.
    pub fn laps(&self) -> u64 {
        self.laps
    }

    /// Milliseconds for one traversal at `speed`.
    pub fn traversal_ms(&self, speed: u8) -> f32 {
        self.base_duration_ms / clamp_speed(speed) as f32
    }

    /// Switches between idle and running. Progress is kept either way.
    pub fn set_running(&mut self, running: bool) {
        let next = if running { DriverState::Running } else { DriverState::Idle };
        if next == self.state {
            return;
        }
        info!("animation {:?} -> {:?} at progress {:.3}", self.state, next, self.progress);
        self.state = next;
        // A fresh run measures its first frame from itself.
        self.last_timestamp_ms = None;
    }

    /// Advances by the time since the previous frame and returns the marker to draw.
    ///
    /// Returns `None` while there is no trajectory yet. While idle the progress
    /// is left alone and the marker is reported where it already is.
    pub fn frame(
        &mut self,
        now_ms: f64,
        controls: &Controls,
        trajectory: Option<&Trajectory>,
    ) -> Option<DisplayState> {
        self.set_running(controls.running);

        if self.is_running() {
            let elapsed = match self.last_timestamp_ms {
                Some(last) => (now_ms - last).max(0.0),
                None => 0.0,
            };
            self.last_timestamp_ms = Some(now_ms);
            self.advance(elapsed as f32, controls.speed);
        }

        trajectory.map(|t| self.display(t))
    }

    /// Moves progress forward by `elapsed_ms`, wrapping to zero at the end.
    pub fn advance(&mut self, elapsed_ms: f32, speed: u8) {
        let delta = elapsed_ms / self.traversal_ms(speed);
        let next = self.progress + delta;
        if next >= 1.0 {
            self.laps += 1;
            debug!("lap {} complete, restarting", self.laps);
            self.progress = 0.0;
        } else {
            self.progress = next;
        }
    }

    /// Jumps to `progress`, kept inside `[0, 1)`.
    pub fn seek(&mut self, progress: f32) {
        self.progress = if progress.is_finite() && progress < 1.0 {
            progress.max(0.0)
        } else {
            0.0
        };
        self.last_timestamp_ms = None;
    }

    pub fn display(&self, trajectory: &Trajectory) -> DisplayState {
        DisplayState {
            position: trajectory.point_at(self.progress),
            color: color_at(self.progress),
            progress: self.progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{MID_ANCHOR, START_ANCHOR};
    use crate::trajectory::generate;

    fn running(speed: u8) -> Controls {
        Controls {
            running: true,
            speed,
            show_trajectory: true,
            show_decision_boundary: true,
        }
    }

    fn paused(speed: u8) -> Controls {
        Controls {
            running: false,
            ..running(speed)
        }
    }

    fn line() -> Trajectory {
        generate(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            &[Point::new(25.0, 0.0), Point::new(75.0, 0.0)],
            100,
        )
        .unwrap()
    }

    #[test]
    fn starts_idle_at_zero() {
        let driver = AnimationDriver::new(11000.0);
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(driver.progress(), 0.0);
    }

    #[test]
    fn first_running_frame_does_not_move() {
        let traj = line();
        let mut driver = AnimationDriver::new(11000.0);
        let shown = driver.frame(5_000.0, &running(5), Some(&traj)).unwrap();
        assert_eq!(driver.progress(), 0.0);
        assert_eq!(shown.position, traj.start());
        assert_eq!(shown.color, START_ANCHOR);
    }

    #[test]
    fn progress_follows_elapsed_time_and_speed() {
        let mut driver = AnimationDriver::new(11000.0);
        let c = running(2);
        driver.frame(0.0, &c, None);
        driver.frame(1100.0, &c, None);
        // 1100 / (11000 / 2)
        assert!((driver.progress() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn top_speed_traversal_takes_1100ms() {
        let mut driver = AnimationDriver::new(11000.0);
        assert!((driver.traversal_ms(10) - 1100.0).abs() < 1e-3);

        let c = running(10);
        driver.frame(0.0, &c, None);
        driver.frame(1099.0, &c, None);
        assert!(driver.progress() > 0.99);
        assert_eq!(driver.laps(), 0);
        driver.frame(1101.0, &c, None);
        assert_eq!(driver.progress(), 0.0);
        assert_eq!(driver.laps(), 1);
    }

    #[test]
    fn monotonic_until_wrap() {
        let mut driver = AnimationDriver::new(11000.0);
        let c = running(5);
        let step = 16.0;
        let mut now = 0.0;
        driver.frame(now, &c, None);
        let mut previous = driver.progress();
        let mut wrapped = false;
        for _ in 0..1000 {
            now += step;
            driver.frame(now, &c, None);
            if driver.progress() < previous {
                assert_eq!(driver.progress(), 0.0);
                wrapped = true;
                break;
            }
            previous = driver.progress();
        }
        assert!(wrapped);
        assert!(previous < 1.0);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let traj = line();
        let mut driver = AnimationDriver::new(1000.0);
        driver.frame(0.0, &running(1), Some(&traj));
        driver.frame(250.0, &running(1), Some(&traj));
        assert!((driver.progress() - 0.25).abs() < 1e-5);

        let held = driver.frame(900.0, &paused(1), Some(&traj)).unwrap();
        assert_eq!(driver.state(), DriverState::Idle);
        assert!((held.progress - 0.25).abs() < 1e-5);
        driver.frame(5_000.0, &paused(1), Some(&traj));
        assert!((driver.progress() - 0.25).abs() < 1e-5);

        // The paused stretch is not counted on resume.
        driver.frame(10_000.0, &running(1), Some(&traj));
        assert!((driver.progress() - 0.25).abs() < 1e-5);
        driver.frame(10_250.0, &running(1), Some(&traj));
        assert!((driver.progress() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn display_tracks_current_progress() {
        let traj = line();
        let mut driver = AnimationDriver::new(1000.0);
        driver.frame(0.0, &running(1), Some(&traj));
        let shown = driver.frame(500.0, &running(1), Some(&traj)).unwrap();
        assert_eq!(shown.position, traj.point_at(driver.progress()));
        assert_eq!(shown.color, MID_ANCHOR);
    }

    #[test]
    fn no_trajectory_renders_nothing() {
        let mut driver = AnimationDriver::new(1000.0);
        assert!(driver.frame(0.0, &running(1), None).is_none());
        assert!(driver.frame(100.0, &running(1), None).is_none());
        // Progress still moves; the marker just has nowhere to be drawn.
        assert!(driver.progress() > 0.0);
    }

    #[test]
    fn clock_going_backwards_is_ignored() {
        let mut driver = AnimationDriver::new(1000.0);
        driver.frame(500.0, &running(1), None);
        driver.frame(400.0, &running(1), None);
        assert_eq!(driver.progress(), 0.0);
    }

    #[test]
    fn seek_stays_in_range() {
        let mut driver = AnimationDriver::new(1000.0);
        driver.seek(0.4);
        assert_eq!(driver.progress(), 0.4);
        driver.seek(-3.0);
        assert_eq!(driver.progress(), 0.0);
        driver.seek(1.0);
        assert_eq!(driver.progress(), 0.0);
        driver.seek(f32::NAN);
        assert_eq!(driver.progress(), 0.0);
    }

    #[test]
    fn speed_is_clamped() {
        let driver = AnimationDriver::new(11000.0);
        assert_eq!(driver.traversal_ms(0), 11000.0);
        assert!((driver.traversal_ms(200) - 1100.0).abs() < 1e-3);
    }
}
