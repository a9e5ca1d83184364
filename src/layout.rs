use crate::config::Config;
use crate::gfx::math::{Point, Rect};
use crate::trajectory::{self, Trajectory};
use anyhow::Result;

// Everything placed on the surface is a fraction of its size.
const START: (f32, f32) = (0.2, 0.7);
const END: (f32, f32) = (0.8, 0.3);
const CONTROLS: [(f32, f32); 4] = [(0.4, 0.75), (0.5, 0.4), (0.6, 0.6), (0.7, 0.35)];
const BOUNDARY: [(f32, f32); 2] = [(0.55, 0.1), (0.45, 0.9)];
const BOUNDARY_LABEL: (f32, f32) = (0.57, 0.2);
const SOURCE_LABEL: (f32, f32) = (0.25, 0.15);
const TARGET_LABEL: (f32, f32) = (0.75, 0.15);
const PROGRESS_LABEL: (f32, f32) = (0.5, 0.95);

/// Drawable size derived from the width the host gives us.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn from_container_width(container_width: f32, config: &Config) -> Self {
        let container_width = container_width.max(0.0);
        Self {
            width: container_width.min(config.max_width as f32),
            height: (container_width * config.aspect).min(config.max_height as f32),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Rounded size in whole pixels, for surfaces and buffers.
    pub fn size_px(&self) -> [u32; 2] {
        [self.width.round() as u32, self.height.round() as u32]
    }

    pub fn is_empty(&self) -> bool {
        self.width < 1.0 || self.height < 1.0
    }
}

/// Where the fixed scene elements sit inside a viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub viewport: Viewport,
    pub start: Point,
    pub end: Point,
    pub controls: Vec<Point>,
    pub boundary: [Point; 2],
    pub boundary_label: Point,
    pub source_label: Point,
    pub target_label: Point,
    pub progress_label: Point,
}

impl Layout {
    pub fn new(viewport: Viewport) -> Self {
        let r = viewport.rect();
        let at = |(fx, fy): (f32, f32)| r.at(fx, fy);
        Self {
            viewport,
            start: at(START),
            end: at(END),
            controls: CONTROLS.iter().copied().map(at).collect(),
            boundary: [at(BOUNDARY[0]), at(BOUNDARY[1])],
            boundary_label: at(BOUNDARY_LABEL),
            source_label: at(SOURCE_LABEL),
            target_label: at(TARGET_LABEL),
            progress_label: at(PROGRESS_LABEL),
        }
    }

    pub fn trajectory(&self, sample_count: usize) -> Result<Trajectory> {
        trajectory::generate(self.start, self.end, &self.controls, sample_count)
    }

    /// Which side of the boundary line `p` is on: negative for the source
    /// class side (left), positive for the target side.
    pub fn boundary_side(&self, p: Point) -> f32 {
        let [a, b] = self.boundary;
        let along = b - a;
        let to_p = p - a;
        // The line runs top to bottom, so flip the cross product to make "right" positive.
        -(along.x * to_p.y - along.y * to_p.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_and_height_are_capped() {
        let config = Config::default();
        let wide = Viewport::from_container_width(1920.0, &config);
        assert_eq!(wide, Viewport { width: 800.0, height: 500.0 });

        let narrow = Viewport::from_container_width(500.0, &config);
        assert_eq!(narrow.width, 500.0);
        assert!((narrow.height - 300.0).abs() < 1e-3);

        let mid = Viewport::from_container_width(800.0, &config);
        assert!((mid.height - 480.0).abs() < 1e-3);
    }

    #[test]
    fn zero_width_is_empty() {
        let config = Config::default();
        assert!(Viewport::from_container_width(0.0, &config).is_empty());
        assert!(Viewport::from_container_width(-10.0, &config).is_empty());
    }

    #[test]
    fn layout_scales_with_viewport() {
        let small = Layout::new(Viewport { width: 400.0, height: 240.0 });
        let large = Layout::new(Viewport { width: 800.0, height: 480.0 });
        assert!((large.start.x - small.start.x * 2.0).abs() < 1e-3);
        assert!((large.end.y - small.end.y * 2.0).abs() < 1e-3);
        assert_eq!(large.controls.len(), 4);
    }

    #[test]
    fn trajectory_runs_between_markers() {
        let layout = Layout::new(Viewport { width: 800.0, height: 480.0 });
        let traj = layout.trajectory(300).unwrap();
        assert_eq!(traj.len(), 301);
        assert_eq!(traj.start(), layout.start);
        assert_eq!(traj.end(), layout.end);
    }

    #[test]
    fn start_and_end_are_on_opposite_sides_of_the_boundary() {
        let layout = Layout::new(Viewport { width: 800.0, height: 480.0 });
        assert!(layout.boundary_side(layout.start) < 0.0);
        assert!(layout.boundary_side(layout.end) > 0.0);
    }
}
