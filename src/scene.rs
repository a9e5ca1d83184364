//! Backend-neutral display list for one frame.
//!
//! Both the GL overlay and the SVG exporter draw from the same [`Scene`], so
//! what is shown depends only on the layout, the current trajectory, the
//! driver's display state and the host's visibility switches.

use crate::config::Theme;
use crate::driver::{Controls, DisplayState};
use crate::gfx::font;
use crate::gfx::math::{Color, Point};
use crate::layout::Layout;
use crate::trajectory::Trajectory;
use anyhow::{anyhow, Result};

pub const BOUNDARY_LABEL: &str = "Decision Boundary";
pub const SOURCE_LABEL: &str = "Class Ci";
pub const TARGET_LABEL: &str = "Class Ct";
pub const START_LABEL: &str = "x₀";
pub const END_LABEL: &str = "x₀ + δ";

const ENDPOINT_RADIUS: f32 = 8.0;
const MARKER_RADIUS: f32 = 10.0;
const BOUNDARY_WIDTH: f32 = 3.0;
const BOUNDARY_DASH: [f32; 2] = [10.0, 6.0];
const TRAJECTORY_WIDTH: f32 = 2.0;
const ARROW_LENGTH: f32 = 10.0;
const ARROW_HALF_WIDTH: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Polyline {
        points: Vec<Point>,
        stroke: Color,
        width: f32,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Color,
        width: f32,
        dash: Option<[f32; 2]>,
    },
    /// Filled triangle with its base centred on `pos`, pointing along `angle` (radians).
    Arrow {
        pos: Point,
        angle: f32,
        length: f32,
        half_width: f32,
        fill: Color,
    },
    Circle {
        center: Point,
        radius: f32,
        fill: Color,
    },
    Text {
        pos: Point,
        text: String,
        color: Color,
        size: f32,
        bold: bool,
    },
}

/// Shape tagged with the role it plays, for styling and lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub class: &'static str,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub background: Color,
    pub items: Vec<Item>,
}

impl Scene {
    fn push(&mut self, class: &'static str, shape: Shape) {
        self.items.push(Item { class, shape });
    }

    pub fn by_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Shape> + 'a {
        self.items.iter().filter(move |i| i.class == class).map(|i| &i.shape)
    }

    pub fn has(&self, class: &str) -> bool {
        self.items.iter().any(|i| i.class == class)
    }
}

/// Theme colours, parsed once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub source_class: Color,
    pub target_class: Color,
    pub boundary: Color,
    pub trajectory: Color,
}

impl Palette {
    pub fn from_theme(theme: &Theme) -> Result<Self> {
        let parse = |name: &str, value: &str| {
            Color::from_hex(value).ok_or_else(|| anyhow!("theme.{name}: bad colour {value:?}"))
        };
        Ok(Self {
            background: parse("background", &theme.background)?,
            source_class: parse("source_class", &theme.source_class)?,
            target_class: parse("target_class", &theme.target_class)?,
            boundary: parse("boundary", &theme.boundary)?,
            trajectory: parse("trajectory", &theme.trajectory)?,
        })
    }

    fn arrow(&self) -> Color {
        self.trajectory.with_alpha((self.trajectory.a * 1.5).min(1.0))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::rgb(255, 255, 255),
            source_class: Color::rgb(63, 81, 181),
            target_class: Color::rgb(245, 0, 87),
            boundary: Color::rgb(255, 152, 0),
            trajectory: Color::rgba(0, 0, 0, 51),
        }
    }
}

/// Everything one frame needs besides the layout.
pub struct Frame<'a> {
    pub trajectory: Option<&'a Trajectory>,
    pub marker: Option<DisplayState>,
    pub controls: Controls,
    /// Opacity of the boundary line, for its fade-in.
    pub boundary_opacity: f32,
}

pub fn build(layout: &Layout, frame: &Frame<'_>, palette: &Palette) -> Scene {
    let mut scene = Scene {
        width: layout.viewport.width,
        height: layout.viewport.height,
        background: palette.background,
        items: Vec::new(),
    };

    if frame.controls.show_decision_boundary && frame.boundary_opacity > 0.0 {
        let color = palette.boundary.with_alpha(palette.boundary.a * frame.boundary_opacity);
        scene.push(
            "decision-boundary",
            Shape::Line {
                from: layout.boundary[0],
                to: layout.boundary[1],
                stroke: color,
                width: BOUNDARY_WIDTH,
                dash: Some(BOUNDARY_DASH),
            },
        );
        scene.push(
            "boundary-label",
            Shape::Text {
                pos: layout.boundary_label,
                text: BOUNDARY_LABEL.to_string(),
                color,
                size: 14.0,
                bold: true,
            },
        );
    }

    scene.push(
        "class-label",
        Shape::Text {
            pos: layout.source_label,
            text: SOURCE_LABEL.to_string(),
            color: palette.source_class,
            size: 18.0,
            bold: true,
        },
    );
    scene.push(
        "class-label",
        Shape::Text {
            pos: layout.target_label,
            text: TARGET_LABEL.to_string(),
            color: palette.target_class,
            size: 18.0,
            bold: true,
        },
    );

    let Some(trajectory) = frame.trajectory else {
        return scene;
    };

    if frame.controls.show_trajectory {
        scene.push(
            "trajectory-path",
            Shape::Polyline {
                points: trajectory.points().collect(),
                stroke: palette.trajectory,
                width: TRAJECTORY_WIDTH,
            },
        );
        for arrow in trajectory.arrows() {
            scene.push(
                "trajectory-arrow",
                Shape::Arrow {
                    pos: arrow.pos,
                    angle: arrow.angle,
                    length: ARROW_LENGTH,
                    half_width: ARROW_HALF_WIDTH,
                    fill: palette.arrow(),
                },
            );
        }
    }

    let start = trajectory.start();
    let end = trajectory.end();
    scene.push(
        "start-point",
        Shape::Circle {
            center: start,
            radius: ENDPOINT_RADIUS,
            fill: palette.source_class,
        },
    );
    scene.push(
        "point-label",
        Shape::Text {
            pos: Point::new(start.x - 5.0, start.y - 15.0),
            text: START_LABEL.to_string(),
            color: palette.source_class,
            size: 16.0,
            bold: true,
        },
    );
    scene.push(
        "end-point",
        Shape::Circle {
            center: end,
            radius: ENDPOINT_RADIUS,
            fill: palette.target_class,
        },
    );
    scene.push(
        "point-label",
        Shape::Text {
            pos: Point::new(end.x - 25.0, end.y - 15.0),
            text: END_LABEL.to_string(),
            color: palette.target_class,
            size: 16.0,
            bold: true,
        },
    );

    if let Some(marker) = frame.marker {
        scene.push(
            "data-point",
            Shape::Circle {
                center: marker.position,
                radius: MARKER_RADIUS,
                fill: marker.color.to_color(),
            },
        );
        if frame.controls.running {
            let text = progress_label(marker.progress);
            let centred = layout.progress_label.x - font::text_width(&text, 14.0) / 2.0;
            scene.push(
                "progress-label",
                Shape::Text {
                    pos: Point::new(centred, layout.progress_label.y),
                    text,
                    color: Color::rgb(66, 66, 66),
                    size: 14.0,
                    bold: false,
                },
            );
        }
    }

    scene
}

pub fn progress_label(progress: f32) -> String {
    format!("Progress: {}%", (progress * 100.0).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{color_at, END_ANCHOR};
    use crate::config::Config;
    use crate::layout::Viewport;

    fn controls(running: bool, path: bool, boundary: bool) -> Controls {
        Controls {
            running,
            speed: 5,
            show_trajectory: path,
            show_decision_boundary: boundary,
        }
    }

    fn layout() -> Layout {
        Layout::new(Viewport { width: 800.0, height: 480.0 })
    }

    #[test]
    fn full_scene_has_every_element() {
        let layout = layout();
        let traj = layout.trajectory(300).unwrap();
        let marker = DisplayState {
            position: traj.point_at(0.4),
            color: color_at(0.4),
            progress: 0.4,
        };
        let frame = Frame {
            trajectory: Some(&traj),
            marker: Some(marker),
            controls: controls(true, true, true),
            boundary_opacity: 1.0,
        };
        let scene = build(&layout, &frame, &Palette::default());

        for class in [
            "decision-boundary",
            "boundary-label",
            "class-label",
            "trajectory-path",
            "trajectory-arrow",
            "start-point",
            "end-point",
            "point-label",
            "data-point",
            "progress-label",
        ] {
            assert!(scene.has(class), "missing {class}");
        }
        assert_eq!(scene.by_class("trajectory-arrow").count(), 7);
        assert_eq!(scene.by_class("class-label").count(), 2);

        let Some(Shape::Text { text, .. }) = scene.by_class("progress-label").next() else {
            panic!("progress label is not text");
        };
        assert_eq!(text, "Progress: 40%");

        let Some(Shape::Circle { center, fill, .. }) = scene.by_class("data-point").next() else {
            panic!("marker is not a circle");
        };
        assert_eq!(*center, marker.position);
        assert_eq!(*fill, marker.color.to_color());
    }

    #[test]
    fn visibility_switches_hide_layers() {
        let layout = layout();
        let traj = layout.trajectory(300).unwrap();
        let frame = Frame {
            trajectory: Some(&traj),
            marker: None,
            controls: controls(false, false, false),
            boundary_opacity: 1.0,
        };
        let scene = build(&layout, &frame, &Palette::default());
        assert!(!scene.has("decision-boundary"));
        assert!(!scene.has("boundary-label"));
        assert!(!scene.has("trajectory-path"));
        assert!(!scene.has("trajectory-arrow"));
        assert!(scene.has("start-point"));
        assert!(scene.has("end-point"));
    }

    #[test]
    fn progress_label_only_while_running() {
        let layout = layout();
        let traj = layout.trajectory(300).unwrap();
        let marker = DisplayState {
            position: traj.end(),
            color: END_ANCHOR,
            progress: 1.0,
        };
        let frame = Frame {
            trajectory: Some(&traj),
            marker: Some(marker),
            controls: controls(false, true, true),
            boundary_opacity: 1.0,
        };
        let scene = build(&layout, &frame, &Palette::default());
        assert!(scene.has("data-point"));
        assert!(!scene.has("progress-label"));
    }

    #[test]
    fn without_trajectory_only_static_labels_render() {
        let layout = layout();
        let frame = Frame {
            trajectory: None,
            marker: None,
            controls: controls(true, true, true),
            boundary_opacity: 1.0,
        };
        let scene = build(&layout, &frame, &Palette::default());
        assert!(scene.has("class-label"));
        assert!(scene.has("decision-boundary"));
        assert!(!scene.has("trajectory-path"));
        assert!(!scene.has("start-point"));
        assert!(!scene.has("data-point"));
    }

    #[test]
    fn boundary_fades_with_opacity() {
        let layout = layout();
        let mut frame = Frame {
            trajectory: None,
            marker: None,
            controls: controls(false, true, true),
            boundary_opacity: 0.0,
        };
        assert!(!build(&layout, &frame, &Palette::default()).has("decision-boundary"));

        frame.boundary_opacity = 0.5;
        let scene = build(&layout, &frame, &Palette::default());
        let Some(Shape::Line { stroke, dash, .. }) = scene.by_class("decision-boundary").next() else {
            panic!("boundary is not a line");
        };
        assert!((stroke.a - 0.5).abs() < 1e-6);
        assert_eq!(*dash, Some([10.0, 6.0]));
    }

    #[test]
    fn default_theme_matches_default_palette() {
        let palette = Palette::from_theme(&Config::default().theme).unwrap();
        assert_eq!(palette, Palette::default());
    }

    #[test]
    fn bad_theme_colour_is_reported() {
        let mut theme = Config::default().theme;
        theme.boundary = "orange".to_string();
        let err = Palette::from_theme(&theme).unwrap_err();
        assert!(err.to_string().contains("theme.boundary"));
    }

    #[test]
    fn progress_label_rounds() {
        assert_eq!(progress_label(0.0), "Progress: 0%");
        assert_eq!(progress_label(0.126), "Progress: 13%");
        assert_eq!(progress_label(0.999), "Progress: 100%");
    }
}
