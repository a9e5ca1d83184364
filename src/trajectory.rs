//! Sampled piecewise-quadratic path from a start point to an end point.
//!
//! The control points split the parameter range `[0, 1]` into equal
//! segments, each blended as a quadratic Bezier over three neighbouring
//! anchors. Sampling is uniform in the parameter, not in arc length.

use crate::gfx::math::Point;
use anyhow::{bail, Result};

pub const DEFAULT_SAMPLE_COUNT: usize = 300;

/// Number of direction arrows drawn along a visible path, plus one.
const ARROW_SLOTS: usize = 8;
/// How far ahead (in samples) an arrow looks to find its heading.
const ARROW_LOOKAHEAD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub pos: Point,
    /// Parameter value this sample was taken at, `i / sample_count`.
    pub progress: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub pos: Point,
    /// Heading in radians.
    pub angle: f32,
}

/// An immutable, non-empty run of samples. Regenerate it rather than edit it.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    samples: Vec<Sample>,
}

/// Samples `sample_count + 1` points from `start` to `end`, steered by `controls`.
///
/// The first sample is `start` and the last is `end`, bit for bit.
pub fn generate(start: Point, end: Point, controls: &[Point], sample_count: usize) -> Result<Trajectory> {
    if sample_count == 0 {
        bail!("trajectory needs at least one sample interval");
    }
    if controls.is_empty() {
        bail!("trajectory needs at least one control point");
    }

    let samples = (0..=sample_count)
        .map(|i| {
            let t = i as f32 / sample_count as f32;
            Sample {
                pos: curve_point(t, start, end, controls),
                progress: t,
            }
        })
        .collect();

    Ok(Trajectory { samples })
}

/// Evaluates the curve at parameter `t`. `controls` must not be empty.
pub fn curve_point(t: f32, start: Point, end: Point, controls: &[Point]) -> Point {
    if t <= 0.0 {
        return start;
    }
    if t >= 1.0 {
        return end;
    }

    let n = controls.len();
    let scaled = t * n as f32;
    let segment = (scaled.floor() as usize).min(n - 1);
    let local = scaled - segment as f32;

    let (p0, p1, p2) = if segment == 0 {
        (start, controls[0], controls.get(1).copied().unwrap_or(end))
    } else if segment == n - 1 {
        (controls[segment - 1], controls[segment], end)
    } else {
        (controls[segment - 1], controls[segment], controls[segment + 1])
    };

    quadratic(p0, p1, p2, local)
}

fn quadratic(p0: Point, p1: Point, p2: Point, t: f32) -> Point {
    let u = 1.0 - t;
    let a = u * u;
    let b = 2.0 * u * t;
    let c = t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x,
        a * p0.y + b * p1.y + c * p2.y,
    )
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.samples.iter().map(|s| s.pos)
    }

    pub fn start(&self) -> Point {
        self.samples[0].pos
    }

    pub fn end(&self) -> Point {
        self.samples[self.samples.len() - 1].pos
    }

    /// Index of the sample shown at `progress`. Never out of bounds, whatever the input.
    pub fn index_at(&self, progress: f32) -> usize {
        let last = self.samples.len() - 1;
        let raw = (progress * self.samples.len() as f32).floor();
        if raw.is_nan() || raw <= 0.0 {
            0
        } else {
            (raw as usize).min(last)
        }
    }

    pub fn point_at(&self, progress: f32) -> Point {
        self.samples[self.index_at(progress)].pos
    }

    /// Evenly spaced heading markers, as drawn over a visible path.
    pub fn arrows(&self) -> Vec<Arrow> {
        let interval = self.samples.len() / ARROW_SLOTS;
        if interval == 0 {
            return Vec::new();
        }
        let last = self.samples.len() - 1;
        (1..ARROW_SLOTS)
            .map(|i| {
                let index = i * interval;
                let here = self.samples[index].pos;
                let ahead = self.samples[(index + ARROW_LOOKAHEAD).min(last)].pos;
                Arrow {
                    pos: here,
                    angle: (ahead - here).angle(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    fn demo() -> Trajectory {
        let controls = [
            Point::new(320.0, 360.0),
            Point::new(400.0, 192.0),
            Point::new(480.0, 288.0),
            Point::new(560.0, 168.0),
        ];
        generate(
            Point::new(160.0, 336.0),
            Point::new(640.0, 144.0),
            &controls,
            DEFAULT_SAMPLE_COUNT,
        )
        .unwrap()
    }

    #[test]
    fn endpoints_are_exact() {
        let start = Point::new(0.1, 0.7);
        let end = Point::new(0.3, 0.9);
        for n in [1, 2, 3, 7, 300] {
            for count in 1..5 {
                let controls: Vec<Point> =
                    (0..count).map(|i| Point::new(i as f32 * 0.37, 1.0 - i as f32 * 0.11)).collect();
                let traj = generate(start, end, &controls, n).unwrap();
                assert_eq!(traj.len(), n + 1);
                assert_eq!(traj.start(), start);
                assert_eq!(traj.end(), end);
                assert_eq!(traj.samples()[0].progress, 0.0);
                assert_eq!(traj.samples()[n].progress, 1.0);
            }
        }
    }

    #[test]
    fn two_controls_two_samples() {
        let traj = generate(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            &[Point::new(5.0, 0.0), Point::new(5.0, 10.0)],
            2,
        )
        .unwrap();
        assert_eq!(traj.len(), 3);
        assert_eq!(traj.start(), Point::new(0.0, 0.0));
        // t = 0.5 lands exactly on the start of the second segment.
        assert!(close(traj.samples()[1].pos, Point::new(5.0, 0.0)));
        assert_eq!(traj.end(), Point::new(10.0, 10.0));
    }

    #[test]
    fn first_segment_blends_start_and_first_controls() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(10.0, 10.0);
        let controls = [Point::new(5.0, 0.0), Point::new(5.0, 10.0)];
        // t = 0.25 -> segment 0, local 0.5
        let p = curve_point(0.25, start, end, &controls);
        assert!(close(p, Point::new(3.75, 2.5)));
    }

    #[test]
    fn single_control_is_one_quadratic() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(2.0, 0.0);
        let control = [Point::new(1.0, 2.0)];
        let p = curve_point(0.5, start, end, &control);
        assert!(close(p, Point::new(1.0, 1.0)));
    }

    #[test]
    fn interior_segment_uses_neighbouring_controls() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(0.0, 0.0);
        let controls = [Point::new(1.0, 0.0), Point::new(2.0, 0.0), Point::new(3.0, 0.0)];
        // t = 0.5 -> segment 1, local 0.5: (c0 + 2 c1 + c2) / 4
        let p = curve_point(0.5, start, end, &controls);
        assert!(close(p, Point::new(2.0, 0.0)));
    }

    #[test]
    fn preconditions_are_reported() {
        let p = Point::new(0.0, 0.0);
        assert!(generate(p, p, &[p], 0).is_err());
        assert!(generate(p, p, &[], 10).is_err());
    }

    #[test]
    fn index_lookup_is_clamped() {
        let traj = demo();
        let last = traj.len() - 1;
        assert_eq!(traj.index_at(0.0), 0);
        assert_eq!(traj.index_at(1.0), last);
        assert_eq!(traj.index_at(0.999_999), last);
        assert_eq!(traj.index_at(-0.5), 0);
        assert_eq!(traj.index_at(7.0), last);
        assert_eq!(traj.index_at(f32::NAN), 0);
        assert_eq!(traj.point_at(0.0), traj.start());
        assert_eq!(traj.point_at(1.0), traj.end());

        let mut p = 0.0;
        while p <= 1.0 {
            assert!(traj.index_at(p) <= last);
            p += 0.001;
        }
    }

    #[test]
    fn arrows_follow_the_path() {
        let traj = demo();
        let arrows = traj.arrows();
        assert_eq!(arrows.len(), 7);
        let interval = traj.len() / 8;
        for (i, arrow) in arrows.iter().enumerate() {
            assert_eq!(arrow.pos, traj.samples()[(i + 1) * interval].pos);
        }
        assert!(arrows.iter().all(|a| a.angle.is_finite()));
        // The first arrow sits inside the first segment, which runs rightward.
        assert!(arrows[0].angle.cos() > 0.0);
    }

    #[test]
    fn short_paths_have_no_arrows() {
        let p = Point::new(0.0, 0.0);
        let traj = generate(p, Point::new(1.0, 1.0), &[p], 3).unwrap();
        assert!(traj.arrows().is_empty());
    }
}
