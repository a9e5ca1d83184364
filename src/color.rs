//! Progress-driven marker colour: a two-leg linear blend over three anchors.

use crate::gfx::anim::lerp;
use crate::gfx::math::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_color(self) -> Color {
        Color::rgb(self.r, self.g, self.b)
    }
}

/// Colour at progress 0, the source class.
pub const START_ANCHOR: Rgb = Rgb::new(63, 81, 181);
/// Colour at progress 0.5; both legs meet here.
pub const MID_ANCHOR: Rgb = Rgb::new(180, 81, 84);
/// Colour at progress 1, the target class.
pub const END_ANCHOR: Rgb = Rgb::new(245, 0, 87);

const MIDPOINT: f32 = 0.5;

/// Marker colour for `progress` in `[0, 1]`. Inputs are not clamped.
pub fn color_at(progress: f32) -> Rgb {
    if progress < MIDPOINT {
        blend(START_ANCHOR, MID_ANCHOR, progress / MIDPOINT)
    } else {
        blend(MID_ANCHOR, END_ANCHOR, (progress - MIDPOINT) / MIDPOINT)
    }
}

fn blend(from: Rgb, to: Rgb, t: f32) -> Rgb {
    let ch = |a: u8, b: u8| lerp(a as f32, b as f32, t).round() as u8;
    Rgb::new(ch(from.r, to.r), ch(from.g, to.g), ch(from.b, to.b))
}
