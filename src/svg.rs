//! SVG rendering of a [`Scene`], one element per item, tagged with its class.

use crate::scene::{Item, Scene, Shape};
use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

/// A scene formatted as a standalone SVG document.
pub struct Document<'a>(pub &'a Scene);

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scene = self.0;
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(scene.width),
            h = num(scene.height),
        )?;
        writeln!(
            f,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            scene.background.to_css()
        )?;
        for item in &scene.items {
            write_item(f, item)?;
        }
        writeln!(f, "</svg>")
    }
}

fn write_item(f: &mut fmt::Formatter<'_>, item: &Item) -> fmt::Result {
    let class = item.class;
    match &item.shape {
        Shape::Polyline { points, stroke, width } => {
            write!(f, r#"  <path class="{class}" d=""#)?;
            for (i, p) in points.iter().enumerate() {
                let cmd = if i == 0 { 'M' } else { 'L' };
                write!(f, "{cmd}{},{}", num(p.x), num(p.y))?;
            }
            writeln!(
                f,
                r#"" stroke="{}" stroke-width="{}" fill="none"/>"#,
                stroke.to_css(),
                num(*width),
            )
        }
        Shape::Line { from, to, stroke, width, dash } => {
            let dash = dash
                .map(|[on, off]| format!(r#" stroke-dasharray="{},{}""#, num(on), num(off)))
                .unwrap_or_default();
            writeln!(
                f,
                r#"  <path class="{class}" d="M{},{}L{},{}" stroke="{}" stroke-width="{}"{dash} fill="none"/>"#,
                num(from.x),
                num(from.y),
                num(to.x),
                num(to.y),
                stroke.to_css(),
                num(*width),
            )
        }
        Shape::Arrow { pos, angle, length, half_width, fill } => writeln!(
            f,
            r#"  <path class="{class}" d="M0,{}L{},0L0,{}" transform="translate({}, {}) rotate({})" fill="{}"/>"#,
            num(-half_width),
            num(*length),
            num(*half_width),
            num(pos.x),
            num(pos.y),
            num(angle.to_degrees()),
            fill.to_css(),
        ),
        Shape::Circle { center, radius, fill } => writeln!(
            f,
            r#"  <circle class="{class}" cx="{}" cy="{}" r="{}" fill="{}"/>"#,
            num(center.x),
            num(center.y),
            num(*radius),
            fill.to_css(),
        ),
        Shape::Text { pos, text, color, size, bold } => {
            let weight = if *bold { r#" font-weight="bold""# } else { "" };
            writeln!(
                f,
                r#"  <text class="{class}" x="{}" y="{}" fill="{}" font-size="{}px"{weight}>{}</text>"#,
                num(pos.x),
                num(pos.y),
                color.to_css(),
                num(*size),
                escape(text),
            )
        }
    }
}

pub fn render(scene: &Scene) -> String {
    Document(scene).to_string()
}

pub fn write(path: &Path, scene: &Scene) -> Result<()> {
    std::fs::write(path, render(scene)).with_context(|| format!("writing {}", path.display()))
}

/// Two decimals, trailing zeros dropped.
fn num(v: f32) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
