use super::font;
use super::math::{Color, Rect, Vec2};
use crate::scene::{Scene, Shape};
use anyhow::{anyhow, Result};
use glow::HasContext;

const DISC_SEGMENTS: usize = 24;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
}

impl From<Vec2> for Vertex {
    fn from(v: Vec2) -> Self {
        Vertex { pos: [v.x, v.y] }
    }
}

/// Batches flat-coloured triangles; one draw call per shape.
pub struct DrawContext {
    gl: glow::Context,
    program: glow::Program,
    vbo: glow::Buffer,
    vertices: Vec<Vertex>,
    viewport: [f32; 2],

    a_pos: Option<u32>,
    u_viewport: Option<glow::UniformLocation>,
    u_color: Option<glow::UniformLocation>,
}

impl DrawContext {
    pub fn new(gl: glow::Context, program: glow::Program) -> Result<Self> {
        let vbo = unsafe {
            gl.create_buffer()
                .map_err(|e| anyhow!("Failed to create buffer: {}", e))?
        };

        let a_pos = unsafe { gl.get_attrib_location(program, "aPos") };
        let u_viewport = unsafe { gl.get_uniform_location(program, "uViewport") };
        let u_color = unsafe { gl.get_uniform_location(program, "uColor") };

        Ok(Self {
            gl,
            program,
            vbo,
            vertices: Vec::with_capacity(4096),
            viewport: [800.0, 480.0],
            a_pos,
            u_viewport,
            u_color,
        })
    }

    pub fn begin(&mut self, viewport_px: [f32; 2], clear: Color) {
        self.viewport = viewport_px;
        self.vertices.clear();

        unsafe {
            self.gl.viewport(0, 0, viewport_px[0] as i32, viewport_px[1] as i32);
            self.gl.clear_color(clear.r, clear.g, clear.b, clear.a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);

            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);

            self.gl.use_program(Some(self.program));
            if let Some(loc) = &self.u_viewport {
                self.gl.uniform_2_f32(Some(loc), viewport_px[0], viewport_px[1]);
            }
        }
    }

    /// Draws a scene authored in `scene.width x scene.height` units, scaled to the viewport.
    pub fn scene(&mut self, scene: &Scene) {
        let sx = if scene.width > 0.0 { self.viewport[0] / scene.width } else { 1.0 };
        let sy = if scene.height > 0.0 { self.viewport[1] / scene.height } else { 1.0 };
        let scale = sx.min(sy);
        let p = |v: Vec2| v * scale;

        for item in &scene.items {
            match &item.shape {
                Shape::Polyline { points, stroke, width } => {
                    let pts: Vec<Vec2> = points.iter().map(|v| p(*v)).collect();
                    self.polyline(&pts, width * scale, *stroke);
                }
                Shape::Line { from, to, stroke, width, dash } => match dash {
                    Some([on, off]) => {
                        self.dashed_line(p(*from), p(*to), width * scale, on * scale, off * scale, *stroke)
                    }
                    None => {
                        self.line(p(*from), p(*to), width * scale);
                        self.flush_batch(*stroke);
                    }
                },
                Shape::Arrow { pos, angle, length, half_width, fill } => {
                    let dir = Vec2::new(angle.cos(), angle.sin());
                    let side = dir.perp() * (half_width * scale);
                    let base = p(*pos);
                    self.triangle(base - side, base + dir * (length * scale), base + side);
                    self.flush_batch(*fill);
                }
                Shape::Circle { center, radius, fill } => {
                    self.disc(p(*center), radius * scale, *fill);
                }
                Shape::Text { pos, text, color, size, bold } => {
                    let origin = p(*pos);
                    for r in font::rasterize(text, origin.x, origin.y, size * scale, *bold) {
                        self.push_rect(r);
                    }
                    self.flush_batch(*color);
                }
            }
        }
    }

    fn disc(&mut self, center: Vec2, radius: f32, color: Color) {
        let step = std::f32::consts::TAU / DISC_SEGMENTS as f32;
        for i in 0..DISC_SEGMENTS {
            let a0 = i as f32 * step;
            let a1 = a0 + step;
            self.triangle(
                center,
                center + Vec2::new(a0.cos(), a0.sin()) * radius,
                center + Vec2::new(a1.cos(), a1.sin()) * radius,
            );
        }
        self.flush_batch(color);
    }

    fn polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width);
        }
        self.flush_batch(color);
    }

    fn dashed_line(&mut self, from: Vec2, to: Vec2, width: f32, on: f32, off: f32, color: Color) {
        let total = from.distance(to);
        let period = on + off;
        if total <= 0.0 || period <= 0.0 {
            return;
        }
        let dir = (to - from).normalized();
        let mut at = 0.0;
        while at < total {
            let end = (at + on).min(total);
            self.line(from + dir * at, from + dir * end, width);
            at += period;
        }
        self.flush_batch(color);
    }

    /// Queues a thick segment; the caller flushes.
    fn line(&mut self, a: Vec2, b: Vec2, width: f32) {
        let n = (b - a).normalized().perp() * (width * 0.5);
        self.quad(a - n, a + n, b + n, b - n);
    }

    fn push_rect(&mut self, r: Rect) {
        let (x, y) = (r.x, r.y);
        let (x2, y2) = (r.x + r.width, r.y + r.height);
        self.quad(
            Vec2::new(x, y),
            Vec2::new(x2, y),
            Vec2::new(x2, y2),
            Vec2::new(x, y2),
        );
    }

    fn quad(&mut self, a: Vec2, b: Vec2, c: Vec2, d: Vec2) {
        self.triangle(a, b, c);
        self.triangle(a, c, d);
    }

    fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) {
        self.vertices.extend_from_slice(&[a.into(), b.into(), c.into()]);
    }

    fn set_color(&mut self, color: Color) {
        unsafe {
            if let Some(loc) = &self.u_color {
                self.gl.uniform_4_f32(Some(loc), color.r, color.g, color.b, color.a);
            }
        }
    }

    fn flush_batch(&mut self, color: Color) {
        if self.vertices.is_empty() {
            return;
        }
        self.set_color(color);

        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&self.vertices),
                glow::DYNAMIC_DRAW,
            );

            if let Some(a_pos) = self.a_pos {
                self.gl.enable_vertex_attrib_array(a_pos);
                self.gl.vertex_attrib_pointer_f32(
                    a_pos,
                    2,
                    glow::FLOAT,
                    false,
                    std::mem::size_of::<Vertex>() as i32,
                    0,
                );
            }

            self.gl.draw_arrays(glow::TRIANGLES, 0, self.vertices.len() as i32);
        }

        self.vertices.clear();
    }

    pub fn finish(&mut self) {
        unsafe {
            self.gl.flush();
        }
    }
}

impl Drop for DrawContext {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_program(self.program);
        }
    }
}
