use crate::config::{clamp_speed, Config};
use crate::driver::{AnimationDriver, Controls, DisplayState};
use crate::gfx::{anim::Timeline, math::Vec2};
use crate::layout::{Layout, Viewport};
use crate::scene::{self, Frame, Palette, Scene};
use crate::svg;
use crate::trajectory::Trajectory;
use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::path::Path;

pub const BTN_LEFT: u32 = 0x110;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Enter,
    Up,
    Down,
    Left,
    Right,
    Plus,
    Minus,
    Escape,
    Char(char),
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    PointerDown { pos: Vec2, button: u32 },
    Key(Key),
    /// The host measured a new width for us.
    Resize { container_width: f32 },
    /// The compositor is ready for the next frame.
    Frame,
    Close,
}

pub struct App {
    pub config: Config,
    pub controls: Controls,
    /// Seconds since start.
    pub time: f64,
    /// False once the user quits or the surface is closed.
    pub alive: bool,
    palette: Palette,
    layout: Option<Layout>,
    trajectory: Option<Trajectory>,
    driver: AnimationDriver,
    marker: Option<DisplayState>,
    boundary_fade: Timeline,
    fade_origin: f64,
    marker_side: f32,
    dirty: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let palette = Palette::from_theme(&config.theme)?;
        let controls = Controls {
            running: false,
            speed: clamp_speed(config.speed),
            show_trajectory: config.show_trajectory,
            show_decision_boundary: config.show_decision_boundary,
        };
        let driver = AnimationDriver::new(config.base_duration_ms);
        let boundary_fade = Timeline::new(config.boundary_fade_ms as f32 / 1000.0);
        Ok(Self {
            config,
            controls,
            time: 0.0,
            alive: true,
            palette,
            layout: None,
            trajectory: None,
            driver,
            marker: None,
            boundary_fade,
            fade_origin: 0.0,
            marker_side: 0.0,
            dirty: true,
        })
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::PointerDown { button, .. } => {
                if button == BTN_LEFT {
                    self.toggle_animation();
                }
            }
            UiEvent::Key(key) => self.handle_key(key),
            UiEvent::Resize { container_width } => self.resize(container_width),
            UiEvent::Frame => self.frame(),
            UiEvent::Close => {
                info!("surface closed");
                self.alive = false;
            }
        }
    }

    fn handle_key(&mut self, key: Key) {
        match key {
            Key::Space | Key::Enter => self.toggle_animation(),
            Key::Up | Key::Right | Key::Plus | Key::Char('+') | Key::Char('=') => self.change_speed(1),
            Key::Down | Key::Left | Key::Minus | Key::Char('-') => self.change_speed(-1),
            Key::Char('t') => self.toggle_trajectory(),
            Key::Char('b') => self.toggle_boundary(),
            Key::Escape | Key::Char('q') => {
                info!("quit requested");
                self.alive = false;
            }
            other => debug!("unbound key {:?}", other),
        }
    }

    pub fn toggle_animation(&mut self) {
        self.controls.running = !self.controls.running;
        self.driver.set_running(self.controls.running);
        self.dirty = true;
    }

    /// Speed is fixed while the marker is moving.
    pub fn change_speed(&mut self, step: i8) {
        if self.controls.running {
            debug!("speed locked while animating");
            return;
        }
        let next = clamp_speed((self.controls.speed as i16 + step as i16).clamp(0, u8::MAX as i16) as u8);
        if next != self.controls.speed {
            info!("speed {} -> {}", self.controls.speed, next);
            self.controls.speed = next;
        }
    }

    pub fn toggle_trajectory(&mut self) {
        self.controls.show_trajectory = !self.controls.show_trajectory;
        info!("trajectory visible: {}", self.controls.show_trajectory);
        self.dirty = true;
    }

    pub fn toggle_boundary(&mut self) {
        self.controls.show_decision_boundary = !self.controls.show_decision_boundary;
        info!("decision boundary visible: {}", self.controls.show_decision_boundary);
        if self.controls.show_decision_boundary {
            self.fade_origin = self.time;
            self.boundary_fade.start(0.0);
        }
        self.dirty = true;
    }

    /// Re-derives the viewport and regenerates the trajectory when it changed.
    pub fn resize(&mut self, container_width: f32) {
        let viewport = Viewport::from_container_width(container_width, &self.config);
        if self.layout.as_ref().map(|l| l.viewport) == Some(viewport) {
            return;
        }
        info!("viewport {}x{}", viewport.width, viewport.height);

        let layout = Layout::new(viewport);
        self.trajectory = if viewport.is_empty() {
            None
        } else {
            match layout.trajectory(self.config.sample_count) {
                Ok(t) => {
                    debug!("regenerated trajectory with {} samples", t.len());
                    Some(t)
                }
                Err(e) => {
                    warn!("could not build trajectory: {e:#}");
                    None
                }
            }
        };
        self.marker = self.trajectory.as_ref().map(|t| self.driver.display(t));
        self.marker_side = self
            .marker
            .map(|m| layout.boundary_side(m.position))
            .unwrap_or(0.0);
        self.layout = Some(layout);
        self.dirty = true;
    }

    pub fn update(&mut self, dt: f64) {
        self.time += dt;
        if self.boundary_fade.is_running() {
            // The fade runs on its own short clock, relative to when it started.
            self.boundary_fade.update((self.time - self.fade_origin) as f32);
            self.dirty = true;
        }
    }

    /// One scheduled frame: advance the driver against the current trajectory.
    pub fn frame(&mut self) {
        let now_ms = self.time * 1000.0;
        let marker = self.driver.frame(now_ms, &self.controls, self.trajectory.as_ref());
        if marker.is_some() {
            self.marker = marker;
        }
        self.note_crossing();
        self.dirty = true;
    }

    fn note_crossing(&mut self) {
        let (Some(layout), Some(marker)) = (&self.layout, self.marker) else {
            return;
        };
        let side = layout.boundary_side(marker.position);
        if self.marker_side < 0.0 && side >= 0.0 {
            info!("marker crossed the decision boundary at progress {:.3}", marker.progress);
        }
        self.marker_side = side;
    }

    /// Parks the marker at `progress` without starting the animation.
    pub fn seek(&mut self, progress: f32) {
        self.driver.seek(progress);
        self.marker = self.trajectory.as_ref().map(|t| self.driver.display(t));
        if let (Some(layout), Some(marker)) = (&self.layout, self.marker) {
            self.marker_side = layout.boundary_side(marker.position);
        }
        self.dirty = true;
    }

    /// Writes the scene at `progress` as an SVG document, sized for `max_width`.
    pub fn export_svg(&mut self, path: &Path, progress: f32) -> Result<()> {
        self.resize(self.config.max_width as f32);
        self.seek(progress);
        let scene = self
            .scene()
            .ok_or_else(|| anyhow!("max_width {} leaves nothing to draw", self.config.max_width))?;
        svg::write(path, &scene).with_context(|| format!("exporting {}", path.display()))?;
        info!("wrote {}", path.display());
        Ok(())
    }

    /// Whether the host should keep scheduling frame callbacks.
    pub fn wants_frames(&self) -> bool {
        self.alive && (self.controls.running || self.boundary_fade.is_running())
    }

    /// Returns true once per change that needs a redraw.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.layout.as_ref().map(|l| l.viewport)
    }

    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    pub fn marker(&self) -> Option<DisplayState> {
        self.marker
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    fn boundary_opacity(&self) -> f32 {
        if self.boundary_fade.is_running() {
            self.boundary_fade.eased_progress()
        } else {
            1.0
        }
    }

    pub fn scene(&self) -> Option<Scene> {
        let layout = self.layout.as_ref()?;
        let frame = Frame {
            trajectory: self.trajectory.as_ref(),
            marker: self.marker,
            controls: self.controls,
            boundary_opacity: self.boundary_opacity(),
        };
        Some(scene::build(layout, &frame, &self.palette))
    }
}
