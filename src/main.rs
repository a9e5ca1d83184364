use anyhow::Result;
use clap::Parser;
use crossing::app::App;
use crossing::config::Config;
use log::{info, warn};
use std::path::PathBuf;

/// Animated trajectory of a data point crossing a decision boundary
#[derive(Parser, Debug)]
#[command(name = "crossing")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a single frame as SVG instead of opening the overlay
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Marker progress for the SVG frame, in [0, 1)
    #[arg(long, default_value = "0")]
    progress: f32,

    /// Save the effective config to the user config directory and exit
    #[arg(long)]
    write_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("using default config: {e:#}");
            Config::default()
        }),
    };
    if cli.write_config {
        config.save()?;
        info!("saved config to {}", Config::path()?.display());
        return Ok(());
    }

    let mut app = App::new(config)?;

    if let Some(path) = &cli.svg {
        return app.export_svg(path, cli.progress);
    }

    #[cfg(feature = "overlay")]
    {
        overlay::run(app)
    }

    #[cfg(not(feature = "overlay"))]
    {
        Err(anyhow::anyhow!("built without the overlay feature; use --svg <path>"))
    }
}

#[cfg(feature = "overlay")]
mod overlay {
    use anyhow::{anyhow, bail, Result};
    use crossing::app::App;
    use crossing::gfx::{draw::DrawContext, gl::flat_color_program};
    use crossing::wayland::{egl::EglContext, layer_anchor, WaylandState};
    use log::{debug, info};
    use std::time::Instant;
    use wayland_client::{Connection, Proxy};
    use wayland_protocols_wlr::layer_shell::v1::client::{
        zwlr_layer_shell_v1, zwlr_layer_surface_v1,
    };

    pub fn run(mut app: App) -> Result<()> {
        let conn = Connection::connect_to_env()?;
        let display = conn.display();

        let mut event_queue = conn.new_event_queue();
        let qh = event_queue.handle();
        let _registry = display.get_registry(&qh, ());

        let margin = app.config.position.margin;
        let mut state = WaylandState::new(margin);

        // Globals first, then the output geometry they announce.
        event_queue.roundtrip(&mut state)?;
        event_queue.roundtrip(&mut state)?;
        for ev in state.pending_events.drain(..) {
            app.handle_event(ev);
        }
        if app.viewport().is_none() {
            debug!("no output size reported, using max_width");
            app.resize(app.config.max_width as f32);
        }

        let (Some(compositor), Some(layer_shell)) = (&state.compositor, &state.layer_shell) else {
            bail!("compositor does not offer wl_compositor and zwlr_layer_shell_v1");
        };

        let surface = compositor.create_surface(&qh, ());
        let layer_surface = layer_shell.get_layer_surface(
            &surface,
            state.output.as_ref(),
            zwlr_layer_shell_v1::Layer::Overlay,
            "crossing".to_string(),
            &qh,
            (),
        );

        let mut size = surface_size(&app).unwrap_or([1, 1]);
        let m = margin as i32;
        layer_surface.set_anchor(layer_anchor(app.config.position.anchor));
        layer_surface.set_margin(m, m, m, m);
        layer_surface.set_exclusive_zone(0);
        layer_surface.set_keyboard_interactivity(if state.layer_shell_version >= 4 {
            zwlr_layer_surface_v1::KeyboardInteractivity::OnDemand
        } else {
            zwlr_layer_surface_v1::KeyboardInteractivity::Exclusive
        });
        layer_surface.set_size(size[0], size[1]);
        surface.commit();

        state.surface = Some(surface.clone());
        state.layer_surface = Some(layer_surface.clone());

        while !state.configured {
            event_queue.blocking_dispatch(&mut state)?;
        }
        info!("surface configured at {}x{}", size[0], size[1]);

        let mut scale = state.scale;
        surface.set_buffer_scale(scale);

        let display_ptr = display.id().as_ptr() as *mut _;
        let mut egl = EglContext::new(display_ptr)?;
        egl.attach(&surface, buffer_size(size, scale))?;

        let gl = unsafe { glow::Context::from_loader_function(|s| egl.get_proc_address(s)) };
        let program = flat_color_program(&gl)?;
        let mut draw = DrawContext::new(gl, program)?;

        let mut last_frame = Instant::now();

        while app.alive {
            let now = Instant::now();
            app.update(now.duration_since(last_frame).as_secs_f64());
            last_frame = now;

            for ev in state.pending_events.drain(..) {
                app.handle_event(ev);
            }
            if !app.alive {
                break;
            }

            let mut redraw = app.take_dirty();
            let next = surface_size(&app).unwrap_or(size);
            if next != size || state.scale != scale {
                size = next;
                scale = state.scale;
                debug!("resizing surface to {}x{} @{}", size[0], size[1], scale);
                layer_surface.set_size(size[0], size[1]);
                surface.set_buffer_scale(scale);
                egl.resize(buffer_size(size, scale));
                redraw = true;
            }

            if redraw {
                if app.wants_frames() {
                    state.request_frame(&qh);
                }
                let scene = app.scene().ok_or_else(|| anyhow!("no layout to draw"))?;
                let [w, h] = buffer_size(size, scale);
                egl.make_current()?;
                draw.begin([w as f32, h as f32], scene.background);
                draw.scene(&scene);
                draw.finish();
                egl.swap_buffers()?;
            } else if app.wants_frames() && !state.frame_pending {
                state.request_frame(&qh);
                surface.commit();
            }

            event_queue.blocking_dispatch(&mut state)?;
        }

        info!("shutting down");
        layer_surface.destroy();
        surface.destroy();
        Ok(())
    }

    /// Logical surface size; a zero extent would be a protocol error.
    fn surface_size(app: &App) -> Option<[u32; 2]> {
        let [w, h] = app.viewport()?.size_px();
        Some([w.max(1), h.max(1)])
    }

    fn buffer_size(size: [u32; 2], scale: i32) -> [u32; 2] {
        let scale = scale.max(1) as u32;
        [size[0] * scale, size[1] * scale]
    }
}
