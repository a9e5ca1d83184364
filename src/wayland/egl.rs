use anyhow::{anyhow, Context, Result};
use khronos_egl as egl;
use log::info;
use std::ffi::c_void;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::Proxy;

/// GLES2 context bound to one Wayland surface.
pub struct EglContext {
    instance: egl::Instance<egl::Static>,
    display: egl::Display,
    context: egl::Context,
    config: egl::Config,
    window: Option<wayland_egl::WlEglSurface>,
    surface: Option<egl::Surface>,
}

impl EglContext {
    pub fn new(wl_display: *mut c_void) -> Result<Self> {
        let instance = egl::Instance::new(egl::Static);

        let display = unsafe {
            instance
                .get_display(wl_display as egl::NativeDisplayType)
                .ok_or_else(|| anyhow!("Failed to get EGL display"))?
        };

        let (major, minor) = instance.initialize(display).context("initializing EGL")?;
        info!("EGL version: {}.{}", major, minor);

        let config_attribs = [
            egl::SURFACE_TYPE, egl::WINDOW_BIT,
            egl::RED_SIZE, 8,
            egl::GREEN_SIZE, 8,
            egl::BLUE_SIZE, 8,
            egl::ALPHA_SIZE, 8,
            egl::RENDERABLE_TYPE, egl::OPENGL_ES2_BIT,
            egl::NONE,
        ];
        let config = instance
            .choose_first_config(display, &config_attribs)?
            .ok_or_else(|| anyhow!("No EGL config found"))?;

        instance.bind_api(egl::OPENGL_ES_API)?;

        let context_attribs = [egl::CONTEXT_CLIENT_VERSION, 2, egl::NONE];
        let context = instance.create_context(display, config, None, &context_attribs)?;

        Ok(Self {
            instance,
            display,
            context,
            config,
            window: None,
            surface: None,
        })
    }

    /// Creates the window surface for `wl_surface` and makes the context current on it.
    pub fn attach(&mut self, wl_surface: &WlSurface, size: [u32; 2]) -> Result<()> {
        self.detach()?;

        let window = wayland_egl::WlEglSurface::new(wl_surface.id(), size[0] as i32, size[1] as i32)
            .context("creating wl_egl_window")?;

        let surface = unsafe {
            self.instance.create_window_surface(
                self.display,
                self.config,
                window.ptr() as egl::NativeWindowType,
                None,
            )?
        };

        self.window = Some(window);
        self.surface = Some(surface);
        self.make_current()
    }

    fn detach(&mut self) -> Result<()> {
        if let Some(surface) = self.surface.take() {
            unsafe {
                self.instance.make_current(self.display, None, None, None)?;
                self.instance.destroy_surface(self.display, surface)?;
            }
        }
        self.window = None;
        Ok(())
    }

    pub fn resize(&self, size: [u32; 2]) {
        if let Some(window) = &self.window {
            window.resize(size[0] as i32, size[1] as i32, 0, 0);
        }
    }

    pub fn make_current(&self) -> Result<()> {
        if let Some(surface) = self.surface {
            unsafe {
                self.instance
                    .make_current(self.display, Some(surface), Some(surface), Some(self.context))?;
            }
        }
        Ok(())
    }

    /// Presents the frame. This also commits the Wayland surface.
    pub fn swap_buffers(&self) -> Result<()> {
        if let Some(surface) = self.surface {
            unsafe {
                self.instance.swap_buffers(self.display, surface)?;
            }
        }
        Ok(())
    }

    pub fn get_proc_address(&self, name: &str) -> *const c_void {
        self.instance
            .get_proc_address(name)
            .map(|f| f as *const c_void)
            .unwrap_or(std::ptr::null())
    }
}

impl Drop for EglContext {
    fn drop(&mut self) {
        unsafe {
            let _ = self.instance.make_current(self.display, None, None, None);
            if let Some(surface) = self.surface.take() {
                let _ = self.instance.destroy_surface(self.display, surface);
            }
            let _ = self.instance.destroy_context(self.display, self.context);
            let _ = self.instance.terminate(self.display);
        }
    }
}
