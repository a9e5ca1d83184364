pub mod egl;

use crate::app::{Key, UiEvent};
use crate::config::Anchor;
use crate::gfx::math::Vec2;
use log::{debug, info, warn};
use wayland_client::{
    protocol::{
        wl_callback, wl_compositor, wl_keyboard, wl_output, wl_pointer, wl_registry, wl_seat,
        wl_surface,
    },
    Connection, Dispatch, QueueHandle, WEnum,
};
use wayland_protocols_wlr::layer_shell::v1::client::{
    zwlr_layer_shell_v1, zwlr_layer_surface_v1,
};
use xkbcommon::xkb::{self, keysyms};

pub struct WaylandState {
    pub configured: bool,
    pub compositor: Option<wl_compositor::WlCompositor>,
    pub layer_shell: Option<zwlr_layer_shell_v1::ZwlrLayerShellV1>,
    pub layer_shell_version: u32,
    pub surface: Option<wl_surface::WlSurface>,
    pub layer_surface: Option<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1>,
    pub seat: Option<wl_seat::WlSeat>,
    pub output: Option<wl_output::WlOutput>,
    /// Output mode in physical pixels.
    pub output_mode: Option<[u32; 2]>,
    pub scale: i32,
    /// Space kept free on each side of the surface, in logical pixels.
    pub margin: u32,
    pub pointer: Option<wl_pointer::WlPointer>,
    pub keyboard: Option<wl_keyboard::WlKeyboard>,
    pub surface_pos: Vec2,
    pub pending_events: Vec<UiEvent>,
    /// A `wl_surface.frame` callback is registered and has not fired yet.
    pub frame_pending: bool,
    xkb_context: xkb::Context,
    xkb_state: Option<xkb::State>,
}

impl WaylandState {
    pub fn new(margin: u32) -> Self {
        Self {
            configured: false,
            compositor: None,
            layer_shell: None,
            layer_shell_version: 0,
            surface: None,
            layer_surface: None,
            seat: None,
            output: None,
            output_mode: None,
            scale: 1,
            margin,
            pointer: None,
            keyboard: None,
            surface_pos: Vec2::new(0.0, 0.0),
            pending_events: Vec::new(),
            frame_pending: false,
            xkb_context: xkb::Context::new(xkb::CONTEXT_NO_FLAGS),
            xkb_state: None,
        }
    }

    /// Width available to us on the output, in logical pixels.
    pub fn container_width(&self) -> Option<f32> {
        let [width, _] = self.output_mode?;
        let logical = width as f32 / self.scale.max(1) as f32;
        Some((logical - 2.0 * self.margin as f32).max(0.0))
    }

    /// Asks the compositor for a `done` event before the next repaint.
    /// At most one callback is outstanding at a time.
    pub fn request_frame(&mut self, qh: &QueueHandle<Self>) {
        if self.frame_pending {
            return;
        }
        if let Some(surface) = &self.surface {
            surface.frame(qh, ());
            self.frame_pending = true;
        }
    }
}

pub fn layer_anchor(anchor: Anchor) -> zwlr_layer_surface_v1::Anchor {
    use zwlr_layer_surface_v1::Anchor as A;
    match anchor {
        Anchor::TopLeft => A::Top | A::Left,
        Anchor::TopRight => A::Top | A::Right,
        Anchor::BottomLeft => A::Bottom | A::Left,
        Anchor::BottomRight => A::Bottom | A::Right,
        Anchor::Center => A::empty(),
    }
}

fn translate_key(sym: u32, text: &str) -> Option<Key> {
    let key = match sym {
        keysyms::KEY_space => Key::Space,
        keysyms::KEY_Return | keysyms::KEY_KP_Enter => Key::Enter,
        keysyms::KEY_Up => Key::Up,
        keysyms::KEY_Down => Key::Down,
        keysyms::KEY_Left => Key::Left,
        keysyms::KEY_Right => Key::Right,
        keysyms::KEY_plus | keysyms::KEY_KP_Add => Key::Plus,
        keysyms::KEY_minus | keysyms::KEY_KP_Subtract => Key::Minus,
        keysyms::KEY_Escape => Key::Escape,
        _ => Key::Char(text.chars().next()?.to_ascii_lowercase()),
    };
    Some(key)
}

impl Dispatch<wl_registry::WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global { name, interface, version } = event {
            match &interface[..] {
                "wl_compositor" => {
                    state.compositor = Some(registry.bind(name, version.min(4), qh, ()));
                }
                "zwlr_layer_shell_v1" => {
                    let version = version.min(4);
                    state.layer_shell = Some(registry.bind(name, version, qh, ()));
                    state.layer_shell_version = version;
                }
                "wl_seat" => {
                    state.seat = Some(registry.bind(name, version.min(5), qh, ()));
                }
                "wl_output" if state.output.is_none() => {
                    state.output = Some(registry.bind(name, version.min(2), qh, ()));
                }
                _ => {}
            }
        }
    }
}

impl Dispatch<wl_compositor::WlCompositor, ()> for WaylandState {
    fn event(_: &mut Self, _: &wl_compositor::WlCompositor, _: wl_compositor::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<wl_surface::WlSurface, ()> for WaylandState {
    fn event(_: &mut Self, _: &wl_surface::WlSurface, _: wl_surface::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<wl_callback::WlCallback, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_callback::WlCallback,
        event: wl_callback::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_callback::Event::Done { .. } = event {
            state.frame_pending = false;
            state.pending_events.push(UiEvent::Frame);
        }
    }
}

impl Dispatch<wl_pointer::WlPointer, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_pointer::WlPointer,
        event: wl_pointer::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_pointer::Event::Enter { surface_x, surface_y, .. }
            | wl_pointer::Event::Motion { surface_x, surface_y, .. } => {
                state.surface_pos = Vec2::new(surface_x as f32, surface_y as f32);
            }
            wl_pointer::Event::Button {
                button,
                state: WEnum::Value(wl_pointer::ButtonState::Pressed),
                ..
            } => {
                state.pending_events.push(UiEvent::PointerDown {
                    pos: state.surface_pos,
                    button,
                });
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for WaylandState {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities { capabilities: WEnum::Value(caps) } = event {
            if caps.contains(wl_seat::Capability::Pointer) && state.pointer.is_none() {
                state.pointer = Some(seat.get_pointer(qh, ()));
            }
            if caps.contains(wl_seat::Capability::Keyboard) && state.keyboard.is_none() {
                state.keyboard = Some(seat.get_keyboard(qh, ()));
            }
        }
    }
}

impl Dispatch<wl_keyboard::WlKeyboard, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_keyboard::WlKeyboard,
        event: wl_keyboard::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_keyboard::Event::Keymap { format, fd, size } => {
                if format != WEnum::Value(wl_keyboard::KeymapFormat::XkbV1) {
                    warn!("unsupported keymap format {:?}", format);
                    return;
                }
                let keymap = unsafe {
                    xkb::Keymap::new_from_fd(
                        &state.xkb_context,
                        fd,
                        size as usize,
                        xkb::KEYMAP_FORMAT_TEXT_V1,
                        xkb::KEYMAP_COMPILE_NO_FLAGS,
                    )
                };
                match keymap {
                    Ok(Some(keymap)) => {
                        debug!("keymap loaded");
                        state.xkb_state = Some(xkb::State::new(&keymap));
                    }
                    Ok(None) => warn!("compositor sent an unparsable keymap"),
                    Err(e) => warn!("could not read keymap: {}", e),
                }
            }
            wl_keyboard::Event::Modifiers { mods_depressed, mods_latched, mods_locked, group, .. } => {
                if let Some(xkb_state) = state.xkb_state.as_mut() {
                    xkb_state.update_mask(mods_depressed, mods_latched, mods_locked, 0, 0, group);
                }
            }
            wl_keyboard::Event::Key {
                key,
                state: WEnum::Value(wl_keyboard::KeyState::Pressed),
                ..
            } => {
                let Some(xkb_state) = state.xkb_state.as_ref() else {
                    return;
                };
                // Wayland sends evdev codes; xkb codes are offset by 8.
                let code = xkb::Keycode::new(key + 8);
                let sym = xkb_state.key_get_one_sym(code).raw();
                let text = xkb_state.key_get_utf8(code);
                if let Some(key) = translate_key(sym, &text) {
                    state.pending_events.push(UiEvent::Key(key));
                }
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_output::WlOutput, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_output::WlOutput,
        event: wl_output::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_output::Event::Mode { flags: WEnum::Value(flags), width, height, .. }
                if flags.contains(wl_output::Mode::Current) =>
            {
                state.output_mode = Some([width.max(0) as u32, height.max(0) as u32]);
            }
            wl_output::Event::Scale { factor } => {
                state.scale = factor.max(1);
            }
            wl_output::Event::Done => {
                if let Some(container_width) = state.container_width() {
                    info!("output is {:?} at scale {}", state.output_mode, state.scale);
                    state.pending_events.push(UiEvent::Resize { container_width });
                }
            }
            _ => {}
        }
    }
}

impl Dispatch<zwlr_layer_shell_v1::ZwlrLayerShellV1, ()> for WaylandState {
    fn event(_: &mut Self, _: &zwlr_layer_shell_v1::ZwlrLayerShellV1, _: zwlr_layer_shell_v1::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        surface: &zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
        event: zwlr_layer_surface_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_layer_surface_v1::Event::Configure { serial, width, height } => {
                debug!("layer surface configured: {}x{}", width, height);
                surface.ack_configure(serial);
                state.configured = true;
            }
            zwlr_layer_surface_v1::Event::Closed => {
                state.pending_events.push(UiEvent::Close);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keysyms_map_to_controls() {
        assert_eq!(translate_key(keysyms::KEY_space, " "), Some(Key::Space));
        assert_eq!(translate_key(keysyms::KEY_Up, ""), Some(Key::Up));
        assert_eq!(translate_key(keysyms::KEY_KP_Subtract, "-"), Some(Key::Minus));
        assert_eq!(translate_key(keysyms::KEY_T, "T"), Some(Key::Char('t')));
        assert_eq!(translate_key(keysyms::KEY_Shift_L, ""), None);
    }

    #[test]
    fn container_width_is_logical_minus_margins() {
        let mut state = WaylandState::new(16);
        assert_eq!(state.container_width(), None);
        state.output_mode = Some([3840, 2160]);
        state.scale = 2;
        assert_eq!(state.container_width(), Some(1920.0 - 32.0));
    }
}
