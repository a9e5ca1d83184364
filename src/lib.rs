pub mod app;
pub mod color;
pub mod config;
pub mod driver;
pub mod gfx;
pub mod layout;
pub mod scene;
pub mod svg;
pub mod trajectory;

#[cfg(feature = "overlay")]
pub mod wayland;
