pub mod anim;
pub mod font;
pub mod math;

#[cfg(feature = "overlay")]
pub mod draw;
#[cfg(feature = "overlay")]
pub mod gl;
