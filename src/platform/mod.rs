//! Platform hosts
//!
//! The engine only needs sizes, corner radii, pointer events, timestamps and
//! a [`crate::renderer::RenderSink`]. The browser host wires those to the DOM;
//! native builds drive [`crate::Jelly`] directly.

pub mod styles;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{JellyHandle, mount, mount_all, unmount_all};
