//! Sketch render bridge in the browser.
//!
//! [`SketchRender`] is the object the host talks to: flat methods keyed by
//! numeric handles, `0` for a failed create and `false` for a failed write.
//! Behind it sits a [`Bridge`](sketch_render_bridge::Bridge) driving
//! Filament's JavaScript engine through `wasm-bindgen`.

pub mod decode;
pub mod names;

#[cfg(target_arch = "wasm32")]
mod api;
#[cfg(target_arch = "wasm32")]
mod filament;
#[cfg(target_arch = "wasm32")]
mod resize;

#[cfg(target_arch = "wasm32")]
pub use api::SketchRender;
#[cfg(target_arch = "wasm32")]
pub use filament::FilamentEngine;
#[cfg(target_arch = "wasm32")]
pub use resize::install_resize_hook;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point, called when the wasm module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Sketch render web runtime initialized");
}
