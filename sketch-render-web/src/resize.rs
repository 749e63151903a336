//! Window resize forwarding.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Call `callback` on every window `resize` event. The listener stays
/// installed for the lifetime of the page.
#[wasm_bindgen]
pub fn install_resize_hook(callback: js_sys::Function) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        if let Err(err) = callback.call0(&JsValue::NULL) {
            log::warn!("Resize callback threw: {err:?}");
        }
    });
    window.add_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())?;
    listener.forget();
    log::debug!("Installed window resize hook");
    Ok(())
}
