#![recursion_limit = "1024"]

mod app;
mod bindings;
mod items;
mod logview;
mod socket;

use wasm_bindgen::prelude::*;

pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<app::Application>::new().render();
    Ok(())
}
