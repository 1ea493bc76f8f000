mod raster;

use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{DedicatedWorkerGlobalScope, ImageBitmap, MessageEvent};

use kakera_core::sheet::SheetRequest;

pub use raster::{build_spritesheet, SheetBuild};

#[wasm_bindgen]
pub fn start_worker() -> Result<(), JsValue> {
    let scope: DedicatedWorkerGlobalScope = js_sys::global()
        .dyn_into()
        .map_err(|_| JsValue::from_str("not running inside a dedicated worker"))?;
    let message_scope = scope.clone();
    let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        handle_message(&message_scope, event);
    });
    scope.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();
    Ok(())
}

fn handle_message(scope: &DedicatedWorkerGlobalScope, event: MessageEvent) {
    match build_response(event.data()) {
        Ok((response, transfer)) => {
            if scope
                .post_message_with_transfer(&response, &transfer)
                .is_err()
            {
                post_error(scope, "could not transfer the spritesheet back");
            }
        }
        Err(message) => post_error(scope, &message),
    }
}

fn post_error(scope: &DedicatedWorkerGlobalScope, message: &str) {
    let response = Object::new();
    let _ = Reflect::set(
        &response,
        &JsValue::from_str("error"),
        &JsValue::from_str(message),
    );
    let _ = scope.post_message(&response);
}

fn build_response(data: JsValue) -> Result<(JsValue, Array), String> {
    let request_value = Reflect::get(&data, &JsValue::from_str("request"))
        .map_err(|_| "malformed build request".to_string())?;
    let request: SheetRequest =
        serde_wasm_bindgen::from_value(request_value).map_err(|err| err.to_string())?;
    let image: ImageBitmap = Reflect::get(&data, &JsValue::from_str("image"))
        .ok()
        .and_then(|value| value.dyn_into().ok())
        .ok_or_else(|| "build request carries no image".to_string())?;

    let build = build_spritesheet(&image, &request).map_err(|err| err.to_string())?;

    let images = Array::new();
    let alphas = Array::new();
    let transfer = Array::new();
    for (index, bitmap) in build.images.iter().enumerate() {
        let alpha = Uint8Array::from(build.alphas[index].as_slice());
        transfer.push(&alpha.buffer());
        transfer.push(bitmap);
        images.push(bitmap);
        alphas.push(&alpha);
    }

    let response = Object::new();
    let set = |key: &str, value: &JsValue| {
        Reflect::set(&response, &JsValue::from_str(key), value)
            .map(|_| ())
            .map_err(|_| "could not assemble the build response".to_string())
    };
    set("images", &images)?;
    set("alphas", &alphas)?;

    Ok((response.into(), transfer))
}
