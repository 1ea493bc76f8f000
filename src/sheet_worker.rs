use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{ImageBitmap, MessageEvent, Worker, WorkerOptions, WorkerType};

use kakera_core::sheet::{plan_quadrants, AlphaBuffer, BuildError, SheetRequest, SpriteSource};

pub struct SheetTextures {
    pub source: SpriteSource,
    pub images: Vec<ImageBitmap>,
}

pub fn spawn_sheet_worker(script_url: &str) -> Result<Worker, BuildError> {
    let options = WorkerOptions::new();
    options.set_type(WorkerType::Module);
    Worker::new_with_options(script_url, &options)
        .map_err(|_| BuildError::Raster("could not spawn the spritesheet worker".into()))
}

// The bitmap's ownership is transferred to the worker; the caller must not
// touch it afterwards. The build is not cancellable once posted, it ends in
// exactly one terminal message, either the spritesheet or an error.
pub async fn build_sheet_textures(
    worker: &Worker,
    image: ImageBitmap,
    request: SheetRequest,
) -> Result<SheetTextures, BuildError> {
    let message = Object::new();
    let request_value = serde_wasm_bindgen::to_value(&request)
        .map_err(|err| BuildError::Raster(err.to_string()))?;
    set(&message, "request", &request_value)?;
    set(&message, "image", &image)?;

    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let _ = resolve.call1(&JsValue::NULL, &event.data());
        });
        worker.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();
    });

    let transfer = Array::of1(&image);
    worker
        .post_message_with_transfer(&message, &transfer)
        .map_err(|_| BuildError::Raster("could not hand the image to the worker".into()))?;

    let data = JsFuture::from(promise)
        .await
        .map_err(|_| BuildError::Raster("the spritesheet worker went away".into()))?;
    worker.set_onmessage(None);
    parse_response(&request, data)
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), BuildError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|_| BuildError::Raster("could not assemble the build request".into()))
}

fn get(data: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(data, &JsValue::from_str(key)).ok()
}

fn parse_response(request: &SheetRequest, data: JsValue) -> Result<SheetTextures, BuildError> {
    if let Some(error) = get(&data, "error").and_then(|value| value.as_string()) {
        return Err(BuildError::Raster(error));
    }

    let layout = plan_quadrants(&request.params, request.max_texture_dimension)?;
    let images_value = get(&data, "images")
        .ok_or_else(|| BuildError::Raster("build response carries no images".into()))?;
    let alphas_value = get(&data, "alphas")
        .ok_or_else(|| BuildError::Raster("build response carries no alpha data".into()))?;
    let images_array = Array::from(&images_value);
    let alphas_array = Array::from(&alphas_value);
    if images_array.length() as usize != layout.quadrants.len()
        || alphas_array.length() as usize != layout.quadrants.len()
    {
        return Err(BuildError::Raster("build response is incomplete".into()));
    }

    let mut images = Vec::with_capacity(layout.quadrants.len());
    let mut alpha = Vec::with_capacity(layout.quadrants.len());
    for index in 0..layout.quadrants.len() {
        let bitmap: ImageBitmap = images_array
            .get(index as u32)
            .dyn_into()
            .map_err(|_| BuildError::Raster("build response holds a non-bitmap".into()))?;
        let bytes: Uint8Array = alphas_array
            .get(index as u32)
            .dyn_into()
            .map_err(|_| BuildError::Raster("build response holds non-binary alpha".into()))?;
        alpha.push(AlphaBuffer::from_alpha(
            layout.quadrant_width(index),
            layout.quadrant_height(index),
            bytes.to_vec(),
        )?);
        images.push(bitmap);
    }

    Ok(SheetTextures {
        source: SpriteSource::new(layout, alpha),
        images,
    })
}
