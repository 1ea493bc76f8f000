use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal, Blob, File, ImageBitmap, RequestInit, Response, Window};

use kakera_core::params::AssetError;

pub struct ImageLoad {
    controller: AbortController,
}

impl ImageLoad {
    pub fn new() -> Result<Self, AssetError> {
        AbortController::new()
            .map(|controller| Self { controller })
            .map_err(|_| AssetError::ImageCreate("could not create an abort controller".into()))
    }

    pub fn abort(&self) {
        self.controller.abort();
    }

    pub fn aborted(&self) -> bool {
        self.controller.signal().aborted()
    }

    fn signal(&self) -> AbortSignal {
        self.controller.signal()
    }
}

fn window() -> Result<Window, AssetError> {
    web_sys::window().ok_or_else(|| AssetError::ImageCreate("no window available".into()))
}

fn js_error_message(error: JsValue, fallback: &str) -> String {
    error.as_string().unwrap_or_else(|| fallback.to_string())
}

async fn create_from_blob(window: &Window, blob: &Blob) -> Result<ImageBitmap, AssetError> {
    let promise = window
        .create_image_bitmap_with_blob(blob)
        .map_err(|err| AssetError::ImageCreate(js_error_message(err, "createImageBitmap failed")))?;
    let bitmap = JsFuture::from(promise)
        .await
        .map_err(|err| AssetError::ImageCreate(js_error_message(err, "the image could not be decoded")))?;
    bitmap
        .dyn_into::<ImageBitmap>()
        .map_err(|_| AssetError::ImageCreate("createImageBitmap returned no bitmap".into()))
}

// Every await is followed by an abort check before the bitmap escapes, so an
// aborted load never resolves with a stale image.
fn guard_abort(load: &ImageLoad, bitmap: ImageBitmap) -> Result<ImageBitmap, AssetError> {
    if load.aborted() {
        bitmap.close();
        return Err(AssetError::Aborted);
    }
    Ok(bitmap)
}

pub async fn load_from_file(file: &File, load: &ImageLoad) -> Result<ImageBitmap, AssetError> {
    if load.aborted() {
        return Err(AssetError::Aborted);
    }
    let window = window()?;
    let bitmap = create_from_blob(&window, file).await?;
    guard_abort(load, bitmap)
}

pub async fn load_from_url(url: &str, load: &ImageLoad) -> Result<ImageBitmap, AssetError> {
    let window = window()?;
    let init = RequestInit::new();
    init.set_signal(Some(&load.signal()));

    let response = JsFuture::from(window.fetch_with_str_and_init(url, &init))
        .await
        .map_err(|err| {
            if load.aborted() {
                AssetError::Aborted
            } else {
                AssetError::FileRead(js_error_message(err, "the image could not be fetched"))
            }
        })?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| AssetError::FileRead("fetch returned no response".into()))?;
    if response.status() != 200 {
        return Err(AssetError::FileFetch(response.status()));
    }

    let blob_promise = response
        .blob()
        .map_err(|err| AssetError::FileRead(js_error_message(err, "the response body was unreadable")))?;
    let blob = JsFuture::from(blob_promise).await.map_err(|err| {
        if load.aborted() {
            AssetError::Aborted
        } else {
            AssetError::FileRead(js_error_message(err, "the response body was unreadable"))
        }
    })?;
    let blob: Blob = blob
        .dyn_into()
        .map_err(|_| AssetError::FileRead("the response body was not a blob".into()))?;

    if load.aborted() {
        return Err(AssetError::Aborted);
    }
    let bitmap = create_from_blob(&window, &blob).await?;
    guard_abort(load, bitmap)
}
