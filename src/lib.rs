mod game_view;
mod image_loader;
mod sheet_worker;

pub use game_view::GameView;
pub use image_loader::{load_from_file, load_from_url, ImageLoad};
pub use sheet_worker::{build_sheet_textures, spawn_sheet_worker, SheetTextures};

use gloo::console;
use js_sys::Date;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, CustomEventInit, HtmlCanvasElement};

use kakera_core::params::{fit_parameters, validate_image};
use kakera_core::sheet::{SheetParameters, SheetRequest};
use kakera_core::PuzzleEngine;

#[wasm_bindgen]
pub struct PuzzleHandle {
    _view: GameView,
}

#[wasm_bindgen]
pub async fn start_puzzle(
    canvas_id: &str,
    image_url: &str,
    piece_size: u32,
    worker_url: &str,
) -> Result<PuzzleHandle, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document available"))?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str("puzzle canvas not found"))?
        .dyn_into()
        .map_err(|_| JsValue::from_str("puzzle element is not a canvas"))?;

    let load = ImageLoad::new().map_err(to_js)?;
    let image = load_from_url(image_url, &load).await.map_err(to_js)?;
    if let Err(err) = validate_image(image.width(), image.height()) {
        image.close();
        return Err(to_js(err));
    }

    let params = fit_parameters(image.width(), image.height(), piece_size);
    let sheet = SheetParameters::new(
        params.piece_size,
        params.horizontal_piece_count,
        params.vertical_piece_count,
        (params.image_offset_x, params.image_offset_y),
    );
    let seed = (Date::now() as u64) as u32;
    let request = SheetRequest::new(sheet, seed);

    let worker = spawn_sheet_worker(worker_url).map_err(to_js)?;
    let textures = match build_sheet_textures(&worker, image, request).await {
        Ok(textures) => textures,
        Err(err) => {
            worker.terminate();
            console::error!("spritesheet build failed", err.to_string());
            return Err(to_js(err));
        }
    };
    worker.terminate();

    let SheetTextures { source, images } = textures;
    let engine = PuzzleEngine::new(&params, source, seed ^ 0x5CA7_7EED);
    let view = GameView::new(canvas.clone(), engine, images).map_err(to_js)?;
    view.set_on_finish(move |play_time_ms| {
        let init = CustomEventInit::new();
        init.set_detail(&JsValue::from_f64(play_time_ms));
        if let Ok(event) = CustomEvent::new_with_event_init_dict("puzzlefinished", &init) {
            let _ = canvas.dispatch_event(&event);
        }
    });
    view.start(&document);

    Ok(PuzzleHandle { _view: view })
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
