#![cfg(target_arch = "wasm32")]

use kakera::{load_from_url, GameView, ImageLoad};
use kakera_core::engine::PuzzleEngine;
use kakera_core::params::{AssetError, PuzzleParameters};
use kakera_core::sheet::{
    plan_quadrants, AlphaBuffer, SheetParameters, SpriteSource, DEFAULT_MAX_TEXTURE_DIMENSION,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlCanvasElement, PointerEvent};

wasm_bindgen_test_configure!(run_in_browser);

fn opaque_source(piece_size: u32, cols: u32, rows: u32) -> SpriteSource {
    let params = SheetParameters::new(piece_size, cols, rows, (0, 0));
    let layout = plan_quadrants(&params, DEFAULT_MAX_TEXTURE_DIMENSION).expect("layout");
    let width = layout.quadrant_width(0);
    let height = layout.quadrant_height(0);
    let alpha = AlphaBuffer::from_alpha(width, height, vec![255; (width * height) as usize])
        .expect("alpha");
    SpriteSource::new(layout, vec![alpha])
}

fn test_canvas(document: &Document) -> HtmlCanvasElement {
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .expect("canvas element")
        .dyn_into()
        .expect("canvas cast");
    document
        .body()
        .expect("body")
        .append_child(&canvas)
        .expect("append");
    canvas
}

#[wasm_bindgen_test]
fn game_view_mirrors_engine_state_onto_the_canvas() {
    let document = web_sys::window().expect("window").document().expect("document");
    let canvas = test_canvas(&document);

    let params = PuzzleParameters {
        piece_size: 100,
        horizontal_piece_count: 2,
        vertical_piece_count: 2,
        image_offset_x: 0,
        image_offset_y: 0,
    };
    let engine = PuzzleEngine::new(&params, opaque_source(100, 2, 2), 1);
    let view = GameView::new(canvas.clone(), engine, Vec::new()).expect("view");
    view.start(&document);

    assert_eq!(
        canvas.get_attribute("data-viewport-state").as_deref(),
        Some("idle")
    );
    assert_eq!(
        canvas.get_attribute("data-can-interact").as_deref(),
        Some("false")
    );

    let down = PointerEvent::new("pointerdown").expect("pointerdown");
    canvas.dispatch_event(&down).expect("dispatch");
    assert_eq!(
        canvas.get_attribute("data-viewport-state").as_deref(),
        Some("manipulation")
    );
    assert_eq!(
        canvas.get_attribute("data-viewport-manipulation").as_deref(),
        Some("pan")
    );

    let up = PointerEvent::new("pointerup").expect("pointerup");
    canvas.dispatch_event(&up).expect("dispatch");
    assert_eq!(
        canvas.get_attribute("data-viewport-state").as_deref(),
        Some("idle")
    );
}

#[wasm_bindgen_test(async)]
async fn aborted_image_load_resolves_to_aborted() {
    let load = ImageLoad::new().expect("abort controller");
    load.abort();
    let result = load_from_url("image.png", &load).await;
    assert!(matches!(result, Err(AssetError::Aborted)));
}
