use wasm_bindgen::{JsCast, JsValue};
use web_sys::{ImageBitmap, OffscreenCanvas, OffscreenCanvasRenderingContext2d, Path2d};

use kakera_core::edge::EdgeMatrix;
use kakera_core::geometry::path_data;
use kakera_core::shape::build_shape_grid;
use kakera_core::sheet::{
    extract_alpha, piece_crop, plan_quadrants, BuildError, SheetLayout, SheetRequest,
    STROKE_COLOR, STROKE_THICKNESS,
};

pub struct SheetBuild {
    pub layout: SheetLayout,
    pub images: Vec<ImageBitmap>,
    pub alphas: Vec<Vec<u8>>,
}

fn context_2d(canvas: &OffscreenCanvas) -> Result<OffscreenCanvasRenderingContext2d, BuildError> {
    canvas
        .get_context("2d")
        .map_err(|_| BuildError::ContextUnavailable)?
        .ok_or(BuildError::ContextUnavailable)?
        .dyn_into::<OffscreenCanvasRenderingContext2d>()
        .map_err(|_| BuildError::ContextUnavailable)
}

fn raster_error(err: JsValue) -> BuildError {
    BuildError::Raster(
        err.as_string()
            .unwrap_or_else(|| "unexpected canvas failure".to_string()),
    )
}

pub fn build_spritesheet(
    image: &ImageBitmap,
    request: &SheetRequest,
) -> Result<SheetBuild, BuildError> {
    let params = request.params;
    let layout = plan_quadrants(&params, request.max_texture_dimension)?;

    let edges = EdgeMatrix::build(params.cols, params.rows, request.shape_seed);
    let shapes = build_shape_grid(&edges, params.piece_size as f32, params.piece_margin as f32);

    let mut quadrant_canvases = Vec::with_capacity(layout.quadrants.len());
    let mut quadrant_contexts = Vec::with_capacity(layout.quadrants.len());
    for index in 0..layout.quadrants.len() {
        let canvas = OffscreenCanvas::new(layout.quadrant_width(index), layout.quadrant_height(index))
            .map_err(raster_error)?;
        let context = context_2d(&canvas)?;
        quadrant_canvases.push(canvas);
        quadrant_contexts.push(context);
    }

    let sprite_canvas =
        OffscreenCanvas::new(params.sprite_size, params.sprite_size).map_err(raster_error)?;
    let sprite_context = context_2d(&sprite_canvas)?;

    for shape in &shapes {
        let (x, y) = shape.cell;

        // Resizing the scratch canvas resets its state, dropping the clip of
        // the previous piece.
        sprite_canvas.set_width(params.sprite_size);

        let path = Path2d::new_with_path_string(&path_data(&shape.path)).map_err(raster_error)?;

        // Stroke before clipping so the outline fuses the seam between
        // adjacent pieces.
        sprite_context.set_stroke_style_str(STROKE_COLOR);
        sprite_context.set_line_width(STROKE_THICKNESS as f64);
        sprite_context.stroke_with_path(&path);

        sprite_context.clip_with_path_2d(&path);
        let crop = piece_crop(&params, x, y);
        sprite_context
            .draw_image_with_image_bitmap_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                crop.sx as f64,
                crop.sy as f64,
                crop.sw as f64,
                crop.sh as f64,
                crop.dx as f64,
                crop.dy as f64,
                crop.dw as f64,
                crop.dh as f64,
            )
            .map_err(raster_error)?;

        let quadrant = layout.quadrant_of(x, y);
        let (origin_x, origin_y) = layout.sprite_origin(x, y);
        quadrant_contexts[quadrant]
            .draw_image_with_offscreen_canvas(&sprite_canvas, origin_x as f64, origin_y as f64)
            .map_err(raster_error)?;
    }

    image.close();

    // transferToImageBitmap clears the canvas, so each atlas is read back
    // before it is transferred out.
    let mut images = Vec::with_capacity(quadrant_canvases.len());
    let mut alphas = Vec::with_capacity(quadrant_canvases.len());
    for (index, canvas) in quadrant_canvases.iter().enumerate() {
        let width = layout.quadrant_width(index);
        let height = layout.quadrant_height(index);
        let pixels = quadrant_contexts[index]
            .get_image_data(0.0, 0.0, width as f64, height as f64)
            .map_err(raster_error)?
            .data();
        alphas.push(extract_alpha(&pixels));
        images.push(canvas.transfer_to_image_bitmap().map_err(raster_error)?);
    }

    Ok(SheetBuild {
        layout,
        images,
        alphas,
    })
}
