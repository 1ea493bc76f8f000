use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::edge::MARGIN_FACTOR;

pub const STROKE_COLOR: &str = "#fff";
pub const STROKE_THICKNESS: u32 = 1;

pub const DEFAULT_MAX_TEXTURE_DIMENSION: u32 = 4096;

pub const BYTES_PER_PIXEL: usize = 4;
pub const ALPHA_CHANNEL_OFFSET: usize = 3;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("could not get the 2d context from the canvas")]
    ContextUnavailable,
    #[error("sprite atlas of {width}x{height} px exceeds the texture limit even when split")]
    AtlasTooLarge { width: u32, height: u32 },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    PixelSizeMismatch { expected: usize, actual: usize },
    #[error("spritesheet rasterization failed: {0}")]
    Raster(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetParameters {
    pub piece_size: u32,
    pub piece_margin: u32,
    pub sprite_size: u32,
    pub cols: u32,
    pub rows: u32,
    pub image_offset_x: i32,
    pub image_offset_y: i32,
}

pub fn piece_margin(piece_size: u32) -> u32 {
    (MARGIN_FACTOR * piece_size as f32).ceil() as u32 + STROKE_THICKNESS
}

pub fn sprite_size(piece_size: u32) -> u32 {
    piece_size + piece_margin(piece_size) * 2
}

impl SheetParameters {
    pub fn new(piece_size: u32, cols: u32, rows: u32, image_offset: (i32, i32)) -> Self {
        let piece_margin = piece_margin(piece_size);
        Self {
            piece_size,
            piece_margin,
            sprite_size: piece_size + piece_margin * 2,
            cols,
            rows,
            image_offset_x: image_offset.0,
            image_offset_y: image_offset.1,
        }
    }

    pub fn atlas_width(&self) -> u32 {
        self.sprite_size * self.cols
    }

    pub fn atlas_height(&self) -> u32 {
        self.sprite_size * self.rows
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetRequest {
    pub params: SheetParameters,
    pub shape_seed: u32,
    pub max_texture_dimension: u32,
}

impl SheetRequest {
    pub fn new(params: SheetParameters, shape_seed: u32) -> Self {
        Self {
            params,
            shape_seed,
            max_texture_dimension: DEFAULT_MAX_TEXTURE_DIMENSION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub sx: i32,
    pub sy: i32,
    pub sw: i32,
    pub sh: i32,
    pub dx: i32,
    pub dy: i32,
    pub dw: i32,
    pub dh: i32,
}

// Outer pieces carry no tab on their border side, and cropping outside the
// source image makes drawImage fail on iOS.
pub fn piece_crop(params: &SheetParameters, x: u32, y: u32) -> CropRect {
    let margin = params.piece_margin as i32;
    let sprite = params.sprite_size as i32;

    let mut sx = (x * params.piece_size) as i32 - margin + params.image_offset_x;
    let mut sy = (y * params.piece_size) as i32 - margin + params.image_offset_y;
    let mut sw = sprite;
    let mut sh = sprite;
    let mut dx = 0;
    let mut dy = 0;
    let mut dw = sprite;
    let mut dh = sprite;

    if x == 0 {
        sx += margin;
        dx += margin;
        sw -= margin;
        dw -= margin;
    } else if x == params.cols - 1 {
        sw -= margin;
        dw -= margin;
    }

    if y == 0 {
        sy += margin;
        dy += margin;
        sh -= margin;
        dh -= margin;
    } else if y == params.rows - 1 {
        sh -= margin;
        dh -= margin;
    }

    CropRect {
        sx,
        sy,
        sw,
        sh,
        dx,
        dy,
        dw,
        dh,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quadrant {
    pub col_start: u32,
    pub col_end: u32,
    pub row_start: u32,
    pub row_end: u32,
}

impl Quadrant {
    pub fn cols(&self) -> u32 {
        self.col_end - self.col_start
    }

    pub fn rows(&self) -> u32 {
        self.row_end - self.row_start
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SheetLayout {
    pub sprite_size: u32,
    pub quadrants: Vec<Quadrant>,
    col_split: u32,
    row_split: u32,
    col_buckets: u32,
}

impl SheetLayout {
    pub fn quadrant_width(&self, index: usize) -> u32 {
        self.quadrants[index].cols() * self.sprite_size
    }

    pub fn quadrant_height(&self, index: usize) -> u32 {
        self.quadrants[index].rows() * self.sprite_size
    }

    pub fn quadrant_of(&self, x: u32, y: u32) -> usize {
        let col_bucket = if x >= self.col_split { 1 } else { 0 };
        let row_bucket = if y >= self.row_split { 1 } else { 0 };
        (row_bucket * self.col_buckets + col_bucket) as usize
    }

    pub fn sprite_origin(&self, x: u32, y: u32) -> (u32, u32) {
        let quadrant = &self.quadrants[self.quadrant_of(x, y)];
        (
            (x - quadrant.col_start) * self.sprite_size,
            (y - quadrant.row_start) * self.sprite_size,
        )
    }
}

pub fn plan_quadrants(params: &SheetParameters, max_dim: u32) -> Result<SheetLayout, BuildError> {
    let split_cols = params.atlas_width() > max_dim;
    let split_rows = params.atlas_height() > max_dim;
    let col_split = if split_cols {
        params.cols.div_ceil(2)
    } else {
        params.cols
    };
    let row_split = if split_rows {
        params.rows.div_ceil(2)
    } else {
        params.rows
    };

    let col_ranges: Vec<(u32, u32)> = if split_cols {
        vec![(0, col_split), (col_split, params.cols)]
    } else {
        vec![(0, params.cols)]
    };
    let row_ranges: Vec<(u32, u32)> = if split_rows {
        vec![(0, row_split), (row_split, params.rows)]
    } else {
        vec![(0, params.rows)]
    };

    let mut quadrants = Vec::with_capacity(col_ranges.len() * row_ranges.len());
    for &(row_start, row_end) in &row_ranges {
        for &(col_start, col_end) in &col_ranges {
            let quadrant = Quadrant {
                col_start,
                col_end,
                row_start,
                row_end,
            };
            if quadrant.cols() * params.sprite_size > max_dim
                || quadrant.rows() * params.sprite_size > max_dim
            {
                return Err(BuildError::AtlasTooLarge {
                    width: params.atlas_width(),
                    height: params.atlas_height(),
                });
            }
            quadrants.push(quadrant);
        }
    }

    Ok(SheetLayout {
        sprite_size: params.sprite_size,
        quadrants,
        col_split,
        row_split,
        col_buckets: if split_cols { 2 } else { 1 },
    })
}

pub fn extract_alpha(rgba: &[u8]) -> Vec<u8> {
    let mut alpha = Vec::with_capacity(rgba.len() / BYTES_PER_PIXEL);
    for pixel in rgba.chunks_exact(BYTES_PER_PIXEL) {
        alpha.push(pixel[ALPHA_CHANNEL_OFFSET]);
    }
    alpha
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlphaBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl AlphaBuffer {
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, BuildError> {
        let expected = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        if rgba.len() != expected {
            return Err(BuildError::PixelSizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: extract_alpha(rgba),
        })
    }

    pub fn from_alpha(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BuildError> {
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(BuildError::PixelSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }
}

#[derive(Clone, Debug)]
pub struct SpriteSource {
    pub layout: SheetLayout,
    pub alpha: Vec<AlphaBuffer>,
}

impl SpriteSource {
    pub fn new(layout: SheetLayout, alpha: Vec<AlphaBuffer>) -> Self {
        Self { layout, alpha }
    }

    pub fn sprite_alpha_at(&self, cell_x: u32, cell_y: u32, px: u32, py: u32) -> u8 {
        let quadrant = self.layout.quadrant_of(cell_x, cell_y);
        let (origin_x, origin_y) = self.layout.sprite_origin(cell_x, cell_y);
        match self.alpha.get(quadrant) {
            Some(buffer) => buffer.at(origin_x + px, origin_y + py),
            None => 0,
        }
    }
}
