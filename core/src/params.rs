use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_PIECE_COUNT_PER_AXIS: u32 = 4;
pub const MAX_PIECE_COUNT_PER_AXIS: u32 = 50;
pub const MIN_PIECE_SIZE: u32 = 60;
pub const MAX_PIECE_SIZE: u32 = 600;

pub const MIN_IMAGE_WIDTH: u32 = 450;
pub const MIN_IMAGE_HEIGHT: u32 = 450;
pub const MAX_IMAGE_WIDTH: u32 = 4096;
pub const MAX_IMAGE_HEIGHT: u32 = 4096;

pub const MIN_SNAPPING_MARGIN: f32 = 18.0;
pub const SNAPPING_MARGIN_DIVISOR: f32 = 3.5;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("the image is too small to be used")]
    ImageTooSmall,
    #[error("the image is too big to be used")]
    ImageTooBig,
    #[error("could not convert the file to a bitmap: {0}")]
    ImageCreate(String),
    #[error("an error occurred while reading the file: {0}")]
    FileRead(String),
    #[error("image fetching ended with HTTP error code {0}")]
    FileFetch(u16),
    #[error("the image load has been aborted")]
    Aborted,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PuzzleParameters {
    pub piece_size: u32,
    pub horizontal_piece_count: u32,
    pub vertical_piece_count: u32,
    pub image_offset_x: i32,
    pub image_offset_y: i32,
}

impl PuzzleParameters {
    pub fn puzzle_width(&self) -> u32 {
        self.piece_size * self.horizontal_piece_count
    }

    pub fn puzzle_height(&self) -> u32 {
        self.piece_size * self.vertical_piece_count
    }

    pub fn piece_count(&self) -> u32 {
        self.horizontal_piece_count * self.vertical_piece_count
    }
}

pub fn validate_image(width: u32, height: u32) -> Result<(), AssetError> {
    if width > MAX_IMAGE_WIDTH || height > MAX_IMAGE_HEIGHT {
        return Err(AssetError::ImageTooBig);
    }
    if width < MIN_IMAGE_WIDTH || height < MIN_IMAGE_HEIGHT {
        return Err(AssetError::ImageTooSmall);
    }
    Ok(())
}

pub fn fit_parameters(image_width: u32, image_height: u32, piece_size: u32) -> PuzzleParameters {
    let piece_size = piece_size.max(1);
    let horizontal_piece_count = (image_width / piece_size).max(1);
    let vertical_piece_count = (image_height / piece_size).max(1);
    let puzzle_width = horizontal_piece_count * piece_size;
    let puzzle_height = vertical_piece_count * piece_size;
    PuzzleParameters {
        piece_size,
        horizontal_piece_count,
        vertical_piece_count,
        image_offset_x: (image_width.saturating_sub(puzzle_width) / 2) as i32,
        image_offset_y: (image_height.saturating_sub(puzzle_height) / 2) as i32,
    }
}

pub fn valid_piece_sizes(image_width: u32, image_height: u32) -> Vec<u32> {
    let min_piece_size = (image_width / MAX_PIECE_COUNT_PER_AXIS)
        .max(image_height / MAX_PIECE_COUNT_PER_AXIS)
        .max(MIN_PIECE_SIZE);
    let max_piece_size = (image_width / MIN_PIECE_COUNT_PER_AXIS)
        .min(image_height / MIN_PIECE_COUNT_PER_AXIS)
        .min(MAX_PIECE_SIZE);
    if max_piece_size < min_piece_size {
        return Vec::new();
    }

    let mut sizes: Vec<u32> = Vec::new();
    for dimension in [image_width, image_height] {
        let min_count = dimension / max_piece_size;
        let max_count = dimension / min_piece_size;
        for count in min_count..=max_count {
            if count == 0 {
                continue;
            }
            let size = (dimension / count).clamp(min_piece_size, max_piece_size);
            match sizes.binary_search_by(|probe| size.cmp(probe)) {
                Ok(_) => {}
                Err(index) => sizes.insert(index, size),
            }
        }
    }
    sizes
}

pub fn snapping_margin(piece_size: u32) -> f32 {
    MIN_SNAPPING_MARGIN.max((piece_size as f32 / SNAPPING_MARGIN_DIVISOR).ceil())
}
