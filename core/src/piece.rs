use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::sheet::SpriteSource;

pub type PieceId = usize;
pub type GroupId = usize;

pub const TRANSPARENT_THRESHOLD: u8 = 80;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub cell: (u32, u32),
    pub x: f32,
    pub y: f32,
}

impl Piece {
    pub fn new(id: PieceId, cell: (u32, u32)) -> Self {
        Self {
            id,
            cell,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn is_point_in_bounding_box(&self, point: Point, sprite_size: f32) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + sprite_size
            && point.y < self.y + sprite_size
    }

    pub fn is_pixel_transparent_at(&self, point: Point, source: &SpriteSource) -> bool {
        let px = (point.x - self.x).floor();
        let py = (point.y - self.y).floor();
        if px < 0.0 || py < 0.0 {
            return true;
        }
        let alpha = source.sprite_alpha_at(self.cell.0, self.cell.1, px as u32, py as u32);
        alpha < TRANSPARENT_THRESHOLD
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceGroup {
    pub x: f32,
    pub y: f32,
    pieces: Vec<Piece>,
    locked: bool,
}

impl PieceGroup {
    pub fn new(piece: Piece) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            pieces: vec![piece],
            locked: false,
        }
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn first_piece(&self) -> &Piece {
        &self.pieces[0]
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn bounds(&self, sprite_size: f32) -> (f32, f32) {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for piece in &self.pieces {
            min_x = min_x.min(piece.x);
            min_y = min_y.min(piece.y);
            max_x = max_x.max(piece.x + sprite_size);
            max_y = max_y.max(piece.y + sprite_size);
        }
        (max_x - min_x, max_y - min_y)
    }

    pub fn hit_by(&self, point: Point, sprite_size: f32, source: &SpriteSource) -> bool {
        if self.locked {
            return false;
        }
        let local = Point::new(point.x - self.x, point.y - self.y);
        self.pieces.iter().any(|piece| {
            piece.is_point_in_bounding_box(local, sprite_size)
                && !piece.is_pixel_transparent_at(local, source)
        })
    }

    pub fn absorb(&mut self, donor: PieceGroup) {
        let offset_x = donor.x - self.x;
        let offset_y = donor.y - self.y;
        for mut piece in donor.pieces {
            piece.x += offset_x;
            piece.y += offset_y;
            self.pieces.push(piece);
        }
    }
}
