pub mod edge;
pub mod engine;
pub mod geometry;
pub mod params;
pub mod piece;
pub mod rng;
pub mod shape;
pub mod sheet;
pub mod shuffle;

pub use edge::{build_edge, Edge, EdgeMatrix, EdgeVariant};
pub use engine::{EngineEvent, ManipulationKind, PuzzleEngine, ViewportState};
pub use geometry::{path_data, Axis, PathCommand, Point};
pub use params::{fit_parameters, validate_image, AssetError, PuzzleParameters};
pub use piece::{Piece, PieceGroup};
pub use shape::{build_preview_patterns, build_shape_grid, PieceShape, PreviewPatterns};
pub use sheet::{
    piece_margin, plan_quadrants, sprite_size, AlphaBuffer, BuildError, SheetLayout,
    SheetParameters, SpriteSource,
};
