use crate::edge::{build_tabbed_edge, Edge, EdgeMatrix};
use crate::geometry::{Axis, PathCommand};

#[derive(Clone, Debug)]
pub struct PieceShape {
    pub cell: (u32, u32),
    pub x: f32,
    pub y: f32,
    pub path: Vec<PathCommand>,
}

pub fn build_piece_path(
    size: f32,
    north: &Edge,
    east: &Edge,
    south: &Edge,
    west: &Edge,
    margin: f32,
) -> Vec<PathCommand> {
    let start = margin;
    let end = size + margin;

    let mut path = Vec::new();
    path.push(PathCommand::Move { x: start, y: start });
    north.append_to(&mut path, start, start, size, false);
    east.append_to(&mut path, end, start, size, false);
    south.append_to(&mut path, start, end, size, true);
    west.append_to(&mut path, start, start, size, true);
    path.push(PathCommand::Close);
    path
}

pub fn build_piece_shape(
    edges: &EdgeMatrix,
    x: u32,
    y: u32,
    piece_size: f32,
    margin: f32,
) -> PieceShape {
    PieceShape {
        cell: (x, y),
        x: x as f32 * piece_size,
        y: y as f32 * piece_size,
        path: build_piece_path(
            piece_size,
            edges.north(x, y),
            edges.east(x, y),
            edges.south(x, y),
            edges.west(x, y),
            margin,
        ),
    }
}

pub fn build_shape_grid(edges: &EdgeMatrix, piece_size: f32, margin: f32) -> Vec<PieceShape> {
    let mut shapes = Vec::with_capacity((edges.cols() * edges.rows()) as usize);
    for y in 0..edges.rows() {
        for x in 0..edges.cols() {
            shapes.push(build_piece_shape(edges, x, y, piece_size, margin));
        }
    }
    shapes
}

pub struct PreviewPatterns {
    pub middle: Vec<PathCommand>,
    pub horizontal: Vec<PathCommand>,
    pub vertical: Vec<PathCommand>,
}

pub fn build_preview_patterns(piece_size: f32) -> PreviewPatterns {
    let middle = (piece_size / 2.0).round();
    let horizontal = build_tabbed_edge(Axis::Horizontal, 0, false);
    let vertical = build_tabbed_edge(Axis::Vertical, 0, false);

    let trace = |edges: &[(&Edge, (f32, f32))]| -> Vec<PathCommand> {
        let mut path = Vec::new();
        for (edge, wrap_offset) in edges {
            for direction in [-1.0, 0.0] {
                let x = middle + wrap_offset.0 * direction;
                let y = middle + wrap_offset.1 * direction;
                path.push(PathCommand::Move { x, y });
                edge.append_to(&mut path, x, y, piece_size, false);
            }
        }
        path
    };

    let along_x = (&horizontal, (piece_size, 0.0));
    let along_y = (&vertical, (0.0, piece_size));
    PreviewPatterns {
        middle: trace(&[along_x, along_y]),
        horizontal: trace(&[along_x]),
        vertical: trace(&[along_y]),
    }
}
