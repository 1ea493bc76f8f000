use kakera_core::edge::{build_straight_edge, build_tabbed_edge, EdgeMatrix, MARGIN_FACTOR};
use kakera_core::geometry::{Axis, PathCommand};
use kakera_core::shape::{build_piece_path, build_preview_patterns, build_shape_grid};

fn endpoints(path: &[PathCommand]) -> Vec<(f32, f32)> {
    path.iter()
        .filter_map(|command| match *command {
            PathCommand::Move { x, y } => Some((x, y)),
            PathCommand::Line { x, y } => Some((x, y)),
            PathCommand::Cubic { x, y, .. } => Some((x, y)),
            PathCommand::Close => None,
        })
        .collect()
}

#[test]
fn border_piece_path_is_a_closed_margin_square() {
    let north = build_straight_edge(Axis::Horizontal);
    let east = build_straight_edge(Axis::Vertical);
    let south = build_straight_edge(Axis::Horizontal);
    let west = build_straight_edge(Axis::Vertical);
    let path = build_piece_path(100.0, &north, &east, &south, &west, 25.0);

    assert!(matches!(path.first(), Some(PathCommand::Move { x, y }) if *x == 25.0 && *y == 25.0));
    assert!(matches!(path.last(), Some(PathCommand::Close)));
    for (x, y) in endpoints(&path) {
        assert!((25.0..=125.0).contains(&x));
        assert!((25.0..=125.0).contains(&y));
    }
}

#[test]
fn tabbed_path_overflows_only_within_the_margin() {
    let north = build_tabbed_edge(Axis::Horizontal, 11, true);
    let east = build_tabbed_edge(Axis::Vertical, 12, true);
    let south = build_tabbed_edge(Axis::Horizontal, 13, true);
    let west = build_tabbed_edge(Axis::Vertical, 14, true);
    let size = 100.0;
    let margin = (MARGIN_FACTOR * size).ceil();
    let path = build_piece_path(size, &north, &east, &south, &west, margin);

    let sprite_size = size + margin * 2.0;
    for (x, y) in endpoints(&path) {
        assert!((0.0..=sprite_size).contains(&x), "x escaped: {x}");
        assert!((0.0..=sprite_size).contains(&y), "y escaped: {y}");
    }
}

#[test]
fn preview_patterns_are_canonical_and_repeat_per_axis() {
    let a = build_preview_patterns(100.0);
    let b = build_preview_patterns(100.0);
    assert_eq!(a.middle, b.middle);
    // One move plus 12 commands per traced edge, two traces per axis.
    assert_eq!(a.horizontal.len(), 26);
    assert_eq!(a.vertical.len(), 26);
    assert_eq!(a.middle.len(), 52);
}

#[test]
fn shape_grid_is_row_major_and_complete() {
    let edges = EdgeMatrix::build(4, 3, 5);
    let shapes = build_shape_grid(&edges, 100.0, 29.0);
    assert_eq!(shapes.len(), 12);
    assert_eq!(shapes[0].cell, (0, 0));
    assert_eq!(shapes[1].cell, (1, 0));
    assert_eq!(shapes[4].cell, (0, 1));
    assert_eq!(shapes[5].x, 100.0);
    assert_eq!(shapes[5].y, 100.0);
}
