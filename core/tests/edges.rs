use kakera_core::edge::{
    build_straight_edge, build_tabbed_edge, Edge, EdgeMatrix, EDGE_SPAN, MARGIN_FACTOR,
    SHOULDER_VECTOR_LENGTH, TAB_CENTERING_VARIANCE, TAB_OVERFLOW, TAB_OVERFLOW_VARIANCE,
};
use kakera_core::geometry::{
    invert_bezier_path_axis, invert_point_axis, invert_straight_path_axis, path_data, Axis,
    BezierPath, CurvePoint, PathCommand, Point, StraightPath,
};
use kakera_core::shape::build_piece_shape;

#[test]
fn axis_inversion_swaps_components() {
    let mut point = Point::new(3.0, 7.0);
    invert_point_axis(&mut point);
    assert_eq!(point, Point::new(7.0, 3.0));

    let mut path = BezierPath {
        start: CurvePoint {
            x: 1.0,
            y: 2.0,
            dx: 3.0,
            dy: 4.0,
        },
        end: CurvePoint {
            x: 5.0,
            y: 6.0,
            dx: 7.0,
            dy: 8.0,
        },
    };
    invert_bezier_path_axis(&mut path);
    assert_eq!(path.start.x, 2.0);
    assert_eq!(path.start.y, 1.0);
    assert_eq!(path.start.dx, 4.0);
    assert_eq!(path.start.dy, 3.0);
    assert_eq!(path.end.x, 6.0);
    assert_eq!(path.end.dx, 8.0);
}

#[test]
fn axis_inversion_is_involutive() {
    let original = StraightPath {
        start: Point::new(0.0, 0.0),
        end: Point::new(100.0, 0.0),
    };
    let mut path = original;
    invert_straight_path_axis(&mut path);
    invert_straight_path_axis(&mut path);
    assert_eq!(path, original);
}

#[test]
fn path_data_writes_svg_commands() {
    let commands = [
        PathCommand::Move { x: 1.0, y: 2.0 },
        PathCommand::Line { x: 3.0, y: 4.0 },
        PathCommand::Close,
    ];
    assert_eq!(path_data(&commands), "M 1.000 2.000 L 3.000 4.000 Z");
}

#[test]
fn straight_edge_spans_the_unit_space() {
    let Edge::Straight(path) = build_straight_edge(Axis::Horizontal) else {
        panic!("expected a straight edge");
    };
    assert_eq!(path.start, Point::new(0.0, 0.0));
    assert_eq!(path.end, Point::new(EDGE_SPAN, 0.0));

    let Edge::Straight(path) = build_straight_edge(Axis::Vertical) else {
        panic!("expected a straight edge");
    };
    assert_eq!(path.end, Point::new(0.0, EDGE_SPAN));
}

#[test]
fn tabbed_edge_without_variance_is_canonical() {
    let a = build_tabbed_edge(Axis::Horizontal, 1, false);
    let b = build_tabbed_edge(Axis::Horizontal, 2, false);
    assert_eq!(a, b);

    let Edge::Tabbed(paths) = a else {
        panic!("expected a tabbed edge");
    };
    assert_eq!(paths[2].end.x, EDGE_SPAN / 2.0);
    assert_eq!(paths[2].end.y, TAB_OVERFLOW);
    assert_eq!(paths[0].start.dx, SHOULDER_VECTOR_LENGTH);
}

#[test]
fn tabbed_edge_variance_stays_bounded() {
    for seed in 0..64 {
        let Edge::Tabbed(paths) = build_tabbed_edge(Axis::Horizontal, seed, true) else {
            panic!("expected a tabbed edge");
        };
        let tab_center = paths[2].end.x;
        assert!(tab_center >= EDGE_SPAN / 2.0 - TAB_CENTERING_VARIANCE);
        assert!(tab_center <= EDGE_SPAN / 2.0 + TAB_CENTERING_VARIANCE);
        let tab_top = paths[2].end.y.abs();
        assert!(tab_top <= TAB_OVERFLOW + TAB_OVERFLOW_VARIANCE);
        assert!(tab_top / EDGE_SPAN < MARGIN_FACTOR);
    }
}

#[test]
fn vertical_tabbed_edge_mirrors_the_horizontal_one() {
    let Edge::Tabbed(horizontal) = build_tabbed_edge(Axis::Horizontal, 77, true) else {
        panic!("expected a tabbed edge");
    };
    let Edge::Tabbed(vertical) = build_tabbed_edge(Axis::Vertical, 77, true) else {
        panic!("expected a tabbed edge");
    };
    for (h, v) in horizontal.iter().zip(vertical.iter()) {
        assert_eq!(h.start.x, v.start.y);
        assert_eq!(h.start.y, v.start.x);
        assert_eq!(h.end.dx, v.end.dy);
        assert_eq!(h.end.dy, v.end.dx);
    }
}

#[test]
fn reversed_emission_walks_the_same_points_backwards() {
    let edge = build_tabbed_edge(Axis::Horizontal, 5, true);
    let mut forward = Vec::new();
    edge.append_to(&mut forward, 0.0, 0.0, 100.0, false);
    let mut reversed = Vec::new();
    edge.append_to(&mut reversed, 0.0, 0.0, 100.0, true);

    let forward_ends: Vec<(f32, f32)> = forward
        .iter()
        .filter_map(|command| match *command {
            PathCommand::Cubic { x, y, .. } => Some((x, y)),
            _ => None,
        })
        .collect();
    let mut reversed_ends: Vec<(f32, f32)> = reversed
        .iter()
        .filter_map(|command| match *command {
            PathCommand::Line { x, y } => Some((x, y)),
            _ => None,
        })
        .collect();
    reversed_ends.reverse();
    // Each forward segment end is the start of the matching reversed segment.
    assert_eq!(forward_ends, reversed_ends);
}

#[test]
fn matrix_boundary_edges_are_straight() {
    let matrix = EdgeMatrix::build(4, 3, 99);
    for x in 0..4 {
        assert!(matches!(matrix.north(x, 0), Edge::Straight(_)));
        assert!(matches!(matrix.south(x, 2), Edge::Straight(_)));
    }
    for y in 0..3 {
        assert!(matches!(matrix.west(0, y), Edge::Straight(_)));
        assert!(matches!(matrix.east(3, y), Edge::Straight(_)));
    }
    assert!(matches!(matrix.east(0, 0), Edge::Tabbed(_)));
    assert!(matches!(matrix.south(1, 0), Edge::Tabbed(_)));
}

#[test]
fn neighbors_share_the_same_edge() {
    let matrix = EdgeMatrix::build(4, 3, 7);
    assert_eq!(matrix.east(0, 0), matrix.west(1, 0));
    assert_eq!(matrix.south(1, 1), matrix.north(1, 2));
}

#[test]
fn distinct_seams_differ() {
    let edges = EdgeMatrix::build(4, 4, 0xD1CE);
    assert_ne!(edges.east(0, 0), edges.east(1, 1));
    assert_ne!(edges.south(0, 0), edges.south(2, 2));
}

#[test]
fn rebuilding_the_matrix_with_the_same_seed_is_identical() {
    let a = EdgeMatrix::build(5, 4, 42);
    let b = EdgeMatrix::build(5, 4, 42);
    for y in 0..4 {
        for x in 0..5 {
            assert_eq!(a.north(x, y), b.north(x, y));
            assert_eq!(a.east(x, y), b.east(x, y));
        }
    }
}

fn absolute_points(path: &[PathCommand], origin: (f32, f32)) -> Vec<(f32, f32)> {
    path.iter()
        .filter_map(|command| match *command {
            PathCommand::Move { x, y } => Some((x + origin.0, y + origin.1)),
            PathCommand::Line { x, y } => Some((x + origin.0, y + origin.1)),
            PathCommand::Cubic { x, y, .. } => Some((x + origin.0, y + origin.1)),
            PathCommand::Close => None,
        })
        .collect()
}

// Path layout per piece: Move, north, east, south, west, Close. A straight
// edge contributes 2 commands, a tabbed one 12 (a line to each of the six
// segment starts plus the cubic itself).
#[test]
fn adjacent_pieces_trace_the_same_seam_in_opposite_order() {
    let piece_size = 100.0;
    let margin = 30.0;
    let edges = EdgeMatrix::build(4, 3, 0x5EED);

    // Piece (0,0)'s east edge is piece (1,0)'s west edge. Row 0 pieces have
    // a straight north edge, so east starts at command 3. Piece (1,0)'s west
    // edge is the last 12 commands before the close.
    let left = build_piece_shape(&edges, 0, 0, piece_size, margin);
    let right = build_piece_shape(&edges, 1, 0, piece_size, margin);
    let left_east = &left.path[3..15];
    let right_west = &right.path[right.path.len() - 13..right.path.len() - 1];

    let left_points = absolute_points(left_east, (0.0, 0.0));
    let mut right_points = absolute_points(right_west, (piece_size, 0.0));
    right_points.reverse();

    assert_eq!(left_points.len(), 12);
    assert_eq!(right_points.len(), 12);
    for (a, b) in left_points.iter().zip(right_points.iter()) {
        assert!(
            (a.0 - b.0).abs() < 1.0e-4 && (a.1 - b.1).abs() < 1.0e-4,
            "seam points diverge: {:?} vs {:?}",
            a,
            b
        );
    }
}

#[test]
fn horizontal_seams_are_shared_the_same_way() {
    let piece_size = 100.0;
    let margin = 30.0;
    let edges = EdgeMatrix::build(3, 3, 0xF00D);

    assert_eq!(edges.south(1, 0), edges.north(1, 1));

    let top = build_piece_shape(&edges, 1, 0, piece_size, margin);
    let bottom = build_piece_shape(&edges, 1, 1, piece_size, margin);
    // Piece (1,0): straight north (2), tabbed east (12), tabbed south next.
    let top_south = &top.path[15..27];
    // Piece (1,1): tabbed north right after the move.
    let bottom_north = &bottom.path[1..13];

    let mut top_points = absolute_points(top_south, (0.0, 0.0));
    top_points.reverse();
    let bottom_points = absolute_points(bottom_north, (0.0, piece_size));

    for (a, b) in top_points.iter().zip(bottom_points.iter()) {
        assert!(
            (a.0 - b.0).abs() < 1.0e-4 && (a.1 - b.1).abs() < 1.0e-4,
            "seam points diverge: {:?} vs {:?}",
            a,
            b
        );
    }
}
