use crate::geometry::{
    invert_bezier_path_axis, invert_straight_path_axis, Axis, BezierPath, CurvePoint, PathCommand,
    Point, StraightPath,
};
use crate::rng::{rand_range, rand_unit};

pub const EDGE_SPAN: f32 = 100.0;

pub const SHOULDER_VECTOR_LENGTH: f32 = 20.0;
pub const SHOULDER_VARIANCE: f32 = 9.0;
pub const TAB_WIDTH: f32 = 20.0;
pub const TAB_OVERFLOW: f32 = 20.0;
pub const TAB_RECESS: f32 = 5.0;
pub const TAB_VECTOR_LENGTH: f32 = 5.0;
pub const TAB_CENTERING_VARIANCE: f32 = 11.0;
pub const TAB_OVERFLOW_VARIANCE: f32 = 8.0;
pub const TAB_RECESS_VARIANCE: f32 = 2.0;

pub const MARGIN_FACTOR: f32 = (TAB_OVERFLOW + TAB_OVERFLOW_VARIANCE + 1.0) / EDGE_SPAN;

const SALT_TAB_CENTER: u32 = 0;
const SALT_TAB_TOP: u32 = 1;
const SALT_LEFT_SHOULDER: u32 = 2;
const SALT_RIGHT_SHOULDER: u32 = 3;
const SALT_TAB_DIRECTION: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeVariant {
    Straight,
    Tabbed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Edge {
    Straight(StraightPath),
    Tabbed([BezierPath; 6]),
}

pub fn build_edge(axis: Axis, variant: EdgeVariant, seed: u32, allow_variance: bool) -> Edge {
    match variant {
        EdgeVariant::Straight => build_straight_edge(axis),
        EdgeVariant::Tabbed => build_tabbed_edge(axis, seed, allow_variance),
    }
}

pub fn build_straight_edge(axis: Axis) -> Edge {
    let mut path = StraightPath {
        start: Point::new(0.0, 0.0),
        end: Point::new(EDGE_SPAN, 0.0),
    };
    if axis == Axis::Vertical {
        invert_straight_path_axis(&mut path);
    }
    Edge::Straight(path)
}

pub fn build_tabbed_edge(axis: Axis, seed: u32, allow_variance: bool) -> Edge {
    let variance = |salt: u32, min: f32, max: f32| {
        if allow_variance {
            rand_range(seed, salt, min, max)
        } else {
            0.0
        }
    };

    let tab_center_x =
        EDGE_SPAN / 2.0 + variance(SALT_TAB_CENTER, -TAB_CENTERING_VARIANCE, TAB_CENTERING_VARIANCE);
    let tab_top_y =
        -TAB_OVERFLOW + variance(SALT_TAB_TOP, -TAB_OVERFLOW_VARIANCE, TAB_RECESS_VARIANCE);
    let neck_left_x = tab_center_x - TAB_WIDTH / 2.0;
    let neck_right_x = tab_center_x + TAB_WIDTH / 2.0;
    let neck_top_y = tab_top_y + TAB_OVERFLOW / 2.0;
    let neck_bottom_y = tab_top_y + TAB_OVERFLOW + TAB_RECESS;

    let left_shoulder_dx = SHOULDER_VECTOR_LENGTH
        + variance(SALT_LEFT_SHOULDER, -SHOULDER_VARIANCE, SHOULDER_VARIANCE);
    let right_shoulder_dx = EDGE_SPAN - SHOULDER_VECTOR_LENGTH
        + variance(SALT_RIGHT_SHOULDER, -SHOULDER_VARIANCE, SHOULDER_VARIANCE);

    let mut paths = [
        BezierPath {
            start: CurvePoint {
                x: 0.0,
                y: 0.0,
                dx: left_shoulder_dx,
                dy: 0.0,
            },
            end: CurvePoint {
                x: neck_left_x,
                y: neck_bottom_y,
                dx: neck_left_x - TAB_VECTOR_LENGTH,
                dy: neck_bottom_y + TAB_VECTOR_LENGTH,
            },
        },
        BezierPath {
            start: CurvePoint {
                x: neck_left_x,
                y: neck_bottom_y,
                dx: neck_left_x + TAB_VECTOR_LENGTH,
                dy: neck_bottom_y - TAB_VECTOR_LENGTH,
            },
            end: CurvePoint {
                x: neck_left_x,
                y: neck_top_y,
                dx: neck_left_x + TAB_VECTOR_LENGTH,
                dy: neck_top_y + TAB_VECTOR_LENGTH,
            },
        },
        BezierPath {
            start: CurvePoint {
                x: neck_left_x,
                y: neck_top_y,
                dx: neck_left_x - TAB_VECTOR_LENGTH,
                dy: neck_top_y - TAB_VECTOR_LENGTH,
            },
            end: CurvePoint {
                x: tab_center_x,
                y: tab_top_y,
                dx: tab_center_x - TAB_VECTOR_LENGTH,
                dy: tab_top_y,
            },
        },
        BezierPath {
            start: CurvePoint {
                x: tab_center_x,
                y: tab_top_y,
                dx: tab_center_x + TAB_VECTOR_LENGTH,
                dy: tab_top_y,
            },
            end: CurvePoint {
                x: neck_right_x,
                y: neck_top_y,
                dx: neck_right_x + TAB_VECTOR_LENGTH,
                dy: neck_top_y - TAB_VECTOR_LENGTH,
            },
        },
        BezierPath {
            start: CurvePoint {
                x: neck_right_x,
                y: neck_top_y,
                dx: neck_right_x - TAB_VECTOR_LENGTH,
                dy: neck_top_y + TAB_VECTOR_LENGTH,
            },
            end: CurvePoint {
                x: neck_right_x,
                y: neck_bottom_y,
                dx: neck_right_x - TAB_VECTOR_LENGTH,
                dy: neck_bottom_y - TAB_VECTOR_LENGTH,
            },
        },
        BezierPath {
            start: CurvePoint {
                x: neck_right_x,
                y: neck_bottom_y,
                dx: neck_right_x + TAB_VECTOR_LENGTH,
                dy: neck_bottom_y + TAB_VECTOR_LENGTH,
            },
            end: CurvePoint {
                x: EDGE_SPAN,
                y: 0.0,
                dx: right_shoulder_dx,
                dy: 0.0,
            },
        },
    ];

    let tab_direction = if allow_variance && rand_unit(seed, SALT_TAB_DIRECTION) < 0.5 {
        1.0
    } else {
        -1.0
    };
    for path in &mut paths {
        path.start.y *= tab_direction;
        path.start.dy *= tab_direction;
        path.end.y *= tab_direction;
        path.end.dy *= tab_direction;
    }

    if axis == Axis::Vertical {
        for path in &mut paths {
            invert_bezier_path_axis(path);
        }
    }

    Edge::Tabbed(paths)
}

impl Edge {
    pub fn append_to(&self, out: &mut Vec<PathCommand>, x: f32, y: f32, size: f32, reverse: bool) {
        let scale = size / EDGE_SPAN;
        match self {
            Edge::Straight(path) => {
                let (start, end) = if reverse {
                    (path.end, path.start)
                } else {
                    (path.start, path.end)
                };
                out.push(PathCommand::Line {
                    x: start.x * scale + x,
                    y: start.y * scale + y,
                });
                out.push(PathCommand::Line {
                    x: end.x * scale + x,
                    y: end.y * scale + y,
                });
            }
            Edge::Tabbed(paths) => {
                let mut append = |path: &BezierPath| {
                    let (start, end) = if reverse {
                        (path.end, path.start)
                    } else {
                        (path.start, path.end)
                    };
                    out.push(PathCommand::Line {
                        x: start.x * scale + x,
                        y: start.y * scale + y,
                    });
                    out.push(PathCommand::Cubic {
                        c1x: start.dx * scale + x,
                        c1y: start.dy * scale + y,
                        c2x: end.dx * scale + x,
                        c2y: end.dy * scale + y,
                        x: end.x * scale + x,
                        y: end.y * scale + y,
                    });
                };
                if reverse {
                    for path in paths.iter().rev() {
                        append(path);
                    }
                } else {
                    for path in paths.iter() {
                        append(path);
                    }
                }
            }
        }
    }
}

pub fn edge_seed(base: u32, axis: Axis, x: u32, y: u32) -> u32 {
    let orientation = match axis {
        Axis::Horizontal => 0u32,
        Axis::Vertical => 1u32,
    };
    base ^ orientation.wrapping_mul(0x9E37_79B9)
        ^ x.wrapping_mul(0x85EB_CA6B)
        ^ y.wrapping_mul(0xC2B2_AE35)
}

#[derive(Clone, Debug)]
pub struct EdgeMatrix {
    horizontal: Vec<Vec<Edge>>,
    vertical: Vec<Vec<Edge>>,
    cols: u32,
    rows: u32,
}

impl EdgeMatrix {
    pub fn build(cols: u32, rows: u32, seed: u32) -> Self {
        let horizontal = build_edge_table(Axis::Horizontal, cols, rows, seed);
        let vertical = build_edge_table(Axis::Vertical, cols, rows, seed);
        Self {
            horizontal,
            vertical,
            cols,
            rows,
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn north(&self, x: u32, y: u32) -> &Edge {
        &self.horizontal[x as usize][y as usize]
    }

    pub fn east(&self, x: u32, y: u32) -> &Edge {
        &self.vertical[(x + 1) as usize][y as usize]
    }

    pub fn south(&self, x: u32, y: u32) -> &Edge {
        &self.horizontal[x as usize][(y + 1) as usize]
    }

    pub fn west(&self, x: u32, y: u32) -> &Edge {
        &self.vertical[x as usize][y as usize]
    }
}

fn build_edge_table(axis: Axis, cols: u32, rows: u32, seed: u32) -> Vec<Vec<Edge>> {
    let count_x = cols + if axis == Axis::Vertical { 1 } else { 0 };
    let count_y = rows + if axis == Axis::Horizontal { 1 } else { 0 };
    let mut table = Vec::with_capacity(count_x as usize);
    for x in 0..count_x {
        let mut column = Vec::with_capacity(count_y as usize);
        for y in 0..count_y {
            let boundary = match axis {
                Axis::Vertical => x == 0 || x == cols,
                Axis::Horizontal => y == 0 || y == rows,
            };
            let variant = if boundary {
                EdgeVariant::Straight
            } else {
                EdgeVariant::Tabbed
            };
            column.push(build_edge(axis, variant, edge_seed(seed, axis, x, y), true));
        }
        table.push(column);
    }
    table
}
