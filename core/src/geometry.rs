use std::fmt::Write;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StraightPath {
    pub start: Point,
    pub end: Point,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BezierPath {
    pub start: CurvePoint,
    pub end: CurvePoint,
}

pub fn invert_point_axis(point: &mut Point) {
    std::mem::swap(&mut point.x, &mut point.y);
}

pub fn invert_curve_point_axis(point: &mut CurvePoint) {
    std::mem::swap(&mut point.x, &mut point.y);
    std::mem::swap(&mut point.dx, &mut point.dy);
}

pub fn invert_straight_path_axis(path: &mut StraightPath) {
    invert_point_axis(&mut path.start);
    invert_point_axis(&mut path.end);
}

pub fn invert_bezier_path_axis(path: &mut BezierPath) {
    invert_curve_point_axis(&mut path.start);
    invert_curve_point_axis(&mut path.end);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    Move {
        x: f32,
        y: f32,
    },
    Line {
        x: f32,
        y: f32,
    },
    Cubic {
        c1x: f32,
        c1y: f32,
        c2x: f32,
        c2y: f32,
        x: f32,
        y: f32,
    },
    Close,
}

fn fmt_f32(value: f32) -> String {
    format!("{:.3}", value)
}

pub fn path_data(commands: &[PathCommand]) -> String {
    let mut data = String::new();
    for command in commands {
        if !data.is_empty() {
            data.push(' ');
        }
        match *command {
            PathCommand::Move { x, y } => {
                let _ = write!(data, "M {} {}", fmt_f32(x), fmt_f32(y));
            }
            PathCommand::Line { x, y } => {
                let _ = write!(data, "L {} {}", fmt_f32(x), fmt_f32(y));
            }
            PathCommand::Cubic {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => {
                let _ = write!(
                    data,
                    "C {} {} {} {} {} {}",
                    fmt_f32(c1x),
                    fmt_f32(c1y),
                    fmt_f32(c2x),
                    fmt_f32(c2y),
                    fmt_f32(x),
                    fmt_f32(y),
                );
            }
            PathCommand::Close => {
                data.push('Z');
            }
        }
    }
    data
}
