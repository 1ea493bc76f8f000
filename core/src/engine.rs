use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::params::{snapping_margin, PuzzleParameters};
use crate::piece::{GroupId, Piece, PieceGroup};
use crate::sheet::{piece_margin, SpriteSource};
use crate::shuffle::shuffle_positions;

pub const MIN_VIEWPORT_SCALE: f32 = 0.04;
pub const MAX_VIEWPORT_SCALE: f32 = 1.0;
pub const WHEEL_SCALE_STEP: f32 = 0.1;
pub const GAME_PADDING: f32 = 40.0;
pub const FIT_FILL_RATIO: f32 = 0.9;

const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportState {
    Idle,
    Interaction,
    Manipulation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManipulationKind {
    Pan,
    Pinch,
}

#[derive(Clone, Copy, Debug)]
pub struct CapturedPointer {
    pub id: i32,
    pub origin: Point,
    pub position: Point,
}

#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PinchStart {
    origin: Point,
    mean_distance: f32,
    viewport_origin: Point,
    viewport_scale: f32,
}

#[derive(Clone, Copy, Debug)]
struct PanStart {
    drag_origin: Point,
    viewport_origin: Point,
}

#[derive(Clone, Copy, Debug)]
struct GroupDragStart {
    group: GroupId,
    drag_origin: Point,
    piece_origin: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    StateChanged {
        state: ViewportState,
        manipulation: Option<ManipulationKind>,
    },
    CanInteractChanged {
        can_interact: bool,
    },
    Finished {
        play_time_ms: f64,
    },
}

pub struct PuzzleEngine {
    piece_size: f32,
    cols: u32,
    rows: u32,
    piece_margin: f32,
    sprite_size: f32,
    snapping_margin: f32,
    puzzle_width: f32,
    puzzle_height: f32,
    playable_area_width: f32,
    playable_area_height: f32,
    puzzle_origin: Point,
    source: SpriteSource,

    groups: Vec<Option<PieceGroup>>,
    group_of: Vec<GroupId>,
    z_order: Vec<GroupId>,

    captured: HashMap<i32, CapturedPointer>,
    capture_order: Vec<i32>,
    state: ViewportState,
    manipulation: Option<ManipulationKind>,
    can_interact: bool,
    hovered: Option<GroupId>,
    pinch: Option<PinchStart>,
    viewport_drag: Option<PanStart>,
    group_drag: Option<GroupDragStart>,
    viewport: Viewport,

    play_time_ms: f64,
    play_start_ms: Option<f64>,
    solved: bool,

    events: Vec<EngineEvent>,
    dirty: bool,
}

impl PuzzleEngine {
    pub fn new(params: &PuzzleParameters, source: SpriteSource, shuffle_seed: u32) -> Self {
        let piece_size = params.piece_size as f32;
        let piece_margin = piece_margin(params.piece_size) as f32;
        let sprite_size = piece_size + piece_margin * 2.0;
        let cols = params.horizontal_piece_count;
        let rows = params.vertical_piece_count;
        let puzzle_width = piece_size * cols as f32;
        let puzzle_height = piece_size * rows as f32;
        let playable_area_padding = (puzzle_width * 2.0).max(puzzle_height * 2.0);
        let playable_area_width = puzzle_width + playable_area_padding;
        let playable_area_height = puzzle_height + playable_area_padding;
        let puzzle_origin = Point::new(
            ((playable_area_width - puzzle_width) / 2.0).round(),
            ((playable_area_height - puzzle_height) / 2.0).round(),
        );

        let total = (cols * rows) as usize;
        let positions =
            shuffle_positions(shuffle_seed, total, puzzle_width, puzzle_height, sprite_size);
        let mut groups = Vec::with_capacity(total);
        let mut group_of = Vec::with_capacity(total);
        let mut z_order = Vec::with_capacity(total);
        for id in 0..total {
            let cell = (id as u32 % cols, id as u32 / cols);
            let mut group = PieceGroup::new(Piece::new(id, cell));
            group.x = positions[id].x;
            group.y = positions[id].y;
            groups.push(Some(group));
            group_of.push(id);
            z_order.push(id);
        }

        Self {
            piece_size,
            cols,
            rows,
            piece_margin,
            sprite_size,
            snapping_margin: snapping_margin(params.piece_size),
            puzzle_width,
            puzzle_height,
            playable_area_width,
            playable_area_height,
            puzzle_origin,
            source,
            groups,
            group_of,
            z_order,
            captured: HashMap::new(),
            capture_order: Vec::new(),
            state: ViewportState::Idle,
            manipulation: None,
            can_interact: false,
            hovered: None,
            pinch: None,
            viewport_drag: None,
            group_drag: None,
            viewport: Viewport::default(),
            play_time_ms: 0.0,
            play_start_ms: None,
            solved: false,
            events: Vec::new(),
            dirty: true,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn manipulation(&self) -> Option<ManipulationKind> {
        self.manipulation
    }

    pub fn can_interact(&self) -> bool {
        self.can_interact
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn puzzle_origin(&self) -> Point {
        self.puzzle_origin
    }

    pub fn puzzle_size(&self) -> (f32, f32) {
        (self.puzzle_width, self.puzzle_height)
    }

    pub fn playable_area(&self) -> (f32, f32) {
        (self.playable_area_width, self.playable_area_height)
    }

    pub fn sprite_size(&self) -> f32 {
        self.sprite_size
    }

    pub fn piece_margin(&self) -> f32 {
        self.piece_margin
    }

    pub fn z_order(&self) -> &[GroupId] {
        &self.z_order
    }

    pub fn group(&self, id: GroupId) -> Option<&PieceGroup> {
        self.groups.get(id).and_then(|group| group.as_ref())
    }

    pub fn group_count(&self) -> usize {
        self.z_order.len()
    }

    pub fn sprite_source(&self) -> &SpriteSource {
        &self.source
    }

    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn start_play_time(&mut self, now_ms: f64, hidden: bool) {
        if hidden {
            return;
        }
        self.play_start_ms = Some(now_ms);
    }

    pub fn set_hidden(&mut self, hidden: bool, now_ms: f64) {
        if hidden {
            if let Some(start) = self.play_start_ms.take() {
                self.play_time_ms += now_ms - start;
            }
        } else if !self.solved {
            self.play_start_ms = Some(now_ms);
        }
    }

    fn stop_play_time(&mut self, now_ms: f64) {
        if let Some(start) = self.play_start_ms.take() {
            self.play_time_ms += now_ms - start;
        }
    }

    pub fn fit(&mut self, canvas_width: f32, canvas_height: f32) {
        let world_width = self.playable_area_width + GAME_PADDING * 2.0;
        let world_height = self.playable_area_height + GAME_PADDING * 2.0;
        let scale_x = canvas_width / world_width * FIT_FILL_RATIO;
        let scale_y = canvas_height / world_height * FIT_FILL_RATIO;
        let scale = scale_x.min(scale_y);
        self.viewport.scale = scale;
        self.viewport.x = ((canvas_width - world_width * scale) / 2.0).round();
        self.viewport.y = ((canvas_height - world_height * scale) / 2.0).round();
        self.dirty = true;
    }

    pub fn pointer_down(&mut self, id: i32, position: Point, button: i16) {
        if button != 0 && button != 1 {
            return;
        }
        self.capture_pointer(id, position);
        if self.state == ViewportState::Idle {
            self.compute_piece_hovering(position);
        }
        self.compute_viewport_state();
        match (self.state, self.manipulation) {
            (ViewportState::Interaction, _) => self.start_piece_dragging(),
            (ViewportState::Manipulation, Some(ManipulationKind::Pan)) => {
                self.start_viewport_dragging()
            }
            (ViewportState::Manipulation, Some(ManipulationKind::Pinch)) => {
                self.start_viewport_pinching()
            }
            _ => {}
        }
    }

    pub fn pointer_move(&mut self, id: i32, position: Point) {
        if let Some(pointer) = self.captured.get_mut(&id) {
            pointer.position = position;
        }
        match (self.state, self.manipulation) {
            (ViewportState::Idle, _) => self.compute_piece_hovering(position),
            (ViewportState::Interaction, _) => self.compute_piece_dragging(),
            (ViewportState::Manipulation, Some(ManipulationKind::Pan)) => {
                self.compute_viewport_dragging()
            }
            (ViewportState::Manipulation, Some(ManipulationKind::Pinch)) => {
                self.compute_pinch_to_zoom()
            }
            _ => {}
        }
    }

    pub fn pointer_up(&mut self, id: i32, position: Point, now_ms: f64) {
        if !self.captured.contains_key(&id) {
            return;
        }
        self.release_pointer(id);
        match (self.state, self.manipulation) {
            (ViewportState::Interaction, _) => self.stop_piece_dragging(now_ms),
            (ViewportState::Manipulation, Some(ManipulationKind::Pan)) => {
                self.viewport_drag = None;
            }
            (ViewportState::Manipulation, Some(ManipulationKind::Pinch)) => {
                self.pinch = None;
            }
            _ => {}
        }
        self.compute_viewport_state();
        // Going from two pointers to one drops straight from a pinch into a
        // fresh pan; from three to two into a fresh pinch.
        match (self.state, self.manipulation) {
            (ViewportState::Idle, _) => self.compute_piece_hovering(position),
            (ViewportState::Manipulation, Some(ManipulationKind::Pan)) => {
                self.start_viewport_dragging()
            }
            (ViewportState::Manipulation, Some(ManipulationKind::Pinch)) => {
                self.start_viewport_pinching()
            }
            _ => {}
        }
    }

    pub fn pointer_cancel(&mut self, id: i32, position: Point, now_ms: f64) {
        self.pointer_up(id, position, now_ms);
    }

    pub fn pointer_leave(&mut self) {
        self.release_piece_hover();
    }

    pub fn wheel(&mut self, position: Point, delta_y: f32) {
        if self.state == ViewportState::Manipulation {
            return;
        }
        let zoom_direction = -delta_y.signum();
        if zoom_direction == 0.0 {
            return;
        }
        let current_scale = self.viewport.scale;
        let factor =
            clamped_scale_factor(current_scale, 1.0 + zoom_direction * WHEEL_SCALE_STEP);
        self.viewport.scale = current_scale * factor;
        let in_container = Point::new(position.x - self.viewport.x, position.y - self.viewport.y);
        self.viewport.x -= in_container.x * factor - in_container.x;
        self.viewport.y -= in_container.y * factor - in_container.y;
        self.dirty = true;
    }

    fn capture_pointer(&mut self, id: i32, position: Point) {
        let pointer = CapturedPointer {
            id,
            origin: position,
            position,
        };
        if self.captured.insert(id, pointer).is_none() {
            self.capture_order.push(id);
        }
    }

    fn release_pointer(&mut self, id: i32) {
        self.captured.remove(&id);
        self.capture_order.retain(|captured| *captured != id);
    }

    fn first_pointer(&self) -> Option<CapturedPointer> {
        self.capture_order
            .first()
            .and_then(|id| self.captured.get(id))
            .copied()
    }

    fn compute_viewport_state(&mut self) {
        let previous_state = self.state;
        let previous_manipulation = self.manipulation;
        match self.captured.len() {
            0 => {
                self.state = ViewportState::Idle;
                self.manipulation = None;
            }
            1 => {
                if self.state == ViewportState::Idle && self.hovered.is_some() {
                    self.state = ViewportState::Interaction;
                    self.manipulation = None;
                } else if self.state != ViewportState::Interaction {
                    self.state = ViewportState::Manipulation;
                    self.manipulation = Some(ManipulationKind::Pan);
                }
            }
            _ => {
                self.state = ViewportState::Manipulation;
                self.manipulation = Some(ManipulationKind::Pinch);
            }
        }
        if previous_state != self.state || previous_manipulation != self.manipulation {
            self.events.push(EngineEvent::StateChanged {
                state: self.state,
                manipulation: self.manipulation,
            });
        }
    }

    fn to_container(&self, position: Point) -> Point {
        let scale = self.viewport.scale.max(1.0e-6);
        Point::new(
            (position.x - self.viewport.x) / scale - self.puzzle_origin.x,
            (position.y - self.viewport.y) / scale - self.puzzle_origin.y,
        )
    }

    fn group_at(&self, point: Point) -> Option<GroupId> {
        for id in self.z_order.iter().rev() {
            if let Some(group) = self.group(*id) {
                if group.hit_by(point, self.sprite_size, &self.source) {
                    return Some(*id);
                }
            }
        }
        None
    }

    fn compute_piece_hovering(&mut self, position: Point) {
        let previous_can_interact = self.can_interact;
        let in_container = self.to_container(position);
        self.hovered = self.group_at(in_container);
        self.can_interact = self.hovered.is_some();
        if previous_can_interact != self.can_interact {
            self.events.push(EngineEvent::CanInteractChanged {
                can_interact: self.can_interact,
            });
        }
    }

    fn release_piece_hover(&mut self) {
        self.hovered = None;
    }

    fn start_piece_dragging(&mut self) {
        let Some(group_id) = self.hovered else {
            return;
        };
        let Some(pointer) = self.first_pointer() else {
            return;
        };
        self.release_piece_hover();
        let Some(group) = self.group(group_id) else {
            return;
        };
        let drag_origin = self.to_container(pointer.position);
        self.group_drag = Some(GroupDragStart {
            group: group_id,
            drag_origin,
            piece_origin: Point::new(group.x, group.y),
        });
        self.move_group_to_top(group_id);
        self.dirty = true;
    }

    fn compute_piece_dragging(&mut self) {
        let Some(drag) = self.group_drag else {
            return;
        };
        let Some(pointer) = self.first_pointer() else {
            return;
        };
        let in_container = self.to_container(pointer.position);
        let x = (drag.piece_origin.x + in_container.x - drag.drag_origin.x).round();
        let y = (drag.piece_origin.y + in_container.y - drag.drag_origin.y).round();
        let (group_width, group_height) = match self.group(drag.group) {
            Some(group) => group.bounds(self.sprite_size),
            None => return,
        };
        let min_x = -self.puzzle_origin.x - self.piece_margin;
        let min_y = -self.puzzle_origin.y - self.piece_margin;
        let max_x =
            self.playable_area_width - self.puzzle_origin.x - group_width + self.piece_margin;
        let max_y =
            self.playable_area_height - self.puzzle_origin.y - group_height + self.piece_margin;
        if let Some(group) = self.group_mut(drag.group) {
            group.x = x.clamp(min_x, max_x);
            group.y = y.clamp(min_y, max_y);
        }
        self.dirty = true;
    }

    fn stop_piece_dragging(&mut self, now_ms: f64) {
        let Some(drag) = self.group_drag.take() else {
            return;
        };
        let group_id = drag.group;

        if let Some(lock_position) = self.group_lock_position(group_id) {
            if let Some(group) = self.group_mut(group_id) {
                group.x = lock_position.x;
                group.y = lock_position.y;
                group.lock();
            }
            self.move_group_to_bottom(group_id);
            self.check_if_finished(now_ms);
            self.dirty = true;
            return;
        }

        if let Some(snapping) = self.group_snapping(group_id) {
            if let Some(group) = self.group_mut(group_id) {
                group.x = snapping.position.x;
                group.y = snapping.position.y;
            }
            self.merge_groups(group_id, snapping.target);
            self.dirty = true;
        }
    }

    fn group_lock_position(&self, group_id: GroupId) -> Option<Point> {
        let group = self.group(group_id)?;
        let piece = group.first_piece();
        let valid_x = piece.cell.0 as f32 * self.piece_size - self.piece_margin - piece.x;
        let valid_y = piece.cell.1 as f32 * self.piece_size - self.piece_margin - piece.y;
        if (group.x - valid_x).abs() < self.snapping_margin
            && (group.y - valid_y).abs() < self.snapping_margin
        {
            return Some(Point::new(valid_x, valid_y));
        }
        None
    }

    fn group_snapping(&self, group_id: GroupId) -> Option<GroupSnapping> {
        let group = self.group(group_id)?;
        for piece in group.pieces() {
            for offset in NEIGHBOR_OFFSETS {
                let neighbor_x = piece.cell.0 as i32 + offset.0;
                let neighbor_y = piece.cell.1 as i32 + offset.1;
                if neighbor_x < 0
                    || neighbor_y < 0
                    || neighbor_x >= self.cols as i32
                    || neighbor_y >= self.rows as i32
                {
                    continue;
                }
                let neighbor_id = (neighbor_y as u32 * self.cols + neighbor_x as u32) as usize;
                let target = self.group_of[neighbor_id];
                if target == group_id {
                    continue;
                }
                let Some(neighbor_group) = self.group(target) else {
                    continue;
                };
                if neighbor_group.is_locked() {
                    continue;
                }
                let Some(neighbor_piece) = neighbor_group
                    .pieces()
                    .iter()
                    .find(|candidate| candidate.id == neighbor_id)
                else {
                    continue;
                };
                let valid_x = neighbor_group.x + neighbor_piece.x
                    - self.piece_size * offset.0 as f32
                    - piece.x;
                let valid_y = neighbor_group.y + neighbor_piece.y
                    - self.piece_size * offset.1 as f32
                    - piece.y;
                if (group.x - valid_x).abs() < self.snapping_margin
                    && (group.y - valid_y).abs() < self.snapping_margin
                {
                    return Some(GroupSnapping {
                        target,
                        position: Point::new(valid_x, valid_y),
                    });
                }
            }
        }
        None
    }

    fn merge_groups(&mut self, donor_id: GroupId, target_id: GroupId) {
        let Some(donor) = self.groups.get_mut(donor_id).and_then(Option::take) else {
            return;
        };
        let donated: Vec<usize> = donor.pieces().iter().map(|piece| piece.id).collect();
        let Some(target) = self
            .groups
            .get_mut(target_id)
            .and_then(|slot| slot.as_mut())
        else {
            self.groups[donor_id] = Some(donor);
            return;
        };
        target.absorb(donor);
        for id in donated {
            self.group_of[id] = target_id;
        }
        self.z_order.retain(|id| *id != donor_id);
    }

    fn check_if_finished(&mut self, now_ms: f64) {
        if self.solved {
            return;
        }
        let all_locked = self
            .z_order
            .iter()
            .all(|id| self.group(*id).map(|group| group.is_locked()).unwrap_or(false));
        if !all_locked {
            return;
        }
        self.solved = true;
        self.stop_play_time(now_ms);
        self.events.push(EngineEvent::Finished {
            play_time_ms: self.play_time_ms,
        });
    }

    fn start_viewport_dragging(&mut self) {
        let Some(pointer) = self.first_pointer() else {
            return;
        };
        self.viewport_drag = Some(PanStart {
            drag_origin: pointer.position,
            viewport_origin: Point::new(self.viewport.x, self.viewport.y),
        });
    }

    fn compute_viewport_dragging(&mut self) {
        let Some(drag) = self.viewport_drag else {
            return;
        };
        let Some(pointer) = self.first_pointer() else {
            return;
        };
        self.viewport.x =
            (drag.viewport_origin.x + pointer.position.x - drag.drag_origin.x).round();
        self.viewport.y =
            (drag.viewport_origin.y + pointer.position.y - drag.drag_origin.y).round();
        self.dirty = true;
    }

    fn start_viewport_pinching(&mut self) {
        let origin = self.pointers_center();
        self.pinch = Some(PinchStart {
            origin,
            mean_distance: self.pointers_mean_distance_to(origin),
            viewport_origin: Point::new(self.viewport.x, self.viewport.y),
            viewport_scale: self.viewport.scale,
        });
    }

    fn compute_pinch_to_zoom(&mut self) {
        let Some(pinch) = self.pinch else {
            return;
        };
        if pinch.mean_distance <= 0.0 {
            return;
        }
        let center = self.pointers_center();
        let mean_distance = self.pointers_mean_distance_to(center);

        let factor =
            clamped_scale_factor(pinch.viewport_scale, mean_distance / pinch.mean_distance);
        self.viewport.scale = pinch.viewport_scale * factor;

        let new_position = Point::new(
            pinch.viewport_origin.x + center.x - pinch.origin.x,
            pinch.viewport_origin.y + center.y - pinch.origin.y,
        );
        let pinch_center = Point::new(center.x - new_position.x, center.y - new_position.y);
        self.viewport.x = (new_position.x - (pinch_center.x * factor - pinch_center.x)).round();
        self.viewport.y = (new_position.y - (pinch_center.y * factor - pinch_center.y)).round();
        self.dirty = true;
    }

    fn pointers_center(&self) -> Point {
        let count = self.captured.len().max(1) as f32;
        let mut center = Point::default();
        for pointer in self.captured.values() {
            center.x += pointer.position.x;
            center.y += pointer.position.y;
        }
        Point::new(center.x / count, center.y / count)
    }

    fn pointers_mean_distance_to(&self, point: Point) -> f32 {
        let count = self.captured.len().max(1) as f32;
        let mut mean = 0.0;
        for pointer in self.captured.values() {
            mean += (pointer.position.x - point.x).hypot(pointer.position.y - point.y);
        }
        mean / count
    }

    fn group_mut(&mut self, id: GroupId) -> Option<&mut PieceGroup> {
        self.groups.get_mut(id).and_then(|slot| slot.as_mut())
    }

    fn move_group_to_top(&mut self, id: GroupId) {
        self.z_order.retain(|candidate| *candidate != id);
        self.z_order.push(id);
    }

    fn move_group_to_bottom(&mut self, id: GroupId) {
        self.z_order.retain(|candidate| *candidate != id);
        self.z_order.insert(0, id);
    }
}

struct GroupSnapping {
    target: GroupId,
    position: Point,
}

pub fn clamped_scale(target: f32) -> f32 {
    target.clamp(MIN_VIEWPORT_SCALE, MAX_VIEWPORT_SCALE)
}

pub fn clamped_scale_factor(current_scale: f32, factor: f32) -> f32 {
    clamped_scale(current_scale * factor) / current_scale
}
