use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::render::{request_animation_frame, AnimationFrame};
use js_sys::Date;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Event, HtmlCanvasElement, ImageBitmap, MouseEvent,
    PointerEvent, WheelEvent,
};

use kakera_core::engine::{EngineEvent, ManipulationKind, PuzzleEngine, ViewportState};
use kakera_core::geometry::Point;
use kakera_core::sheet::BuildError;

const GAME_BACKGROUND_COLOR: &str = "#262524";
const PUZZLE_BACKGROUND_COLOR: &str = "#1a1918";
const BORDER_THICKNESS: f64 = 3.0;

pub struct GameView {
    state: Rc<ViewState>,
}

struct ViewState {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    engine: RefCell<PuzzleEngine>,
    images: Vec<ImageBitmap>,
    listeners: RefCell<Vec<EventListener>>,
    raf: RefCell<Option<AnimationFrame>>,
    on_finish: RefCell<Option<Box<dyn Fn(f64)>>>,
}

impl GameView {
    pub fn new(
        canvas: HtmlCanvasElement,
        engine: PuzzleEngine,
        images: Vec<ImageBitmap>,
    ) -> Result<Self, BuildError> {
        let context = canvas
            .get_context("2d")
            .map_err(|_| BuildError::ContextUnavailable)?
            .ok_or(BuildError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| BuildError::ContextUnavailable)?;
        Ok(Self {
            state: Rc::new(ViewState {
                canvas,
                context,
                engine: RefCell::new(engine),
                images,
                listeners: RefCell::new(Vec::new()),
                raf: RefCell::new(None),
                on_finish: RefCell::new(None),
            }),
        })
    }

    pub fn set_on_finish(&self, callback: impl Fn(f64) + 'static) {
        *self.state.on_finish.borrow_mut() = Some(Box::new(callback));
    }

    pub fn start(&self, document: &Document) {
        let state = &self.state;
        state.resize_to_parent();
        state
            .engine
            .borrow_mut()
            .start_play_time(Date::now(), document.hidden());
        state.sync_attributes();
        ViewState::attach_listeners(state, document);
        state.schedule_render();
    }
}

impl ViewState {
    fn attach_listeners(state: &Rc<Self>, document: &Document) {
        let mut listeners = Vec::new();
        let target = state.canvas.clone();

        let view = state.clone();
        listeners.push(EventListener::new(&target, "pointerdown", move |event| {
            view.on_pointer_down(event);
        }));
        let view = state.clone();
        listeners.push(EventListener::new(&target, "pointermove", move |event| {
            view.on_pointer_move(event);
        }));
        let view = state.clone();
        listeners.push(EventListener::new(&target, "pointerup", move |event| {
            view.on_pointer_up(event);
        }));
        let view = state.clone();
        listeners.push(EventListener::new(&target, "pointercancel", move |event| {
            view.on_pointer_up(event);
        }));
        let view = state.clone();
        listeners.push(EventListener::new(&target, "pointerleave", move |_| {
            view.engine.borrow_mut().pointer_leave();
            view.after_input();
        }));

        let view = state.clone();
        listeners.push(EventListener::new_with_options(
            &target,
            "wheel",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                view.on_wheel(event);
            },
        ));
        listeners.push(EventListener::new_with_options(
            &target,
            "contextmenu",
            EventListenerOptions::enable_prevent_default(),
            |event| {
                event.prevent_default();
            },
        ));

        let view = state.clone();
        let visibility_document = document.clone();
        listeners.push(EventListener::new(document, "visibilitychange", move |_| {
            view.engine
                .borrow_mut()
                .set_hidden(visibility_document.hidden(), Date::now());
        }));

        if let Some(window) = web_sys::window() {
            let view = state.clone();
            listeners.push(EventListener::new(&window, "resize", move |_| {
                view.resize_to_parent();
                view.schedule_render();
            }));
        }

        *state.listeners.borrow_mut() = listeners;
    }

    fn canvas_position(&self, event: &MouseEvent) -> Point {
        let rect = self.canvas.get_bounding_client_rect();
        Point::new(
            event.client_x() as f32 - rect.left() as f32,
            event.client_y() as f32 - rect.top() as f32,
        )
    }

    fn on_pointer_down(self: &Rc<Self>, event: &Event) {
        let Some(pointer) = event.dyn_ref::<PointerEvent>() else {
            return;
        };
        let _ = self.canvas.set_pointer_capture(pointer.pointer_id());
        let position = self.canvas_position(pointer);
        self.engine
            .borrow_mut()
            .pointer_down(pointer.pointer_id(), position, pointer.button());
        self.after_input();
    }

    fn on_pointer_move(self: &Rc<Self>, event: &Event) {
        let Some(pointer) = event.dyn_ref::<PointerEvent>() else {
            return;
        };
        let position = self.canvas_position(pointer);
        self.engine
            .borrow_mut()
            .pointer_move(pointer.pointer_id(), position);
        self.after_input();
    }

    fn on_pointer_up(self: &Rc<Self>, event: &Event) {
        let Some(pointer) = event.dyn_ref::<PointerEvent>() else {
            return;
        };
        let _ = self.canvas.release_pointer_capture(pointer.pointer_id());
        let position = self.canvas_position(pointer);
        self.engine
            .borrow_mut()
            .pointer_up(pointer.pointer_id(), position, Date::now());
        self.after_input();
    }

    fn on_wheel(self: &Rc<Self>, event: &Event) {
        let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
            return;
        };
        event.prevent_default();
        let position = self.canvas_position(wheel);
        self.engine
            .borrow_mut()
            .wheel(position, wheel.delta_y() as f32);
        self.after_input();
    }

    fn after_input(self: &Rc<Self>) {
        let (events, dirty) = {
            let mut engine = self.engine.borrow_mut();
            (engine.take_events(), engine.take_dirty())
        };
        for event in &events {
            match event {
                EngineEvent::StateChanged { .. } | EngineEvent::CanInteractChanged { .. } => {
                    self.sync_attributes();
                }
                EngineEvent::Finished { play_time_ms } => {
                    if let Some(callback) = &*self.on_finish.borrow() {
                        callback(*play_time_ms);
                    }
                }
            }
        }
        if dirty || !events.is_empty() {
            self.schedule_render();
        }
    }

    fn sync_attributes(&self) {
        let engine = self.engine.borrow();
        let state = match engine.state() {
            ViewportState::Idle => "idle",
            ViewportState::Interaction => "interaction",
            ViewportState::Manipulation => "manipulation",
        };
        let manipulation = match engine.manipulation() {
            Some(ManipulationKind::Pan) => "pan",
            Some(ManipulationKind::Pinch) => "pinch",
            None => "",
        };
        let _ = self.canvas.set_attribute("data-viewport-state", state);
        let _ = self
            .canvas
            .set_attribute("data-viewport-manipulation", manipulation);
        let _ = self.canvas.set_attribute(
            "data-can-interact",
            if engine.can_interact() { "true" } else { "false" },
        );
    }

    fn resize_to_parent(&self) {
        let width = self.canvas.client_width().max(1) as u32;
        let height = self.canvas.client_height().max(1) as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.engine.borrow_mut().fit(width as f32, height as f32);
    }

    fn schedule_render(self: &Rc<Self>) {
        if self.raf.borrow().is_some() {
            return;
        }
        let view = self.clone();
        *self.raf.borrow_mut() = Some(request_animation_frame(move |_| {
            view.raf.borrow_mut().take();
            view.render();
        }));
    }

    fn render(&self) {
        let engine = self.engine.borrow();
        let context = &self.context;
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;

        let _ = context.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        context.set_fill_style_str(GAME_BACKGROUND_COLOR);
        context.fill_rect(0.0, 0.0, width, height);

        let viewport = engine.viewport();
        let scale = viewport.scale as f64;
        let _ = context.set_transform(scale, 0.0, 0.0, scale, viewport.x as f64, viewport.y as f64);

        let (playable_width, playable_height) = engine.playable_area();
        if !engine.is_solved() {
            context.set_stroke_style_str(PUZZLE_BACKGROUND_COLOR);
            context.set_line_width(BORDER_THICKNESS / scale.max(1.0e-6));
            context.stroke_rect(0.0, 0.0, playable_width as f64, playable_height as f64);
        }

        let origin = engine.puzzle_origin();
        let (puzzle_width, puzzle_height) = engine.puzzle_size();
        context.set_fill_style_str(PUZZLE_BACKGROUND_COLOR);
        context.fill_rect(
            origin.x as f64,
            origin.y as f64,
            puzzle_width as f64,
            puzzle_height as f64,
        );

        let sprite = engine.sprite_size() as f64;
        let layout = &engine.sprite_source().layout;
        for id in engine.z_order() {
            let Some(group) = engine.group(*id) else {
                continue;
            };
            for piece in group.pieces() {
                let quadrant = layout.quadrant_of(piece.cell.0, piece.cell.1);
                let Some(image) = self.images.get(quadrant) else {
                    continue;
                };
                let (sx, sy) = layout.sprite_origin(piece.cell.0, piece.cell.1);
                let _ = context
                    .draw_image_with_image_bitmap_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                        image,
                        sx as f64,
                        sy as f64,
                        sprite,
                        sprite,
                        (origin.x + group.x + piece.x) as f64,
                        (origin.y + group.y + piece.y) as f64,
                        sprite,
                        sprite,
                    );
            }
        }
    }
}
