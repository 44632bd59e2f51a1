// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests for `ZoomEngine`.
//!
//! Touch streams are synthesized by hand and frames are pumped from a
//! `QueueScheduler` with a fake 60 Hz clock.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Size};
use understory_zoom::{
    Alignment, MatrixUpdate, PanChange, QueueScheduler, ScaledPoint, TouchAction, TouchEvent,
    TouchPointer, TransformState, Transformation, ZoomChange, ZoomEngine, ZoomListener, ZoomState,
};

type Engine = ZoomEngine<QueueScheduler>;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// 1000×1000 content in a 500×500 container, fitted inside.
fn fitted() -> Engine {
    let mut engine = ZoomEngine::new(QueueScheduler::default());
    engine.set_content_size(Size::new(1000.0, 1000.0), false);
    engine.set_container_size(Size::new(500.0, 500.0), false);
    engine
}

/// 1000×1000 content at its natural size in a 500×500 container, centered.
fn natural() -> Engine {
    let mut engine = ZoomEngine::new(QueueScheduler::default());
    engine.set_transformation(Transformation::None, None);
    engine.set_content_size(Size::new(1000.0, 1000.0), false);
    engine.set_container_size(Size::new(500.0, 500.0), false);
    engine
}

/// Runs frames until the scheduler is empty, calling `each` after every one.
fn pump(engine: &mut Engine, mut now: u64, mut each: impl FnMut(&Engine)) -> u64 {
    let mut frames = 0;
    while let Some(task) = engine.scheduler_mut().pop() {
        engine.run_frame(task, now);
        each(engine);
        now += 16;
        frames += 1;
        assert!(frames < 1000);
    }
    now
}

fn one(action: TouchAction, x: f64, y: f64, time_ms: u64) -> TouchEvent {
    TouchEvent::single(action, Point::new(x, y), time_ms)
}

fn two(action: TouchAction, a: (f64, f64), b: (f64, f64), time_ms: u64) -> TouchEvent {
    TouchEvent::new(
        action,
        [
            TouchPointer::new(0, Point::new(a.0, a.1)),
            TouchPointer::new(1, Point::new(b.0, b.1)),
        ],
        time_ms,
    )
}

fn content_under(engine: &Engine, point: Point) -> Point {
    engine.matrix().inverse() * point
}

#[derive(Default)]
struct Log {
    updates: usize,
    idles: usize,
}

struct Recorder(Rc<RefCell<Log>>);

impl ZoomListener for Recorder {
    fn on_update(&mut self, _: &TransformState) {
        self.0.borrow_mut().updates += 1;
    }

    fn on_idle(&mut self, _: &TransformState) {
        self.0.borrow_mut().idles += 1;
    }
}

#[test]
fn first_layout_fits_content_inside() {
    let engine = fitted();
    assert!(engine.is_initialized());
    assert_eq!(engine.transformation_zoom(), 0.5);
    assert_eq!(engine.zoom(), 1.0);
    assert_eq!(engine.real_zoom(), 0.5);
    // Content fills the container exactly, so there is nothing to center.
    assert_eq!(engine.pan_x(), 0.0);
    assert_eq!(engine.pan_y(), 0.0);
    let rect = engine.content_scaled_rect();
    assert_eq!((rect.x0, rect.y0, rect.x1, rect.y1), (0.0, 0.0, 500.0, 500.0));
    assert_eq!(engine.compute_horizontal_scroll_range(), 500.0);
    assert_eq!(engine.compute_vertical_scroll_offset(), 0.0);
    assert_eq!(engine.state(), ZoomState::Idle);
}

#[test]
fn logical_zoom_keeps_the_center_in_place() {
    let mut engine = fitted();
    let center = Point::new(250.0, 250.0);
    let before = content_under(&engine, center);
    engine.zoom_to(2.0, false);
    assert!(close(engine.real_zoom(), 1.0));
    assert!(close(engine.zoom(), 2.0));
    let after = content_under(&engine, center);
    assert!(close(before.x, after.x) && close(before.y, after.y));
    assert!(close(engine.compute_horizontal_scroll_offset(), 250.0));
    assert!(close(engine.compute_horizontal_scroll_range(), 1000.0));
}

#[test]
fn loose_content_is_pulled_back_to_its_nearest_edge() {
    let mut engine = ZoomEngine::new(QueueScheduler::default());
    engine.set_transformation(Transformation::None, None);
    engine.set_alignment(Alignment::NONE);
    engine.set_content_size(Size::new(300.0, 300.0), false);
    engine.set_container_size(Size::new(500.0, 500.0), false);
    // Without alignment, first layout centers.
    assert_eq!((engine.pan_x(), engine.pan_y()), (100.0, 100.0));

    engine.pan_to(-50.0, 120.0, false);
    assert_eq!(engine.pan_x(), 0.0);
    assert_eq!(engine.pan_y(), 120.0);

    engine.pan_by(500.0, 0.0, false);
    assert_eq!(engine.pan_x(), 200.0);
}

#[test]
fn move_to_sets_zoom_and_pan_together() {
    let mut engine = natural();
    engine.move_to(2.0, -100.0, -150.0, false);
    assert!(close(engine.zoom(), 2.0));
    assert!(close(engine.pan_x(), -100.0));
    assert!(close(engine.pan_y(), -150.0));
    let scaled = engine.scaled_pan();
    assert!(close(scaled.x, -200.0) && close(scaled.y, -300.0));
}

#[test]
fn api_zoom_is_clamped_to_bounds() {
    let mut engine = fitted();
    engine.zoom_to(10.0, false);
    assert!(close(engine.zoom(), 2.5));
    engine.zoom_out();
    let end = pump(&mut engine, 0, |_| {});
    assert!(end > 0);
    assert!(close(engine.zoom(), 2.5 * 0.7));
    engine.zoom_in();
    pump(&mut engine, end, |_| {});
    assert!(close(engine.zoom(), 2.5 * 0.7 * 1.3));
}

#[test]
fn listeners_see_updates_and_idle() {
    let mut engine = fitted();
    let log = Rc::new(RefCell::new(Log::default()));
    let id = engine.add_listener(Recorder(log.clone()));

    engine.zoom_to(2.0, true);
    pump(&mut engine, 0, |_| {});
    let frames = log.borrow().updates;
    assert!(frames > 2);
    assert_eq!(log.borrow().idles, 1);

    assert!(engine.remove_listener(id));
    engine.zoom_to(1.0, false);
    assert_eq!(log.borrow().updates, frames);
}

#[test]
fn fling_stays_within_the_cushion_and_settles_on_the_edge() {
    let mut engine = natural();
    assert_eq!(engine.scaled_pan().x, -250.0);

    assert!(engine.on_touch_event(&one(TouchAction::Down, 250.0, 250.0, 0)));
    engine.on_touch_event(&one(TouchAction::Move, 260.0, 250.0, 10));
    assert_eq!(engine.state(), ZoomState::Scrolling);
    engine.on_touch_event(&one(TouchAction::Move, 300.0, 250.0, 20));
    engine.on_touch_event(&one(TouchAction::Move, 340.0, 250.0, 30));
    assert!(close(engine.scaled_pan().x, -160.0));

    engine.on_touch_event(&one(TouchAction::Up, 380.0, 250.0, 40));
    assert_eq!(engine.state(), ZoomState::Flinging);

    let mut furthest = f64::NEG_INFINITY;
    pump(&mut engine, 50, |engine| {
        let x = engine.scaled_pan().x;
        // Over-pan is 10% of the container.
        assert!((-550.0..=50.0).contains(&x));
        assert!(close(engine.scaled_pan().y, -250.0));
        furthest = furthest.max(x);
    });
    assert!(furthest > 0.0);
    assert_eq!(engine.state(), ZoomState::Idle);
    assert!(close(engine.scaled_pan().x, 0.0));
}

#[test]
fn disabled_fling_leaves_the_content_where_the_drag_ended() {
    let mut engine = natural();
    engine.set_fling_enabled(false);
    engine.on_touch_event(&one(TouchAction::Down, 250.0, 250.0, 0));
    engine.on_touch_event(&one(TouchAction::Move, 260.0, 250.0, 10));
    engine.on_touch_event(&one(TouchAction::Move, 300.0, 250.0, 20));
    engine.on_touch_event(&one(TouchAction::Up, 340.0, 250.0, 30));
    assert_eq!(engine.state(), ZoomState::Idle);
    assert!(engine.scheduler().is_empty());
    assert!(close(engine.scaled_pan().x, -200.0));
}

#[test]
fn over_scrolled_drag_springs_back_on_release() {
    let mut engine = natural();
    engine.on_touch_event(&one(TouchAction::Down, 100.0, 250.0, 0));
    engine.on_touch_event(&one(TouchAction::Move, 110.0, 250.0, 10));
    engine.on_touch_event(&one(TouchAction::Move, 360.0, 250.0, 20));
    assert!(close(engine.scaled_pan().x, 10.0));
    // Further out, the drag is damped.
    engine.on_touch_event(&one(TouchAction::Move, 400.0, 250.0, 30));
    let stretched = engine.scaled_pan().x;
    assert!(stretched > 10.0 && stretched < 30.0);

    // Rest, then lift without velocity.
    engine.on_touch_event(&one(TouchAction::Move, 400.0, 250.0, 200));
    assert!(engine.on_touch_event(&one(TouchAction::Up, 400.0, 250.0, 250)));
    assert_eq!(engine.state(), ZoomState::Animating);

    pump(&mut engine, 260, |engine| {
        let x = engine.scaled_pan().x;
        assert!(x <= stretched + 1e-9 && x >= -1e-6);
    });
    assert_eq!(engine.state(), ZoomState::Idle);
    assert!(close(engine.scaled_pan().x, 0.0));
    assert!(close(engine.scaled_pan().y, -250.0));
}

#[test]
fn pinch_takes_over_a_scroll_for_the_rest_of_the_stream() {
    let mut engine = natural();
    engine.on_touch_event(&one(TouchAction::Down, 200.0, 250.0, 0));
    engine.on_touch_event(&one(TouchAction::Move, 220.0, 250.0, 10));
    assert_eq!(engine.state(), ZoomState::Scrolling);
    assert!(close(engine.scaled_pan().x, -230.0));

    let focus = Point::new(270.0, 250.0);
    engine.on_touch_event(&two(TouchAction::PointerDown(1), (220.0, 250.0), (320.0, 250.0), 20));
    assert_eq!(engine.state(), ZoomState::Scrolling);
    let anchored = content_under(&engine, focus);

    let spans = [(200.0, 340.0), (180.0, 360.0), (150.0, 390.0), (160.0, 380.0)];
    for (i, (left, right)) in spans.into_iter().enumerate() {
        let time = 30 + 10 * i as u64;
        assert!(engine.on_intercept_touch_event(&two(
            TouchAction::Move,
            (left, 250.0),
            (right, 250.0),
            time
        )));
        assert_eq!(engine.state(), ZoomState::Pinching);
        // The scroll detector would have dragged the content; the pinch keeps
        // the anchored content point under the focus.
        let under = content_under(&engine, focus);
        assert!(close(under.x, anchored.x) && close(under.y, anchored.y));
    }
    assert!(close(engine.real_zoom(), 220.0 / 140.0));

    engine.on_touch_event(&two(TouchAction::PointerUp(1), (160.0, 250.0), (380.0, 250.0), 80));
    assert_eq!(engine.state(), ZoomState::Idle);
    engine.on_touch_event(&one(TouchAction::Up, 160.0, 250.0, 90));
    assert_eq!(engine.state(), ZoomState::Idle);
    assert!(engine.scheduler().is_empty());
}

#[test]
fn over_pinch_is_animated_back_to_the_maximum() {
    let mut engine = natural();
    engine.on_touch_event(&one(TouchAction::Down, 200.0, 250.0, 0));
    engine.on_touch_event(&two(TouchAction::PointerDown(1), (200.0, 250.0), (300.0, 250.0), 10));
    engine.on_touch_event(&two(TouchAction::Move, (150.0, 250.0), (350.0, 250.0), 20));
    assert_eq!(engine.state(), ZoomState::Pinching);
    engine.on_touch_event(&two(TouchAction::Move, (-200.0, 250.0), (700.0, 250.0), 30));
    // Max 2.5 plus 10% of the 0.8..2.5 range.
    assert!(close(engine.real_zoom(), 2.67));

    engine.on_touch_event(&two(TouchAction::PointerUp(1), (-200.0, 250.0), (700.0, 250.0), 40));
    assert_eq!(engine.state(), ZoomState::Animating);
    // Touches are swallowed while animating.
    assert!(engine.on_intercept_touch_event(&one(TouchAction::Up, -200.0, 250.0, 50)));

    pump(&mut engine, 60, |_| {});
    assert_eq!(engine.state(), ZoomState::Idle);
    assert!(close(engine.real_zoom(), 2.5));
    let center = content_under(&engine, Point::new(250.0, 250.0));
    assert!(close(center.x, 500.0) && close(center.y, 500.0));
}

#[test]
fn over_zoom_and_over_pan_settle_together() {
    let mut engine = natural();
    // Over-zoomed around the center, then pushed against the left edge.
    engine.apply_update(&MatrixUpdate::new().with_zoom(ZoomChange::To(3.0), true));
    assert!(close(engine.real_zoom(), 2.67));
    let y = engine.scaled_pan().y;
    engine.apply_update(
        &MatrixUpdate::new().with_pan(PanChange::ScaledTo(ScaledPoint::new(0.0, y)), false),
    );
    assert_eq!(engine.scaled_pan().x, 0.0);

    engine.on_touch_event(&one(TouchAction::Down, 100.0, 250.0, 0));
    engine.on_touch_event(&one(TouchAction::Move, 110.0, 250.0, 10));
    engine.on_touch_event(&one(TouchAction::Move, 130.0, 250.0, 20));
    assert!(engine.scaled_pan().x > 10.0);
    engine.on_touch_event(&one(TouchAction::Move, 130.0, 250.0, 200));
    engine.on_touch_event(&one(TouchAction::Up, 130.0, 250.0, 250));
    assert_eq!(engine.state(), ZoomState::Animating);

    pump(&mut engine, 260, |_| {});
    assert_eq!(engine.state(), ZoomState::Idle);
    assert!(close(engine.real_zoom(), 2.5));
    // Back on the left edge, and vertically shrunk around the center.
    let pan = engine.scaled_pan();
    assert!(close(pan.x, 0.0));
    assert!(close(pan.y, -1000.0));
}

#[test]
fn disabled_zoom_ignores_pinches() {
    let mut engine = natural();
    engine.set_zoom_enabled(false);
    engine.on_touch_event(&one(TouchAction::Down, 200.0, 250.0, 0));
    engine.on_touch_event(&two(TouchAction::PointerDown(1), (200.0, 250.0), (300.0, 250.0), 10));
    engine.on_touch_event(&two(TouchAction::Move, (150.0, 250.0), (350.0, 250.0), 20));
    engine.on_touch_event(&two(TouchAction::Move, (100.0, 250.0), (400.0, 250.0), 30));
    assert_ne!(engine.state(), ZoomState::Pinching);
    assert_eq!(engine.real_zoom(), 1.0);
}

#[test]
fn two_finger_drag_can_be_disabled() {
    let mut engine = natural();
    engine.set_two_finger_scroll_enabled(false);
    engine.on_touch_event(&one(TouchAction::Down, 200.0, 250.0, 0));
    engine.on_touch_event(&two(TouchAction::PointerDown(1), (200.0, 250.0), (300.0, 250.0), 10));
    // Both fingers move together: no span change, so no pinch either.
    engine.on_touch_event(&two(TouchAction::Move, (240.0, 250.0), (340.0, 250.0), 20));
    engine.on_touch_event(&two(TouchAction::Move, (280.0, 250.0), (380.0, 250.0), 30));
    assert_eq!(engine.state(), ZoomState::Idle);
    assert_eq!(engine.scaled_pan().x, -250.0);
}
