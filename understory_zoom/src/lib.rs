// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_zoom --heading-base-level=0

//! Understory Zoom: a headless pan and zoom engine for touch surfaces.
//!
//! [`ZoomEngine`] keeps a content rectangle inside a container (viewport)
//! through a uniform scale plus translation. It:
//! - Fits the content on first layout ([`Transformation`]) and rests small
//!   content by its [`Alignment`].
//! - Recognizes pinch, scroll and fling gestures from raw [`TouchEvent`]s.
//! - Keeps pan and zoom within bounds, letting gestures stretch past them by
//!   a configurable amount and animating back afterwards.
//! - Arbitrates between gestures and animations with a small state machine
//!   ([`StateController`]), so that only one of them moves the content at a
//!   time.
//! - Notifies [`ZoomListener`]s of every transform change.
//!
//! It does **not** render, own a clock or spawn anything. Hosts feed it sizes
//! and touch events, read back the transform, and run the frame tasks it
//! posts to its [`Scheduler`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Size;
//! use understory_zoom::{QueueScheduler, ZoomEngine, ZoomState};
//!
//! let mut engine = ZoomEngine::new(QueueScheduler::default());
//! engine.set_container_size(Size::new(500.0, 500.0), false);
//! engine.set_content_size(Size::new(1000.0, 1000.0), false);
//!
//! // Fitted inside the container at half size; that is logical zoom 1.
//! assert_eq!(engine.transformation_zoom(), 0.5);
//! assert_eq!(engine.zoom(), 1.0);
//!
//! engine.zoom_to(2.0, true);
//! assert_eq!(engine.state(), ZoomState::Animating);
//!
//! // Pump frames with a fake 60 Hz clock.
//! let mut now = 0;
//! while let Some(task) = engine.scheduler_mut().pop() {
//!     engine.run_frame(task, now);
//!     now += 16;
//! }
//! assert_eq!(engine.state(), ZoomState::Idle);
//! assert!((engine.real_zoom() - 1.0).abs() < 1e-9);
//! ```
//!
//! ## Coordinates
//!
//! Pans come in two flavors: [`AbsolutePoint`] in content units and
//! [`ScaledPoint`] in container pixels. Zooms come in two units as well,
//! see [`ZoomType`].
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. Enable the `libm` feature and
//! disable default features to build without `std`.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade. Nothing is printed unless the
//! host installs a logger.

#![no_std]

extern crate alloc;

mod alignment;
mod animation;
mod dispatch;
mod engine;
mod event;
mod fling;
mod gestures;
mod matrix;
mod pan;
mod point;
mod provider;
mod scheduler;
mod state;
mod update;
mod zoom;

pub use alignment::{Alignment, Axis, Gravity, Transformation};
pub use animation::DEFAULT_ANIMATION_DURATION_MS;
pub use dispatch::{ListenerId, ZoomListener};
pub use engine::ZoomEngine;
pub use event::{TouchAction, TouchEvent, TouchPointer};
pub use fling::{FlingAxis, FlingScroller};
pub use gestures::scroll_fling::ScrollFingers;
pub use matrix::TransformState;
pub use point::{AbsolutePoint, ScaledPoint};
pub use provider::{
    DEFAULT_OVER_PAN_FACTOR, DEFAULT_OVER_ZOOM_FACTOR, DefaultOverPanRange, DefaultOverZoomRange,
    OverPanRangeProvider, OverZoomRangeProvider, ZoomDirection, ZoomLimits,
};
pub use scheduler::{FrameTask, QueueScheduler, Scheduler};
pub use state::{StateCallback, StateController, TouchCallback, TouchResult, ZoomState};
pub use update::{MatrixUpdate, PanChange, ZoomChange};
pub use zoom::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, ZoomConfigError, ZoomType};
