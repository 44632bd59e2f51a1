// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame scheduling.
//!
//! The engine never sleeps or spawns anything. When an animation or a fling
//! needs another frame, it posts a [`FrameTask`] to its [`Scheduler`]; the
//! host runs the task later by calling
//! [`ZoomEngine::run_frame`](crate::ZoomEngine::run_frame) with the current
//! time.
//!
//! [`QueueScheduler`] is a plain FIFO for hosts that pump frames themselves,
//! and for tests.

use alloc::collections::VecDeque;

/// Work the engine asks to run later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameTask {
    /// Step the running transform animations.
    Animation,
    /// Step the running fling.
    Fling,
}

/// Host hook for deferred work.
///
/// Every posted task must eventually be handed back to the engine. The engine
/// keeps at most one task of each kind in flight and will not post another
/// until the outstanding one has run.
pub trait Scheduler {
    /// Runs `task` as soon as possible.
    fn post(&mut self, task: FrameTask);

    /// Runs `task` on the next display frame.
    fn post_on_animation(&mut self, task: FrameTask);
}

/// FIFO of posted tasks, drained by the host.
#[derive(Clone, Debug, Default)]
pub struct QueueScheduler {
    queue: VecDeque<FrameTask>,
}

impl QueueScheduler {
    /// Takes the oldest pending task.
    pub fn pop(&mut self) -> Option<FrameTask> {
        self.queue.pop_front()
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Scheduler for QueueScheduler {
    fn post(&mut self, task: FrameTask) {
        self.queue.push_back(task);
    }

    fn post_on_animation(&mut self, task: FrameTask) {
        self.queue.push_back(task);
    }
}
