//! The render engine context.
//!
//! One [`RenderEngineContext`] is created at startup and passed to whatever
//! needs the frame clock or the scene. It is the only writer of the
//! [`SceneGraph`]: other threads enqueue [`SceneTask`]s through a
//! [`SceneHandle`], and the tasks run in submission order at the start of
//! the next frame.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::error::{Result, VisadError};
use crate::options::Options;
use crate::scene::SceneGraph;

/// A deferred scene mutation.
pub type SceneTask = Box<dyn FnOnce(&mut SceneGraph) + Send>;

/// Cloneable, thread-safe handle for enqueueing scene mutations.
#[derive(Clone)]
pub struct SceneHandle {
    sender: Sender<SceneTask>,
}

impl SceneHandle {
    /// Enqueues a mutation to run on the render thread.
    pub fn submit<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce(&mut SceneGraph) + Send + 'static,
    {
        self.sender
            .send(Box::new(task))
            .map_err(|_| VisadError::EngineClosed)
    }
}

impl std::fmt::Debug for SceneHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneHandle").finish_non_exhaustive()
    }
}

/// Frame counter and accumulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    interval: Duration,
    frame: u64,
    elapsed: Duration,
}

impl FrameClock {
    /// Creates a clock with the given cadence.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            frame: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Returns the nominal frame interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the number of completed frames.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Returns the total time advanced.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn advance(&mut self, dt: Duration) {
        self.frame += 1;
        self.elapsed += dt;
    }
}

/// Summary of one render-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Index of the frame just completed.
    pub frame: u64,
    /// Number of queued scene tasks applied.
    pub tasks_applied: usize,
}

/// Process-wide render state, passed explicitly to components.
pub struct RenderEngineContext {
    options: Options,
    scene: SceneGraph,
    clock: FrameClock,
    sender: Sender<SceneTask>,
    receiver: Receiver<SceneTask>,
}

impl RenderEngineContext {
    /// Creates a context with an empty scene.
    pub fn new(options: Options) -> Self {
        let (sender, receiver) = mpsc::channel();
        let clock = FrameClock::new(options.frame_interval());
        Self {
            options,
            scene: SceneGraph::new(),
            clock,
            sender,
            receiver,
        }
    }

    /// Returns the display options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the display options for editing.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Returns the scene graph.
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Returns the scene graph for direct mutation on the render thread.
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    /// Returns the frame clock.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Returns a handle other threads use to enqueue scene mutations.
    pub fn handle(&self) -> SceneHandle {
        SceneHandle {
            sender: self.sender.clone(),
        }
    }

    /// Applies all queued scene tasks and advances the clock by `dt`.
    pub fn run_frame(&mut self, dt: Duration) -> FrameStats {
        let mut tasks_applied = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task(&mut self.scene);
            tasks_applied += 1;
        }
        self.clock.advance(dt);
        if tasks_applied > 0 {
            log::trace!(
                "frame {}: applied {} scene task(s)",
                self.clock.frame(),
                tasks_applied
            );
        }
        FrameStats {
            frame: self.clock.frame(),
            tasks_applied,
        }
    }

    /// Runs one frame at the nominal cadence.
    pub fn tick(&mut self) -> FrameStats {
        let dt = self.clock.interval();
        self.run_frame(dt)
    }
}

impl std::fmt::Debug for RenderEngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderEngineContext")
            .field("options", &self.options)
            .field("clock", &self.clock)
            .field("nodes", &self.scene.len())
            .finish_non_exhaustive()
    }
}
