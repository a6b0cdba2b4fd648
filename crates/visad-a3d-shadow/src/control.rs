//! Animation control: which frame of an animation switch is visible.

use std::time::Duration;

use visad_a3d_core::{NodeId, Options, Result, SceneGraph};

/// Steps through the frames under an animation switch node.
#[derive(Debug, Clone)]
pub struct AnimationControl {
    switch: NodeId,
    current: usize,
    frame_count: usize,
    running: bool,
    forward: bool,
    step: Duration,
    accumulated: Duration,
}

impl AnimationControl {
    /// Creates a stopped control for `switch`.
    pub fn new(switch: NodeId, options: &Options) -> Self {
        Self {
            switch,
            current: 0,
            frame_count: 0,
            running: false,
            forward: true,
            step: options.animation_step(),
            accumulated: Duration::ZERO,
        }
    }

    /// Returns the controlled switch node.
    pub fn switch_node(&self) -> NodeId {
        self.switch
    }

    /// Returns the visible frame index.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Returns the number of frames.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Returns whether the animation is playing.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Sets the time each frame stays on screen.
    pub fn set_step(&mut self, step: Duration) {
        self.step = step.max(Duration::from_millis(1));
    }

    /// Sets the playback direction.
    pub fn set_forward(&mut self, forward: bool) {
        self.forward = forward;
    }

    /// Starts or stops playback.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
        self.accumulated = Duration::ZERO;
    }

    /// Re-reads the frame count from the scene and shows the current frame,
    /// clamped to the new count.
    pub fn refresh(&mut self, scene: &mut SceneGraph) -> Result<()> {
        self.frame_count = scene.num_children(self.switch)?;
        self.current = self.current.min(self.frame_count.saturating_sub(1));
        self.apply(scene)
    }

    /// Shows frame `index`, wrapped into range.
    pub fn set_current(&mut self, scene: &mut SceneGraph, index: usize) -> Result<()> {
        if self.frame_count > 0 {
            self.current = index % self.frame_count;
        }
        self.apply(scene)
    }

    /// Shows the next frame, wrapping to the first.
    pub fn step_forward(&mut self, scene: &mut SceneGraph) -> Result<()> {
        let next = self.current + 1;
        self.set_current(scene, next)
    }

    /// Shows the previous frame, wrapping to the last.
    pub fn step_backward(&mut self, scene: &mut SceneGraph) -> Result<()> {
        let previous = if self.current == 0 {
            self.frame_count.saturating_sub(1)
        } else {
            self.current - 1
        };
        self.set_current(scene, previous)
    }

    /// Advances playback by `dt` of render time. Returns the number of
    /// frame steps taken.
    pub fn advance(&mut self, scene: &mut SceneGraph, dt: Duration) -> Result<usize> {
        if !self.running || self.frame_count == 0 {
            return Ok(0);
        }
        self.accumulated += dt;
        let mut steps = 0;
        while self.accumulated >= self.step {
            self.accumulated -= self.step;
            if self.forward {
                self.step_forward(scene)?;
            } else {
                self.step_backward(scene)?;
            }
            steps += 1;
        }
        Ok(steps)
    }

    fn apply(&self, scene: &mut SceneGraph) -> Result<()> {
        let which = (self.frame_count > 0).then_some(self.current);
        scene.set_switch(self.switch, which)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visad_a3d_core::NodePayload;

    fn animation(frames: usize) -> (SceneGraph, AnimationControl) {
        let mut scene = SceneGraph::new();
        let switch = scene.create_node("animation", NodePayload::Switch { which: None });
        scene.attach_child(scene.root(), switch).unwrap();
        for i in 0..frames {
            let frame = scene.create_node(format!("frame {i}"), NodePayload::Group);
            scene.attach_child(switch, frame).unwrap();
        }
        let mut control = AnimationControl::new(switch, &Options::default());
        control.refresh(&mut scene).unwrap();
        (scene, control)
    }

    fn which(scene: &SceneGraph, control: &AnimationControl) -> Option<usize> {
        match scene.node(control.switch_node()).unwrap().payload() {
            NodePayload::Switch { which } => *which,
            _ => None,
        }
    }

    #[test]
    fn test_step_wraps() {
        let (mut scene, mut control) = animation(3);
        assert_eq!(which(&scene, &control), Some(0));
        control.step_backward(&mut scene).unwrap();
        assert_eq!(control.current(), 2);
        control.step_forward(&mut scene).unwrap();
        assert_eq!(control.current(), 0);
        assert_eq!(which(&scene, &control), Some(0));
    }

    #[test]
    fn test_timer_steps() {
        let (mut scene, mut control) = animation(4);
        control.set_step(Duration::from_millis(100));
        assert_eq!(control.advance(&mut scene, Duration::from_millis(250)).unwrap(), 0);

        control.set_running(true);
        assert_eq!(control.advance(&mut scene, Duration::from_millis(250)).unwrap(), 2);
        assert_eq!(control.current(), 2);
        assert_eq!(control.advance(&mut scene, Duration::from_millis(50)).unwrap(), 1);
        assert_eq!(which(&scene, &control), Some(3));

        control.set_forward(false);
        control.advance(&mut scene, Duration::from_millis(100)).unwrap();
        assert_eq!(control.current(), 2);
    }

    #[test]
    fn test_empty_animation() {
        let (mut scene, mut control) = animation(0);
        control.set_running(true);
        assert_eq!(control.advance(&mut scene, Duration::from_secs(1)).unwrap(), 0);
        control.step_forward(&mut scene).unwrap();
        assert_eq!(which(&scene, &control), None);
    }

    #[test]
    fn test_refresh_clamps() {
        let (mut scene, mut control) = animation(5);
        control.set_current(&mut scene, 4).unwrap();
        let switch = control.switch_node();
        let removed = scene.child(switch, 4).unwrap();
        scene.remove_subtree(removed).unwrap();
        control.refresh(&mut scene).unwrap();
        assert_eq!(control.frame_count(), 4);
        assert_eq!(control.current(), 3);
    }
}
