//! Display scaffolding: the display box, the cursor with its readout, and
//! axis scales.
//!
//! The display occupies the cube `[-1, 1]^3`. A [`DisplayRenderer`] owns
//! the scene nodes that frame the data: renderers and animation switches
//! hang their nodes under [`DisplayRenderer::data_group`].

use std::sync::Arc;

use glam::Vec3;
use visad_a3d_core::{
    GeometryArray, NodeId, NodePayload, Options, Result, ScalarMap, SceneGraph, TextLabel,
};

/// Half the width of the cursor cross.
const CURSOR_SIZE: f32 = 0.05;

/// Vertical spacing of cursor readout lines.
const READOUT_SPACING: f32 = 0.08;

/// Distance of a scale line from the box edge.
const SCALE_OFFSET: f32 = 0.1;

/// Length of a scale tick.
const TICK_LENGTH: f32 = 0.05;

/// Returns a "nice" tick interval for a value range.
///
/// Picks 0.2, 0.5, 1 or 2 times the range's power of ten.
pub fn tick_interval(range: f64) -> f64 {
    if !(range.is_finite() && range > 0.0) {
        return 1.0;
    }
    let magnitude = 10.0_f64.powf(range.log10().floor());
    let normalized = range / magnitude;

    let nice = if normalized <= 1.0 {
        0.2
    } else if normalized <= 2.0 {
        0.5
    } else if normalized <= 5.0 {
        1.0
    } else {
        2.0
    };

    nice * magnitude
}

/// Formats a tick value for its label.
pub fn format_tick_label(value: f64) -> String {
    if value.abs() < 0.001 {
        "0".to_string()
    } else if value.abs() >= 1000.0 || value.fract().abs() < 0.001 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// A labelled scale along one spatial axis of the display box.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    axis: usize,
    map: ScalarMap,
    color: [f32; 4],
}

impl AxisScale {
    /// Creates a scale for `map` along axis 0 (X), 1 (Y) or 2 (Z).
    pub fn new(axis: usize, map: ScalarMap) -> Self {
        Self {
            axis: axis.min(2),
            map,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    /// Sets the scale color.
    #[must_use]
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Returns the axis index.
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Returns the tick values, in scalar units, in increasing order.
    pub fn ticks(&self) -> Vec<f64> {
        let (min, max) = self.map.range().unwrap_or((-1.0, 1.0));
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let interval = tick_interval(hi - lo);
        let mut ticks = Vec::new();
        let mut value = (lo / interval).ceil() * interval;
        let limit = hi + interval * 1e-6;
        while value <= limit {
            ticks.push(value);
            value += interval;
        }
        ticks
    }

    /// Point on the scale line at display coordinate `t` along the axis.
    fn point(&self, t: f32, offset: f32) -> Vec3 {
        let edge = -1.0 - offset;
        match self.axis {
            0 => Vec3::new(t, edge, -1.0),
            1 => Vec3::new(edge, t, -1.0),
            _ => Vec3::new(edge, -1.0, t),
        }
    }

    /// Builds the scale line, ticks, tick labels and title.
    pub fn build(&self) -> GeometryArray {
        let mut geometry = GeometryArray {
            color: self.color,
            ..GeometryArray::default()
        };
        let baseline = if self.axis == 0 { Vec3::X } else { Vec3::Y };

        geometry.lines.push(self.point(-1.0, SCALE_OFFSET));
        geometry.lines.push(self.point(1.0, SCALE_OFFSET));

        for value in self.ticks() {
            let t = self.map.to_display(value);
            geometry.lines.push(self.point(t, SCALE_OFFSET));
            geometry.lines.push(self.point(t, SCALE_OFFSET + TICK_LENGTH));
            geometry.labels.push(TextLabel {
                text: format_tick_label(value),
                position: self.point(t, SCALE_OFFSET + 2.0 * TICK_LENGTH),
                baseline,
            });
        }

        geometry.labels.push(TextLabel {
            text: self.map.scalar_name().to_string(),
            position: self.point(0.0, SCALE_OFFSET + 4.0 * TICK_LENGTH),
            baseline,
        });
        geometry
    }
}

/// The twelve edges of the display box.
pub fn box_geometry(color: [f32; 4]) -> GeometryArray {
    let corner = |i: usize| {
        Vec3::new(
            if i & 1 == 0 { -1.0 } else { 1.0 },
            if i & 2 == 0 { -1.0 } else { 1.0 },
            if i & 4 == 0 { -1.0 } else { 1.0 },
        )
    };
    let mut lines = Vec::with_capacity(24);
    for i in 0..8 {
        for bit in [1, 2, 4] {
            if i & bit == 0 {
                lines.push(corner(i));
                lines.push(corner(i | bit));
            }
        }
    }
    GeometryArray {
        lines,
        color,
        ..GeometryArray::default()
    }
}

/// A cross at `position` followed by one label per readout line.
pub fn cursor_geometry(position: Vec3, readout: &[String], color: [f32; 4]) -> GeometryArray {
    let mut lines = Vec::with_capacity(6);
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        lines.push(position - axis * CURSOR_SIZE);
        lines.push(position + axis * CURSOR_SIZE);
    }
    #[allow(clippy::cast_precision_loss)]
    let labels = readout
        .iter()
        .enumerate()
        .map(|(i, text)| TextLabel {
            text: text.clone(),
            position: position
                + Vec3::new(2.0 * CURSOR_SIZE, -READOUT_SPACING * (i as f32 + 1.0), 0.0),
            baseline: Vec3::X,
        })
        .collect();
    GeometryArray {
        lines,
        labels,
        color,
        ..GeometryArray::default()
    }
}

/// Owns the scene nodes that frame a display.
#[derive(Debug)]
pub struct DisplayRenderer {
    root: NodeId,
    box_node: NodeId,
    cursor_node: NodeId,
    scales_node: NodeId,
    data_node: NodeId,
    box_visible: bool,
    cursor_visible: bool,
    cursor: Option<Vec3>,
    readout: Vec<String>,
    scales: Vec<(AxisScale, NodeId)>,
    foreground: [f32; 4],
}

impl DisplayRenderer {
    /// Creates the display nodes under `parent`.
    pub fn new(scene: &mut SceneGraph, parent: NodeId, options: &Options) -> Result<Self> {
        let foreground = [1.0, 1.0, 1.0, 1.0];
        let root = scene.create_node("display", NodePayload::Group);
        scene.attach_child(parent, root)?;

        let box_node = scene.create_node("box", NodePayload::Empty);
        let cursor_node = scene.create_node("cursor", NodePayload::Empty);
        let scales_node = scene.create_node("scales", NodePayload::Group);
        let data_node = scene.create_node("data", NodePayload::Group);
        for node in [box_node, cursor_node, scales_node, data_node] {
            scene.attach_child(root, node)?;
        }

        let mut display = Self {
            root,
            box_node,
            cursor_node,
            scales_node,
            data_node,
            box_visible: false,
            cursor_visible: options.cursor_visible,
            cursor: None,
            readout: Vec::new(),
            scales: Vec::new(),
            foreground,
        };
        display.set_box_visible(scene, options.box_visible)?;
        log::debug!("display scaffolding created under {parent}");
        Ok(display)
    }

    /// Returns the display's root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the group data renderers attach to.
    pub fn data_group(&self) -> NodeId {
        self.data_node
    }

    /// Returns the box node.
    pub fn box_node(&self) -> NodeId {
        self.box_node
    }

    /// Returns the cursor node.
    pub fn cursor_node(&self) -> NodeId {
        self.cursor_node
    }

    /// Shows or hides the display box.
    pub fn set_box_visible(&mut self, scene: &mut SceneGraph, visible: bool) -> Result<()> {
        self.box_visible = visible;
        let payload = if visible {
            NodePayload::Geometry(Arc::new(box_geometry(self.foreground)))
        } else {
            NodePayload::Empty
        };
        scene.set_payload(self.box_node, payload)
    }

    /// Returns whether the box is drawn.
    pub fn box_visible(&self) -> bool {
        self.box_visible
    }

    /// Shows or hides the cursor.
    pub fn set_cursor_visible(&mut self, scene: &mut SceneGraph, visible: bool) -> Result<()> {
        self.cursor_visible = visible;
        self.rebuild_cursor(scene)
    }

    /// Moves the cursor.
    pub fn set_cursor(&mut self, scene: &mut SceneGraph, position: Vec3) -> Result<()> {
        self.cursor = Some(position);
        self.rebuild_cursor(scene)
    }

    /// Replaces the cursor readout lines.
    pub fn set_readout(&mut self, scene: &mut SceneGraph, readout: Vec<String>) -> Result<()> {
        self.readout = readout;
        self.rebuild_cursor(scene)
    }

    /// Returns the current readout lines.
    pub fn readout(&self) -> &[String] {
        &self.readout
    }

    fn rebuild_cursor(&mut self, scene: &mut SceneGraph) -> Result<()> {
        let payload = match self.cursor {
            Some(position) if self.cursor_visible => NodePayload::Geometry(Arc::new(
                cursor_geometry(position, &self.readout, self.foreground),
            )),
            _ => NodePayload::Empty,
        };
        scene.set_payload(self.cursor_node, payload)
    }

    /// Adds an axis scale, replacing any existing scale on the same axis.
    pub fn set_scale(&mut self, scene: &mut SceneGraph, scale: AxisScale) -> Result<()> {
        if let Some(pos) = self.scales.iter().position(|(s, _)| s.axis() == scale.axis()) {
            let (_, node) = self.scales.remove(pos);
            scene.remove_subtree(node)?;
        }
        let node = scene.create_node(
            format!("scale {}", scale.axis()),
            NodePayload::Geometry(Arc::new(scale.build())),
        );
        scene.attach_child(self.scales_node, node)?;
        self.scales.push((scale, node));
        Ok(())
    }

    /// Removes all axis scales.
    pub fn clear_scales(&mut self, scene: &mut SceneGraph) -> Result<()> {
        for (_, node) in self.scales.drain(..) {
            scene.remove_subtree(node)?;
        }
        Ok(())
    }

    /// Returns the number of axis scales.
    pub fn num_scales(&self) -> usize {
        self.scales.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visad_a3d_core::{DisplayRealType, RealType};

    #[test]
    fn test_tick_interval() {
        assert!((tick_interval(10.0) - 2.0).abs() < 1e-12);
        assert!((tick_interval(1.5) - 0.5).abs() < 1e-12);
        assert!((tick_interval(40.0) - 10.0).abs() < 1e-12);
        assert!((tick_interval(800.0) - 200.0).abs() < 1e-9);
        assert_eq!(tick_interval(0.0), 1.0);
    }

    #[test]
    fn test_format_tick_label() {
        assert_eq!(format_tick_label(0.0001), "0");
        assert_eq!(format_tick_label(20.0), "20");
        assert_eq!(format_tick_label(2.5), "2.5");
        assert_eq!(format_tick_label(1500.25), "1500");
    }

    #[test]
    fn test_axis_scale_ticks() {
        let map = ScalarMap::new(RealType::new("time"), DisplayRealType::XAxis).with_range(0.0, 10.0);
        let scale = AxisScale::new(0, map);
        let ticks = scale.ticks();
        assert_eq!(ticks.len(), 6);
        assert!((ticks[5] - 10.0).abs() < 1e-9);

        let geometry = scale.build();
        // base line plus one line per tick
        assert_eq!(geometry.lines.len(), 2 + 2 * 6);
        // one label per tick plus the title
        assert_eq!(geometry.labels.len(), 7);
        assert_eq!(geometry.labels[6].text, "time");
        assert!((geometry.lines[2].x + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_box_geometry() {
        let geometry = box_geometry([1.0; 4]);
        assert_eq!(geometry.lines.len(), 24);
        for pair in geometry.lines.chunks(2) {
            assert!(((pair[1] - pair[0]).length() - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cursor_readout() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let mut display = DisplayRenderer::new(&mut scene, root, &Options::default()).unwrap();
        assert_eq!(scene.num_children(display.root()).unwrap(), 4);
        assert!(display.box_visible());

        // hidden until placed
        assert!(scene.node(display.cursor_node()).unwrap().geometry().is_none());
        display.set_cursor(&mut scene, Vec3::new(0.1, 0.2, 0.0)).unwrap();
        display
            .set_readout(&mut scene, vec!["u = 5 m/s".into(), "v = 0 m/s".into()])
            .unwrap();
        let cursor = scene.node(display.cursor_node()).unwrap().geometry().unwrap().clone();
        assert_eq!(cursor.lines.len(), 6);
        assert_eq!(cursor.labels.len(), 2);
        assert_eq!(cursor.labels[1].text, "v = 0 m/s");

        display.set_cursor_visible(&mut scene, false).unwrap();
        assert!(scene.node(display.cursor_node()).unwrap().geometry().is_none());
    }

    #[test]
    fn test_scales_replace_per_axis() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let mut display = DisplayRenderer::new(&mut scene, root, &Options::default()).unwrap();
        let map = ScalarMap::new(RealType::new("x"), DisplayRealType::XAxis);
        display.set_scale(&mut scene, AxisScale::new(0, map.clone())).unwrap();
        display.set_scale(&mut scene, AxisScale::new(0, map.clone())).unwrap();
        display.set_scale(&mut scene, AxisScale::new(1, map)).unwrap();
        assert_eq!(display.num_scales(), 2);
        let before = scene.len();
        display.clear_scales(&mut scene).unwrap();
        assert_eq!(scene.len(), before - 2);

        display.set_box_visible(&mut scene, false).unwrap();
        assert!(scene.node(display.box_node()).unwrap().geometry().is_none());
    }
}
