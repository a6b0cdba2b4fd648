//! Direct manipulation of flow vectors by dragging their glyphs.
//!
//! [`check_direct`] decides whether a tuple can be edited this way and
//! resolves which of its components feed the flow and spatial channels.
//! A [`DirectManipulationController`] then turns pointer drags into new
//! tuples written back to the glyph's [`DataReference`].

use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use visad_a3d_core::{
    DataReference, DataTuple, Diagnostics, DisplayMappings, DisplayRealType, DisplayTuple,
    DragEvent, DragMode, FlowCoordinateSystem, Ray, ScalarMap, VisadError,
};

use crate::barbs::BarbEnds;
use crate::error::{DirectManipulationError, DirectResult};

/// Data speed below which the captured direction is treated as undefined.
pub const EPS: f64 = 0.2;

/// Number of drag moves over which the pick offset decays to zero.
pub const OFFSET_COUNT_INIT: u32 = 30;

/// Which glyph a flow vector is drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarbKind {
    /// Wind barb; the pole points against the flow.
    #[default]
    Wind,
    /// Swell arrow; the shaft points along the flow.
    Swell,
}

impl BarbKind {
    /// Sign mapping glyph displacement (head minus tail) to flow direction.
    pub fn flow_sign(self) -> f32 {
        match self {
            BarbKind::Wind => -1.0,
            BarbKind::Swell => 1.0,
        }
    }
}

/// A tuple component feeding one display channel.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundComponent {
    /// Index of the component in the data tuple.
    pub index: usize,
    /// The map binding it to the display.
    pub map: ScalarMap,
}

/// Resolved flow and spatial components of a manipulable tuple.
#[derive(Clone)]
pub struct FlowBinding {
    tuple: DisplayTuple,
    flow: [Option<BoundComponent>; 3],
    spatial: [Option<BoundComponent>; 3],
    coordinate_system: Option<Arc<dyn FlowCoordinateSystem>>,
}

impl fmt::Debug for FlowBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowBinding")
            .field("tuple", &self.tuple)
            .field("flow", &self.flow)
            .field("spatial", &self.spatial)
            .field("coordinate_system", &self.coordinate_system)
            .finish()
    }
}

impl FlowBinding {
    /// Returns the flow display tuple.
    pub fn tuple(&self) -> DisplayTuple {
        self.tuple
    }

    /// Returns the flow components by channel.
    pub fn flow_components(&self) -> &[Option<BoundComponent>; 3] {
        &self.flow
    }

    /// Returns the spatial components by axis.
    pub fn spatial_components(&self) -> &[Option<BoundComponent>; 3] {
        &self.spatial
    }

    /// Reads the flow vector in the tuple's native representation.
    pub fn flow_native(&self, data: &DataTuple) -> Result<[f64; 3], VisadError> {
        let mut native = [0.0; 3];
        for (slot, bound) in native.iter_mut().zip(&self.flow) {
            if let Some(bound) = bound {
                *slot = data.component(bound.index)?.value;
            }
        }
        Ok(native)
    }

    /// Reads the flow vector in Cartesian reference coordinates.
    pub fn flow_reference(&self, data: &DataTuple) -> Result<[f64; 3], VisadError> {
        let native = self.flow_native(data)?;
        Ok(self.to_reference(native))
    }

    /// Reads the glyph station in display coordinates.
    pub fn station(&self, data: &DataTuple) -> Result<Vec3, VisadError> {
        let mut station = [0.0f32; 3];
        for (slot, bound) in station.iter_mut().zip(&self.spatial) {
            if let Some(bound) = bound {
                *slot = bound.map.to_display(data.component(bound.index)?.value);
            }
        }
        Ok(Vec3::from(station))
    }

    fn to_reference(&self, native: [f64; 3]) -> [f64; 3] {
        match &self.coordinate_system {
            Some(cs) => cs.to_reference(native),
            None => native,
        }
    }

    fn from_reference(&self, reference: [f64; 3]) -> [f64; 3] {
        match &self.coordinate_system {
            Some(cs) => cs.from_reference(reference),
            None => reference,
        }
    }
}

/// Checks whether `data` can be directly manipulated under `mappings`.
///
/// On success returns the resolved [`FlowBinding`]; on failure the error's
/// `Display` text is the reason shown to the user.
pub fn check_direct(mappings: &DisplayMappings, data: &DataTuple) -> DirectResult<FlowBinding> {
    let mut flow_tuple: Option<DisplayTuple> = None;
    let mut flow: [Option<BoundComponent>; 3] = [None, None, None];
    let mut spatial: [Option<BoundComponent>; 3] = [None, None, None];

    for (index, real_type) in data.real_types().enumerate() {
        let name = real_type.name();
        let mut flow_maps = mappings.flow_maps_for(name);
        if let Some(map) = flow_maps.next() {
            if flow_maps.next().is_some() {
                return Err(DirectManipulationError::AmbiguousMapping(format!(
                    "{name} is mapped to flow more than once"
                )));
            }
            let tuple = map.display().tuple();
            match flow_tuple {
                Some(existing) if existing != tuple => {
                    return Err(DirectManipulationError::AmbiguousMapping(format!(
                        "both {existing:?} and {tuple:?} claim flow channels"
                    )));
                }
                _ => flow_tuple = Some(tuple),
            }
            let channel = map.display().tuple_index().unwrap_or(0);
            if flow[channel].is_some() {
                return Err(DirectManipulationError::AmbiguousMapping(format!(
                    "{} is claimed by more than one scalar",
                    map.display()
                )));
            }
            flow[channel] = Some(BoundComponent {
                index,
                map: map.clone(),
            });
        }

        for map in mappings.maps_for(name).filter(|m| m.display().is_spatial()) {
            let display = map.display();
            if matches!(
                display,
                DisplayRealType::Latitude | DisplayRealType::Longitude | DisplayRealType::Radius
            ) {
                return Err(DirectManipulationError::NonCartesianSpatial(display));
            }
            let axis = display.tuple_index().unwrap_or(0);
            if spatial[axis].is_none() {
                spatial[axis] = Some(BoundComponent {
                    index,
                    map: map.clone(),
                });
            }
        }
    }

    let Some(tuple) = flow_tuple else {
        return Err(DirectManipulationError::InvalidMapping(
            "no components are mapped to flow".to_string(),
        ));
    };
    if flow.iter().flatten().count() < 2 {
        return Err(DirectManipulationError::InvalidMapping(format!(
            "{tuple:?} needs at least two mapped components"
        )));
    }
    if spatial.iter().all(Option::is_none) {
        return Err(DirectManipulationError::InvalidMapping(
            "no components are mapped to a spatial location".to_string(),
        ));
    }

    Ok(FlowBinding {
        tuple,
        flow,
        spatial,
        coordinate_system: mappings.flow_coordinate_system(tuple),
    })
}

/// Per-gesture state. Owned by one controller, never shared.
#[derive(Debug, Clone, Copy, Default)]
struct DragSession {
    active: bool,
    stopped: bool,
    refirst: bool,
    mode: DragMode,
    data_flow: [f64; 3],
    data_speed: f64,
    display_speed: f64,
    offset_count: u32,
}

/// Edits a flow vector by dragging the head of its glyph.
pub struct DirectManipulationController {
    binding: FlowBinding,
    kind: BarbKind,
    reference: Arc<dyn DataReference>,
    crawl_to_cursor: bool,
    plane_normal: Vec3,
    ends: Option<BarbEnds>,
    pick_offset: Vec3,
    session: DragSession,
}

impl fmt::Debug for DirectManipulationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectManipulationController")
            .field("reference", &self.reference.name())
            .field("kind", &self.kind)
            .field("ends", &self.ends)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl DirectManipulationController {
    /// Creates a controller for the glyph of `reference`.
    pub fn new(binding: FlowBinding, kind: BarbKind, reference: Arc<dyn DataReference>) -> Self {
        Self {
            binding,
            kind,
            reference,
            crawl_to_cursor: true,
            plane_normal: Vec3::Z,
            ends: None,
            pick_offset: Vec3::ZERO,
            session: DragSession::default(),
        }
    }

    /// Enables or disables crawl-to-cursor.
    #[must_use]
    pub fn with_crawl_to_cursor(mut self, crawl: bool) -> Self {
        self.crawl_to_cursor = crawl;
        self
    }

    /// Returns the flow binding.
    pub fn binding(&self) -> &FlowBinding {
        &self.binding
    }

    /// Returns the glyph kind.
    pub fn kind(&self) -> BarbKind {
        self.kind
    }

    /// Sets the view Z axis; drags move in the plane it is normal to.
    pub fn set_plane_normal(&mut self, normal: Vec3) {
        self.plane_normal = normal;
    }

    /// Records the ends of the glyph as last drawn.
    pub fn set_barb_ends(&mut self, ends: BarbEnds) {
        self.ends = Some(ends);
    }

    /// Returns the ends of the glyph as last drawn.
    pub fn barb_ends(&self) -> Option<BarbEnds> {
        self.ends
    }

    /// Returns true while a gesture is in progress and not stopped.
    pub fn is_dragging(&self) -> bool {
        self.session.active && !self.session.stopped
    }

    /// Returns the distance from the pick ray to the glyph head and records
    /// the pick offset used by crawl-to-cursor.
    pub fn check_close(&mut self, ray: &Ray) -> f32 {
        let Some(ends) = self.ends else {
            return f32::INFINITY;
        };
        self.pick_offset = ends.head - ray.closest_point(ends.head);
        self.pick_offset.length()
    }

    /// Pre-empts the current gesture. Moves are ignored until the next
    /// first event.
    pub fn stop(&mut self) {
        self.session.stopped = true;
    }

    /// Ends the current gesture.
    pub fn release(&mut self) {
        self.session.active = false;
    }

    /// Applies one drag event and returns the cursor readout.
    ///
    /// Degenerate geometry is ignored and failures rebuilding the tuple are
    /// logged and reported in the returned diagnostics; neither changes the
    /// session.
    pub fn drag_direct(&mut self, event: &DragEvent) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        if event.first {
            self.session.stopped = false;
            self.session.active = true;
            self.session.refirst = true;
            self.session.mode = event.modifiers.drag_mode();
        }
        if self.session.stopped || !self.session.active {
            return diagnostics;
        }
        let Some(ends) = self.ends else {
            return diagnostics;
        };

        let mut ray = event.ray;
        let mut offset_count = self.session.offset_count;
        if self.crawl_to_cursor {
            if event.first {
                offset_count = OFFSET_COUNT_INIT;
            } else {
                offset_count = offset_count.saturating_sub(1);
            }
            if offset_count > 0 {
                #[allow(clippy::cast_precision_loss)]
                let mult = offset_count as f32 / OFFSET_COUNT_INIT as f32;
                ray.origin += self.pick_offset * mult;
            }
        }

        let Some(hit) = ray.intersect_plane(ends.tail, self.plane_normal) else {
            log::debug!("drag ray parallel to the drag plane; ignoring move");
            return diagnostics;
        };
        self.session.offset_count = offset_count;

        if self.session.refirst {
            if let Err(e) = self.capture(ends) {
                log::warn!("failed to read flow for '{}': {e}", self.reference.name());
                diagnostics.push_exception(e.to_string());
                return diagnostics;
            }
        }

        let x = (hit - ends.tail) * self.kind.flow_sign();
        let x = [f64::from(x.x), f64::from(x.y), f64::from(x.z)];
        let flow = self.apply_mode(x);

        match self.write_flow(flow) {
            Ok(readout) => diagnostics.merge(readout),
            Err(e) => {
                log::warn!("failed to update '{}': {e}", self.reference.name());
                diagnostics.push_exception(e.to_string());
            }
        }
        diagnostics
    }

    fn capture(&mut self, ends: BarbEnds) -> Result<(), VisadError> {
        let data = self.reference.require_data()?;
        let data_flow = self.binding.flow_reference(&data)?;
        let display_speed = f64::from(ends.length());

        self.session.data_flow = data_flow;
        self.session.data_speed = norm(data_flow);
        self.session.display_speed = if display_speed > f64::EPSILON {
            display_speed
        } else {
            1.0
        };
        self.session.refirst = false;
        log::debug!(
            "drag capture: data_speed={} display_speed={}",
            self.session.data_speed,
            self.session.display_speed
        );
        Ok(())
    }

    /// Turns the cursor displacement into a new Cartesian flow vector.
    fn apply_mode(&mut self, mut x: [f64; 3]) -> [f64; 3] {
        let session = &mut self.session;
        match session.mode {
            DragMode::DirectionOnly => {
                let x_len = norm(x);
                if x_len > 0.0 {
                    let ratio = session.data_speed / x_len;
                    x.iter_mut().for_each(|c| *c *= ratio);
                }
                x
            }
            DragMode::SpeedOnly => {
                let ratio = norm(x) / session.display_speed;
                reseed_if_calm(session);
                session.data_flow.map(|c| c * ratio)
            }
            DragMode::SpeedAndDirection => {
                reseed_if_calm(session);
                let ratio = session.data_speed / session.display_speed;
                x.iter_mut().for_each(|c| *c *= ratio);
                x
            }
        }
    }

    /// Writes a Cartesian flow vector back through the coordinate system.
    fn write_flow(&self, flow: [f64; 3]) -> Result<Diagnostics, VisadError> {
        let data = self.reference.require_data()?;
        let native = self.binding.from_reference(flow);

        let mut replacements = Vec::with_capacity(3);
        let mut readout = Diagnostics::new();
        for (value, bound) in native.iter().zip(&self.binding.flow) {
            if let Some(bound) = bound {
                replacements.push((bound.index, *value));
                readout.push_cursor(bound.map.format_value(*value)?);
            }
        }

        let updated = data.with_values(&replacements)?;
        self.reference.set_data(updated)?;
        Ok(readout)
    }
}

/// Below `EPS` the captured direction is meaningless; nudge it along X and
/// recapture on the next move.
fn reseed_if_calm(session: &mut DragSession) {
    if session.data_speed < EPS {
        session.data_flow[0] = 2.0 * EPS;
        session.data_speed = norm(session.data_flow);
        session.refirst = true;
    }
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use visad_a3d_core::{
        DataReferenceImpl, Modifiers, PolarWind, Real, RealType, Unit,
    };

    fn wind_tuple(u: f64, v: f64) -> DataTuple {
        DataTuple::new(vec![
            Real::new(RealType::new("x"), 0.0),
            Real::new(RealType::new("y"), 0.0),
            Real::new(RealType::with_unit("u", Unit::meters_per_second()), u),
            Real::new(RealType::with_unit("v", Unit::meters_per_second()), v),
            Real::new(RealType::new("temperature"), 288.0),
        ])
    }

    fn wind_mappings() -> DisplayMappings {
        DisplayMappings::new()
            .with(ScalarMap::new(RealType::new("x"), DisplayRealType::XAxis))
            .with(ScalarMap::new(RealType::new("y"), DisplayRealType::YAxis))
            .with(ScalarMap::new(RealType::new("u"), DisplayRealType::Flow1X))
            .with(ScalarMap::new(RealType::new("v"), DisplayRealType::Flow1Y))
    }

    fn controller(u: f64, v: f64) -> (DirectManipulationController, Arc<DataReferenceImpl>) {
        let data = wind_tuple(u, v);
        let binding = check_direct(&wind_mappings(), &data).unwrap();
        let reference = Arc::new(DataReferenceImpl::with_data("wind", data));
        let mut controller =
            DirectManipulationController::new(binding, BarbKind::Wind, reference.clone())
                .with_crawl_to_cursor(false);
        // Pole of length 1 pointing against the flow.
        let speed = u.hypot(v);
        let head = if speed > 0.0 {
            Vec3::new((-u / speed) as f32, (-v / speed) as f32, 0.0)
        } else {
            Vec3::ZERO
        };
        controller.set_barb_ends(BarbEnds {
            tail: Vec3::ZERO,
            head,
        });
        (controller, reference)
    }

    fn down_ray(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 5.0), Vec3::NEG_Z)
    }

    fn drag(
        controller: &mut DirectManipulationController,
        x: f32,
        y: f32,
        modifiers: Modifiers,
        first: bool,
    ) -> Diagnostics {
        controller.drag_direct(&DragEvent {
            ray: down_ray(x, y),
            modifiers,
            first,
        })
    }

    fn flow(reference: &DataReferenceImpl) -> (f64, f64) {
        let data = reference.data().unwrap();
        (data.value("u").unwrap(), data.value("v").unwrap())
    }

    #[test]
    fn test_check_direct_accepts_cartesian_wind() {
        let binding = check_direct(&wind_mappings(), &wind_tuple(3.0, 4.0)).unwrap();
        assert_eq!(binding.tuple(), DisplayTuple::Flow1);
        assert_eq!(binding.flow_components()[0].as_ref().unwrap().index, 2);
        assert_eq!(binding.flow_components()[1].as_ref().unwrap().index, 3);
        assert!(binding.flow_components()[2].is_none());
    }

    #[test]
    fn test_check_direct_single_flow_component() {
        let mappings = DisplayMappings::new()
            .with(ScalarMap::new(RealType::new("x"), DisplayRealType::XAxis))
            .with(ScalarMap::new(RealType::new("u"), DisplayRealType::Flow1X));
        let err = check_direct(&mappings, &wind_tuple(3.0, 4.0)).unwrap_err();
        assert!(matches!(err, DirectManipulationError::InvalidMapping(_)));
    }

    #[test]
    fn test_check_direct_no_location() {
        let mappings = DisplayMappings::new()
            .with(ScalarMap::new(RealType::new("u"), DisplayRealType::Flow1X))
            .with(ScalarMap::new(RealType::new("v"), DisplayRealType::Flow1Y));
        let err = check_direct(&mappings, &wind_tuple(3.0, 4.0)).unwrap_err();
        assert!(matches!(err, DirectManipulationError::InvalidMapping(_)));
    }

    #[test]
    fn test_check_direct_two_flow_tuples() {
        let mappings = wind_mappings().with(ScalarMap::new(
            RealType::new("temperature"),
            DisplayRealType::Flow2Z,
        ));
        let err = check_direct(&mappings, &wind_tuple(3.0, 4.0)).unwrap_err();
        assert!(matches!(err, DirectManipulationError::AmbiguousMapping(_)));
    }

    #[test]
    fn test_check_direct_scalar_mapped_twice() {
        let mappings = wind_mappings().with(ScalarMap::new(RealType::new("u"), DisplayRealType::Flow1Z));
        let err = check_direct(&mappings, &wind_tuple(3.0, 4.0)).unwrap_err();
        assert!(matches!(err, DirectManipulationError::AmbiguousMapping(_)));
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_check_direct_channel_claimed_twice() {
        let mappings = wind_mappings().with(ScalarMap::new(
            RealType::new("temperature"),
            DisplayRealType::Flow1X,
        ));
        let err = check_direct(&mappings, &wind_tuple(3.0, 4.0)).unwrap_err();
        assert!(matches!(err, DirectManipulationError::AmbiguousMapping(_)));
    }

    #[test]
    fn test_check_direct_spherical_spatial() {
        let mappings = wind_mappings().with(ScalarMap::new(
            RealType::new("temperature"),
            DisplayRealType::Latitude,
        ));
        let err = check_direct(&mappings, &wind_tuple(3.0, 4.0)).unwrap_err();
        assert_eq!(
            err,
            DirectManipulationError::NonCartesianSpatial(DisplayRealType::Latitude)
        );
    }

    #[test]
    fn test_speed_and_direction_follows_cursor() {
        let (mut controller, reference) = controller(3.0, 4.0);
        // grab the head where it is: the vector does not change
        drag(&mut controller, -0.6, -0.8, Modifiers::NONE, true);
        let (u, v) = flow(&reference);
        assert!((u - 3.0).abs() < 1e-5 && (v - 4.0).abs() < 1e-5);

        // doubling the pole length doubles the speed
        drag(&mut controller, -1.2, -1.6, Modifiers::NONE, false);
        let (u, v) = flow(&reference);
        assert!((u - 6.0).abs() < 1e-5 && (v - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_direction_only_keeps_speed() {
        let (mut controller, reference) = controller(3.0, 4.0);
        drag(&mut controller, -0.6, -0.8, Modifiers::SHIFT, true);
        // pole now points to +X, so the wind blows toward -X
        drag(&mut controller, 2.0, 0.0, Modifiers::NONE, false);
        let (u, v) = flow(&reference);
        assert!((u.hypot(v) - 5.0).abs() < 1e-5);
        assert!((u + 5.0).abs() < 1e-5);
        assert!(v.abs() < 1e-5);
    }

    #[test]
    fn test_speed_only_keeps_direction() {
        let (mut controller, reference) = controller(3.0, 4.0);
        drag(&mut controller, -0.6, -0.8, Modifiers::CTRL, true);
        drag(&mut controller, 0.0, 2.0, Modifiers::NONE, false);
        let (u, v) = flow(&reference);
        // |x| = 2, display speed 1: twice the captured vector
        assert!((u - 6.0).abs() < 1e-5);
        assert!((v - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_speed_only_reseeds_calm_direction() {
        let (mut controller, reference) = controller(0.05, 0.0);
        controller.set_barb_ends(BarbEnds {
            tail: Vec3::ZERO,
            head: Vec3::new(-1.0, 0.0, 0.0),
        });
        drag(&mut controller, 0.0, 3.0, Modifiers::CTRL, true);
        let (u, v) = flow(&reference);
        // direction reseeded along X only; v stays at the captured 0
        assert!((u - 3.0 * 2.0 * EPS).abs() < 1e-6);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_parallel_ray_is_ignored() {
        let (mut controller, reference) = controller(3.0, 4.0);
        let diagnostics = controller.drag_direct(&DragEvent {
            ray: Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X),
            modifiers: Modifiers::NONE,
            first: true,
        });
        assert!(diagnostics.is_empty());
        assert_eq!(reference.tick(), 1);
    }

    #[test]
    fn test_stop_freezes_until_next_first() {
        let (mut controller, reference) = controller(3.0, 4.0);
        drag(&mut controller, -0.6, -0.8, Modifiers::NONE, true);
        controller.stop();
        let tick = reference.tick();
        assert!(drag(&mut controller, -3.0, 0.0, Modifiers::NONE, false).is_empty());
        assert_eq!(reference.tick(), tick);
        assert!(!controller.is_dragging());

        drag(&mut controller, -0.6, -0.8, Modifiers::NONE, true);
        assert!(controller.is_dragging());
        assert!(reference.tick() > tick);
    }

    #[test]
    fn test_release_ends_gesture() {
        let (mut controller, reference) = controller(3.0, 4.0);
        drag(&mut controller, -0.6, -0.8, Modifiers::NONE, true);
        controller.release();
        let tick = reference.tick();
        drag(&mut controller, -3.0, 0.0, Modifiers::NONE, false);
        assert_eq!(reference.tick(), tick);
    }

    #[test]
    fn test_other_components_unchanged() {
        let (mut controller, reference) = controller(3.0, 4.0);
        drag(&mut controller, -1.0, 0.0, Modifiers::NONE, true);
        let data = reference.data().unwrap();
        assert_eq!(data.value("temperature").unwrap(), 288.0);
        assert_eq!(data.value("x").unwrap(), 0.0);
    }

    #[test]
    fn test_empty_reference_reports_exception() {
        let binding = check_direct(&wind_mappings(), &wind_tuple(3.0, 4.0)).unwrap();
        let reference = Arc::new(DataReferenceImpl::new("wind"));
        let mut controller =
            DirectManipulationController::new(binding, BarbKind::Wind, reference.clone())
                .with_crawl_to_cursor(false);
        controller.set_barb_ends(BarbEnds {
            tail: Vec3::ZERO,
            head: Vec3::new(-0.6, -0.8, 0.0),
        });
        let diagnostics = drag(&mut controller, -1.0, 0.0, Modifiers::NONE, true);
        assert!(diagnostics.cursor_strings.is_empty());
        assert_eq!(diagnostics.exceptions.len(), 1);
        assert!(diagnostics.exceptions[0].contains("wind"));
        assert!(reference.data().is_none());
    }

    #[test]
    fn test_cursor_strings_use_override_unit() {
        let data = wind_tuple(3.0, 4.0);
        let mappings = DisplayMappings::new()
            .with(ScalarMap::new(RealType::new("x"), DisplayRealType::XAxis))
            .with(
                ScalarMap::new(
                    RealType::with_unit("u", Unit::meters_per_second()),
                    DisplayRealType::Flow1X,
                )
                .with_override_unit(Unit::knots()),
            )
            .with(ScalarMap::new(
                RealType::with_unit("v", Unit::meters_per_second()),
                DisplayRealType::Flow1Y,
            ));
        let binding = check_direct(&mappings, &data).unwrap();
        let reference = Arc::new(DataReferenceImpl::with_data("wind", data));
        let mut controller =
            DirectManipulationController::new(binding, BarbKind::Wind, reference)
                .with_crawl_to_cursor(false);
        controller.set_barb_ends(BarbEnds {
            tail: Vec3::ZERO,
            head: Vec3::new(-0.6, -0.8, 0.0),
        });
        let diagnostics = drag(&mut controller, -0.6, -0.8, Modifiers::NONE, true);
        assert_eq!(diagnostics.cursor_strings.len(), 2);
        assert!(diagnostics.cursor_strings[0].starts_with("u = 5.82"));
        assert!(diagnostics.cursor_strings[0].ends_with("kt"));
        assert_eq!(diagnostics.cursor_strings[1], "v = 4 m/s");
    }

    #[test]
    fn test_polar_wind_round_trip() {
        // direction 270 (from the west), speed 10: blows toward +X
        let data = DataTuple::new(vec![
            Real::new(RealType::new("x"), 0.0),
            Real::new(RealType::new("dir"), 270.0),
            Real::new(RealType::new("spd"), 10.0),
        ]);
        let mappings = DisplayMappings::new()
            .with(ScalarMap::new(RealType::new("x"), DisplayRealType::XAxis))
            .with(ScalarMap::new(RealType::new("dir"), DisplayRealType::Flow1X))
            .with(ScalarMap::new(RealType::new("spd"), DisplayRealType::Flow1Y))
            .with_flow_coordinate_system(DisplayTuple::Flow1, Arc::new(PolarWind));
        let binding = check_direct(&mappings, &data).unwrap();
        let reference = Arc::new(DataReferenceImpl::with_data("polar", data));
        let mut controller =
            DirectManipulationController::new(binding, BarbKind::Wind, reference.clone())
                .with_crawl_to_cursor(false);
        controller.set_barb_ends(BarbEnds {
            tail: Vec3::ZERO,
            head: Vec3::new(-1.0, 0.0, 0.0),
        });
        // pole swung to -Y: wind now blows toward +Y, i.e. from the south
        drag(&mut controller, -1.0, 0.0, Modifiers::SHIFT, true);
        drag(&mut controller, 0.0, -1.0, Modifiers::NONE, false);
        let data = reference.data().unwrap();
        assert!((data.value("dir").unwrap() - 180.0).abs() < 1e-4);
        assert!((data.value("spd").unwrap() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_crawl_offset_decays() {
        let (controller_plain, _) = controller(3.0, 4.0);
        let binding = controller_plain.binding().clone();
        let reference = Arc::new(DataReferenceImpl::with_data("wind", wind_tuple(3.0, 4.0)));
        let mut controller =
            DirectManipulationController::new(binding, BarbKind::Wind, reference.clone());
        controller.set_barb_ends(BarbEnds {
            tail: Vec3::ZERO,
            head: Vec3::new(-0.6, -0.8, 0.0),
        });
        // pick a little to the right of the head
        let pick = down_ray(-0.5, -0.8);
        assert!((controller.check_close(&pick) - 0.1).abs() < 1e-5);

        // the first move lands exactly on the head: no jump
        controller.drag_direct(&DragEvent {
            ray: pick,
            modifiers: Modifiers::NONE,
            first: true,
        });
        let (u, v) = flow(&reference);
        assert!((u - 3.0).abs() < 1e-4 && (v - 4.0).abs() < 1e-4);

        // after the offset has decayed the glyph follows the cursor itself
        for _ in 0..OFFSET_COUNT_INIT {
            controller.drag_direct(&DragEvent {
                ray: pick,
                modifiers: Modifiers::NONE,
                first: false,
            });
        }
        let (u, _) = flow(&reference);
        assert!((u - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_sessions_are_independent() {
        let (mut a, ref_a) = controller(3.0, 4.0);
        let (mut b, ref_b) = controller(0.0, 10.0);
        drag(&mut a, -0.6, -0.8, Modifiers::SHIFT, true);
        drag(&mut b, 0.0, -1.0, Modifiers::NONE, true);
        drag(&mut a, 1.0, 0.0, Modifiers::NONE, false);
        drag(&mut b, 0.0, -2.0, Modifiers::NONE, false);
        let (ua, va) = flow(&ref_a);
        assert!((ua.hypot(va) - 5.0).abs() < 1e-5);
        let (ub, vb) = flow(&ref_b);
        assert!(ub.abs() < 1e-5 && (vb - 20.0).abs() < 1e-5);
    }

    proptest::proptest! {
        #[test]
        fn direction_only_round_trip(
            u in -30.0f64..30.0,
            v in -30.0f64..30.0,
            cx in -2.0f32..2.0,
            cy in -2.0f32..2.0,
        ) {
            proptest::prop_assume!(u.hypot(v) > 0.5);
            proptest::prop_assume!(cx.hypot(cy) > 0.1);
            let (mut controller, reference) = controller(u, v);
            let speed = u.hypot(v);
            let head = controller.barb_ends().unwrap().head;
            drag(&mut controller, head.x, head.y, Modifiers::SHIFT, true);
            drag(&mut controller, cx, cy, Modifiers::NONE, false);
            let (nu, nv) = flow(&reference);
            proptest::prop_assert!((nu.hypot(nv) - speed).abs() < 1e-4 * speed.max(1.0));
            // wind blows away from the cursor side of the station
            let cursor_len = f64::from(cx.hypot(cy));
            let expected = (-f64::from(cx) / cursor_len, -f64::from(cy) / cursor_len);
            proptest::prop_assert!((nu / nu.hypot(nv) - expected.0).abs() < 1e-4);
            proptest::prop_assert!((nv / nu.hypot(nv) - expected.1).abs() < 1e-4);
        }
    }
}
