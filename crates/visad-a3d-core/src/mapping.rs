//! Display mappings: which scalar drives which display channel.
//!
//! A [`ScalarMap`] binds a [`RealType`] to a [`DisplayRealType`]. The
//! collection of maps on a display is a [`DisplayMappings`], which answers the
//! questions renderers ask: is this scalar mapped to flow, through which
//! coordinate system, and with which override unit.

use std::fmt;
use std::sync::Arc;

use crate::data::RealType;
use crate::error::Result;
use crate::units::Unit;

/// Display channels a scalar can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayRealType {
    XAxis,
    YAxis,
    ZAxis,
    Latitude,
    Longitude,
    Radius,
    Flow1X,
    Flow1Y,
    Flow1Z,
    Flow1Elevation,
    Flow1Azimuth,
    Flow1Radial,
    Flow2X,
    Flow2Y,
    Flow2Z,
    Flow2Elevation,
    Flow2Azimuth,
    Flow2Radial,
    Red,
    Green,
    Blue,
    Animation,
    Text,
    Other,
}

/// Display tuples group display channels that are interpreted together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayTuple {
    /// Cartesian spatial axes.
    Spatial,
    /// Spherical spatial axes (latitude, longitude, radius).
    SpatialSpherical,
    Flow1,
    Flow1Spherical,
    Flow2,
    Flow2Spherical,
    Color,
    /// Channels that are not part of a tuple.
    Single,
}

impl DisplayTuple {
    /// Returns true for flow tuples.
    pub fn is_flow(self) -> bool {
        matches!(
            self,
            Self::Flow1 | Self::Flow1Spherical | Self::Flow2 | Self::Flow2Spherical
        )
    }

    /// Returns true for spatial tuples.
    pub fn is_spatial(self) -> bool {
        matches!(self, Self::Spatial | Self::SpatialSpherical)
    }

    /// Returns the coordinate system implied by the tuple itself.
    pub fn default_coordinate_system(self) -> Option<Arc<dyn FlowCoordinateSystem>> {
        match self {
            Self::Flow1Spherical | Self::Flow2Spherical => Some(Arc::new(FlowSpherical)),
            _ => None,
        }
    }
}

impl DisplayRealType {
    /// Returns the display tuple this channel belongs to.
    pub fn tuple(self) -> DisplayTuple {
        use DisplayRealType as D;
        match self {
            D::XAxis | D::YAxis | D::ZAxis => DisplayTuple::Spatial,
            D::Latitude | D::Longitude | D::Radius => DisplayTuple::SpatialSpherical,
            D::Flow1X | D::Flow1Y | D::Flow1Z => DisplayTuple::Flow1,
            D::Flow1Elevation | D::Flow1Azimuth | D::Flow1Radial => DisplayTuple::Flow1Spherical,
            D::Flow2X | D::Flow2Y | D::Flow2Z => DisplayTuple::Flow2,
            D::Flow2Elevation | D::Flow2Azimuth | D::Flow2Radial => DisplayTuple::Flow2Spherical,
            D::Red | D::Green | D::Blue => DisplayTuple::Color,
            D::Animation | D::Text | D::Other => DisplayTuple::Single,
        }
    }

    /// Returns the index of this channel within its tuple.
    pub fn tuple_index(self) -> Option<usize> {
        use DisplayRealType as D;
        match self {
            D::XAxis | D::Latitude | D::Flow1X | D::Flow1Elevation | D::Flow2X
            | D::Flow2Elevation | D::Red => Some(0),
            D::YAxis | D::Longitude | D::Flow1Y | D::Flow1Azimuth | D::Flow2Y
            | D::Flow2Azimuth | D::Green => Some(1),
            D::ZAxis | D::Radius | D::Flow1Z | D::Flow1Radial | D::Flow2Z | D::Flow2Radial
            | D::Blue => Some(2),
            D::Animation | D::Text | D::Other => None,
        }
    }

    /// Returns true for flow channels.
    pub fn is_flow(self) -> bool {
        self.tuple().is_flow()
    }

    /// Returns true for spatial channels.
    pub fn is_spatial(self) -> bool {
        self.tuple().is_spatial()
    }
}

impl fmt::Display for DisplayRealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Converts flow vectors between a native representation and Cartesian
/// reference coordinates.
pub trait FlowCoordinateSystem: Send + Sync + fmt::Debug {
    /// Converts a native vector into Cartesian `(x, y, z)`.
    fn to_reference(&self, native: [f64; 3]) -> [f64; 3];

    /// Converts a Cartesian `(x, y, z)` vector into the native representation.
    fn from_reference(&self, reference: [f64; 3]) -> [f64; 3];
}

/// Spherical flow: `(elevation, azimuth, radial)` with angles in degrees and
/// azimuth measured clockwise from +Y.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowSpherical;

impl FlowCoordinateSystem for FlowSpherical {
    fn to_reference(&self, native: [f64; 3]) -> [f64; 3] {
        let [elevation, azimuth, radial] = native;
        let (el, az) = (elevation.to_radians(), azimuth.to_radians());
        [
            radial * az.sin() * el.cos(),
            radial * az.cos() * el.cos(),
            radial * el.sin(),
        ]
    }

    fn from_reference(&self, reference: [f64; 3]) -> [f64; 3] {
        let [x, y, z] = reference;
        let radial = (x * x + y * y + z * z).sqrt();
        if radial == 0.0 {
            return [0.0, 0.0, 0.0];
        }
        let elevation = (z / radial).clamp(-1.0, 1.0).asin().to_degrees();
        let azimuth = x.atan2(y).to_degrees().rem_euclid(360.0);
        [elevation, azimuth, radial]
    }
}

/// Meteorological polar wind: `(direction, speed, w)` where direction is the
/// bearing in degrees the wind blows from.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolarWind;

impl FlowCoordinateSystem for PolarWind {
    fn to_reference(&self, native: [f64; 3]) -> [f64; 3] {
        let [direction, speed, w] = native;
        let dir = direction.to_radians();
        [-speed * dir.sin(), -speed * dir.cos(), w]
    }

    fn from_reference(&self, reference: [f64; 3]) -> [f64; 3] {
        let [u, v, w] = reference;
        let speed = u.hypot(v);
        let direction = if speed == 0.0 {
            0.0
        } else {
            (-u).atan2(-v).to_degrees().rem_euclid(360.0)
        };
        [direction, speed, w]
    }
}

/// Binding of one scalar type to one display channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarMap {
    scalar: RealType,
    display: DisplayRealType,
    override_unit: Option<Unit>,
    range: Option<(f64, f64)>,
}

impl ScalarMap {
    /// Creates a new scalar map.
    pub fn new(scalar: RealType, display: DisplayRealType) -> Self {
        Self {
            scalar,
            display,
            override_unit: None,
            range: None,
        }
    }

    /// Maps `[min, max]` of the scalar onto the display interval `[-1, 1]`.
    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Sets the unit values are displayed in.
    #[must_use]
    pub fn with_override_unit(mut self, unit: Unit) -> Self {
        self.override_unit = Some(unit);
        self
    }

    /// Returns the mapped scalar.
    pub fn scalar(&self) -> &RealType {
        &self.scalar
    }

    /// Returns the scalar name.
    pub fn scalar_name(&self) -> &str {
        self.scalar.name()
    }

    /// Returns the display channel.
    pub fn display(&self) -> DisplayRealType {
        self.display
    }

    /// Returns the override unit, if any.
    pub fn override_unit(&self) -> Option<&Unit> {
        self.override_unit.as_ref()
    }

    /// Returns the scalar range, if one was set.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    /// Converts a scalar value to a display coordinate.
    pub fn to_display(&self, value: f64) -> f32 {
        match self.range {
            Some((min, max)) if max != min => (2.0 * (value - min) / (max - min) - 1.0) as f32,
            _ => value as f32,
        }
    }

    /// Formats `value` (in the scalar's default unit) as `name = value`,
    /// converted to the override unit when one is registered.
    pub fn format_value(&self, value: f64) -> Result<String> {
        match (self.scalar.default_unit(), &self.override_unit) {
            (Some(from), Some(to)) => {
                let shown = from.convert_to(value, to)?;
                Ok(format!("{} = {} {}", self.scalar.name(), round3(shown), to))
            }
            (Some(unit), None) if !unit.symbol().is_empty() => {
                Ok(format!("{} = {} {}", self.scalar.name(), round3(value), unit))
            }
            _ => Ok(format!("{} = {}", self.scalar.name(), round3(value))),
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// All scalar maps registered on a display.
#[derive(Debug, Clone, Default)]
pub struct DisplayMappings {
    maps: Vec<ScalarMap>,
    flow_systems: Vec<(DisplayTuple, Arc<dyn FlowCoordinateSystem>)>,
}

impl DisplayMappings {
    /// Creates an empty mapping set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scalar map.
    pub fn add(&mut self, map: ScalarMap) -> &mut Self {
        self.maps.push(map);
        self
    }

    /// Adds a scalar map, builder style.
    #[must_use]
    pub fn with(mut self, map: ScalarMap) -> Self {
        self.maps.push(map);
        self
    }

    /// Attaches a coordinate system to a flow tuple. Flow edits pass
    /// through it in both directions.
    #[must_use]
    pub fn with_flow_coordinate_system(
        mut self,
        tuple: DisplayTuple,
        system: Arc<dyn FlowCoordinateSystem>,
    ) -> Self {
        self.flow_systems.retain(|(t, _)| *t != tuple);
        self.flow_systems.push((tuple, system));
        self
    }

    /// Returns all maps.
    pub fn maps(&self) -> &[ScalarMap] {
        &self.maps
    }

    /// Returns the maps for the scalar with the given name.
    ///
    /// The maps borrow from `self` only, so they outlive `scalar`.
    pub fn maps_for<'a, 's>(&'a self, scalar: &'s str) -> impl Iterator<Item = &'a ScalarMap> + 's
    where
        'a: 's,
    {
        self.maps.iter().filter(move |m| m.scalar_name() == scalar)
    }

    /// Returns the flow maps for the scalar with the given name.
    pub fn flow_maps_for<'a, 's>(
        &'a self,
        scalar: &'s str,
    ) -> impl Iterator<Item = &'a ScalarMap> + 's
    where
        'a: 's,
    {
        self.maps_for(scalar).filter(|m| m.display().is_flow())
    }

    /// Returns the coordinate system applied to a flow tuple, if any.
    pub fn flow_coordinate_system(
        &self,
        tuple: DisplayTuple,
    ) -> Option<Arc<dyn FlowCoordinateSystem>> {
        self.flow_systems
            .iter()
            .find(|(t, _)| *t == tuple)
            .map(|(_, s)| Arc::clone(s))
            .or_else(|| tuple.default_coordinate_system())
    }
}
