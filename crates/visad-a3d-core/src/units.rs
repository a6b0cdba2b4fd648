//! Physical units and conversions between them.
//!
//! A [`Unit`] is an affine transform onto a base unit of some dimension:
//! `base = value * scale + offset`. Two units convert into each other when
//! they share the same base dimension.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisadError};

/// Meters per second expressed in knots.
pub const KNOTS_PER_METER_PER_SECOND: f64 = 3600.0 / 1853.248;

/// A physical unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    symbol: String,
    dimension: String,
    scale: f64,
    offset: f64,
}

impl Unit {
    /// Creates a unit that converts to its dimension's base unit by
    /// `base = value * scale + offset`.
    pub fn new(
        symbol: impl Into<String>,
        dimension: impl Into<String>,
        scale: f64,
        offset: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            dimension: dimension.into(),
            scale,
            offset,
        }
    }

    /// A dimensionless unit.
    pub fn dimensionless() -> Self {
        Self::new("", "1", 1.0, 0.0)
    }

    /// Meters per second, the base speed unit.
    pub fn meters_per_second() -> Self {
        Self::new("m/s", "speed", 1.0, 0.0)
    }

    /// Knots (nautical miles per hour).
    pub fn knots() -> Self {
        Self::new("kt", "speed", 1.0 / KNOTS_PER_METER_PER_SECOND, 0.0)
    }

    /// Kelvin, the base temperature unit.
    pub fn kelvin() -> Self {
        Self::new("K", "temperature", 1.0, 0.0)
    }

    /// Degrees Celsius.
    pub fn celsius() -> Self {
        Self::new("degC", "temperature", 1.0, 273.15)
    }

    /// Degrees of angle.
    pub fn degrees() -> Self {
        Self::new("deg", "angle", std::f64::consts::PI / 180.0, 0.0)
    }

    /// Radians, the base angle unit.
    pub fn radians() -> Self {
        Self::new("rad", "angle", 1.0, 0.0)
    }

    /// Returns the unit symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the base dimension name.
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// Returns whether values in this unit convert into `other`.
    pub fn is_convertible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Converts `value` expressed in this unit into `target`.
    pub fn convert_to(&self, value: f64, target: &Unit) -> Result<f64> {
        if !self.is_convertible(target) {
            return Err(VisadError::IncompatibleUnits {
                from: self.symbol.clone(),
                to: target.symbol.clone(),
            });
        }
        let base = value * self.scale + self.offset;
        Ok((base - target.offset) / target.scale)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_conversion() {
        let kt = Unit::meters_per_second()
            .convert_to(1.0, &Unit::knots())
            .unwrap();
        assert!((kt - KNOTS_PER_METER_PER_SECOND).abs() < 1e-12);

        let ms = Unit::knots().convert_to(kt, &Unit::meters_per_second()).unwrap();
        assert!((ms - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_affine_conversion() {
        let c = Unit::kelvin().convert_to(273.15, &Unit::celsius()).unwrap();
        assert!(c.abs() < 1e-9);
        let k = Unit::celsius().convert_to(20.0, &Unit::kelvin()).unwrap();
        assert!((k - 293.15).abs() < 1e-9);
    }

    #[test]
    fn test_incompatible_units() {
        let err = Unit::kelvin().convert_to(1.0, &Unit::knots()).unwrap_err();
        assert!(matches!(err, VisadError::IncompatibleUnits { .. }));
        assert!(err.to_string().contains("'K'"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Unit::knots().to_string(), "kt");
    }
}
