//! Scalar types, immutable data tuples and shared data references.
//!
//! A [`DataTuple`] is never edited in place. Editing produces a new tuple
//! which is swapped into a [`DataReference`] as a whole, so readers on the
//! render thread always see either the old or the new value.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisadError};
use crate::units::Unit;

/// A named scalar type with an optional default unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealType {
    name: String,
    default_unit: Option<Unit>,
}

impl RealType {
    /// Creates a unitless real type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_unit: None,
        }
    }

    /// Creates a real type whose values are expressed in `unit`.
    pub fn with_unit(name: impl Into<String>, unit: Unit) -> Self {
        Self {
            name: name.into(),
            default_unit: Some(unit),
        }
    }

    /// Returns the scalar name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the default unit, if any.
    pub fn default_unit(&self) -> Option<&Unit> {
        self.default_unit.as_ref()
    }
}

impl fmt::Display for RealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One scalar value tagged with its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Real {
    /// The scalar type.
    pub real_type: RealType,
    /// The value, in the type's default unit.
    pub value: f64,
}

impl Real {
    /// Creates a new real value.
    pub fn new(real_type: RealType, value: f64) -> Self {
        Self { real_type, value }
    }
}

/// An immutable, ordered record of scalar components.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataTuple {
    components: Vec<Real>,
}

impl DataTuple {
    /// Creates a tuple from its components.
    pub fn new(components: Vec<Real>) -> Self {
        Self { components }
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the tuple has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the components in order.
    pub fn components(&self) -> &[Real] {
        &self.components
    }

    /// Returns the component at `index`.
    pub fn component(&self, index: usize) -> Result<&Real> {
        self.components
            .get(index)
            .ok_or(VisadError::ComponentIndex {
                index,
                size: self.components.len(),
            })
    }

    /// Returns the index of the first component with the given type name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.components
            .iter()
            .position(|c| c.real_type.name() == name)
    }

    /// Returns the value of the component with the given type name.
    pub fn value(&self, name: &str) -> Result<f64> {
        self.index_of(name)
            .map(|i| self.components[i].value)
            .ok_or_else(|| VisadError::MissingComponent(name.to_string()))
    }

    /// Returns the tuple's real types in component order.
    pub fn real_types(&self) -> impl Iterator<Item = &RealType> {
        self.components.iter().map(|c| &c.real_type)
    }

    /// Returns a copy of this tuple with the given `(index, value)`
    /// replacements applied. All other components are carried over unchanged.
    pub fn with_values(&self, replacements: &[(usize, f64)]) -> Result<DataTuple> {
        let mut components = self.components.clone();
        for &(index, value) in replacements {
            let size = components.len();
            let slot = components
                .get_mut(index)
                .ok_or(VisadError::ComponentIndex { index, size })?;
            slot.value = value;
        }
        Ok(DataTuple { components })
    }
}

/// Shared, replaceable handle to a data value.
///
/// Implementations must swap whole tuples; a reader never observes a
/// partially written tuple.
pub trait DataReference: Send + Sync {
    /// Returns the name of this reference.
    fn name(&self) -> &str;

    /// Returns the current data, if any.
    fn data(&self) -> Option<Arc<DataTuple>>;

    /// Replaces the current data.
    fn set_data(&self, data: DataTuple) -> Result<()>;

    /// Returns a counter that increases every time the data is replaced.
    fn tick(&self) -> u64;

    /// Returns the current data or an error if the reference is empty.
    fn require_data(&self) -> Result<Arc<DataTuple>> {
        self.data()
            .ok_or_else(|| VisadError::EmptyReference(self.name().to_string()))
    }
}

/// In-process [`DataReference`] backed by a lock around an `Arc`.
#[derive(Debug)]
pub struct DataReferenceImpl {
    name: String,
    slot: RwLock<Option<Arc<DataTuple>>>,
    ticks: AtomicU64,
}

impl DataReferenceImpl {
    /// Creates an empty reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: RwLock::new(None),
            ticks: AtomicU64::new(0),
        }
    }

    /// Creates a reference holding `data`.
    pub fn with_data(name: impl Into<String>, data: DataTuple) -> Self {
        Self {
            name: name.into(),
            slot: RwLock::new(Some(Arc::new(data))),
            ticks: AtomicU64::new(1),
        }
    }
}

impl DataReference for DataReferenceImpl {
    fn name(&self) -> &str {
        &self.name
    }

    fn data(&self) -> Option<Arc<DataTuple>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_data(&self, data: DataTuple) -> Result<()> {
        let data = Arc::new(data);
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(data);
        self.ticks.fetch_add(1, Ordering::AcqRel);
        log::trace!("data reference '{}' replaced", self.name);
        Ok(())
    }

    fn tick(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }
}
