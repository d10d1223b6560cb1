//! Property values and target-value bags

use indexmap::IndexMap;
use serde::de::{Deserializer, IgnoredAny};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{AnimateError, Result};
use crate::property::{AnimatableProperty, PropertyKind};

/// The value of one animatable property
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Scalar(f32),
    Vector(SmallVec<[f32; 4]>),
}

impl PropertyValue {
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        PropertyValue::Vector(SmallVec::from_slice(&[r, g, b]))
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        PropertyValue::Vector(SmallVec::from_slice(&[r, g, b, a]))
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            PropertyValue::Scalar(v) => Some(*v),
            PropertyValue::Vector(_) => None,
        }
    }

    /// Components of the value; a scalar is a one-element slice
    pub fn as_slice(&self) -> &[f32] {
        match self {
            PropertyValue::Scalar(v) => std::slice::from_ref(v),
            PropertyValue::Vector(v) => v.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, PropertyValue::Vector(_))
    }

    fn describe(&self) -> String {
        match self {
            PropertyValue::Scalar(_) => "a number".to_string(),
            PropertyValue::Vector(v) => format!("{} components", v.len()),
        }
    }

    /// Check this value against a property's kind
    pub fn check(&self, property: AnimatableProperty) -> Result<()> {
        let kind = property.kind();
        let fits = match (kind, self) {
            (PropertyKind::Scalar, PropertyValue::Scalar(_)) => true,
            (PropertyKind::Color, PropertyValue::Vector(v)) => kind.accepts_len(v.len()),
            _ => false,
        };
        if fits {
            Ok(())
        } else {
            Err(AnimateError::KindMismatch {
                property: property.name(),
                expected: kind.describe(),
                found: self.describe(),
            })
        }
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Scalar(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Scalar(value as f32)
    }
}

impl From<[f32; 3]> for PropertyValue {
    fn from(value: [f32; 3]) -> Self {
        PropertyValue::Vector(SmallVec::from_slice(&value))
    }
}

impl From<[f32; 4]> for PropertyValue {
    fn from(value: [f32; 4]) -> Self {
        PropertyValue::Vector(SmallVec::from_slice(&value))
    }
}

impl From<[f64; 3]> for PropertyValue {
    fn from(value: [f64; 3]) -> Self {
        PropertyValue::Vector(value.iter().map(|v| *v as f32).collect())
    }
}

impl From<[f64; 4]> for PropertyValue {
    fn from(value: [f64; 4]) -> Self {
        PropertyValue::Vector(value.iter().map(|v| *v as f32).collect())
    }
}

impl From<Vec<f64>> for PropertyValue {
    fn from(value: Vec<f64>) -> Self {
        PropertyValue::Vector(value.into_iter().map(|v| v as f32).collect())
    }
}

impl From<Vec<f32>> for PropertyValue {
    fn from(value: Vec<f32>) -> Self {
        PropertyValue::Vector(SmallVec::from_vec(value))
    }
}

/// A set of declared target values, in declaration order
///
/// Every value in a bag has been checked against its property's kind.
///
/// # Example
///
/// ```ignore
/// use blinc_animate::{AnimatableProperty as P, PropertyBag};
///
/// let bag = PropertyBag::new()
///     .with(P::TranslateX, 200.0)
///     .with(P::BackgroundColor, [255.0, 0.0, 0.0]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    values: IndexMap<AnimatableProperty, PropertyValue>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; values of the wrong kind are logged and dropped
    pub fn with(mut self, property: AnimatableProperty, value: impl Into<PropertyValue>) -> Self {
        if let Err(err) = self.insert(property, value) {
            tracing::warn!(%err, "dropping property value");
        }
        self
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(
        &mut self,
        property: AnimatableProperty,
        value: impl Into<PropertyValue>,
    ) -> Result<Option<PropertyValue>> {
        let value = value.into();
        value.check(property)?;
        Ok(self.values.insert(property, value))
    }

    /// Insert by property name
    pub fn insert_named(
        &mut self,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<Option<PropertyValue>> {
        let property: AnimatableProperty = name.parse()?;
        self.insert(property, value)
    }

    pub fn get(&self, property: AnimatableProperty) -> Option<&PropertyValue> {
        self.values.get(&property)
    }

    pub fn contains(&self, property: AnimatableProperty) -> bool {
        self.values.contains_key(&property)
    }

    pub fn remove(&mut self, property: AnimatableProperty) -> Option<PropertyValue> {
        self.values.shift_remove(&property)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnimatableProperty, &PropertyValue)> {
        self.values.iter().map(|(p, v)| (*p, v))
    }

    pub fn properties(&self) -> impl Iterator<Item = AnimatableProperty> + '_ {
        self.values.keys().copied()
    }
}

impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (property, value) in &self.values {
            map.serialize_entry(property.name(), value)?;
        }
        map.end()
    }
}

/// One entry of a serialized bag, whatever its shape
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Value(PropertyValue),
    Other(IgnoredAny),
}

/// Unknown names and mistyped values are logged and skipped; `null` means
/// "not declared"
impl<'de> Deserialize<'de> for PropertyBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = IndexMap::<String, Option<RawEntry>>::deserialize(deserializer)?;
        let mut bag = PropertyBag::new();
        for (name, entry) in raw {
            match entry {
                None => {}
                Some(RawEntry::Value(value)) => {
                    if let Err(err) = bag.insert_named(&name, value) {
                        tracing::warn!(%err, "Unsupported prop");
                    }
                }
                Some(RawEntry::Other(_)) => {
                    tracing::warn!(
                        property = %name,
                        "dropping value that is not a number or color"
                    );
                }
            }
        }
        Ok(bag)
    }
}
