//! Style declarations and the conversion layer
//!
//! [`to_style`] turns numeric property values into style fragments and
//! [`current_value`] reads them back. Fragments are parsed with nom.

mod parse;
pub mod transform;
pub mod units;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AnimateError, Result};
use crate::property::AnimatableProperty;
use crate::value::{PropertyBag, PropertyValue};

pub use transform::{compose_transform, decode_transform, DecodedTransform, TRANSFORM_PROPERTIES};

/// The `transform` style key shared by all transform-class properties
pub const TRANSFORM_KEY: &str = "transform";

/// An ordered set of style entries, `key: value`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleDeclaration {
    entries: IndexMap<String, String>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Copy every entry of `other` over this declaration
    pub fn merge(&mut self, other: &StyleDeclaration) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleDeclaration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = StyleDeclaration::new();
        for (k, v) in iter {
            style.set(k, v);
        }
        style
    }
}

/// Encode property values as a style declaration
///
/// Non-transform properties are written to their own keys. The `transform`
/// key is always written, composed from the transform-class properties present
/// in `values` (`none` if there are none).
pub fn to_style(values: &PropertyBag) -> StyleDeclaration {
    let mut style = StyleDeclaration::new();

    for (property, value) in values.iter() {
        if property.is_transform() {
            continue;
        }
        match property.unit().encode(value) {
            Some(fragment) => style.set(property.css_name(), fragment),
            None => warn!(property = property.name(), ?value, "value does not fit property"),
        }
    }

    let transform = compose_transform(|p| values.get(p).and_then(PropertyValue::as_scalar));
    style.set(TRANSFORM_KEY, transform);
    style
}

/// The style key `property` is read from and written to
fn style_key(property: AnimatableProperty) -> &'static str {
    if property.is_transform() {
        TRANSFORM_KEY
    } else {
        property.css_name()
    }
}

/// Value used when a property cannot be read from a style
fn fallback(property: AnimatableProperty) -> PropertyValue {
    match property.transform_default() {
        Some(identity) => PropertyValue::Scalar(identity),
        None => property.unit().fallback(),
    }
}

/// Decode `property` from a style, failing on a missing or malformed entry
pub fn try_current_value(
    style: &StyleDeclaration,
    property: AnimatableProperty,
) -> Result<PropertyValue> {
    let key = style_key(property);
    let fragment = style.get(key).unwrap_or_default();
    let malformed = || AnimateError::MalformedStyle {
        key: key.to_string(),
        value: fragment.to_string(),
    };

    if property.is_transform() {
        let decoded = decode_transform(fragment).ok_or_else(malformed)?;
        Ok(decoded.get(property).map_or_else(|| fallback(property), PropertyValue::Scalar))
    } else {
        property.unit().decode(fragment).ok_or_else(malformed)
    }
}

/// Decode the displayed value of `property` from a style
///
/// Decoding is total: a missing or malformed entry yields the property's
/// identity value for transforms, `[0, 0, 0, 0]` for colors and `0` otherwise.
pub fn current_value(style: &StyleDeclaration, property: AnimatableProperty) -> PropertyValue {
    match try_current_value(style, property) {
        Ok(value) => value,
        Err(err) => {
            if style.contains(style_key(property)) {
                debug!(%err, "falling back to default value");
            }
            fallback(property)
        }
    }
}

/// The value an animation of `property` should start from, if the style
/// carries one
pub fn baseline(style: &StyleDeclaration, property: AnimatableProperty) -> Option<PropertyValue> {
    style
        .contains(style_key(property))
        .then(|| current_value(style, property))
}

/// [`current_value`] by property name; unknown names decode to `0`
pub fn current_value_named(style: &StyleDeclaration, name: &str) -> PropertyValue {
    match name.parse::<AnimatableProperty>() {
        Ok(property) => current_value(style, property),
        Err(err) => {
            warn!(%err, "Unsupported prop");
            PropertyValue::Scalar(0.0)
        }
    }
}
