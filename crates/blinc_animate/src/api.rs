//! Imperative control of running animations
//!
//! For interactions like drag-with-momentum that move a property directly
//! instead of declaring a target. Only properties that already have a
//! spring handle (declared at least once) can be controlled; nothing here
//! creates handles or honors `animate` / `delay`.

use std::rc::Weak;

use crate::handle::SpringHandle;
use crate::property::AnimatableProperty;
use crate::value::PropertyValue;

/// Lookup of live spring handles by property
pub(crate) trait HandleRegistry {
    /// The handle for `property`, or `None` if it was never declared or the
    /// element is gone
    fn handle(&self, property: AnimatableProperty) -> Option<SpringHandle>;
}

/// Imperative handle to an animated element
///
/// Holds only a weak reference: once the element is unmounted or dropped
/// every getter returns `None` and every setter is a no-op.
///
/// # Example
///
/// ```ignore
/// let api = element.api();
/// // on drag
/// api.set_current_value(AnimatableProperty::TranslateX, pointer_x);
/// // on release
/// api.set_velocity(AnimatableProperty::TranslateX, release_velocity);
/// ```
#[derive(Clone)]
pub struct AnimateApi {
    registry: Weak<dyn HandleRegistry>,
}

impl AnimateApi {
    pub(crate) fn new(registry: Weak<dyn HandleRegistry>) -> Self {
        Self { registry }
    }

    fn handle(&self, property: AnimatableProperty) -> Option<SpringHandle> {
        self.registry.upgrade()?.handle(property)
    }

    /// Whether the element is still mounted
    pub fn is_alive(&self) -> bool {
        self.registry.strong_count() > 0
    }

    pub fn current_value(&self, property: AnimatableProperty) -> Option<PropertyValue> {
        self.handle(property).map(|h| h.current_value())
    }

    pub fn end_value(&self, property: AnimatableProperty) -> Option<PropertyValue> {
        self.handle(property).map(|h| h.end_value())
    }

    pub fn velocity(&self, property: AnimatableProperty) -> Option<PropertyValue> {
        self.handle(property).map(|h| h.velocity())
    }

    /// Jump to `value` and rest there
    ///
    /// Returns false when the property has no handle.
    pub fn set_current_value(
        &self,
        property: AnimatableProperty,
        value: impl Into<PropertyValue>,
    ) -> bool {
        match self.handle(property) {
            Some(handle) => {
                handle.set_current_value(&value.into(), false);
                true
            }
            None => false,
        }
    }

    /// Inject velocity; the spring carries it towards its end value
    ///
    /// A scalar velocity on a color moves every channel. Returns false when
    /// the property has no handle.
    pub fn set_velocity(
        &self,
        property: AnimatableProperty,
        velocity: impl Into<PropertyValue>,
    ) -> bool {
        match self.handle(property) {
            Some(handle) => {
                handle.set_velocity(&velocity.into());
                true
            }
            None => false,
        }
    }
}
