//! Spring handles: one property's physics state
//!
//! A scalar property is driven by one spring. A color is driven by a
//! [`GroupedSpring`]: one independent scalar spring per channel, all created
//! under the same config and all carrying the same settings and listeners.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use blinc_animation::{SpringConfig, SpringControl, SpringFactory, SpringListener};
use smallvec::SmallVec;
use tracing::warn;

use crate::property::{AnimatableProperty, PropertyKind};
use crate::value::PropertyValue;

type Members = SmallVec<[Rc<dyn SpringControl>; 4]>;

/// Settings remembered by a grouped handle and applied to every member
#[derive(Clone, Copy, Debug, Default)]
struct MemberSettings {
    rest_speed_threshold: Option<f32>,
    rest_displacement_threshold: Option<f32>,
    overshoot_clamping: Option<bool>,
}

impl MemberSettings {
    fn apply(&self, spring: &dyn SpringControl) {
        if let Some(threshold) = self.rest_speed_threshold {
            spring.set_rest_speed_threshold(threshold);
        }
        if let Some(threshold) = self.rest_displacement_threshold {
            spring.set_rest_displacement_threshold(threshold);
        }
        if let Some(enabled) = self.overshoot_clamping {
            spring.set_overshoot_clamping_enabled(enabled);
        }
    }
}

struct GroupedInner {
    factory: Rc<dyn SpringFactory>,
    config: SpringConfig,
    members: RefCell<Members>,
    settings: Cell<MemberSettings>,
    listeners: RefCell<SmallVec<[Rc<dyn SpringListener>; 2]>>,
    destroyed: Cell<bool>,
}

/// A vector value animated as index-aligned scalar springs
///
/// Members are created on the first write to their index (and any lower
/// index still missing). Thresholds, clamping and listeners set on the group
/// reach every member, including ones created later.
#[derive(Clone)]
pub struct GroupedSpring {
    inner: Rc<GroupedInner>,
}

impl GroupedSpring {
    pub fn new(factory: Rc<dyn SpringFactory>, config: SpringConfig) -> Self {
        Self {
            inner: Rc::new(GroupedInner {
                factory,
                config,
                members: RefCell::new(SmallVec::new()),
                settings: Cell::new(MemberSettings::default()),
                listeners: RefCell::new(SmallVec::new()),
                destroyed: Cell::new(false),
            }),
        }
    }

    /// Number of member springs created so far
    pub fn len(&self) -> usize {
        self.inner.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn members(&self) -> Members {
        self.inner.members.borrow().clone()
    }

    /// The member at `index`, creating it and any missing lower members
    fn member(&self, index: usize) -> Option<Rc<dyn SpringControl>> {
        if self.inner.destroyed.get() {
            return None;
        }
        loop {
            if let Some(spring) = self.inner.members.borrow().get(index) {
                return Some(Rc::clone(spring));
            }
            let spring = self.inner.factory.create_spring(self.inner.config);
            self.inner.settings.get().apply(spring.as_ref());
            for listener in self.inner.listeners.borrow().iter() {
                spring.add_listener(Rc::clone(listener));
            }
            self.inner.members.borrow_mut().push(spring);
        }
    }

    fn update_settings(&self, f: impl FnOnce(&mut MemberSettings)) {
        let mut settings = self.inner.settings.get();
        f(&mut settings);
        self.inner.settings.set(settings);
    }

    pub fn current_value(&self) -> SmallVec<[f32; 4]> {
        self.members().iter().map(|s| s.current_value()).collect()
    }

    pub fn end_value(&self) -> SmallVec<[f32; 4]> {
        self.members().iter().map(|s| s.end_value()).collect()
    }

    pub fn velocity(&self) -> SmallVec<[f32; 4]> {
        self.members().iter().map(|s| s.velocity()).collect()
    }

    pub fn set_current_value(&self, values: &[f32], skip_set_at_rest: bool) {
        for (index, value) in values.iter().enumerate() {
            if let Some(spring) = self.member(index) {
                spring.set_current_value(*value, skip_set_at_rest);
            }
        }
    }

    /// Create the members `values` has beyond the current ones, each placed
    /// at its value; existing members are untouched
    pub fn seed_missing(&self, values: &[f32]) {
        for (index, value) in values.iter().enumerate().skip(self.len()) {
            if let Some(spring) = self.member(index) {
                spring.set_current_value(*value, false);
            }
        }
    }

    pub fn set_end_value(&self, values: &[f32]) {
        for (index, value) in values.iter().enumerate() {
            if let Some(spring) = self.member(index) {
                spring.set_end_value(*value);
            }
        }
    }

    pub fn set_velocities(&self, velocities: &[f32]) {
        for (index, velocity) in velocities.iter().enumerate() {
            if let Some(spring) = self.member(index) {
                spring.set_velocity(*velocity);
            }
        }
    }

    /// Give every existing member the same velocity
    pub fn set_velocity(&self, velocity: f32) {
        for spring in self.members() {
            spring.set_velocity(velocity);
        }
    }

    pub fn set_rest_speed_threshold(&self, threshold: f32) {
        self.update_settings(|s| s.rest_speed_threshold = Some(threshold));
        for spring in self.members() {
            spring.set_rest_speed_threshold(threshold);
        }
    }

    pub fn set_rest_displacement_threshold(&self, threshold: f32) {
        self.update_settings(|s| s.rest_displacement_threshold = Some(threshold));
        for spring in self.members() {
            spring.set_rest_displacement_threshold(threshold);
        }
    }

    pub fn set_overshoot_clamping_enabled(&self, enabled: bool) {
        self.update_settings(|s| s.overshoot_clamping = Some(enabled));
        for spring in self.members() {
            spring.set_overshoot_clamping_enabled(enabled);
        }
    }

    pub fn add_listener(&self, listener: Rc<dyn SpringListener>) {
        self.inner.listeners.borrow_mut().push(Rc::clone(&listener));
        for spring in self.members() {
            spring.add_listener(Rc::clone(&listener));
        }
    }

    pub fn is_at_rest(&self) -> bool {
        self.members().iter().all(|s| s.is_at_rest())
    }

    pub fn set_at_rest(&self) {
        for spring in self.members() {
            spring.set_at_rest();
        }
    }

    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        let members = std::mem::take(&mut *self.inner.members.borrow_mut());
        self.inner.listeners.borrow_mut().clear();
        for spring in members {
            spring.destroy();
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }
}

/// The physics state behind one animated property
///
/// Cloning is cheap and yields another reference to the same springs.
#[derive(Clone)]
pub enum SpringHandle {
    Scalar(Rc<dyn SpringControl>),
    Grouped(GroupedSpring),
}

impl SpringHandle {
    /// Create the handle variant matching a property's kind
    pub fn for_property(
        property: AnimatableProperty,
        factory: &Rc<dyn SpringFactory>,
        config: SpringConfig,
    ) -> Self {
        match property.kind() {
            PropertyKind::Scalar => SpringHandle::Scalar(factory.create_spring(config)),
            PropertyKind::Color => {
                SpringHandle::Grouped(GroupedSpring::new(Rc::clone(factory), config))
            }
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, SpringHandle::Grouped(_))
    }

    pub fn current_value(&self) -> PropertyValue {
        match self {
            SpringHandle::Scalar(spring) => PropertyValue::Scalar(spring.current_value()),
            SpringHandle::Grouped(group) => PropertyValue::Vector(group.current_value()),
        }
    }

    pub fn end_value(&self) -> PropertyValue {
        match self {
            SpringHandle::Scalar(spring) => PropertyValue::Scalar(spring.end_value()),
            SpringHandle::Grouped(group) => PropertyValue::Vector(group.end_value()),
        }
    }

    pub fn velocity(&self) -> PropertyValue {
        match self {
            SpringHandle::Scalar(spring) => PropertyValue::Scalar(spring.velocity()),
            SpringHandle::Grouped(group) => PropertyValue::Vector(group.velocity()),
        }
    }

    pub fn set_current_value(&self, value: &PropertyValue, skip_set_at_rest: bool) {
        match (self, value) {
            (SpringHandle::Scalar(spring), PropertyValue::Scalar(v)) => {
                spring.set_current_value(*v, skip_set_at_rest)
            }
            (SpringHandle::Grouped(group), PropertyValue::Vector(v)) => {
                group.set_current_value(v, skip_set_at_rest)
            }
            _ => self.mismatch("set_current_value", value),
        }
    }

    pub fn set_end_value(&self, value: &PropertyValue) {
        match (self, value) {
            (SpringHandle::Scalar(spring), PropertyValue::Scalar(v)) => spring.set_end_value(*v),
            (SpringHandle::Grouped(group), PropertyValue::Vector(v)) => group.set_end_value(v),
            _ => self.mismatch("set_end_value", value),
        }
    }

    /// Back extra channels of `value` with new members; a no-op for scalars
    pub fn seed_missing(&self, value: &PropertyValue) {
        if let (SpringHandle::Grouped(group), PropertyValue::Vector(v)) = (self, value) {
            group.seed_missing(v);
        }
    }

    /// A scalar velocity reaches every member of a grouped handle; a vector
    /// sets members index by index
    pub fn set_velocity(&self, velocity: &PropertyValue) {
        match (self, velocity) {
            (SpringHandle::Scalar(spring), PropertyValue::Scalar(v)) => spring.set_velocity(*v),
            (SpringHandle::Grouped(group), PropertyValue::Scalar(v)) => group.set_velocity(*v),
            (SpringHandle::Grouped(group), PropertyValue::Vector(v)) => group.set_velocities(v),
            _ => self.mismatch("set_velocity", velocity),
        }
    }

    pub fn set_rest_speed_threshold(&self, threshold: f32) {
        match self {
            SpringHandle::Scalar(spring) => spring.set_rest_speed_threshold(threshold),
            SpringHandle::Grouped(group) => group.set_rest_speed_threshold(threshold),
        }
    }

    pub fn set_rest_displacement_threshold(&self, threshold: f32) {
        match self {
            SpringHandle::Scalar(spring) => spring.set_rest_displacement_threshold(threshold),
            SpringHandle::Grouped(group) => group.set_rest_displacement_threshold(threshold),
        }
    }

    pub fn set_overshoot_clamping_enabled(&self, enabled: bool) {
        match self {
            SpringHandle::Scalar(spring) => spring.set_overshoot_clamping_enabled(enabled),
            SpringHandle::Grouped(group) => group.set_overshoot_clamping_enabled(enabled),
        }
    }

    pub fn add_listener(&self, listener: Rc<dyn SpringListener>) {
        match self {
            SpringHandle::Scalar(spring) => {
                spring.add_listener(listener);
            }
            SpringHandle::Grouped(group) => group.add_listener(listener),
        }
    }

    pub fn is_at_rest(&self) -> bool {
        match self {
            SpringHandle::Scalar(spring) => spring.is_at_rest(),
            SpringHandle::Grouped(group) => group.is_at_rest(),
        }
    }

    pub fn set_at_rest(&self) {
        match self {
            SpringHandle::Scalar(spring) => spring.set_at_rest(),
            SpringHandle::Grouped(group) => group.set_at_rest(),
        }
    }

    pub fn destroy(&self) {
        match self {
            SpringHandle::Scalar(spring) => spring.destroy(),
            SpringHandle::Grouped(group) => group.destroy(),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        match self {
            SpringHandle::Scalar(spring) => spring.is_destroyed(),
            SpringHandle::Grouped(group) => group.is_destroyed(),
        }
    }

    fn mismatch(&self, op: &str, value: &PropertyValue) {
        warn!(
            op,
            grouped = self.is_grouped(),
            ?value,
            "value shape does not match spring handle"
        );
    }
}
