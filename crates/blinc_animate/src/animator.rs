//! Animated elements
//!
//! An [`AnimatedElement`] owns one element and a registry of spring handles,
//! one per declared property. Each [`declare`](AnimatedElement::declare)
//! reconciles a bag of target values against that registry:
//!
//! - a property seen for the first time gets a handle seeded with its
//!   displayed value (read from the element's computed style, or the target
//!   itself when the style has none);
//! - with `animate` off the handle jumps to the target and rests;
//! - otherwise the handle moves towards the target, after `delay_ms` if set.
//!
//! Properties missing from a bag are left alone. Handles are only torn down
//! by [`unmount`](AnimatedElement::unmount).
//!
//! Physics updates from any number of springs are batched into one style
//! write per frame, and the 0→1 / 1→0 transitions of the number of moving
//! springs fire the `on_start` / `on_end` callbacks.

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use blinc_animation::{SpringFactory, SpringListener};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::activity::ActivityCounter;
use crate::api::{AnimateApi, HandleRegistry};
use crate::config::AnimateConfig;
use crate::element::StyleTarget;
use crate::frame::{FrameBatcher, FrameHost, TimerToken};
use crate::handle::SpringHandle;
use crate::property::AnimatableProperty;
use crate::style::{self, to_style};
use crate::value::{PropertyBag, PropertyValue};

type Callback = Rc<dyn Fn()>;

/// Channel index of a color's alpha
const ALPHA: usize = 3;

/// A delayed end value waiting for its timer
struct PendingTarget {
    token: TimerToken,
    target: PropertyValue,
}

struct Shared<E> {
    element: RefCell<E>,
    factory: Rc<dyn SpringFactory>,
    host: Rc<dyn FrameHost>,
    /// Config at mount; spring parameters never change after this
    session: AnimateConfig,
    /// Current config; only `animate` and `delay_ms` are read from it
    config: RefCell<AnimateConfig>,
    handles: RefCell<IndexMap<AnimatableProperty, SpringHandle>>,
    pending: RefCell<IndexMap<AnimatableProperty, PendingTarget>>,
    activity: RefCell<ActivityCounter>,
    batcher: FrameBatcher,
    on_start: RefCell<Option<Callback>>,
    on_end: RefCell<Option<Callback>>,
    torn_down: Cell<bool>,
}

impl<E: StyleTarget + 'static> Shared<E> {
    fn live_handle(&self, property: AnimatableProperty) -> Option<SpringHandle> {
        if self.torn_down.get() {
            return None;
        }
        self.handles.borrow().get(&property).cloned()
    }

    /// Displayed value of `property` according to the element
    fn baseline(&self, property: AnimatableProperty) -> Option<PropertyValue> {
        let computed = self.element.borrow().computed_style()?;
        style::baseline(&computed, property)
    }

    fn create_handle(
        self: &Rc<Self>,
        property: AnimatableProperty,
        target: &PropertyValue,
    ) -> SpringHandle {
        let session = &self.session;
        let handle = SpringHandle::for_property(property, &self.factory, session.spring_config());

        if let Some(threshold) = session.rest_speed_threshold {
            handle.set_rest_speed_threshold(threshold);
        }
        if let Some(threshold) = session.rest_displacement_threshold {
            handle.set_rest_displacement_threshold(threshold);
        }
        handle.set_overshoot_clamping_enabled(session.clamp);

        let seed = match self.baseline(property) {
            Some(value) => fit_arity(value, target),
            None => target.clone(),
        };
        handle.set_current_value(&seed, false);

        handle.add_listener(Rc::new(PropertyListener {
            shared: Rc::downgrade(self),
        }));

        debug!(property = property.name(), ?seed, "created spring handle");
        self.handles.borrow_mut().insert(property, handle.clone());
        handle
    }

    /// Back every channel of `target` with a spring placed at its displayed
    /// value, so a color gaining an alpha channel starts from opaque
    fn align_channels(&self, handle: &SpringHandle, target: &PropertyValue) {
        let current = handle.current_value();
        if current.is_vector() && current.len() < target.len() {
            let seed = fit_arity(current, target);
            trace!(?seed, "seeding new color channels");
            handle.seed_missing(&seed);
        }
    }

    /// Move `property` towards `target` once `delay` has elapsed
    ///
    /// A pending delay for the same property is replaced, unless it is
    /// already heading for the same target.
    fn schedule_end_value(
        self: &Rc<Self>,
        property: AnimatableProperty,
        target: PropertyValue,
        delay: Duration,
    ) {
        let unchanged = self
            .pending
            .borrow()
            .get(&property)
            .is_some_and(|pending| pending.target == target);
        if unchanged {
            return;
        }
        self.cancel_pending(property);

        let weak = Rc::downgrade(self);
        let value = target.clone();
        let token = self.host.set_timeout(
            delay,
            Box::new(move || {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                shared.pending.borrow_mut().shift_remove(&property);
                match shared.live_handle(property) {
                    Some(handle) => handle.set_end_value(&value),
                    None => trace!(property = property.name(), "delayed target dropped"),
                }
            }),
        );
        self.pending
            .borrow_mut()
            .insert(property, PendingTarget { token, target });
    }

    fn cancel_pending(&self, property: AnimatableProperty) {
        let pending = self.pending.borrow_mut().shift_remove(&property);
        if let Some(pending) = pending {
            self.host.clear_timeout(pending.token);
        }
    }

    /// Write the current value of every handle to the element
    fn apply_style(&self) {
        if self.torn_down.get() {
            return;
        }

        let mut values = PropertyBag::new();
        for (property, handle) in self.handles.borrow().iter() {
            if let Err(err) = values.insert(*property, handle.current_value()) {
                trace!(%err, "skipping property without a value");
            }
        }

        let style = to_style(&values);
        trace!(entries = style.len(), "applying style");
        self.element.borrow_mut().apply_style(&style);
    }

    fn on_activate(&self) {
        let started = self.activity.borrow_mut().activate();
        if started {
            debug!("animation started");
            let callback = self.on_start.borrow().clone();
            if let Some(callback) = callback {
                callback();
            }
        }
    }

    fn on_at_rest(&self) {
        let ended = self.activity.borrow_mut().rest();
        if ended {
            debug!("animation ended");
            let callback = self.on_end.borrow().clone();
            if let Some(callback) = callback {
                callback();
            }
        }
    }
}

impl<E: StyleTarget + 'static> HandleRegistry for Shared<E> {
    fn handle(&self, property: AnimatableProperty) -> Option<SpringHandle> {
        self.live_handle(property)
    }
}

/// Routes spring notifications of one property to its element
struct PropertyListener<E> {
    shared: Weak<Shared<E>>,
}

impl<E: StyleTarget + 'static> PropertyListener<E> {
    fn live(&self) -> Option<Rc<Shared<E>>> {
        self.shared.upgrade().filter(|shared| !shared.torn_down.get())
    }
}

impl<E: StyleTarget + 'static> SpringListener for PropertyListener<E> {
    fn on_spring_activate(&self) {
        if let Some(shared) = self.live() {
            shared.on_activate();
        }
    }

    fn on_spring_update(&self) {
        if let Some(shared) = self.live() {
            shared.batcher.notify_dirty();
        }
    }

    fn on_spring_at_rest(&self) {
        if let Some(shared) = self.live() {
            shared.on_at_rest();
        }
    }
}

/// Match a displayed color's channel count to the declared target's
///
/// A missing alpha channel is opaque, as `rgb()` is displayed.
fn fit_arity(baseline: PropertyValue, target: &PropertyValue) -> PropertyValue {
    match (baseline, target) {
        (PropertyValue::Vector(mut seed), PropertyValue::Vector(target)) => {
            seed.truncate(target.len());
            for index in seed.len()..target.len() {
                seed.push(if index == ALPHA { 1.0 } else { target[index] });
            }
            PropertyValue::Vector(seed)
        }
        (baseline, _) => baseline,
    }
}

/// An element animated by springs
///
/// # Example
///
/// ```ignore
/// use blinc_animate::{
///     AnimatableProperty as P, AnimateConfig, AnimatedElement, FrameLoop, PropertyBag,
/// };
///
/// let frames = Rc::new(FrameLoop::new());
/// let element = AnimatedElement::mount(
///     StyleDeclaration::new(),
///     Rc::new(frames.factory()),
///     frames.clone(),
///     AnimateConfig::default(),
/// );
/// element.declare(&PropertyBag::new().with(P::TranslateX, 200.0));
/// ```
pub struct AnimatedElement<E: StyleTarget + 'static> {
    shared: Rc<Shared<E>>,
}

impl<E: StyleTarget + 'static> AnimatedElement<E> {
    /// Take ownership of `element` and start animating it
    ///
    /// Springs come from `factory`; frame callbacks and delays from `host`.
    pub fn mount(
        element: E,
        factory: Rc<dyn SpringFactory>,
        host: Rc<dyn FrameHost>,
        config: AnimateConfig,
    ) -> Self {
        debug!(?config, "mounting animated element");
        let shared = Rc::new_cyclic(|weak: &Weak<Shared<E>>| {
            let weak = weak.clone();
            let apply: Rc<dyn Fn()> = Rc::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.apply_style();
                }
            });
            Shared {
                element: RefCell::new(element),
                factory,
                batcher: FrameBatcher::new(Rc::clone(&host), apply),
                host,
                session: config.clone(),
                config: RefCell::new(config),
                handles: RefCell::new(IndexMap::new()),
                pending: RefCell::new(IndexMap::new()),
                activity: RefCell::new(ActivityCounter::new()),
                on_start: RefCell::new(None),
                on_end: RefCell::new(None),
                torn_down: Cell::new(false),
            }
        });
        Self { shared }
    }

    /// Called when the first property starts moving
    pub fn on_start(&self, callback: impl Fn() + 'static) {
        *self.shared.on_start.borrow_mut() = Some(Rc::new(callback));
    }

    /// Called when the last moving property comes to rest
    pub fn on_end(&self, callback: impl Fn() + 'static) {
        *self.shared.on_end.borrow_mut() = Some(Rc::new(callback));
    }

    /// Declare target values
    ///
    /// Safe to call with the same bag on every render; unchanged targets
    /// cause no new motion.
    pub fn declare(&self, targets: &PropertyBag) {
        let shared = &self.shared;
        if shared.torn_down.get() {
            debug!("ignoring declaration on unmounted element");
            return;
        }

        let (animate, delay) = {
            let config = shared.config.borrow();
            (config.animate, config.delay())
        };

        let mut created = false;
        for (property, target) in targets.iter() {
            let handle = match shared.live_handle(property) {
                Some(handle) => {
                    shared.align_channels(&handle, target);
                    handle
                }
                None => {
                    created = true;
                    shared.create_handle(property, target)
                }
            };

            if !animate {
                shared.cancel_pending(property);
                handle.set_current_value(target, false);
                handle.set_at_rest();
            } else if let Some(delay) = delay {
                shared.schedule_end_value(property, target.clone(), delay);
            } else {
                shared.cancel_pending(property);
                handle.set_end_value(target);
            }
        }

        // New handles are seeded silently; make sure they get written once
        if created {
            shared.batcher.notify_dirty();
        }
    }

    /// Replace the config; only `animate` and `delay_ms` affect existing
    /// handles
    pub fn set_config(&self, config: AnimateConfig) {
        *self.shared.config.borrow_mut() = config;
    }

    pub fn config(&self) -> AnimateConfig {
        self.shared.config.borrow().clone()
    }

    pub fn is_animating(&self) -> bool {
        self.shared.activity.borrow().is_animating()
    }

    pub fn is_mounted(&self) -> bool {
        !self.shared.torn_down.get()
    }

    /// Number of properties with a spring handle
    pub fn property_count(&self) -> usize {
        self.shared.handles.borrow().len()
    }

    pub fn has_property(&self, property: AnimatableProperty) -> bool {
        self.shared.handles.borrow().contains_key(&property)
    }

    /// Number of delayed targets not yet applied
    pub fn pending_delays(&self) -> usize {
        self.shared.pending.borrow().len()
    }

    /// Imperative control surface for this element
    pub fn api(&self) -> AnimateApi {
        let weak: Weak<Shared<E>> = Rc::downgrade(&self.shared);
        let registry: Weak<dyn HandleRegistry> = weak;
        AnimateApi::new(registry)
    }

    /// The owned element
    ///
    /// Style writes need the element mutably: the returned guard must be
    /// dropped before the next frame runs. Prefer
    /// [`with_element`](Self::with_element) for anything longer lived.
    pub fn element(&self) -> Ref<'_, E> {
        self.shared.element.borrow()
    }

    /// Run `f` with the owned element
    pub fn with_element<R>(&self, f: impl FnOnce(&E) -> R) -> R {
        f(&self.shared.element.borrow())
    }

    /// Stop every animation and release all springs
    ///
    /// Pending frames and delayed targets are cancelled, every handle is put
    /// at rest and destroyed, and late callbacks become no-ops. Called on
    /// drop; calling it twice is harmless.
    pub fn unmount(&self) {
        let shared = &self.shared;
        if shared.torn_down.replace(true) {
            return;
        }

        shared.batcher.cancel();

        let pending = std::mem::take(&mut *shared.pending.borrow_mut());
        for (_, pending) in pending {
            shared.host.clear_timeout(pending.token);
        }

        let handles = std::mem::take(&mut *shared.handles.borrow_mut());
        let count = handles.len();
        for (_, handle) in handles {
            handle.set_at_rest();
            handle.destroy();
        }

        shared.activity.borrow_mut().reset();
        debug!(properties = count, "unmounted animated element");
    }
}

impl<E: StyleTarget + 'static> Drop for AnimatedElement<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}
