//! Spring system
//!
//! Owns every physics spring, steps the active ones and notifies listeners
//! when a spring leaves rest, moves, or comes back to rest. Springs are
//! addressed through [`SpringRef`], which holds a weak reference to the
//! system so a dropped system turns every spring operation into a no-op.
//!
//! Consumers should program against [`SpringFactory`] and [`SpringControl`]
//! so a deterministic stand-in can replace the integrator in tests.
//!
//! # Example
//!
//! ```ignore
//! use blinc_animation::{SpringConfig, SpringControl, SpringFactory, SpringSystem};
//!
//! let system = SpringSystem::new();
//! let spring = system.create_spring(SpringConfig::standard());
//! spring.set_end_value(100.0);
//!
//! while system.tick(1.0 / 60.0) {}
//! assert_eq!(spring.current_value(), 100.0);
//! ```

use crate::spring::{Spring, SpringConfig};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;

new_key_type! {
    /// Handle to a spring registered with a [`SpringSystem`]
    pub struct SpringId;
}

/// Identifies a listener registration on one spring
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Convert to a raw u64 for storage or FFI
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Create from a raw u64, e.g. in another [`SpringControl`] implementation
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Receives spring lifecycle notifications
///
/// All methods default to no-ops so listeners only implement what they need.
pub trait SpringListener {
    /// The spring left rest
    fn on_spring_activate(&self) {}

    /// The spring's position changed (once per integration step while active)
    fn on_spring_update(&self) {}

    /// Speed and displacement both dropped below the rest thresholds
    fn on_spring_at_rest(&self) {}
}

/// Control surface of one scalar physics spring
pub trait SpringControl {
    fn id(&self) -> SpringId;
    fn current_value(&self) -> f32;
    /// Move the spring. Unless `skip_set_at_rest` is set, the end value follows
    /// and velocity is zeroed.
    fn set_current_value(&self, value: f32, skip_set_at_rest: bool);
    fn end_value(&self) -> f32;
    fn set_end_value(&self, value: f32);
    fn velocity(&self) -> f32;
    fn set_velocity(&self, velocity: f32);
    fn is_at_rest(&self) -> bool;
    /// Hold the spring at its current position without notifying
    fn set_at_rest(&self);
    fn set_rest_speed_threshold(&self, threshold: f32);
    fn set_rest_displacement_threshold(&self, threshold: f32);
    fn set_overshoot_clamping_enabled(&self, enabled: bool);
    fn is_overshoot_clamping_enabled(&self) -> bool;
    fn add_listener(&self, listener: Rc<dyn SpringListener>) -> ListenerId;
    fn remove_listener(&self, id: ListenerId);
    fn remove_all_listeners(&self);
    /// Remove the spring from its system; no notification fires afterwards
    fn destroy(&self);
    fn is_destroyed(&self) -> bool;
}

/// Creates scalar springs
pub trait SpringFactory {
    fn create_spring(&self, config: SpringConfig) -> Rc<dyn SpringControl>;
}

struct SpringEntry {
    spring: Spring,
    /// Rest state as last reported to listeners
    was_at_rest: bool,
    /// Whether `tick` should keep stepping this spring
    active: bool,
    listeners: SmallVec<[(ListenerId, Rc<dyn SpringListener>); 2]>,
}

impl SpringEntry {
    fn new(spring: Spring) -> Self {
        Self {
            spring,
            was_at_rest: true,
            active: false,
            listeners: SmallVec::new(),
        }
    }
}

/// Internal state of the spring system
struct SystemInner {
    springs: SlotMap<SpringId, SpringEntry>,
    next_listener: u64,
    last_frame: Instant,
}

#[derive(Clone, Copy, Debug)]
enum Notification {
    Activate,
    Update,
    AtRest,
}

/// A pending notification, dispatched once the system borrow is released
struct Pending {
    spring: SpringId,
    kind: Notification,
    listeners: SmallVec<[Rc<dyn SpringListener>; 2]>,
}

fn listeners_of(entry: &SpringEntry) -> SmallVec<[Rc<dyn SpringListener>; 2]> {
    entry.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
}

/// Deliver notifications, skipping springs destroyed by an earlier listener
fn dispatch(inner: &Rc<RefCell<SystemInner>>, pending: Vec<Pending>) {
    for note in pending {
        if !inner.borrow().springs.contains_key(note.spring) {
            continue;
        }
        for listener in &note.listeners {
            match note.kind {
                Notification::Activate => listener.on_spring_activate(),
                Notification::Update => listener.on_spring_update(),
                Notification::AtRest => listener.on_spring_at_rest(),
            }
        }
    }
}

/// The spring system that steps all active springs
///
/// There is typically one per process, shared by every animated element.
/// Cloning yields another owner of the same system.
#[derive(Clone)]
pub struct SpringSystem {
    inner: Rc<RefCell<SystemInner>>,
}

impl SpringSystem {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SystemInner {
                springs: SlotMap::with_key(),
                next_listener: 0,
                last_frame: Instant::now(),
            })),
        }
    }

    /// Get a weak handle for passing to components
    pub fn handle(&self) -> SystemHandle {
        SystemHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Register a new spring at rest at zero
    pub fn create(&self, config: SpringConfig) -> SpringRef {
        let id = self
            .inner
            .borrow_mut()
            .springs
            .insert(SpringEntry::new(Spring::new(config, 0.0)));
        SpringRef {
            id,
            system: Rc::downgrade(&self.inner),
        }
    }

    /// Step every active spring by `dt` seconds
    ///
    /// Returns true if any spring is still active (needs another tick).
    pub fn tick(&self, dt: f32) -> bool {
        let pending = {
            let mut inner = self.inner.borrow_mut();
            inner.last_frame = Instant::now();
            let mut pending = Vec::new();

            for (id, entry) in inner.springs.iter_mut() {
                if !entry.active {
                    continue;
                }
                if entry.was_at_rest && entry.spring.is_at_rest() {
                    entry.active = false;
                    continue;
                }

                let at_rest = entry.spring.step(dt);
                let listeners = listeners_of(entry);

                if entry.was_at_rest {
                    entry.was_at_rest = false;
                    pending.push(Pending {
                        spring: id,
                        kind: Notification::Activate,
                        listeners: listeners.clone(),
                    });
                }
                pending.push(Pending {
                    spring: id,
                    kind: Notification::Update,
                    listeners: listeners.clone(),
                });
                if at_rest {
                    entry.was_at_rest = true;
                    entry.active = false;
                    pending.push(Pending {
                        spring: id,
                        kind: Notification::AtRest,
                        listeners,
                    });
                }
            }
            pending
        };

        dispatch(&self.inner, pending);
        self.has_active_springs()
    }

    /// Step using the wall-clock time elapsed since the previous tick
    pub fn tick_now(&self) -> bool {
        let dt = {
            let inner = self.inner.borrow();
            (Instant::now() - inner.last_frame).as_secs_f32()
        };
        self.tick(dt)
    }

    /// Check if any spring still needs stepping
    pub fn has_active_springs(&self) -> bool {
        self.inner.borrow().springs.values().any(|e| e.active)
    }

    /// Get the number of registered springs
    pub fn spring_count(&self) -> usize {
        self.inner.borrow().springs.len()
    }

    /// Get the number of springs currently being stepped
    pub fn active_count(&self) -> usize {
        self.inner.borrow().springs.values().filter(|e| e.active).count()
    }

    /// Snapshot a spring's physics state
    pub fn get_spring(&self, id: SpringId) -> Option<Spring> {
        self.inner.borrow().springs.get(id).map(|e| e.spring)
    }
}

impl Default for SpringSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SpringFactory for SpringSystem {
    fn create_spring(&self, config: SpringConfig) -> Rc<dyn SpringControl> {
        Rc::new(self.create(config))
    }
}

/// A weak handle to the spring system
///
/// It won't keep the system alive. Springs created through a dead handle
/// are already destroyed.
#[derive(Clone)]
pub struct SystemHandle {
    inner: Weak<RefCell<SystemInner>>,
}

impl SystemHandle {
    /// Register a spring, or `None` if the system is gone
    pub fn register_spring(&self, config: SpringConfig) -> Option<SpringRef> {
        self.inner.upgrade().map(|inner| {
            let id = inner
                .borrow_mut()
                .springs
                .insert(SpringEntry::new(Spring::new(config, 0.0)));
            SpringRef {
                id,
                system: Rc::downgrade(&inner),
            }
        })
    }

    /// Check if the system is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl SpringFactory for SystemHandle {
    fn create_spring(&self, config: SpringConfig) -> Rc<dyn SpringControl> {
        match self.register_spring(config) {
            Some(spring) => Rc::new(spring),
            None => {
                tracing::warn!("spring system dropped; creating a detached spring");
                Rc::new(SpringRef {
                    id: SpringId::default(),
                    system: Weak::new(),
                })
            }
        }
    }
}

/// Reference to one spring inside a [`SpringSystem`]
#[derive(Clone)]
pub struct SpringRef {
    id: SpringId,
    system: Weak<RefCell<SystemInner>>,
}

impl SpringRef {
    /// Apply a function to the spring entry if it still exists
    fn with_entry<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut SpringEntry) -> R,
    {
        let inner = self.system.upgrade()?;
        let mut guard = inner.borrow_mut();
        guard.springs.get_mut(self.id).map(f)
    }
}

impl SpringControl for SpringRef {
    fn id(&self) -> SpringId {
        self.id
    }

    fn current_value(&self) -> f32 {
        self.with_entry(|e| e.spring.value()).unwrap_or(0.0)
    }

    fn set_current_value(&self, value: f32, skip_set_at_rest: bool) {
        let listeners = self.with_entry(|e| {
            e.spring.set_value(value);
            if !skip_set_at_rest {
                e.spring.hold();
            }
            listeners_of(e)
        });

        if let (Some(listeners), Some(inner)) = (listeners, self.system.upgrade()) {
            dispatch(
                &inner,
                vec![Pending {
                    spring: self.id,
                    kind: Notification::Update,
                    listeners,
                }],
            );
        }
    }

    fn end_value(&self) -> f32 {
        self.with_entry(|e| e.spring.target()).unwrap_or(0.0)
    }

    fn set_end_value(&self, value: f32) {
        self.with_entry(|e| {
            if e.spring.target() == value && e.spring.is_at_rest() {
                return;
            }
            e.spring.set_target(value);
            e.active = true;
        });
    }

    fn velocity(&self) -> f32 {
        self.with_entry(|e| e.spring.velocity()).unwrap_or(0.0)
    }

    fn set_velocity(&self, velocity: f32) {
        self.with_entry(|e| {
            if e.spring.velocity() == velocity {
                return;
            }
            e.spring.set_velocity(velocity);
            e.active = true;
        });
    }

    fn is_at_rest(&self) -> bool {
        self.with_entry(|e| e.spring.is_at_rest()).unwrap_or(true)
    }

    fn set_at_rest(&self) {
        self.with_entry(|e| e.spring.hold());
    }

    fn set_rest_speed_threshold(&self, threshold: f32) {
        self.with_entry(|e| e.spring.set_rest_speed_threshold(threshold));
    }

    fn set_rest_displacement_threshold(&self, threshold: f32) {
        self.with_entry(|e| e.spring.set_rest_displacement_threshold(threshold));
    }

    fn set_overshoot_clamping_enabled(&self, enabled: bool) {
        self.with_entry(|e| e.spring.set_overshoot_clamping(enabled));
    }

    fn is_overshoot_clamping_enabled(&self) -> bool {
        self.with_entry(|e| e.spring.is_overshoot_clamping()).unwrap_or(false)
    }

    fn add_listener(&self, listener: Rc<dyn SpringListener>) -> ListenerId {
        let Some(inner) = self.system.upgrade() else {
            return ListenerId(u64::MAX);
        };
        let mut guard = inner.borrow_mut();
        let id = ListenerId(guard.next_listener);
        guard.next_listener += 1;
        if let Some(entry) = guard.springs.get_mut(self.id) {
            entry.listeners.push((id, listener));
        }
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.with_entry(|e| e.listeners.retain(|(lid, _)| *lid != id));
    }

    fn remove_all_listeners(&self) {
        self.with_entry(|e| e.listeners.clear());
    }

    fn destroy(&self) {
        if let Some(inner) = self.system.upgrade() {
            inner.borrow_mut().springs.remove(self.id);
        }
    }

    fn is_destroyed(&self) -> bool {
        self.system
            .upgrade()
            .map(|inner| !inner.borrow().springs.contains_key(self.id))
            .unwrap_or(true)
    }
}
