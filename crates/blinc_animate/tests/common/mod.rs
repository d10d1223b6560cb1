//! A recording stub integrator
//!
//! Springs never move on their own. Every call is logged, and tests fire
//! activate / update / at-rest notifications by hand.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use blinc_animate::{
    AnimateConfig, AnimatedElement, FrameLoop, SpringConfig, SpringFactory, StyleDeclaration,
};
use blinc_animation::{ListenerId, SpringControl, SpringId, SpringListener};

pub const FRAME: Duration = Duration::from_millis(16);

/// One call made on a stub spring, tagged with the spring's creation index
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Create(usize),
    SetCurrentValue(usize, f32),
    SetEndValue(usize, f32),
    SetVelocity(usize, f32),
    SetAtRest(usize),
    Destroy(usize),
}

struct StubState {
    current: f32,
    end: f32,
    velocity: f32,
    at_rest: bool,
    clamp: bool,
    destroyed: bool,
    listeners: Vec<Rc<dyn SpringListener>>,
}

pub struct StubSpring {
    index: usize,
    log: Rc<RefCell<Vec<Call>>>,
    state: RefCell<StubState>,
}

impl StubSpring {
    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }

    fn notify(&self, f: impl Fn(&dyn SpringListener)) {
        let listeners = {
            let state = self.state.borrow();
            if state.destroyed {
                return;
            }
            state.listeners.clone()
        };
        for listener in listeners {
            f(listener.as_ref());
        }
    }

    pub fn fire_activate(&self) {
        self.state.borrow_mut().at_rest = false;
        self.notify(|l| l.on_spring_activate());
    }

    pub fn fire_update(&self) {
        self.notify(|l| l.on_spring_update());
    }

    pub fn fire_at_rest(&self) {
        self.state.borrow_mut().at_rest = true;
        self.notify(|l| l.on_spring_at_rest());
    }

    /// Move the spring as if the integrator had stepped it
    pub fn step_to(&self, value: f32) {
        self.state.borrow_mut().current = value;
        self.fire_update();
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

impl SpringControl for StubSpring {
    fn id(&self) -> SpringId {
        SpringId::default()
    }

    fn current_value(&self) -> f32 {
        self.state.borrow().current
    }

    fn set_current_value(&self, value: f32, skip_set_at_rest: bool) {
        self.record(Call::SetCurrentValue(self.index, value));
        {
            let mut state = self.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.current = value;
            if !skip_set_at_rest {
                state.end = value;
                state.velocity = 0.0;
            }
        }
        self.fire_update();
    }

    fn end_value(&self) -> f32 {
        self.state.borrow().end
    }

    fn set_end_value(&self, value: f32) {
        self.record(Call::SetEndValue(self.index, value));
        self.state.borrow_mut().end = value;
    }

    fn velocity(&self) -> f32 {
        self.state.borrow().velocity
    }

    fn set_velocity(&self, velocity: f32) {
        self.record(Call::SetVelocity(self.index, velocity));
        self.state.borrow_mut().velocity = velocity;
    }

    fn is_at_rest(&self) -> bool {
        self.state.borrow().at_rest
    }

    fn set_at_rest(&self) {
        self.record(Call::SetAtRest(self.index));
        let mut state = self.state.borrow_mut();
        state.end = state.current;
        state.velocity = 0.0;
    }

    fn set_rest_speed_threshold(&self, _threshold: f32) {}

    fn set_rest_displacement_threshold(&self, _threshold: f32) {}

    fn set_overshoot_clamping_enabled(&self, enabled: bool) {
        self.state.borrow_mut().clamp = enabled;
    }

    fn is_overshoot_clamping_enabled(&self) -> bool {
        self.state.borrow().clamp
    }

    fn add_listener(&self, listener: Rc<dyn SpringListener>) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.listeners.push(listener);
        ListenerId::from_raw(state.listeners.len() as u64 - 1)
    }

    fn remove_listener(&self, id: ListenerId) {
        let mut state = self.state.borrow_mut();
        let index = id.to_raw() as usize;
        if index < state.listeners.len() {
            state.listeners.remove(index);
        }
    }

    fn remove_all_listeners(&self) {
        self.state.borrow_mut().listeners.clear();
    }

    fn destroy(&self) {
        self.record(Call::Destroy(self.index));
        let mut state = self.state.borrow_mut();
        state.destroyed = true;
        state.listeners.clear();
    }

    fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }
}

/// Factory handing out recording stub springs
#[derive(Clone, Default)]
pub struct StubFactory {
    log: Rc<RefCell<Vec<Call>>>,
    springs: Rc<RefCell<Vec<Rc<StubSpring>>>>,
    configs: Rc<RefCell<Vec<SpringConfig>>>,
}

impl StubFactory {
    pub fn spring(&self, index: usize) -> Rc<StubSpring> {
        Rc::clone(&self.springs.borrow()[index])
    }

    pub fn spring_count(&self) -> usize {
        self.springs.borrow().len()
    }

    pub fn config(&self, index: usize) -> SpringConfig {
        self.configs.borrow()[index]
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.log.borrow_mut().clear();
    }

    /// End values set so far, in call order
    pub fn end_values(&self) -> Vec<(usize, f32)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SetEndValue(i, v) => Some((i, v)),
                _ => None,
            })
            .collect()
    }
}

impl SpringFactory for StubFactory {
    fn create_spring(&self, config: SpringConfig) -> Rc<dyn SpringControl> {
        let index = self.springs.borrow().len();
        self.log.borrow_mut().push(Call::Create(index));
        let spring = Rc::new(StubSpring {
            index,
            log: Rc::clone(&self.log),
            state: RefCell::new(StubState {
                current: 0.0,
                end: 0.0,
                velocity: 0.0,
                at_rest: true,
                clamp: false,
                destroyed: false,
                listeners: Vec::new(),
            }),
        });
        self.springs.borrow_mut().push(Rc::clone(&spring));
        self.configs.borrow_mut().push(config);
        spring
    }
}

/// Counts lifecycle callbacks
#[derive(Clone, Default)]
pub struct Lifecycle {
    pub starts: Rc<Cell<u32>>,
    pub ends: Rc<Cell<u32>>,
}

impl Lifecycle {
    pub fn attach(&self, element: &AnimatedElement<StyleDeclaration>) {
        let starts = Rc::clone(&self.starts);
        element.on_start(move || starts.set(starts.get() + 1));
        let ends = Rc::clone(&self.ends);
        element.on_end(move || ends.set(ends.get() + 1));
    }

    pub fn counts(&self) -> (u32, u32) {
        (self.starts.get(), self.ends.get())
    }
}

/// An element with an empty style, stub springs and a frame loop
pub fn mount_stub(
    config: AnimateConfig,
) -> (StubFactory, Rc<FrameLoop>, AnimatedElement<StyleDeclaration>) {
    mount_stub_with(StyleDeclaration::new(), config)
}

pub fn mount_stub_with(
    style: StyleDeclaration,
    config: AnimateConfig,
) -> (StubFactory, Rc<FrameLoop>, AnimatedElement<StyleDeclaration>) {
    let factory = StubFactory::default();
    let frames = Rc::new(FrameLoop::new());
    let element = AnimatedElement::mount(style, Rc::new(factory.clone()), frames.clone(), config);
    (factory, frames, element)
}

/// An element driven by the real spring system
pub fn mount_real(config: AnimateConfig) -> (Rc<FrameLoop>, AnimatedElement<StyleDeclaration>) {
    let frames = Rc::new(FrameLoop::new());
    let element = AnimatedElement::mount(
        StyleDeclaration::new(),
        Rc::new(frames.factory()),
        frames.clone(),
        config,
    );
    (frames, element)
}

pub fn style_of(element: &AnimatedElement<StyleDeclaration>, key: &str) -> Option<String> {
    element.with_element(|style| style.get(key).map(str::to_string))
}
