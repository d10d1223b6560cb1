//! Frame and timer scheduling
//!
//! [`FrameHost`] is the host's frame clock: it runs callbacks on the next
//! frame boundary and after fixed delays. [`FrameBatcher`] sits on top of it
//! and coalesces any number of dirty notifications into a single frame
//! callback. [`FrameLoop`] is a deterministic host that also steps a
//! [`SpringSystem`], used headless and in tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use blinc_animation::{SpringSystem, SystemHandle};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// A requested frame callback
    pub struct FrameToken;
    /// A pending timeout
    pub struct TimerToken;
}

/// A one-shot callback run by a [`FrameHost`]
pub type HostCallback = Box<dyn FnOnce()>;

/// The host's frame clock and timer source
///
/// Callbacks always run outside any call into the host, never re-entrantly
/// from `request_frame` or `set_timeout`.
pub trait FrameHost {
    /// Run `callback` once on the next frame boundary
    fn request_frame(&self, callback: HostCallback) -> FrameToken;

    /// Drop a requested frame callback; unknown tokens are ignored
    fn cancel_frame(&self, token: FrameToken);

    /// Run `callback` once after `delay`
    fn set_timeout(&self, delay: Duration, callback: HostCallback) -> TimerToken;

    /// Drop a pending timeout; unknown tokens are ignored
    fn clear_timeout(&self, token: TimerToken);
}

/// Coalesces dirty notifications into at most one pending frame callback
///
/// `apply` runs once per frame no matter how many notifications arrived
/// before it, and reads whatever state is current when it runs.
pub struct FrameBatcher {
    host: Rc<dyn FrameHost>,
    pending: Rc<Cell<Option<FrameToken>>>,
    apply: Rc<dyn Fn()>,
}

impl FrameBatcher {
    pub fn new(host: Rc<dyn FrameHost>, apply: Rc<dyn Fn()>) -> Self {
        Self {
            host,
            pending: Rc::new(Cell::new(None)),
            apply,
        }
    }

    /// Request a frame unless one is already pending
    pub fn notify_dirty(&self) {
        if self.pending.get().is_some() {
            return;
        }
        let pending = Rc::clone(&self.pending);
        let apply = Rc::clone(&self.apply);
        let token = self.host.request_frame(Box::new(move || {
            // Clear first so writes made during apply schedule a fresh frame
            pending.set(None);
            apply();
        }));
        self.pending.set(Some(token));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    /// Drop the pending frame, if any
    pub fn cancel(&self) {
        if let Some(token) = self.pending.take() {
            self.host.cancel_frame(token);
        }
    }
}

struct Timer {
    due: Duration,
    seq: u64,
    callback: HostCallback,
}

#[derive(Default)]
struct LoopInner {
    now: Duration,
    frames: SlotMap<FrameToken, HostCallback>,
    frame_order: Vec<FrameToken>,
    timers: SlotMap<TimerToken, Timer>,
    next_seq: u64,
    frames_run: u64,
}

/// Deterministic frame host driving a [`SpringSystem`]
///
/// Each [`advance`](FrameLoop::advance) is one frame: the clock moves, due
/// timers fire in due order, physics steps, then frame callbacks run. Style
/// writes therefore always observe every physics update of their frame.
///
/// # Example
///
/// ```ignore
/// let frames = Rc::new(FrameLoop::new());
/// let element = AnimatedElement::mount(style, Rc::new(frames.factory()), frames.clone(), config);
/// element.declare(&bag);
/// frames.run_until_idle(Duration::from_millis(16), 600);
/// ```
#[derive(Clone)]
pub struct FrameLoop {
    system: SpringSystem,
    inner: Rc<RefCell<LoopInner>>,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::with_system(SpringSystem::new())
    }

    pub fn with_system(system: SpringSystem) -> Self {
        Self {
            system,
            inner: Rc::new(RefCell::new(LoopInner::default())),
        }
    }

    pub fn system(&self) -> &SpringSystem {
        &self.system
    }

    /// Spring factory backed by this loop's system
    pub fn factory(&self) -> SystemHandle {
        self.system.handle()
    }

    /// Time elapsed since the loop was created
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of frame callbacks run so far
    pub fn frames_run(&self) -> u64 {
        self.inner.borrow().frames_run
    }

    pub fn pending_frames(&self) -> usize {
        self.inner.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Whether anything is left to do: moving springs, frames or timers
    pub fn is_idle(&self) -> bool {
        let inner = self.inner.borrow();
        inner.frames.is_empty() && inner.timers.is_empty() && !self.system.has_active_springs()
    }

    /// Advance one frame of length `dt`
    pub fn advance(&self, dt: Duration) {
        let now = {
            let mut inner = self.inner.borrow_mut();
            inner.now += dt;
            inner.now
        };

        self.fire_timers(now);
        self.system.tick(dt.as_secs_f32());
        self.run_frames();
    }

    /// Only run frame callbacks, without moving the clock or physics
    pub fn flush_frames(&self) {
        self.run_frames();
    }

    /// Advance in `dt` steps until idle or `max_frames` have elapsed
    ///
    /// Returns the number of frames advanced.
    pub fn run_until_idle(&self, dt: Duration, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && !self.is_idle() {
            self.advance(dt);
            frames += 1;
        }
        frames
    }

    fn fire_timers(&self, now: Duration) {
        loop {
            // Take one timer at a time; callbacks may add or clear timers
            let next = {
                let mut inner = self.inner.borrow_mut();
                let due = inner
                    .timers
                    .iter()
                    .filter(|(_, t)| t.due <= now)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(token, _)| token);
                due.and_then(|token| inner.timers.remove(token))
            };
            match next {
                Some(timer) => (timer.callback)(),
                None => break,
            }
        }
    }

    fn run_frames(&self) {
        let callbacks: Vec<HostCallback> = {
            let mut inner = self.inner.borrow_mut();
            let order = std::mem::take(&mut inner.frame_order);
            let callbacks: Vec<_> = order
                .into_iter()
                .filter_map(|token| inner.frames.remove(token))
                .collect();
            inner.frames_run += callbacks.len() as u64;
            callbacks
        };
        for callback in callbacks {
            callback();
        }
    }
}

impl FrameHost for FrameLoop {
    fn request_frame(&self, callback: HostCallback) -> FrameToken {
        let mut inner = self.inner.borrow_mut();
        let token = inner.frames.insert(callback);
        inner.frame_order.push(token);
        token
    }

    fn cancel_frame(&self, token: FrameToken) {
        let mut inner = self.inner.borrow_mut();
        inner.frames.remove(token);
        inner.frame_order.retain(|t| *t != token);
    }

    fn set_timeout(&self, delay: Duration, callback: HostCallback) -> TimerToken {
        let mut inner = self.inner.borrow_mut();
        let due = inner.now + delay;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.timers.insert(Timer { due, seq, callback })
    }

    fn clear_timeout(&self, token: TimerToken) {
        self.inner.borrow_mut().timers.remove(token);
    }
}
