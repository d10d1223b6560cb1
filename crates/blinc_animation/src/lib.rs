//! Blinc Animation System
//!
//! Damped spring physics for element animation.
//!
//! # Features
//!
//! - **Spring Physics**: RK4-integrated springs with tension and friction
//! - **Rest Detection**: configurable speed and displacement thresholds
//! - **Overshoot Clamping**: springs optionally stop at their end value instead of overshooting
//! - **Listeners**: activation, per-step update and at-rest notifications
//! - **Interruptible**: springs keep their velocity when retargeted
//!
//! Consumers depend on [`SpringFactory`] and [`SpringControl`] rather than on
//! [`SpringSystem`] directly, so tests can drive them with a stub.

pub mod spring;
pub mod system;

pub use spring::{
    Spring, SpringConfig, DEFAULT_REST_DISPLACEMENT_THRESHOLD, DEFAULT_REST_SPEED_THRESHOLD,
    MAX_DELTA_TIME,
};
pub use system::{
    ListenerId, SpringControl, SpringFactory, SpringId, SpringListener, SpringRef, SpringSystem,
    SystemHandle,
};
