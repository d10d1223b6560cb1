//! Blinc Element Animation
//!
//! Spring-driven animation of an element's style properties.
//!
//! # Features
//!
//! - **Declarative Targets**: declare a bag of target values on every render;
//!   the engine moves each property there with its own spring
//! - **Grouped Springs**: colors animate as one spring per channel
//! - **Frame Batching**: any number of spring updates become one style write
//!   per frame
//! - **Lifecycle Callbacks**: `on_start` / `on_end` around the period where
//!   anything moves
//! - **Imperative Control**: read or set values and inject velocity for
//!   gesture-driven motion
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use blinc_animate::{
//!     AnimatableProperty as P, AnimateConfig, AnimatedElement, FrameLoop, PropertyBag,
//!     StyleDeclaration,
//! };
//!
//! let frames = Rc::new(FrameLoop::new());
//! let element = AnimatedElement::mount(
//!     StyleDeclaration::new(),
//!     Rc::new(frames.factory()),
//!     frames.clone(),
//!     AnimateConfig::default(),
//! );
//!
//! element.declare(&PropertyBag::new().with(P::TranslateX, 200.0).with(P::Opacity, 1.0));
//! frames.run_until_idle(std::time::Duration::from_millis(16), 600);
//! ```

pub mod activity;
pub mod animator;
pub mod api;
pub mod config;
pub mod element;
pub mod error;
pub mod frame;
pub mod handle;
pub mod property;
pub mod style;
pub mod value;

pub use activity::ActivityCounter;
pub use animator::AnimatedElement;
pub use api::AnimateApi;
pub use config::AnimateConfig;
pub use element::StyleTarget;
pub use error::{AnimateError, Result};
pub use frame::{FrameBatcher, FrameHost, FrameLoop, FrameToken, HostCallback, TimerToken};
pub use handle::{GroupedSpring, SpringHandle};
pub use property::{AnimatableProperty, PropertyKind, Unit};
pub use style::{
    baseline, current_value, current_value_named, to_style, try_current_value, StyleDeclaration,
};
pub use value::{PropertyBag, PropertyValue};

pub use blinc_animation::{SpringConfig, SpringFactory, SpringSystem};
