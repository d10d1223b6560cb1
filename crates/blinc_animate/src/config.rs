//! Animation session configuration

use std::time::Duration;

use blinc_animation::SpringConfig;
use serde::{Deserialize, Serialize};

/// Configuration for one animated element
///
/// Spring parameters (`tension`, `friction`, rest thresholds, `clamp`) are
/// fixed once the element's springs exist. `animate` and `delay_ms` are read
/// on every declaration and can be changed with
/// [`AnimatedElement::set_config`](crate::AnimatedElement::set_config).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimateConfig {
    /// Transition to new targets; when false, targets are applied immediately
    #[serde(default = "default_animate")]
    pub animate: bool,
    #[serde(default = "default_tension")]
    pub tension: f32,
    #[serde(default = "default_friction")]
    pub friction: f32,
    /// Wait this long before moving towards a newly declared target
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_speed_threshold: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_displacement_threshold: Option<f32>,
    /// Stop at the target instead of overshooting
    #[serde(default)]
    pub clamp: bool,
}

fn default_animate() -> bool {
    true
}

fn default_tension() -> f32 {
    SpringConfig::standard().tension
}

fn default_friction() -> f32 {
    SpringConfig::standard().friction
}

impl Default for AnimateConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl AnimateConfig {
    /// Animated with the standard spring (tension 230, friction 22)
    pub fn standard() -> Self {
        Self {
            animate: default_animate(),
            tension: default_tension(),
            friction: default_friction(),
            delay_ms: 0,
            rest_speed_threshold: None,
            rest_displacement_threshold: None,
            clamp: false,
        }
    }

    /// Targets are applied immediately
    pub fn instant() -> Self {
        Self {
            animate: false,
            ..Self::standard()
        }
    }

    pub fn with_animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    pub fn with_spring(mut self, config: SpringConfig) -> Self {
        self.tension = config.tension;
        self.friction = config.friction;
        self
    }

    pub fn with_tension(mut self, tension: f32) -> Self {
        self.tension = tension;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_rest_speed_threshold(mut self, threshold: f32) -> Self {
        self.rest_speed_threshold = Some(threshold);
        self
    }

    pub fn with_rest_displacement_threshold(mut self, threshold: f32) -> Self {
        self.rest_displacement_threshold = Some(threshold);
        self
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn spring_config(&self) -> SpringConfig {
        SpringConfig::new(self.tension, self.friction)
    }

    /// The configured delay, `None` when targets apply without waiting
    pub fn delay(&self) -> Option<Duration> {
        (self.delay_ms > 0).then(|| Duration::from_millis(self.delay_ms))
    }
}
