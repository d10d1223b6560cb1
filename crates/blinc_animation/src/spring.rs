//! Spring physics animation
//!
//! RK4-integrated damped springs with rest detection and optional overshoot
//! clamping. Supports preset configurations and custom tension/friction.

/// Speed below which a spring may be considered at rest
pub const DEFAULT_REST_SPEED_THRESHOLD: f32 = 0.001;

/// Distance from the end value below which a spring may be considered at rest
pub const DEFAULT_REST_DISPLACEMENT_THRESHOLD: f32 = 0.001;

/// Largest frame delta the integrator accepts, in seconds
///
/// Longer frames (a backgrounded window, a debugger pause) are clamped so a
/// spring never jumps across its whole trajectory in one step.
pub const MAX_DELTA_TIME: f32 = 0.064;

/// Fixed RK4 sub-step, in seconds
const SOLVER_TIMESTEP: f32 = 0.001;

/// Configuration for a spring animation
///
/// The mass is fixed at 1, so `tension` is the stiffness and `friction` the
/// damping coefficient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub tension: f32,
    pub friction: f32,
}

impl SpringConfig {
    /// Create a new spring configuration
    pub fn new(tension: f32, friction: f32) -> Self {
        Self { tension, friction }
    }

    /// Convert Origami / Quartz Composer spring values
    pub fn from_origami(tension: f32, friction: f32) -> Self {
        let tension = if tension == 0.0 {
            0.0
        } else {
            (tension - 30.0) * 3.62 + 194.0
        };
        let friction = if friction == 0.0 {
            0.0
        } else {
            (friction - 8.0) * 3.0 + 25.0
        };
        Self { tension, friction }
    }

    /// The default element spring: responsive with a small overshoot
    pub fn standard() -> Self {
        Self::new(230.0, 22.0)
    }

    /// A gentle, slow spring (good for page transitions)
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0)
    }

    /// A wobbly spring with overshoot (good for playful UI)
    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0)
    }

    /// A stiff, snappy spring (good for buttons)
    pub fn stiff() -> Self {
        Self::new(400.0, 30.0)
    }

    /// A very stiff spring with minimal oscillation (good for quick responses)
    pub fn snappy() -> Self {
        Self::new(600.0, 40.0)
    }

    /// A slow spring with no overshoot (critically damped)
    pub fn molasses() -> Self {
        Self::new(100.0, 20.0)
    }

    /// Calculate critical damping for this spring's tension
    pub fn critical_damping(&self) -> f32 {
        2.0 * self.tension.sqrt()
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.friction < self.critical_damping()
    }

    /// Check if the spring is critically damped (no oscillation, fastest settling)
    pub fn is_critically_damped(&self) -> bool {
        (self.friction - self.critical_damping()).abs() < 0.01
    }

    /// Check if the spring is overdamped (slow settling, no oscillation)
    pub fn is_overdamped(&self) -> bool {
        self.friction > self.critical_damping()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// A single damped spring
///
/// `start` is the position the spring was at when its end value was last
/// set; overshoot clamping compares against it to know which side of the
/// end value counts as "past".
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    position: f32,
    velocity: f32,
    start: f32,
    end: f32,
    rest_speed_threshold: f32,
    rest_displacement_threshold: f32,
    overshoot_clamping: bool,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            position: initial,
            velocity: 0.0,
            start: initial,
            end: initial,
            rest_speed_threshold: DEFAULT_REST_SPEED_THRESHOLD,
            rest_displacement_threshold: DEFAULT_REST_DISPLACEMENT_THRESHOLD,
            overshoot_clamping: false,
        }
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn value(&self) -> f32 {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.end
    }

    pub fn start_value(&self) -> f32 {
        self.start
    }

    /// Retarget the spring; the current position becomes the start value
    pub fn set_target(&mut self, target: f32) {
        self.start = self.position;
        self.end = target;
    }

    /// Move the spring without touching its end value or velocity
    pub fn set_value(&mut self, value: f32) {
        self.start = value;
        self.position = value;
    }

    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = velocity;
    }

    pub fn rest_speed_threshold(&self) -> f32 {
        self.rest_speed_threshold
    }

    pub fn set_rest_speed_threshold(&mut self, threshold: f32) {
        self.rest_speed_threshold = threshold;
    }

    pub fn rest_displacement_threshold(&self) -> f32 {
        self.rest_displacement_threshold
    }

    pub fn set_rest_displacement_threshold(&mut self, threshold: f32) {
        self.rest_displacement_threshold = threshold;
    }

    pub fn is_overshoot_clamping(&self) -> bool {
        self.overshoot_clamping
    }

    pub fn set_overshoot_clamping(&mut self, enabled: bool) {
        self.overshoot_clamping = enabled;
    }

    /// Hold the spring where it is: the end value becomes the current
    /// position and velocity drops to zero
    pub fn hold(&mut self) {
        self.end = self.position;
        self.start = self.position;
        self.velocity = 0.0;
    }

    /// Check if the spring is at rest (slow enough and close enough to its end)
    pub fn is_at_rest(&self) -> bool {
        self.velocity.abs() <= self.rest_speed_threshold
            && ((self.end - self.position).abs() <= self.rest_displacement_threshold
                || self.config.tension == 0.0)
    }

    /// Check if the spring moved past its end value, as seen from its start
    pub fn is_overshooting(&self) -> bool {
        self.config.tension > 0.0
            && ((self.start < self.end && self.position > self.end)
                || (self.start > self.end && self.position < self.end))
    }

    /// Advance the simulation by `dt` seconds
    ///
    /// Returns `true` once the spring has come to rest (or was clamped at its
    /// end value), in which case position and velocity are snapped exactly.
    pub fn step(&mut self, dt: f32) -> bool {
        if self.is_at_rest() {
            self.snap_to_rest();
            return true;
        }

        let dt = dt.clamp(0.0, MAX_DELTA_TIME);
        let steps = (dt / SOLVER_TIMESTEP).ceil().max(1.0) as u32;
        let h = dt / steps as f32;

        for _ in 0..steps {
            self.integrate(h);
            if self.overshoot_clamping && self.is_overshooting() {
                self.snap_to_rest();
                return true;
            }
        }

        if self.is_at_rest() {
            self.snap_to_rest();
            return true;
        }
        false
    }

    fn snap_to_rest(&mut self) {
        if self.config.tension > 0.0 {
            self.position = self.end;
        } else {
            self.end = self.position;
        }
        self.start = self.end;
        self.velocity = 0.0;
    }

    /// One RK4 step of size `dt`
    fn integrate(&mut self, dt: f32) {
        let k1_v = self.acceleration(self.position, self.velocity);
        let k1_x = self.velocity;

        let k2_v = self.acceleration(
            self.position + k1_x * dt * 0.5,
            self.velocity + k1_v * dt * 0.5,
        );
        let k2_x = self.velocity + k1_v * dt * 0.5;

        let k3_v = self.acceleration(
            self.position + k2_x * dt * 0.5,
            self.velocity + k2_v * dt * 0.5,
        );
        let k3_x = self.velocity + k2_v * dt * 0.5;

        let k4_v = self.acceleration(self.position + k3_x * dt, self.velocity + k3_v * dt);
        let k4_x = self.velocity + k3_v * dt;

        self.velocity += (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * dt / 6.0;
        self.position += (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * dt / 6.0;
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        -self.config.tension * (x - self.end) - self.config.friction * v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(spring: &mut Spring, seconds: f32) {
        let frames = (seconds * 60.0) as usize;
        for _ in 0..frames {
            spring.step(1.0 / 60.0);
        }
    }

    #[test]
    fn test_spring_settles_to_target() {
        let mut spring = Spring::new(SpringConfig::stiff(), 0.0);
        spring.set_target(100.0);

        run(&mut spring, 3.0);

        assert!(spring.is_at_rest());
        assert_eq!(spring.value(), 100.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn test_spring_inherits_velocity() {
        let mut spring = Spring::new(SpringConfig::wobbly(), 0.0);
        spring.set_target(100.0);

        for _ in 0..10 {
            spring.step(1.0 / 60.0);
        }

        let velocity = spring.velocity();
        assert!(velocity > 0.0);

        // Change target mid-flight - velocity should continue
        spring.set_target(50.0);
        assert_eq!(spring.velocity(), velocity);
    }

    #[test]
    fn test_spring_presets() {
        assert!(SpringConfig::wobbly().is_underdamped());
        assert!(SpringConfig::gentle().is_underdamped());
        assert!(SpringConfig::stiff().is_underdamped());
        assert!(SpringConfig::standard().is_underdamped());
        assert!(SpringConfig::molasses().is_critically_damped());
        assert!(SpringConfig::new(100.0, 80.0).is_overdamped());
    }

    #[test]
    fn test_origami_conversion() {
        let config = SpringConfig::from_origami(40.0, 7.0);
        assert!((config.tension - 230.2).abs() < 0.01);
        assert!((config.friction - 22.0).abs() < 0.01);
        assert_eq!(SpringConfig::from_origami(0.0, 0.0), SpringConfig::new(0.0, 0.0));
    }

    #[test]
    fn test_spring_rk4_stability() {
        let mut spring = Spring::new(SpringConfig::stiff(), 0.0);
        spring.set_target(1000.0);

        // Oversized frames are clamped to MAX_DELTA_TIME and sub-stepped
        for _ in 0..100 {
            spring.step(0.5);
            assert!(spring.value() < 2000.0);
            assert!(spring.value() > -500.0);
        }
    }

    #[test]
    fn test_unclamped_spring_overshoots() {
        let mut spring = Spring::new(SpringConfig::new(500.0, 22.0), 0.0);
        spring.set_target(200.0);

        let mut peak = f32::MIN;
        for _ in 0..180 {
            spring.step(1.0 / 60.0);
            peak = peak.max(spring.value());
        }
        assert!(peak > 200.0);
    }

    #[test]
    fn test_clamped_spring_never_overshoots() {
        let mut spring = Spring::new(SpringConfig::new(500.0, 22.0), 0.0);
        spring.set_overshoot_clamping(true);
        spring.set_target(200.0);

        let mut came_to_rest = false;
        for _ in 0..180 {
            came_to_rest |= spring.step(1.0 / 60.0);
            assert!(spring.value() <= 200.0);
        }
        assert!(came_to_rest);
        assert_eq!(spring.value(), 200.0);
    }

    #[test]
    fn test_clamping_works_downwards() {
        let mut spring = Spring::new(SpringConfig::new(500.0, 22.0), 200.0);
        spring.set_overshoot_clamping(true);
        spring.set_target(0.0);

        for _ in 0..180 {
            spring.step(1.0 / 60.0);
            assert!(spring.value() >= 0.0);
        }
    }

    #[test]
    fn test_rest_thresholds() {
        let mut spring = Spring::new(SpringConfig::standard(), 0.0);
        spring.set_rest_displacement_threshold(10.0);
        spring.set_rest_speed_threshold(1000.0);
        spring.set_target(5.0);

        // Within both thresholds straight away
        assert!(spring.is_at_rest());
        assert!(spring.step(1.0 / 60.0));
        assert_eq!(spring.value(), 5.0);
    }

    #[test]
    fn test_hold_freezes_in_place() {
        let mut spring = Spring::new(SpringConfig::standard(), 0.0);
        spring.set_target(100.0);
        for _ in 0..5 {
            spring.step(1.0 / 60.0);
        }
        let here = spring.value();
        spring.hold();
        assert!(spring.is_at_rest());
        assert_eq!(spring.target(), here);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn test_zero_tension_rests_when_slow() {
        let mut spring = Spring::new(SpringConfig::new(0.0, 10.0), 0.0);
        spring.set_velocity(50.0);
        run(&mut spring, 3.0);
        assert!(spring.is_at_rest());
        assert!(spring.value() > 0.0);
        assert_eq!(spring.target(), spring.value());
    }
}
