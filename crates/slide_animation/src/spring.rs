//! Spring physics
//!
//! Damped harmonic oscillator integrated with RK4. Springs are used for snap
//! transitions because they accept the velocity a drag gesture was released
//! with, so the sheet keeps moving instead of restarting from rest.

use serde::{Deserialize, Serialize};

/// Largest integration step (seconds). Bigger frames are subdivided.
const MAX_STEP: f32 = 1.0 / 240.0;

/// Spring configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Distance from the target below which the spring may come to rest
    #[serde(default = "default_rest_delta")]
    pub rest_delta: f32,
    /// Speed (units per second) below which the spring may come to rest
    #[serde(default = "default_rest_velocity")]
    pub rest_velocity: f32,
}

fn default_rest_delta() -> f32 {
    0.01
}

fn default_rest_velocity() -> f32 {
    0.1
}

impl SpringConfig {
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            rest_delta: default_rest_delta(),
            rest_velocity: default_rest_velocity(),
        }
    }

    /// Critically damped, no visible overshoot
    pub fn stiff() -> Self {
        Self::new(400.0, 40.0, 1.0)
    }

    /// Quick with a hint of overshoot
    pub fn snappy() -> Self {
        Self::new(300.0, 30.0, 1.0)
    }

    pub fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }

    /// Damping ratio; 1.0 is critical damping
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::snappy()
    }
}

/// A spring-animated value
#[derive(Clone, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
    /// Hard limits on `value`; hitting one kills the velocity into it
    bounds: Option<(f32, f32)>,
}

impl Spring {
    /// A spring at rest at `value`
    pub fn new(config: SpringConfig, value: f32) -> Self {
        Self {
            config,
            value,
            velocity: 0.0,
            target: value,
            bounds: None,
        }
    }

    /// Builder: start moving with `velocity` (units per second)
    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder: head towards `target`
    pub fn with_target(mut self, target: f32) -> Self {
        self.target = target;
        self
    }

    /// Builder: never let the value leave `[min, max]`
    pub fn with_bounds(mut self, min: f32, max: f32) -> Self {
        self.bounds = Some((min.min(max), min.max(max)));
        self.value = self.clamp(self.value);
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    /// Retarget the spring, keeping its current velocity
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < self.config.rest_delta
            && self.velocity.abs() < self.config.rest_velocity
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Once the spring is within its rest thresholds it snaps exactly onto the
    /// target with zero velocity.
    pub fn step(&mut self, dt: f32) {
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        let mut remaining = dt.max(0.0);
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP);
            self.integrate(h);
            self.apply_bounds();
            remaining -= h;
        }

        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }

    fn clamp(&self, value: f32) -> f32 {
        match self.bounds {
            Some((min, max)) => value.clamp(min, max),
            None => value,
        }
    }

    fn apply_bounds(&mut self) {
        let clamped = self.clamp(self.value);
        if clamped != self.value {
            self.value = clamped;
            self.velocity = 0.0;
        }
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let SpringConfig {
            stiffness,
            damping,
            mass,
            ..
        } = self.config;
        (-stiffness * (x - self.target) - damping * v) / mass
    }

    /// One RK4 step of size `h`
    fn integrate(&mut self, h: f32) {
        let (x, v) = (self.value, self.velocity);

        let dx1 = v;
        let dv1 = self.acceleration(x, v);

        let dx2 = v + dv1 * h * 0.5;
        let dv2 = self.acceleration(x + dx1 * h * 0.5, dx2);

        let dx3 = v + dv2 * h * 0.5;
        let dv3 = self.acceleration(x + dx2 * h * 0.5, dx3);

        let dx4 = v + dv3 * h;
        let dv4 = self.acceleration(x + dx3 * h, dx4);

        self.value = x + h / 6.0 * (dx1 + 2.0 * dx2 + 2.0 * dx3 + dx4);
        self.velocity = v + h / 6.0 * (dv1 + 2.0 * dv2 + 2.0 * dv3 + dv4);
    }
}
