//! Easing curves for tweens

use serde::{Deserialize, Serialize};

/// Easing function applied to tween progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    /// CSS-style `cubic-bezier(x1, y1, x2, y2)`
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Material "standard" curve, used for on-screen movement
    pub const STANDARD: Easing = Easing::CubicBezier(0.4, 0.0, 0.2, 1.0);
    /// Material "decelerate" curve, used for elements entering the screen
    pub const DECELERATE: Easing = Easing::CubicBezier(0.0, 0.0, 0.2, 1.0);
    /// Material "accelerate" curve, used for elements leaving the screen
    pub const ACCELERATE: Easing = Easing::CubicBezier(0.4, 0.0, 1.0, 1.0);

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => CubicBezier::new(x1, y1, x2, y2).ease(t),
        }
    }
}

/// Cubic bezier easing matching the CSS `cubic-bezier()` timing function.
///
/// Endpoints are fixed at (0, 0) and (1, 1). Solving runs in f64 so that
/// per-frame sampling does not jitter.
#[derive(Clone, Copy, Debug)]
struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl CubicBezier {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: f64::from(x1),
            y1: f64::from(y1),
            x2: f64::from(x2),
            y2: f64::from(y2),
        }
    }

    fn ease(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let p = self.solve_x(f64::from(t));
        sample(p, self.y1, self.y2) as f32
    }

    /// Parameter `p` for which the curve's x equals `x`.
    ///
    /// Newton-Raphson first; bisection when the slope flattens out.
    fn solve_x(&self, x: f64) -> f64 {
        const EPSILON: f64 = 1e-7;

        let mut p = x;
        for _ in 0..8 {
            let err = sample(p, self.x1, self.x2) - x;
            if err.abs() < EPSILON {
                return p;
            }
            let slope = slope(p, self.x1, self.x2);
            if slope.abs() < EPSILON {
                break;
            }
            p -= err / slope;
        }

        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        p = x;
        for _ in 0..24 {
            let value = sample(p, self.x1, self.x2);
            if (value - x).abs() < EPSILON {
                break;
            }
            if value < x {
                lo = p;
            } else {
                hi = p;
            }
            p = (lo + hi) * 0.5;
        }
        p
    }
}

/// One coordinate of the curve at parameter `t`, Horner form
#[inline]
fn sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

/// Derivative of [`sample`] with respect to `t`
#[inline]
fn slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
