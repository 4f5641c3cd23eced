use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::ops::Add;

use serde::Serialize;

use crate::error::ConfigError;

/// Orientation of the lander in radians, kept in `[0, 2π)`.
///
/// Zero points straight up. Positive rotation tilts the nose towards
/// negative x (counter-clockwise with y pointing up), which is also the
/// direction the main engine pushes: `(-sin, cos)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Angle {
    radians: f64,
}

fn normalized(radians: f64) -> f64 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid may round tiny negatives up to exactly TAU
    if wrapped >= TAU {
        0.
    } else {
        wrapped
    }
}

impl Angle {
    pub fn new(radians: f64) -> Self {
        Self {
            radians: normalized(radians),
        }
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self::new(degrees.to_radians())
    }

    pub fn up() -> Self {
        Self { radians: 0. }
    }

    pub fn radians(&self) -> f64 {
        self.radians
    }

    pub fn degrees(&self) -> f64 {
        self.radians.to_degrees()
    }

    pub fn set_radians(&mut self, radians: f64) {
        self.radians = normalized(radians);
    }

    pub fn set_degrees(&mut self, degrees: f64) {
        self.set_radians(degrees.to_radians());
    }

    pub fn set_up(&mut self) {
        self.radians = 0.;
    }

    pub fn set_down(&mut self) {
        self.radians = PI;
    }

    pub fn set_left(&mut self) {
        self.radians = FRAC_PI_2;
    }

    pub fn set_right(&mut self) {
        self.radians = PI + FRAC_PI_2;
    }

    pub fn reverse(&mut self) {
        self.set_radians(self.radians + PI);
    }

    pub fn add(&mut self, delta: f64) {
        self.set_radians(self.radians + delta);
    }

    /// True when the angle lies within `tolerance` of upright on either side
    /// of the wrap point.
    pub fn is_near_upright(&self, tolerance: f64) -> bool {
        self.radians < tolerance || self.radians > TAU - tolerance
    }
}

/// Size of the simulated domain, meters. The origin is the lower-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    width: f64,
    height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        assert!(width > 0. && height > 0., "bounds must be positive");
        Self { width, height }
    }

    /// Checked constructor for sizes coming from outside the program.
    pub fn try_new(width: f64, height: f64) -> Result<Self, ConfigError> {
        let valid = |v: f64| v.is_finite() && v > 0.;
        if valid(width) && valid(height) {
            Ok(Self { width, height })
        } else {
            Err(ConfigError::invalid(
                "Bounds",
                format!("expected positive finite width and height, got {width}x{height}"),
            ))
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn upper_right(&self) -> Position {
        Position::new(self.width, self.height)
    }
}

/// World-space location in meters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    pub fn add_x(&mut self, dx: f64) {
        self.x += dx;
    }

    pub fn add_y(&mut self, dy: f64) {
        self.y += dy;
    }

    /// `s = s0 + v*t + a*t^2/2`
    pub fn advance(&mut self, velocity: &Velocity, acceleration: &Acceleration, dt: f64) {
        self.x += velocity.dx * dt + acceleration.ddx / 2. * dt.powi(2);
        self.y += velocity.dy * dt + acceleration.ddy / 2. * dt.powi(2);
    }
}

/// Velocity in m/s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Velocity {
    dx: f64,
    dy: f64,
}

impl Velocity {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Velocity of `magnitude` along the nose axis of `angle`.
    pub fn along(angle: Angle, magnitude: f64) -> Self {
        let (sin, cos) = angle.radians().sin_cos();
        Self {
            dx: -sin * magnitude,
            dy: cos * magnitude,
        }
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dy(&self) -> f64 {
        self.dy
    }

    pub fn speed(&self) -> f64 {
        self.dx.hypot(self.dy)
    }

    pub fn set_dx(&mut self, dx: f64) {
        self.dx = dx;
    }

    pub fn set_dy(&mut self, dy: f64) {
        self.dy = dy;
    }

    /// `v = v0 + a*t`
    pub fn accelerate(&mut self, acceleration: &Acceleration, dt: f64) {
        self.dx += acceleration.ddx * dt;
        self.dy += acceleration.ddy * dt;
    }
}

/// Per-tick acceleration in m/s^2. Rebuilt from gravity and thrust every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Acceleration {
    ddx: f64,
    ddy: f64,
}

impl Acceleration {
    pub fn new(ddx: f64, ddy: f64) -> Self {
        Self { ddx, ddy }
    }

    pub fn gravity(g: f64) -> Self {
        Self { ddx: 0., ddy: g }
    }

    /// Acceleration of `magnitude` along the nose axis of `angle`.
    pub fn along(angle: Angle, magnitude: f64) -> Self {
        let (sin, cos) = angle.radians().sin_cos();
        Self {
            ddx: -sin * magnitude,
            ddy: cos * magnitude,
        }
    }

    pub fn ddx(&self) -> f64 {
        self.ddx
    }

    pub fn ddy(&self) -> f64 {
        self.ddy
    }
}

impl Add for Acceleration {
    type Output = Acceleration;

    fn add(self, rhs: Acceleration) -> Acceleration {
        Acceleration {
            ddx: self.ddx + rhs.ddx,
            ddy: self.ddy + rhs.ddy,
        }
    }
}
