use rand::Rng;
use serde::Serialize;

use super::{Acceleration, Angle, Bounds, Position, Thrust, Velocity};

pub(crate) mod defaults {
    pub const MAIN_THRUST: f64 = 45000.;
    pub const DRY_MASS: f64 = 10183.;
    pub const FIXED_MASS: f64 = 15103.;
    pub const STARTING_FUEL: f64 = 5000.;
    pub const MAIN_FUEL_PER_TICK: f64 = 10.;
    pub const ATTITUDE_FUEL_PER_TICK: f64 = 1.;
    pub const ROTATION_STEP: f64 = 0.1;
    pub const MAX_LANDING_SPEED: f64 = 4.;
    pub const UPRIGHT_TOLERANCE: f64 = 0.2;
    pub const WIDTH: f64 = 20.;

    pub const SPAWN_X_INSET: f64 = 1.;
    pub const SPAWN_HEIGHT: f64 = 0.75;
    pub const SPAWN_JITTER: f64 = 10.;
    pub const SPAWN_DRIFT_X: (f64, f64) = (-10., -4.);
    pub const SPAWN_DRIFT_Y: (f64, f64) = (-2., 2.);
}

/// How engine force is turned into acceleration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MassModel {
    /// Dry mass plus the fuel still on board.
    #[default]
    Wet,
    /// A constant total mass regardless of fuel.
    Fixed,
}

#[derive(Clone, Debug)]
pub struct LanderSettings {
    pub main_thrust: f64,
    pub dry_mass: f64,
    pub fixed_mass: f64,
    pub mass_model: MassModel,
    pub starting_fuel: f64,
    pub main_fuel_per_tick: f64,
    pub attitude_fuel_per_tick: f64,
    pub rotation_step: f64,
    pub max_landing_speed: f64,
    pub upright_tolerance: f64,
    pub width: f64,
}

impl Default for LanderSettings {
    fn default() -> Self {
        Self {
            main_thrust: defaults::MAIN_THRUST,
            dry_mass: defaults::DRY_MASS,
            fixed_mass: defaults::FIXED_MASS,
            mass_model: MassModel::default(),
            starting_fuel: defaults::STARTING_FUEL,
            main_fuel_per_tick: defaults::MAIN_FUEL_PER_TICK,
            attitude_fuel_per_tick: defaults::ATTITUDE_FUEL_PER_TICK,
            rotation_step: defaults::ROTATION_STEP,
            max_landing_speed: defaults::MAX_LANDING_SPEED,
            upright_tolerance: defaults::UPRIGHT_TOLERANCE,
            width: defaults::WIDTH,
        }
    }
}

impl LanderSettings {
    pub fn with_main_thrust(self, main_thrust: f64) -> Self {
        Self {
            main_thrust,
            ..self
        }
    }

    pub fn with_dry_mass(self, dry_mass: f64) -> Self {
        assert!(dry_mass > 0.);
        Self { dry_mass, ..self }
    }

    pub fn with_fixed_mass(self, fixed_mass: f64) -> Self {
        assert!(fixed_mass > 0.);
        Self { fixed_mass, ..self }
    }

    pub fn with_mass_model(self, mass_model: MassModel) -> Self {
        Self { mass_model, ..self }
    }

    pub fn with_starting_fuel(self, starting_fuel: f64) -> Self {
        Self {
            starting_fuel,
            ..self
        }
    }

    pub fn with_main_fuel_per_tick(self, main_fuel_per_tick: f64) -> Self {
        Self {
            main_fuel_per_tick,
            ..self
        }
    }

    pub fn with_attitude_fuel_per_tick(self, attitude_fuel_per_tick: f64) -> Self {
        Self {
            attitude_fuel_per_tick,
            ..self
        }
    }

    pub fn with_rotation_step(self, rotation_step: f64) -> Self {
        Self {
            rotation_step,
            ..self
        }
    }

    pub fn with_max_landing_speed(self, max_landing_speed: f64) -> Self {
        assert!(max_landing_speed > 0.);
        Self {
            max_landing_speed,
            ..self
        }
    }

    pub fn with_upright_tolerance(self, upright_tolerance: f64) -> Self {
        Self {
            upright_tolerance,
            ..self
        }
    }

    pub fn with_width(self, width: f64) -> Self {
        Self { width, ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Status {
    Flying,
    Landed,
    Crashed,
}

/// The lunar module: kinematic state, attitude and fuel.
#[derive(Clone, Debug)]
pub struct Lander {
    position: Position,
    velocity: Velocity,
    angle: Angle,
    status: Status,
    fuel: f64,
    settings: LanderSettings,
}

impl Lander {
    /// Builds a lander at a randomized spawn point for `bounds`.
    pub fn new(settings: LanderSettings, bounds: Bounds, rng: &mut impl Rng) -> Self {
        let mut lander = Self::parked(settings);
        lander.reset(bounds, rng);
        lander
    }

    /// A flying lander at the origin, at rest, upright and fully fuelled.
    /// Combine with the `with_*` methods to place it precisely.
    pub fn parked(settings: LanderSettings) -> Self {
        assert!(settings.dry_mass > 0. && settings.fixed_mass > 0.);
        Self {
            position: Position::default(),
            velocity: Velocity::default(),
            angle: Angle::up(),
            status: Status::Flying,
            fuel: settings.starting_fuel,
            settings,
        }
    }

    pub fn with_position(self, position: Position) -> Self {
        Self { position, ..self }
    }

    pub fn with_velocity(self, velocity: Velocity) -> Self {
        Self { velocity, ..self }
    }

    pub fn with_angle(self, angle: Angle) -> Self {
        Self { angle, ..self }
    }

    pub fn with_fuel(self, fuel: f64) -> Self {
        Self {
            fuel: fuel.max(0.),
            ..self
        }
    }

    /// Top right of the screen, drifting left, upright, full tank.
    pub fn reset(&mut self, bounds: Bounds, rng: &mut impl Rng) {
        let (drift_x_min, drift_x_max) = defaults::SPAWN_DRIFT_X;
        let (drift_y_min, drift_y_max) = defaults::SPAWN_DRIFT_Y;

        self.angle.set_up();
        self.position = Position::new(
            bounds.width() - defaults::SPAWN_X_INSET,
            bounds.height() * defaults::SPAWN_HEIGHT
                + rng.gen_range(-defaults::SPAWN_JITTER..defaults::SPAWN_JITTER),
        );
        self.velocity = Velocity::new(
            rng.gen_range(drift_x_min..=drift_x_max),
            rng.gen_range(drift_y_min..=drift_y_max),
        );
        self.status = Status::Flying;
        self.fuel = self.settings.starting_fuel;
    }

    /// Gravity plus whatever the engines contribute this tick. Firing an
    /// engine burns fuel and rotation is applied immediately.
    pub fn compute_acceleration(&mut self, thrust: &Thrust, gravity: f64) -> Acceleration {
        let mut acceleration = Acceleration::gravity(gravity);
        if self.status != Status::Flying || self.fuel <= 0. {
            return acceleration;
        }

        if thrust.is_main() {
            let magnitude = self.settings.main_thrust / self.total_mass();
            acceleration = acceleration + Acceleration::along(self.angle, magnitude);
            self.consume_fuel(self.settings.main_fuel_per_tick);
        }
        if thrust.is_clockwise() {
            self.angle.add(-self.settings.rotation_step);
            self.consume_fuel(self.settings.attitude_fuel_per_tick);
        }
        if thrust.is_counter_clockwise() {
            self.angle.add(self.settings.rotation_step);
            self.consume_fuel(self.settings.attitude_fuel_per_tick);
        }
        acceleration
    }

    /// Position is advanced with the velocity from before this step.
    pub fn integrate(&mut self, acceleration: &Acceleration, dt: f64) {
        self.position.advance(&self.velocity, acceleration, dt);
        self.velocity.accelerate(acceleration, dt);
    }

    pub fn is_safe_landing(&self) -> bool {
        self.speed() < self.settings.max_landing_speed
            && self.angle.is_near_upright(self.settings.upright_tolerance)
    }

    pub fn land(&mut self) {
        self.angle.set_up();
        self.status = Status::Landed;
    }

    pub fn crash(&mut self) {
        self.angle.set_down();
        self.status = Status::Crashed;
    }

    pub fn total_mass(&self) -> f64 {
        match self.settings.mass_model {
            MassModel::Wet => self.settings.dry_mass + self.fuel,
            MassModel::Fixed => self.settings.fixed_mass,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn speed(&self) -> f64 {
        self.velocity.speed()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_flying(&self) -> bool {
        self.status == Status::Flying
    }

    pub fn fuel(&self) -> f64 {
        self.fuel
    }

    pub fn fuel_percentage(&self) -> f64 {
        if self.settings.starting_fuel > 0. {
            self.fuel / self.settings.starting_fuel * 100.
        } else {
            0.
        }
    }

    pub fn is_out_of_fuel(&self) -> bool {
        self.fuel <= 0.
    }

    pub fn width(&self) -> f64 {
        self.settings.width
    }

    pub fn settings(&self) -> &LanderSettings {
        &self.settings
    }

    fn consume_fuel(&mut self, amount: f64) {
        self.fuel = (self.fuel - amount).max(0.);
    }
}
