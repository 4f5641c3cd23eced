use std::f64::consts::PI;

use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use crate::error::ConfigError;

use super::*;

pub(crate) mod defaults {
    pub const GRAVITY: f64 = -1.625;
    pub const TIMESTEP: f64 = 1. / 60.;
    pub const MAX_FRAME_TIME: f64 = 0.25;
    pub const LOW_FUEL_PERCENT: f64 = 20.;
}

#[derive(Clone, Debug)]
pub struct MissionSettings {
    pub gravity: f64,
    pub timestep: f64,
    pub max_frame_time: f64,
    pub mapping: ControlMapping,
    pub low_fuel_percent: f64,
    pub seed: Option<u64>,
}

impl Default for MissionSettings {
    fn default() -> Self {
        Self {
            gravity: defaults::GRAVITY,
            timestep: defaults::TIMESTEP,
            max_frame_time: defaults::MAX_FRAME_TIME,
            mapping: ControlMapping::default(),
            low_fuel_percent: defaults::LOW_FUEL_PERCENT,
            seed: None,
        }
    }
}

impl MissionSettings {
    pub fn with_gravity(self, gravity: f64) -> Self {
        Self { gravity, ..self }
    }

    pub fn with_timestep(self, timestep: f64) -> Self {
        assert!(timestep > 0.);
        Self { timestep, ..self }
    }

    pub fn with_max_frame_time(self, max_frame_time: f64) -> Self {
        Self {
            max_frame_time,
            ..self
        }
    }

    pub fn with_mapping(self, mapping: ControlMapping) -> Self {
        Self { mapping, ..self }
    }

    pub fn with_low_fuel_percent(self, low_fuel_percent: f64) -> Self {
        Self {
            low_fuel_percent,
            ..self
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub lander: LanderSettings,
    pub ground: GroundSettings,
    pub mission: MissionSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            lander,
            ground,
            mission,
        } = self;
        if lander.dry_mass <= 0. {
            return Err(ConfigError::invalid("Lander/DryMass", "must be positive"));
        }
        if lander.fixed_mass <= 0. {
            return Err(ConfigError::invalid("Lander/FixedMass", "must be positive"));
        }
        if lander.starting_fuel < 0. {
            return Err(ConfigError::invalid("Lander/Fuel", "can't be negative"));
        }
        if lander.max_landing_speed <= 0. {
            return Err(ConfigError::invalid("Lander/MaxLandingSpeed", "must be positive"));
        }
        if lander.main_thrust < 0. {
            return Err(ConfigError::invalid("Lander/MainThrust", "can't be negative"));
        }
        // a negative burn would refuel the lander in flight
        if lander.main_fuel_per_tick < 0. {
            return Err(ConfigError::invalid("Lander/MainFuelPerTick", "can't be negative"));
        }
        if lander.attitude_fuel_per_tick < 0. {
            return Err(ConfigError::invalid(
                "Lander/AttitudeFuelPerTick",
                "can't be negative",
            ));
        }
        if lander.rotation_step < 0. {
            return Err(ConfigError::invalid("Lander/RotationStep", "can't be negative"));
        }
        if lander.width < 0. {
            return Err(ConfigError::invalid("Lander/Width", "can't be negative"));
        }
        if !(lander.upright_tolerance > 0. && lander.upright_tolerance < PI) {
            return Err(ConfigError::invalid(
                "Lander/UprightTolerance",
                format!("expected 0 < tolerance < π, got {}", lander.upright_tolerance),
            ));
        }
        if mission.timestep <= 0. {
            return Err(ConfigError::invalid("Mission/Timestep", "must be positive"));
        }
        if ground.resolution <= 0. {
            return Err(ConfigError::invalid("Ground/Resolution", "must be positive"));
        }
        if !(0. ..=1.).contains(&ground.floor)
            || !(0. ..=1.).contains(&ground.ceiling)
            || ground.floor >= ground.ceiling
        {
            return Err(ConfigError::invalid(
                "Ground/Floor",
                format!(
                    "floor ({}) and ceiling ({}) must satisfy 0 <= floor < ceiling <= 1",
                    ground.floor, ground.ceiling
                ),
            ));
        }
        if ground.platform_width.0 <= 0. || ground.platform_width.0 > ground.platform_width.1 {
            return Err(ConfigError::invalid(
                "Ground/PlatformWidth",
                "expected 0 < min <= max",
            ));
        }
        if ground.platform_band.0 > ground.platform_band.1 {
            return Err(ConfigError::invalid("Ground/PlatformBand", "expected low <= high"));
        }
        if ground.feature_count.0 > ground.feature_count.1 {
            return Err(ConfigError::invalid("Ground/Features", "expected min <= max"));
        }
        if ground
            .harmonics
            .iter()
            .any(|&(cycles, amplitude)| cycles <= 0. || amplitude < 0.)
        {
            return Err(ConfigError::invalid(
                "Ground/Harmonics",
                "expected positive cycles and non-negative amplitudes",
            ));
        }
        if ground.feature_half_width.0 > ground.feature_half_width.1
            || ground.feature_strength.0 > ground.feature_strength.1
        {
            return Err(ConfigError::invalid(
                "Ground/Features",
                "feature ranges expect min <= max",
            ));
        }
        Ok(())
    }
}

/// Everything a HUD shows, computed from the current mission state.
#[derive(Clone, Debug, Serialize)]
pub struct Hud {
    pub elapsed: f64,
    pub fuel: f64,
    pub fuel_percentage: f64,
    pub speed: f64,
    pub altitude: f64,
    pub attempts: u32,
    pub successes: u32,
    pub success_rate: Option<u32>,
    pub low_fuel_warning: bool,
    pub show_instructions: bool,
    pub status: Status,
    pub last_landing: Option<Landing>,
}

/// Owns the surface and the lander and runs one attempt after another.
pub struct Mission {
    bounds: Bounds,
    ground: Ground,
    lander: Lander,
    settings: MissionSettings,
    rng: StdRng,
    clock: FixedStepClock,
    elapsed: f64,
    attempts: u32,
    successes: u32,
    show_instructions: bool,
    last_landing: Option<Landing>,
}

fn rng_for(settings: &MissionSettings) -> StdRng {
    match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl Mission {
    pub fn new(bounds: Bounds, settings: Settings) -> Self {
        let rng = rng_for(&settings.mission);
        Self::with_rng(bounds, settings, rng)
    }

    pub fn with_rng(bounds: Bounds, settings: Settings, mut rng: StdRng) -> Self {
        let Settings {
            lander,
            ground,
            mission,
        } = settings;
        let ground = Ground::generate(bounds, ground, &mut rng);
        let lander = Lander::new(lander, bounds, &mut rng);
        Self::assemble(bounds, mission, ground, lander, rng)
    }

    /// Mission over a prepared surface and lander.
    pub fn from_parts(settings: MissionSettings, ground: Ground, lander: Lander) -> Self {
        let rng = rng_for(&settings);
        Self::assemble(ground.bounds(), settings, ground, lander, rng)
    }

    fn assemble(
        bounds: Bounds,
        settings: MissionSettings,
        ground: Ground,
        lander: Lander,
        rng: StdRng,
    ) -> Self {
        Self {
            bounds,
            ground,
            lander,
            clock: FixedStepClock::new(settings.timestep, settings.max_frame_time),
            settings,
            rng,
            elapsed: 0.,
            attempts: 0,
            successes: 0,
            show_instructions: true,
            last_landing: None,
        }
    }

    /// One fixed step: thrust and gravity, integration, touchdown check and
    /// finally a reset request if the lander was already down.
    pub fn tick(&mut self, input: &impl ControlInput) -> Option<Landing> {
        let was_flying = self.lander.is_flying();
        if input.any_thrust_key() {
            self.show_instructions = false;
        }

        let mut touchdown = None;
        if was_flying {
            let thrust = Thrust::from_input(input, self.settings.mapping);
            let acceleration = self
                .lander
                .compute_acceleration(&thrust, self.settings.gravity);
            self.lander.integrate(&acceleration, self.settings.timestep);
            self.elapsed += self.settings.timestep;
            touchdown = self.check_collision();
        }

        if !was_flying && input.is_space() {
            self.reset();
        }
        touchdown
    }

    /// Runs as many fixed steps as `frame_time` (plus leftovers) covers,
    /// reusing the same key snapshot. At most one reset per call.
    pub fn advance(&mut self, input: &impl ControlInput, frame_time: f64) -> Option<Landing> {
        let mut controls = Controls {
            down: input.is_down(),
            left: input.is_left(),
            right: input.is_right(),
            space: input.is_space(),
        };
        let mut touchdown = None;
        for _ in 0..self.clock.advance(frame_time) {
            let was_flying = self.lander.is_flying();
            if let Some(landing) = self.tick(&controls) {
                touchdown = Some(landing);
            }
            if !was_flying && self.lander.is_flying() {
                controls.space = false;
            }
        }
        touchdown
    }

    /// New surface and lander for the current bounds. Counters survive.
    pub fn reset(&mut self) {
        self.reset_to(self.bounds);
    }

    pub fn reset_to(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.ground.reset(bounds, &mut self.rng);
        self.lander.reset(bounds, &mut self.rng);
        self.elapsed = 0.;
        self.show_instructions = true;
        self.last_landing = None;
        self.clock.clear();
        tracing::info!(
            attempts = self.attempts,
            successes = self.successes,
            "mission reset"
        );
    }

    fn check_collision(&mut self) -> Option<Landing> {
        let landing = check_touchdown(&self.ground, &self.lander)?;
        self.attempts += 1;
        if landing.is_correct() {
            self.lander.land();
            self.successes += 1;
            tracing::info!(
                elapsed = self.elapsed,
                fuel = self.lander.fuel(),
                "the eagle has landed"
            );
        } else {
            self.lander.crash();
            tracing::info!(elapsed = self.elapsed, ?landing, "lander crashed");
        }
        self.last_landing = Some(landing);
        Some(landing)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            elapsed: self.elapsed,
            fuel: self.lander.fuel(),
            fuel_percentage: self.lander.fuel_percentage(),
            speed: self.lander.speed(),
            altitude: self.altitude(),
            attempts: self.attempts,
            successes: self.successes,
            success_rate: (self.attempts > 0).then(|| self.successes * 100 / self.attempts),
            low_fuel_warning: self.lander.is_flying()
                && self.lander.fuel_percentage() < self.settings.low_fuel_percent,
            show_instructions: self.show_instructions,
            status: self.lander.status(),
            last_landing: self.last_landing,
        }
    }

    pub fn altitude(&self) -> f64 {
        self.ground.altitude_of(&self.lander.position())
    }

    pub fn lander(&self) -> &Lander {
        &self.lander
    }

    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn successes(&self) -> u32 {
        self.successes
    }

    pub fn show_instructions(&self) -> bool {
        self.show_instructions
    }

    pub fn last_landing(&self) -> Option<Landing> {
        self.last_landing
    }

    pub fn settings(&self) -> &MissionSettings {
        &self.settings
    }
}
