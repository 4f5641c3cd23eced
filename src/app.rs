use std::f64::consts::TAU;

use serde::Serialize;

use crate::simulation::*;

mod defaults {
    pub const MAX_TICKS: usize = 20_000;
    pub const FINAL_APPROACH: f64 = 40.;
    pub const DESCENT_RATE_MIN: f64 = 1.;
    pub const DESCENT_RATE_MAX: f64 = 8.;
    pub const DESCENT_GAIN: f64 = 0.05;
    pub const DRIFT_GAIN: f64 = 0.02;
    pub const DRIFT_SPEED_MAX: f64 = 3.;
    pub const TILT_GAIN: f64 = 0.08;
    pub const TILT_MAX: f64 = 0.35;
}

/// Scripted pilot: holds a descent rate that shrinks with altitude and
/// tilts to steer over the platform. Presses space once the attempt is over.
#[derive(Clone, Debug, Default)]
pub struct Autopilot;

impl Autopilot {
    pub fn controls(&self, mission: &Mission) -> Controls {
        let lander = mission.lander();
        if !lander.is_flying() {
            return Controls::default().with_space(true);
        }

        let altitude = mission.altitude();
        let velocity = lander.velocity();

        let descent_rate = (altitude * defaults::DESCENT_GAIN)
            .clamp(defaults::DESCENT_RATE_MIN, defaults::DESCENT_RATE_MAX);
        let main = velocity.dy() < -descent_rate;

        let target_tilt = if altitude < defaults::FINAL_APPROACH {
            0.
        } else {
            let offset = mission.ground().platform().center() - lander.position().x();
            let target_dx = (offset * defaults::DRIFT_GAIN)
                .clamp(-defaults::DRIFT_SPEED_MAX, defaults::DRIFT_SPEED_MAX);
            // positive tilt pushes towards negative x
            (-(target_dx - velocity.dx()) * defaults::TILT_GAIN)
                .clamp(-defaults::TILT_MAX, defaults::TILT_MAX)
        };

        let radians = lander.angle().radians();
        let tilt = if radians > TAU / 2. { radians - TAU } else { radians };
        let half_step = lander.settings().rotation_step / 2.;
        let counter_clockwise = tilt < target_tilt - half_step;
        let clockwise = tilt > target_tilt + half_step;

        let (left, right) = match mission.settings().mapping {
            ControlMapping::Natural => (counter_clockwise, clockwise),
            ControlMapping::Swapped => (clockwise, counter_clockwise),
        };
        Controls::default()
            .with_down(main)
            .with_left(left)
            .with_right(right)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FlightSample {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub fuel: f64,
    pub angle: f64,
}

/// Telemetry of one attempt, stored column-wise.
#[derive(Clone, Debug, Default)]
pub struct FlightHistory {
    time: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    dx: Vec<f64>,
    dy: Vec<f64>,
    fuel: Vec<f64>,
    angle: Vec<f64>,
}

impl FlightHistory {
    pub fn with_initial_state(mission: &Mission) -> Self {
        let mut history = Self::default();
        history.append(mission);
        history
    }

    pub fn append(&mut self, mission: &Mission) {
        let lander = mission.lander();
        self.time.push(mission.elapsed());
        self.x.push(lander.position().x());
        self.y.push(lander.position().y());
        self.dx.push(lander.velocity().dx());
        self.dy.push(lander.velocity().dy());
        self.fuel.push(lander.fuel());
        self.angle.push(lander.angle().degrees());
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn pretty_to_string(&self) -> String {
        self.iter_history().fold(
            format!(
                "{:>8}{:>9}{:>9}{:>8}{:>8}{:>8}{:>8}",
                "T", "X", "Y", "DX", "DY", "FUEL", "ANGLE"
            ),
            |out,
             FlightSample {
                 time,
                 x,
                 y,
                 dx,
                 dy,
                 fuel,
                 angle,
             }| {
                out + &format!(
                    "\n{time:8.2}{x:9.2}{y:9.2}{dx:8.2}{dy:8.2}{fuel:8.0}{angle:8.1}"
                )
            },
        )
    }

    pub fn iter_history(&self) -> impl Iterator<Item = FlightSample> + '_ {
        self.time
            .iter()
            .zip(&self.x)
            .zip(&self.y)
            .zip(&self.dx)
            .zip(&self.dy)
            .zip(&self.fuel)
            .zip(&self.angle)
            .map(|((((((time, x), y), dx), dy), fuel), angle)| FlightSample {
                time: *time,
                x: *x,
                y: *y,
                dx: *dx,
                dy: *dy,
                fuel: *fuel,
                angle: *angle,
            })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub landings: Vec<Landing>,
    pub hud: Hud,
}

/// Headless driver: flies attempts with the autopilot and keeps their
/// telemetry.
pub struct App {
    mission: Mission,
    autopilot: Autopilot,
    flight_histories: Vec<FlightHistory>,
    landings: Vec<Landing>,
    max_ticks: usize,
}

impl App {
    pub fn try_new(bounds: Bounds, settings: Settings) -> Result<Self, String> {
        settings.validate().map_err(|e| e.to_string())?;
        Ok(Self::with_mission(Mission::new(bounds, settings)))
    }

    pub fn with_mission(mission: Mission) -> Self {
        Self {
            mission,
            autopilot: Autopilot,
            flight_histories: Vec::new(),
            landings: Vec::new(),
            max_ticks: defaults::MAX_TICKS,
        }
    }

    pub fn with_max_ticks(self, max_ticks: usize) -> Self {
        Self { max_ticks, ..self }
    }

    /// Flies one attempt to touchdown. A lander left down by the previous
    /// attempt is reset first.
    pub fn run_attempt(&mut self) -> Result<Landing, String> {
        if !self.mission.lander().is_flying() {
            let controls = self.autopilot.controls(&self.mission);
            self.mission.tick(&controls);
        }
        let mut history = FlightHistory::with_initial_state(&self.mission);

        for _ in 0..self.max_ticks {
            let controls = self.autopilot.controls(&self.mission);
            let touchdown = self.mission.tick(&controls);
            history.append(&self.mission);
            if let Some(landing) = touchdown {
                self.flight_histories.push(history);
                self.landings.push(landing);
                return Ok(landing);
            }
        }
        self.flight_histories.push(history);
        Err(format!(
            "Attempt didn't finish within {} ticks",
            self.max_ticks
        ))
    }

    pub fn run(&mut self, attempts: usize) -> Result<Summary, String> {
        for i in 0..attempts {
            self.run_attempt()
                .map_err(|e| format!("Attempt {} failed: {e}", i + 1))?;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> Summary {
        Summary {
            landings: self.landings.clone(),
            hud: self.mission.hud(),
        }
    }

    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    pub fn get_histories(&self) -> impl Iterator<Item = &FlightHistory> + '_ {
        self.flight_histories.iter()
    }

    pub fn print_flight_state_results(&self) {
        if let Some(history) = self.flight_histories.last() {
            println!("{}", history.pretty_to_string());
        }
        let hud = self.mission.hud();
        println!(
            "Finished {:?} after {:.2}s, attempts: {}, successes: {}",
            hud.last_landing, hud.elapsed, hud.attempts, hud.successes
        );
    }
}

#[cfg(test)]
mod app_tests {
    use super::*;

    fn app(seed: u64) -> App {
        let settings = Settings {
            mission: MissionSettings::default().with_seed(seed),
            ..Settings::default()
        };
        App::try_new(Bounds::new(800., 600.), settings).unwrap()
    }

    #[test]
    fn attempts_finish_and_are_counted() {
        let mut app = app(1);
        let summary = app.run(3).unwrap();
        assert_eq!(summary.landings.len(), 3);
        assert_eq!(summary.hud.attempts, 3);
        assert_eq!(
            summary.hud.successes as usize,
            summary.landings.iter().filter(|l| l.is_correct()).count()
        );
        assert_eq!(app.get_histories().count(), 3);
    }

    #[test]
    fn history_follows_ticks() {
        let mut app = app(2);
        app.run_attempt().unwrap();
        let history = app.get_histories().next().unwrap();
        let samples: Vec<_> = history.iter_history().collect();
        assert_eq!(samples.len(), history.len());
        assert_eq!(samples[0].time, 0.);
        assert!(samples.windows(2).all(|w| w[1].time > w[0].time));
        assert!(samples.windows(2).all(|w| w[1].fuel <= w[0].fuel));
        assert!(history.pretty_to_string().lines().count() == samples.len() + 1);
    }

    #[test]
    fn tick_limit_is_an_error() {
        let mut app = app(3).with_max_ticks(5);
        assert!(app.run_attempt().is_err());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut settings = Settings::default();
        settings.mission.timestep = -1.;
        assert!(App::try_new(Bounds::new(800., 600.), settings).is_err());
    }

    #[test]
    fn autopilot_presses_space_when_down() {
        let ground = Ground::from_samples(
            Bounds::new(1000., 500.),
            GroundSettings::default(),
            vec![100.; 500],
            Platform::new(500., 80., 100.),
        );
        let lander =
            Lander::parked(LanderSettings::default()).with_position(Position::new(500., 100.0001));
        let mut mission = Mission::from_parts(MissionSettings::default().with_seed(4), ground, lander);
        mission.tick(&Controls::default());
        assert!(Autopilot.controls(&mission).is_space());
    }

    #[test]
    fn autopilot_brakes_fast_descent() {
        let ground = Ground::from_samples(
            Bounds::new(1000., 500.),
            GroundSettings::default(),
            vec![100.; 500],
            Platform::new(500., 80., 100.),
        );
        let lander = Lander::parked(LanderSettings::default())
            .with_position(Position::new(500., 300.))
            .with_velocity(Velocity::new(0., -20.));
        let mission = Mission::from_parts(MissionSettings::default().with_seed(5), ground, lander);
        let controls = Autopilot.controls(&mission);
        assert!(controls.is_down());
        assert!(!controls.is_space());
    }
}
