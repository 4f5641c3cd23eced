use crate::error::ConfigError;
use crate::simulation::*;
use json::{self, JsonValue};
use std::{fs::File, io::Read, path::Path};

/// Overwrites `$target` when `$section/$key` is present, fails when it has
/// the wrong type.
macro_rules! override_json {
    ($target:expr, $json:ident, $section:literal, $key:literal, $func:ident, $expected:literal) => {
        let value = &$json[$section][$key];
        if !value.is_null() {
            $target = value.$func().ok_or_else(|| ConfigError::WrongType {
                key: concat!($section, "/", $key).to_owned(),
                expected: $expected,
            })?;
        }
    };
}

macro_rules! override_pair {
    ($target:expr, $json:ident, $section:literal, $key:literal, $func:ident) => {
        let value = &$json[$section][$key];
        if !value.is_null() {
            let err = || ConfigError::WrongType {
                key: concat!($section, "/", $key).to_owned(),
                expected: "a two element numeric array",
            };
            if value.len() != 2 {
                return Err(err());
            }
            $target = (
                value[0].$func().ok_or_else(err)?,
                value[1].$func().ok_or_else(err)?,
            );
        }
    };
}

pub fn parse_settings<P: AsRef<Path>>(settings_file_path: P) -> Result<Settings, ConfigError> {
    parse_settings_from_json(read_json(settings_file_path)?)
}

pub fn parse_settings_from_string(content: &str) -> Result<Settings, ConfigError> {
    parse_settings_from_json(json::parse(content)?)
}

fn read_json<P: AsRef<Path>>(file_path: P) -> Result<JsonValue, ConfigError> {
    let path = file_path.as_ref().display().to_string();
    let io_err = |source| ConfigError::Io {
        path: path.clone(),
        source,
    };
    let mut file_content = String::new();
    let mut file = File::open(&file_path).map_err(io_err)?;
    file.read_to_string(&mut file_content).map_err(io_err)?;
    Ok(json::parse(&file_content)?)
}

fn parse_settings_from_json(json: JsonValue) -> Result<Settings, ConfigError> {
    let settings = Settings {
        lander: parse_lander(&json)?,
        ground: parse_ground(&json)?,
        mission: parse_mission(&json)?,
    };
    settings.validate()?;
    Ok(settings)
}

fn parse_lander(json: &JsonValue) -> Result<LanderSettings, ConfigError> {
    let mut lander = LanderSettings::default();
    override_json!(lander.main_thrust, json, "Lander", "MainThrust", as_f64, "a number");
    override_json!(lander.dry_mass, json, "Lander", "DryMass", as_f64, "a number");
    override_json!(lander.fixed_mass, json, "Lander", "FixedMass", as_f64, "a number");
    override_json!(lander.starting_fuel, json, "Lander", "Fuel", as_f64, "a number");
    override_json!(lander.main_fuel_per_tick, json, "Lander", "MainFuelPerTick", as_f64, "a number");
    override_json!(
        lander.attitude_fuel_per_tick,
        json,
        "Lander",
        "AttitudeFuelPerTick",
        as_f64,
        "a number"
    );
    override_json!(lander.rotation_step, json, "Lander", "RotationStep", as_f64, "a number");
    override_json!(lander.max_landing_speed, json, "Lander", "MaxLandingSpeed", as_f64, "a number");
    override_json!(lander.upright_tolerance, json, "Lander", "UprightTolerance", as_f64, "a number");
    override_json!(lander.width, json, "Lander", "Width", as_f64, "a number");

    let mass_model = &json["Lander"]["MassModel"];
    if !mass_model.is_null() {
        lander.mass_model = match mass_model.as_str() {
            Some("Wet") => MassModel::Wet,
            Some("Fixed") => MassModel::Fixed,
            _ => {
                return Err(ConfigError::WrongType {
                    key: "Lander/MassModel".to_owned(),
                    expected: "\"Wet\" or \"Fixed\"",
                })
            }
        };
    }
    Ok(lander)
}

fn parse_ground(json: &JsonValue) -> Result<GroundSettings, ConfigError> {
    let mut ground = GroundSettings::default();
    override_json!(ground.resolution, json, "Ground", "Resolution", as_f64, "a number");
    override_json!(ground.floor, json, "Ground", "Floor", as_f64, "a number");
    override_json!(ground.ceiling, json, "Ground", "Ceiling", as_f64, "a number");
    override_json!(ground.base_level, json, "Ground", "BaseLevel", as_f64, "a number");
    override_json!(ground.noise, json, "Ground", "Noise", as_f64, "a number");
    override_json!(ground.platform_margin, json, "Ground", "PlatformMargin", as_f64, "a number");
    override_json!(ground.smoothing, json, "Ground", "Smoothing", as_bool, "a boolean");
    override_json!(
        ground.random_platform_start,
        json,
        "Ground",
        "RandomPlatformStart",
        as_bool,
        "a boolean"
    );
    override_pair!(ground.feature_count, json, "Ground", "Features", as_usize);
    override_pair!(ground.feature_half_width, json, "Ground", "FeatureHalfWidth", as_f64);
    override_pair!(ground.feature_strength, json, "Ground", "FeatureStrength", as_f64);
    override_pair!(ground.platform_width, json, "Ground", "PlatformWidth", as_f64);
    override_pair!(ground.platform_band, json, "Ground", "PlatformBand", as_f64);

    let harmonics = &json["Ground"]["Harmonics"];
    if !harmonics.is_null() {
        let err_str = || ConfigError::WrongType {
            key: "Ground/Harmonics".to_owned(),
            expected: "an array of [cycles, amplitude] pairs",
        };
        if !harmonics.is_array() {
            return Err(err_str());
        }
        ground.harmonics = harmonics
            .members()
            .map(|pair| {
                if pair.len() != 2 {
                    return Err(err_str());
                }
                let cycles = pair[0].as_f64().ok_or_else(err_str)?;
                let amplitude = pair[1].as_f64().ok_or_else(err_str)?;
                Ok((cycles, amplitude))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
    }
    Ok(ground)
}

fn parse_mission(json: &JsonValue) -> Result<MissionSettings, ConfigError> {
    let mut mission = MissionSettings::default();
    override_json!(mission.gravity, json, "Mission", "Gravity", as_f64, "a number");
    override_json!(mission.timestep, json, "Mission", "Timestep", as_f64, "a number");
    override_json!(mission.max_frame_time, json, "Mission", "MaxFrameTime", as_f64, "a number");
    override_json!(mission.low_fuel_percent, json, "Mission", "LowFuelPercent", as_f64, "a number");

    let seed = &json["Mission"]["Seed"];
    if !seed.is_null() {
        mission.seed = Some(seed.as_u64().ok_or_else(|| ConfigError::WrongType {
            key: "Mission/Seed".to_owned(),
            expected: "an unsigned integer",
        })?);
    }

    let mapping = &json["Mission"]["Mapping"];
    if !mapping.is_null() {
        mission.mapping = match mapping.as_str() {
            Some("Natural") => ControlMapping::Natural,
            Some("Swapped") => ControlMapping::Swapped,
            _ => {
                return Err(ConfigError::WrongType {
                    key: "Mission/Mapping".to_owned(),
                    expected: "\"Natural\" or \"Swapped\"",
                })
            }
        };
    }
    Ok(mission)
}
