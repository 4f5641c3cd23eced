use std::f64::consts::TAU;

use serde::Serialize;

use super::{Ground, Lander};

/// Verdict for a touchdown. Errors are absolute overshoots past the limit
/// and the same overshoot relative to the limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Landing {
    Correct,
    TooFast { error_abs: f64, error_rel: f64 },
    NotUpright { error_abs: f64, error_rel: f64 },
    OffPlatform { distance: f64 },
}

impl Landing {
    pub fn is_correct(&self) -> bool {
        matches!(self, Landing::Correct)
    }
}

/// `None` while the lander is above the surface below it.
pub fn check_touchdown(ground: &Ground, lander: &Lander) -> Option<Landing> {
    let position = lander.position();
    if position.y() > ground.elevation_at(position.x()) {
        return None;
    }

    let settings = lander.settings();
    let verdict = if lander.is_safe_landing() {
        if ground.on_platform(position.x(), lander.width()) {
            Landing::Correct
        } else {
            let platform = ground.platform();
            let half = lander.width() / 2.;
            let distance = (platform.left() - (position.x() - half))
                .max((position.x() + half) - platform.right())
                .max(0.);
            Landing::OffPlatform { distance }
        }
    } else if lander.speed() >= settings.max_landing_speed {
        let error_abs = lander.speed() - settings.max_landing_speed;
        Landing::TooFast {
            error_abs,
            error_rel: error_abs / settings.max_landing_speed,
        }
    } else {
        let radians = lander.angle().radians();
        let tilt = radians.min(TAU - radians);
        let error_abs = tilt - settings.upright_tolerance;
        Landing::NotUpright {
            error_abs,
            error_rel: error_abs / settings.upright_tolerance,
        }
    };
    Some(verdict)
}
