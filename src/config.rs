//! Editor configuration parsed from environment variables.

use std::str::FromStr;

use designer::config::EditorConfig;
use designer::transform::Vec2;

pub const HISTORY_CAPACITY_VAR: &str = "PHYSMAP_HISTORY_CAPACITY";
pub const PPM_VAR: &str = "PHYSMAP_PPM";
pub const MIN_PPM_VAR: &str = "PHYSMAP_MIN_PPM";
pub const MAX_PPM_VAR: &str = "PHYSMAP_MAX_PPM";
pub const TIMESTEP_VAR: &str = "PHYSMAP_TIMESTEP";
pub const ITERATIONS_VAR: &str = "PHYSMAP_ITERATIONS";
pub const GRAVITY_Y_VAR: &str = "PHYSMAP_GRAVITY_Y";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: cannot parse {value:?}")]
    Parse { var: &'static str, value: String },
    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: &'static str },
}

/// Build typed editor config from environment variables.
///
/// All optional; unset variables keep the [`EditorConfig`] defaults:
/// - `PHYSMAP_HISTORY_CAPACITY`: undo depth, at least 1 (default 50)
/// - `PHYSMAP_PPM`: starting zoom, inside the zoom range (default 20)
/// - `PHYSMAP_MIN_PPM` / `PHYSMAP_MAX_PPM`: zoom range (default 5..50)
/// - `PHYSMAP_TIMESTEP`: preview step in seconds (default 1/60)
/// - `PHYSMAP_ITERATIONS`: solver iterations, at least 1 (default 10)
/// - `PHYSMAP_GRAVITY_Y`: preview gravity in frame pixels/s², Y down (default 300)
///
/// # Errors
///
/// [`ConfigError`] for a value that does not parse or is out of range.
pub fn from_env() -> Result<EditorConfig, ConfigError> {
    from_lookup(|var| std::env::var(var).ok())
}

/// [`from_env`] over an arbitrary variable source.
///
/// # Errors
///
/// As [`from_env`].
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<EditorConfig, ConfigError> {
    let mut cfg = EditorConfig::default();

    if let Some(capacity) = parse_var::<usize>(&lookup, HISTORY_CAPACITY_VAR)? {
        if capacity == 0 {
            return Err(ConfigError::Invalid { var: HISTORY_CAPACITY_VAR, reason: "must be at least 1" });
        }
        cfg.history_capacity = capacity;
    }

    if let Some(min) = parse_var::<f64>(&lookup, MIN_PPM_VAR)? {
        cfg.limits.min_ppm = positive(MIN_PPM_VAR, min)?;
    }
    if let Some(max) = parse_var::<f64>(&lookup, MAX_PPM_VAR)? {
        cfg.limits.max_ppm = positive(MAX_PPM_VAR, max)?;
    }
    if cfg.limits.min_ppm > cfg.limits.max_ppm {
        return Err(ConfigError::Invalid { var: MIN_PPM_VAR, reason: "exceeds the maximum zoom" });
    }

    if let Some(ppm) = parse_var::<f64>(&lookup, PPM_VAR)? {
        cfg.default_ppm = positive(PPM_VAR, ppm)?;
    }
    if cfg.default_ppm < cfg.limits.min_ppm || cfg.default_ppm > cfg.limits.max_ppm {
        return Err(ConfigError::Invalid { var: PPM_VAR, reason: "outside the zoom range" });
    }

    if let Some(timestep) = parse_var::<f64>(&lookup, TIMESTEP_VAR)? {
        cfg.preview.timestep = positive(TIMESTEP_VAR, timestep)?;
    }
    if let Some(iterations) = parse_var::<u32>(&lookup, ITERATIONS_VAR)? {
        if iterations == 0 {
            return Err(ConfigError::Invalid { var: ITERATIONS_VAR, reason: "must be at least 1" });
        }
        cfg.preview.iterations = iterations;
    }
    if let Some(gravity_y) = parse_var::<f64>(&lookup, GRAVITY_Y_VAR)? {
        if !gravity_y.is_finite() {
            return Err(ConfigError::Invalid { var: GRAVITY_Y_VAR, reason: "must be finite" });
        }
        cfg.preview.gravity = Vec2::new(0.0, gravity_y);
    }

    Ok(cfg)
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<T>().map(Some).map_err(|_| ConfigError::Parse { var, value: raw })
}

fn positive(var: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid { var, reason: "must be a positive number" })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
